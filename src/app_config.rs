use anyhow::{Context, Result};
use std::env;
use std::fs;

use crate::google_auth::ServiceAccountKey;

const DEFAULT_MODEL: &str = "claude-haiku-4-5";

#[derive(Debug, Clone)]
pub struct AppConfig {
    // --- Server ---
    pub port: String,
    pub base_url: String,

    // --- Telephony ---
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub operator_phone_number: String,

    // --- Assistant ---
    pub anthropic_api_key: String,
    pub anthropic_model: String,

    // --- Email ---
    pub gmail_address: String,
    pub gmail_app_password: String,
    pub notification_email: String,

    // --- Google workspace ---
    pub google_sheet_id: String,
    pub google_calendar_id: String,
    pub google_credentials: ServiceAccountKey,
}

impl AppConfig {
    /// Resolve the whole environment surface once, at startup.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env::var("PORT").unwrap_or_else(|_| "3000".into()),
            base_url: env::var("BASE_URL")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),

            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID")
                .context("TWILIO_ACCOUNT_SID missing")?,
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN")
                .context("TWILIO_AUTH_TOKEN missing")?,
            twilio_phone_number: env::var("TWILIO_PHONE_NUMBER")
                .context("TWILIO_PHONE_NUMBER missing")?,
            operator_phone_number: env::var("YOUR_PHONE_NUMBER")
                .context("YOUR_PHONE_NUMBER missing")?,

            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .context("ANTHROPIC_API_KEY missing")?,
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.into()),

            gmail_address: env::var("GMAIL_ADDRESS").context("GMAIL_ADDRESS missing")?,
            gmail_app_password: env::var("GMAIL_APP_PASSWORD")
                .context("GMAIL_APP_PASSWORD missing")?,
            notification_email: env::var("NOTIFICATION_EMAIL")
                .context("NOTIFICATION_EMAIL missing")?,

            google_sheet_id: env::var("GOOGLE_SHEET_ID").context("GOOGLE_SHEET_ID missing")?,
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID")
                .context("GOOGLE_CALENDAR_ID missing")?,
            google_credentials: resolve_google_credentials()?,
        })
    }
}

/// Service-account credentials come either inline (`GOOGLE_CREDENTIALS_JSON`)
/// or as a key-file path (`GOOGLE_CREDENTIALS_FILE`); inline wins. Both forms
/// normalize to one [`ServiceAccountKey`].
fn resolve_google_credentials() -> Result<ServiceAccountKey> {
    let raw = match env::var("GOOGLE_CREDENTIALS_JSON") {
        Ok(inline) => inline,
        Err(_) => {
            let path = env::var("GOOGLE_CREDENTIALS_FILE")
                .unwrap_or_else(|_| "credentials.json".into());
            fs::read_to_string(&path)
                .with_context(|| format!("failed to read Google credentials file {path}"))?
        }
    };

    let mut key: ServiceAccountKey =
        serde_json::from_str(&raw).context("invalid Google service-account JSON")?;
    // Inline env values often carry literal backslash-n in the PEM block.
    key.private_key = key.private_key.replace("\\n", "\n");
    Ok(key)
}
