use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use front_desk::app_config::AppConfig;
use front_desk::assistant::AssistantClient;
use front_desk::brokerage::{AgentRoster, BROKERAGE_NAME};
use front_desk::calendar::CalendarClient;
use front_desk::google_auth::{TokenProvider, SCOPE_CALENDAR, SCOPE_SHEETS};
use front_desk::mailer::Mailer;
use front_desk::notify::Notifier;
use front_desk::server::{router, AppState};
use front_desk::sheets::SheetsClient;
use front_desk::store::ConversationStore;

/// Abandoned calls are dropped from memory after this much inactivity.
const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(300);
const MAX_CALL_IDLE_MINUTES: i64 = 30;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting {} voice server...", BROKERAGE_NAME);
    let config = AppConfig::load()?;
    let roster = Arc::new(AgentRoster::default());

    let store = Arc::new(ConversationStore::new());
    ConversationStore::start_idle_sweeper(
        store.clone(),
        IDLE_SWEEP_INTERVAL,
        chrono::Duration::minutes(MAX_CALL_IDLE_MINUTES),
    );

    let assistant = Arc::new(AssistantClient::new(
        config.anthropic_model.clone(),
        config.anthropic_api_key.clone(),
        &roster,
    ));

    let calendar_auth = Arc::new(TokenProvider::new(
        config.google_credentials.clone(),
        SCOPE_CALENDAR,
    ));
    let calendar = Arc::new(CalendarClient::new(
        calendar_auth,
        config.google_calendar_id.clone(),
    ));

    let sheets_auth = Arc::new(TokenProvider::new(
        config.google_credentials.clone(),
        SCOPE_SHEETS,
    ));
    let sheets = SheetsClient::new(sheets_auth, config.google_sheet_id.clone());
    let mailer = Mailer::gmail(
        &config.gmail_address,
        &config.gmail_app_password,
        &config.notification_email,
    )?;
    let notifier = Arc::new(Notifier::new(mailer, sheets));

    info!("✓ Services ready (assistant model: {})", config.anthropic_model);

    let state = AppState {
        store,
        assistant,
        calendar,
        notifier,
        roster,
        base_url: config.base_url.clone(),
    };

    let app = router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    info!("🚀 Voice server ready on {}", addr);
    info!(
        "📞 Answering as {} (base url: {})",
        config.twilio_phone_number,
        if config.base_url.is_empty() {
            "NOT SET"
        } else {
            &config.base_url
        }
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
