use std::sync::Arc;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::brokerage::BUSINESS_TZ;
use crate::google_auth::{GoogleAuthError, TokenProvider};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Column layout of the call log, row 1.
const HEADER: [&str; 8] = [
    "Date",
    "Time",
    "Caller Phone",
    "Call Type",
    "Intent",
    "Assigned Agent",
    "Conversation",
    "Voicemail",
];

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error(transparent)]
    Auth(#[from] GoogleAuthError),
    #[error("spreadsheet request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("spreadsheet API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// -----------------------------
/// Call Log (Google Sheets v4)
/// -----------------------------
pub struct SheetsClient {
    client: Client,
    auth: Arc<TokenProvider>,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(auth: Arc<TokenProvider>, spreadsheet_id: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            auth,
            spreadsheet_id,
        }
    }

    /// Append one call to the log sheet. Inserts the header row first when
    /// cell A1 does not already hold it (idempotent init; the check and the
    /// append are not atomic, which is acceptable at phone-call volume).
    pub async fn append_call_row(
        &self,
        caller_id: &str,
        call_type: &str,
        intent: Option<&str>,
        agent_name: &str,
        conversation: &str,
        voicemail: &str,
    ) -> Result<(), SheetsError> {
        if self.first_header_cell().await?.as_deref() != Some(HEADER[0]) {
            self.insert_header_row().await?;
        }

        let now = Utc::now().with_timezone(&BUSINESS_TZ);
        let row = vec![
            now.format("%Y-%m-%d").to_string(),
            now.format("%I:%M %p ET").to_string(),
            caller_id.to_string(),
            call_type.to_string(),
            intent.unwrap_or("General").to_string(),
            agent_name.to_string(),
            conversation.to_string(),
            voicemail.to_string(),
        ];
        debug_assert_eq!(row.len(), HEADER.len());

        let token = self.auth.bearer_token().await?;
        let url = format!(
            "{}/{}/values/Sheet1!A1:append",
            SHEETS_API, self.spreadsheet_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({"values": [row]}))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, body });
        }

        info!("Logged: {} from {}", call_type, caller_id);
        Ok(())
    }

    async fn first_header_cell(&self) -> Result<Option<String>, SheetsError> {
        let token = self.auth.bearer_token().await?;
        let url = format!("{}/{}/values/Sheet1!A1", SHEETS_API, self.spreadsheet_id);

        let response = self.client.get(&url).bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, body });
        }

        let range: ValueRange = response.json().await?;
        Ok(range
            .values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next()))
    }

    async fn insert_header_row(&self) -> Result<(), SheetsError> {
        let token = self.auth.bearer_token().await?;

        // Shift existing rows down, then write the header into the new row 1.
        let url = format!("{}/{}:batchUpdate", SHEETS_API, self.spreadsheet_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({
                "requests": [{
                    "insertDimension": {
                        "range": {"sheetId": 0, "dimension": "ROWS", "startIndex": 0, "endIndex": 1},
                        "inheritFromBefore": false,
                    }
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, body });
        }

        let url = format!(
            "{}/{}/values/Sheet1!A1:H1",
            SHEETS_API, self.spreadsheet_id
        );
        let response = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({"values": [HEADER]}))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, body });
        }

        Ok(())
    }
}
