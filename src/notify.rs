use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::error;

use crate::brokerage::{Agent, BROKERAGE_NAME, BUSINESS_TZ};
use crate::mailer::Mailer;
use crate::models::{Conversation, Intent};
use crate::sheets::SheetsClient;

/// -----------------------------
/// Notification Dispatcher
/// -----------------------------
/// Every notification fans out to two independent channels: a staff email
/// and a row in the call-log spreadsheet. Each channel is best effort; a
/// failure is logged and the other channel still runs. Nothing is retried
/// and nothing propagates to the caller.
pub struct Notifier {
    mailer: Mailer,
    sheets: SheetsClient,
}

impl Notifier {
    pub fn new(mailer: Mailer, sheets: SheetsClient) -> Self {
        Self { mailer, sheets }
    }

    /// Summarize a finished conversation for staff follow-up.
    pub async fn send_lead(
        &self,
        conversation: &Conversation,
        agent: Option<&Agent>,
        booked_slot: Option<DateTime<Tz>>,
    ) {
        let label = lead_label(conversation.intent);
        let subject = format!(
            "{} — {} from {}",
            BROKERAGE_NAME, label, conversation.caller_id
        );
        let body = lead_email_body(conversation, agent, booked_slot);

        if let Err(e) = self
            .sheets
            .append_call_row(
                &conversation.caller_id,
                label,
                conversation.intent.map(|i| i.as_str()),
                agent.map(|a| a.name).unwrap_or(""),
                &conversation.transcript(),
                "",
            )
            .await
        {
            error!("Sheets log error: {}", e);
        }

        if let Err(e) = self.mailer.send(&subject, &body).await {
            error!("Email error: {}", e);
        }
    }

    /// Forward a voicemail transcription with the call summary attached.
    pub async fn send_voicemail(&self, conversation: &Conversation, transcript: &str) {
        let subject = format!(
            "{} — Voicemail from {}",
            BROKERAGE_NAME, conversation.caller_id
        );
        let body = voicemail_email_body(conversation, transcript);

        if let Err(e) = self
            .sheets
            .append_call_row(
                &conversation.caller_id,
                "Voicemail",
                conversation.intent.map(|i| i.as_str()),
                "",
                &conversation.transcript(),
                transcript,
            )
            .await
        {
            error!("Sheets log error: {}", e);
        }

        if let Err(e) = self.mailer.send(&subject, &body).await {
            error!("Email error: {}", e);
        }
    }
}

/// Email subject tag for the detected intent.
pub fn lead_label(intent: Option<Intent>) -> &'static str {
    match intent {
        Some(Intent::Buyer) => "BUYER LEAD",
        Some(Intent::Seller) => "SELLER LEAD",
        Some(Intent::Renter) => "RENTAL INQUIRY",
        None => "NEW INQUIRY",
    }
}

fn lead_email_body(
    conversation: &Conversation,
    agent: Option<&Agent>,
    booked_slot: Option<DateTime<Tz>>,
) -> String {
    let now = Utc::now().with_timezone(&BUSINESS_TZ);
    let intent = conversation
        .intent
        .map(|i| i.as_str().to_uppercase())
        .unwrap_or_else(|| "GENERAL".to_string());

    let mut body = format!("{} — {}\n", lead_label(conversation.intent), BROKERAGE_NAME);
    body.push_str(&"=".repeat(50));
    body.push_str("\n\n");
    body.push_str(&format!("Caller Phone: {}\n", conversation.caller_id));
    body.push_str(&format!("Call Time: {}\n", now.format("%Y-%m-%d %I:%M %p ET")));
    body.push_str(&format!("Intent: {}\n", intent));
    if let Some(agent) = agent {
        body.push_str(&format!("Assigned Agent: {} ({})\n", agent.name, agent.role));
        body.push_str(&format!("Agent Phone: {}\n", agent.phone));
    }
    if let Some(slot) = booked_slot {
        body.push_str(&format!(
            "\nAPPOINTMENT BOOKED: {}\n",
            slot.format("%A, %B %d at %I:%M %p ET")
        ));
    }
    body.push_str(&format!(
        "\nCONVERSATION:\n{}\n{}\n{}\n",
        "-".repeat(50),
        conversation.transcript(),
        "-".repeat(50)
    ));
    body.push_str(&format!(
        "\nACTION: Call {} to follow up.\n",
        conversation.caller_id
    ));
    body
}

fn voicemail_email_body(conversation: &Conversation, transcript: &str) -> String {
    format!(
        "New Voicemail — {}\n\n{}\nMessage: {}",
        BROKERAGE_NAME,
        conversation.summary(),
        transcript
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokerage::AgentRoster;
    use chrono::TimeZone;

    fn seller_conversation() -> Conversation {
        let mut conv = Conversation::new("+14075550100");
        conv.record_question("I want to sell my house");
        conv.record_question("goodbye");
        conv
    }

    #[test]
    fn lead_labels_cover_every_intent() {
        assert_eq!(lead_label(Some(Intent::Buyer)), "BUYER LEAD");
        assert_eq!(lead_label(Some(Intent::Seller)), "SELLER LEAD");
        assert_eq!(lead_label(Some(Intent::Renter)), "RENTAL INQUIRY");
        assert_eq!(lead_label(None), "NEW INQUIRY");
    }

    #[test]
    fn seller_lead_body_names_agent_and_transcript() {
        let roster = AgentRoster::default();
        let conv = seller_conversation();
        assert_eq!(conv.intent, Some(Intent::Seller));

        let agent = conv.routed_agent(&roster).expect("seller routes");
        let body = lead_email_body(&conv, Some(agent), None);

        assert!(body.starts_with("SELLER LEAD"));
        assert!(body.contains("Caller Phone: +14075550100"));
        assert!(body.contains("Intent: SELLER"));
        assert!(body.contains(roster.sellers.name));
        assert!(body.contains("I want to sell my house"));
        assert!(body.contains("ACTION: Call +14075550100"));
        assert!(!body.contains("APPOINTMENT BOOKED"));
    }

    #[test]
    fn booked_slot_is_spelled_out_in_the_body() {
        let conv = seller_conversation();
        let slot = BUSINESS_TZ.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap();
        let body = lead_email_body(&conv, None, Some(slot));
        assert!(body.contains("APPOINTMENT BOOKED: Monday, August 10 at 09:00 AM ET"));
    }

    #[test]
    fn unknown_intent_reads_as_general() {
        let mut conv = Conversation::new("+14075550100");
        conv.record_question("hello there");
        let body = lead_email_body(&conv, None, None);
        assert!(body.starts_with("NEW INQUIRY"));
        assert!(body.contains("Intent: GENERAL"));
    }

    #[test]
    fn voicemail_body_includes_summary_and_message() {
        let conv = seller_conversation();
        let body = voicemail_email_body(&conv, "please call me back about the listing");
        assert!(body.contains("New Voicemail"));
        assert!(body.contains("Q1: I want to sell my house"));
        assert!(body.contains("Message: please call me back about the listing"));
    }
}
