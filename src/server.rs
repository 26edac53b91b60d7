use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::assistant::{self, AssistantClient};
use crate::brokerage::{AgentRoster, BROKERAGE_CITY, BROKERAGE_NAME};
use crate::calendar::CalendarClient;
use crate::intent;
use crate::models::Conversation;
use crate::notify::Notifier;
use crate::store::ConversationStore;
use crate::twiml::VoiceResponse;

/// How far ahead to look for an open appointment slot.
const BOOKING_HORIZON_DAYS: i64 = 5;

/// How long the re-opened gather waits for the caller to keep talking.
const GATHER_TIMEOUT_SECS: u32 = 8;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConversationStore>,
    pub assistant: Arc<AssistantClient>,
    pub calendar: Arc<CalendarClient>,
    pub notifier: Arc<Notifier>,
    pub roster: Arc<AgentRoster>,
    pub base_url: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Deserialize)]
struct CallStart {
    #[serde(rename = "From", default = "unknown")]
    from: String,
    #[serde(rename = "CallSid", default = "unknown")]
    call_sid: String,
}

#[derive(Debug, Deserialize)]
struct SpeechInput {
    #[serde(rename = "CallSid", default = "unknown")]
    call_sid: String,
    #[serde(rename = "From", default = "unknown")]
    from: String,
    #[serde(rename = "SpeechResult", default)]
    speech_result: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionInput {
    #[serde(rename = "CallSid", default = "unknown")]
    call_sid: String,
    #[serde(rename = "TranscriptionText", default)]
    transcription_text: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/status", get(status))
        .route("/voice", get(handle_incoming_call).post(handle_incoming_call))
        .route("/process_speech", post(process_speech))
        .route("/handle_voicemail", post(handle_voicemail))
        .route("/handle_transcription", post(handle_transcription))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Call start: greet, open a speech gather, and loop back to the greeting if
/// the provider captures nothing.
async fn handle_incoming_call(
    State(state): State<AppState>,
    Form(params): Form<CallStart>,
) -> VoiceResponse {
    state.store.ensure(&params.call_sid, &params.from).await;
    info!("Incoming call {} from {}", params.call_sid, params.from);

    VoiceResponse::new()
        .say(&format!(
            "Thank you for calling {} in Orlando! How can I help you today?",
            BROKERAGE_NAME
        ))
        .gather_speech(&format!("{}/process_speech", state.base_url), None)
        .redirect(&format!("{}/voice", state.base_url))
}

/// One caller utterance: record it, answer it, and decide whether to keep
/// listening or hand the call off to a human.
async fn process_speech(
    State(state): State<AppState>,
    Form(params): Form<SpeechInput>,
) -> VoiceResponse {
    let utterance = params.speech_result.trim();
    if utterance.is_empty() {
        return VoiceResponse::new()
            .say("Sorry, I didn't catch that. Could you repeat that?")
            .redirect(&format!("{}/voice", state.base_url));
    }

    let conversation = state
        .store
        .record_question(&params.call_sid, &params.from, utterance)
        .await;

    let reply = match state
        .assistant
        .generate_reply(utterance, &conversation.history)
        .await
    {
        Ok(reply) => assistant::scrub_for_speech(&reply),
        Err(e) => {
            error!("Assistant error on call {}: {}", params.call_sid, e);
            AssistantClient::fallback_reply().to_string()
        }
    };
    state.store.record_reply(&params.call_sid, &reply).await;

    if intent::is_goodbye(utterance) || conversation.should_escalate() {
        escalate(&state, &params.call_sid, &conversation).await;
        return VoiceResponse::new()
            .say(&reply)
            .say(&format!(
                "Thanks for calling {}! Have a great day!",
                BROKERAGE_NAME
            ))
            .hangup();
    }

    VoiceResponse::new()
        .say(&reply)
        .gather_speech(
            &format!("{}/process_speech", state.base_url),
            Some(GATHER_TIMEOUT_SECS),
        )
        .say(&format!(
            "Are you still there? If not, thanks for calling {}!",
            BROKERAGE_NAME
        ))
        .hangup()
}

/// Hand off to humans: route an agent by intent, book a slot when the caller
/// asked for one, send the lead notification, and evict the call record.
/// Side effects run once, synchronously; individual failures degrade and are
/// only logged.
async fn escalate(state: &AppState, call_sid: &str, conversation: &Conversation) {
    let agent = conversation.routed_agent(&state.roster);

    let mut booked_slot = None;
    if intent::mentions_appointment(&conversation.questions) {
        let slots = match state.calendar.open_slots(BOOKING_HORIZON_DAYS).await {
            Ok(slots) => slots,
            Err(e) => {
                error!("Calendar slots error: {}", e);
                Vec::new()
            }
        };
        if let Some(slot) = slots.first().copied() {
            if let Err(e) = state
                .calendar
                .book(&conversation.caller_id, slot, agent, conversation.intent)
                .await
            {
                error!("Calendar booking error: {}", e);
            }
            booked_slot = Some(slot);
        }
    }

    state
        .notifier
        .send_lead(conversation, agent, booked_slot)
        .await;
    state.store.remove(call_sid).await;
    info!(
        "Escalated call {} after {} turn(s)",
        call_sid, conversation.turn_count
    );
}

/// Terminal voicemail acknowledgment.
async fn handle_voicemail() -> VoiceResponse {
    VoiceResponse::new()
        .say("Thank you! We'll call you back as soon as possible. Have a great day!")
        .hangup()
}

/// Voicemail transcription callback: forward it to staff if the call is
/// still known, then evict the record.
async fn handle_transcription(
    State(state): State<AppState>,
    Form(params): Form<TranscriptionInput>,
) -> StatusCode {
    if let Some(conversation) = state.store.remove(&params.call_sid).await {
        state
            .notifier
            .send_voicemail(&conversation, &params.transcription_text)
            .await;
    }
    StatusCode::OK
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    let base_url = if state.base_url.is_empty() {
        "NOT SET"
    } else {
        &state.base_url
    };
    Json(json!({
        "status": "running",
        "brokerage": BROKERAGE_NAME,
        "base_url": base_url,
    }))
}

async fn home() -> Json<Value> {
    Json(json!({
        "message": format!("{} — {} — AI Phone System", BROKERAGE_NAME, BROKERAGE_CITY),
    }))
}
