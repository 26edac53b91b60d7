use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::brokerage::{self, AgentRoster};
use crate::models::Turn;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Replies are spoken, so keep them short.
const MAX_REPLY_TOKENS: u32 = 150;

/// What the caller hears when the language model is unreachable.
const FALLBACK_REPLY: &str =
    "Sorry, I'm having a little trouble right now. Please hold and someone will be right with you.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("assistant API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("assistant reply contained no text")]
    EmptyReply,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// -----------------------------
/// Assistant Responder (Anthropic Messages API)
/// -----------------------------
pub struct AssistantClient {
    client: Client,
    model: String,
    api_key: String,
    system_prompt: String,
}

impl AssistantClient {
    pub fn new(model: String, api_key: String, roster: &AgentRoster) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            model,
            api_key,
            system_prompt: receptionist_prompt(roster),
        }
    }

    pub fn fallback_reply() -> &'static str {
        FALLBACK_REPLY
    }

    /// Ask for the next spoken reply given the latest caller utterance and the
    /// full turn history. Errors degrade at the call site to the fallback line.
    pub async fn generate_reply(
        &self,
        utterance: &str,
        history: &[Turn],
    ) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_REPLY_TOKENS,
            system: &self.system_prompt,
            messages: build_messages(utterance, history),
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let reply: MessagesResponse = response.json().await?;
        reply
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(LlmError::EmptyReply)
    }
}

/// Convert the turn history for the wire, appending the new utterance unless
/// it is already the final recorded turn.
fn build_messages(utterance: &str, history: &[Turn]) -> Vec<ApiMessage> {
    let mut messages: Vec<ApiMessage> = history
        .iter()
        .map(|turn| ApiMessage {
            role: turn.role.as_str(),
            content: turn.content.clone(),
        })
        .collect();

    if messages.last().map(|m| m.content.as_str()) != Some(utterance) {
        messages.push(ApiMessage {
            role: "user",
            content: utterance.to_string(),
        });
    }

    messages
}

/// Remove formatting characters the model may emit despite instructions.
/// The reply is read aloud by text-to-speech, so a stray asterisk would be
/// spoken as the word "asterisk".
pub fn scrub_for_speech(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '*' | '#' | '_' | '~' | '`' | '[' | ']' | '(' | ')' | '>'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn receptionist_prompt(roster: &AgentRoster) -> String {
    let knowledge = brokerage::knowledge_base(roster);
    format!(
        r#"You are a friendly and professional receptionist for {name} in {city}.

CRITICAL FORMATTING RULE: Your response will be read aloud word-for-word by a text-to-speech phone system. You must NEVER use asterisks, markdown, bold, italics, bullet points, numbered lists, hashtags, underscores, or any special formatting characters. Write plain conversational sentences only.

IMPORTANT — USE THIS INFORMATION TO ANSWER ALL QUESTIONS:
{knowledge}

Communication Guidelines:
- Keep answers warm, natural, and brief — this is a phone call
- Speak like a real, knowledgeable person — not a robot
- Write in plain spoken English only — no formatting of any kind
- Always use the business information above for accurate answers
- If asked about something you don't know, say: "That's a great question — let me have one of our agents call you right back with those details."
- End responses naturally. Only ask a follow-up question when it makes sense — never robotically repeat "Is there anything else I can help you with?"

IMPORTANT GOAL: Your main job is to gather the caller's information and set up an appointment. For every caller, you should collect their name, confirm their phone number, and ask what day and time works best for them. Do this naturally within the conversation.

When a caller wants to BUY a home:
- Be enthusiastic and mention that buyer representation is FREE to them
- Ask their name and what type of home they are looking for
- Ask what day and time works best for a free consultation
- Offer to connect them with {buyers1} or {buyers2}

When a caller wants to SELL a home:
- Be enthusiastic and ask about their property
- Ask their name and mention our free home valuation
- Ask what day and time works best to meet with {sellers}

When a caller asks about RENTALS:
- Ask their name and what they are looking for
- Ask what day and time works best
- Offer to connect them with {rentals}

For ALL callers:
1. Get their name
2. Confirm their phone number by reading it back to them
3. Ask what day and time works best for an appointment or consultation
4. Let them know the appropriate agent will call to confirm

Always be warm, professional, and helpful. {name} serves all of Orlando and Central Florida."#,
        name = brokerage::BROKERAGE_NAME,
        city = brokerage::BROKERAGE_CITY,
        knowledge = knowledge,
        sellers = roster.sellers.name,
        rentals = roster.rentals.name,
        buyers1 = roster.buyers1.name,
        buyers2 = roster.buyers2.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Turn;

    #[test]
    fn scrubbing_removes_markup_and_collapses_whitespace() {
        assert_eq!(scrub_for_speech("*Hello* there"), "Hello there");
        assert_eq!(scrub_for_speech("# Welcome\n\nto  Bear Team"), "Welcome to Bear Team");
        assert_eq!(scrub_for_speech("call (407) 555-0100 [today]"), "call 407 555-0100 today");
        assert_eq!(scrub_for_speech("  plain already  "), "plain already");
    }

    #[test]
    fn new_utterance_is_appended_to_history() {
        let history = vec![Turn::user("hi"), Turn::assistant("hello!")];
        let messages = build_messages("I want to buy", &history);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[2].content, "I want to buy");
    }

    #[test]
    fn utterance_already_in_history_is_not_duplicated() {
        let history = vec![Turn::user("hi"), Turn::user("I want to buy")];
        let messages = build_messages("I want to buy", &history);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn prompt_embeds_the_knowledge_base() {
        let roster = AgentRoster::default();
        let prompt = receptionist_prompt(&roster);
        assert!(prompt.contains("text-to-speech"));
        assert!(prompt.contains("OFFICE INFORMATION"));
        assert!(prompt.contains(roster.buyers2.name));
    }
}
