use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::brokerage::{Agent, AgentRoster, BUSINESS_TZ};
use crate::intent;

/// Escalate to a human follow-up once a call reaches this many caller turns.
pub const ESCALATION_TURN_LIMIT: u32 = 8;

/// Represents the role of a conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// A single turn of the phone conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Classified purpose of the caller, overwritten on each matching utterance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Buyer,
    Seller,
    Renter,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Buyer => "buyer",
            Intent::Seller => "seller",
            Intent::Renter => "renter",
        }
    }
}

/// State of one active phone call, keyed by the provider call id.
///
/// `turn_count` always equals `questions.len()`: both advance together in
/// [`Conversation::record_question`].
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub caller_id: String,
    pub turn_count: u32,
    pub history: Vec<Turn>,
    pub questions: Vec<String>,
    pub intent: Option<Intent>,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Conversation {
    pub fn new(caller_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            caller_id: caller_id.into(),
            turn_count: 0,
            history: Vec::new(),
            questions: Vec::new(),
            intent: None,
            started_at: now,
            last_activity: now,
        }
    }

    /// Record a caller utterance: bump the turn count, append it to both the
    /// question log and the model history, and re-run intent detection.
    pub fn record_question(&mut self, question: &str) {
        self.turn_count += 1;
        self.questions.push(question.to_string());
        self.history.push(Turn::user(question));
        self.intent = intent::classify(question, self.intent);
        self.last_activity = Utc::now();
    }

    /// Record the assistant's spoken reply.
    pub fn record_reply(&mut self, reply: &str) {
        self.history.push(Turn::assistant(reply));
        self.last_activity = Utc::now();
    }

    pub fn should_escalate(&self) -> bool {
        self.turn_count >= ESCALATION_TURN_LIMIT
    }

    /// Pick the agent who should follow up, based on the detected intent.
    /// Buyer leads alternate between the two buyer agents on turn-count parity.
    pub fn routed_agent<'a>(&self, roster: &'a AgentRoster) -> Option<&'a Agent> {
        match self.intent {
            Some(Intent::Seller) => Some(&roster.sellers),
            Some(Intent::Renter) => Some(&roster.rentals),
            Some(Intent::Buyer) => {
                if self.turn_count % 2 == 0 {
                    Some(&roster.buyers1)
                } else {
                    Some(&roster.buyers2)
                }
            }
            None => None,
        }
    }

    /// Short call summary used for voicemail notifications.
    pub fn summary(&self) -> String {
        let now = Utc::now().with_timezone(&BUSINESS_TZ);
        let mut summary = format!(
            "Caller: {}\nTime: {}\nIntent: {}\n\n",
            self.caller_id,
            now.format("%Y-%m-%d %H:%M:%S"),
            self.intent.map(|i| i.as_str()).unwrap_or("Unknown"),
        );
        for (i, question) in self.questions.iter().enumerate() {
            summary.push_str(&format!("Q{}: {}\n", i + 1, question));
        }
        summary
    }

    /// Every caller utterance, one per line, oldest first.
    pub fn transcript(&self) -> String {
        self.questions.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokerage::AgentRoster;

    #[test]
    fn turn_count_tracks_question_log() {
        let mut conv = Conversation::new("+14075550100");
        for i in 0..5 {
            conv.record_question(&format!("question number {i}"));
            conv.record_reply("noted");
        }
        assert_eq!(conv.turn_count, 5);
        assert_eq!(conv.turn_count as usize, conv.questions.len());
        // History holds both sides, questions only the caller's.
        assert_eq!(conv.history.len(), 10);
    }

    #[test]
    fn intent_is_last_match_wins() {
        let mut conv = Conversation::new("+14075550100");
        conv.record_question("I want to rent something");
        assert_eq!(conv.intent, Some(Intent::Renter));
        conv.record_question("actually I want to sell");
        assert_eq!(conv.intent, Some(Intent::Seller));
    }

    #[test]
    fn unmatched_utterance_keeps_prior_intent() {
        let mut conv = Conversation::new("+14075550100");
        conv.record_question("what is my home worth these days");
        conv.record_question("what are your office hours");
        assert_eq!(conv.intent, Some(Intent::Seller));
    }

    #[test]
    fn escalates_exactly_at_turn_limit() {
        let mut conv = Conversation::new("+14075550100");
        for i in 0..7 {
            conv.record_question(&format!("tell me more {i}"));
            assert!(!conv.should_escalate(), "escalated early at turn {}", i + 1);
        }
        conv.record_question("one more thing");
        assert!(conv.should_escalate());
    }

    #[test]
    fn buyer_routing_alternates_on_turn_parity() {
        let roster = AgentRoster::default();

        let mut conv = Conversation::new("+14075550100");
        conv.record_question("I'm looking to buy");
        conv.record_question("something near downtown");
        let agent = conv.routed_agent(&roster).expect("buyer should route");
        assert_eq!(agent.name, roster.buyers1.name);

        conv.record_question("with a pool");
        let agent = conv.routed_agent(&roster).expect("buyer should route");
        assert_eq!(agent.name, roster.buyers2.name);
    }

    #[test]
    fn seller_and_renter_route_to_fixed_agents() {
        let roster = AgentRoster::default();

        let mut conv = Conversation::new("+14075550100");
        conv.record_question("I want to sell my house");
        assert_eq!(
            conv.routed_agent(&roster).map(|a| a.name),
            Some(roster.sellers.name)
        );

        let mut conv = Conversation::new("+14075550101");
        conv.record_question("do you have any apartments available");
        assert_eq!(
            conv.routed_agent(&roster).map(|a| a.name),
            Some(roster.rentals.name)
        );
    }

    #[test]
    fn no_intent_routes_nowhere() {
        let roster = AgentRoster::default();
        let mut conv = Conversation::new("+14075550100");
        for i in 0..8 {
            conv.record_question(&format!("unrelated chatter {i}"));
        }
        assert!(conv.should_escalate());
        assert_eq!(conv.intent, None);
        assert!(conv.routed_agent(&roster).is_none());
    }

    #[test]
    fn summary_numbers_the_questions() {
        let mut conv = Conversation::new("+14075550100");
        conv.record_question("first thing");
        conv.record_question("second thing");
        let summary = conv.summary();
        assert!(summary.contains("Caller: +14075550100"));
        assert!(summary.contains("Q1: first thing"));
        assert!(summary.contains("Q2: second thing"));
        assert_eq!(conv.transcript(), "first thing\nsecond thing");
    }
}
