use crate::models::Intent;

/// Keyword sets for caller-intent detection. Matching is case-insensitive
/// substring; the first matching category wins for that utterance
/// (buyer > seller > renter) and overwrites any previously detected intent.
const BUYER_KEYWORDS: &[&str] = &["buy", "buying", "purchase", "looking for a home", "find a house"];
const SELLER_KEYWORDS: &[&str] = &[
    "sell",
    "selling",
    "list",
    "listing",
    "value my home",
    "what is my home worth",
];
const RENTER_KEYWORDS: &[&str] = &[
    "rent",
    "rental",
    "lease",
    "tenant",
    "apartment",
    "property management",
];

/// Phrases that signal the caller is wrapping up the call.
const GOODBYE_KEYWORDS: &[&str] = &[
    "bye",
    "goodbye",
    "thank you",
    "thanks",
    "that is all",
    "that's all",
    "no thanks",
    "nothing else",
    "have a good day",
];

/// Phrases that signal the caller wants an appointment booked.
const APPOINTMENT_KEYWORDS: &[&str] = &[
    "appointment",
    "schedule",
    "showing",
    "consultation",
    "book",
    "meeting",
    "visit",
    "come in",
];

fn matches_any(utterance: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|w| utterance.contains(w))
}

/// Classify a single utterance. Returns the new intent, or the current one
/// unchanged when no keyword matches.
pub fn classify(utterance: &str, current: Option<Intent>) -> Option<Intent> {
    let utterance = utterance.to_lowercase();
    if matches_any(&utterance, BUYER_KEYWORDS) {
        Some(Intent::Buyer)
    } else if matches_any(&utterance, SELLER_KEYWORDS) {
        Some(Intent::Seller)
    } else if matches_any(&utterance, RENTER_KEYWORDS) {
        Some(Intent::Renter)
    } else {
        current
    }
}

pub fn is_goodbye(utterance: &str) -> bool {
    matches_any(&utterance.to_lowercase(), GOODBYE_KEYWORDS)
}

/// True if any recorded caller utterance mentioned setting up an appointment.
pub fn mentions_appointment(questions: &[String]) -> bool {
    questions
        .iter()
        .any(|q| matches_any(&q.to_lowercase(), APPOINTMENT_KEYWORDS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_category() {
        assert_eq!(classify("I'd like to purchase a condo", None), Some(Intent::Buyer));
        assert_eq!(classify("what is my home worth?", None), Some(Intent::Seller));
        assert_eq!(classify("Do you do property management?", None), Some(Intent::Renter));
    }

    #[test]
    fn buyer_wins_over_seller_in_one_utterance() {
        assert_eq!(
            classify("I need to sell my place and buy a bigger one", None),
            Some(Intent::Buyer)
        );
    }

    #[test]
    fn no_match_leaves_intent_unchanged() {
        assert_eq!(classify("what are your office hours", Some(Intent::Renter)), Some(Intent::Renter));
        assert_eq!(classify("what are your office hours", None), None);
    }

    #[test]
    fn later_match_overwrites_earlier_intent() {
        let first = classify("I want to rent something", None);
        let second = classify("actually I want to sell", first);
        assert_eq!(second, Some(Intent::Seller));
    }

    #[test]
    fn goodbye_detection_is_case_insensitive() {
        assert!(is_goodbye("Thank You so much"));
        assert!(is_goodbye("okay GOODBYE now"));
        assert!(is_goodbye("no thanks, that's all"));
        assert!(!is_goodbye("tell me about Winter Park"));
    }

    #[test]
    fn appointment_mentions_scan_the_whole_call() {
        let questions = vec![
            "what neighborhoods do you cover".to_string(),
            "could we Schedule a showing".to_string(),
        ];
        assert!(mentions_appointment(&questions));
        assert!(!mentions_appointment(&["just browsing".to_string()]));
    }
}
