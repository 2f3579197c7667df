//! Planner session state
//!
//! Holds what the rest of the crate treats as "the conversation": the active
//! trip (if one has been submitted), a bounded chat transcript, and the last
//! processed input used for duplicate suppression. Purely in-memory; one
//! session per server process.

use std::collections::VecDeque;

use crate::models::{ChatMessage, ChatRole, TripRequest};

/// In-memory session for one planning conversation
#[derive(Debug)]
pub struct PlannerSession {
    /// Active trip, once the preference form has been submitted
    trip: Option<TripRequest>,
    /// Bounded chat transcript, oldest first
    transcript: VecDeque<ChatMessage>,
    /// Maximum retained transcript entries
    history_limit: usize,
    /// Literal text of the most recently processed input
    last_processed_input: Option<String>,
}

impl PlannerSession {
    /// Create an empty session retaining at most `history_limit` messages.
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self {
            trip: None,
            transcript: VecDeque::new(),
            history_limit: history_limit.max(2),
            last_processed_input: None,
        }
    }

    /// Replace the active trip. Duplicate suppression resets so the same
    /// question can be asked again about the new trip.
    pub fn set_trip(&mut self, trip: TripRequest) {
        self.trip = Some(trip);
        self.last_processed_input = None;
    }

    #[must_use]
    pub fn trip(&self) -> Option<&TripRequest> {
        self.trip.as_ref()
    }

    /// Record `input` as processed. Returns false when it repeats the
    /// previously processed input verbatim, in which case the caller should
    /// reuse the existing reply instead of re-running the pipeline.
    pub fn begin_input(&mut self, input: &str) -> bool {
        if self.last_processed_input.as_deref() == Some(input) {
            return false;
        }
        self.last_processed_input = Some(input.to_string());
        true
    }

    /// Append a message, evicting the oldest entries beyond the limit.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.transcript.push_back(message);
        while self.transcript.len() > self.history_limit {
            self.transcript.pop_front();
        }
    }

    /// Transcript in chronological order.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.transcript.iter()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    /// Most recent assistant reply, if any.
    #[must_use]
    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|message| message.role == ChatRole::Assistant)
            .map(|message| message.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodPreference, TransportMode};
    use chrono::NaiveDate;

    fn sample_trip() -> TripRequest {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        TripRequest::new(
            "Paris",
            "45000",
            2,
            start,
            start + chrono::Days::new(2),
            vec![],
            TransportMode::Flight,
            FoodPreference::Vegetarian,
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_input_suppressed() {
        let mut session = PlannerSession::new(10);
        assert!(session.begin_input("best cafes?"));
        assert!(!session.begin_input("best cafes?"));
        assert!(session.begin_input("best bars?"));
        // The older input may be asked again once something else intervened
        assert!(session.begin_input("best cafes?"));
    }

    #[test]
    fn test_set_trip_resets_duplicate_suppression() {
        let mut session = PlannerSession::new(10);
        assert!(session.begin_input("what should I pack?"));
        session.set_trip(sample_trip());
        assert!(session.begin_input("what should I pack?"));
    }

    #[test]
    fn test_transcript_is_bounded() {
        let mut session = PlannerSession::new(4);
        for i in 0..10 {
            session.push_message(ChatMessage::user(format!("message {i}")));
        }
        assert_eq!(session.message_count(), 4);
        let first = session.messages().next().unwrap();
        assert_eq!(first.text, "message 6");
    }

    #[test]
    fn test_minimum_history_limit_keeps_one_exchange() {
        let mut session = PlannerSession::new(0);
        session.push_message(ChatMessage::user("q"));
        session.push_message(ChatMessage::assistant("a"));
        assert_eq!(session.message_count(), 2);
    }

    #[test]
    fn test_last_assistant_reply() {
        let mut session = PlannerSession::new(10);
        assert!(session.last_assistant_reply().is_none());

        session.push_message(ChatMessage::user("hello"));
        session.push_message(ChatMessage::assistant("hi there"));
        session.push_message(ChatMessage::user("thanks"));
        assert_eq!(session.last_assistant_reply(), Some("hi there"));
    }
}
