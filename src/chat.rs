//! Chat surface
//!
//! One turn of the travel-assistant conversation: duplicate suppression,
//! trip-aware prompt construction, the model call, and transcript bookkeeping.
//! Model failures surface as a fixed apology message rather than an error so
//! the conversation keeps its shape.

use tracing::{debug, instrument, warn};

use crate::llm::ModelBackend;
use crate::models::ChatMessage;
use crate::prompt;
use crate::sanitize::sanitize;
use crate::session::PlannerSession;

/// Reply shown when the model call fails mid-conversation.
pub const CHAT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Run one chat turn and return the assistant's reply.
///
/// A query identical to the previous one is not re-sent to the model; the
/// existing reply is returned unchanged.
#[instrument(skip(backend, session, query), fields(query_len = query.len()))]
pub async fn chat_turn(
    backend: &dyn ModelBackend,
    session: &mut PlannerSession,
    query: &str,
) -> String {
    let query = sanitize(query);

    if !session.begin_input(&query) {
        debug!("Duplicate query, replaying previous reply");
        return session
            .last_assistant_reply()
            .unwrap_or(CHAT_APOLOGY)
            .to_string();
    }

    session.push_message(ChatMessage::user(query.clone()));

    let prompt = prompt::chat_prompt(session.trip(), &query);
    let reply = match backend.generate(&prompt).await {
        Ok(text) => sanitize(text.trim()),
        Err(e) => {
            warn!("Chat model call failed: {}", e);
            CHAT_APOLOGY.to_string()
        }
    };

    session.push_message(ChatMessage::assistant(reply.clone()));
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatRole, FoodPreference, TransportMode, TripRequest};
    use crate::{Result, VoyageMindError};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that counts calls and echoes a canned reply
    struct CountingBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingBackend {
        fn new(fail: bool) -> Self {
            Self { calls: AtomicUsize::new(0), fail }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelBackend for CountingBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(VoyageMindError::transport("model unavailable"))
            } else {
                Ok("Try the left bank cafes.".to_string())
            }
        }
    }

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

    #[tokio::test]
    async fn test_chat_turn_records_both_sides() {
        let backend = CountingBackend::new(false);
        let mut session = PlannerSession::new(10);

        let reply = chat_turn(&backend, &mut session, "Where should I eat?").await;
        assert_eq!(reply, "Try the left bank cafes.");
        assert_eq!(session.message_count(), 2);

        let roles: Vec<ChatRole> = session.messages().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
    }

    #[tokio::test]
    async fn test_duplicate_query_skips_model() {
        let backend = CountingBackend::new(false);
        let mut session = PlannerSession::new(10);

        let first = chat_turn(&backend, &mut session, "Where should I eat?").await;
        let second = chat_turn(&backend, &mut session, "Where should I eat?").await;

        assert_eq!(first, second);
        assert_eq!(backend.call_count(), 1);
        assert_eq!(session.message_count(), 2);
    }

    #[tokio::test]
    async fn test_model_failure_yields_apology() {
        let backend = CountingBackend::new(true);
        let mut session = PlannerSession::new(10);

        let reply = chat_turn(&backend, &mut session, "Where should I eat?").await;
        assert_eq!(reply, CHAT_APOLOGY);
        // The apology still lands in the transcript
        assert_eq!(session.last_assistant_reply(), Some(CHAT_APOLOGY));
    }

    #[tokio::test]
    async fn test_query_is_sanitized_before_dedup_and_prompt() {
        let backend = CountingBackend::new(false);
        let mut session = PlannerSession::new(10);
        session.set_trip(sample_trip());

        chat_turn(&backend, &mut session, "Is ₹5000 enough per day?").await;
        // Same query with the glyph already replaced counts as a duplicate
        chat_turn(&backend, &mut session, "Is Rs.5000 enough per day?").await;
        assert_eq!(backend.call_count(), 1);

        let user_message = session.messages().next().unwrap();
        assert!(user_message.text.chars().all(|c| (c as u32) < 128));
    }
}
