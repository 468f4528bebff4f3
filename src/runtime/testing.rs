//! Mock implementations for testing
//!
//! These mocks enable orchestrator and router tests without real I/O.

use super::traits::RestaurantSource;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::places::{PlacesError, Venue};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful text response
    pub fn queue_text(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

/// Mock LLM service that sleeps before answering, echoing a counter so
/// interleaving is visible in the results
pub struct DelayedMockLlmService {
    delay: Duration,
    counter: Mutex<usize>,
}

impl DelayedMockLlmService {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            counter: Mutex::new(0),
        }
    }
}

#[async_trait]
impl LlmService for DelayedMockLlmService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let n = {
            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            *counter
        };
        tokio::time::sleep(self.delay).await;
        Ok(LlmResponse::text(format!("output {n}")))
    }

    fn model_id(&self) -> &str {
        "delayed-mock-model"
    }
}

// ============================================================================
// Mock Restaurant Source
// ============================================================================

/// Mock restaurant source with a fixed result
pub struct MockRestaurantSource {
    result: Mutex<Result<Vec<Venue>, PlacesError>>,
    /// Record of locations queried
    pub locations: Mutex<Vec<String>>,
}

impl MockRestaurantSource {
    pub fn with_venues(venues: Vec<Venue>) -> Self {
        Self {
            result: Mutex::new(Ok(venues)),
            locations: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_venues(Vec::new())
    }

    pub fn failing(error: PlacesError) -> Self {
        Self {
            result: Mutex::new(Err(error)),
            locations: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_locations(&self) -> Vec<String> {
        self.locations.lock().unwrap().clone()
    }
}

#[async_trait]
impl RestaurantSource for MockRestaurantSource {
    async fn find_restaurants(&self, location: &str) -> Result<Vec<Venue>, PlacesError> {
        self.locations.lock().unwrap().push(location.to_string());
        match &*self.result.lock().unwrap() {
            Ok(venues) => Ok(venues.clone()),
            Err(e) => Err(PlacesError::new(e.kind, e.message.clone())),
        }
    }
}

/// A rated, open venue for fixtures
pub fn venue(name: &str, address: &str, rating: f64) -> Venue {
    Venue {
        name: name.to_string(),
        address: address.to_string(),
        rating: Some(rating),
        total_ratings: 100,
        open_now: Some(true),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversationConfig;
    use crate::places::PlacesErrorKind;
    use crate::runtime::{AnswerOutcome, ConversationError, Orchestrator, RestaurantOutcome};
    use std::sync::Arc;

    struct Harness {
        llm: Arc<MockLlmService>,
        restaurants: Arc<MockRestaurantSource>,
        orchestrator: Arc<Orchestrator>,
    }

    fn harness_with(restaurants: MockRestaurantSource, config: ConversationConfig) -> Harness {
        let llm = Arc::new(MockLlmService::new());
        let restaurants = Arc::new(restaurants);
        let orchestrator = Arc::new(Orchestrator::new(
            llm.clone(),
            restaurants.clone(),
            config,
        ));
        Harness {
            llm,
            restaurants,
            orchestrator,
        }
    }

    fn harness(restaurants: MockRestaurantSource) -> Harness {
        harness_with(restaurants, ConversationConfig::default())
    }

    fn chinatown() -> Vec<Venue> {
        vec![
            venue("Pho Pasteur", "682 Washington St", 4.3),
            venue("Shabu-Zen", "16 Tyler St", 4.1),
            venue("Gourmet Dumpling House", "52 Beach St", 4.4),
            venue("Hei La Moon", "88 Beach St", 3.9),
        ]
    }

    /// Drive "u1" to Final with T=3
    async fn complete_conversation(h: &Harness) -> String {
        h.llm.queue_text("Q1: How are you feeling?");
        h.llm.queue_text("Q2: In a hurry?");
        h.llm.queue_text("Q3: Soup or dry?");
        h.llm.queue_text("A bowl of Vietnamese pho");

        h.orchestrator.start("u1").await.unwrap();
        h.orchestrator.answer("u1", "spicy").await.unwrap();
        h.orchestrator.answer("u1", "quick").await.unwrap();
        match h.orchestrator.answer("u1", "noodles").await.unwrap() {
            AnswerOutcome::Recommendation(r) => r,
            other => panic!("expected recommendation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mock_llm_service() {
        let mock = MockLlmService::new();
        mock.queue_text("Hello");

        let request = crate::prompts::opening_request();
        let response = mock.complete(&request).await.unwrap();
        assert_eq!(response.text, "Hello");

        // Second call should fail (no more responses)
        assert!(mock.complete(&request).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }

    /// Full walk: start, three answers, recommendation, restaurant shortlist
    #[tokio::test]
    async fn test_full_conversation_flow() {
        let h = harness(MockRestaurantSource::with_venues(chinatown()));

        h.llm.queue_text("Q1");
        assert_eq!(h.orchestrator.start("u1").await.unwrap(), "Q1");

        h.llm.queue_text("Q2");
        assert_eq!(
            h.orchestrator.answer("u1", "spicy").await.unwrap(),
            AnswerOutcome::NextQuestion("Q2".to_string())
        );

        h.llm.queue_text("Q3");
        assert_eq!(
            h.orchestrator.answer("u1", "quick").await.unwrap(),
            AnswerOutcome::NextQuestion("Q3".to_string())
        );

        h.llm.queue_text("Pho or ramen");
        assert_eq!(
            h.orchestrator.answer("u1", "noodles").await.unwrap(),
            AnswerOutcome::Recommendation("Pho or ramen".to_string())
        );

        assert_eq!(
            h.orchestrator.get_recommendation("u1").await.unwrap(),
            "Pho or ramen"
        );
        assert_eq!(
            h.orchestrator.get_recommendation("u1").await.unwrap(),
            "Pho or ramen"
        );

        let raw = r#"{"restaurants": [
            {"name": "Pho Pasteur", "address": "682 Washington St", "reason": "Pho"},
            {"name": "Shabu-Zen", "address": "16 Tyler St", "reason": "Broth"},
            {"name": "Gourmet Dumpling House", "address": "52 Beach St", "reason": "Noodles"},
            {"name": "Hei La Moon", "address": "88 Beach St", "reason": "Dim sum"}
        ]}"#;
        h.llm.queue_text(raw);

        match h
            .orchestrator
            .get_recommendation_restaurants("u1", "Boston")
            .await
            .unwrap()
        {
            RestaurantOutcome::Found {
                shortlist,
                raw_output,
                venues,
            } => {
                assert_eq!(shortlist.len(), 3);
                assert_eq!(shortlist[0].name, "Pho Pasteur");
                assert_eq!(raw_output, raw);
                assert_eq!(venues.len(), 4);
            }
            RestaurantOutcome::NoVenues => panic!("expected venues"),
        }
        assert_eq!(h.restaurants.recorded_locations(), ["Boston"]);

        // One call per start/answer plus the shortlist
        let requests = h.llm.recorded_requests();
        assert_eq!(requests.len(), 5);
        assert!(requests[3].system.contains("Q: Q3\nA: noodles"));
        assert!(requests[4].json_mode);
        assert!(requests[4].system.contains("Pho or ramen"));
    }

    #[tokio::test]
    async fn test_duplicate_start_rejected() {
        let h = harness(MockRestaurantSource::empty());
        h.llm.queue_text("Q1");
        h.orchestrator.start("u1").await.unwrap();

        assert!(matches!(
            h.orchestrator.start("u1").await,
            Err(ConversationError::AlreadyExists)
        ));
        // Rejected before any model call
        assert_eq!(h.llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_starts_only_one_wins() {
        let llm = Arc::new(DelayedMockLlmService::new(Duration::from_millis(20)));
        let orchestrator = Arc::new(Orchestrator::new(
            llm,
            Arc::new(MockRestaurantSource::empty()),
            ConversationConfig::default(),
        ));

        let a = tokio::spawn({
            let o = orchestrator.clone();
            async move { o.start("u1").await }
        });
        let b = tokio::spawn({
            let o = orchestrator.clone();
            async move { o.start("u1").await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(ConversationError::AlreadyExists))));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let h = harness(MockRestaurantSource::empty());

        assert!(matches!(
            h.orchestrator.get_recommendation("ghost").await,
            Err(ConversationError::NotFound)
        ));
        assert!(matches!(
            h.orchestrator.answer("u2", "hello").await,
            Err(ConversationError::NotFound)
        ));
        assert!(matches!(
            h.orchestrator
                .get_recommendation_restaurants("ghost", "Boston")
                .await,
            Err(ConversationError::NotFound)
        ));
        assert!(matches!(
            h.orchestrator.reset("ghost").await,
            Err(ConversationError::NotFound)
        ));
        assert_eq!(h.llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_recommendation_not_ready_before_final() {
        let h = harness(MockRestaurantSource::with_venues(chinatown()));
        h.llm.queue_text("Q1");
        h.orchestrator.start("u1").await.unwrap();

        assert!(matches!(
            h.orchestrator.get_recommendation("u1").await,
            Err(ConversationError::NotReady)
        ));
        assert!(matches!(
            h.orchestrator
                .get_recommendation_restaurants("u1", "Boston")
                .await,
            Err(ConversationError::NotReady)
        ));
        assert!(h.restaurants.recorded_locations().is_empty());
    }

    #[tokio::test]
    async fn test_answer_after_final_rejected() {
        let h = harness(MockRestaurantSource::empty());
        complete_conversation(&h).await;
        let calls = h.llm.call_count();

        assert!(matches!(
            h.orchestrator.answer("u1", "one more thing").await,
            Err(ConversationError::AlreadyComplete)
        ));
        assert_eq!(h.llm.call_count(), calls);

        let snapshot = h.orchestrator.snapshot("u1").await.unwrap();
        assert_eq!(snapshot.phase, "final");
        assert_eq!(snapshot.answers, ["spicy", "quick", "noodles"]);
        assert_eq!(snapshot.questions.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_start_stores_nothing() {
        let h = harness(MockRestaurantSource::empty());
        h.llm.queue_error(LlmError::server_error("upstream down"));

        assert!(matches!(
            h.orchestrator.start("u1").await,
            Err(ConversationError::Llm(_))
        ));
        assert_eq!(h.orchestrator.conversation_count().await, 0);

        // The user can try again
        h.llm.queue_text("Q1");
        assert_eq!(h.orchestrator.start("u1").await.unwrap(), "Q1");
    }

    #[tokio::test]
    async fn test_failed_answer_leaves_conversation_unchanged() {
        let h = harness(MockRestaurantSource::empty());
        h.llm.queue_text("Q1");
        h.orchestrator.start("u1").await.unwrap();

        h.llm.queue_error(LlmError::rate_limit("slow down"));
        assert!(matches!(
            h.orchestrator.answer("u1", "spicy").await,
            Err(ConversationError::Llm(_))
        ));

        let snapshot = h.orchestrator.snapshot("u1").await.unwrap();
        assert_eq!(snapshot.questions, ["Q1"]);
        assert!(snapshot.answers.is_empty());

        // Retrying the same answer works
        h.llm.queue_text("Q2");
        assert_eq!(
            h.orchestrator.answer("u1", "spicy").await.unwrap(),
            AnswerOutcome::NextQuestion("Q2".to_string())
        );
    }

    #[tokio::test]
    async fn test_concurrent_answers_stay_paired() {
        let llm = Arc::new(DelayedMockLlmService::new(Duration::from_millis(10)));
        let orchestrator = Arc::new(Orchestrator::new(
            llm,
            Arc::new(MockRestaurantSource::empty()),
            ConversationConfig {
                question_count: 5,
                idle_ttl: None,
            },
        ));
        orchestrator.start("u1").await.unwrap();

        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|answer| {
                let o = orchestrator.clone();
                tokio::spawn(async move { o.answer("u1", answer).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let snapshot = orchestrator.snapshot("u1").await.unwrap();
        assert_eq!(snapshot.phase, "questioning");
        assert_eq!(snapshot.answers.len(), 3);
        assert_eq!(snapshot.questions.len(), 4);

        let mut answers = snapshot.answers.clone();
        answers.sort();
        assert_eq!(answers, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_answer_queued_behind_reset_is_not_found() {
        let llm = Arc::new(DelayedMockLlmService::new(Duration::from_millis(50)));
        let orchestrator = Arc::new(Orchestrator::new(
            llm,
            Arc::new(MockRestaurantSource::empty()),
            ConversationConfig {
                question_count: 5,
                idle_ttl: None,
            },
        ));
        orchestrator.start("u1").await.unwrap();

        // Holds the slot for the length of one model call
        let first = tokio::spawn({
            let o = orchestrator.clone();
            async move { o.answer("u1", "a").await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let reset = tokio::spawn({
            let o = orchestrator.clone();
            async move { o.reset("u1").await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let late = tokio::spawn({
            let o = orchestrator.clone();
            async move { o.answer("u1", "b").await }
        });

        assert!(first.await.unwrap().is_ok());
        assert!(reset.await.unwrap().is_ok());
        assert!(matches!(
            late.await.unwrap(),
            Err(ConversationError::NotFound)
        ));
        assert!(matches!(
            orchestrator.snapshot("u1").await,
            Err(ConversationError::NotFound)
        ));
        assert_eq!(orchestrator.conversation_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_venues_skip_model() {
        let h = harness(MockRestaurantSource::empty());
        complete_conversation(&h).await;
        let calls = h.llm.call_count();

        assert_eq!(
            h.orchestrator
                .get_recommendation_restaurants("u1", "Nowhere")
                .await
                .unwrap(),
            RestaurantOutcome::NoVenues
        );
        assert_eq!(h.llm.call_count(), calls);
    }

    #[tokio::test]
    async fn test_malformed_shortlist_degrades_to_empty() {
        let h = harness(MockRestaurantSource::with_venues(chinatown()));
        complete_conversation(&h).await;
        h.llm.queue_text("Try Pho Pasteur, it's great!");

        match h
            .orchestrator
            .get_recommendation_restaurants("u1", "42.35,-71.06")
            .await
            .unwrap()
        {
            RestaurantOutcome::Found {
                shortlist,
                raw_output,
                venues,
            } => {
                assert!(shortlist.is_empty());
                assert_eq!(raw_output, "Try Pho Pasteur, it's great!");
                assert_eq!(venues.len(), 4);
            }
            RestaurantOutcome::NoVenues => panic!("expected venues"),
        }
    }

    #[tokio::test]
    async fn test_places_failure_propagates() {
        let h = harness(MockRestaurantSource::failing(PlacesError::geocode("Atlantis")));
        complete_conversation(&h).await;

        match h
            .orchestrator
            .get_recommendation_restaurants("u1", "Atlantis")
            .await
        {
            Err(ConversationError::Places(e)) => {
                assert_eq!(e.kind, PlacesErrorKind::GeocodeFailure);
            }
            other => panic!("expected places error, got {other:?}"),
        }
        // Conversation itself is untouched
        assert!(h.orchestrator.get_recommendation("u1").await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_allows_restart() {
        let h = harness(MockRestaurantSource::empty());
        complete_conversation(&h).await;

        h.orchestrator.reset("u1").await.unwrap();
        assert!(matches!(
            h.orchestrator.get_recommendation("u1").await,
            Err(ConversationError::NotFound)
        ));

        h.llm.queue_text("Fresh Q1");
        assert_eq!(h.orchestrator.start("u1").await.unwrap(), "Fresh Q1");
    }

    #[tokio::test]
    async fn test_single_question_threshold() {
        let h = harness_with(
            MockRestaurantSource::empty(),
            ConversationConfig {
                question_count: 1,
                idle_ttl: None,
            },
        );
        h.llm.queue_text("Q1");
        h.llm.queue_text("Tacos");
        h.orchestrator.start("u1").await.unwrap();

        assert_eq!(
            h.orchestrator.answer("u1", "hungry").await.unwrap(),
            AnswerOutcome::Recommendation("Tacos".to_string())
        );
    }

    #[tokio::test]
    async fn test_sweep_respects_policy() {
        let never = harness(MockRestaurantSource::empty());
        never.llm.queue_text("Q1");
        never.orchestrator.start("u1").await.unwrap();
        assert_eq!(never.orchestrator.sweep().await, 0);

        let idle = harness_with(
            MockRestaurantSource::empty(),
            ConversationConfig {
                question_count: 3,
                idle_ttl: Some(Duration::ZERO),
            },
        );
        idle.llm.queue_text("Q1");
        idle.orchestrator.start("u1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(idle.orchestrator.sweep().await, 1);
        assert_eq!(idle.orchestrator.conversation_count().await, 0);
    }
}
