//! Runtime for executing conversations
//!
//! The [`Orchestrator`] owns the conversation store and drives the pure state
//! machine, executing the model calls it asks for. Mutations of one user's
//! conversation are serialized by that conversation's slot mutex.

pub mod store;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use store::{ConversationStore, EvictionPolicy, IdleTimeout, NeverEvict};
pub use traits::*;

use crate::config::ConversationConfig;
use crate::llm::{LlmError, LlmService};
use crate::places::{PlacesError, Venue};
use crate::prompts;
use crate::shortlist::{parse_shortlist, ShortlistEntry};
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, TransitionError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors surfaced by conversation operations
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Conversation already exists for this user")]
    AlreadyExists,
    #[error("Conversation not found")]
    NotFound,
    #[error("Conversation is not yet complete")]
    NotReady,
    #[error("Conversation is already complete")]
    AlreadyComplete,
    #[error("Text generation failed: {0}")]
    Llm(#[from] LlmError),
    #[error("Restaurant lookup failed: {0}")]
    Places(#[from] PlacesError),
    #[error(transparent)]
    Transition(TransitionError),
}

impl From<TransitionError> for ConversationError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::ConversationComplete => ConversationError::AlreadyComplete,
            other @ TransitionError::InvalidTransition(_) => ConversationError::Transition(other),
        }
    }
}

/// What an answer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    NextQuestion(String),
    Recommendation(String),
}

/// Result of matching the recommendation against nearby venues
#[derive(Debug, Clone, PartialEq)]
pub enum RestaurantOutcome {
    /// The search came back empty; no model call was made
    NoVenues,
    Found {
        /// Parsed picks, empty if the model's JSON was unusable
        shortlist: Vec<ShortlistEntry>,
        /// The model's output as returned
        raw_output: String,
        venues: Vec<Venue>,
    },
}

/// Read-only view of one conversation
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub user_id: String,
    pub phase: &'static str,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Orchestrator {
    store: ConversationStore,
    llm: Arc<dyn LlmService>,
    restaurants: Arc<dyn RestaurantSource>,
    question_count: usize,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmService>,
        restaurants: Arc<dyn RestaurantSource>,
        config: ConversationConfig,
    ) -> Self {
        let eviction: Arc<dyn EvictionPolicy> = match config.idle_ttl {
            Some(ttl) => Arc::new(IdleTimeout { ttl }),
            None => Arc::new(NeverEvict),
        };
        Self {
            store: ConversationStore::new(eviction),
            llm,
            restaurants,
            question_count: config.question_count,
        }
    }

    fn context(&self, user_id: &str) -> ConvContext {
        ConvContext::new(user_id, self.question_count)
    }

    /// Open a conversation and return its first question
    pub async fn start(&self, user_id: &str) -> Result<String, ConversationError> {
        let (slot, mut guard) = self
            .store
            .reserve(user_id)
            .await
            .ok_or(ConversationError::AlreadyExists)?;

        match self.llm.complete(&prompts::opening_request()).await {
            Ok(response) => {
                guard.commit(ConvState::new(response.text.clone()));
                tracing::info!(user_id, "Conversation started");
                Ok(response.text)
            }
            Err(e) => {
                // Still holding the slot, so nobody observes a half-made conversation
                self.store.remove(user_id, &slot).await;
                tracing::warn!(user_id, error = %e, "Opening question failed, conversation discarded");
                Err(e.into())
            }
        }
    }

    /// Record an answer and return the next question or the recommendation.
    /// On any failure the conversation is left as it was.
    pub async fn answer(&self, user_id: &str, text: &str) -> Result<AnswerOutcome, ConversationError> {
        let slot = self
            .store
            .get(user_id)
            .await
            .ok_or(ConversationError::NotFound)?;
        let mut slot = slot.lock().await;
        let Some(mut state) = slot.state.clone() else {
            return Err(ConversationError::NotFound);
        };

        let context = self.context(user_id);
        let mut pending = vec![Event::UserAnswer {
            text: text.to_string(),
        }];

        while let Some(event) = pending.pop() {
            let result = transition(&state, &context, event)?;
            state = result.new_state;
            for effect in result.effects {
                pending.push(self.execute_effect(effect).await?);
            }
        }

        let outcome = match &state {
            ConvState::Questioning { .. } => state
                .pending_question()
                .map(|q| AnswerOutcome::NextQuestion(q.to_string()))
                .ok_or_else(|| {
                    ConversationError::Transition(TransitionError::InvalidTransition(
                        "questioning without a question".to_string(),
                    ))
                })?,
            ConvState::Final { recommendation, .. } => {
                AnswerOutcome::Recommendation(recommendation.clone())
            }
        };

        tracing::info!(
            user_id = %context.user_id,
            phase = state.phase(),
            answered = state.answers().len(),
            "Answer recorded"
        );
        slot.commit(state);
        Ok(outcome)
    }

    async fn execute_effect(&self, effect: Effect) -> Result<Event, LlmError> {
        match effect {
            Effect::RequestQuestion { answer, request } => {
                let response = self.llm.complete(&request).await?;
                Ok(Event::QuestionGenerated {
                    answer,
                    question: response.text,
                })
            }
            Effect::RequestRecommendation { answer, request } => {
                let response = self.llm.complete(&request).await?;
                Ok(Event::RecommendationGenerated {
                    answer,
                    recommendation: response.text,
                })
            }
        }
    }

    /// The stored recommendation, once the conversation is final
    pub async fn get_recommendation(&self, user_id: &str) -> Result<String, ConversationError> {
        let slot = self
            .store
            .get(user_id)
            .await
            .ok_or(ConversationError::NotFound)?;
        let mut slot = slot.lock().await;
        slot.touch();

        match &slot.state {
            None => Err(ConversationError::NotFound),
            Some(state) => state
                .recommendation()
                .map(str::to_string)
                .ok_or(ConversationError::NotReady),
        }
    }

    /// Find venues near `location` and ask the model which best fit the
    /// recommendation
    pub async fn get_recommendation_restaurants(
        &self,
        user_id: &str,
        location: &str,
    ) -> Result<RestaurantOutcome, ConversationError> {
        // Lock released here; the lookups below never touch conversation state
        let recommendation = self.get_recommendation(user_id).await?;

        let venues = self.restaurants.find_restaurants(location).await?;
        if venues.is_empty() {
            tracing::info!(user_id, location, "No venues found, skipping shortlist");
            return Ok(RestaurantOutcome::NoVenues);
        }

        let request = prompts::shortlist_request(&recommendation, &venues);
        let response = self.llm.complete(&request).await?;

        let shortlist = match parse_shortlist(&response.text) {
            Ok(shortlist) => shortlist,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Unusable shortlist output, returning empty shortlist");
                Vec::new()
            }
        };

        Ok(RestaurantOutcome::Found {
            shortlist,
            raw_output: response.text,
            venues,
        })
    }

    /// Stateless venue search
    pub async fn search_restaurants(&self, location: &str) -> Result<Vec<Venue>, PlacesError> {
        self.restaurants.find_restaurants(location).await
    }

    /// Forget a conversation so the user can start over. Waits for any
    /// in-flight operation on it first.
    pub async fn reset(&self, user_id: &str) -> Result<(), ConversationError> {
        let slot = self
            .store
            .get(user_id)
            .await
            .ok_or(ConversationError::NotFound)?;
        let mut guard = slot.lock().await;
        // Cleared before removal so callers already queued on this slot see
        // it as gone rather than acting on the old conversation
        let removed = guard.state.take().is_some() && self.store.remove(user_id, &slot).await;
        drop(guard);

        if removed {
            tracing::info!(user_id, "Conversation reset");
            Ok(())
        } else {
            Err(ConversationError::NotFound)
        }
    }

    pub async fn snapshot(&self, user_id: &str) -> Result<ConversationSnapshot, ConversationError> {
        let slot = self
            .store
            .get(user_id)
            .await
            .ok_or(ConversationError::NotFound)?;
        let slot = slot.lock().await;
        let state = slot.state.as_ref().ok_or(ConversationError::NotFound)?;

        Ok(ConversationSnapshot {
            user_id: user_id.to_string(),
            phase: state.phase(),
            questions: state.questions().to_vec(),
            answers: state.answers().to_vec(),
            recommendation: state.recommendation().map(str::to_string),
            started_at: slot.started_at,
            updated_at: slot.updated_at,
        })
    }

    pub async fn conversation_count(&self) -> usize {
        self.store.count().await
    }

    /// Evict idle conversations per the configured policy
    pub async fn sweep(&self) -> usize {
        let evicted = self.store.sweep().await;
        if evicted > 0 {
            tracing::info!(evicted, "Evicted idle conversations");
        }
        evicted
    }

    /// Run [`Self::sweep`] every `interval` in the background
    pub fn spawn_eviction_task(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                orchestrator.sweep().await;
            }
        })
    }
}
