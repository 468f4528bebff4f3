//! Pure state transition function

use super::{ConvContext, ConvState, Effect, Event};
use crate::prompts;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Conversation is already complete")]
    ConversationComplete,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs. Model calls are
/// returned as effects; their results come back as events.
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Questioning + UserAnswer -> ask the model, state unchanged until it replies
        (ConvState::Questioning { questions, answers }, Event::UserAnswer { text }) => {
            let mut transcript_answers = answers.clone();
            transcript_answers.push(text.clone());

            let effect = if context.completes_with(answers.len()) {
                Effect::RequestRecommendation {
                    answer: text,
                    request: prompts::recommendation_request(questions, &transcript_answers),
                }
            } else {
                Effect::RequestQuestion {
                    answer: text,
                    request: prompts::next_question_request(questions, &transcript_answers),
                }
            };

            Ok(TransitionResult::new(state.clone()).with_effect(effect))
        }

        // Questioning + QuestionGenerated -> Questioning (one more pair)
        (
            ConvState::Questioning { questions, answers },
            Event::QuestionGenerated { answer, question },
        ) => {
            if context.completes_with(answers.len()) {
                return Err(TransitionError::InvalidTransition(
                    "question generated at the threshold".to_string(),
                ));
            }
            if question.trim().is_empty() {
                return Err(TransitionError::InvalidTransition(
                    "empty question".to_string(),
                ));
            }

            let mut questions = questions.clone();
            let mut answers = answers.clone();
            answers.push(answer);
            questions.push(question);

            Ok(TransitionResult::new(ConvState::Questioning { questions, answers }))
        }

        // Questioning + RecommendationGenerated -> Final
        (
            ConvState::Questioning { questions, answers },
            Event::RecommendationGenerated {
                answer,
                recommendation,
            },
        ) => {
            if !context.completes_with(answers.len()) {
                return Err(TransitionError::InvalidTransition(
                    "recommendation generated below the threshold".to_string(),
                ));
            }
            if recommendation.trim().is_empty() {
                return Err(TransitionError::InvalidTransition(
                    "empty recommendation".to_string(),
                ));
            }

            let mut answers = answers.clone();
            answers.push(answer);

            Ok(TransitionResult::new(ConvState::Final {
                questions: questions.clone(),
                answers,
                recommendation,
            }))
        }

        // Nothing leaves Final
        (ConvState::Final { .. }, Event::UserAnswer { .. }) => {
            Err(TransitionError::ConversationComplete)
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {event:?}",
            state.phase()
        ))),
    }
}
