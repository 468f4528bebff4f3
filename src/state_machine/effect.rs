//! Effects produced by state transitions

use crate::llm::LlmRequest;

/// Effects to be executed after state transition
///
/// Each carries the answer that triggered it so the runtime can report the
/// model's output back as the matching event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the model for the next question
    RequestQuestion { answer: String, request: LlmRequest },

    /// Ask the model for the final recommendation
    RequestRecommendation { answer: String, request: LlmRequest },
}
