//! Events that can occur in a conversation

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user answered the pending question
    UserAnswer { text: String },

    /// The model produced the next question for an answer
    QuestionGenerated { answer: String, question: String },

    /// The model produced the final recommendation for the last answer
    RecommendationGenerated {
        answer: String,
        recommendation: String,
    },
}
