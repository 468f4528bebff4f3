//! Conversation state types

/// Conversation state
///
/// A conversation is created already questioning, holding its first
/// question. While questioning there is exactly one unanswered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvState {
    /// Waiting for the answer to the last question
    Questioning {
        questions: Vec<String>,
        answers: Vec<String>,
    },

    /// Every question answered and a recommendation made (terminal)
    Final {
        questions: Vec<String>,
        answers: Vec<String>,
        recommendation: String,
    },
}

impl ConvState {
    pub fn new(first_question: impl Into<String>) -> Self {
        ConvState::Questioning {
            questions: vec![first_question.into()],
            answers: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[String] {
        match self {
            ConvState::Questioning { questions, .. } | ConvState::Final { questions, .. } => {
                questions
            }
        }
    }

    pub fn answers(&self) -> &[String] {
        match self {
            ConvState::Questioning { answers, .. } | ConvState::Final { answers, .. } => answers,
        }
    }

    pub fn recommendation(&self) -> Option<&str> {
        match self {
            ConvState::Questioning { .. } => None,
            ConvState::Final { recommendation, .. } => Some(recommendation),
        }
    }

    /// The question currently awaiting an answer
    pub fn pending_question(&self) -> Option<&str> {
        match self {
            ConvState::Questioning { questions, .. } => questions.last().map(String::as_str),
            ConvState::Final { .. } => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ConvState::Final { .. })
    }

    pub fn phase(&self) -> &'static str {
        match self {
            ConvState::Questioning { .. } => "questioning",
            ConvState::Final { .. } => "final",
        }
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub user_id: String,
    /// Answers collected before the recommendation is made
    pub question_count: usize,
}

impl ConvContext {
    pub fn new(user_id: impl Into<String>, question_count: usize) -> Self {
        Self {
            user_id: user_id.into(),
            question_count,
        }
    }

    /// Whether recording one more answer on top of `answered` completes the
    /// conversation.
    pub fn completes_with(&self, answered: usize) -> bool {
        answered + 1 >= self.question_count
    }
}
