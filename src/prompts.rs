//! Prompt construction for every text-generation call the service makes
//!
//! Conversation turns get a short output budget; the shortlist call returns
//! JSON for up to three venues and gets a larger one.

use crate::llm::LlmRequest;
use crate::places::{Venue, VenueSummary};
use std::fmt::Write;

/// Output budget for questions and the recommendation
pub const CONVERSATION_MAX_TOKENS: u32 = 150;
/// Output budget for the JSON shortlist
pub const SHORTLIST_MAX_TOKENS: u32 = 300;
/// Most venues the shortlist may contain
pub const MAX_SHORTLIST: usize = 3;

const OPENING_SYSTEM: &str = "You are a restaurant recommendation system. Engage in a step-by-step process to help the user decide what they might want to eat for dinner. Ask relevant questions about their mood, taste preferences, whether they want something light or heavy, if they are in a rush, etc. Ask one question at a time. Start with your first question.";

const OPENING_MESSAGE: &str = "Now you need to ask the user a question to help recommend a dinner option. What would you like to ask?";

const NEXT_QUESTION_SYSTEM: &str = "Continue the conversation. Given the following exchange, ask the next relevant question to help recommend a dinner option. Don't ask the same question as a previous one; ask about the psychology of the user's mood.";

const NEXT_QUESTION_MESSAGE: &str = "The user has answered the question. Continue the conversation: given the exchange above, ask the next relevant question to help recommend a dinner option.";

const RECOMMENDATION_SYSTEM: &str = "Based on the following conversation, suggest a type of cuisine or specific food the user might enjoy for dinner.";

const RECOMMENDATION_MESSAGE: &str = "Based on the conversation above, suggest what the user could eat for dinner: give a short list of cuisine types or specific foods.";

/// First question of a new conversation
pub fn opening_request() -> LlmRequest {
    LlmRequest::new(OPENING_SYSTEM, OPENING_MESSAGE).with_max_tokens(CONVERSATION_MAX_TOKENS)
}

/// Follow-up question conditioned on the exchange so far
pub fn next_question_request(questions: &[String], answers: &[String]) -> LlmRequest {
    let system = format!("{NEXT_QUESTION_SYSTEM}\n\n{}", transcript(questions, answers));
    LlmRequest::new(system, NEXT_QUESTION_MESSAGE).with_max_tokens(CONVERSATION_MAX_TOKENS)
}

/// Cuisine recommendation conditioned on the full exchange
pub fn recommendation_request(questions: &[String], answers: &[String]) -> LlmRequest {
    let system = format!("{RECOMMENDATION_SYSTEM}\n\n{}", transcript(questions, answers));
    LlmRequest::new(system, RECOMMENDATION_MESSAGE).with_max_tokens(CONVERSATION_MAX_TOKENS)
}

/// Ask the model to pick and justify up to [`MAX_SHORTLIST`] venues.
pub fn shortlist_request(recommendation: &str, venues: &[Venue]) -> LlmRequest {
    let system = format!(
        "The user wants to eat: {recommendation}\n\
         Choose at most {MAX_SHORTLIST} restaurants from the list the user provides that best match what they want to eat. \
         Only choose restaurants from that list. \
         Respond with JSON only, shaped exactly like: \
         {{\"restaurants\": [{{\"name\": \"restaurant name\", \"address\": \"restaurant address\", \"reason\": \"why it fits\"}}]}}"
    );

    let mut message = String::from("Restaurants near the user:\n");
    for venue in venues.iter().map(VenueSummary::from) {
        let _ = writeln!(message, "Name: {}\nAddress: {}", venue.name, venue.address);
    }

    LlmRequest::new(system, message)
        .json()
        .with_max_tokens(SHORTLIST_MAX_TOKENS)
}

/// `Q: ...` / `A: ...` lines, pairing questions with answers in order.
/// An unanswered trailing question is left out.
pub fn transcript(questions: &[String], answers: &[String]) -> String {
    let mut out = String::new();
    for (q, a) in questions.iter().zip(answers) {
        let _ = writeln!(out, "Q: {q}\nA: {a}");
    }
    out
}
