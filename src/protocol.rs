//! Public request/response DTOs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Inputs here are raw caller data: nothing about them is trusted until the
//! input validator has turned them into request structs (see `validate`).

use serde::{Deserialize, Serialize};

use crate::domain::{AnswerVerdict, Question, ReasoningFeedback, Topic};

#[derive(Debug, Deserialize)]
pub struct QuestionsIn {
    pub subtopic: String,
    pub topic: String,
    /// Required. Optional here only so the validator can reject a missing
    /// value with a field-named 400 instead of a generic body rejection.
    pub count: Option<i64>,
    pub difficulty: Option<String>,
}
#[derive(Debug, Serialize)]
pub struct QuestionsOut {
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub struct RouteIn {
    pub objective: String,
    #[serde(rename = "requesterId")]
    pub requester_id: String,
}
#[derive(Debug, Serialize)]
pub struct RouteOut {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerEvalIn {
    pub question: String,
    #[serde(rename = "expectedAnswer")]
    pub expected_answer: String,
    #[serde(rename = "userAnswer")]
    pub user_answer: String,
}
pub type AnswerEvalOut = AnswerVerdict;

#[derive(Debug, Deserialize)]
pub struct ReasoningEvalIn {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctKey")]
    pub correct_key: String,
    #[serde(rename = "chosenKey")]
    pub chosen_key: String,
    #[serde(rename = "wasCorrect")]
    pub was_correct: bool,
    pub reasoning: String,
}
pub type ReasoningEvalOut = ReasoningFeedback;

#[derive(Debug, Default, Deserialize)]
pub struct MotivationIn {
    #[serde(rename = "requesterId")]
    pub requester_id: Option<String>,
}
#[derive(Debug, Serialize)]
pub struct MotivationOut {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
