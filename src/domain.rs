//! Domain models: sanitized records safe to serialize to callers, plus the
//! enumerated alphabets and numeric bounds they must satisfy.

use serde::{Deserialize, Serialize};

/// Permitted answer-key symbols for multiple-choice questions.
pub const ANSWER_KEYS: [&str; 4] = ["A", "B", "C", "D"];

/// Number of options every multiple-choice question must carry.
pub const OPTION_COUNT: usize = 4;

/// Closed range for estimated study time, in minutes.
pub const MINUTES_MIN: u32 = 5;
pub const MINUTES_MAX: u32 = 600;
pub const MINUTES_DEFAULT: u32 = 30;

/// Closed ordinal range for topic/subtopic priority.
pub const PRIORITY_MIN: u8 = 1;
pub const PRIORITY_MAX: u8 = 5;
pub const PRIORITY_DEFAULT: u8 = 3;

/// Study-route size caps. Excess trailing elements are truncated.
pub const MAX_TOPICS: usize = 10;
pub const MAX_SUBTOPICS: usize = 8;

/// Difficulty tier for generated content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Difficulty {
  /// Case-insensitive parse of a difficulty token. None for unknown tokens.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "easy" => Some(Difficulty::Easy),
      "medium" => Some(Difficulty::Medium),
      "hard" => Some(Difficulty::Hard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }
}

/// One sanitized multiple-choice question.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub prompt: String,
  pub options: Vec<String>,
  pub answer_key: String,
  pub explanation: String,
}

/// One sanitized study-route topic with its nested subtopics.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
  pub name: String,
  pub estimated_minutes: u32,
  pub priority: u8,
  pub difficulty: Difficulty,
  pub intro: String,
  pub subtopics: Vec<Subtopic>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
  pub name: String,
  pub estimated_minutes: u32,
  pub priority: u8,
  pub content: String,
}

/// Verdict for a short free-text answer.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerVerdict {
  pub is_correct: bool,
  pub reasoning: String,
}

/// Complete feedback for a structured-reasoning evaluation.
/// All three fields are required; partial feedback is never served.
#[derive(Clone, Debug, Serialize)]
pub struct ReasoningFeedback {
  pub strengths: String,
  pub gaps: String,
  pub suggestion: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn response_bodies_serialize_camel_case() {
    let q = Question {
      prompt: "P".into(),
      options: vec!["w".into(), "x".into(), "y".into(), "z".into()],
      answer_key: "A".into(),
      explanation: "E".into(),
    };
    let v = serde_json::to_value(&q).unwrap();
    assert!(v.get("answerKey").is_some());
    assert!(v.get("answer_key").is_none());

    let t = Topic {
      name: "T".into(),
      estimated_minutes: 30,
      priority: 3,
      difficulty: Difficulty::Medium,
      intro: String::new(),
      subtopics: vec![Subtopic {
        name: "S".into(),
        estimated_minutes: 15,
        priority: 2,
        content: String::new(),
      }],
    };
    let v = serde_json::to_value(&t).unwrap();
    assert!(v.get("estimatedMinutes").is_some());
    assert_eq!(v["difficulty"], json!("medium"));
    assert!(v["subtopics"][0].get("estimatedMinutes").is_some());

    let verdict = AnswerVerdict { is_correct: true, reasoning: "R".into() };
    let v = serde_json::to_value(&verdict).unwrap();
    assert!(v.get("isCorrect").is_some());
  }
}
