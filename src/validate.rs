//! Input validation: raw caller DTOs become validated request structs.
//!
//! Every constraint is checked before any provider call is made, and the
//! first violated constraint names its field in the rejection message.
//! Nothing here performs I/O.

use uuid::Uuid;

use crate::domain::{Difficulty, ANSWER_KEYS, OPTION_COUNT};
use crate::error::PipelineError;
use crate::protocol::{AnswerEvalIn, MotivationIn, QuestionsIn, ReasoningEvalIn, RouteIn};

pub const MIN_OBJECTIVE_CHARS: usize = 10;
pub const MIN_REASONING_CHARS: usize = 20;
pub const MAX_QUESTION_COUNT: i64 = 20;

/// Validated request for question generation.
#[derive(Debug)]
pub struct QuestionsRequest {
  pub subtopic: String,
  pub topic: String,
  pub count: usize,
  pub difficulty: Difficulty,
}

/// Validated request for study-route generation.
#[derive(Debug)]
pub struct RouteRequest {
  pub objective: String,
  pub requester_id: Uuid,
}

/// Validated request for short-answer evaluation.
#[derive(Debug)]
pub struct AnswerEvalRequest {
  pub question: String,
  pub expected_answer: String,
  pub user_answer: String,
}

/// Validated request for structured-reasoning evaluation.
#[derive(Debug)]
pub struct ReasoningEvalRequest {
  pub question: String,
  pub options: Vec<String>,
  pub correct_key: String,
  pub chosen_key: String,
  pub was_correct: bool,
  pub reasoning: String,
}

/// Validated request for the motivational message.
#[derive(Debug)]
pub struct MotivationRequest {
  pub requester_id: Option<Uuid>,
}

fn invalid(msg: impl Into<String>) -> PipelineError {
  PipelineError::InvalidInput(msg.into())
}

fn require_text(field: &str, value: &str, min_chars: usize) -> Result<String, PipelineError> {
  let v = value.trim();
  if v.chars().count() < min_chars {
    return Err(invalid(format!("'{}' must be at least {} characters", field, min_chars)));
  }
  Ok(v.to_string())
}

fn require_uuid(field: &str, value: &str) -> Result<Uuid, PipelineError> {
  Uuid::parse_str(value.trim())
    .map_err(|_| invalid(format!("'{}' must be a valid UUID", field)))
}

fn require_answer_key(field: &str, value: &str) -> Result<String, PipelineError> {
  let key = value.trim().to_uppercase();
  if !ANSWER_KEYS.contains(&key.as_str()) {
    return Err(invalid(format!("'{}' must be one of A, B, C, D", field)));
  }
  Ok(key)
}

pub fn validate_questions(input: QuestionsIn) -> Result<QuestionsRequest, PipelineError> {
  let subtopic = require_text("subtopic", &input.subtopic, 1)?;
  let topic = require_text("topic", &input.topic, 1)?;
  let count = input
    .count
    .ok_or_else(|| invalid("'count' is required"))?;
  if !(1..=MAX_QUESTION_COUNT).contains(&count) {
    return Err(invalid(format!("'count' must be between 1 and {}", MAX_QUESTION_COUNT)));
  }
  let difficulty = match input.difficulty.as_deref() {
    None => Difficulty::default(),
    Some(s) if s.trim().is_empty() => Difficulty::default(),
    Some(s) => Difficulty::parse(s)
      .ok_or_else(|| invalid("'difficulty' must be one of easy, medium, hard"))?,
  };
  Ok(QuestionsRequest { subtopic, topic, count: count as usize, difficulty })
}

pub fn validate_route(input: RouteIn) -> Result<RouteRequest, PipelineError> {
  let objective = require_text("objective", &input.objective, MIN_OBJECTIVE_CHARS)?;
  let requester_id = require_uuid("requesterId", &input.requester_id)?;
  Ok(RouteRequest { objective, requester_id })
}

pub fn validate_answer_eval(input: AnswerEvalIn) -> Result<AnswerEvalRequest, PipelineError> {
  let question = require_text("question", &input.question, 1)?;
  let expected_answer = require_text("expectedAnswer", &input.expected_answer, 1)?;
  let user_answer = require_text("userAnswer", &input.user_answer, 1)?;
  Ok(AnswerEvalRequest { question, expected_answer, user_answer })
}

pub fn validate_reasoning_eval(
  input: ReasoningEvalIn,
) -> Result<ReasoningEvalRequest, PipelineError> {
  let question = require_text("question", &input.question, 1)?;
  if input.options.len() != OPTION_COUNT {
    return Err(invalid(format!("'options' must contain exactly {} entries", OPTION_COUNT)));
  }
  let mut options = Vec::with_capacity(OPTION_COUNT);
  for (i, opt) in input.options.iter().enumerate() {
    let o = opt.trim();
    if o.is_empty() {
      return Err(invalid(format!("'options[{}]' must not be empty", i)));
    }
    options.push(o.to_string());
  }
  let correct_key = require_answer_key("correctKey", &input.correct_key)?;
  let chosen_key = require_answer_key("chosenKey", &input.chosen_key)?;
  let reasoning = require_text("reasoning", &input.reasoning, MIN_REASONING_CHARS)?;
  Ok(ReasoningEvalRequest {
    question,
    options,
    correct_key,
    chosen_key,
    was_correct: input.was_correct,
    reasoning,
  })
}

pub fn validate_motivation(input: MotivationIn) -> Result<MotivationRequest, PipelineError> {
  let requester_id = match input.requester_id.as_deref() {
    None => None,
    Some(s) if s.trim().is_empty() => None,
    Some(s) => Some(require_uuid("requesterId", s)?),
  };
  Ok(MotivationRequest { requester_id })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn questions_in(count: Option<i64>, difficulty: Option<&str>) -> QuestionsIn {
    QuestionsIn {
      subtopic: "fractions".into(),
      topic: "arithmetic".into(),
      count,
      difficulty: difficulty.map(|s| s.to_string()),
    }
  }

  #[test]
  fn questions_count_bounds() {
    assert!(validate_questions(questions_in(Some(1), None)).is_ok());
    assert!(validate_questions(questions_in(Some(20), None)).is_ok());
    assert!(validate_questions(questions_in(Some(0), None)).is_err());
    assert!(validate_questions(questions_in(Some(21), None)).is_err());
    assert!(validate_questions(questions_in(Some(-3), None)).is_err());
  }

  #[test]
  fn questions_count_is_required() {
    let err = validate_questions(questions_in(None, None)).unwrap_err();
    assert!(err.to_string().contains("count"));
  }

  #[test]
  fn questions_difficulty_defaults_and_parses() {
    let r = validate_questions(questions_in(Some(5), None)).unwrap();
    assert_eq!(r.difficulty, Difficulty::Medium);
    assert_eq!(r.count, 5);
    let r = validate_questions(questions_in(Some(3), Some("HARD"))).unwrap();
    assert_eq!(r.difficulty, Difficulty::Hard);
    assert!(validate_questions(questions_in(Some(3), Some("extreme"))).is_err());
  }

  #[test]
  fn questions_rejects_empty_subtopic_with_field_name() {
    let err = validate_questions(QuestionsIn {
      subtopic: "  ".into(),
      topic: "arithmetic".into(),
      count: Some(3),
      difficulty: None,
    })
    .unwrap_err();
    assert!(err.to_string().contains("subtopic"));
  }

  #[test]
  fn route_requires_objective_length_and_uuid() {
    let ok = validate_route(RouteIn {
      objective: "learn linear algebra".into(),
      requester_id: "550e8400-e29b-41d4-a716-446655440000".into(),
    });
    assert!(ok.is_ok());

    let short = validate_route(RouteIn {
      objective: "algebra".into(),
      requester_id: "550e8400-e29b-41d4-a716-446655440000".into(),
    });
    assert!(short.unwrap_err().to_string().contains("objective"));

    let bad_id = validate_route(RouteIn {
      objective: "learn linear algebra".into(),
      requester_id: "student-42".into(),
    });
    assert!(bad_id.unwrap_err().to_string().contains("requesterId"));
  }

  #[test]
  fn reasoning_eval_constraints() {
    let base = || ReasoningEvalIn {
      question: "Which gas do plants absorb?".into(),
      options: vec!["Oxygen".into(), "CO2".into(), "Nitrogen".into(), "Helium".into()],
      correct_key: "b".into(),
      chosen_key: "A".into(),
      was_correct: false,
      reasoning: "I thought plants breathe the same way animals do.".into(),
    };

    let ok = validate_reasoning_eval(base()).unwrap();
    assert_eq!(ok.correct_key, "B");
    assert_eq!(ok.chosen_key, "A");

    let mut five = base();
    five.options.push("Argon".into());
    assert!(validate_reasoning_eval(five).is_err());

    let mut short = base();
    short.reasoning = "just guessed".into();
    assert!(validate_reasoning_eval(short).unwrap_err().to_string().contains("reasoning"));

    let mut bad_key = base();
    bad_key.correct_key = "E".into();
    assert!(validate_reasoning_eval(bad_key).is_err());
  }

  #[test]
  fn motivation_id_is_optional_but_checked() {
    assert!(validate_motivation(MotivationIn { requester_id: None }).is_ok());
    assert!(validate_motivation(MotivationIn { requester_id: Some("".into()) }).is_ok());
    assert!(validate_motivation(MotivationIn { requester_id: Some("nope".into()) }).is_err());
  }
}
