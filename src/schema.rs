//! Response parsing and schema validation for provider output.
//!
//! Provider text is adversarial input: it may be empty, truncated, non-JSON,
//! or missing fields it was explicitly told to include. Decoding is therefore
//! two-phase — first strict JSON parsing (`MalformedOutput`), then shape
//! checks against the task's schema (`SchemaViolation`). Generation tasks are
//! permissive at the element level (bad elements are dropped, never repaired);
//! evaluation tasks are strict at the whole-response level, because a student
//! must receive complete feedback or none.

use serde_json::Value;
use tracing::warn;

use crate::domain::{ANSWER_KEYS, OPTION_COUNT};
use crate::error::PipelineError;
use crate::util::trunc_for_log;

/// One question element that passed the shape check. Field values are still
/// unsanitized (labels, casing, surrounding whitespace).
#[derive(Debug)]
pub struct RawQuestion {
  pub prompt: String,
  pub options: Vec<String>,
  pub answer_key: String,
  pub explanation: String,
}

/// One topic element that passed the minimal required-field check.
/// Numeric and enumerated fields stay optional; the sanitizer defaults them.
#[derive(Debug)]
pub struct RawTopic {
  pub name: String,
  pub estimated_minutes: Option<i64>,
  pub priority: Option<i64>,
  pub difficulty: Option<String>,
  pub intro: Option<String>,
  pub subtopics: Vec<RawSubtopic>,
}

#[derive(Debug)]
pub struct RawSubtopic {
  pub name: String,
  pub estimated_minutes: Option<i64>,
  pub priority: Option<i64>,
  pub content: Option<String>,
}

/// Short-answer verdict fields as decoded, before any fallback.
#[derive(Debug)]
pub struct RawVerdict {
  pub is_correct: bool,
  pub reasoning: String,
}

/// Reasoning-evaluation feedback fields as decoded.
#[derive(Debug)]
pub struct RawFeedback {
  pub strengths: String,
  pub gaps: String,
  pub suggestion: String,
}

/// Strict first-phase decode of raw provider text.
pub fn parse_json(raw: &str) -> Result<Value, PipelineError> {
  serde_json::from_str::<Value>(raw)
    .map_err(|e| PipelineError::MalformedOutput(format!("{}: {}", e, trunc_for_log(raw, 120))))
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
  let s = v?.as_str()?.trim();
  if s.is_empty() { None } else { Some(s.to_string()) }
}

fn opt_i64(v: Option<&Value>) -> Option<i64> {
  let v = v?;
  // Providers sometimes emit "30" or 30.0 where an integer was requested.
  v.as_i64()
    .or_else(|| v.as_f64().map(|f| f.round() as i64))
    .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
}

fn opt_string(v: Option<&Value>) -> Option<String> {
  v.and_then(|x| x.as_str()).map(|s| s.to_string())
}

/// Question-generation schema: top level must hold a `questions` array.
/// Elements missing a non-empty prompt, exactly 4 options, a recognized
/// answer key, or a non-empty explanation are excluded.
pub fn validate_questions(parsed: &Value) -> Result<Vec<RawQuestion>, PipelineError> {
  let items = parsed
    .get("questions")
    .and_then(|v| v.as_array())
    .ok_or_else(|| PipelineError::SchemaViolation("missing 'questions' array".into()))?;

  let mut out = Vec::with_capacity(items.len());
  for (i, item) in items.iter().enumerate() {
    match validate_question_element(item) {
      Some(q) => out.push(q),
      None => warn!(target: "content", index = i, "Dropping malformed question element"),
    }
  }
  Ok(out)
}

fn validate_question_element(item: &Value) -> Option<RawQuestion> {
  let prompt = non_empty_str(item.get("prompt"))?;
  let options = item.get("options")?.as_array()?;
  if options.len() != OPTION_COUNT {
    return None;
  }
  let options: Vec<String> = options
    .iter()
    .filter_map(|o| o.as_str())
    .map(|s| s.to_string())
    .collect();
  if options.len() != OPTION_COUNT {
    return None;
  }
  let answer_key = non_empty_str(item.get("answer_key"))?;
  if !ANSWER_KEYS.contains(&answer_key.trim().to_uppercase().as_str()) {
    return None;
  }
  let explanation = non_empty_str(item.get("explanation"))?;
  Some(RawQuestion { prompt, options, answer_key, explanation })
}

/// Route-generation schema: top level must hold a `topics` array. A topic or
/// subtopic needs at least a non-empty name; everything else is defaulted
/// downstream.
pub fn validate_topics(parsed: &Value) -> Result<Vec<RawTopic>, PipelineError> {
  let items = parsed
    .get("topics")
    .and_then(|v| v.as_array())
    .ok_or_else(|| PipelineError::SchemaViolation("missing 'topics' array".into()))?;

  let mut out = Vec::with_capacity(items.len());
  for (i, item) in items.iter().enumerate() {
    let Some(name) = non_empty_str(item.get("name")) else {
      warn!(target: "content", index = i, "Dropping topic element without a name");
      continue;
    };
    let subtopics = item
      .get("subtopics")
      .and_then(|v| v.as_array())
      .map(|arr| {
        arr
          .iter()
          .filter_map(|st| {
            let name = non_empty_str(st.get("name"))?;
            Some(RawSubtopic {
              name,
              estimated_minutes: opt_i64(st.get("estimated_minutes")),
              priority: opt_i64(st.get("priority")),
              content: opt_string(st.get("content")),
            })
          })
          .collect()
      })
      .unwrap_or_default();

    out.push(RawTopic {
      name,
      estimated_minutes: opt_i64(item.get("estimated_minutes")),
      priority: opt_i64(item.get("priority")),
      difficulty: opt_string(item.get("difficulty")),
      intro: opt_string(item.get("intro")),
      subtopics,
    });
  }
  Ok(out)
}

/// Short-answer verdict schema: needs a boolean verdict and a reasoning text.
/// Common provider field-name drift (`isCorrect`, `correct`) is accepted.
pub fn validate_verdict(parsed: &Value) -> Result<RawVerdict, PipelineError> {
  let is_correct = parsed
    .get("is_correct")
    .or_else(|| parsed.get("isCorrect"))
    .or_else(|| parsed.get("correct"))
    .and_then(|v| v.as_bool())
    .ok_or_else(|| PipelineError::SchemaViolation("missing boolean verdict field".into()))?;
  let reasoning = non_empty_str(parsed.get("reasoning"))
    .or_else(|| non_empty_str(parsed.get("explanation")))
    .ok_or_else(|| PipelineError::SchemaViolation("missing 'reasoning' field".into()))?;
  Ok(RawVerdict { is_correct, reasoning })
}

/// Reasoning-feedback schema: all three fields must be present and non-empty
/// or the whole response is rejected. Partial feedback is never served.
pub fn validate_feedback(parsed: &Value) -> Result<RawFeedback, PipelineError> {
  let field = |name: &str| {
    non_empty_str(parsed.get(name))
      .ok_or_else(|| PipelineError::SchemaViolation(format!("missing '{}' field", name)))
  };
  Ok(RawFeedback {
    strengths: field("strengths")?,
    gaps: field("gaps")?,
    suggestion: field("suggestion")?,
  })
}

/// Heuristic verdict recovery for the short-answer evaluator only: scan the
/// raw text case-insensitively for affirmative tokens. This is a loose
/// approximation kept deliberately simple; generation tasks never use it
/// because a guessed verdict cannot substitute for missing content.
pub fn heuristic_verdict(raw: &str) -> RawVerdict {
  let lower = raw.to_lowercase();
  let is_correct =
    ["true", "correct", "correcto"].iter().any(|token| lower.contains(token));
  RawVerdict { is_correct, reasoning: raw.trim().to_string() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn parse_json_flags_non_json() {
    assert!(parse_json("here are your questions!").is_err());
    assert!(parse_json("").is_err());
    assert!(parse_json(r#"{"questions":[]}"#).is_ok());
  }

  #[test]
  fn questions_require_the_array_field() {
    let err = validate_questions(&json!({"items": []})).unwrap_err();
    assert!(matches!(err, PipelineError::SchemaViolation(_)));
  }

  #[test]
  fn malformed_question_elements_are_dropped_not_repaired() {
    let parsed = json!({"questions": [
      {"prompt": "P1", "options": ["a","b","c","d"], "answer_key": "B", "explanation": "E1"},
      {"prompt": "P2", "options": ["a","b","c","d","e"], "answer_key": "A", "explanation": "E2"},
      {"prompt": "P3", "options": ["a","b","c","d"], "answer_key": "Z", "explanation": "E3"},
      {"prompt": "", "options": ["a","b","c","d"], "answer_key": "C", "explanation": "E4"},
      {"prompt": "P5", "options": ["a","b","c","d"], "answer_key": "d"}
    ]});
    let qs = validate_questions(&parsed).unwrap();
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].prompt, "P1");
  }

  #[test]
  fn lowercase_answer_keys_pass_the_shape_check() {
    let parsed = json!({"questions": [
      {"prompt": "P", "options": ["a","b","c","d"], "answer_key": "c", "explanation": "E"}
    ]});
    assert_eq!(validate_questions(&parsed).unwrap().len(), 1);
  }

  #[test]
  fn topics_keep_elements_with_names_and_default_the_rest() {
    let parsed = json!({"topics": [
      {"name": "Algebra", "estimated_minutes": "45", "priority": 2.6,
       "subtopics": [{"name": "Equations"}, {"title": "nameless"}]},
      {"estimated_minutes": 30}
    ]});
    let ts = validate_topics(&parsed).unwrap();
    assert_eq!(ts.len(), 1);
    assert_eq!(ts[0].estimated_minutes, Some(45));
    assert_eq!(ts[0].priority, Some(3));
    assert_eq!(ts[0].subtopics.len(), 1);
  }

  #[test]
  fn verdict_accepts_field_name_drift() {
    let v = validate_verdict(&json!({"isCorrect": true, "explanation": "yes"})).unwrap();
    assert!(v.is_correct);
    assert!(validate_verdict(&json!({"reasoning": "no verdict"})).is_err());
  }

  #[test]
  fn feedback_is_all_or_nothing() {
    let full = json!({"strengths": "s", "gaps": "g", "suggestion": "x"});
    assert!(validate_feedback(&full).is_ok());
    let partial = json!({"strengths": "s", "gaps": "g"});
    let err = validate_feedback(&partial).unwrap_err();
    assert!(err.to_string().contains("suggestion"));
    let blank = json!({"strengths": "s", "gaps": "", "suggestion": "x"});
    assert!(validate_feedback(&blank).is_err());
  }

  #[test]
  fn heuristic_verdict_scans_for_affirmative_tokens() {
    assert!(heuristic_verdict("La respuesta es correcto, bien hecho").is_correct);
    assert!(heuristic_verdict("TRUE").is_correct);
    assert!(!heuristic_verdict("wrong answer, try again").is_correct);
  }
}
