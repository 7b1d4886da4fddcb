//! Normalization of validated records into records safe to serve.
//!
//! Providers add enumeration labels to option text despite being told not
//! to, hand back numbers far outside plausible ranges, and drift on token
//! casing. Everything here is pure: trim, strip one leading label artifact,
//! normalize enumerated tokens, clamp numerics, truncate excess trailing
//! elements. A family whose element count drops to zero is a pipeline
//! failure, never an empty success.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{
  AnswerVerdict, Difficulty, Question, ReasoningFeedback, Subtopic, Topic, ANSWER_KEYS,
  MAX_SUBTOPICS, MAX_TOPICS, MINUTES_DEFAULT, MINUTES_MAX, MINUTES_MIN, PRIORITY_DEFAULT,
  PRIORITY_MAX, PRIORITY_MIN,
};
use crate::error::PipelineError;
use crate::schema::{RawFeedback, RawQuestion, RawTopic, RawVerdict};

/// Leading option-label artifacts, tried in order, each anchored to the start
/// and applied at most once: `(A)` / `[A]`, then `A.` `A)` `A-` `A:`, then a
/// bare letter followed by whitespace.
static LABEL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
  vec![
    Regex::new(r"^\s*[\(\[]\s*[A-Da-d]\s*[\)\]]\s*").unwrap(),
    Regex::new(r"^\s*[A-Da-d]\s*[.\)\-:]\s*").unwrap(),
    Regex::new(r"^\s*[A-Da-d]\s+").unwrap(),
  ]
});

/// Strip one leading enumeration label from option text, if present.
/// Idempotent on already-clean text unless the content itself begins with a
/// label-shaped word, which the prompt forbids the provider to emit.
pub fn strip_option_label(text: &str) -> String {
  let trimmed = text.trim();
  for re in LABEL_PATTERNS.iter() {
    if let Some(m) = re.find(trimmed) {
      return trimmed[m.end()..].trim().to_string();
    }
  }
  trimmed.to_string()
}

/// Uppercase-normalize an answer key and re-check membership.
pub fn normalize_answer_key(key: &str) -> Option<String> {
  let k = key.trim().to_uppercase();
  if ANSWER_KEYS.contains(&k.as_str()) { Some(k) } else { None }
}

/// Clamp an estimated duration into the documented minutes range.
/// Missing or non-numeric values take the default; plausibility bounds, not
/// exact values, are what matters here.
pub fn clamp_minutes(value: Option<i64>) -> u32 {
  match value {
    Some(v) => v.clamp(MINUTES_MIN as i64, MINUTES_MAX as i64) as u32,
    None => MINUTES_DEFAULT,
  }
}

/// Clamp a priority into the 1..=5 ordinal range, defaulting when absent.
pub fn clamp_priority(value: Option<i64>) -> u8 {
  match value {
    Some(v) => v.clamp(PRIORITY_MIN as i64, PRIORITY_MAX as i64) as u8,
    None => PRIORITY_DEFAULT,
  }
}

/// Sanitize validated questions. Records whose options vanish after label
/// stripping or whose key fails normalization are discarded. Trailing items
/// beyond `max_items` are truncated; providers order by relevance, so the
/// leading items are the ones worth keeping.
pub fn sanitize_questions(
  raw: Vec<RawQuestion>,
  max_items: usize,
) -> Result<Vec<Question>, PipelineError> {
  let mut out = Vec::with_capacity(raw.len().min(max_items));
  for q in raw {
    let Some(answer_key) = normalize_answer_key(&q.answer_key) else { continue };
    let options: Vec<String> = q
      .options
      .iter()
      .map(|o| strip_option_label(o))
      .filter(|o| !o.is_empty())
      .collect();
    if options.len() != q.options.len() {
      // An option reduced to empty text leaves the question unanswerable.
      continue;
    }
    out.push(Question {
      prompt: q.prompt.trim().to_string(),
      options,
      answer_key,
      explanation: q.explanation.trim().to_string(),
    });
  }
  out.truncate(max_items);
  if out.is_empty() {
    return Err(PipelineError::EmptyResult);
  }
  Ok(out)
}

/// Sanitize validated topics: trim text, default/clamp numerics, normalize
/// difficulty tokens, cap topic and subtopic counts. An absent difficulty
/// takes the default; a present token that still fails membership after
/// normalization rejects the whole topic, same as a bad answer key does for
/// a question.
pub fn sanitize_topics(raw: Vec<RawTopic>) -> Result<Vec<Topic>, PipelineError> {
  let mut out = Vec::with_capacity(raw.len().min(MAX_TOPICS));
  for t in raw {
    let difficulty = match t.difficulty.as_deref() {
      None => Difficulty::default(),
      Some(s) => match Difficulty::parse(s) {
        Some(d) => d,
        None => continue,
      },
    };
    let mut subtopics: Vec<Subtopic> = t
      .subtopics
      .into_iter()
      .map(|st| Subtopic {
        name: st.name.trim().to_string(),
        estimated_minutes: clamp_minutes(st.estimated_minutes),
        priority: clamp_priority(st.priority),
        content: st.content.unwrap_or_default().trim().to_string(),
      })
      .collect();
    subtopics.truncate(MAX_SUBTOPICS);

    out.push(Topic {
      name: t.name.trim().to_string(),
      estimated_minutes: clamp_minutes(t.estimated_minutes),
      priority: clamp_priority(t.priority),
      difficulty,
      intro: t.intro.unwrap_or_default().trim().to_string(),
      subtopics,
    });
  }
  out.truncate(MAX_TOPICS);
  if out.is_empty() {
    return Err(PipelineError::EmptyResult);
  }
  Ok(out)
}

pub fn sanitize_verdict(raw: RawVerdict) -> AnswerVerdict {
  AnswerVerdict { is_correct: raw.is_correct, reasoning: raw.reasoning.trim().to_string() }
}

pub fn sanitize_feedback(raw: RawFeedback) -> ReasoningFeedback {
  ReasoningFeedback {
    strengths: raw.strengths.trim().to_string(),
    gaps: raw.gaps.trim().to_string(),
    suggestion: raw.suggestion.trim().to_string(),
  }
}
