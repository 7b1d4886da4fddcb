//! The five content pipelines shared by all transport handlers.
//!
//! Every pipeline runs the same stages: validated input → rendered prompt →
//! provider call → parse → schema check → sanitize, with a per-task fallback
//! policy at the first failing stage. Generation tasks surface failures;
//! the short-answer evaluator degrades to heuristic verdict recovery when
//! decoding fails; the motivational task never fails visibly.

use tracing::{error, info, instrument};

use crate::domain::AnswerVerdict;
use crate::error::PipelineError;
use crate::openai::{
  OpenAI, OPTS_ANSWER_EVAL, OPTS_MOTIVATION, OPTS_QUESTIONS, OPTS_REASONING_EVAL, OPTS_ROUTE,
};
use crate::protocol::{MotivationOut, QuestionsOut, ReasoningEvalOut, RouteOut};
use crate::sanitize;
use crate::schema;
use crate::state::AppState;
use crate::util::fill_template;
use crate::validate::{
  AnswerEvalRequest, MotivationRequest, QuestionsRequest, ReasoningEvalRequest, RouteRequest,
};

/// Served whenever the motivational pipeline cannot reach or decode the
/// provider. The task's contract is that it never fails visibly.
pub const DEFAULT_MOTIVATION: &str =
  "Every study session counts. Keep going — you are closer than you think.";

fn provider(state: &AppState) -> Result<&OpenAI, PipelineError> {
  state.openai.as_ref().ok_or(PipelineError::NotConfigured)
}

#[instrument(level = "info", skip(state, req), fields(subtopic = %req.subtopic, count = req.count, difficulty = %req.difficulty.as_str()))]
pub async fn generate_questions(
  state: &AppState,
  req: &QuestionsRequest,
) -> Result<QuestionsOut, PipelineError> {
  let oa = provider(state)?;
  let count = req.count.to_string();
  let user = fill_template(
    &state.prompts.questions_user_template,
    &[
      ("count", count.as_str()),
      ("subtopic", &req.subtopic),
      ("topic", &req.topic),
      ("difficulty", req.difficulty.as_str()),
    ],
  );

  let raw = oa
    .chat(&state.prompts.questions_system, &user, OPTS_QUESTIONS)
    .await
    .map_err(|e| log_stage("questions", e))?;
  let parsed = schema::parse_json(&raw).map_err(|e| log_stage("questions", e))?;
  let validated = schema::validate_questions(&parsed).map_err(|e| log_stage("questions", e))?;
  let questions =
    sanitize::sanitize_questions(validated, req.count).map_err(|e| log_stage("questions", e))?;

  info!(target: "content", served = questions.len(), "Questions generated");
  Ok(QuestionsOut { questions })
}

#[instrument(level = "info", skip(state, req), fields(objective_len = req.objective.len(), requester = %req.requester_id))]
pub async fn generate_route(
  state: &AppState,
  req: &RouteRequest,
) -> Result<RouteOut, PipelineError> {
  let oa = provider(state)?;
  let user = fill_template(&state.prompts.route_user_template, &[("objective", &req.objective)]);

  let raw = oa
    .chat(&state.prompts.route_system, &user, OPTS_ROUTE)
    .await
    .map_err(|e| log_stage("route", e))?;
  let parsed = schema::parse_json(&raw).map_err(|e| log_stage("route", e))?;
  let validated = schema::validate_topics(&parsed).map_err(|e| log_stage("route", e))?;
  let topics = sanitize::sanitize_topics(validated).map_err(|e| log_stage("route", e))?;

  info!(target: "content", topics = topics.len(), "Study route generated");
  Ok(RouteOut { topics })
}

#[instrument(level = "info", skip(state, req), fields(question_len = req.question.len(), answer_len = req.user_answer.len()))]
pub async fn evaluate_answer(
  state: &AppState,
  req: &AnswerEvalRequest,
) -> Result<AnswerVerdict, PipelineError> {
  let oa = provider(state)?;
  let user = fill_template(
    &state.prompts.answer_eval_user_template,
    &[
      ("question", &req.question),
      ("expected", &req.expected_answer),
      ("answer", &req.user_answer),
    ],
  );

  let raw = oa
    .chat(&state.prompts.answer_eval_system, &user, OPTS_ANSWER_EVAL)
    .await
    .map_err(|e| log_stage("answer_eval", e))?;

  Ok(resolve_verdict(&raw))
}

/// Strict decode first; on any decoding failure fall back to scanning the raw
/// text for affirmative tokens. Only this task family is allowed the
/// heuristic path — a guessed verdict is an acceptable degradation, guessed
/// content is not.
fn resolve_verdict(raw: &str) -> AnswerVerdict {
  let decoded = schema::parse_json(raw).and_then(|v| schema::validate_verdict(&v));
  match decoded {
    Ok(v) => sanitize::sanitize_verdict(v),
    Err(e) => {
      error!(target: "content", task = "answer_eval", error = %e, "Structured decode failed; recovering verdict heuristically");
      sanitize::sanitize_verdict(schema::heuristic_verdict(raw))
    }
  }
}

#[instrument(level = "info", skip(state, req), fields(chosen = %req.chosen_key, correct = %req.correct_key, was_correct = req.was_correct))]
pub async fn evaluate_reasoning(
  state: &AppState,
  req: &ReasoningEvalRequest,
) -> Result<ReasoningEvalOut, PipelineError> {
  let oa = provider(state)?;
  let options = req
    .options
    .iter()
    .zip(["A", "B", "C", "D"])
    .map(|(text, key)| format!("{}) {}", key, text))
    .collect::<Vec<_>>()
    .join("\n");
  let verdict = if req.was_correct { "correct" } else { "incorrect" };
  let user = fill_template(
    &state.prompts.reasoning_eval_user_template,
    &[
      ("question", &req.question),
      ("options", &options),
      ("correct_key", &req.correct_key),
      ("chosen_key", &req.chosen_key),
      ("verdict", verdict),
      ("reasoning", &req.reasoning),
    ],
  );

  let raw = oa
    .chat(&state.prompts.reasoning_eval_system, &user, OPTS_REASONING_EVAL)
    .await
    .map_err(|e| log_stage("reasoning_eval", e))?;
  let parsed = schema::parse_json(&raw).map_err(|e| log_stage("reasoning_eval", e))?;
  let validated = schema::validate_feedback(&parsed).map_err(|e| log_stage("reasoning_eval", e))?;

  Ok(sanitize::sanitize_feedback(validated))
}

#[instrument(level = "info", skip(state, req), fields(has_requester = req.requester_id.is_some()))]
pub async fn motivation_message(state: &AppState, req: &MotivationRequest) -> MotivationOut {
  let Some(oa) = &state.openai else {
    info!(target: "content", task = "motivation", "Provider not configured; serving default message");
    return MotivationOut { message: DEFAULT_MOTIVATION.into() };
  };

  let requester = req.requester_id.map(|id| id.to_string()).unwrap_or_else(|| "anonymous".into());
  let user =
    fill_template(&state.prompts.motivation_user_template, &[("requester", requester.as_str())]);

  match oa.chat(&state.prompts.motivation_system, &user, OPTS_MOTIVATION).await {
    Ok(text) => {
      let message = text.trim().to_string();
      if message.is_empty() {
        MotivationOut { message: DEFAULT_MOTIVATION.into() }
      } else {
        MotivationOut { message }
      }
    }
    Err(e) => {
      error!(target: "content", task = "motivation", error = %e, "Provider call failed; serving default message");
      MotivationOut { message: DEFAULT_MOTIVATION.into() }
    }
  }
}

/// Log a failing pipeline stage with the task name before propagating it.
fn log_stage(task: &'static str, e: PipelineError) -> PipelineError {
  error!(target: "content", task, error = %e, "Pipeline stage failed");
  e
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Prompts;
  use crate::domain::Difficulty;

  fn state_without_provider() -> AppState {
    AppState { openai: None, prompts: Prompts::default() }
  }

  /// A client whose calls can only fail at the transport layer.
  fn state_with_unreachable_provider() -> AppState {
    let openai = OpenAI {
      client: reqwest::Client::new(),
      api_key: "test-key".into(),
      base_url: "http://127.0.0.1:9".into(),
      model: "test-model".into(),
    };
    AppState { openai: Some(openai), prompts: Prompts::default() }
  }

  fn questions_request() -> QuestionsRequest {
    QuestionsRequest {
      subtopic: "fractions".into(),
      topic: "arithmetic".into(),
      count: 3,
      difficulty: Difficulty::Medium,
    }
  }

  #[tokio::test]
  async fn motivation_serves_default_when_unconfigured() {
    let state = state_without_provider();
    let out = motivation_message(&state, &MotivationRequest { requester_id: None }).await;
    assert_eq!(out.message, DEFAULT_MOTIVATION);
  }

  #[tokio::test]
  async fn motivation_serves_default_on_transport_failure() {
    let state = state_with_unreachable_provider();
    let out = motivation_message(&state, &MotivationRequest { requester_id: None }).await;
    assert_eq!(out.message, DEFAULT_MOTIVATION);
  }

  #[tokio::test]
  async fn questions_report_not_configured_without_provider() {
    let state = state_without_provider();
    let err = generate_questions(&state, &questions_request()).await.unwrap_err();
    assert!(matches!(err, PipelineError::NotConfigured));
    assert_eq!(err.status(), axum::http::StatusCode::NOT_IMPLEMENTED);
  }

  #[tokio::test]
  async fn questions_surface_transport_failures_as_service_errors() {
    let state = state_with_unreachable_provider();
    let err = generate_questions(&state, &questions_request()).await.unwrap_err();
    assert!(matches!(err, PipelineError::ProviderUnavailable(_)));
    assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn verdict_prefers_structured_decode() {
    let v = resolve_verdict(r#"{"is_correct": false, "reasoning": "Missed the key term."}"#);
    assert!(!v.is_correct);
    assert_eq!(v.reasoning, "Missed the key term.");
  }

  #[test]
  fn verdict_recovers_heuristically_from_non_json() {
    let v = resolve_verdict("¡Correcto! La respuesta es la adecuada.");
    assert!(v.is_correct);

    let v = resolve_verdict("No, that misses the point entirely.");
    assert!(!v.is_correct);
  }

  #[test]
  fn verdict_recovers_when_fields_are_missing() {
    // Valid JSON but no verdict field: still the heuristic path.
    let v = resolve_verdict(r#"{"note": "the answer is correct"}"#);
    assert!(v.is_correct);
  }
}
