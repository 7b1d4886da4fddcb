//! HTTP endpoint handlers. These are thin wrappers that validate input and
//! forward to the pipelines. Each handler is instrumented; failures map to
//! status codes via `PipelineError::into_response`.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::error::PipelineError;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;
use crate::validate;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(subtopic = %body.subtopic, topic = %body.topic))]
pub async fn http_post_questions(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuestionsIn>,
) -> Result<Json<QuestionsOut>, PipelineError> {
  let req = validate::validate_questions(body)?;
  let out = logic::generate_questions(&state, &req).await?;
  info!(target: "content", served = out.questions.len(), "HTTP questions served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(objective_len = body.objective.len()))]
pub async fn http_post_route(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RouteIn>,
) -> Result<Json<RouteOut>, PipelineError> {
  let req = validate::validate_route(body)?;
  let out = logic::generate_route(&state, &req).await?;
  info!(target: "content", topics = out.topics.len(), "HTTP study route served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(answer_len = body.user_answer.len()))]
pub async fn http_post_answer_eval(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerEvalIn>,
) -> Result<Json<AnswerEvalOut>, PipelineError> {
  let req = validate::validate_answer_eval(body)?;
  let verdict = logic::evaluate_answer(&state, &req).await?;
  info!(target: "content", is_correct = verdict.is_correct, "HTTP answer evaluated");
  Ok(Json(verdict))
}

#[instrument(level = "info", skip(state, body), fields(chosen = %body.chosen_key))]
pub async fn http_post_reasoning_eval(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ReasoningEvalIn>,
) -> Result<Json<ReasoningEvalOut>, PipelineError> {
  let req = validate::validate_reasoning_eval(body)?;
  let feedback = logic::evaluate_reasoning(&state, &req).await?;
  info!(target: "content", "HTTP reasoning feedback served");
  Ok(Json(feedback))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_motivation(
  State(state): State<Arc<AppState>>,
  body: Option<Json<MotivationIn>>,
) -> Result<Json<MotivationOut>, PipelineError> {
  let req = validate::validate_motivation(body.map(|Json(b)| b).unwrap_or_default())?;
  Ok(Json(logic::motivation_message(&state, &req).await))
}
