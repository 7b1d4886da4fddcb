//! Loading prompt configuration from TOML.
//!
//! Every task has a system prompt and a user-message template. Defaults are
//! complete; a TOML file at CONTENT_CONFIG_PATH may override any of them to
//! tune tone or structure without a rebuild.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ContentConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt templates for the five content tasks. Each template states the
/// required output shape (field names, option counts, alphabets, numeric
/// bounds) literally, because the provider honors nothing it is not told.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  // Question generation
  pub questions_system: String,
  pub questions_user_template: String,
  // Study-route generation
  pub route_system: String,
  pub route_user_template: String,
  // Short-answer evaluation
  pub answer_eval_system: String,
  pub answer_eval_user_template: String,
  // Structured-reasoning evaluation
  pub reasoning_eval_system: String,
  pub reasoning_eval_user_template: String,
  // Motivational copy
  pub motivation_system: String,
  pub motivation_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      questions_system: "You are an education content generator. Respond ONLY with a strict JSON object, no prose around it.".into(),
      questions_user_template: concat!(
        "Generate {count} multiple-choice questions about the subtopic '{subtopic}' ",
        "within the topic '{topic}' at '{difficulty}' difficulty.\n",
        "Return JSON: {\"questions\": [{\"prompt\": string, \"options\": [string, string, string, string], ",
        "\"answer_key\": \"A\"|\"B\"|\"C\"|\"D\", \"explanation\": string}]}.\n",
        "Rules: exactly 4 options per question; option text must NOT carry a leading ",
        "enumeration label such as 'A)' or 'B.'; prompt and explanation must be non-empty."
      ).into(),
      route_system: "You are a study planner. Respond ONLY with a strict JSON object, no prose around it.".into(),
      route_user_template: concat!(
        "Design a study route for this objective: {objective}\n",
        "Return JSON: {\"topics\": [{\"name\": string, \"estimated_minutes\": integer, ",
        "\"priority\": integer, \"difficulty\": \"easy\"|\"medium\"|\"hard\", \"intro\": string, ",
        "\"subtopics\": [{\"name\": string, \"estimated_minutes\": integer, \"priority\": integer, ",
        "\"content\": string}]}]}.\n",
        "Rules: at most 10 topics ordered most important first; at most 8 subtopics per topic; ",
        "estimated_minutes between 5 and 600; priority between 1 and 5."
      ).into(),
      answer_eval_system: "You are a strict but fair grader. Output compact JSON only.".into(),
      answer_eval_user_template: concat!(
        "Question: {question}\nExpected answer: {expected}\nStudent answer: {answer}\n",
        "Return JSON: {\"is_correct\": boolean, \"reasoning\": string}. ",
        "Accept paraphrases that preserve the meaning of the expected answer."
      ).into(),
      reasoning_eval_system: "You are a reasoning coach for multiple-choice practice. Output compact JSON only.".into(),
      reasoning_eval_user_template: concat!(
        "Question: {question}\nOptions: {options}\nCorrect option: {correct_key}\n",
        "Student chose: {chosen_key} ({verdict})\nStudent reasoning: {reasoning}\n",
        "Return JSON: {\"strengths\": string, \"gaps\": string, \"suggestion\": string}. ",
        "All three fields are required and must be non-empty."
      ).into(),
      motivation_system: "You write one short, warm, specific motivational message for a student. Output the message text only, no quotes.".into(),
      motivation_user_template: "Write one motivational message (under 40 words) for student {requester}.".into(),
    }
  }
}

/// Attempt to load `ContentConfig` from CONTENT_CONFIG_PATH.
/// On any parsing/IO error, returns None and the defaults apply.
pub fn load_content_config_from_env() -> Option<ContentConfig> {
  let path = std::env::var("CONTENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<ContentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "edugen_backend", %path, "Loaded content config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "edugen_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "edugen_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
