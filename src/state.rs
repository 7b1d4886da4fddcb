//! Application state: prompt templates and the optional OpenAI client.
//!
//! Deliberately small. Every pipeline invocation is an independent
//! request-response cycle, so there are no stores, caches, or locks here;
//! persistence of accepted records is the caller's concern.

use tracing::{info, instrument};

use crate::config::{load_content_config_from_env, Prompts};
use crate::openai::OpenAI;

#[derive(Clone)]
pub struct AppState {
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load prompt config, init OpenAI if keyed.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let prompts = load_content_config_from_env()
            .map(|c| c.prompts)
            .unwrap_or_default();

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "edugen_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "edugen_backend", "OpenAI disabled (no OPENAI_API_KEY). Generation endpoints will report not-configured.");
        }

        Self { openai, prompts }
    }
}
