//! Pipeline configuration.

use std::{str::FromStr, time::Duration};

use promptsmith_agents::{AgentError, InferenceConfig, Result};
use serde::{Deserialize, Serialize};

use crate::pacing::PacingPolicy;

pub const DEFAULT_MAX_VARIATIONS: usize = 5;

pub const ENV_API_KEY: &str = "PROMPTSMITH_API_KEY";
pub const ENV_BASE_URL: &str = "PROMPTSMITH_BASE_URL";
pub const ENV_MODEL: &str = "PROMPTSMITH_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "PROMPTSMITH_TIMEOUT_SECS";
pub const ENV_VARIATION_DELAY_MS: &str = "PROMPTSMITH_VARIATION_DELAY_MS";
pub const ENV_MAX_VARIATIONS: &str = "PROMPTSMITH_MAX_VARIATIONS";

/// Settings shared by every run of a [`crate::PromptAgentSystem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub inference: InferenceConfig,
    pub pacing: PacingPolicy,
    /// Upper bound for `generate_variations`.
    pub max_variations: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            pacing: PacingPolicy::default(),
            max_variations: DEFAULT_MAX_VARIATIONS,
        }
    }
}

impl PipelineConfig {
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_max_variations(mut self, max_variations: usize) -> Self {
        self.max_variations = max_variations;
        self
    }

    /// Defaults overridden by `PROMPTSMITH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(api_key) = get(ENV_API_KEY) {
            config.inference = config.inference.with_api_key(api_key);
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            config.inference = config.inference.with_base_url(base_url);
        }
        if let Some(model) = get(ENV_MODEL) {
            config.inference = config.inference.with_model(model);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = parse_number(ENV_TIMEOUT_SECS, &secs)?;
            config.inference = config.inference.with_timeout(Duration::from_secs(secs));
        }
        if let Some(millis) = get(ENV_VARIATION_DELAY_MS) {
            let millis: u64 = parse_number(ENV_VARIATION_DELAY_MS, &millis)?;
            config.pacing = PacingPolicy::FixedInterval(Duration::from_millis(millis));
        }
        if let Some(max) = get(ENV_MAX_VARIATIONS) {
            config.max_variations = parse_number(ENV_MAX_VARIATIONS, &max)?;
        }

        Ok(config)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AgentError::configuration(format!("{key}='{value}' is not a number: {e}")))
}
