//! Final prompt synthesis.
//!
//! Both coordinators bound their output by the target model's token ceiling
//! after synthesis. Only the image coordinator has a fallback: an ordered merge
//! of the specialist and platform outputs.

use std::{collections::HashSet, sync::Arc, time::Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    agent::{Agent, complete_text, truncate_to_tokens},
    agent_types::{
        AgentResult, ContextFacts, Platform, TargetModel, VideoContextFacts, confidence,
    },
    catalog::{model_profile, platform_profile},
    error::{AgentError, Result},
    inference::InferenceClient,
    prompts::{self, CoordinationSections},
};

const COORDINATOR_TEMPERATURE: f32 = 0.4;

#[derive(Debug, Clone)]
pub struct CoordinatorInput {
    pub facts: ContextFacts,
    pub visual_base: String,
    pub specialist_output: String,
    pub platform_output: String,
    pub target_model: TargetModel,
    pub platform: Platform,
}

#[derive(Debug, Clone)]
pub struct VideoCoordinatorInput {
    pub facts: VideoContextFacts,
    pub visual_base: String,
    pub motion_base: String,
    pub specialist_output: String,
    pub platform_output: String,
    pub target_model: TargetModel,
    pub platform: Platform,
}

#[derive(Debug, Clone)]
pub struct Coordinator {
    client: Arc<dyn InferenceClient>,
}

impl Coordinator {
    pub const NAME: &'static str = "Coordinator";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for Coordinator {
    type Input = CoordinatorInput;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &CoordinatorInput) -> Result<AgentResult> {
        let start = Instant::now();
        let model = model_profile(input.target_model);
        let platform = platform_profile(input.platform);
        let sections = CoordinationSections {
            facts: prompts::describe_context(&input.facts),
            visual_base: &input.visual_base,
            motion_base: None,
            specialist: &input.specialist_output,
            platform: &input.platform_output,
        };
        let prompt =
            prompts::coordinator_prompt(prompts::COORDINATOR_ROLE, &sections, &model, &platform);

        let (merged, score) =
            match complete_text(&self.client, &prompt, COORDINATOR_TEMPERATURE).await {
                Ok(text) => (text, confidence::COORDINATOR),
                Err(e) => {
                    warn!("{} merging stage outputs locally: {}", Self::NAME, e);
                    (
                        merge_phrases(&[&input.specialist_output, &input.platform_output]),
                        confidence::COORDINATOR_FALLBACK,
                    )
                }
            };

        let final_prompt = truncate_to_tokens(&merged, model.max_tokens);
        if final_prompt.is_empty() {
            return Err(AgentError::malformed(
                "no usable prompt after synthesis and fallback",
            ));
        }

        debug!(
            "{} produced final prompt for {} on {}",
            Self::NAME,
            input.target_model,
            input.platform
        );
        Ok(AgentResult::new(
            Self::NAME,
            final_prompt,
            score,
            start.elapsed(),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct VideoCoordinator {
    client: Arc<dyn InferenceClient>,
}

impl VideoCoordinator {
    pub const NAME: &'static str = "VideoCoordinator";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for VideoCoordinator {
    type Input = VideoCoordinatorInput;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &VideoCoordinatorInput) -> Result<AgentResult> {
        let start = Instant::now();
        let model = model_profile(input.target_model);
        let platform = platform_profile(input.platform);
        let sections = CoordinationSections {
            facts: prompts::describe_video_context(&input.facts),
            visual_base: &input.visual_base,
            motion_base: Some(&input.motion_base),
            specialist: &input.specialist_output,
            platform: &input.platform_output,
        };
        let prompt = prompts::coordinator_prompt(
            prompts::VIDEO_COORDINATOR_ROLE,
            &sections,
            &model,
            &platform,
        );

        let text = complete_text(&self.client, &prompt, COORDINATOR_TEMPERATURE).await?;
        let final_prompt = truncate_to_tokens(&text, model.max_tokens);
        debug!(
            "{} produced final prompt for {} on {}",
            Self::NAME,
            input.target_model,
            input.platform
        );
        Ok(AgentResult::new(
            Self::NAME,
            final_prompt,
            confidence::COORDINATOR,
            start.elapsed(),
        ))
    }
}

/// Comparison key: lower-case alphanumerics separated by single spaces.
fn phrase_key(phrase: &str) -> String {
    phrase
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join the comma/semicolon separated phrases of `sources` in order, dropping
/// repeats and empty fragments.
pub fn merge_phrases(sources: &[&str]) -> String {
    let mut seen = HashSet::new();
    let mut phrases = Vec::new();

    for source in sources {
        for raw in source.split([',', ';', '\n']) {
            let phrase = raw
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            let phrase = phrase.trim_matches(|c: char| c == '.' || c == '"' || c.is_whitespace());
            let key = phrase_key(phrase);
            if key.is_empty() || !seen.insert(key) {
                continue;
            }
            phrases.push(phrase.to_string());
        }
    }

    phrases.join(", ")
}
