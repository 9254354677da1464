//! Target-model specialists.
//!
//! [`FluxSpecialist`] degrades to a rule-based rewrite when inference fails;
//! [`KlingSpecialist`] has no fallback and returns the error to the caller.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    agent::{Agent, complete_text, truncate_to_tokens},
    agent_types::{AgentResult, ContextFacts, TargetModel, VideoContextFacts, confidence},
    catalog::model_profile,
    error::Result,
    inference::InferenceClient,
    prompts,
};

const SPECIALIST_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct SpecialistInput {
    pub facts: ContextFacts,
    pub base_prompt: String,
    pub target_model: TargetModel,
}

#[derive(Debug, Clone)]
pub struct KlingInput {
    pub facts: VideoContextFacts,
    pub base_prompt: String,
    pub motion_specs: String,
    pub target_model: TargetModel,
}

#[derive(Debug, Clone)]
pub struct FluxSpecialist {
    client: Arc<dyn InferenceClient>,
}

impl FluxSpecialist {
    pub const NAME: &'static str = "FluxSpecialist";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for FluxSpecialist {
    type Input = SpecialistInput;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &SpecialistInput) -> Result<AgentResult> {
        let start = Instant::now();
        let profile = model_profile(input.target_model);
        let prompt = prompts::flux_prompt(&input.facts, &input.base_prompt, &profile);

        let (content, score) =
            match complete_text(&self.client, &prompt, SPECIALIST_TEMPERATURE).await {
                Ok(text) => {
                    debug!("{} rewrote prompt for {}", Self::NAME, input.target_model);
                    (text, confidence::FLUX)
                }
                Err(e) => {
                    warn!(
                        "{} using {} fallback: {}",
                        Self::NAME,
                        input.target_model,
                        e
                    );
                    (fallback_flux(input), confidence::FLUX_FALLBACK)
                }
            };

        Ok(AgentResult::new(Self::NAME, content, score, start.elapsed()))
    }
}

fn model_detail(model: TargetModel) -> &'static str {
    match model {
        TargetModel::FluxPro => {
            "shot on a full-frame camera with an 85mm lens, ultra-detailed textures, \
             professional color grading"
        }
        TargetModel::FluxDev => "natural lighting and a cohesive atmosphere",
        _ => "sharp focus",
    }
}

fn industry_detail(industry: &str) -> &'static str {
    match industry {
        "food" => "shallow depth of field on the hero dish",
        "automotive" => "reflections tracing the bodywork",
        "fashion" => "fabric texture in crisp detail",
        "technology" => "precise edges and clean materials",
        "beauty" => "soft diffused glow on skin",
        "fitness" => "defined muscle and motion detail",
        "travel" => "expansive sense of place",
        "real estate" => "straight verticals and airy interiors",
        _ => "clear subject separation",
    }
}

/// Rule-based rewrite keyed by target model and industry.
pub fn fallback_flux(input: &SpecialistInput) -> String {
    let base = input.base_prompt.trim().trim_end_matches('.');
    let text = match input.target_model {
        TargetModel::FluxSchnell => format!("{base}, {}", model_detail(input.target_model)),
        model => format!(
            "{base}, {}, {}",
            model_detail(model),
            industry_detail(&input.facts.industry)
        ),
    };
    truncate_to_tokens(&text, model_profile(input.target_model).max_tokens)
}

#[derive(Debug, Clone)]
pub struct KlingSpecialist {
    client: Arc<dyn InferenceClient>,
}

impl KlingSpecialist {
    pub const NAME: &'static str = "KlingSpecialist";

    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for KlingSpecialist {
    type Input = KlingInput;

    fn name(&self) -> &str {
        Self::NAME
    }

    async fn process(&self, input: &KlingInput) -> Result<AgentResult> {
        let start = Instant::now();
        let profile = model_profile(input.target_model);
        let prompt = prompts::kling_prompt(
            &input.facts,
            &input.base_prompt,
            &input.motion_specs,
            &profile,
        );

        let text = complete_text(&self.client, &prompt, SPECIALIST_TEMPERATURE).await?;
        debug!("{} rewrote prompt for {}", Self::NAME, input.target_model);
        Ok(AgentResult::new(
            Self::NAME,
            text,
            confidence::KLING,
            start.elapsed(),
        ))
    }
}
