//! The `PromptAgentSystem` orchestrator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use promptsmith_agents::{
    AgentResult, ContentType, ContextData, HttpInferenceClient, InferenceClient, Platform,
    TargetModel, VideoContextFacts, catalog::platform_profile, estimate_tokens,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    config::PipelineConfig,
    context::RunContext,
    error::{PipelineError, ValidationErrors},
    flow::{FlowResult, StageFlow},
    nodes::{
        ContextAnalysisNode, CoordinationNode, MotionGenerationNode, SpecializationNode,
        VideoContextAnalysisNode, VideoCoordinationNode, VideoSpecializationNode,
        VisualGenerationNode,
    },
    request::{GenerationRequest, check_model},
    state::PipelineStage,
};

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Clip parameters reported on the video route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSpecs {
    pub duration: String,
    pub aspect_ratio: String,
    pub camera_movement: String,
    pub motion_type: String,
}

impl VideoSpecs {
    pub fn new(facts: &VideoContextFacts, platform: Platform) -> Self {
        Self {
            duration: facts.duration_preference.clone(),
            aspect_ratio: platform_profile(platform).video_aspect_ratio.to_string(),
            camera_movement: facts.camera_movement.clone(),
            motion_type: facts.motion_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub context: ContextData,
    pub processing_time_ms: u64,
    pub agents_used: Vec<String>,
    /// Mean confidence over `agent_responses`.
    pub confidence_score: f64,
    pub target_model: TargetModel,
    pub content_type: ContentType,
    pub estimated_tokens: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_specs: Option<VideoSpecs>,
}

/// Outcome of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub final_prompt: String,
    pub metadata: PipelineMetadata,
    /// Agent results in pipeline order.
    pub agent_responses: Vec<AgentResult>,
}

/// Runs the image and video pipelines against a shared inference client.
#[derive(Debug)]
pub struct PromptAgentSystem {
    config: PipelineConfig,
    image_flow: StageFlow,
    video_flow: StageFlow,
}

impl PromptAgentSystem {
    /// Build with an HTTP inference client from `config.inference`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let client = HttpInferenceClient::new(config.inference.clone())?;
        Self::with_client(Arc::new(client), config)
    }

    /// Build around any inference client.
    pub fn with_client(client: Arc<dyn InferenceClient>, config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            image_flow: image_flow(client.clone())?,
            video_flow: video_flow(client)?,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for one request.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<PipelineResult> {
        request.validate()?;
        self.run(RunContext::new(request)).await
    }

    /// Run `count` paced variations of one request, stopping at the first
    /// fatal error.
    pub async fn generate_variations(
        &self,
        request: &GenerationRequest,
        count: usize,
    ) -> Result<Vec<PipelineResult>> {
        if count == 0 || count > self.config.max_variations {
            return Err(ValidationErrors::single(
                "count",
                format!(
                    "must be between 1 and {}, got {count}",
                    self.config.max_variations
                ),
            )
            .into());
        }
        request.validate()?;

        let mut results = Vec::with_capacity(count);
        for index in 0..count {
            self.config.pacing.pace(index).await;
            results.push(self.run(RunContext::for_variation(request, index + 1)).await?);
        }
        Ok(results)
    }

    /// Re-target an existing prompt: only the specialization and
    /// coordination stages run, over generic facts.
    pub async fn optimize_existing(
        &self,
        prompt: &str,
        platform: Platform,
        content_type: ContentType,
        target_model: TargetModel,
    ) -> Result<String> {
        let mut errors = ValidationErrors::default();
        if prompt.trim().is_empty() {
            errors.push("prompt", "must not be empty");
        }
        check_model(target_model, content_type, &mut errors);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let context =
            RunContext::for_optimization(prompt.trim(), platform, content_type, target_model);
        info!(
            "[{}] optimizing existing {} prompt for {} on {}",
            context.run_id, content_type, target_model, platform
        );
        let outcome = self
            .flow_for(content_type)
            .execute_from(PipelineStage::Specialization, context)
            .await?;
        Ok(finish(outcome)?.final_prompt)
    }

    fn flow_for(&self, content_type: ContentType) -> &StageFlow {
        match content_type {
            ContentType::Image => &self.image_flow,
            ContentType::Video => &self.video_flow,
        }
    }

    async fn run(&self, context: RunContext) -> Result<PipelineResult> {
        info!(
            "[{}] starting {} run for {} on {}",
            context.run_id, context.content_type, context.target_model, context.platform
        );
        let outcome = self.flow_for(context.content_type).execute(context).await?;
        finish(outcome)
    }
}

fn finish(outcome: FlowResult) -> Result<PipelineResult> {
    let FlowResult {
        context, duration, ..
    } = outcome;

    if let Some(failure) = context.failure() {
        error!(
            "[{}] run aborted by {}: {}",
            context.run_id, failure.agent, failure.message
        );
        return Err(PipelineError::fatal(&failure.agent, &failure.message));
    }

    let final_prompt = context
        .final_prompt
        .clone()
        .ok_or_else(|| PipelineError::Flow("run completed without a final prompt".to_string()))?;
    let context_data = context
        .context
        .clone()
        .ok_or_else(|| PipelineError::Flow("run completed without context facts".to_string()))?;

    let confidence_score = context.mean_confidence();
    let video_specs = context_data
        .as_video()
        .map(|facts| VideoSpecs::new(facts, context.platform));
    let metadata = PipelineMetadata {
        run_id: context.run_id,
        generated_at: Utc::now(),
        processing_time_ms: duration.as_millis() as u64,
        agents_used: context
            .responses()
            .iter()
            .map(|r| r.agent_name.clone())
            .collect(),
        confidence_score,
        target_model: context.target_model,
        content_type: context.content_type,
        estimated_tokens: estimate_tokens(&final_prompt),
        video_specs,
        context: context_data,
    };

    info!(
        "[{}] {} run complete in {}ms, confidence {:.2}",
        metadata.run_id, metadata.content_type, metadata.processing_time_ms, confidence_score
    );

    Ok(PipelineResult {
        final_prompt,
        metadata,
        agent_responses: context.into_responses(),
    })
}

fn image_flow(client: Arc<dyn InferenceClient>) -> Result<StageFlow> {
    Ok(StageFlow::builder()
        .name("image_pipeline")
        .initial_stage(PipelineStage::ContextAnalysis)
        .node(
            PipelineStage::ContextAnalysis,
            ContextAnalysisNode::new(client.clone()),
        )
        .node(
            PipelineStage::VisualGeneration,
            VisualGenerationNode::new(client.clone(), PipelineStage::Specialization),
        )
        .node(
            PipelineStage::Specialization,
            SpecializationNode::new(client.clone()),
        )
        .node(PipelineStage::Coordination, CoordinationNode::new(client))
        .build()?)
}

fn video_flow(client: Arc<dyn InferenceClient>) -> Result<StageFlow> {
    Ok(StageFlow::builder()
        .name("video_pipeline")
        .initial_stage(PipelineStage::ContextAnalysis)
        .node(
            PipelineStage::ContextAnalysis,
            VideoContextAnalysisNode::new(client.clone()),
        )
        .node(
            PipelineStage::VisualGeneration,
            VisualGenerationNode::new(client.clone(), PipelineStage::MotionGeneration),
        )
        .node(
            PipelineStage::MotionGeneration,
            MotionGenerationNode::new(client.clone()),
        )
        .node(
            PipelineStage::Specialization,
            VideoSpecializationNode::new(client.clone()),
        )
        .node(PipelineStage::Coordination, VideoCoordinationNode::new(client))
        .build()?)
}
