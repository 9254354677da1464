//! Stage nodes for the image and video routes.
//!
//! Each node wraps the agent(s) of one stage. Results are recorded in
//! pipeline order; the specialization nodes issue both calls concurrently and
//! record the specialist before the platform optimizer regardless of which
//! finishes first.

use std::sync::Arc;

use async_trait::async_trait;
use promptsmith_agents::{
    AgentResult, ContextData, InferenceClient,
    agent::Agent,
    context_analyzer::{ContextAnalyzer, VideoContextAnalyzer},
    coordinator::{Coordinator, CoordinatorInput, VideoCoordinator, VideoCoordinatorInput},
    platform::{PlatformInput, PlatformOptimizer, VideoPlatformInput, VideoPlatformOptimizer},
    specialists::{FluxSpecialist, KlingInput, KlingSpecialist, SpecialistInput},
    visual::{MotionGenerator, MotionInput, VisualGenerator, VisualInput},
};
use tracing::{error, info};

use crate::{context::RunContext, error::Result, node::StageNode, state::PipelineStage};

/// Record `outcome` and return its content, or mark the run failed.
fn settle(
    context: &mut RunContext,
    agent: &str,
    outcome: promptsmith_agents::Result<AgentResult>,
) -> Option<String> {
    match outcome {
        Ok(result) => {
            let content = result.content.clone();
            context.record(result);
            Some(content)
        }
        Err(e) => {
            error!("[{}] {} failed ({}): {}", context.run_id, agent, e.category(), e);
            context.fail(agent, e.to_string());
            None
        }
    }
}

#[derive(Debug)]
pub struct ContextAnalysisNode {
    analyzer: ContextAnalyzer,
}

impl ContextAnalysisNode {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            analyzer: ContextAnalyzer::new(client),
        }
    }
}

#[async_trait]
impl StageNode for ContextAnalysisNode {
    async fn execute(&self, mut context: RunContext) -> Result<(RunContext, PipelineStage)> {
        info!("[{}] analyzing image request", context.run_id);
        match self.analyzer.analyze(&context.user_input).await {
            Ok(analysis) => {
                context.context = Some(ContextData::Image(analysis.facts));
                context.record(analysis.result);
                Ok((context, PipelineStage::VisualGeneration))
            }
            Err(e) => {
                context.fail(ContextAnalyzer::NAME, e.to_string());
                Ok((context, PipelineStage::Failed))
            }
        }
    }

    fn name(&self) -> String {
        "context_analysis".to_string()
    }
}

#[derive(Debug)]
pub struct VideoContextAnalysisNode {
    analyzer: VideoContextAnalyzer,
}

impl VideoContextAnalysisNode {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            analyzer: VideoContextAnalyzer::new(client),
        }
    }
}

#[async_trait]
impl StageNode for VideoContextAnalysisNode {
    async fn execute(&self, mut context: RunContext) -> Result<(RunContext, PipelineStage)> {
        info!("[{}] analyzing video request", context.run_id);
        match self.analyzer.analyze(&context.user_input).await {
            Ok(analysis) => {
                context.context = Some(ContextData::Video(analysis.facts));
                context.record(analysis.result);
                Ok((context, PipelineStage::VisualGeneration))
            }
            Err(e) => {
                context.fail(VideoContextAnalyzer::NAME, e.to_string());
                Ok((context, PipelineStage::Failed))
            }
        }
    }

    fn name(&self) -> String {
        "video_context_analysis".to_string()
    }
}

/// Shared by both routes; `next` is the stage that follows on the route.
#[derive(Debug)]
pub struct VisualGenerationNode {
    generator: VisualGenerator,
    next: PipelineStage,
}

impl VisualGenerationNode {
    pub fn new(client: Arc<dyn InferenceClient>, next: PipelineStage) -> Self {
        Self {
            generator: VisualGenerator::new(client),
            next,
        }
    }
}

#[async_trait]
impl StageNode for VisualGenerationNode {
    async fn execute(&self, mut context: RunContext) -> Result<(RunContext, PipelineStage)> {
        info!("[{}] generating visual base", context.run_id);
        let input = VisualInput {
            user_input: context.user_input.clone(),
            subject: context.subject.clone(),
            facts: context.facts()?.clone(),
        };
        let outcome = self.generator.process(&input).await;
        match settle(&mut context, VisualGenerator::NAME, outcome) {
            Some(visual) => {
                context.visual_base = Some(visual);
                Ok((context, self.next))
            }
            None => Ok((context, PipelineStage::Failed)),
        }
    }

    fn name(&self) -> String {
        "visual_generation".to_string()
    }
}

#[derive(Debug)]
pub struct MotionGenerationNode {
    generator: MotionGenerator,
}

impl MotionGenerationNode {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            generator: MotionGenerator::new(client),
        }
    }
}

#[async_trait]
impl StageNode for MotionGenerationNode {
    async fn execute(&self, mut context: RunContext) -> Result<(RunContext, PipelineStage)> {
        info!("[{}] generating motion plan", context.run_id);
        let input = MotionInput {
            facts: context.video_facts()?.clone(),
            visual_base: context.visual_base()?.to_string(),
        };
        let outcome = self.generator.process(&input).await;
        match settle(&mut context, MotionGenerator::NAME, outcome) {
            Some(motion) => {
                context.motion_base = Some(motion);
                Ok((context, PipelineStage::Specialization))
            }
            None => Ok((context, PipelineStage::Failed)),
        }
    }

    fn name(&self) -> String {
        "motion_generation".to_string()
    }
}

/// Record the fan-in of a specialization stage in pipeline order.
fn settle_pair(
    mut context: RunContext,
    specialist: (&str, promptsmith_agents::Result<AgentResult>),
    platform: (&str, promptsmith_agents::Result<AgentResult>),
) -> (RunContext, PipelineStage) {
    let Some(specialist_output) = settle(&mut context, specialist.0, specialist.1) else {
        return (context, PipelineStage::Failed);
    };
    let Some(platform_output) = settle(&mut context, platform.0, platform.1) else {
        return (context, PipelineStage::Failed);
    };
    context.specialist_output = Some(specialist_output);
    context.platform_output = Some(platform_output);
    (context, PipelineStage::Coordination)
}

#[derive(Debug)]
pub struct SpecializationNode {
    specialist: FluxSpecialist,
    optimizer: PlatformOptimizer,
}

impl SpecializationNode {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            specialist: FluxSpecialist::new(client.clone()),
            optimizer: PlatformOptimizer::new(client),
        }
    }
}

#[async_trait]
impl StageNode for SpecializationNode {
    async fn execute(&self, context: RunContext) -> Result<(RunContext, PipelineStage)> {
        info!(
            "[{}] specializing for {} on {}",
            context.run_id, context.target_model, context.platform
        );
        let facts = context.facts()?.clone();
        let base_prompt = context.visual_base()?.to_string();
        let specialist_input = SpecialistInput {
            facts: facts.clone(),
            base_prompt: base_prompt.clone(),
            target_model: context.target_model,
        };
        let platform_input = PlatformInput {
            facts,
            base_prompt,
            platform: context.platform,
        };

        let (specialist, platform) = tokio::join!(
            self.specialist.process(&specialist_input),
            self.optimizer.process(&platform_input)
        );

        Ok(settle_pair(
            context,
            (FluxSpecialist::NAME, specialist),
            (PlatformOptimizer::NAME, platform),
        ))
    }

    fn name(&self) -> String {
        "specialization".to_string()
    }
}

#[derive(Debug)]
pub struct VideoSpecializationNode {
    specialist: KlingSpecialist,
    optimizer: VideoPlatformOptimizer,
}

impl VideoSpecializationNode {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            specialist: KlingSpecialist::new(client.clone()),
            optimizer: VideoPlatformOptimizer::new(client),
        }
    }
}

#[async_trait]
impl StageNode for VideoSpecializationNode {
    async fn execute(&self, context: RunContext) -> Result<(RunContext, PipelineStage)> {
        info!(
            "[{}] specializing for {} on {}",
            context.run_id, context.target_model, context.platform
        );
        let facts = context.video_facts()?.clone();
        let base_prompt = context.visual_base()?.to_string();
        let motion_specs = context.motion_base()?.to_string();
        let specialist_input = KlingInput {
            facts: facts.clone(),
            base_prompt: base_prompt.clone(),
            motion_specs: motion_specs.clone(),
            target_model: context.target_model,
        };
        let platform_input = VideoPlatformInput {
            facts,
            base_prompt,
            motion_specs,
            platform: context.platform,
        };

        let (specialist, platform) = tokio::join!(
            self.specialist.process(&specialist_input),
            self.optimizer.process(&platform_input)
        );

        Ok(settle_pair(
            context,
            (KlingSpecialist::NAME, specialist),
            (VideoPlatformOptimizer::NAME, platform),
        ))
    }

    fn name(&self) -> String {
        "video_specialization".to_string()
    }
}

#[derive(Debug)]
pub struct CoordinationNode {
    coordinator: Coordinator,
}

impl CoordinationNode {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            coordinator: Coordinator::new(client),
        }
    }
}

#[async_trait]
impl StageNode for CoordinationNode {
    async fn execute(&self, mut context: RunContext) -> Result<(RunContext, PipelineStage)> {
        info!("[{}] coordinating final prompt", context.run_id);
        let input = CoordinatorInput {
            facts: context.facts()?.clone(),
            visual_base: context.visual_base()?.to_string(),
            specialist_output: context.specialist_output()?.to_string(),
            platform_output: context.platform_output()?.to_string(),
            target_model: context.target_model,
            platform: context.platform,
        };
        let outcome = self.coordinator.process(&input).await;
        match settle(&mut context, Coordinator::NAME, outcome) {
            Some(prompt) => {
                context.final_prompt = Some(prompt);
                Ok((context, PipelineStage::Complete))
            }
            None => Ok((context, PipelineStage::Failed)),
        }
    }

    fn name(&self) -> String {
        "coordination".to_string()
    }
}

#[derive(Debug)]
pub struct VideoCoordinationNode {
    coordinator: VideoCoordinator,
}

impl VideoCoordinationNode {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            coordinator: VideoCoordinator::new(client),
        }
    }
}

#[async_trait]
impl StageNode for VideoCoordinationNode {
    async fn execute(&self, mut context: RunContext) -> Result<(RunContext, PipelineStage)> {
        info!("[{}] coordinating final video prompt", context.run_id);
        let input = VideoCoordinatorInput {
            facts: context.video_facts()?.clone(),
            visual_base: context.visual_base()?.to_string(),
            motion_base: context.motion_base()?.to_string(),
            specialist_output: context.specialist_output()?.to_string(),
            platform_output: context.platform_output()?.to_string(),
            target_model: context.target_model,
            platform: context.platform,
        };
        let outcome = self.coordinator.process(&input).await;
        match settle(&mut context, VideoCoordinator::NAME, outcome) {
            Some(prompt) => {
                context.final_prompt = Some(prompt);
                Ok((context, PipelineStage::Complete))
            }
            None => Ok((context, PipelineStage::Failed)),
        }
    }

    fn name(&self) -> String {
        "video_coordination".to_string()
    }
}
