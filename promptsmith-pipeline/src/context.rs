//! Typed state carried between stage nodes.

use promptsmith_agents::{
    AgentResult, ContentType, ContextData, ContextFacts, Platform, TargetModel, VideoContextFacts,
    visual::fallback_motion,
};
use uuid::Uuid;

use crate::{
    error::{FlowError, Result},
    request::GenerationRequest,
};

/// Why a run was aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub agent: String,
    pub message: String,
}

/// Everything one pipeline run has produced so far.
///
/// Stage outputs are written once by the node that owns them; the response
/// log is append-only and kept in pipeline order.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    /// Input sent to the models; carries the marker on variation runs.
    pub user_input: String,
    /// Input as the user wrote it.
    pub subject: String,
    pub content_type: ContentType,
    pub platform: Platform,
    pub target_model: TargetModel,
    pub context: Option<ContextData>,
    pub visual_base: Option<String>,
    pub motion_base: Option<String>,
    pub specialist_output: Option<String>,
    pub platform_output: Option<String>,
    pub final_prompt: Option<String>,
    responses: Vec<AgentResult>,
    failure: Option<StageFailure>,
}

impl RunContext {
    pub fn new(request: &GenerationRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            user_input: request.user_input.clone(),
            subject: request.user_input.clone(),
            content_type: request.content_type,
            platform: request.platform,
            target_model: request.target_model,
            context: None,
            visual_base: None,
            motion_base: None,
            specialist_output: None,
            platform_output: None,
            final_prompt: None,
            responses: Vec::new(),
            failure: None,
        }
    }

    /// Context for the `index`-th variation run: the marker goes to the
    /// models, the subject stays as written.
    pub fn for_variation(request: &GenerationRequest, index: usize) -> Self {
        Self {
            user_input: request.variation(index).user_input,
            ..Self::new(request)
        }
    }

    /// Context for optimize mode: generic facts, the supplied prompt as the
    /// visual base, and a generic motion plan on the video route.
    pub fn for_optimization(
        prompt: &str,
        platform: Platform,
        content_type: ContentType,
        target_model: TargetModel,
    ) -> Self {
        let (context, motion_base) = match content_type {
            ContentType::Image => (ContextData::Image(ContextFacts::generic()), None),
            ContentType::Video => {
                let facts = VideoContextFacts::generic();
                let motion = fallback_motion(&facts);
                (ContextData::Video(facts), Some(motion))
            }
        };

        Self {
            run_id: Uuid::new_v4(),
            user_input: prompt.to_string(),
            subject: prompt.to_string(),
            content_type,
            platform,
            target_model,
            context: Some(context),
            visual_base: Some(prompt.to_string()),
            motion_base,
            specialist_output: None,
            platform_output: None,
            final_prompt: None,
            responses: Vec::new(),
            failure: None,
        }
    }

    pub fn facts(&self) -> Result<&ContextFacts> {
        self.context
            .as_ref()
            .map(ContextData::base)
            .ok_or(FlowError::MissingInput("context facts"))
    }

    pub fn video_facts(&self) -> Result<&VideoContextFacts> {
        self.context
            .as_ref()
            .and_then(ContextData::as_video)
            .ok_or(FlowError::MissingInput("video context facts"))
    }

    pub fn visual_base(&self) -> Result<&str> {
        self.visual_base
            .as_deref()
            .ok_or(FlowError::MissingInput("visual base"))
    }

    pub fn motion_base(&self) -> Result<&str> {
        self.motion_base
            .as_deref()
            .ok_or(FlowError::MissingInput("motion base"))
    }

    pub fn specialist_output(&self) -> Result<&str> {
        self.specialist_output
            .as_deref()
            .ok_or(FlowError::MissingInput("specialist output"))
    }

    pub fn platform_output(&self) -> Result<&str> {
        self.platform_output
            .as_deref()
            .ok_or(FlowError::MissingInput("platform output"))
    }

    /// Append to the response log.
    pub fn record(&mut self, result: AgentResult) {
        self.responses.push(result);
    }

    pub fn responses(&self) -> &[AgentResult] {
        &self.responses
    }

    pub fn into_responses(self) -> Vec<AgentResult> {
        self.responses
    }

    pub fn fail(&mut self, agent: impl Into<String>, message: impl Into<String>) {
        self.failure = Some(StageFailure {
            agent: agent.into(),
            message: message.into(),
        });
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        self.failure.as_ref()
    }

    /// Arithmetic mean of every logged confidence; 0 for an empty log.
    pub fn mean_confidence(&self) -> f64 {
        if self.responses.is_empty() {
            return 0.0;
        }
        let total: f64 = self.responses.iter().map(|r| r.confidence).sum();
        total / self.responses.len() as f64
    }
}
