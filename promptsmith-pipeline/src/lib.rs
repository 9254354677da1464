//! # PromptSmith pipeline
//!
//! Turns a short free-text request into a generation prompt tuned for one
//! target model and one publishing platform.
//!
//! ## Core Concepts
//!
//! - **Stage**: a position in a run ([`PipelineStage`])
//! - **RunContext**: typed outputs of every stage so far
//! - **StageNode**: runs the agent(s) of one stage
//! - **StageFlow**: maps stages to nodes and drives a run to a terminal stage
//! - **PromptAgentSystem**: picks the image or video flow and assembles the
//!   [`PipelineResult`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promptsmith_pipeline::prelude::*;
//!
//! # async fn run() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let system = PromptAgentSystem::new(PipelineConfig::from_env()?)?;
//! let request = GenerationRequest::new(
//!     "A red sports car driving through a neon city at night",
//!     ContentType::Image,
//!     Platform::Instagram,
//!     TargetModel::FluxDev,
//! );
//! let result = system.generate(&request).await?;
//! println!("{}", result.final_prompt);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod flow;
pub mod node;
pub mod nodes;
pub mod orchestrator;
pub mod pacing;
pub mod request;
pub mod state;

pub use config::PipelineConfig;
pub use error::{FieldError, FlowError, PipelineError, ValidationErrors};
pub use orchestrator::{PipelineMetadata, PipelineResult, PromptAgentSystem, VideoSpecs};
pub use request::{GenerationRequest, RawGenerationRequest};
pub use state::PipelineStage;

#[cfg(test)]
mod pipeline_test;

/// Convenient re-exports for common use.
pub mod prelude {
    pub use promptsmith_agents::{
        AgentResult, ContentType, ContextData, ContextFacts, InferenceClient, InferenceConfig,
        Platform, TargetModel, VideoContextFacts,
    };

    pub use crate::{
        config::PipelineConfig,
        context::RunContext,
        error::{FieldError, FlowError, PipelineError, ValidationErrors},
        flow::{FlowResult, StageFlow, StageFlowBuilder},
        node::StageNode,
        orchestrator::{PipelineMetadata, PipelineResult, PromptAgentSystem, VideoSpecs},
        pacing::PacingPolicy,
        request::{GenerationRequest, RawGenerationRequest},
        state::{FlowState, PipelineStage},
    };
}
