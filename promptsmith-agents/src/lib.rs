//! Prompt-synthesis agents.
//!
//! Each agent wraps one chat-completion call with a fixed role. Analyzers,
//! generators, the Flux specialist, the image platform optimizer and the image
//! coordinator absorb inference failures with deterministic fallbacks; the
//! Kling specialist, video platform optimizer and video coordinator return
//! them.

pub mod agent;
pub mod agent_types;
pub mod catalog;
pub mod context_analyzer;
pub mod coordinator;
pub mod error;
pub mod inference;
pub mod json_repair;
pub mod platform;
pub mod prompts;
pub mod specialists;
pub mod visual;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use agent::*;
pub use agent_types::*;
pub use error::*;
pub use inference::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        agent::{Agent, estimate_tokens, truncate_to_tokens},
        agent_types::*,
        catalog::{ModelProfile, PlatformProfile, model_profile, platform_profile},
        context_analyzer::{Analysis, ContextAnalyzer, VideoContextAnalyzer},
        coordinator::{Coordinator, CoordinatorInput, VideoCoordinator, VideoCoordinatorInput},
        error::{AgentError, Result},
        inference::{HttpInferenceClient, InferenceClient},
        platform::{PlatformInput, PlatformOptimizer, VideoPlatformInput, VideoPlatformOptimizer},
        specialists::{FluxSpecialist, KlingInput, KlingSpecialist, SpecialistInput},
        visual::{MotionGenerator, MotionInput, VisualGenerator, VisualInput},
    };
}
