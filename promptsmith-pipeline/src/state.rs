//! Stage state machine for pipeline runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trait representing a position in a flow.
pub trait FlowState:
    Clone + PartialEq + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static
{
    /// Returns true if the flow should stop in this state.
    fn is_terminal(&self) -> bool;

    /// Returns true if this state can transition to the target state.
    fn can_transition_to(&self, _target: &Self) -> bool {
        true
    }
}

/// Stages of a single pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ContextAnalysis,
    VisualGeneration,
    /// Video route only
    MotionGeneration,
    /// Model specialist and platform optimizer, run concurrently
    Specialization,
    Coordination,
    Complete,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContextAnalysis => "context_analysis",
            Self::VisualGeneration => "visual_generation",
            Self::MotionGeneration => "motion_generation",
            Self::Specialization => "specialization",
            Self::Coordination => "coordination",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FlowState for PipelineStage {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    fn can_transition_to(&self, target: &Self) -> bool {
        use PipelineStage::*;

        match (self, target) {
            (Complete | Failed, _) => false,
            // any running stage may abort
            (_, Failed) => true,
            (ContextAnalysis, VisualGeneration)
            | (VisualGeneration, MotionGeneration | Specialization)
            | (MotionGeneration, Specialization)
            | (Specialization, Coordination)
            | (Coordination, Complete) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_transitions() {
        use PipelineStage::*;

        assert!(ContextAnalysis.can_transition_to(&VisualGeneration));
        assert!(VisualGeneration.can_transition_to(&Specialization));
        assert!(VisualGeneration.can_transition_to(&MotionGeneration));
        assert!(Specialization.can_transition_to(&Failed));
        assert!(Coordination.can_transition_to(&Complete));

        assert!(!ContextAnalysis.can_transition_to(&Coordination));
        assert!(!Specialization.can_transition_to(&VisualGeneration));
        assert!(!Complete.can_transition_to(&Failed));
        assert!(!Failed.can_transition_to(&ContextAnalysis));
    }

    #[test]
    fn test_terminal_stages() {
        assert!(PipelineStage::Complete.is_terminal());
        assert!(PipelineStage::Failed.is_terminal());
        assert!(!PipelineStage::Specialization.is_terminal());
        assert_eq!(PipelineStage::MotionGeneration.to_string(), "motion_generation");
    }
}
