//! Error types for the pipeline.

use std::fmt;

use promptsmith_agents::AgentError;
use serde::Serialize;
use thiserror::Error;

/// Result type for flow-engine operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors raised by the stage flow engine itself.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Flow construction error.
    #[error("Construction error: {0}")]
    Construction(String),

    /// No node registered for a non-terminal stage.
    #[error("No node found for stage: {0}")]
    MissingNode(String),

    /// Runaway loop guard.
    #[error("Flow exceeded maximum steps ({0})")]
    StepLimit(usize),

    /// Invalid stage transition.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// A stage ran before the stage that produces its input.
    #[error("Stage input missing: {0}")]
    MissingInput(&'static str),
}

impl FlowError {
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    pub fn missing_node(stage: impl fmt::Display) -> Self {
        Self::MissingNode(stage.to_string())
    }

    pub fn invalid_transition(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors found while validating one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors surfaced to callers of the orchestrator.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Request rejected before any agent ran.
    #[error("Invalid request: {0}")]
    Validation(ValidationErrors),

    /// A no-fallback agent failed and aborted the run.
    #[error("Agent {agent} failed: {message}")]
    Fatal { agent: String, message: String },

    /// The inference client could not be set up.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Flow error: {0}")]
    Flow(String),
}

impl PipelineError {
    pub fn fatal(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fatal {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Name of the agent that aborted the run, if any.
    pub fn failed_agent(&self) -> Option<&str> {
        match self {
            Self::Fatal { agent, .. } => Some(agent),
            _ => None,
        }
    }
}

impl From<FlowError> for PipelineError {
    fn from(error: FlowError) -> Self {
        Self::Flow(error.to_string())
    }
}

impl From<AgentError> for PipelineError {
    fn from(error: AgentError) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl From<ValidationErrors> for PipelineError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
