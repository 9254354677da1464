//! Node abstraction for pipeline stages.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{context::RunContext, error::Result, state::PipelineStage};

/// One stage of a pipeline run.
///
/// A node takes the run context, performs its agent calls, and returns the
/// updated context together with the next stage. Agent failures without a
/// fallback are recorded in the context with [`RunContext::fail`] and the
/// node moves to [`PipelineStage::Failed`]; an `Err` is reserved for flow
/// wiring problems.
#[async_trait]
pub trait StageNode: Send + Sync + Debug {
    async fn execute(&self, context: RunContext) -> Result<(RunContext, PipelineStage)>;

    /// Get the name of this node for logging.
    fn name(&self) -> String {
        format!("{self:?}")
    }
}

#[cfg(test)]
pub(crate) mod helpers {
    use super::*;

    /// Node that only moves to a fixed stage.
    #[derive(Debug, Clone)]
    pub struct Jump(pub PipelineStage);

    #[async_trait]
    impl StageNode for Jump {
        async fn execute(&self, context: RunContext) -> Result<(RunContext, PipelineStage)> {
            Ok((context, self.0))
        }
    }
}
