//! Stage flow execution.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, error};

use crate::{
    context::RunContext,
    error::{FlowError, Result},
    node::StageNode,
    state::{FlowState, PipelineStage},
};

const DEFAULT_MAX_STEPS: usize = 32;

/// Flow execution result.
#[derive(Debug, Clone)]
pub struct FlowResult {
    /// Final stage; `Complete` or `Failed`.
    pub final_stage: PipelineStage,
    pub context: RunContext,
    pub duration: Duration,
    /// Number of nodes executed.
    pub steps: usize,
}

impl FlowResult {
    pub fn is_complete(&self) -> bool {
        self.final_stage == PipelineStage::Complete
    }
}

/// Maps each non-terminal stage to the node that runs it.
#[derive(Debug)]
pub struct StageFlow {
    nodes: HashMap<PipelineStage, Arc<dyn StageNode>>,
    initial_stage: PipelineStage,
    max_steps: usize,
    name: String,
}

impl StageFlow {
    pub fn builder() -> StageFlowBuilder {
        StageFlowBuilder::new()
    }

    /// Run from the initial stage.
    pub async fn execute(&self, context: RunContext) -> Result<FlowResult> {
        self.execute_from(self.initial_stage, context).await
    }

    /// Run from an arbitrary stage with a pre-seeded context.
    pub async fn execute_from(
        &self,
        stage: PipelineStage,
        mut context: RunContext,
    ) -> Result<FlowResult> {
        let start_time = Instant::now();
        let mut current = stage;
        let mut steps = 0;

        while !current.is_terminal() {
            if steps >= self.max_steps {
                error!("{} exceeded {} steps at {}", self.name, self.max_steps, current);
                return Err(FlowError::StepLimit(self.max_steps));
            }
            steps += 1;

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| FlowError::missing_node(current))?;

            debug!("{} entering {} ({})", self.name, current, node.name());
            let (next_context, next) = node.execute(context).await?;
            if !current.can_transition_to(&next) {
                return Err(FlowError::invalid_transition(current, next));
            }
            context = next_context;
            current = next;
        }

        Ok(FlowResult {
            final_stage: current,
            context,
            duration: start_time.elapsed(),
            steps,
        })
    }

    pub fn initial_stage(&self) -> PipelineStage {
        self.initial_stage
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`StageFlow`].
pub struct StageFlowBuilder {
    nodes: HashMap<PipelineStage, Arc<dyn StageNode>>,
    initial_stage: Option<PipelineStage>,
    max_steps: usize,
    name: String,
}

impl StageFlowBuilder {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            initial_stage: None,
            max_steps: DEFAULT_MAX_STEPS,
            name: "stage_flow".to_string(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add the node for a stage.
    pub fn node(mut self, stage: PipelineStage, node: impl StageNode + 'static) -> Self {
        self.nodes.insert(stage, Arc::new(node));
        self
    }

    pub fn initial_stage(mut self, stage: PipelineStage) -> Self {
        self.initial_stage = Some(stage);
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn build(self) -> Result<StageFlow> {
        let initial_stage = self
            .initial_stage
            .ok_or_else(|| FlowError::construction("Initial stage not set"))?;

        if self.nodes.is_empty() {
            return Err(FlowError::construction("No nodes added to flow"));
        }
        if let Some(terminal) = self.nodes.keys().find(|s| s.is_terminal()) {
            return Err(FlowError::construction(format!(
                "Terminal stage {terminal} cannot have a node"
            )));
        }

        Ok(StageFlow {
            nodes: self.nodes,
            initial_stage,
            max_steps: self.max_steps,
            name: self.name,
        })
    }
}

impl Default for StageFlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
