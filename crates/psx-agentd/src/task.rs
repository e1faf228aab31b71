use async_trait::async_trait;
use psx_agent::{Inputs, Outputs, Task, TaskError};
use tracing::debug;

/// Default task: accepts any inputs and produces no outputs.
///
/// Executions whose schema declares only optional outputs succeed with it; any
/// required output is reported as missing.
pub struct NoopTask;

#[async_trait]
impl Task for NoopTask {
    fn name(&self) -> &str {
        "noop-task"
    }

    async fn execute(&self, inputs: Inputs) -> Result<Outputs, TaskError> {
        debug!(inputs = inputs.len(), "noop task invoked");
        Ok(Outputs::default())
    }
}
