mod agent;
pub use agent::Agent;

mod error;
pub use error::{AgentError, TaskError, UploadError, ValidationError};

pub mod task;
pub use task::{Inputs, Outputs, Task, TaskFn, TaskRef};

pub mod upload;
pub mod validate;

pub mod watchdog;
pub use watchdog::{ProcessTerminator, ShutdownSignal, Terminator, Watchdog};

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::error::{AgentError, TaskError};
    pub use crate::task::{Inputs, Outputs, Task, TaskFn, TaskRef};
    pub use crate::{Agent, Watchdog};
}
