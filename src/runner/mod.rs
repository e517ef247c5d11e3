//! # Asynchronous Task Runner
//!
//! Runs a unit of work as a detached background task under a stable name and
//! collects everything it produced.
//!
//! ## Lifecycle
//!
//! 1. **Register** a fresh [`TaskHandle`] under the name, replacing any live
//!    handle with the same name without waiting for it.
//! 2. **Launch** the wrapped unit of work through a [`TaskLauncher`].
//! 3. **Poll** every `poll_interval` until the task reports itself started,
//!    failing with [`RunnerError::StartTimeout`] past `start_timeout`.
//! 4. **Wait** for completion, bounded only when `completion_timeout` is set.
//! 5. **Collect** a snapshot of the task's [`OutputLog`].
//! 6. **Unregister** best-effort, on every exit path.
//!
//! ## Core Components
//!
//! - **TaskRunner**: the register/launch/poll/collect sequence
//! - **TaskRegistry**: named slots with replace semantics (`InMemoryTaskRegistry`)
//! - **TaskLauncher**: detaches jobs (`TokioLauncher`)
//! - **UnitOfWork**: the work itself; failures and panics become output records
//! - **OutputLog / TaskResult**: four append-only channels read by snapshot

pub mod errors;
pub mod events;
pub mod launcher;
pub mod output;
pub mod registry;
pub mod states;
pub mod task;
pub mod task_runner;
pub mod unit_of_work;

pub use errors::{RegistryError, RunnerError, RunnerResult};
pub use events::TaskEvent;
pub use launcher::{BackgroundJob, TaskLauncher, TokioLauncher};
pub use output::{failure_record, is_failure_record, ErrorRecord, OutputLog, TaskResult};
pub use registry::{InMemoryTaskRegistry, TaskRegistry};
pub use states::TaskState;
pub use task::TaskHandle;
pub use task_runner::TaskRunner;
pub use unit_of_work::{from_fn, FnUnitOfWork, UnitOfWork};
