use super::errors::{RunnerError, RunnerResult};
use super::events::TaskEvent;
use super::output::OutputLog;
use super::states::TaskState;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
struct Timestamps {
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

/// One registration of a named task.
///
/// The name is the caller-visible identity. `run_id` only distinguishes
/// successive registrations under the same name so that a superseded run never
/// releases its successor's slot.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    run_id: Uuid,
    registered_at: DateTime<Utc>,
    state: watch::Sender<TaskState>,
    timestamps: Mutex<Timestamps>,
    output: OutputLog,
}

impl TaskHandle {
    pub fn new(name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(TaskState::Registered);
        Self {
            name: name.into(),
            run_id: Uuid::new_v4(),
            registered_at: Utc::now(),
            state,
            timestamps: Mutex::new(Timestamps::default()),
            output: OutputLog::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.timestamps.lock().started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.timestamps.lock().finished_at
    }

    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    /// Apply a lifecycle event, returning the new state
    pub fn apply(&self, event: &TaskEvent) -> RunnerResult<TaskState> {
        let mut outcome = Err(RunnerError::Internal {
            message: "state transition not evaluated".to_string(),
        });

        self.state.send_if_modified(|current| match event.target_state(*current) {
            Some(next) => {
                *current = next;
                outcome = Ok(next);
                true
            }
            None => {
                outcome = Err(RunnerError::InvalidTransition {
                    from: current.to_string(),
                    event: event.event_type().to_string(),
                });
                false
            }
        });

        if let Ok(next) = outcome {
            let mut timestamps = self.timestamps.lock();
            if next == TaskState::Running {
                timestamps.started_at = Some(Utc::now());
            } else if next.is_finished() {
                timestamps.finished_at = Some(Utc::now());
            }
        }

        outcome
    }
}
