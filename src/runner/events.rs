use super::states::TaskState;
use serde::{Deserialize, Serialize};

/// Events that drive task state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TaskEvent {
    /// Background task picked up the work
    Start,
    /// Unit of work returned a value
    Complete,
    /// Unit of work failed with the given message
    Fail(String),
    /// A new registration took over the name
    Replace,
}

impl TaskEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Fail(_) => "fail",
            Self::Replace => "replace",
        }
    }

    /// Extract error message if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail(msg) => Some(msg),
            _ => None,
        }
    }

    /// Target state for this event from `current`, or `None` when the
    /// transition is not allowed
    pub fn target_state(&self, current: TaskState) -> Option<TaskState> {
        match (current, self) {
            (TaskState::Registered, Self::Start) => Some(TaskState::Running),
            (TaskState::Running, Self::Complete) => Some(TaskState::Completed),
            (TaskState::Running, Self::Fail(_)) => Some(TaskState::Failed),
            (TaskState::Registered | TaskState::Running, Self::Replace) => {
                Some(TaskState::Replaced)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert_eq!(
            TaskEvent::Start.target_state(TaskState::Registered),
            Some(TaskState::Running)
        );
        assert_eq!(
            TaskEvent::Complete.target_state(TaskState::Running),
            Some(TaskState::Completed)
        );
        assert_eq!(
            TaskEvent::Fail("boom".to_string()).target_state(TaskState::Running),
            Some(TaskState::Failed)
        );
        assert_eq!(
            TaskEvent::Replace.target_state(TaskState::Running),
            Some(TaskState::Replaced)
        );
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(TaskEvent::Start.target_state(TaskState::Running).is_none());
        assert!(TaskEvent::Complete.target_state(TaskState::Registered).is_none());
        assert!(TaskEvent::Complete.target_state(TaskState::Replaced).is_none());
        assert!(TaskEvent::Replace.target_state(TaskState::Completed).is_none());
    }

    #[test]
    fn test_event_helpers() {
        let event = TaskEvent::Fail("disk full".to_string());
        assert_eq!(event.event_type(), "fail");
        assert_eq!(event.error_message(), Some("disk full"));
        assert_eq!(TaskEvent::Start.error_message(), None);
    }
}
