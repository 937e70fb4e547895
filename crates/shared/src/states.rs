use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// States of a submitted task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskState {
    Created,
    Running,
    Success,
    Failure,
    Aborted,
}

impl TaskState {
    /// Validates a transition against the task state machine
    ///
    /// Valid transitions:
    /// - Created → Running, Failure, Aborted
    /// - Running → Success, Failure, Aborted
    /// - Success, Failure, Aborted → (terminal, no outgoing transitions)
    pub fn can_transition_to(&self, new_state: &TaskState) -> bool {
        match (self, new_state) {
            // Same state is not a transition
            (s, n) if s == n => false,

            (TaskState::Created, TaskState::Running) => true,
            (TaskState::Created, TaskState::Failure) => true,
            (TaskState::Created, TaskState::Aborted) => true,

            (TaskState::Running, TaskState::Success) => true,
            (TaskState::Running, TaskState::Failure) => true,
            (TaskState::Running, TaskState::Aborted) => true,

            // Everything else is invalid, including any transition out of a
            // terminal state and any transition back to Created.
            _ => false,
        }
    }

    /// Returns true if the state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Success | TaskState::Failure | TaskState::Aborted
        )
    }

    /// Returns true if the task is still in progress
    pub fn is_in_progress(&self) -> bool {
        matches!(self, TaskState::Created | TaskState::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Created => write!(f, "Created"),
            TaskState::Running => write!(f, "Running"),
            TaskState::Success => write!(f, "Success"),
            TaskState::Failure => write!(f, "Failure"),
            TaskState::Aborted => write!(f, "Aborted"),
        }
    }
}

impl FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(TaskState::Created),
            "Running" => Ok(TaskState::Running),
            "Success" => Ok(TaskState::Success),
            "Failure" => Ok(TaskState::Failure),
            "Aborted" => Ok(TaskState::Aborted),
            _ => Err(format!("Invalid TaskState: {}", s)),
        }
    }
}

impl TryFrom<i32> for TaskState {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaskState::Created),
            1 => Ok(TaskState::Running),
            2 => Ok(TaskState::Success),
            3 => Ok(TaskState::Failure),
            4 => Ok(TaskState::Aborted),
            _ => Err(format!("Invalid TaskState value: {}", value)),
        }
    }
}

impl From<&TaskState> for i32 {
    fn from(state: &TaskState) -> Self {
        match state {
            TaskState::Created => 0,
            TaskState::Running => 1,
            TaskState::Success => 2,
            TaskState::Failure => 3,
            TaskState::Aborted => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_state_from_str() {
        assert_eq!("Created".parse::<TaskState>().unwrap(), TaskState::Created);
        assert_eq!("Running".parse::<TaskState>().unwrap(), TaskState::Running);
        assert_eq!("Success".parse::<TaskState>().unwrap(), TaskState::Success);
        assert_eq!("Failure".parse::<TaskState>().unwrap(), TaskState::Failure);
        assert_eq!("Aborted".parse::<TaskState>().unwrap(), TaskState::Aborted);

        assert!("INVALID".parse::<TaskState>().is_err());
    }

    #[test]
    fn test_task_state_try_from_i32() {
        assert_eq!(TaskState::try_from(0).unwrap(), TaskState::Created);
        assert_eq!(TaskState::try_from(1).unwrap(), TaskState::Running);
        assert_eq!(TaskState::try_from(2).unwrap(), TaskState::Success);
        assert_eq!(TaskState::try_from(3).unwrap(), TaskState::Failure);
        assert_eq!(TaskState::try_from(4).unwrap(), TaskState::Aborted);

        assert!(TaskState::try_from(99).is_err());
    }

    #[test]
    fn test_task_state_into_i32() {
        assert_eq!(i32::from(&TaskState::Created), 0);
        assert_eq!(i32::from(&TaskState::Running), 1);
        assert_eq!(i32::from(&TaskState::Success), 2);
        assert_eq!(i32::from(&TaskState::Failure), 3);
        assert_eq!(i32::from(&TaskState::Aborted), 4);
    }

    #[test]
    fn test_valid_transitions() {
        assert!(TaskState::Created.can_transition_to(&TaskState::Running));
        assert!(TaskState::Created.can_transition_to(&TaskState::Failure));
        assert!(TaskState::Created.can_transition_to(&TaskState::Aborted));
        assert!(TaskState::Running.can_transition_to(&TaskState::Success));
        assert!(TaskState::Running.can_transition_to(&TaskState::Failure));
        assert!(TaskState::Running.can_transition_to(&TaskState::Aborted));
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        for terminal in [TaskState::Success, TaskState::Failure, TaskState::Aborted] {
            assert!(terminal.is_terminal());
            for target in [
                TaskState::Created,
                TaskState::Running,
                TaskState::Success,
                TaskState::Failure,
                TaskState::Aborted,
            ] {
                assert!(!terminal.can_transition_to(&target));
            }
        }
    }

    #[test]
    fn test_no_transition_back_to_created() {
        assert!(!TaskState::Running.can_transition_to(&TaskState::Created));
        assert!(!TaskState::Created.can_transition_to(&TaskState::Created));
    }

    #[test]
    fn test_in_progress() {
        assert!(TaskState::Created.is_in_progress());
        assert!(TaskState::Running.is_in_progress());
        assert!(!TaskState::Success.is_in_progress());
        assert!(!TaskState::Aborted.is_in_progress());
    }
}
