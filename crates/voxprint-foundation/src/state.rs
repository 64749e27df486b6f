use crate::error::AppError;
use parking_lot::RwLock;
use std::sync::Arc;

/// What the application is currently doing with the microphone and the
/// engine handles. Exactly one action may hold them at a time: enrollment
/// and testing are never active concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Enrolling,
    Testing,
}

/// Explicit application-state object passed into each action handler.
/// Created at session start, returned to `Idle` when the action finishes.
pub struct SessionTracker {
    state: Arc<RwLock<SessionState>>,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::Idle)),
        }
    }

    pub fn transition(&self, new_state: SessionState) -> Result<(), AppError> {
        let mut current = self.state.write();

        let valid = matches!(
            (&*current, &new_state),
            (SessionState::Idle, SessionState::Enrolling)
                | (SessionState::Idle, SessionState::Testing)
                | (SessionState::Enrolling, SessionState::Idle)
                | (SessionState::Testing, SessionState::Idle)
        );

        if !valid {
            return Err(AppError::Fatal(format!(
                "Invalid session transition: {:?} -> {:?}",
                *current, new_state
            )));
        }

        tracing::info!("Session transition: {:?} -> {:?}", *current, new_state);
        *current = new_state;
        Ok(())
    }

    pub fn current(&self) -> SessionState {
        *self.state.read()
    }
}
