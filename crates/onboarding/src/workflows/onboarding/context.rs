use std::time::{Duration, Instant};

use super::error::OnboardingError;

/// Caller-scoped execution limits propagated into each unit of work.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Build from an optional configured timeout; `None` means no deadline.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map(Self::with_timeout).unwrap_or_default()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub(crate) fn check(&self, operation: &'static str) -> Result<(), OnboardingError> {
        if self.is_expired() {
            return Err(OnboardingError::DeadlineExceeded(operation));
        }
        Ok(())
    }
}
