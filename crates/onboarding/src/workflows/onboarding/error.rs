use super::access::AuthError;
use super::domain::{RequestId, RequestStatus, UserId};
use super::repository::RepositoryError;
use super::validation::ValidationError;

/// Error taxonomy exposed to the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),
    #[error("deadline exceeded during {0}")]
    DeadlineExceeded(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("this user already has a request")]
    UserAlreadyHasRequest(UserId),
    #[error("request {id} is already {status}")]
    NotPending { id: RequestId, status: RequestStatus },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("user not found")]
    User(UserId),
    #[error("request not found")]
    Request(RequestId),
    #[error("pending request not found")]
    PendingRequest(RequestId),
}

/// Coarse classification a transport maps onto its own status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Auth,
    Persistence,
}

impl OnboardingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OnboardingError::Validation(_) => ErrorKind::Validation,
            OnboardingError::Conflict(_) => ErrorKind::Conflict,
            OnboardingError::NotFound(_) => ErrorKind::NotFound,
            OnboardingError::Auth(_) => ErrorKind::Auth,
            OnboardingError::Persistence(_) | OnboardingError::DeadlineExceeded(_) => {
                ErrorKind::Persistence
            }
        }
    }
}
