//! Onboarding request lifecycle: submission intake, the one-request-per-user
//! ledger, admin review, and the claims guard in front of it.

pub mod access;
pub mod context;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod memory;
pub(crate) mod merge;
pub mod repository;
pub mod review;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use access::{
    resolve_principal, AccessGuard, AuthError, Claims, ClaimsDecoder, Principal, SigningKey,
};
pub use context::RequestContext;
pub use domain::{
    FlowKind, Gender, NewRequest, NewUser, ProfilePatch, Request, RequestId, RequestStatus,
    RequestType, RoleDefaults, RoleId, Submission, UserId, UserProfile,
};
pub use error::{ConflictError, ErrorKind, NotFoundError, OnboardingError};
pub use ledger::{RequestLedger, ResubmissionPolicy};
pub use memory::{MemoryStore, MemoryTransaction};
pub use merge::{merge_submission, parse_dob, MergedSubmission};
pub use repository::{OnboardingStore, RepositoryError, StoreTransaction};
pub use review::{ReviewDesk, TransitionPolicy};
pub use service::{OnboardingPolicy, OnboardingService};
pub use validation::{validate_submission, ValidatedSubmission, ValidationError};
