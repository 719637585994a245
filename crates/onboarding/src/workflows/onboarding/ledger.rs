use std::sync::Arc;

use tracing::{debug, info, warn};

use super::context::RequestContext;
use super::domain::{Request, RequestStatus, UserId};
use super::error::{ConflictError, NotFoundError, OnboardingError};
use super::merge::MergedSubmission;
use super::repository::{OnboardingStore, RepositoryError, StoreTransaction};

/// Whether a user whose earlier request reached a terminal state may submit again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResubmissionPolicy {
    /// Any existing request blocks a new submission.
    #[default]
    Never,
    /// A rejected request is replaced by the new submission.
    AfterRejection,
}

impl ResubmissionPolicy {
    fn releases(self, status: RequestStatus) -> bool {
        matches!(
            (self, status),
            (ResubmissionPolicy::AfterRejection, RequestStatus::Rejected)
        )
    }
}

/// Owns the one-request-per-user invariant and the paired profile/request write.
pub struct RequestLedger<S> {
    store: Arc<S>,
    resubmission: ResubmissionPolicy,
}

impl<S> RequestLedger<S>
where
    S: OnboardingStore,
{
    pub fn new(store: Arc<S>, resubmission: ResubmissionPolicy) -> Self {
        Self {
            store,
            resubmission,
        }
    }

    pub fn resubmission(&self) -> ResubmissionPolicy {
        self.resubmission
    }

    /// Persist a merged submission as one unit of work.
    ///
    /// Nothing is written unless the user exists and holds no blocking
    /// request; the whole unit is rolled back on any failure.
    pub fn submit(
        &self,
        merged: MergedSubmission,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        let MergedSubmission { request, patch } = merged;
        let user_id = request.user_id;

        ctx.check("submit")?;
        let mut tx = self.store.begin()?;

        for prior in tx.requests_for_user(user_id)? {
            if !self.resubmission.releases(prior.status) {
                warn!(
                    user_id = user_id.0,
                    request_id = prior.id.0,
                    status = prior.status.label(),
                    "submission rejected: user already has a request"
                );
                return Err(ConflictError::UserAlreadyHasRequest(user_id).into());
            }
            debug!(
                user_id = user_id.0,
                request_id = prior.id.0,
                "replacing rejected request"
            );
            tx.delete_request(prior.id)?;
        }

        if tx.fetch_user(user_id)?.is_none() {
            return Err(NotFoundError::User(user_id).into());
        }

        tx.update_user(&patch)
            .map_err(|err| user_write_error(err, user_id))?;
        let stored = tx
            .insert_request(request)
            .map_err(|err| request_write_error(err, user_id))?;

        ctx.check("submit")?;
        tx.commit()?;

        info!(
            user_id = user_id.0,
            request_id = stored.id.0,
            request_type = stored.request_type.label(),
            role_id = patch.role_id.0,
            "onboarding request created"
        );
        Ok(stored)
    }
}

fn user_write_error(err: RepositoryError, user_id: UserId) -> OnboardingError {
    match err {
        RepositoryError::NotFound => NotFoundError::User(user_id).into(),
        other => other.into(),
    }
}

fn request_write_error(err: RepositoryError, user_id: UserId) -> OnboardingError {
    match err {
        RepositoryError::Conflict => ConflictError::UserAlreadyHasRequest(user_id).into(),
        other => other.into(),
    }
}
