use std::sync::Arc;

use tracing::info;

use super::context::RequestContext;
use super::domain::{Request, RequestId, RequestStatus, UserId};
use super::error::{ConflictError, NotFoundError, OnboardingError};
use super::repository::{OnboardingStore, RepositoryError, StoreTransaction};
use super::validation::ValidationError;

/// How approve/reject treat a request that already left `pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Only pending requests may be approved or rejected.
    #[default]
    Strict,
    /// Terminal requests are overwritten with the new decision.
    Permissive,
}

/// Admin-facing state machine over persisted requests.
///
/// `pending -> approved` and `pending -> rejected` are the only transitions
/// under the strict policy. Each mutation is its own read-check-write unit.
pub struct ReviewDesk<S> {
    store: Arc<S>,
    policy: TransitionPolicy,
}

impl<S> ReviewDesk<S>
where
    S: OnboardingStore,
{
    pub fn new(store: Arc<S>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn list_requests(&self) -> Result<Vec<Request>, OnboardingError> {
        Ok(self.store.list_requests()?)
    }

    pub fn list_pending(&self) -> Result<Vec<Request>, OnboardingError> {
        let mut requests = self.store.list_requests()?;
        requests.retain(|request| request.status == RequestStatus::Pending);
        Ok(requests)
    }

    pub fn get_request(&self, id: RequestId) -> Result<Request, OnboardingError> {
        self.store
            .fetch_request(id)?
            .ok_or_else(|| NotFoundError::Request(id).into())
    }

    /// Fetch a request only while it is still awaiting review.
    pub fn get_pending_request(&self, id: RequestId) -> Result<Request, OnboardingError> {
        self.store
            .fetch_request(id)?
            .filter(|request| request.status == RequestStatus::Pending)
            .ok_or_else(|| NotFoundError::PendingRequest(id).into())
    }

    pub fn approve(
        &self,
        id: RequestId,
        verifier: UserId,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        self.decide(id, RequestStatus::Approved, verifier, ctx)
    }

    pub fn reject(
        &self,
        id: RequestId,
        verifier: UserId,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        self.decide(id, RequestStatus::Rejected, verifier, ctx)
    }

    /// Append to the rejection narrative. Existing notes are never replaced.
    pub fn add_rejection_notes(
        &self,
        id: RequestId,
        notes: &str,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        let notes = notes.trim();
        if notes.is_empty() {
            return Err(ValidationError::EmptyNotes.into());
        }

        let updated = self.mutate(id, "add_rejection_notes", ctx, |request| {
            request.reject_notes = Some(match request.reject_notes.take() {
                Some(existing) => format!("{existing}\n{notes}"),
                None => notes.to_string(),
            });
            Ok(())
        })?;

        info!(request_id = id.0, "rejection notes appended");
        Ok(updated)
    }

    pub fn delete(&self, id: RequestId, ctx: &RequestContext) -> Result<(), OnboardingError> {
        ctx.check("delete_request")?;
        let mut tx = self.store.begin()?;
        tx.delete_request(id)
            .map_err(|err| request_error(err, id))?;
        ctx.check("delete_request")?;
        tx.commit()?;

        info!(request_id = id.0, "request deleted");
        Ok(())
    }

    fn decide(
        &self,
        id: RequestId,
        target: RequestStatus,
        verifier: UserId,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        let policy = self.policy;
        let updated = self.mutate(id, target.label(), ctx, |request| {
            if policy == TransitionPolicy::Strict && request.status.is_terminal() {
                return Err(ConflictError::NotPending {
                    id,
                    status: request.status,
                }
                .into());
            }
            request.status = target;
            request.verifier_id = Some(verifier);
            Ok(())
        })?;

        info!(
            request_id = id.0,
            user_id = updated.user_id.0,
            verifier_id = verifier.0,
            status = target.label(),
            "request reviewed"
        );
        Ok(updated)
    }

    fn mutate<F>(
        &self,
        id: RequestId,
        operation: &'static str,
        ctx: &RequestContext,
        apply: F,
    ) -> Result<Request, OnboardingError>
    where
        F: FnOnce(&mut Request) -> Result<(), OnboardingError>,
    {
        ctx.check(operation)?;
        let mut tx = self.store.begin()?;

        let mut request = tx
            .fetch_request(id)?
            .ok_or(NotFoundError::Request(id))?;
        apply(&mut request)?;
        tx.update_request(&request)
            .map_err(|err| request_error(err, id))?;

        ctx.check(operation)?;
        tx.commit()?;
        Ok(request)
    }
}

fn request_error(err: RepositoryError, id: RequestId) -> OnboardingError {
    match err {
        RepositoryError::NotFound => NotFoundError::Request(id).into(),
        other => other.into(),
    }
}
