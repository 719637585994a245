use std::sync::Arc;

use tracing::{debug, info, warn};

use super::access::Principal;
use super::context::RequestContext;
use super::domain::{
    FlowKind, NewUser, Request, RequestId, RoleDefaults, Submission, UserId, UserProfile,
};
use super::error::{NotFoundError, OnboardingError};
use super::ledger::{RequestLedger, ResubmissionPolicy};
use super::merge::merge_submission;
use super::repository::OnboardingStore;
use super::review::{ReviewDesk, TransitionPolicy};
use super::validation::validate_submission;

/// Policy dials chosen at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnboardingPolicy {
    pub roles: RoleDefaults,
    pub transitions: TransitionPolicy,
    pub resubmission: ResubmissionPolicy,
}

/// Entry point a transport layer calls for every onboarding operation.
///
/// Admin operations take a [`Principal`], which only the access guard can
/// produce.
pub struct OnboardingService<S> {
    store: Arc<S>,
    ledger: RequestLedger<S>,
    review: ReviewDesk<S>,
    roles: RoleDefaults,
}

impl<S> OnboardingService<S>
where
    S: OnboardingStore + 'static,
{
    pub fn new(store: Arc<S>, policy: OnboardingPolicy) -> Self {
        let ledger = RequestLedger::new(store.clone(), policy.resubmission);
        let review = ReviewDesk::new(store.clone(), policy.transitions);

        Self {
            store,
            ledger,
            review,
            roles: policy.roles,
        }
    }

    /// Create the identity row that later submissions patch.
    pub fn register_user(&self, user: NewUser) -> Result<UserProfile, OnboardingError> {
        let profile = self.store.insert_user(user)?;
        info!(user_id = profile.id.0, "user registered");
        Ok(profile)
    }

    pub fn get_profile(&self, user_id: UserId) -> Result<UserProfile, OnboardingError> {
        self.store
            .fetch_user(user_id)?
            .ok_or_else(|| NotFoundError::User(user_id).into())
    }

    pub fn create_registration_request(
        &self,
        submission: Submission,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        self.create_request(FlowKind::Applicant, submission, ctx)
    }

    pub fn create_verification_request(
        &self,
        submission: Submission,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        self.create_request(FlowKind::Volunteer, submission, ctx)
    }

    /// Validate, merge, and persist a submission for the given flow.
    pub fn create_request(
        &self,
        flow: FlowKind,
        submission: Submission,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        let user_id = submission.user_id;
        let merged = validate_submission(submission)
            .and_then(|validated| merge_submission(validated, flow, &self.roles))
            .map_err(|err| {
                warn!(user_id = user_id.0, ?flow, error = %err, "submission failed validation");
                err
            })?;

        self.ledger.submit(merged, ctx)
    }

    pub fn list_requests(&self, principal: &Principal) -> Result<Vec<Request>, OnboardingError> {
        debug!(admin_id = principal.user_id().0, "listing requests");
        self.review.list_requests()
    }

    pub fn list_pending_requests(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Request>, OnboardingError> {
        debug!(admin_id = principal.user_id().0, "listing pending requests");
        self.review.list_pending()
    }

    pub fn get_request(
        &self,
        principal: &Principal,
        id: RequestId,
    ) -> Result<Request, OnboardingError> {
        debug!(admin_id = principal.user_id().0, request_id = id.0, "fetching request");
        self.review.get_request(id)
    }

    pub fn get_pending_request(
        &self,
        principal: &Principal,
        id: RequestId,
    ) -> Result<Request, OnboardingError> {
        debug!(
            admin_id = principal.user_id().0,
            request_id = id.0,
            "fetching pending request"
        );
        self.review.get_pending_request(id)
    }

    /// Approve on behalf of the authenticated admin, who becomes the verifier.
    pub fn approve_request(
        &self,
        principal: &Principal,
        id: RequestId,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        self.review.approve(id, principal.user_id(), ctx)
    }

    pub fn reject_request(
        &self,
        principal: &Principal,
        id: RequestId,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        self.review.reject(id, principal.user_id(), ctx)
    }

    pub fn add_rejection_notes(
        &self,
        principal: &Principal,
        id: RequestId,
        notes: &str,
        ctx: &RequestContext,
    ) -> Result<Request, OnboardingError> {
        debug!(admin_id = principal.user_id().0, request_id = id.0, "appending notes");
        self.review.add_rejection_notes(id, notes, ctx)
    }

    pub fn delete_request(
        &self,
        principal: &Principal,
        id: RequestId,
        ctx: &RequestContext,
    ) -> Result<(), OnboardingError> {
        debug!(admin_id = principal.user_id().0, request_id = id.0, "deleting request");
        self.review.delete(id, ctx)
    }
}
