use super::common::*;
use std::sync::Arc;
use std::time::Instant;

use crate::workflows::onboarding::context::RequestContext;
use crate::workflows::onboarding::domain::{FlowKind, RequestStatus, RoleDefaults, UserId};
use crate::workflows::onboarding::error::{ConflictError, NotFoundError, OnboardingError};
use crate::workflows::onboarding::ledger::{RequestLedger, ResubmissionPolicy};
use crate::workflows::onboarding::memory::MemoryStore;
use crate::workflows::onboarding::merge::{merge_submission, MergedSubmission};
use crate::workflows::onboarding::repository::{
    OnboardingStore, RepositoryError, StoreTransaction,
};
use crate::workflows::onboarding::validation::validate_submission;

fn merged(user_id: UserId, flow: FlowKind) -> MergedSubmission {
    let validated = validate_submission(submission(user_id)).expect("fixture validates");
    merge_submission(validated, flow, &RoleDefaults::default()).expect("fixture merges")
}

#[test]
fn submit_writes_request_and_profile_together() {
    let store = store_with_registrant();
    let ledger = RequestLedger::new(store.clone(), ResubmissionPolicy::Never);

    let request = ledger
        .submit(
            merged(REGISTRANT, FlowKind::Applicant),
            &RequestContext::unbounded(),
        )
        .expect("submission succeeds");

    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request_rows(&store, REGISTRANT), vec![request]);
    let profile = store
        .fetch_user(REGISTRANT)
        .expect("fetch")
        .expect("present");
    assert_eq!(profile.mobile.as_deref(), Some("0912345678"));
    assert_eq!(profile.department_id, Some(2));
}

#[test]
fn unknown_user_is_not_found_and_writes_nothing() {
    let store = store_with_registrant();
    let ledger = RequestLedger::new(store.clone(), ResubmissionPolicy::Never);

    match ledger.submit(
        merged(UserId(404), FlowKind::Applicant),
        &RequestContext::unbounded(),
    ) {
        Err(OnboardingError::NotFound(NotFoundError::User(UserId(404)))) => {}
        other => panic!("expected user not found, got {other:?}"),
    }
    assert!(store.list_requests().expect("list").is_empty());
}

#[test]
fn existing_request_blocks_without_touching_profile() {
    let store = store_with_registrant();
    let ledger = RequestLedger::new(store.clone(), ResubmissionPolicy::Never);
    let ctx = RequestContext::unbounded();

    ledger
        .submit(merged(REGISTRANT, FlowKind::Applicant), &ctx)
        .expect("first submission");
    let before = store.fetch_user(REGISTRANT).expect("fetch");

    match ledger.submit(merged(REGISTRANT, FlowKind::Volunteer), &ctx) {
        Err(OnboardingError::Conflict(ConflictError::UserAlreadyHasRequest(REGISTRANT))) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(store.fetch_user(REGISTRANT).expect("fetch"), before);
    assert_eq!(request_rows(&store, REGISTRANT).len(), 1);
}

#[test]
fn failed_insert_rolls_back_profile_patch() {
    let store = Arc::new(FailingInsertStore {
        inner: MemoryStore::with_users([registered(REGISTRANT)]),
    });
    let ledger = RequestLedger::new(store.clone(), ResubmissionPolicy::Never);

    match ledger.submit(
        merged(REGISTRANT, FlowKind::Applicant),
        &RequestContext::unbounded(),
    ) {
        Err(OnboardingError::Persistence(RepositoryError::Unavailable(reason))) => {
            assert_eq!(reason, "disk full")
        }
        other => panic!("expected persistence failure, got {other:?}"),
    }

    let profile = store
        .fetch_user(REGISTRANT)
        .expect("fetch")
        .expect("present");
    assert_eq!(profile, registered(REGISTRANT));
    assert!(store.list_requests().expect("list").is_empty());
}

#[test]
fn expired_deadline_aborts_before_any_write() {
    let store = store_with_registrant();
    let ledger = RequestLedger::new(store.clone(), ResubmissionPolicy::Never);

    match ledger.submit(
        merged(REGISTRANT, FlowKind::Applicant),
        &RequestContext::with_deadline(Instant::now()),
    ) {
        Err(OnboardingError::DeadlineExceeded("submit")) => {}
        other => panic!("expected deadline failure, got {other:?}"),
    }
    assert!(request_rows(&store, REGISTRANT).is_empty());
}

#[test]
fn offline_store_surfaces_persistence_error() {
    let ledger = RequestLedger::new(Arc::new(UnavailableStore), ResubmissionPolicy::Never);

    match ledger.submit(
        merged(REGISTRANT, FlowKind::Applicant),
        &RequestContext::unbounded(),
    ) {
        Err(OnboardingError::Persistence(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected persistence failure, got {other:?}"),
    }
}

fn set_status(store: &MemoryStore, status: RequestStatus) {
    let mut tx = store.begin().expect("begin");
    let mut request = tx
        .requests_for_user(REGISTRANT)
        .expect("lookup")
        .pop()
        .expect("request present");
    request.status = status;
    tx.update_request(&request).expect("update");
    tx.commit().expect("commit");
}

#[test]
fn rejected_request_can_be_replaced_when_policy_allows() {
    let store = store_with_registrant();
    let ledger = RequestLedger::new(store.clone(), ResubmissionPolicy::AfterRejection);
    let ctx = RequestContext::unbounded();

    let first = ledger
        .submit(merged(REGISTRANT, FlowKind::Applicant), &ctx)
        .expect("first submission");
    set_status(&store, RequestStatus::Rejected);

    let second = ledger
        .submit(merged(REGISTRANT, FlowKind::Volunteer), &ctx)
        .expect("resubmission after rejection");

    assert_ne!(first.id, second.id);
    assert_eq!(request_rows(&store, REGISTRANT), vec![second]);
}

#[test]
fn approved_request_still_blocks_under_lenient_policy() {
    let store = store_with_registrant();
    let ledger = RequestLedger::new(store.clone(), ResubmissionPolicy::AfterRejection);
    let ctx = RequestContext::unbounded();

    ledger
        .submit(merged(REGISTRANT, FlowKind::Applicant), &ctx)
        .expect("first submission");
    set_status(&store, RequestStatus::Approved);

    assert!(matches!(
        ledger.submit(merged(REGISTRANT, FlowKind::Applicant), &ctx),
        Err(OnboardingError::Conflict(_))
    ));
}

#[test]
fn rejected_request_blocks_under_default_policy() {
    let store = store_with_registrant();
    let ledger = RequestLedger::new(store.clone(), ResubmissionPolicy::default());
    let ctx = RequestContext::unbounded();

    ledger
        .submit(merged(REGISTRANT, FlowKind::Applicant), &ctx)
        .expect("first submission");
    set_status(&store, RequestStatus::Rejected);

    assert!(matches!(
        ledger.submit(merged(REGISTRANT, FlowKind::Applicant), &ctx),
        Err(OnboardingError::Conflict(ConflictError::UserAlreadyHasRequest(_)))
    ));
    assert_eq!(ledger.resubmission(), ResubmissionPolicy::Never);
}
