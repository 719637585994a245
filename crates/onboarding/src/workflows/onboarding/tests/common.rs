use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::workflows::onboarding::access::{
    resolve_principal, AuthError, Claims, ClaimsDecoder, Principal, SigningKey,
};
use crate::workflows::onboarding::domain::{
    NewRequest, NewUser, ProfilePatch, Request, RequestId, Submission, UserId, UserProfile,
};
use crate::workflows::onboarding::memory::{MemoryStore, MemoryTransaction};
use crate::workflows::onboarding::repository::{
    OnboardingStore, RepositoryError, StoreTransaction,
};
use crate::workflows::onboarding::service::{OnboardingPolicy, OnboardingService};

pub(super) const REGISTRANT: UserId = UserId(7);
pub(super) const ADMIN: UserId = UserId(1);

pub(super) fn registered(id: UserId) -> UserProfile {
    UserProfile::registered(
        id,
        NewUser {
            email: format!("user{}@example.org", id.0),
            name: "Linh".to_string(),
            surname: "Tran".to_string(),
        },
    )
}

pub(super) fn submission(user_id: UserId) -> Submission {
    Submission {
        user_id,
        department_id: Some(2),
        gender: Some("Male".to_string()),
        dob: "1994-06-01".to_string(),
        mobile: Some("0912345678".to_string()),
        country_id: Some(84),
        resident_country_id: Some(84),
    }
}

pub(super) fn store_with_registrant() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_users([
        registered(ADMIN),
        registered(REGISTRANT),
    ]))
}

pub(super) fn build_service() -> (OnboardingService<MemoryStore>, Arc<MemoryStore>) {
    build_service_with(OnboardingPolicy::default())
}

pub(super) fn build_service_with(
    policy: OnboardingPolicy,
) -> (OnboardingService<MemoryStore>, Arc<MemoryStore>) {
    let store = store_with_registrant();
    let service = OnboardingService::new(store.clone(), policy);
    (service, store)
}

pub(super) fn claims(value: Value) -> Claims {
    match value {
        Value::Object(map) => map,
        other => panic!("expected claims object, got {other}"),
    }
}

pub(super) fn admin() -> Principal {
    resolve_principal(&claims(json!({ "userId": ADMIN.0, "roleId": 3 })))
        .expect("admin claims resolve")
}

pub(super) fn request_rows(store: &MemoryStore, user_id: UserId) -> Vec<Request> {
    store
        .requests_for_user(user_id)
        .expect("store readable")
}

/// Decoder backed by a fixed token table, checked against the configured key.
pub(super) struct TokenTable {
    pub(super) key: SigningKey,
    pub(super) tokens: HashMap<String, Claims>,
}

impl TokenTable {
    pub(super) fn new(key: &str) -> Self {
        Self {
            key: SigningKey::new(key),
            tokens: HashMap::new(),
        }
    }

    pub(super) fn with_token(mut self, token: &str, value: Value) -> Self {
        self.tokens.insert(token.to_string(), claims(value));
        self
    }
}

impl ClaimsDecoder for TokenTable {
    fn decode(&self, token: &str, key: &SigningKey) -> Result<Claims, AuthError> {
        if key != &self.key {
            return Err(AuthError::InvalidToken);
        }
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Memory store whose transactions fail at `insert_request`, after the
/// profile patch has already been staged.
#[derive(Default)]
pub(super) struct FailingInsertStore {
    pub(super) inner: MemoryStore,
}

pub(super) struct FailingInsertTransaction<'a> {
    inner: MemoryTransaction<'a>,
}

impl OnboardingStore for FailingInsertStore {
    type Transaction<'a> = FailingInsertTransaction<'a>;

    fn begin(&self) -> Result<Self::Transaction<'_>, RepositoryError> {
        Ok(FailingInsertTransaction {
            inner: self.inner.begin()?,
        })
    }

    fn insert_user(&self, user: NewUser) -> Result<UserProfile, RepositoryError> {
        self.inner.insert_user(user)
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        self.inner.fetch_user(id)
    }

    fn list_requests(&self) -> Result<Vec<Request>, RepositoryError> {
        self.inner.list_requests()
    }

    fn fetch_request(&self, id: RequestId) -> Result<Option<Request>, RepositoryError> {
        self.inner.fetch_request(id)
    }
}

impl StoreTransaction for FailingInsertTransaction<'_> {
    fn requests_for_user(&mut self, user_id: UserId) -> Result<Vec<Request>, RepositoryError> {
        self.inner.requests_for_user(user_id)
    }

    fn fetch_user(&mut self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        self.inner.fetch_user(id)
    }

    fn update_user(&mut self, patch: &ProfilePatch) -> Result<(), RepositoryError> {
        self.inner.update_user(patch)
    }

    fn insert_request(&mut self, _request: NewRequest) -> Result<Request, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn fetch_request(&mut self, id: RequestId) -> Result<Option<Request>, RepositoryError> {
        self.inner.fetch_request(id)
    }

    fn update_request(&mut self, request: &Request) -> Result<(), RepositoryError> {
        self.inner.update_request(request)
    }

    fn delete_request(&mut self, id: RequestId) -> Result<(), RepositoryError> {
        self.inner.delete_request(id)
    }

    fn commit(self) -> Result<(), RepositoryError> {
        self.inner.commit()
    }
}

/// Store whose database is offline.
pub(super) struct UnavailableStore;

pub(super) struct NeverTransaction;

impl OnboardingStore for UnavailableStore {
    type Transaction<'a> = NeverTransaction;

    fn begin(&self) -> Result<Self::Transaction<'_>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_user(&self, _user: NewUser) -> Result<UserProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_user(&self, _id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_requests(&self) -> Result<Vec<Request>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_request(&self, _id: RequestId) -> Result<Option<Request>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl StoreTransaction for NeverTransaction {
    fn requests_for_user(&mut self, _user_id: UserId) -> Result<Vec<Request>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_user(&mut self, _id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_user(&mut self, _patch: &ProfilePatch) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_request(&mut self, _request: NewRequest) -> Result<Request, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_request(&mut self, _id: RequestId) -> Result<Option<Request>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_request(&mut self, _request: &Request) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_request(&mut self, _id: RequestId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit(self) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
