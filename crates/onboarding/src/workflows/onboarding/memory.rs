use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    NewRequest, NewUser, ProfilePatch, Request, RequestId, UserId, UserProfile,
};
use super::repository::{OnboardingStore, RepositoryError, StoreTransaction};

#[derive(Debug, Clone, Default)]
struct MemoryTables {
    users: BTreeMap<UserId, UserProfile>,
    requests: BTreeMap<RequestId, Request>,
    last_user_id: i64,
    last_request_id: i64,
}

/// Process-local store backing the CLI and the test suites.
///
/// A transaction holds the table lock for its whole lifetime and works on a
/// staged copy, so concurrent units of work run one after another and a
/// dropped transaction leaves the committed tables untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with already-registered profiles, keeping their ids.
    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        let mut tables = MemoryTables::default();
        for user in users {
            tables.last_user_id = tables.last_user_id.max(user.id.0);
            tables.users.insert(user.id, user);
        }
        Self {
            tables: Mutex::new(tables),
        }
    }

    pub fn requests_for_user(&self, user_id: UserId) -> Result<Vec<Request>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.requests_for_user(user_id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl MemoryTables {
    fn requests_for_user(&self, user_id: UserId) -> Vec<Request> {
        self.requests
            .values()
            .filter(|request| request.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl OnboardingStore for MemoryStore {
    type Transaction<'a> = MemoryTransaction<'a>;

    fn begin(&self) -> Result<Self::Transaction<'_>, RepositoryError> {
        let committed = self.lock()?;
        let staged = committed.clone();
        Ok(MemoryTransaction { committed, staged })
    }

    fn insert_user(&self, user: NewUser) -> Result<UserProfile, RepositoryError> {
        let mut tables = self.lock()?;
        tables.last_user_id += 1;
        let profile = UserProfile::registered(UserId(tables.last_user_id), user);
        tables.users.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn list_requests(&self) -> Result<Vec<Request>, RepositoryError> {
        Ok(self.lock()?.requests.values().cloned().collect())
    }

    fn fetch_request(&self, id: RequestId) -> Result<Option<Request>, RepositoryError> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }
}

pub struct MemoryTransaction<'a> {
    committed: MutexGuard<'a, MemoryTables>,
    staged: MemoryTables,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn requests_for_user(&mut self, user_id: UserId) -> Result<Vec<Request>, RepositoryError> {
        Ok(self.staged.requests_for_user(user_id))
    }

    fn fetch_user(&mut self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.staged.users.get(&id).cloned())
    }

    fn update_user(&mut self, patch: &ProfilePatch) -> Result<(), RepositoryError> {
        let user = self
            .staged
            .users
            .get_mut(&patch.user_id)
            .ok_or(RepositoryError::NotFound)?;
        user.apply(patch);
        Ok(())
    }

    fn insert_request(&mut self, request: NewRequest) -> Result<Request, RepositoryError> {
        if self
            .staged
            .requests
            .values()
            .any(|existing| existing.user_id == request.user_id)
        {
            return Err(RepositoryError::Conflict);
        }

        self.staged.last_request_id += 1;
        let stored = Request {
            id: RequestId(self.staged.last_request_id),
            user_id: request.user_id,
            request_type: request.request_type,
            status: request.status,
            verifier_id: request.verifier_id,
            reject_notes: None,
        };
        self.staged.requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn fetch_request(&mut self, id: RequestId) -> Result<Option<Request>, RepositoryError> {
        Ok(self.staged.requests.get(&id).cloned())
    }

    fn update_request(&mut self, request: &Request) -> Result<(), RepositoryError> {
        let slot = self
            .staged
            .requests
            .get_mut(&request.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = request.clone();
        Ok(())
    }

    fn delete_request(&mut self, id: RequestId) -> Result<(), RepositoryError> {
        self.staged
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn commit(mut self) -> Result<(), RepositoryError> {
        *self.committed = std::mem::take(&mut self.staged);
        Ok(())
    }
}
