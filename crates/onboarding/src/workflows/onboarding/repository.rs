use super::domain::{
    NewRequest, NewUser, ProfilePatch, Request, RequestId, UserId, UserProfile,
};

/// Storage abstraction over the user and request tables.
///
/// Reads outside a transaction see committed state only. Every write goes
/// through [`StoreTransaction`], which the ledger and review desk open for
/// each unit of work.
pub trait OnboardingStore: Send + Sync {
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    /// Open a unit of work. Writers are serialized until the transaction is
    /// committed or dropped.
    fn begin(&self) -> Result<Self::Transaction<'_>, RepositoryError>;

    fn insert_user(&self, user: NewUser) -> Result<UserProfile, RepositoryError>;
    fn fetch_user(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError>;
    fn list_requests(&self) -> Result<Vec<Request>, RepositoryError>;
    fn fetch_request(&self, id: RequestId) -> Result<Option<Request>, RepositoryError>;
}

/// Operations available inside one atomic unit of work.
///
/// Dropping a transaction without calling [`StoreTransaction::commit`]
/// discards every staged write.
pub trait StoreTransaction {
    fn requests_for_user(&mut self, user_id: UserId) -> Result<Vec<Request>, RepositoryError>;
    fn fetch_user(&mut self, id: UserId) -> Result<Option<UserProfile>, RepositoryError>;
    fn update_user(&mut self, patch: &ProfilePatch) -> Result<(), RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when the user already owns a
    /// request row.
    fn insert_request(&mut self, request: NewRequest) -> Result<Request, RepositoryError>;
    fn fetch_request(&mut self, id: RequestId) -> Result<Option<Request>, RepositoryError>;
    fn update_request(&mut self, request: &Request) -> Result<(), RepositoryError>;
    fn delete_request(&mut self, id: RequestId) -> Result<(), RepositoryError>;

    fn commit(self) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("unique constraint violated")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
