use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    Account, AuthToken, InterviewChanges, InterviewExperience, NewAccount, NewInterview, NewTask,
    OwnerFilter, Profile, ProfileChanges, TaskChanges, TaskExperience,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Store-level failures. Absence is not an error: lookups return `Option`, owner-scoped
/// deletes return `bool`, and the caller decides what "missing" means.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A uniqueness constraint rejected the write. `field` is `email` or `username`.
    #[error("{field} is already taken")]
    Conflict { field: &'static str },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository Trait
///
/// Abstract contract for all persistence operations, implemented by Postgres and by the
/// in-memory store. Every owner-scoped mutation takes the owner id and must only touch a
/// row whose `user_id` matches, in one atomic step.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    /// Inserts the account and its empty profile together. Duplicate email or username
    /// fails with `RepoError::Conflict`; the store's constraint is the only arbiter.
    async fn create_account(&self, account: NewAccount) -> RepoResult<Account>;
    async fn get_account(&self, id: Uuid) -> RepoResult<Option<Account>>;
    async fn get_account_by_email(&self, email: &str) -> RepoResult<Option<Account>>;
    /// All accounts, newest first.
    async fn list_accounts(&self) -> RepoResult<Vec<Account>>;
    async fn record_login(&self, id: Uuid) -> RepoResult<()>;
    async fn set_account_active(&self, id: Uuid, is_active: bool) -> RepoResult<Option<Account>>;
    /// Cascades to the profile, the token and every experience record.
    async fn delete_account(&self, id: Uuid) -> RepoResult<bool>;

    // --- Profiles ---
    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<Profile>>;
    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> RepoResult<Option<Profile>>;

    // --- Tokens ---
    async fn get_token(&self, user_id: Uuid) -> RepoResult<Option<AuthToken>>;
    /// Replaces any previous token of the same account.
    async fn store_token(&self, token: AuthToken) -> RepoResult<()>;
    async fn delete_token(&self, user_id: Uuid) -> RepoResult<bool>;

    // --- Interview experiences ---
    /// Newest created first.
    async fn list_interviews(&self, filter: OwnerFilter) -> RepoResult<Vec<InterviewExperience>>;
    async fn get_interview(&self, id: Uuid) -> RepoResult<Option<InterviewExperience>>;
    async fn create_interview(&self, owner: Uuid, new: NewInterview) -> RepoResult<InterviewExperience>;
    async fn update_interview(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: InterviewChanges,
    ) -> RepoResult<Option<InterviewExperience>>;
    async fn delete_interview(&self, id: Uuid, owner: Uuid) -> RepoResult<bool>;

    // --- Task experiences ---
    /// Newest start date first.
    async fn list_tasks(&self, filter: OwnerFilter) -> RepoResult<Vec<TaskExperience>>;
    async fn get_task(&self, id: Uuid) -> RepoResult<Option<TaskExperience>>;
    async fn create_task(&self, owner: Uuid, new: NewTask) -> RepoResult<TaskExperience>;
    async fn update_task(&self, id: Uuid, owner: Uuid, changes: TaskChanges) -> RepoResult<Option<TaskExperience>>;
    async fn delete_task(&self, id: Uuid, owner: Uuid) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
