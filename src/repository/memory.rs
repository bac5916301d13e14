use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository};
use crate::models::{
    Account, AuthToken, InterviewChanges, InterviewExperience, NewAccount, NewInterview, NewTask,
    OwnerFilter, Profile, ProfileChanges, TaskChanges, TaskExperience,
};

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    profiles: HashMap<Uuid, Profile>,
    tokens: HashMap<Uuid, AuthToken>,
    interviews: HashMap<Uuid, InterviewExperience>,
    tasks: HashMap<Uuid, TaskExperience>,
}

/// MemoryRepository
///
/// In-process `Repository` used by the test-suite and by `STORE=memory` local runs.
/// Every operation takes the single lock once, which gives the same atomicity the
/// Postgres constraints give: a duplicate registration racing another sees the first
/// insert and fails with `Conflict`.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_account(&self, account: NewAccount) -> RepoResult<Account> {
        let mut tables = self.tables.write().await;
        if tables.accounts.values().any(|a| a.email == account.email) {
            return Err(RepoError::Conflict { field: "email" });
        }
        if tables.accounts.values().any(|a| a.username == account.username) {
            return Err(RepoError::Conflict { field: "username" });
        }
        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            first_name: account.first_name,
            last_name: account.last_name,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.insert(created.id, Profile::empty(created.id));
        tables.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_account(&self, id: Uuid) -> RepoResult<Option<Account>> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.tables.read().await.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn record_login(&self, id: Uuid) -> RepoResult<()> {
        if let Some(account) = self.tables.write().await.accounts.get_mut(&id) {
            account.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_account_active(&self, id: Uuid, is_active: bool) -> RepoResult<Option<Account>> {
        let mut tables = self.tables.write().await;
        Ok(tables.accounts.get_mut(&id).map(|account| {
            account.is_active = is_active;
            account.updated_at = Utc::now();
            account.clone()
        }))
    }

    async fn delete_account(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.accounts.remove(&id).is_none() {
            return Ok(false);
        }
        tables.profiles.remove(&id);
        tables.tokens.remove(&id);
        tables.interviews.retain(|_, r| r.user_id != id);
        tables.tasks.retain(|_, r| r.user_id != id);
        Ok(true)
    }

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> RepoResult<Option<Profile>> {
        let mut tables = self.tables.write().await;
        Ok(tables.profiles.get_mut(&user_id).map(|profile| {
            changes.apply(profile);
            profile.clone()
        }))
    }

    async fn get_token(&self, user_id: Uuid) -> RepoResult<Option<AuthToken>> {
        Ok(self.tables.read().await.tokens.get(&user_id).cloned())
    }

    async fn store_token(&self, token: AuthToken) -> RepoResult<()> {
        self.tables.write().await.tokens.insert(token.user_id, token);
        Ok(())
    }

    async fn delete_token(&self, user_id: Uuid) -> RepoResult<bool> {
        Ok(self.tables.write().await.tokens.remove(&user_id).is_some())
    }

    async fn list_interviews(&self, filter: OwnerFilter) -> RepoResult<Vec<InterviewExperience>> {
        let tables = self.tables.read().await;
        let mut records: Vec<InterviewExperience> = tables
            .interviews
            .values()
            .filter(|r| filter.admits(r.user_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn get_interview(&self, id: Uuid) -> RepoResult<Option<InterviewExperience>> {
        Ok(self.tables.read().await.interviews.get(&id).cloned())
    }

    async fn create_interview(&self, owner: Uuid, new: NewInterview) -> RepoResult<InterviewExperience> {
        let record = new.into_record(Uuid::new_v4(), owner, Utc::now());
        self.tables.write().await.interviews.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_interview(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: InterviewChanges,
    ) -> RepoResult<Option<InterviewExperience>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .interviews
            .get_mut(&id)
            .filter(|r| r.user_id == owner)
            .map(|record| {
                changes.apply(record);
                record.updated_at = Utc::now();
                record.clone()
            }))
    }

    async fn delete_interview(&self, id: Uuid, owner: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.interviews.get(&id) {
            Some(record) if record.user_id == owner => {
                tables.interviews.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_tasks(&self, filter: OwnerFilter) -> RepoResult<Vec<TaskExperience>> {
        let tables = self.tables.read().await;
        let mut records: Vec<TaskExperience> = tables
            .tasks
            .values()
            .filter(|r| filter.admits(r.user_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(records)
    }

    async fn get_task(&self, id: Uuid) -> RepoResult<Option<TaskExperience>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn create_task(&self, owner: Uuid, new: NewTask) -> RepoResult<TaskExperience> {
        let record = new.into_record(Uuid::new_v4(), owner, Utc::now());
        self.tables.write().await.tasks.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_task(&self, id: Uuid, owner: Uuid, changes: TaskChanges) -> RepoResult<Option<TaskExperience>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .tasks
            .get_mut(&id)
            .filter(|r| r.user_id == owner)
            .map(|record| {
                changes.apply(record);
                record.updated_at = Utc::now();
                record.clone()
            }))
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.tasks.get(&id) {
            Some(record) if record.user_id == owner => {
                tables.tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
