//! Operator commands run from the binary instead of over HTTP.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::{
    auth,
    insights::{self, ActivityReport},
    models::{Account, NewAccount, OwnerFilter},
    repository::{RepoError, RepositoryState},
    validation::{self, MIN_PASSWORD_LENGTH},
};

/// Credentials of the superuser created by `create-admin`.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub enum AdminOutcome {
    Created(Account),
    /// An account with the same username or email is already there; nothing changed.
    AlreadyExists { field: &'static str },
}

/// create_admin
///
/// Creates a staff superuser. An existing account is reported, not treated as a failure,
/// so the command is safe to run on every deploy.
pub async fn create_admin(repo: &RepositoryState, seed: AdminSeed) -> Result<AdminOutcome> {
    let email = validation::normalize_email(&seed.email);
    anyhow::ensure!(validation::is_valid_email(&email), "ADMIN_EMAIL {email:?} is not a valid address");
    anyhow::ensure!(
        seed.password.chars().count() >= MIN_PASSWORD_LENGTH,
        "ADMIN_PASSWORD must be at least {MIN_PASSWORD_LENGTH} characters"
    );

    let password_hash = auth::hash_password(&seed.password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let result = repo
        .create_account(NewAccount {
            username: seed.username.trim().to_string(),
            email,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            is_staff: true,
            is_superuser: true,
        })
        .await;

    match result {
        Ok(account) => Ok(AdminOutcome::Created(account)),
        Err(RepoError::Conflict { field }) => Ok(AdminOutcome::AlreadyExists { field }),
        Err(e) => Err(e).context("could not create superuser"),
    }
}

/// Loads the snapshot behind `show-activity`.
pub async fn activity_report(repo: &RepositoryState, days: i64) -> Result<ActivityReport> {
    anyhow::ensure!(days > 0, "--days must be positive");
    let now = Utc::now();
    insights::window_start(now, days).context("--days reaches past the supported date range")?;
    let accounts = repo.list_accounts().await.context("listing accounts")?;
    let interviews = repo
        .list_interviews(OwnerFilter::All)
        .await
        .context("listing interview experiences")?;
    let tasks = repo.list_tasks(OwnerFilter::All).await.context("listing task experiences")?;
    ActivityReport::build(days, accounts, interviews, tasks, now).context("--days reaches past the supported date range")
}
