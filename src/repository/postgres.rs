use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository};
use crate::models::{
    Account, AuthToken, InterviewChanges, InterviewExperience, NewAccount, NewInterview, NewTask,
    OwnerFilter, Profile, ProfileChanges, TaskChanges, TaskExperience,
};

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     is_staff, is_superuser, is_active, last_login, created_at, updated_at";

const INTERVIEW_COLUMNS: &str = "id, user_id, company_name, position, interview_date, status, \
     difficulty, duration, rounds, description, technical_questions, hr_questions, tips, rating, \
     salary_offered, location, created_at, updated_at";

const TASK_COLUMNS: &str = "id, user_id, company_name, position, task_type, start_date, end_date, \
     currently_working, description, technologies_used, achievements, key_responsibilities, \
     project_url, github_url, location, created_at, updated_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Queries are checked at runtime
/// (`query_as` + `bind`) so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique violation on `accounts` to the field that collided.
fn account_conflict(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some(name) if name.contains("username") => "username",
                _ => "email",
            };
            return RepoError::Conflict { field };
        }
    }
    RepoError::Database(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    /// create_account
    ///
    /// Inserts the account and its profile in one transaction, so a Conflict never leaves
    /// a profile-less account behind.
    async fn create_account(&self, account: NewAccount) -> RepoResult<Account> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (id, username, email, password_hash, first_name, last_name, \
             is_staff, is_superuser, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, NOW(), NOW()) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.is_staff)
        .bind(account.is_superuser)
        .fetch_one(&mut *tx)
        .await
        .map_err(account_conflict)?;

        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
            .bind(created.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn get_account(&self, id: Uuid) -> RepoResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn get_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let account =
            sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    async fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        let accounts =
            sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await?;
        Ok(accounts)
    }

    async fn record_login(&self, id: Uuid) -> RepoResult<()> {
        sqlx::query("UPDATE accounts SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_account_active(&self, id: Uuid, is_active: bool) -> RepoResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn delete_account(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, bio, location, birth_date, avatar FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    /// update_profile
    ///
    /// `COALESCE` keeps every column whose change is `None`. The birth date needs an extra
    /// flag because `Some(None)` (clear) and `None` (keep) both bind as NULL.
    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> RepoResult<Option<Profile>> {
        let touch_birth_date = changes.birth_date.is_some();
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET bio = COALESCE($2, bio),
                location = COALESCE($3, location),
                birth_date = CASE WHEN $4 THEN $5 ELSE birth_date END,
                avatar = COALESCE($6, avatar)
            WHERE user_id = $1
            RETURNING user_id, bio, location, birth_date, avatar
            "#,
        )
        .bind(user_id)
        .bind(changes.bio)
        .bind(changes.location)
        .bind(touch_birth_date)
        .bind(changes.birth_date.flatten())
        .bind(changes.avatar)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn get_token(&self, user_id: Uuid) -> RepoResult<Option<AuthToken>> {
        let token = sqlx::query_as::<_, AuthToken>("SELECT user_id, key, created_at FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(token)
    }

    async fn store_token(&self, token: AuthToken) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO auth_tokens (user_id, key, created_at) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET key = EXCLUDED.key, created_at = EXCLUDED.created_at",
        )
        .bind(token.user_id)
        .bind(token.key)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_token(&self, user_id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- INTERVIEWS ---

    async fn list_interviews(&self, filter: OwnerFilter) -> RepoResult<Vec<InterviewExperience>> {
        let records = match filter {
            OwnerFilter::All => {
                let sql = format!("SELECT {INTERVIEW_COLUMNS} FROM interview_experiences ORDER BY created_at DESC");
                sqlx::query_as::<_, InterviewExperience>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
            OwnerFilter::Owner(owner) => {
                let sql = format!(
                    "SELECT {INTERVIEW_COLUMNS} FROM interview_experiences WHERE user_id = $1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, InterviewExperience>(&sql)
                    .bind(owner)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(records)
    }

    async fn get_interview(&self, id: Uuid) -> RepoResult<Option<InterviewExperience>> {
        let record = sqlx::query_as::<_, InterviewExperience>(&format!(
            "SELECT {INTERVIEW_COLUMNS} FROM interview_experiences WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn create_interview(&self, owner: Uuid, new: NewInterview) -> RepoResult<InterviewExperience> {
        let record = sqlx::query_as::<_, InterviewExperience>(&format!(
            "INSERT INTO interview_experiences (id, user_id, company_name, position, interview_date, \
             status, difficulty, duration, rounds, description, technical_questions, hr_questions, \
             tips, rating, salary_offered, location, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, NOW(), NOW()) \
             RETURNING {INTERVIEW_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(new.company_name)
        .bind(new.position)
        .bind(new.interview_date)
        .bind(new.status.as_str())
        .bind(new.difficulty.as_str())
        .bind(new.duration)
        .bind(new.rounds)
        .bind(new.description)
        .bind(new.technical_questions)
        .bind(new.hr_questions)
        .bind(new.tips)
        .bind(new.rating)
        .bind(new.salary_offered)
        .bind(new.location)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// update_interview
    ///
    /// Owner-Only partial update in a single statement: the `user_id` guard and the
    /// `COALESCE` merge happen atomically, so a foreign id simply matches no row.
    async fn update_interview(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: InterviewChanges,
    ) -> RepoResult<Option<InterviewExperience>> {
        let record = sqlx::query_as::<_, InterviewExperience>(&format!(
            r#"
            UPDATE interview_experiences
            SET company_name = COALESCE($3, company_name),
                position = COALESCE($4, position),
                interview_date = COALESCE($5, interview_date),
                status = COALESCE($6, status),
                difficulty = COALESCE($7, difficulty),
                duration = COALESCE($8, duration),
                rounds = COALESCE($9, rounds),
                description = COALESCE($10, description),
                technical_questions = COALESCE($11, technical_questions),
                hr_questions = COALESCE($12, hr_questions),
                tips = COALESCE($13, tips),
                rating = COALESCE($14, rating),
                salary_offered = COALESCE($15, salary_offered),
                location = COALESCE($16, location),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {INTERVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(changes.company_name)
        .bind(changes.position)
        .bind(changes.interview_date)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.difficulty.map(|d| d.as_str()))
        .bind(changes.duration)
        .bind(changes.rounds)
        .bind(changes.description)
        .bind(changes.technical_questions)
        .bind(changes.hr_questions)
        .bind(changes.tips)
        .bind(changes.rating)
        .bind(changes.salary_offered)
        .bind(changes.location)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn delete_interview(&self, id: Uuid, owner: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM interview_experiences WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- TASKS ---

    async fn list_tasks(&self, filter: OwnerFilter) -> RepoResult<Vec<TaskExperience>> {
        let records = match filter {
            OwnerFilter::All => {
                let sql = format!("SELECT {TASK_COLUMNS} FROM task_experiences ORDER BY start_date DESC, created_at DESC");
                sqlx::query_as::<_, TaskExperience>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
            OwnerFilter::Owner(owner) => {
                let sql = format!(
                    "SELECT {TASK_COLUMNS} FROM task_experiences WHERE user_id = $1 \
                     ORDER BY start_date DESC, created_at DESC"
                );
                sqlx::query_as::<_, TaskExperience>(&sql)
                    .bind(owner)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(records)
    }

    async fn get_task(&self, id: Uuid) -> RepoResult<Option<TaskExperience>> {
        let record = sqlx::query_as::<_, TaskExperience>(&format!("SELECT {TASK_COLUMNS} FROM task_experiences WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn create_task(&self, owner: Uuid, new: NewTask) -> RepoResult<TaskExperience> {
        let end_date = if new.currently_working { None } else { new.end_date };
        let record = sqlx::query_as::<_, TaskExperience>(&format!(
            "INSERT INTO task_experiences (id, user_id, company_name, position, task_type, start_date, \
             end_date, currently_working, description, technologies_used, achievements, \
             key_responsibilities, project_url, github_url, location, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW(), NOW()) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(new.company_name)
        .bind(new.position)
        .bind(new.task_type.as_str())
        .bind(new.start_date)
        .bind(end_date)
        .bind(new.currently_working)
        .bind(new.description)
        .bind(new.technologies_used)
        .bind(new.achievements)
        .bind(new.key_responsibilities)
        .bind(new.project_url)
        .bind(new.github_url)
        .bind(new.location)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// update_task
    ///
    /// Same single-statement Owner-Only merge as interviews. The end date is forced to
    /// NULL whenever the merged `currently_working` is true; otherwise it follows the
    /// same touch flag as the profile birth date.
    async fn update_task(&self, id: Uuid, owner: Uuid, changes: TaskChanges) -> RepoResult<Option<TaskExperience>> {
        let touch_end_date = changes.end_date.is_some();
        let record = sqlx::query_as::<_, TaskExperience>(&format!(
            r#"
            UPDATE task_experiences
            SET company_name = COALESCE($3, company_name),
                position = COALESCE($4, position),
                task_type = COALESCE($5, task_type),
                start_date = COALESCE($6, start_date),
                end_date = CASE WHEN COALESCE($8, currently_working) THEN NULL
                                WHEN $16 THEN $7
                                ELSE end_date END,
                currently_working = COALESCE($8, currently_working),
                description = COALESCE($9, description),
                technologies_used = COALESCE($10, technologies_used),
                achievements = COALESCE($11, achievements),
                key_responsibilities = COALESCE($12, key_responsibilities),
                project_url = COALESCE($13, project_url),
                github_url = COALESCE($14, github_url),
                location = COALESCE($15, location),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(changes.company_name)
        .bind(changes.position)
        .bind(changes.task_type.map(|t| t.as_str()))
        .bind(changes.start_date)
        .bind(changes.end_date.flatten())
        .bind(changes.currently_working)
        .bind(changes.description)
        .bind(changes.technologies_used)
        .bind(changes.achievements)
        .bind(changes.key_responsibilities)
        .bind(changes.project_url)
        .bind(changes.github_url)
        .bind(changes.location)
        .bind(touch_end_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM task_experiences WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
