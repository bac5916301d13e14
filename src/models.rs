use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enumerated Fields ---

/// UnknownChoice
///
/// Raised when a string does not belong to the closed value set of an enumerated field.
/// The message lists every accepted value so clients can correct the payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{value}\" is not a valid choice (expected one of: {})", .accepted.join(", "))]
pub struct UnknownChoice {
    pub value: String,
    pub accepted: &'static [&'static str],
}

/// Declares a closed string enumeration stored as TEXT and exchanged as snake_case JSON.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
        #[serde(rename_all = "snake_case")]
        #[ts(export)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownChoice {
                        value: other.to_string(),
                        accepted: Self::VALUES,
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownChoice;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                raw.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    /// Outcome of an interview process. Any value may move to any other value.
    InterviewStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Selected => "selected",
        Rejected => "rejected",
    }
}

choice_enum! {
    Difficulty {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

choice_enum! {
    /// Kind of engagement a task experience describes.
    TaskType {
        Project => "project",
        Internship => "internship",
        Freelance => "freelance",
        FullTime => "full_time",
        PartTime => "part_time",
    }
}

choice_enum! {
    /// Activity badge derived from a user's experiences. Never stored.
    Badge {
        FirstInterview => "first_interview",
        InterviewVeteran => "interview_veteran",
        OfferReceived => "offer_received",
        Builder => "builder",
        OpenSource => "open_source",
        CurrentlyWorking => "currently_working",
    }
}

/// Owned
///
/// Implemented by every record that belongs to exactly one account.
/// The authorization policy only ever needs the owner id.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

// --- Identity Schemas ---

/// Account
///
/// Canonical row of the `accounts` table. Deliberately not `Serialize`: the password hash
/// must never leave the process, so every response goes through a view type.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// UserView
///
/// The only shape in which an account is exposed to clients (public and owner alike).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            created_at: account.created_at,
        }
    }
}

/// AccountSummary
///
/// Administrative listing row; mirrors the account admin's `list_display`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AccountSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    #[ts(type = "string | null")]
    pub last_login: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            is_active: account.is_active,
            last_login: account.last_login,
            created_at: account.created_at,
        }
    }
}

/// Profile
///
/// One-to-one extension of an account, keyed by the account id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Profile {
    pub user_id: Uuid,
    pub bio: String,
    pub location: String,
    pub birth_date: Option<NaiveDate>,
    pub avatar: String,
}

impl Profile {
    /// The empty profile created alongside every account.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            bio: String::new(),
            location: String::new(),
            birth_date: None,
            avatar: String::new(),
        }
    }
}

impl Owned for Profile {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Validated partial update of a profile. `birth_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub avatar: Option<String>,
}

impl ProfileChanges {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(bio) = self.bio {
            profile.bio = bio;
        }
        if let Some(location) = self.location {
            profile.location = location;
        }
        if let Some(birth_date) = self.birth_date {
            profile.birth_date = birth_date;
        }
        if let Some(avatar) = self.avatar {
            profile.avatar = avatar;
        }
    }
}

/// ProfileView
///
/// Owner view of a profile (GET /profile): the profile fields plus the embedded user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfileView {
    pub user: UserView,
    pub bio: String,
    pub location: String,
    pub birth_date: Option<NaiveDate>,
    pub avatar: String,
}

impl ProfileView {
    pub fn new(account: &Account, profile: Profile) -> Self {
        Self {
            user: UserView::from(account),
            bio: profile.bio,
            location: profile.location,
            birth_date: profile.birth_date,
            avatar: profile.avatar,
        }
    }
}

/// AuthToken
///
/// The single active access token of an account (`auth_tokens` table).
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AuthToken {
    pub user_id: Uuid,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

// --- Experience Schemas ---

/// Ownership scope of an experience listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerFilter {
    All,
    Owner(Uuid),
}

impl OwnerFilter {
    pub fn admits(&self, owner: Uuid) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Owner(id) => *id == owner,
        }
    }
}

/// InterviewExperience
///
/// A user's write-up of one interview process (`interview_experiences` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct InterviewExperience {
    pub id: Uuid,
    // FK to accounts.id (Owner).
    pub user_id: Uuid,
    pub company_name: String,
    pub position: String,
    pub interview_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: InterviewStatus,
    #[sqlx(try_from = "String")]
    pub difficulty: Difficulty,
    pub duration: String,
    pub rounds: i32,
    pub description: String,
    pub technical_questions: String,
    pub hr_questions: String,
    pub tips: String,
    pub rating: i32,
    pub salary_offered: String,
    pub location: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Owned for InterviewExperience {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Validated input for a new interview experience, defaults already filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInterview {
    pub company_name: String,
    pub position: String,
    pub interview_date: NaiveDate,
    pub status: InterviewStatus,
    pub difficulty: Difficulty,
    pub duration: String,
    pub rounds: i32,
    pub description: String,
    pub technical_questions: String,
    pub hr_questions: String,
    pub tips: String,
    pub rating: i32,
    pub salary_offered: String,
    pub location: String,
}

impl NewInterview {
    pub fn into_record(self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> InterviewExperience {
        InterviewExperience {
            id,
            user_id,
            company_name: self.company_name,
            position: self.position,
            interview_date: self.interview_date,
            status: self.status,
            difficulty: self.difficulty,
            duration: self.duration,
            rounds: self.rounds,
            description: self.description,
            technical_questions: self.technical_questions,
            hr_questions: self.hr_questions,
            tips: self.tips,
            rating: self.rating,
            salary_offered: self.salary_offered,
            location: self.location,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update of an interview experience; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewChanges {
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub interview_date: Option<NaiveDate>,
    pub status: Option<InterviewStatus>,
    pub difficulty: Option<Difficulty>,
    pub duration: Option<String>,
    pub rounds: Option<i32>,
    pub description: Option<String>,
    pub technical_questions: Option<String>,
    pub hr_questions: Option<String>,
    pub tips: Option<String>,
    pub rating: Option<i32>,
    pub salary_offered: Option<String>,
    pub location: Option<String>,
}

impl InterviewChanges {
    pub fn apply(self, record: &mut InterviewExperience) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        set(&mut record.company_name, self.company_name);
        set(&mut record.position, self.position);
        set(&mut record.interview_date, self.interview_date);
        set(&mut record.status, self.status);
        set(&mut record.difficulty, self.difficulty);
        set(&mut record.duration, self.duration);
        set(&mut record.rounds, self.rounds);
        set(&mut record.description, self.description);
        set(&mut record.technical_questions, self.technical_questions);
        set(&mut record.hr_questions, self.hr_questions);
        set(&mut record.tips, self.tips);
        set(&mut record.rating, self.rating);
        set(&mut record.salary_offered, self.salary_offered);
        set(&mut record.location, self.location);
    }
}

/// TaskExperience
///
/// A project, internship or job the user worked on (`task_experiences` table).
/// `end_date` is always `None` while `currently_working` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct TaskExperience {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub position: String,
    #[sqlx(try_from = "String")]
    pub task_type: TaskType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub currently_working: bool,
    pub description: String,
    pub technologies_used: String,
    pub achievements: String,
    pub key_responsibilities: String,
    pub project_url: String,
    pub github_url: String,
    pub location: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl TaskExperience {
    /// The comma separated `technologies_used` field as trimmed, non-empty tokens.
    pub fn technologies(&self) -> Vec<&str> {
        self.technologies_used
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect()
    }
}

impl Owned for TaskExperience {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub company_name: String,
    pub position: String,
    pub task_type: TaskType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub currently_working: bool,
    pub description: String,
    pub technologies_used: String,
    pub achievements: String,
    pub key_responsibilities: String,
    pub project_url: String,
    pub github_url: String,
    pub location: String,
}

impl NewTask {
    pub fn into_record(self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> TaskExperience {
        TaskExperience {
            id,
            user_id,
            company_name: self.company_name,
            position: self.position,
            task_type: self.task_type,
            start_date: self.start_date,
            end_date: if self.currently_working { None } else { self.end_date },
            currently_working: self.currently_working,
            description: self.description,
            technologies_used: self.technologies_used,
            achievements: self.achievements,
            key_responsibilities: self.key_responsibilities,
            project_url: self.project_url,
            github_url: self.github_url,
            location: self.location,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub task_type: Option<TaskType>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date.
    pub end_date: Option<Option<NaiveDate>>,
    pub currently_working: Option<bool>,
    pub description: Option<String>,
    pub technologies_used: Option<String>,
    pub achievements: Option<String>,
    pub key_responsibilities: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub location: Option<String>,
}

impl TaskChanges {
    pub fn apply(self, record: &mut TaskExperience) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        set(&mut record.company_name, self.company_name);
        set(&mut record.position, self.position);
        set(&mut record.task_type, self.task_type);
        set(&mut record.start_date, self.start_date);
        set(&mut record.end_date, self.end_date);
        set(&mut record.currently_working, self.currently_working);
        set(&mut record.description, self.description);
        set(&mut record.technologies_used, self.technologies_used);
        set(&mut record.achievements, self.achievements);
        set(&mut record.key_responsibilities, self.key_responsibilities);
        set(&mut record.project_url, self.project_url);
        set(&mut record.github_url, self.github_url);
        set(&mut record.location, self.location);
        if record.currently_working {
            record.end_date = None;
        }
    }
}

// --- Request Payloads (Input Schemas) ---
//
// Every field is optional at the serde level so that missing or malformed values are
// reported by the validation layer as `field: message` pairs instead of a bare
// deserialization failure.

/// RegisterRequest
///
/// Input payload for POST /register.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// LoginRequest
///
/// Input payload for POST /login. The email is the login identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Reads a clearable field: absent is `None`, `null` is `Some(None)`.
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// ProfileUpdateRequest
///
/// Partial update payload for PUT /profile. An empty or `null` `birth_date` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct ProfileUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    #[schema(value_type = Option<String>)]
    pub birth_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// InterviewPayload
///
/// Body of POST /interviews (full) and PUT /interviews/{id} (partial).
/// Any owner field in the body is ignored; the owner is always the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct InterviewPayload {
    #[serde(alias = "company", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_questions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_questions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_offered: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// TaskPayload
///
/// Body of POST /tasks (full) and PUT /tasks/{id} (partial).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct TaskPayload {
    #[serde(alias = "company", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// An empty string or `null` clears the stored end date on update.
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currently_working: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<String>,
    #[serde(alias = "responsibilities", skip_serializing_if = "Option::is_none")]
    pub key_responsibilities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// SetActiveRequest
///
/// Body of PUT /admin/users/{id}/active.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

// --- Response Schemas (Output) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub endpoints: Vec<String>,
}

/// AuthResponse
///
/// Returned by register and login: the user view plus the active access token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfileUpdateResponse {
    pub profile: ProfileView,
    pub message: String,
}

/// PublicUserDetail
///
/// Unauthenticated account detail (GET /public/users/{id}). Credentials and tokens are
/// structurally absent; `completeness` and `badges` are computed on read.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PublicUserDetail {
    pub user: UserView,
    pub profile: Profile,
    pub interview_experiences: Vec<InterviewExperience>,
    pub task_experiences: Vec<TaskExperience>,
    pub completeness: u8,
    pub badges: Vec<Badge>,
}
