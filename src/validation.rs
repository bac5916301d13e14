//! Field validation for every write payload.
//!
//! Each validator turns a raw request payload into a normalized, typed value or a
//! [`ValidationErrors`] collecting every failing field. Create validators require the
//! mandatory fields; change validators only look at the fields actually supplied.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::models::{
    Difficulty, InterviewChanges, InterviewPayload, InterviewStatus, LoginRequest, NewInterview,
    NewTask, ProfileChanges, ProfileUpdateRequest, RegisterRequest, TaskChanges, TaskExperience,
    TaskPayload, TaskType, UnknownChoice,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const NON_FIELD: &str = "non_field_errors";

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
    static ref URL_RE: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
}

/// FieldError
///
/// A single `field: message` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// ValidationErrors
///
/// Ordered collection of field failures. `Display` renders the pairs joined by `"; "`,
/// which is exactly the `error` string returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }

    /// Returns `value` when nothing failed, otherwise the collected errors.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("Validation failed");
        }
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

// --- Field helpers ---

fn required_text(errors: &mut ValidationErrors, field: &str, raw: Option<String>, max: usize) -> Option<String> {
    match raw {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(value) => present_text(errors, field, value, max),
    }
}

/// A supplied text field that must not be blank.
fn present_text(errors: &mut ValidationErrors, field: &str, value: String, max: usize) -> Option<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    bounded(errors, field, value, max)
}

fn bounded(errors: &mut ValidationErrors, field: &str, value: String, max: usize) -> Option<String> {
    if value.chars().count() > max {
        errors.add(field, format!("Ensure this field has no more than {max} characters."));
        None
    } else {
        Some(value)
    }
}

/// An optional free-text field; `usize::MAX` means unbounded.
fn optional_text(errors: &mut ValidationErrors, field: &str, raw: Option<String>, max: usize) -> Option<String> {
    raw.and_then(|value| bounded(errors, field, value.trim().to_string(), max))
}

fn parse_date(errors: &mut ValidationErrors, field: &str, raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(
                field,
                "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
            );
            None
        }
    }
}

/// Absent keeps the stored date; `null` or an empty string clears it.
fn parse_clearable_date(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<Option<String>>,
) -> Option<Option<NaiveDate>> {
    match raw? {
        None => Some(None),
        Some(value) if value.trim().is_empty() => Some(None),
        Some(value) => parse_date(errors, field, &value).map(Some),
    }
}

fn parse_choice<T>(errors: &mut ValidationErrors, field: &str, raw: &str) -> Option<T>
where
    T: FromStr<Err = UnknownChoice>,
{
    match raw.trim().parse::<T>() {
        Ok(choice) => Some(choice),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

fn parse_rating(errors: &mut ValidationErrors, raw: i64) -> Option<i32> {
    if (1..=5).contains(&raw) {
        Some(raw as i32)
    } else {
        errors.add("rating", "Rating must be an integer between 1 and 5.");
        None
    }
}

fn parse_rounds(errors: &mut ValidationErrors, raw: i64) -> Option<i32> {
    match i32::try_from(raw) {
        Ok(rounds) if rounds >= 1 => Some(rounds),
        _ => {
            errors.add("rounds", "Ensure this value is greater than or equal to 1.");
            None
        }
    }
}

/// Empty string is accepted (clears the link); anything else must be an http(s) URL.
fn optional_url(errors: &mut ValidationErrors, field: &str, raw: Option<String>) -> Option<String> {
    let value = raw?.trim().to_string();
    if value.is_empty() || URL_RE.is_match(&value) {
        bounded(errors, field, value, 200)
    } else {
        errors.add(field, "Enter a valid URL.");
        None
    }
}

/// Trims the address and lower-cases the domain part, leaving the local part intact.
pub fn normalize_email(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

// --- Accounts ---

/// Registration input after validation. The password is still plaintext; hashing is the
/// caller's job so this module stays free of credential primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub fn validate_registration(req: RegisterRequest) -> Result<ValidRegistration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let username = required_text(&mut errors, "username", req.username, 150);
    if let Some(name) = &username {
        if !USERNAME_RE.is_match(name) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
    }

    let email = required_text(&mut errors, "email", req.email, 254).map(|e| normalize_email(&e));
    if let Some(address) = &email {
        if !is_valid_email(address) {
            errors.add("email", "Enter a valid email address.");
        }
    }

    let password = match req.password {
        None => {
            errors.add("password", REQUIRED);
            None
        }
        Some(p) if p.is_empty() => {
            errors.add("password", BLANK);
            None
        }
        Some(p) if p.chars().count() < MIN_PASSWORD_LENGTH => {
            errors.add(
                "password",
                format!("Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."),
            );
            None
        }
        Some(p) => Some(p),
    };

    match (&password, req.confirm_password) {
        (_, None) => errors.add("confirmPassword", REQUIRED),
        (Some(p), Some(confirm)) if *p != confirm => errors.add(NON_FIELD, "Passwords don't match."),
        _ => {}
    }

    let first_name = optional_text(&mut errors, "first_name", req.first_name, 150);
    let last_name = optional_text(&mut errors, "last_name", req.last_name, 150);

    if !errors.is_empty() {
        return Err(errors);
    }
    match (username, email, password) {
        (Some(username), Some(email), Some(password)) => Ok(ValidRegistration {
            username,
            email,
            password,
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
        }),
        _ => Err(ValidationErrors::single(NON_FIELD, "Validation failed")),
    }
}

/// Login credentials after presence checks; the email is normalized like at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn validate_login(req: LoginRequest) -> Result<Credentials, ValidationErrors> {
    let email = req.email.map(|e| normalize_email(&e)).filter(|e| !e.is_empty());
    let password = req.password.filter(|p| !p.is_empty());
    match (email, password) {
        (Some(email), Some(password)) => Ok(Credentials { email, password }),
        _ => Err(ValidationErrors::single(NON_FIELD, "Must include email and password.")),
    }
}

pub fn validate_profile_changes(req: ProfileUpdateRequest) -> Result<ProfileChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let bio = optional_text(&mut errors, "bio", req.bio, 500);
    let location = optional_text(&mut errors, "location", req.location, 30);
    let birth_date = parse_clearable_date(&mut errors, "birth_date", req.birth_date);
    let avatar = optional_url(&mut errors, "avatar", req.avatar);
    errors.finish(|| ProfileChanges {
        bio,
        location,
        birth_date,
        avatar,
    })
}

// --- Interview experiences ---

pub fn validate_new_interview(payload: InterviewPayload) -> Result<NewInterview, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let company_name = required_text(&mut errors, "company_name", payload.company_name, 200);
    let position = required_text(&mut errors, "position", payload.position, 200);
    let interview_date = match payload.interview_date {
        None => {
            errors.add("interview_date", REQUIRED);
            None
        }
        Some(raw) => parse_date(&mut errors, "interview_date", &raw),
    };
    let status = payload
        .status
        .map_or(Some(InterviewStatus::Pending), |raw| parse_choice(&mut errors, "status", &raw));
    let difficulty = payload
        .difficulty
        .map_or(Some(Difficulty::Medium), |raw| parse_choice(&mut errors, "difficulty", &raw));
    let rounds = payload.rounds.map_or(Some(1), |raw| parse_rounds(&mut errors, raw));
    let rating = payload.rating.map_or(Some(5), |raw| parse_rating(&mut errors, raw));
    let duration = optional_text(&mut errors, "duration", payload.duration, 50);
    let salary_offered = optional_text(&mut errors, "salary_offered", payload.salary_offered, 100);
    let location = optional_text(&mut errors, "location", payload.location, 200);

    if !errors.is_empty() {
        return Err(errors);
    }
    match (company_name, position, interview_date, status, difficulty, rounds, rating) {
        (
            Some(company_name),
            Some(position),
            Some(interview_date),
            Some(status),
            Some(difficulty),
            Some(rounds),
            Some(rating),
        ) => Ok(NewInterview {
            company_name,
            position,
            interview_date,
            status,
            difficulty,
            duration: duration.unwrap_or_default(),
            rounds,
            description: payload.description.unwrap_or_default(),
            technical_questions: payload.technical_questions.unwrap_or_default(),
            hr_questions: payload.hr_questions.unwrap_or_default(),
            tips: payload.tips.unwrap_or_default(),
            rating,
            salary_offered: salary_offered.unwrap_or_default(),
            location: location.unwrap_or_default(),
        }),
        _ => Err(ValidationErrors::single(NON_FIELD, "Validation failed")),
    }
}

pub fn validate_interview_changes(payload: InterviewPayload) -> Result<InterviewChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let changes = InterviewChanges {
        company_name: payload
            .company_name
            .and_then(|v| present_text(&mut errors, "company_name", v, 200)),
        position: payload
            .position
            .and_then(|v| present_text(&mut errors, "position", v, 200)),
        interview_date: payload
            .interview_date
            .and_then(|v| parse_date(&mut errors, "interview_date", &v)),
        status: payload
            .status
            .and_then(|v| parse_choice(&mut errors, "status", &v)),
        difficulty: payload
            .difficulty
            .and_then(|v| parse_choice(&mut errors, "difficulty", &v)),
        duration: optional_text(&mut errors, "duration", payload.duration, 50),
        rounds: payload.rounds.and_then(|v| parse_rounds(&mut errors, v)),
        description: payload.description,
        technical_questions: payload.technical_questions,
        hr_questions: payload.hr_questions,
        tips: payload.tips,
        rating: payload.rating.and_then(|v| parse_rating(&mut errors, v)),
        salary_offered: optional_text(&mut errors, "salary_offered", payload.salary_offered, 100),
        location: optional_text(&mut errors, "location", payload.location, 200),
    };
    errors.finish(|| changes)
}

// --- Task experiences ---

fn check_date_order(errors: &mut ValidationErrors, start: Option<NaiveDate>, end: Option<NaiveDate>) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.add("end_date", "End date cannot be before the start date.");
        }
    }
}

pub fn validate_new_task(payload: TaskPayload) -> Result<NewTask, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let company_name = required_text(&mut errors, "company_name", payload.company_name, 200);
    let position = required_text(&mut errors, "position", payload.position, 200);
    let task_type = payload
        .task_type
        .map_or(Some(TaskType::Project), |raw| parse_choice(&mut errors, "task_type", &raw));
    let start_date = match payload.start_date {
        None => {
            errors.add("start_date", REQUIRED);
            None
        }
        Some(raw) => parse_date(&mut errors, "start_date", &raw),
    };
    let currently_working = payload.currently_working.unwrap_or(false);
    let end_date = match payload.end_date.flatten() {
        Some(raw) if !raw.trim().is_empty() && !currently_working => parse_date(&mut errors, "end_date", &raw),
        _ => None,
    };
    check_date_order(&mut errors, start_date, end_date);
    let description = required_text(&mut errors, "description", payload.description, usize::MAX);
    let technologies_used = required_text(&mut errors, "technologies_used", payload.technologies_used, usize::MAX);
    let project_url = optional_url(&mut errors, "project_url", payload.project_url);
    let github_url = optional_url(&mut errors, "github_url", payload.github_url);
    let location = optional_text(&mut errors, "location", payload.location, 200);

    if !errors.is_empty() {
        return Err(errors);
    }
    match (company_name, position, task_type, start_date, description, technologies_used) {
        (
            Some(company_name),
            Some(position),
            Some(task_type),
            Some(start_date),
            Some(description),
            Some(technologies_used),
        ) => Ok(NewTask {
            company_name,
            position,
            task_type,
            start_date,
            end_date,
            currently_working,
            description,
            technologies_used,
            achievements: payload.achievements.unwrap_or_default(),
            key_responsibilities: payload.key_responsibilities.unwrap_or_default(),
            project_url: project_url.unwrap_or_default(),
            github_url: github_url.unwrap_or_default(),
            location: location.unwrap_or_default(),
        }),
        _ => Err(ValidationErrors::single(NON_FIELD, "Validation failed")),
    }
}

pub fn validate_task_changes(payload: TaskPayload) -> Result<TaskChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let start_date = payload
        .start_date
        .and_then(|v| parse_date(&mut errors, "start_date", &v));
    let end_date = parse_clearable_date(&mut errors, "end_date", payload.end_date);
    check_date_order(&mut errors, start_date, end_date.flatten());

    let changes = TaskChanges {
        company_name: payload
            .company_name
            .and_then(|v| present_text(&mut errors, "company_name", v, 200)),
        position: payload
            .position
            .and_then(|v| present_text(&mut errors, "position", v, 200)),
        task_type: payload
            .task_type
            .and_then(|v| parse_choice(&mut errors, "task_type", &v)),
        start_date,
        end_date,
        currently_working: payload.currently_working,
        description: payload
            .description
            .and_then(|v| present_text(&mut errors, "description", v, usize::MAX)),
        technologies_used: payload
            .technologies_used
            .and_then(|v| present_text(&mut errors, "technologies_used", v, usize::MAX)),
        achievements: payload.achievements,
        key_responsibilities: payload.key_responsibilities,
        project_url: optional_url(&mut errors, "project_url", payload.project_url),
        github_url: optional_url(&mut errors, "github_url", payload.github_url),
        location: optional_text(&mut errors, "location", payload.location, 200),
    };
    errors.finish(|| changes)
}

/// Date order of a task after `changes` would be merged into `current`. Only needed for
/// partial updates, where one of the two dates may come from the stored record.
pub fn check_task_dates(current: &TaskExperience, changes: &TaskChanges) -> Result<(), ValidationErrors> {
    let currently_working = changes.currently_working.unwrap_or(current.currently_working);
    let mut errors = ValidationErrors::new();
    if !currently_working {
        check_date_order(
            &mut errors,
            Some(changes.start_date.unwrap_or(current.start_date)),
            changes.end_date.unwrap_or(current.end_date),
        );
    }
    errors.finish(|| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            username: Some("alice".into()),
            email: Some("a@x.com".into()),
            password: Some("longpass1".into()),
            confirm_password: Some("longpass1".into()),
            first_name: None,
            last_name: None,
        }
    }

    fn interview() -> InterviewPayload {
        InterviewPayload {
            company_name: Some("Acme".into()),
            position: Some("SWE".into()),
            interview_date: Some("2024-01-01".into()),
            status: Some("pending".into()),
            rating: Some(4),
            ..InterviewPayload::default()
        }
    }

    fn task() -> TaskPayload {
        TaskPayload {
            company_name: Some("Globex".into()),
            position: Some("Intern".into()),
            task_type: Some("internship".into()),
            start_date: Some("2023-06-01".into()),
            description: Some("Built things".into()),
            technologies_used: Some("rust, sql".into()),
            ..TaskPayload::default()
        }
    }

    #[test]
    fn test_display_joins_pairs_with_semicolons() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Enter a valid email address.");
        errors.add("password", "This field is required.");
        assert_eq!(
            errors.to_string(),
            "email: Enter a valid email address.; password: This field is required."
        );
    }

    #[test]
    fn test_registration_accepts_valid_payload() {
        let valid = validate_registration(registration()).unwrap();
        assert_eq!(valid.username, "alice");
        assert_eq!(valid.email, "a@x.com");
        assert_eq!(valid.first_name, "");
    }

    #[test]
    fn test_registration_rejects_password_mismatch() {
        let req = RegisterRequest {
            confirm_password: Some("different1".into()),
            ..registration()
        };
        let errors = validate_registration(req).unwrap_err();
        assert!(errors.to_string().contains("Passwords don't match."));
    }

    #[test]
    fn test_registration_reports_every_missing_field() {
        let errors = validate_registration(RegisterRequest::default()).unwrap_err();
        for field in ["username", "email", "password", "confirmPassword"] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_registration_enforces_min_password_length() {
        let req = RegisterRequest {
            password: Some("short".into()),
            confirm_password: Some("short".into()),
            ..registration()
        };
        let errors = validate_registration(req).unwrap_err();
        assert!(errors.has("password"));
        assert!(!errors.has(NON_FIELD));
    }

    #[test]
    fn test_registration_rejects_bad_username_and_email() {
        let req = RegisterRequest {
            username: Some("has space".into()),
            email: Some("not-an-email".into()),
            ..registration()
        };
        let errors = validate_registration(req).unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
    }

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "Alice@example.com");
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = validate_login(LoginRequest {
            email: Some("a@x.com".into()),
            password: None,
        })
        .unwrap_err();
        assert_eq!(errors.to_string(), "non_field_errors: Must include email and password.");
    }

    #[test]
    fn test_new_interview_applies_defaults() {
        let payload = InterviewPayload {
            status: None,
            rating: None,
            ..interview()
        };
        let new = validate_new_interview(payload).unwrap();
        assert_eq!(new.status, InterviewStatus::Pending);
        assert_eq!(new.difficulty, Difficulty::Medium);
        assert_eq!(new.rating, 5);
        assert_eq!(new.rounds, 1);
    }

    #[test]
    fn test_unknown_choice_lists_accepted_values() {
        let payload = InterviewPayload {
            status: Some("hired".into()),
            ..interview()
        };
        let message = validate_new_interview(payload).unwrap_err().to_string();
        assert_eq!(
            message,
            "status: \"hired\" is not a valid choice (expected one of: pending, in_progress, selected, rejected)"
        );
    }

    #[test]
    fn test_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let payload = InterviewPayload {
                rating: Some(rating),
                ..interview()
            };
            assert_eq!(validate_new_interview(payload).is_ok(), ok, "rating {rating}");
        }
    }

    #[test]
    fn test_interview_requires_company_position_and_date() {
        let errors = validate_new_interview(InterviewPayload::default()).unwrap_err();
        assert!(errors.has("company_name"));
        assert!(errors.has("position"));
        assert!(errors.has("interview_date"));
    }

    #[test]
    fn test_interview_changes_only_touch_supplied_fields() {
        let changes = validate_interview_changes(InterviewPayload {
            status: Some("selected".into()),
            ..InterviewPayload::default()
        })
        .unwrap();
        assert_eq!(
            changes,
            InterviewChanges {
                status: Some(InterviewStatus::Selected),
                ..InterviewChanges::default()
            }
        );
    }

    #[test]
    fn test_interview_changes_reject_blank_required_field() {
        let errors = validate_interview_changes(InterviewPayload {
            company_name: Some("   ".into()),
            ..InterviewPayload::default()
        })
        .unwrap_err();
        assert_eq!(errors.to_string(), "company_name: This field may not be blank.");
    }

    #[test]
    fn test_new_task_drops_end_date_while_working() {
        let new = validate_new_task(TaskPayload {
            currently_working: Some(true),
            end_date: Some(Some("2024-01-01".into())),
            ..task()
        })
        .unwrap();
        assert!(new.currently_working);
        assert_eq!(new.end_date, None);
        assert_eq!(new.task_type, TaskType::Internship);
    }

    #[test]
    fn test_new_task_rejects_end_before_start() {
        let errors = validate_new_task(TaskPayload {
            end_date: Some(Some("2023-01-01".into())),
            ..task()
        })
        .unwrap_err();
        assert!(errors.has("end_date"));
    }

    #[test]
    fn test_new_task_requires_description_and_technologies() {
        let errors = validate_new_task(TaskPayload {
            description: None,
            technologies_used: None,
            ..task()
        })
        .unwrap_err();
        assert!(errors.has("description"));
        assert!(errors.has("technologies_used"));
    }

    #[test]
    fn test_task_urls_must_be_http() {
        let errors = validate_new_task(TaskPayload {
            github_url: Some("ftp://example.com/repo".into()),
            project_url: Some("https://example.com".into()),
            ..task()
        })
        .unwrap_err();
        assert!(errors.has("github_url"));
        assert!(!errors.has("project_url"));
    }

    #[test]
    fn test_partial_task_update_checks_merged_dates() {
        let stored = validate_new_task(task())
            .unwrap()
            .into_record(uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), chrono::Utc::now());

        let early_end = TaskChanges {
            end_date: Some(NaiveDate::from_ymd_opt(2023, 1, 1)),
            ..TaskChanges::default()
        };
        assert!(check_task_dates(&stored, &early_end).unwrap_err().has("end_date"));

        let working = TaskChanges {
            currently_working: Some(true),
            ..early_end.clone()
        };
        assert!(check_task_dates(&stored, &working).is_ok());

        let later_end = TaskChanges {
            end_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1)),
            ..TaskChanges::default()
        };
        assert!(check_task_dates(&stored, &later_end).is_ok());
    }

    #[test]
    fn test_profile_changes_clear_birth_date() {
        let changes = validate_profile_changes(ProfileUpdateRequest {
            birth_date: Some(Some(String::new())),
            ..ProfileUpdateRequest::default()
        })
        .unwrap();
        assert_eq!(changes.birth_date, Some(None));
    }

    #[test]
    fn test_task_changes_clear_end_date() {
        for end_date in [None, Some(String::new())] {
            let changes = validate_task_changes(TaskPayload {
                end_date: Some(end_date),
                ..TaskPayload::default()
            })
            .unwrap();
            assert_eq!(changes.end_date, Some(None));
        }

        let untouched = validate_task_changes(TaskPayload::default()).unwrap();
        assert_eq!(untouched.end_date, None);
    }

    #[test]
    fn test_profile_bio_length_is_bounded() {
        let errors = validate_profile_changes(ProfileUpdateRequest {
            bio: Some("x".repeat(501)),
            ..ProfileUpdateRequest::default()
        })
        .unwrap_err();
        assert!(errors.has("bio"));
    }
}
