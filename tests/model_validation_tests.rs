use chrono::{NaiveDate, Utc};
use recursion_backend::{
    models::{
        Account, Badge, InterviewPayload, InterviewStatus, RegisterRequest, TaskPayload, TaskType,
        UserView,
    },
    validation,
};
use serde_json::json;
use uuid::Uuid;

// --- Payload deserialization ---

#[test]
fn test_company_alias_on_both_experience_payloads() {
    let interview: InterviewPayload = serde_json::from_value(json!({ "company": "Acme" })).unwrap();
    assert_eq!(interview.company_name.as_deref(), Some("Acme"));

    let task: TaskPayload = serde_json::from_value(json!({
        "company": "Initech",
        "responsibilities": "On-call"
    }))
    .unwrap();
    assert_eq!(task.company_name.as_deref(), Some("Initech"));
    assert_eq!(task.key_responsibilities.as_deref(), Some("On-call"));

    // The canonical names keep working.
    let task: TaskPayload = serde_json::from_value(json!({ "company_name": "Globex" })).unwrap();
    assert_eq!(task.company_name.as_deref(), Some("Globex"));
}

#[test]
fn test_register_request_uses_camel_case_confirmation() {
    let req: RegisterRequest = serde_json::from_value(json!({
        "username": "alice",
        "email": "alice@x.com",
        "password": "longpass1",
        "confirmPassword": "longpass1"
    }))
    .unwrap();
    assert_eq!(req.confirm_password.as_deref(), Some("longpass1"));
    assert!(validation::validate_registration(req).is_ok());

    // snake_case confirmation is not the wire name, so it counts as missing.
    let req: RegisterRequest = serde_json::from_value(json!({
        "username": "alice",
        "email": "alice@x.com",
        "password": "longpass1",
        "confirm_password": "longpass1"
    }))
    .unwrap();
    let err = validation::validate_registration(req).unwrap_err();
    assert_eq!(err.to_string(), "confirmPassword: This field is required.");
}

#[test]
fn test_missing_fields_deserialize_to_none() {
    let payload: InterviewPayload = serde_json::from_value(json!({})).unwrap();
    assert!(payload.company_name.is_none() && payload.rating.is_none());
}

// --- Choice enums ---

#[test]
fn test_choice_enums_are_snake_case_on_the_wire() {
    assert_eq!(serde_json::to_value(InterviewStatus::Selected).unwrap(), json!("selected"));
    assert_eq!(serde_json::to_value(TaskType::FullTime).unwrap(), json!("full_time"));
    assert_eq!(serde_json::to_value(Badge::OpenSource).unwrap(), json!("open_source"));

    let parsed: TaskType = serde_json::from_value(json!("part_time")).unwrap();
    assert_eq!(parsed, TaskType::PartTime);
    assert!("FULL_TIME".parse::<TaskType>().is_err());
    assert_eq!("in_progress".parse::<InterviewStatus>().unwrap(), InterviewStatus::InProgress);
}

#[test]
fn test_unknown_choice_lists_accepted_values() {
    let err = validation::validate_new_interview(InterviewPayload {
        company_name: Some("Acme".into()),
        position: Some("SWE".into()),
        interview_date: Some("2024-01-01".into()),
        status: Some("ghosted".into()),
        ..InterviewPayload::default()
    })
    .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("status: "), "{message}");
    assert!(message.contains("pending"), "{message}");
}

// --- Views ---

#[test]
fn test_user_view_carries_no_credentials() {
    let account = Account {
        id: Uuid::new_v4(),
        username: "alice".into(),
        email: "alice@x.com".into(),
        password_hash: "$argon2id$v=19$secret".into(),
        first_name: "Alice".into(),
        last_name: String::new(),
        is_staff: true,
        is_superuser: false,
        is_active: true,
        last_login: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let value = serde_json::to_value(UserView::from(&account)).unwrap();
    let object = value.as_object().unwrap();

    let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, ["created_at", "email", "first_name", "id", "last_name", "username"]);
    assert!(!value.to_string().contains("argon2"));
}

#[test]
fn test_new_task_defaults() {
    let new = validation::validate_new_task(TaskPayload {
        company_name: Some("Initech".into()),
        position: Some("Intern".into()),
        start_date: Some("2023-06-01".into()),
        description: Some("Billing".into()),
        technologies_used: Some("rust".into()),
        ..TaskPayload::default()
    })
    .unwrap();
    assert_eq!(new.task_type, TaskType::Project);
    assert_eq!(new.start_date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    assert!(!new.currently_working);
    assert_eq!(new.end_date, None);
}
