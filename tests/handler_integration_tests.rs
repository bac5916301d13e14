mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, interview_body, task_body};
use serde_json::json;

#[tokio::test]
async fn test_owner_scoped_crud_scenario() {
    let app = TestApp::new();
    let (alice_id, alice) = app.register("alice").await;
    let (_, bob) = app.register("bob").await;

    let created = app.create_interview(&alice, "Acme").await;
    assert_eq!(created["user_id"], alice_id.to_string());
    assert_eq!(created["company_name"], "Acme");
    assert_eq!(created["difficulty"], "medium");
    assert_eq!(created["rounds"], 1);

    let (status, public) = app.get("/public/interviews", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(public.as_array().unwrap().iter().any(|i| i["company_name"] == "Acme"));

    let (status, mine) = app.get("/interviews", Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(mine.as_array().unwrap().is_empty());

    let uri = format!("/interviews/{}", created["id"].as_str().unwrap());
    let (status, body) = app.delete(&uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found.");

    let (status, _) = app.get(&uri, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_then_get_returns_the_same_record() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;

    let created = app.create_task(&token, "Initech").await;
    let uri = format!("/tasks/{}", created["id"].as_str().unwrap());
    let (status, fetched) = app.get(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["task_type"], "internship");
    assert_eq!(fetched["end_date"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_owner_field_in_body_is_ignored() {
    let app = TestApp::new();
    let (alice_id, alice) = app.register("alice").await;
    let (bob_id, _) = app.register("bob").await;

    let mut body = interview_body("Acme");
    body["user_id"] = json!(bob_id.to_string());
    let (status, created) = app.post("/interviews", Some(&alice), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user_id"], alice_id.to_string());
}

#[tokio::test]
async fn test_foreign_records_are_not_found_for_every_verb() {
    let app = TestApp::new();
    let (_, alice) = app.register("alice").await;
    let (_, bob) = app.register("bob").await;
    let interview = app.create_interview(&alice, "Acme").await;
    let task = app.create_task(&alice, "Initech").await;

    for uri in [
        format!("/interviews/{}", interview["id"].as_str().unwrap()),
        format!("/tasks/{}", task["id"].as_str().unwrap()),
    ] {
        let (status, _) = app.get(&uri, Some(&bob)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
        let (status, _) = app.put(&uri, Some(&bob), json!({ "position": "Hijacked" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "PUT {uri}");
        let (status, _) = app.delete(&uri, Some(&bob)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
    }

    // Nothing changed for the owner.
    let uri = format!("/interviews/{}", interview["id"].as_str().unwrap());
    let (_, fetched) = app.get(&uri, Some(&alice)).await;
    assert_eq!(fetched["position"], "SWE");
}

#[tokio::test]
async fn test_partial_interview_update_touches_only_given_fields() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;
    let created = app.create_interview(&token, "Acme").await;
    let uri = format!("/interviews/{}", created["id"].as_str().unwrap());

    let (status, updated) = app.put(&uri, Some(&token), json!({ "status": "selected" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "selected");
    for field in ["company_name", "position", "interview_date", "rating", "difficulty", "created_at"] {
        assert_eq!(updated[field], created[field], "{field} changed");
    }

    let (status, body) = app.put(&uri, Some(&token), json!({ "rating": 9 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "rating: Rating must be an integer between 1 and 5.");
}

#[tokio::test]
async fn test_interview_validation_reports_every_field() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;

    let (status, body) = app
        .post(
            "/interviews",
            Some(&token),
            json!({ "company": "Acme", "status": "ghosted", "interview_date": "01/02/2024" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("position: This field is required."), "{message}");
    assert!(message.contains("interview_date: Date has wrong format."), "{message}");
    assert!(message.contains("status: "), "{message}");

    let (_, listed) = app.get("/interviews", Some(&token)).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_currently_working_clears_end_date() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;

    let mut body = task_body("Initech");
    body["end_date"] = json!("2023-09-01");
    let (status, created) = app.post("/tasks", Some(&token), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["end_date"], "2023-09-01");

    let uri = format!("/tasks/{}", created["id"].as_str().unwrap());
    let (status, updated) = app.put(&uri, Some(&token), json!({ "currently_working": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["currently_working"], true);
    assert_eq!(updated["end_date"], serde_json::Value::Null);

    let mut body = task_body("Globex");
    body["currently_working"] = json!(true);
    body["end_date"] = json!("2024-01-01");
    let (_, created) = app.post("/tasks", Some(&token), body).await;
    assert_eq!(created["end_date"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_task_end_date_can_be_cleared() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;

    for cleared in [serde_json::Value::Null, json!("")] {
        let mut body = task_body("Initech");
        body["end_date"] = json!("2023-09-01");
        let (_, created) = app.post("/tasks", Some(&token), body).await;
        let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

        // Omitting the field keeps the stored date.
        let (_, updated) = app.put(&uri, Some(&token), json!({ "position": "Engineer" })).await;
        assert_eq!(updated["end_date"], "2023-09-01");

        let (status, updated) = app.put(&uri, Some(&token), json!({ "end_date": cleared.clone() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["end_date"], serde_json::Value::Null, "clearing with {cleared}");
        assert_eq!(updated["currently_working"], false);

        let (_, fetched) = app.get(&uri, Some(&token)).await;
        assert_eq!(fetched["end_date"], serde_json::Value::Null);
    }
}

#[tokio::test]
async fn test_task_end_date_before_stored_start_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;
    let created = app.create_task(&token, "Initech").await;
    let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

    let (status, body) = app.put(&uri, Some(&token), json!({ "end_date": "2023-01-01" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "end_date: End date cannot be before the start date.");

    let (_, fetched) = app.get(&uri, Some(&token)).await;
    assert_eq!(fetched["end_date"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_task_listing_orders_by_start_date() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;

    for (company, start) in [("Old", "2021-01-01"), ("New", "2024-01-01"), ("Mid", "2022-06-01")] {
        let mut body = task_body(company);
        body["start_date"] = json!(start);
        let (status, _) = app.post("/tasks", Some(&token), body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = app.get("/tasks", Some(&token)).await;
    let companies: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["company_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(companies, ["New", "Mid", "Old"]);
}

#[tokio::test]
async fn test_profile_read_and_partial_update() {
    let app = TestApp::new();
    let (id, token) = app.register("alice").await;

    let (status, profile) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user"]["id"], id.to_string());
    assert_eq!(profile["bio"], "");
    assert_eq!(profile["birth_date"], serde_json::Value::Null);

    let (status, body) = app
        .put(
            "/profile",
            Some(&token),
            json!({ "bio": "Backend dev", "birth_date": "1999-04-01", "location": "Dublin" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["profile"]["bio"], "Backend dev");
    assert_eq!(body["profile"]["birth_date"], "1999-04-01");

    let (_, body) = app.put("/profile", Some(&token), json!({ "birth_date": "" })).await;
    assert_eq!(body["profile"]["birth_date"], serde_json::Value::Null);
    assert_eq!(body["profile"]["bio"], "Backend dev");
    assert_eq!(body["profile"]["location"], "Dublin");

    let (status, body) = app.put("/profile", Some(&token), json!({ "avatar": "not a url" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "avatar: Enter a valid URL.");
}

#[tokio::test]
async fn test_public_user_detail_never_leaks_credentials() {
    let app = TestApp::new();
    let (id, token) = app.register("alice").await;
    app.create_interview(&token, "Acme").await;
    app.create_task(&token, "Initech").await;
    app.put("/profile", Some(&token), json!({ "bio": "Backend dev", "location": "Dublin" }))
        .await;

    let (status, detail) = app.get(&format!("/public/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let raw = detail.to_string();
    assert!(!raw.contains("password"), "{raw}");
    assert!(!raw.contains(&token), "{raw}");
    assert!(detail["user"].get("is_staff").is_none());

    assert_eq!(detail["interview_experiences"].as_array().unwrap().len(), 1);
    assert_eq!(detail["task_experiences"].as_array().unwrap().len(), 1);
    // bio and location out of six facets.
    assert_eq!(detail["completeness"], 33);
    assert_eq!(detail["badges"], json!(["first_interview", "builder"]));
}

#[tokio::test]
async fn test_public_user_detail_hides_missing_and_inactive_accounts() {
    let app = TestApp::new();
    let (id, _) = app.register("alice").await;
    app.state.repo.set_account_active(id, false).await.unwrap();

    let (status, body) = app.get(&format!("/public/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found.");

    let (status, _) = app.get(&format!("/public/users/{}", uuid::Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_listings_skip_inactive_owners() {
    let app = TestApp::new();
    let (alice, alice_token) = app.register("alice").await;
    let (_, bob_token) = app.register("bob").await;
    app.create_interview(&alice_token, "Acme").await;
    app.create_task(&alice_token, "Initech").await;
    app.create_interview(&bob_token, "Globex").await;

    let (_, interviews) = app.get("/public/interviews", None).await;
    assert_eq!(interviews.as_array().unwrap().len(), 2);

    app.state.repo.set_account_active(alice, false).await.unwrap();

    let (status, interviews) = app.get("/public/interviews", None).await;
    assert_eq!(status, StatusCode::OK);
    let interviews = interviews.as_array().unwrap();
    assert_eq!(interviews.len(), 1);
    assert_eq!(interviews[0]["company_name"], "Globex");

    let (status, tasks) = app.get("/public/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(tasks.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unparseable_ids_are_not_found() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;

    for uri in ["/interviews/42", "/tasks/not-a-uuid"] {
        let (status, body) = app.get(uri, Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "Not found.");
    }
    let (status, _) = app.get("/public/users/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_on_create_is_bad_request() {
    let app = TestApp::new();
    let (_, token) = app.register("alice").await;

    let (status, body) = app
        .send(Method::POST, "/tasks", Some(&token), Some(json!({ "rounds": "three", "currently_working": "yes" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("body: "));
}
