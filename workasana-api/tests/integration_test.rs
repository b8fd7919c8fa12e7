/// End-to-end tests for the Workasana API
///
/// These run the full router against a real database:
/// - signup and login
/// - project, team, tag and task creation
/// - name-based task queries
/// - closed-task and pending-work reports
/// - ownership checks and the project cascade
///
/// Requires `DATABASE_URL`; run with `cargo test -- --ignored`.

mod common;

use axum::http::StatusCode;
use common::{get, send_body, unique, TestContext};
use serde_json::{json, Value};

/// Signs up a fresh user and returns `(user, token)`
async fn signup(ctx: &TestContext, name: &str) -> (Value, String) {
    let (status, body) = ctx
        .send_json(send_body(
            "POST",
            "/v1/users/signup",
            None,
            json!({
                "name": name,
                "email": format!("{}@example.com", unique(name)),
                "password": "correct-horse-battery",
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let token = body["token"].as_str().unwrap().to_string();
    (body["user"].clone(), token)
}

async fn create(ctx: &TestContext, uri: &str, token: &str, body: Value) -> Value {
    let (status, body) = ctx.send_json(send_body("POST", uri, Some(token), body)).await;
    assert!(status.is_success(), "POST {} -> {}: {}", uri, status, body);
    body
}

#[tokio::test]
#[ignore]
async fn test_signup_login_and_me() {
    let ctx = TestContext::connected().await.unwrap();
    let email = format!("{}@example.com", unique("ada"));

    let (status, body) = ctx
        .send_json(send_body(
            "POST",
            "/v1/users/signup",
            None,
            json!({ "name": "Ada", "email": email, "password": "analytical-engine" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user"].get("password_hash").is_none());

    let (status, _) = ctx
        .send_json(send_body(
            "POST",
            "/v1/users/signup",
            None,
            json!({ "name": "Ada", "email": email, "password": "analytical-engine" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .send_json(send_body(
            "POST",
            "/v1/users/login",
            None,
            json!({ "email": email, "password": "wrong-password" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx
        .send_json(send_body(
            "POST",
            "/v1/users/login",
            None,
            json!({ "email": email, "password": "analytical-engine" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["refresh_token"].is_string());

    let token = body["token"].as_str().unwrap();
    let (status, me) = ctx.send_json(get("/v1/users/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], email.as_str());
    assert_eq!(me["tasks"], json!([]));
}

#[tokio::test]
#[ignore]
async fn test_task_lifecycle_with_queries_and_reports() {
    let ctx = TestContext::connected().await.unwrap();
    let (ada, ada_token) = signup(&ctx, "ada").await;
    let (grace, grace_token) = signup(&ctx, "grace").await;

    let project_name = unique("launch");
    let project = create(&ctx, "/v1/projects", &ada_token, json!({ "name": project_name })).await;
    let project_id = project["project"]["id"].clone();
    assert_eq!(project["project"]["created_by"]["id"], ada["id"]);

    let team_name = unique("platform");
    let team = create(
        &ctx,
        "/v1/teams",
        &ada_token,
        json!({ "name": team_name, "members": [grace["id"], ada["id"]] }),
    )
    .await;
    let team_id = team["team"]["id"].clone();
    let members: Vec<&Value> = team["team"]["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| &m["id"])
        .collect();
    assert_eq!(members, vec![&ada["id"], &grace["id"]]);

    let tag_name = unique("urgent");
    let tag = create(&ctx, "/v1/tags", &ada_token, json!({ "name": tag_name })).await;
    let again = create(&ctx, "/v1/tags", &grace_token, json!({ "name": tag_name })).await;
    assert_eq!(tag["tag"]["id"], again["tag"]["id"]);

    let shared = create(
        &ctx,
        "/v1/tasks",
        &ada_token,
        json!({
            "name": "Write copy",
            "project": project_id,
            "team": team_id,
            "owners": [grace["id"]],
            "tags": [tag["tag"]["id"]],
            "time_to_complete": 3,
            "status": "Closed",
        }),
    )
    .await;
    assert_eq!(shared["task"]["owners"][0]["id"], ada["id"]);
    assert_eq!(shared["task"]["owners"][1]["id"], grace["id"]);
    assert_eq!(shared["task"]["project"]["name"], project_name.as_str());

    create(
        &ctx,
        "/v1/tasks",
        &ada_token,
        json!({
            "name": "Book venue",
            "project": project_id,
            "team": team_id,
            "time_to_complete": 5,
            "status": "Closed",
        }),
    )
    .await;

    // Query by team and tag
    let uri = format!("/v1/tasks?team={}&tags={}", team_name, tag_name);
    let (status, body) = ctx.send_json(get(&uri, Some(&ada_token))).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Write copy"]);

    // Unknown team
    let uri = format!("/v1/tasks?team={}", unique("missing"));
    let (status, _) = ctx.send_json(get(&uri, Some(&ada_token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Closed report by team counts both tasks
    let (status, body) = ctx
        .send_json(get("/v1/report/closed?groupBy=team", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["success"], true);
    let row = body["report"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["group"] == team_id)
        .cloned()
        .unwrap();
    assert_eq!(row["taskCount"], 2);
    assert_eq!(row["groupName"], team_name.as_str());
    assert_eq!(row["groupByField"], "team");

    // Only owners may update
    let task_id = shared["task"]["id"].as_str().unwrap();
    let (_, outsider_token) = signup(&ctx, "outsider").await;
    let (status, _) = ctx
        .send_json(send_body(
            "PUT",
            &format!("/v1/tasks/{}", task_id),
            Some(&outsider_token),
            json!({ "status": "Blocked" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send_json(send_body(
            "PUT",
            &format!("/v1/tasks/{}", task_id),
            Some(&grace_token),
            json!({ "status": "Blocked" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "Blocked");

    // Pending work is a number
    let (status, body) = ctx.send_json(get("/v1/report/pending", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["report"]["data"].as_i64().unwrap() >= 3);

    // Tags by project
    let uri = format!("/v1/projects/{}/tags", project_id.as_str().unwrap());
    let (status, body) = ctx.send_json(get(&uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], tag_name.as_str());

    // Only the creator may delete the project; delete cascades
    let uri = format!("/v1/projects/{}", project_id.as_str().unwrap());
    let delete = |token: &str| {
        axum::http::Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header("authorization", common::bearer(token))
            .body(axum::body::Body::empty())
            .unwrap()
    };

    let (status, _) = ctx.send_json(delete(&grace_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.send_json(delete(&ada_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_task_ids"].as_array().unwrap().len(), 2);

    let (_, me) = ctx.send_json(get("/v1/users/me", Some(&ada_token))).await;
    assert_eq!(me["tasks"], json!([]));
    assert_eq!(me["projects"], json!([]));

    let (status, _) = ctx.send_json(get("/v1/projects/mine", Some(&ada_token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
