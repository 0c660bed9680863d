use serde_json::{Value, json};

use bloodlink_db::models::BloodGroup;

use crate::fixtures::seed::{days_from_today, request_body};
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn create_request_happy_path() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;

    let id = app
        .create_request(&creator, request_body("A+", days_from_today(3)))
        .await;

    let res = app.auth_get(&creator.token, &format!("/api/requests/{id}")).await;
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    let result = &body["result"];
    assert_eq!(result["patient_name"], "Rahim Uddin");
    assert_eq!(result["blood_group"], "A+");
    assert_eq!(result["status"], "pending");
    assert_eq!(result["unit"], 2);
    assert!(result["donor"].is_null());
    assert_eq!(result["created_by"]["name"], "Karim");

    app.drop_db().await;
}

#[tokio::test]
async fn validation_reports_every_violation_at_once() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;

    let res = app
        .auth_post(&creator.token, "/api/requests", &json!({}))
        .await;
    assert_eq!(res.status(), 422);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation");
    let details = body["details"].as_array().unwrap();
    let messages: Vec<&str> = details.iter().filter_map(|d| d.as_str()).collect();
    assert!(messages.contains(&"Valid patient name is required"));
    assert!(messages.contains(&"Blood group is required"));
    assert!(messages.contains(&"Valid contact number is required"));
    assert!(messages.contains(&"Donation date is required"));
    assert!(messages.contains(&"Address is required"));

    app.drop_db().await;
}

#[tokio::test]
async fn unknown_blood_group_is_a_validation_error() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;

    let res = app
        .auth_post(
            &creator.token,
            "/api/requests",
            &request_body("C+", days_from_today(3)),
        )
        .await;
    assert_eq!(res.status(), 422);

    app.drop_db().await;
}

#[tokio::test]
async fn incomplete_profile_cannot_create() {
    let app = TestApp::spawn().await;
    let creator = app.seed_incomplete_user().await;

    let res = app
        .auth_post(
            &creator.token,
            "/api/requests",
            &request_body("O+", days_from_today(3)),
        )
        .await;
    assert_eq!(res.status(), 403);

    app.drop_db().await;
}

#[tokio::test]
async fn second_request_within_a_day_is_rejected() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;

    app.create_request(&creator, request_body("A+", days_from_today(3)))
        .await;

    let res = app
        .auth_post(
            &creator.token,
            "/api/requests",
            &request_body("A+", days_from_today(4)),
        )
        .await;
    assert_eq!(res.status(), 429);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("hour"));

    app.drop_db().await;
}

#[tokio::test]
async fn creation_allowed_once_a_day_has_passed() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;

    let first = app
        .create_request(&creator, request_body("A+", days_from_today(3)))
        .await;
    app.backdate_request(&first, 25).await;

    let res = app
        .auth_post(
            &creator.token,
            "/api/requests",
            &request_body("A+", days_from_today(4)),
        )
        .await;
    assert_eq!(res.status(), 201);

    app.drop_db().await;
}

#[tokio::test]
async fn create_requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .post(app.url("/api/requests"))
        .json(&request_body("A+", days_from_today(3)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    app.drop_db().await;
}
