use serde_json::Value;

use bloodlink_db::models::BloodGroup;

use crate::fixtures::seed::{SeededUser, days_from_today, request_body};
use crate::fixtures::test_app::TestApp;

async fn booked_request(app: &TestApp) -> (SeededUser, SeededUser, String) {
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;
    let donor = app.seed_user("Fatima", BloodGroup::APositive).await;

    let id = app
        .create_request(&creator, request_body("A+", days_from_today(3)))
        .await;
    let res = app
        .auth_post(
            &donor.token,
            &format!("/api/requests/{id}/book"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 200);

    (creator, donor, id)
}

#[tokio::test]
async fn owner_completes_and_donor_count_increments_once() {
    let app = TestApp::spawn().await;
    let (creator, donor, id) = booked_request(&app).await;

    let res = app
        .auth_post(
            &creator.token,
            &format!("/api/requests/{id}/complete"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 200);

    let res = app.auth_get(&creator.token, &format!("/api/requests/{id}")).await;
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["result"]["status"], "completed");

    let profile = app.load_profile(donor.id).await;
    assert_eq!(profile.donated_count, 1);

    app.drop_db().await;
}

#[tokio::test]
async fn completing_twice_is_a_conflict() {
    let app = TestApp::spawn().await;
    let (creator, donor, id) = booked_request(&app).await;

    let path = format!("/api/requests/{id}/complete");
    let res = app.auth_post(&creator.token, &path, &Value::Null).await;
    assert_eq!(res.status(), 200);

    let res = app.auth_post(&creator.token, &path, &Value::Null).await;
    assert_eq!(res.status(), 409);

    // No double counting
    let profile = app.load_profile(donor.id).await;
    assert_eq!(profile.donated_count, 1);

    app.drop_db().await;
}

#[tokio::test]
async fn only_the_owner_can_complete() {
    let app = TestApp::spawn().await;
    let (_creator, donor, id) = booked_request(&app).await;

    let res = app
        .auth_post(
            &donor.token,
            &format!("/api/requests/{id}/complete"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 403);

    app.drop_db().await;
}

#[tokio::test]
async fn completing_an_unbooked_request_is_a_conflict() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;

    let id = app
        .create_request(&creator, request_body("A+", days_from_today(3)))
        .await;

    let res = app
        .auth_post(
            &creator.token,
            &format!("/api/requests/{id}/complete"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 409);

    app.drop_db().await;
}
