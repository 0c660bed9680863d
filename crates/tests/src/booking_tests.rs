use serde_json::Value;

use bloodlink_db::models::BloodGroup;

use crate::fixtures::seed::{days_from_today, request_body};
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn booking_happy_path_records_donor_snapshot() {
    let app = TestApp::spawn().await;
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

    let res = app.auth_get(&creator.token, &format!("/api/requests/{id}")).await;
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["result"]["status"], "booked");
    assert_eq!(body["result"]["donor"]["name"], "Fatima");
    assert_eq!(body["result"]["donor"]["blood_group"], "A+");

    // The booking is tracked on the donor's profile too
    let profile = app.load_profile(donor.id).await;
    assert_eq!(profile.bookings.len(), 1);

    app.drop_db().await;
}

#[tokio::test]
async fn creator_cannot_book_own_request() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;

    let id = app
        .create_request(&creator, request_body("A+", days_from_today(3)))
        .await;

    let res = app
        .auth_post(
            &creator.token,
            &format!("/api/requests/{id}/book"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 403);

    app.drop_db().await;
}

#[tokio::test]
async fn already_booked_request_rejects_second_donor() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::BPositive).await;
    let first = app.seed_user("Fatima", BloodGroup::BPositive).await;
    let second = app.seed_user("Nasrin", BloodGroup::BPositive).await;

    let id = app
        .create_request(&creator, request_body("B+", days_from_today(3)))
        .await;

    let res = app
        .auth_post(
            &first.token,
            &format!("/api/requests/{id}/book"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 200);

    let res = app
        .auth_post(
            &second.token,
            &format!("/api/requests/{id}/book"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 409);

    app.drop_db().await;
}

#[tokio::test]
async fn concurrent_bookings_produce_exactly_one_winner() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::ONegative).await;
    let first = app.seed_user("Fatima", BloodGroup::ONegative).await;
    let second = app.seed_user("Nasrin", BloodGroup::ONegative).await;

    let id = app
        .create_request(&creator, request_body("O-", days_from_today(3)))
        .await;

    let path = format!("/api/requests/{id}/book");
    let (a, b) = tokio::join!(
        app.auth_post(&first.token, &path, &Value::Null),
        app.auth_post(&second.token, &path, &Value::Null),
    );

    let mut statuses = [a.status().as_u16(), b.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, [200, 409]);

    app.drop_db().await;
}

#[tokio::test]
async fn donor_within_cooldown_is_rejected() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;
    let donor = app
        .seed_user_with("Fatima", BloodGroup::APositive, |p| {
            p.last_donation_date = Some(days_from_today(-30));
        })
        .await;

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
    assert_eq!(res.status(), 429);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("day"));

    app.drop_db().await;
}

#[tokio::test]
async fn donor_past_cooldown_can_book() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;
    let donor = app
        .seed_user_with("Fatima", BloodGroup::APositive, |p| {
            p.last_donation_date = Some(days_from_today(-90));
        })
        .await;

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

    app.drop_db().await;
}

#[tokio::test]
async fn mismatched_blood_group_is_rejected() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;
    let donor = app.seed_user("Fatima", BloodGroup::BNegative).await;

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
    assert_eq!(res.status(), 403);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("mismatch"));

    app.drop_db().await;
}

#[tokio::test]
async fn donor_with_active_booking_cannot_book_another() {
    let app = TestApp::spawn().await;
    let creator_a = app.seed_user("Karim", BloodGroup::APositive).await;
    let creator_b = app.seed_user("Jamal", BloodGroup::APositive).await;
    let donor = app.seed_user("Fatima", BloodGroup::APositive).await;

    let first = app
        .create_request(&creator_a, request_body("A+", days_from_today(3)))
        .await;
    let second = app
        .create_request(&creator_b, request_body("A+", days_from_today(5)))
        .await;

    let res = app
        .auth_post(
            &donor.token,
            &format!("/api/requests/{first}/book"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 200);

    let res = app
        .auth_post(
            &donor.token,
            &format!("/api/requests/{second}/book"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 409);

    app.drop_db().await;
}

#[tokio::test]
async fn incomplete_donor_profile_cannot_book() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::OPositive).await;
    let donor = app.seed_incomplete_user().await;

    let id = app
        .create_request(&creator, request_body("O+", days_from_today(3)))
        .await;

    let res = app
        .auth_post(
            &donor.token,
            &format!("/api/requests/{id}/book"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 403);

    app.drop_db().await;
}

#[tokio::test]
async fn booking_unknown_request_is_not_found() {
    let app = TestApp::spawn().await;
    let donor = app.seed_user("Fatima", BloodGroup::APositive).await;

    let res = app
        .auth_post(
            &donor.token,
            "/api/requests/0123456789abcdef01234567/book",
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 404);

    app.drop_db().await;
}
