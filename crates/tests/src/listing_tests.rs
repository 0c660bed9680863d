use serde_json::Value;

use bloodlink_db::models::BloodGroup;

use crate::fixtures::seed::{days_from_today, request_body};
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn listing_is_public() {
    let app = TestApp::spawn().await;
    let creator = app.seed_user("Karim", BloodGroup::APositive).await;
    app.create_request(&creator, request_body("A+", days_from_today(3)))
        .await;

    let res = app
        .client
        .get(app.url("/api/requests"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["result"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total_items"], 1);

    app.drop_db().await;
}

#[tokio::test]
async fn listing_filters_by_blood_group_and_city() {
    let app = TestApp::spawn().await;
    let a = app.seed_user("Karim", BloodGroup::APositive).await;
    let b = app.seed_user("Jamal", BloodGroup::ONegative).await;

    app.create_request(&a, request_body("A+", days_from_today(3)))
        .await;
    let mut body = request_body("O-", days_from_today(3));
    body["address"]["city"] = Value::String("Chittagong".to_string());
    app.create_request(&b, body).await;

    let res = app
        .client
        .get(app.url("/api/requests"))
        .query(&[("blood_group", "O-")])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let items = body["result"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["blood_group"], "O-");

    // City matching is case-insensitive via lowercase normalization
    let res = app
        .client
        .get(app.url("/api/requests"))
        .query(&[("city", "CHITTAGONG")])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let items = body["result"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["city"], "chittagong");

    app.drop_db().await;
}

#[tokio::test]
async fn listing_excludes_booked_and_past_requests() {
    let app = TestApp::spawn().await;
    let a = app.seed_user("Karim", BloodGroup::APositive).await;
    let b = app.seed_user("Jamal", BloodGroup::APositive).await;
    let c = app.seed_user("Rina", BloodGroup::APositive).await;
    let donor = app.seed_user("Fatima", BloodGroup::APositive).await;

    let open = app
        .create_request(&a, request_body("A+", days_from_today(3)))
        .await;
    let booked = app
        .create_request(&b, request_body("A+", days_from_today(3)))
        .await;
    app.create_request(&c, request_body("A+", days_from_today(-1)))
        .await;

    let res = app
        .auth_post(
            &donor.token,
            &format!("/api/requests/{booked}/book"),
            &Value::Null,
        )
        .await;
    assert_eq!(res.status(), 200);

    let res = app
        .client
        .get(app.url("/api/requests"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let items = body["result"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], Value::String(open.clone()));

    app.drop_db().await;
}

#[tokio::test]
async fn pagination_links_mark_the_edges() {
    let app = TestApp::spawn().await;
    for name in ["Karim", "Jamal", "Rina"] {
        let user = app.seed_user(name, BloodGroup::APositive).await;
        app.create_request(&user, request_body("A+", days_from_today(3)))
            .await;
    }

    let res = app
        .client
        .get(app.url("/api/requests"))
        .query(&[("page", "1"), ("limit", "2")])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["result"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["pagination"]["total_items"], 3);
    assert!(body["links"]["prev"].is_null());
    assert!(body["links"]["next"].as_str().unwrap().contains("page=2"));
    assert!(body["links"]["first"].as_str().is_some());
    assert!(body["links"]["last"].as_str().unwrap().contains("page=2"));

    let res = app
        .client
        .get(app.url("/api/requests"))
        .query(&[("page", "2"), ("limit", "2")])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["result"].as_array().unwrap().len(), 1);
    assert!(body["links"]["next"].is_null());
    assert!(body["links"]["prev"].as_str().unwrap().contains("page=1"));

    app.drop_db().await;
}

#[tokio::test]
async fn empty_listing_says_so() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .get(app.url("/api/requests"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "No blood requests found");
    assert_eq!(body["result"].as_array().unwrap().len(), 0);

    app.drop_db().await;
}

#[tokio::test]
async fn invalid_blood_group_filter_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .get(app.url("/api/requests"))
        .query(&[("blood_group", "X+")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    app.drop_db().await;
}
