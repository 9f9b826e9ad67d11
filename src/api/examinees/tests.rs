use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn admin_can_register_update_and_search_examinees() {
    let ctx = test_support::setup_test_context().await;
    let admin =
        test_support::insert_admin(ctx.state.db(), "registrar", "Registrar", "pass-123").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/users",
            Some(&token),
            Some(json!({
                "name": " Dilnoza ",
                "last_name": "Rahimova",
                "middle_name": "Anvarovna",
                "phone": "+998901234567"
            })),
        ))
        .await
        .expect("create examinee");
    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["name"], "Dilnoza");
    let user_id = created["id"].as_str().expect("user id").to_string();

    test_support::insert_examinee(ctx.state.db(), "Jasur", "Tursunov", "Olimovich").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/users/{user_id}"),
            Some(&token),
            Some(json!({"phone": "+998907654321"})),
        ))
        .await
        .expect("update examinee");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = test_support::read_json(response).await;
    assert_eq!(updated["phone"], "+998907654321");
    assert_eq!(updated["last_name"], "Rahimova");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users?search=rahim",
            Some(&token),
            None,
        ))
        .await
        .expect("search examinees");
    assert_eq!(response.status(), StatusCode::OK);
    let page = test_support::read_json(response).await;
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["items"][0]["id"], user_id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/users", Some(&token), None))
        .await
        .expect("list examinees");
    let page = test_support::read_json(response).await;
    assert_eq!(page["total_count"], 2);
}

#[tokio::test]
async fn invalid_examinee_payload_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let admin =
        test_support::insert_admin(ctx.state.db(), "registrar", "Registrar", "pass-123").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/users",
            Some(&token),
            Some(json!({"name": "", "last_name": "X", "phone": "+1"})),
        ))
        .await
        .expect("create examinee");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_examinee_removes_their_results() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();
    let admin = test_support::insert_admin(pool, "registrar", "Registrar", "pass-123").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let examinee = test_support::insert_examinee(pool, "Aziz", "Karimov", "B").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/test-results",
            Some(&token),
            Some(json!({
                "user_id": examinee.id,
                "reading_correct_answers": 20,
                "listening_correct_answers": 20,
                "speaking_score": "6.0",
                "writing_score": "6.0"
            })),
        ))
        .await
        .expect("create result");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/users/{}", examinee.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete examinee");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let results: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM test_results")
        .fetch_one(pool)
        .await
        .expect("count results");
    let bands: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM band_scores")
        .fetch_one(pool)
        .await
        .expect("count bands");
    assert_eq!((results, bands), (0, 0));
}
