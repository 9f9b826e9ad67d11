use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support::{self, TestContext};

async fn admin_token(ctx: &TestContext) -> String {
    let admin =
        test_support::insert_admin(ctx.state.db(), "results-admin", "Results", "pass-123").await;
    test_support::bearer_token(&admin.id, ctx.state.settings())
}

async fn call(
    ctx: &TestContext,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(method, uri, token, body))
        .await
        .expect("response");
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return (status, serde_json::Value::Null);
    }
    (status, test_support::read_json(response).await)
}

#[tokio::test]
async fn entering_counts_produces_band_score() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;
    let examinee = test_support::insert_examinee(ctx.state.db(), "Aziz", "Karimov", "B").await;

    let (status, body) = call(
        &ctx,
        Method::POST,
        "/api/v1/test-results",
        Some(&token),
        Some(json!({
            "user_id": examinee.id,
            "reading_correct_answers": 30,
            "listening_correct_answers": 26,
            "speaking_score": "6.5",
            "writing_score": "6.0"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["band_score"]["reading_band"], "7.0");
    assert_eq!(body["band_score"]["listening_band"], "6.5");
    assert_eq!(body["band_score"]["speaking_band"], "6.5");
    assert_eq!(body["band_score"]["writing_band"], "6.0");
    assert_eq!(body["band_score"]["overall_band"], "6.5");
}

#[tokio::test]
async fn top_counts_and_low_counts_hit_band_edges() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;
    let examinee = test_support::insert_examinee(ctx.state.db(), "Aziz", "Karimov", "B").await;

    let (status, body) = call(
        &ctx,
        Method::POST,
        "/api/v1/test-results",
        Some(&token),
        Some(json!({
            "user_id": examinee.id,
            "reading_correct_answers": 40,
            "listening_correct_answers": 9,
            "speaking_score": "7.0",
            "writing_score": "7.0"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["band_score"]["reading_band"], "9.0");
    assert_eq!(body["band_score"]["listening_band"], "3.5");
    // (9.0 + 3.5 + 7.0 + 7.0) / 4 = 6.625
    assert_eq!(body["band_score"]["overall_band"], "6.5");
}

#[tokio::test]
async fn out_of_range_counts_are_rejected() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;
    let examinee = test_support::insert_examinee(ctx.state.db(), "Aziz", "Karimov", "B").await;

    for (reading, speaking) in [(-1, "6.0"), (41, "6.0"), (20, "9.5"), (20, "6.25")] {
        let (status, body) = call(
            &ctx,
            Method::POST,
            "/api/v1/test-results",
            Some(&token),
            Some(json!({
                "user_id": examinee.id,
                "reading_correct_answers": reading,
                "listening_correct_answers": 20,
                "speaking_score": speaking,
                "writing_score": "6.0"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "reading={reading} speaking={speaking}: {body}");
    }

    let (status, body) = call(
        &ctx,
        Method::POST,
        "/api/v1/test-results",
        Some(&token),
        Some(json!({"user_id": "missing-user", "reading_correct_answers": 20})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Examinee not found");
}

#[tokio::test]
async fn correcting_counts_recomputes_bands_identically() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;
    let examinee = test_support::insert_examinee(ctx.state.db(), "Aziz", "Karimov", "B").await;

    let (_, created) = call(
        &ctx,
        Method::POST,
        "/api/v1/test-results",
        Some(&token),
        Some(json!({
            "user_id": examinee.id,
            "reading_correct_answers": 10,
            "listening_correct_answers": 10,
            "speaking_score": "5.0",
            "writing_score": "5.0"
        })),
    )
    .await;
    let result_id = created["id"].as_str().expect("result id").to_string();
    assert_eq!(created["band_score"]["overall_band"], "4.5");

    let uri = format!("/api/v1/test-results/{result_id}");
    let (status, updated) =
        call(&ctx, Method::PATCH, &uri, Some(&token), Some(json!({"listening_correct_answers": 35})))
            .await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["listening_correct_answers"], 35);
    assert_eq!(updated["band_score"]["listening_band"], "8.0");
    // (4.0 + 8.0 + 5.0 + 5.0) / 4 = 5.5
    assert_eq!(updated["band_score"]["overall_band"], "5.5");

    let (_, again) = call(&ctx, Method::PATCH, &uri, Some(&token), Some(json!({}))).await;
    for field in ["reading_band", "listening_band", "speaking_band", "writing_band", "overall_band"]
    {
        assert_eq!(again["band_score"][field], updated["band_score"][field], "{field}");
    }

    let (status, fetched) = call(&ctx, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["band_score"]["overall_band"], "5.5");

    let (status, _) = call(&ctx, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&ctx, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn examinee_finds_own_results_by_full_name() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;
    let examinee =
        test_support::insert_examinee(ctx.state.db(), "Malika", "Yusupova", "Rustamovna").await;

    for reading in [20, 33] {
        let (status, _) = call(
            &ctx,
            Method::POST,
            "/api/v1/test-results",
            Some(&token),
            Some(json!({
                "user_id": examinee.id,
                "reading_correct_answers": reading,
                "listening_correct_answers": 20,
                "speaking_score": "6.0",
                "writing_score": "6.0"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(
        &ctx,
        Method::POST,
        "/api/v1/test-results/by-user-info",
        None,
        Some(json!({"name": "Malika", "last_name": "Yusupova", "middle_name": "Rustamovna"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["user"]["id"], examinee.id);
    assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
    assert!(body["results"][0]["band_score"]["overall_band"].is_string());

    let (status, _) = call(
        &ctx,
        Method::POST,
        "/api/v1/test-results/by-user-info",
        None,
        Some(json!({"name": "Malika", "last_name": "Yusupova", "middle_name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &ctx,
        Method::POST,
        "/api/v1/test-results/by-user-info",
        None,
        Some(json!({"name": "Malika", "last_name": "Other", "middle_name": "Rustamovna"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_results_requires_admin() {
    let ctx = test_support::setup_test_context().await;

    let (status, _) = call(&ctx, Method::GET, "/api/v1/test-results", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
