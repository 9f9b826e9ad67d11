use axum::http::{Method, StatusCode};
use serde_json::json;
use time::Duration;
use tower::ServiceExt;

use crate::core::time::format_date;
use crate::test_support::{self, TestContext};

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
    (status, test_support::read_json(response).await)
}

struct Fixture {
    token: String,
    reading_id: String,
    listening_id: String,
}

/// Reading and listening content with answers, plus an admin token.
async fn seed_content(ctx: &TestContext) -> Fixture {
    let admin =
        test_support::insert_admin(ctx.state.db(), "delivery-admin", "Delivery", "pass-123").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let (status, reading) = call(
        ctx,
        Method::POST,
        "/api/v1/content/reading",
        Some(&token),
        Some(json!({
            "title": "Reading",
            "passages": [
                {
                    "order": 1,
                    "title": "Bees",
                    "text": "Bees communicate by dancing.",
                    "questions": [{
                        "question_number": 1,
                        "question_type": "short_answer",
                        "question_text": "How do bees communicate?",
                        "correct_answer": "dancing",
                        "table": {
                            "columns": ["Signal", "Meaning"],
                            "rows": [["waggle", "[[1]]"]],
                            "answers": [{"number": 1, "correct_answer": "direction"}]
                        }
                    }]
                },
                {"order": 2, "title": "Ants", "text": "Ants follow trails.", "questions": []}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {reading}");

    let (status, listening) = call(
        ctx,
        Method::POST,
        "/api/v1/content/listening",
        Some(&token),
        Some(json!({
            "title": "Listening",
            "sections": [{
                "section_number": 1,
                "start_time": 0,
                "end_time": 300,
                "audio_file": "audio/s1.mp3",
                "questions": [{
                    "question_number": 1,
                    "question_type": "form_completion",
                    "question_text": "Name of the caller",
                    "correct_answer": "Smith"
                }]
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {listening}");

    Fixture {
        token,
        reading_id: reading["id"].as_str().expect("reading id").to_string(),
        listening_id: listening["id"].as_str().expect("listening id").to_string(),
    }
}

async fn create_mock(
    ctx: &TestContext,
    fixture: &Fixture,
    number: i32,
    status: &str,
    exam_date: time::Date,
) -> String {
    let (code, mock) = call(
        ctx,
        Method::POST,
        "/api/v1/mock",
        Some(&fixture.token),
        Some(json!({
            "title": format!("Mock {number}"),
            "number": number,
            "status": status,
            "exam_date": format_date(exam_date),
        })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "response: {mock}");
    let mock_id = mock["id"].as_str().expect("mock id").to_string();

    let (code, body) = call(
        ctx,
        Method::PUT,
        &format!("/api/v1/mock/{mock_id}/content"),
        Some(&fixture.token),
        Some(json!({
            "reading_tests": [fixture.reading_id],
            "listening_tests": [fixture.listening_id],
        })),
    )
    .await;
    assert_eq!(code, StatusCode::OK, "response: {body}");
    mock_id
}

#[tokio::test]
async fn nothing_is_served_without_an_active_mock_today() {
    let ctx = test_support::setup_test_context().await;
    let fixture = seed_content(&ctx).await;
    let tomorrow = ctx.state.exam_today() + Duration::days(1);
    create_mock(&ctx, &fixture, 1, "active", tomorrow).await;

    let (status, body) = call(&ctx, Method::GET, "/api/v1/mocks/today", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No exam is available today");

    let (status, _) = call(&ctx, Method::GET, "/api/v1/mocks/reading", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/mocks/reading/{}/passages", fixture.reading_id);
    let (status, _) = call(&ctx, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pending_mock_today_is_not_served() {
    let ctx = test_support::setup_test_context().await;
    let fixture = seed_content(&ctx).await;
    create_mock(&ctx, &fixture, 1, "pending", ctx.state.exam_today()).await;

    let (status, _) = call(&ctx, Method::GET, "/api/v1/mocks/today", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn todays_mock_serves_content_without_answers() {
    let ctx = test_support::setup_test_context().await;
    let fixture = seed_content(&ctx).await;
    let mock_id = create_mock(&ctx, &fixture, 1, "active", ctx.state.exam_today()).await;

    let (status, today) = call(&ctx, Method::GET, "/api/v1/mocks/today", None, None).await;
    assert_eq!(status, StatusCode::OK, "response: {today}");
    assert_eq!(today["id"], mock_id);
    assert_eq!(today["reading_tests"], json!([fixture.reading_id]));

    let (status, reading) = call(&ctx, Method::GET, "/api/v1/mocks/reading", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let question = &reading[0]["passages"][0]["questions"][0];
    assert_eq!(question["question_text"], "How do bees communicate?");
    assert!(question.get("correct_answer").is_none(), "answer leaked: {question}");
    assert!(question["table"].get("answers").is_none(), "table answers leaked: {question}");
    assert_eq!(question["table"]["rows"][0]["row_data"], json!(["waggle", "[[1]]"]));

    let uri = format!("/api/v1/mocks/reading/{}/passage/2", fixture.reading_id);
    let (status, passage) = call(&ctx, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(passage["title"], "Ants");

    let uri = format!("/api/v1/mocks/reading/{}/passages", fixture.reading_id);
    let (status, passages) = call(&ctx, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(passages.as_array().map(Vec::len), Some(2));

    let uri = format!("/api/v1/mocks/listening/{}/section/1", fixture.listening_id);
    let (status, section) = call(&ctx, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(section["audio_file"], "audio/s1.mp3");
    assert_eq!(section["end_time"], 300);
    assert!(section["questions"][0].get("correct_answer").is_none());

    let (status, speaking) = call(&ctx, Method::GET, "/api/v1/mocks/speaking", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(speaking, json!([]));
}

#[tokio::test]
async fn unlinked_test_is_not_served() {
    let ctx = test_support::setup_test_context().await;
    let fixture = seed_content(&ctx).await;
    create_mock(&ctx, &fixture, 1, "active", ctx.state.exam_today()).await;

    let (status, other) = call(
        &ctx,
        Method::POST,
        "/api/v1/content/reading",
        Some(&fixture.token),
        Some(json!({
            "title": "Unlinked",
            "passages": [{"order": 1, "title": "Hidden", "text": "Not today.", "questions": []}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let other_id = other["id"].as_str().expect("id");

    let uri = format!("/api/v1/mocks/reading/{other_id}/passage/1");
    let (status, _) = call(&ctx, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/mocks/reading/{}/passage/9", fixture.reading_id);
    let (status, _) = call(&ctx, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
