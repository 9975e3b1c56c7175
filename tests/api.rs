use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use quizbuilder_backend::config::AppConfig;
use quizbuilder_backend::grading::GradingPolicy;
use quizbuilder_backend::routes::build_router;
use quizbuilder_backend::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app_with(cfg: AppConfig) -> Router {
    build_router(Arc::new(AppState::from_config(cfg).await))
}

async fn app() -> Router {
    app_with(AppConfig { seed_sample: false, ..AppConfig::default() }).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn js_quiz() -> Value {
    json!({
        "title": "JavaScript Fundamentals",
        "questions": [
            { "type": "BOOLEAN", "text": "JavaScript is statically typed.", "correctAnswers": [false] },
            { "type": "INPUT", "text": "Variable keyword?", "correctAnswers": ["var", "let", "const"] },
            {
                "type": "CHECKBOX",
                "text": "Primitive types?",
                "options": ["String", "Number", "Boolean"],
                "correctAnswers": [true, true, false],
                "required": false
            }
        ]
    })
}

async fn create(app: &Router) -> Value {
    let (status, body) = send(app, "POST", "/api/v1/quizzes", Some(js_quiz())).await;
    assert_eq!(status, StatusCode::CREATED, "body {body}");
    body
}

fn ids(quiz: &Value) -> Vec<String> {
    quiz["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn crud_round_trip() {
    let app = app().await;
    let created = create(&app).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["questions"][0]["type"], "BOOLEAN");
    assert_eq!(created["questions"][0]["options"], Value::Null);
    assert_eq!(created["questions"][0]["required"], true);
    assert_eq!(created["questions"][2]["required"], false);
    assert_eq!(created["questions"][2]["correctAnswers"], json!([true, true, false]));

    let (status, list) = send(&app, "GET", "/api/v1/quizzes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["_count"]["questions"], 3);

    let (status, fetched) = send(&app, "GET", &format!("/api/v1/quizzes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["questions"], created["questions"]);

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/v1/quizzes/{id}"),
        Some(json!({ "title": "JS", "questions": [{ "type": "INPUT", "text": "Only one", "correctAnswers": ["x"] }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "JS");
    assert_eq!(updated["questions"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/quizzes/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/v1/quizzes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Quiz with ID {id} not found"));
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/api/v1/quizzes", Some(json!({ "title": "", "questions": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/quizzes",
        Some(json!({ "title": "T", "questions": [{ "type": "ESSAY", "text": "Why?" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", "/api/v1/quizzes/missing", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn grade_endpoint_scores_all_correct() {
    let app = app().await;
    let quiz = create(&app).await;
    let id = quiz["id"].as_str().unwrap();
    let q = ids(&quiz);

    let mut submitted = serde_json::Map::new();
    submitted.insert(q[0].clone(), json!(false));
    submitted.insert(q[1].clone(), json!("LET  "));
    submitted.insert(q[2].clone(), json!([true, true, false]));
    let answers = json!({ "answers": submitted });
    let (status, out) = send(&app, "POST", &format!("/api/v1/quizzes/{id}/grade"), Some(answers)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["correct"], 3);
    assert_eq!(out["total"], 3);
    assert_eq!(out["percentage"], 100);
    assert_eq!(out["message"], "Excellent work!");
    assert_eq!(out["verdicts"][1]["questionId"], q[1].as_str());
    assert_eq!(out["verdicts"][1]["correct"], true);
}

#[tokio::test]
async fn unanswered_false_boolean_depends_on_policy() {
    let lenient = app().await;
    let quiz = create(&lenient).await;
    let id = quiz["id"].as_str().unwrap();
    let (_, out) = send(&lenient, "POST", &format!("/api/v1/quizzes/{id}/grade"), Some(json!({}))).await;
    assert_eq!(out["correct"], 1);
    assert_eq!(out["percentage"], 33);

    let strict = app_with(AppConfig {
        seed_sample: false,
        grading: GradingPolicy { unanswered_is_incorrect: true },
        ..AppConfig::default()
    })
    .await;
    let quiz = create(&strict).await;
    let id = quiz["id"].as_str().unwrap();
    let (_, out) = send(&strict, "POST", &format!("/api/v1/quizzes/{id}/grade"), Some(json!({}))).await;
    assert_eq!(out["correct"], 0);
    assert_eq!(out["percentage"], 0);
}

#[tokio::test]
async fn session_flow_grades_on_submit_only() {
    let app = app().await;
    let quiz = create(&app).await;
    let quiz_id = quiz["id"].as_str().unwrap();
    let q = ids(&quiz);

    let (status, session) = send(&app, "POST", &format!("/api/v1/quizzes/{quiz_id}/sessions"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["phase"], "preview");
    let sid = session["id"].as_str().unwrap().to_string();
    let base = format!("/api/v1/sessions/{sid}");

    let (status, _) = send(&app, "POST", &format!("{base}/submit"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, s) = send(&app, "POST", &format!("{base}/start"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["phase"], "taking");

    let (status, _) = send(&app, "PUT", &format!("{base}/answers/{}", q[0]), Some(json!({ "answer": false }))).await;
    assert_eq!(status, StatusCode::OK);
    send(&app, "POST", &format!("{base}/next"), None).await;
    send(&app, "PUT", &format!("{base}/answers/{}", q[1]), Some(json!({ "answer": "function" }))).await;
    send(&app, "POST", &format!("{base}/next"), None).await;
    let (_, s) = send(&app, "PUT", &format!("{base}/answers/{}", q[2]), Some(json!({ "answer": [true, true, false] }))).await;
    assert_eq!(s["currentIndex"], 2);
    assert_eq!(s["result"], Value::Null);

    let (status, _) = send(&app, "PUT", &format!("{base}/answers/nope"), Some(json!({ "answer": true }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, s) = send(&app, "POST", &format!("{base}/submit"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["phase"], "completed");
    assert_eq!(s["result"]["correct"], 2);
    assert_eq!(s["result"]["total"], 3);
    assert_eq!(s["result"]["percentage"], 67);

    let (status, _) = send(&app, "POST", &format!("{base}/submit"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, s) = send(&app, "POST", &format!("{base}/retake"), None).await;
    assert_eq!(s["phase"], "preview");
    assert_eq!(s["answers"], json!({}));

    let (status, _) = send(&app, "DELETE", &base, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &base, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sample_quiz_is_seeded_by_default() {
    let app = app_with(AppConfig::default()).await;
    let (_, list) = send(&app, "GET", "/api/v1/quizzes", None).await;
    assert_eq!(list[0]["title"], "JavaScript Fundamentals");
    assert_eq!(list[0]["_count"]["questions"], 3);
}

#[tokio::test]
async fn deleting_a_quiz_closes_its_sessions() {
    let app = app().await;
    let doomed = create(&app).await;
    let doomed_id = doomed["id"].as_str().unwrap().to_string();
    let kept = create(&app).await;
    let kept_id = kept["id"].as_str().unwrap().to_string();

    let mut doomed_sessions = Vec::new();
    for _ in 0..3 {
        let (_, s) = send(&app, "POST", &format!("/api/v1/quizzes/{doomed_id}/sessions"), None).await;
        doomed_sessions.push(s["id"].as_str().unwrap().to_string());
    }
    let (_, s) = send(&app, "POST", &format!("/api/v1/quizzes/{kept_id}/sessions"), None).await;
    let kept_session = s["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/quizzes/{doomed_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for sid in &doomed_sessions {
        let (status, body) = send(&app, "GET", &format!("/api/v1/sessions/{sid}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], format!("Session with ID {sid} not found"));
    }
    let (status, s) = send(&app, "GET", &format!("/api/v1/sessions/{kept_session}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["quizId"], kept_id.as_str());
}

#[tokio::test]
async fn checkbox_without_options_reads_back_null() {
    let app = app().await;
    let body = json!({
        "title": "Bare",
        "questions": [{ "type": "CHECKBOX", "text": "Pick", "correctAnswers": [] }]
    });
    let (status, created) = send(&app, "POST", "/api/v1/quizzes", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["questions"][0]["options"], Value::Null);

    let id = created["id"].as_str().unwrap();
    let (_, fetched) = send(&app, "GET", &format!("/api/v1/quizzes/{id}"), None).await;
    assert_eq!(fetched["questions"][0]["options"], Value::Null);
    assert_eq!(fetched["questions"][0]["correctAnswers"], json!([]));
}

#[tokio::test]
async fn patch_accepts_empty_title() {
    let app = app().await;
    let quiz = create(&app).await;
    let id = quiz["id"].as_str().unwrap();

    let (status, updated) = send(&app, "PATCH", &format!("/api/v1/quizzes/{id}"), Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "");
    assert_eq!(updated["questions"], quiz["questions"]);
}
