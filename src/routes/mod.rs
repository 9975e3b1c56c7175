//! Router assembly: REST endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - quiz CRUD under `/api/v1/quizzes`
/// - stateless grading at `/api/v1/quizzes/:id/grade`
/// - quiz-taking sessions under `/api/v1/sessions`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        // Quizzes
        .route(
            "/api/v1/quizzes",
            get(http::http_list_quizzes).post(http::http_create_quiz),
        )
        .route(
            "/api/v1/quizzes/:id",
            get(http::http_get_quiz)
                .patch(http::http_update_quiz)
                .delete(http::http_delete_quiz),
        )
        .route("/api/v1/quizzes/:id/grade", post(http::http_grade_quiz))
        .route("/api/v1/quizzes/:id/sessions", post(http::http_open_session))
        // Sessions
        .route(
            "/api/v1/sessions/:sid",
            get(http::http_get_session).delete(http::http_close_session),
        )
        .route("/api/v1/sessions/:sid/start", post(http::http_start_session))
        .route("/api/v1/sessions/:sid/next", post(http::http_next_question))
        .route("/api/v1/sessions/:sid/previous", post(http::http_previous_question))
        .route("/api/v1/sessions/:sid/exit", post(http::http_exit_session))
        .route("/api/v1/sessions/:sid/submit", post(http::http_submit_session))
        .route("/api/v1/sessions/:sid/retake", post(http::http_retake_session))
        .route(
            "/api/v1/sessions/:sid/answers/:qid",
            put(http::http_answer_question),
        )
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
