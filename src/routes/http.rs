//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

//
// Quizzes
//

#[instrument(level = "info", skip(state, body))]
pub async fn http_create_quiz(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CreateQuizIn>,
) -> Result<impl IntoResponse, ApiError> {
  let quiz = create_quiz(&state, body).await?;
  info!(target: "quiz", id = %quiz.id, questions = quiz.questions.len(), "HTTP quiz created");
  Ok((StatusCode::CREATED, Json(quiz)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_quizzes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(list_quizzes(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(get_quiz(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_update_quiz(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateQuizIn>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(update_quiz(&state, &id, body).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_quiz(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  delete_quiz(&state, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body), fields(answered = body.answers.len()))]
pub async fn http_grade_quiz(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<GradeIn>,
) -> Result<impl IntoResponse, ApiError> {
  let out = grade_answers(&state, &id, &body.answers).await?;
  info!(target: "grading", %id, correct = out.correct, total = out.total, percentage = out.percentage, "HTTP grade evaluated");
  Ok(Json(out))
}

//
// Sessions
//

#[instrument(level = "info", skip(state))]
pub async fn http_open_session(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let out = open_session(&state, &quiz_id).await?;
  Ok((StatusCode::CREATED, Json(out)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(get_session(&state, &session_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_close_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  close_session(&state, &session_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_answer_question(
  State(state): State<Arc<AppState>>,
  Path((session_id, question_id)): Path<(String, String)>,
  Json(body): Json<AnswerIn>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(answer_question(&state, &session_id, &question_id, body.answer).await?))
}

async fn session_action(
  state: Arc<AppState>,
  session_id: String,
  action: SessionAction,
) -> Result<Json<SessionOut>, ApiError> {
  let out = apply_session_action(&state, &session_id, action).await?;
  info!(target: "session", %session_id, ?action, phase = out.phase.as_str(), "HTTP session action applied");
  Ok(Json(out))
}

pub async fn http_start_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  session_action(state, session_id, SessionAction::Start).await
}

pub async fn http_next_question(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  session_action(state, session_id, SessionAction::Next).await
}

pub async fn http_previous_question(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  session_action(state, session_id, SessionAction::Previous).await
}

pub async fn http_exit_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  session_action(state, session_id, SessionAction::Exit).await
}

pub async fn http_submit_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  session_action(state, session_id, SessionAction::Submit).await
}

pub async fn http_retake_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  session_action(state, session_id, SessionAction::Retake).await
}
