//! Core behaviors behind the HTTP handlers:
//!   - quiz CRUD (validation + store calls)
//!   - stateless grading of an answer map
//!   - quiz-taking sessions (transitions, answers, submit)

use tracing::{debug, info, instrument};
use validator::Validate;

use crate::domain::{Answer, Quiz, UserAnswers};
use crate::error::ApiError;
use crate::protocol::{
  grade_out, list_item_out, quiz_out, session_out, CreateQuizIn, GradeOut, QuizListItemOut, QuizOut,
  SessionOut, UpdateQuizIn,
};
use crate::runtime::QuizSession;
use crate::state::AppState;

#[instrument(level = "info", skip(state, body), fields(title = %body.title, questions = body.questions.len()))]
pub async fn create_quiz(state: &AppState, body: CreateQuizIn) -> Result<QuizOut, ApiError> {
  body.validate()?;
  let quiz = state.store.create(body.into_new_quiz()).await?;
  Ok(quiz_out(&quiz))
}

pub async fn list_quizzes(state: &AppState) -> Vec<QuizListItemOut> {
  state.store.find_all().await.iter().map(list_item_out).collect()
}

pub async fn get_quiz(state: &AppState, id: &str) -> Result<QuizOut, ApiError> {
  let quiz = state.store.find_one(id).await?;
  Ok(quiz_out(&quiz))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn update_quiz(state: &AppState, id: &str, body: UpdateQuizIn) -> Result<QuizOut, ApiError> {
  body.validate()?;
  let quiz = state.store.update(id, body.into_patch()).await?;
  Ok(quiz_out(&quiz))
}

/// Delete a quiz together with every session that was taking it.
#[instrument(level = "info", skip(state), fields(%id))]
pub async fn delete_quiz(state: &AppState, id: &str) -> Result<(), ApiError> {
  state.store.remove(id).await?;
  let dropped = state.remove_sessions_for_quiz(id).await;
  if dropped > 0 {
    info!(target: "session", quiz_id = %id, dropped, "Closed sessions of deleted quiz");
  }
  Ok(())
}

/// Grade an answer map against the current stored version of the quiz.
#[instrument(level = "info", skip(state, answers), fields(%quiz_id, answered = answers.len()))]
pub async fn grade_answers(state: &AppState, quiz_id: &str, answers: &UserAnswers) -> Result<GradeOut, ApiError> {
  let quiz = state.store.find_one(quiz_id).await?;
  let report = state.grader.grade(&quiz, answers);
  info!(target: "grading", %quiz_id, correct = report.score.correct, total = report.score.total, "Answers graded");
  Ok(grade_out(&report))
}

//
// Sessions
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAction {
  Start,
  Next,
  Previous,
  Exit,
  Submit,
  Retake,
}

impl SessionAction {
  fn needs_quiz(&self) -> bool {
    matches!(self, SessionAction::Next | SessionAction::Submit)
  }
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn open_session(state: &AppState, quiz_id: &str) -> Result<SessionOut, ApiError> {
  // Only check existence; the quiz is re-read on every transition that needs it.
  state.store.find_one(quiz_id).await?;
  let session = QuizSession::new(quiz_id);
  let out = session_out(&session);
  info!(target: "session", session_id = %session.id, %quiz_id, "Session opened");
  state.insert_session(session).await;
  Ok(out)
}

pub async fn get_session(state: &AppState, session_id: &str) -> Result<SessionOut, ApiError> {
  state
    .get_session(session_id)
    .await
    .map(|s| session_out(&s))
    .ok_or_else(|| session_not_found(session_id))
}

pub async fn close_session(state: &AppState, session_id: &str) -> Result<(), ApiError> {
  state
    .remove_session(session_id)
    .await
    .map(|_| ())
    .ok_or_else(|| session_not_found(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id, ?action))]
pub async fn apply_session_action(
  state: &AppState,
  session_id: &str,
  action: SessionAction,
) -> Result<SessionOut, ApiError> {
  let quiz = if action.needs_quiz() { Some(load_session_quiz(state, session_id).await?) } else { None };

  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .ok_or_else(|| session_not_found(session_id))?;
  session.touch();

  match (action, quiz.as_ref()) {
    (SessionAction::Start, _) => session.start()?,
    (SessionAction::Previous, _) => {
      session.previous()?;
    }
    (SessionAction::Exit, _) => session.exit()?,
    (SessionAction::Retake, _) => session.retake()?,
    (SessionAction::Next, Some(quiz)) => {
      session.next(quiz.questions.len())?;
    }
    (SessionAction::Submit, Some(quiz)) => {
      session.submit(quiz, &state.grader)?;
    }
    (SessionAction::Next | SessionAction::Submit, None) => {
      return Err(ApiError::Internal("quiz snapshot missing".into()));
    }
  }
  debug!(target: "session", %session_id, phase = session.phase.as_str(), index = session.current_index, "Session updated");
  Ok(session_out(session))
}

#[instrument(level = "info", skip(state, answer), fields(%session_id, %question_id))]
pub async fn answer_question(
  state: &AppState,
  session_id: &str,
  question_id: &str,
  answer: Answer,
) -> Result<SessionOut, ApiError> {
  let quiz = load_session_quiz(state, session_id).await?;
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(session_id)
    .ok_or_else(|| session_not_found(session_id))?;
  session.touch();
  session.record_answer(&quiz, question_id, answer)?;
  Ok(session_out(session))
}

async fn load_session_quiz(state: &AppState, session_id: &str) -> Result<Quiz, ApiError> {
  let session = state
    .get_session(session_id)
    .await
    .ok_or_else(|| session_not_found(session_id))?;
  Ok(state.store.find_one(&session.quiz_id).await?)
}

fn session_not_found(id: &str) -> ApiError {
  ApiError::not_found(format!("Session with ID {id} not found"))
}
