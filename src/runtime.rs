//! Quiz-taking sessions: `preview -> taking -> completed`, with `taking -> preview`
//! (exit) and `completed -> preview` (retake).
//!
//! Grading runs exactly once per session attempt, on an explicit submit.
//! Reaching the last question does not grade anything.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Answer, GradeReport, Quiz, UserAnswers};
use crate::grading::Grader;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
  Preview,
  Taking,
  Completed,
}

impl SessionPhase {
  pub fn as_str(&self) -> &'static str {
    match self {
      SessionPhase::Preview => "preview",
      SessionPhase::Taking => "taking",
      SessionPhase::Completed => "completed",
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("cannot {action} while the session is {}", .phase.as_str())]
  InvalidTransition { action: &'static str, phase: SessionPhase },

  #[error("question {0} is not part of this quiz")]
  UnknownQuestion(String),
}

#[derive(Clone, Debug)]
pub struct QuizSession {
  pub id: String,
  pub quiz_id: String,
  pub phase: SessionPhase,
  pub current_index: usize,
  pub answers: UserAnswers,
  pub report: Option<GradeReport>,
  /// Last time the session was opened, answered or moved; drives idle expiry.
  pub touched_at: DateTime<Utc>,
}

impl QuizSession {
  pub fn new(quiz_id: &str) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      quiz_id: quiz_id.to_string(),
      phase: SessionPhase::Preview,
      current_index: 0,
      answers: UserAnswers::new(),
      report: None,
      touched_at: Utc::now(),
    }
  }

  pub fn touch(&mut self) {
    self.touched_at = Utc::now();
  }

  fn expect_phase(&self, phase: SessionPhase, action: &'static str) -> Result<(), SessionError> {
    if self.phase == phase {
      Ok(())
    } else {
      Err(SessionError::InvalidTransition { action, phase: self.phase })
    }
  }

  fn clear(&mut self) {
    self.current_index = 0;
    self.answers.clear();
    self.report = None;
  }

  pub fn start(&mut self) -> Result<(), SessionError> {
    self.expect_phase(SessionPhase::Preview, "start")?;
    self.clear();
    self.phase = SessionPhase::Taking;
    Ok(())
  }

  /// Store (or overwrite) the answer for one question of `quiz`.
  pub fn record_answer(&mut self, quiz: &Quiz, question_id: &str, answer: Answer) -> Result<(), SessionError> {
    self.expect_phase(SessionPhase::Taking, "answer")?;
    if !quiz.questions.iter().any(|q| q.id == question_id) {
      return Err(SessionError::UnknownQuestion(question_id.to_string()));
    }
    self.answers.insert(question_id.to_string(), answer);
    Ok(())
  }

  pub fn next(&mut self, question_count: usize) -> Result<usize, SessionError> {
    self.expect_phase(SessionPhase::Taking, "move forward")?;
    if self.current_index + 1 < question_count {
      self.current_index += 1;
    }
    Ok(self.current_index)
  }

  pub fn previous(&mut self) -> Result<usize, SessionError> {
    self.expect_phase(SessionPhase::Taking, "move back")?;
    self.current_index = self.current_index.saturating_sub(1);
    Ok(self.current_index)
  }

  /// Leave the quiz without grading; answers are discarded.
  pub fn exit(&mut self) -> Result<(), SessionError> {
    self.expect_phase(SessionPhase::Taking, "exit")?;
    self.clear();
    self.phase = SessionPhase::Preview;
    Ok(())
  }

  pub fn submit(&mut self, quiz: &Quiz, grader: &Grader) -> Result<&GradeReport, SessionError> {
    self.expect_phase(SessionPhase::Taking, "submit")?;
    let report = grader.grade(quiz, &self.answers);
    info!(
      target: "session",
      session_id = %self.id,
      quiz_id = %quiz.id,
      correct = report.score.correct,
      total = report.score.total,
      percentage = report.score.percentage,
      "Session submitted"
    );
    self.phase = SessionPhase::Completed;
    Ok(self.report.insert(report))
  }

  pub fn retake(&mut self) -> Result<(), SessionError> {
    self.expect_phase(SessionPhase::Completed, "retake")?;
    self.clear();
    self.phase = SessionPhase::Preview;
    Ok(())
  }
}
