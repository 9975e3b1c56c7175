//! In-memory quiz storage laid out like the relational schema: one row per quiz,
//! one row per question, with `options` and `correctAnswers` kept as JSON text.
//!
//! The store maps between those flat rows and the typed [`Quiz`] / [`QuestionKind`]
//! model. Deleting a quiz deletes its questions.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
  AnswerScalar, NewQuiz, Question, QuestionDraft, QuestionKind, Quiz, QuizPatch, QuizSummary,
};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Quiz with ID {0} not found")]
  QuizNotFound(String),

  #[error("failed to encode question column: {0}")]
  Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct QuizRecord {
  pub id: String,
  pub title: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct QuestionRecord {
  pub id: String,
  pub quiz_id: String,
  pub r#type: String,
  pub text: String,
  pub options: Option<String>,
  pub correct_answers: Option<String>,
  pub required: bool,
}

#[derive(Default)]
struct Tables {
  quizzes: HashMap<String, QuizRecord>,
  // quiz id -> its questions, in insertion order
  questions: HashMap<String, Vec<QuestionRecord>>,
}

#[derive(Clone, Default)]
pub struct QuizStore {
  tables: Arc<RwLock<Tables>>,
}

impl QuizStore {
  pub fn new() -> Self {
    Self::default()
  }

  #[instrument(level = "info", skip(self, new), fields(title = %new.title, questions = new.questions.len()))]
  pub async fn create(&self, new: NewQuiz) -> Result<Quiz, StoreError> {
    let now = Utc::now();
    let record = QuizRecord {
      id: Uuid::new_v4().to_string(),
      title: new.title,
      created_at: now,
      updated_at: now,
    };
    let rows = encode_questions(&record.id, &new.questions)?;
    let quiz = assemble(&record, &rows);

    let mut tables = self.tables.write().await;
    tables.questions.insert(record.id.clone(), rows);
    tables.quizzes.insert(record.id.clone(), record);
    info!(target: "quiz", id = %quiz.id, questions = quiz.questions.len(), "Quiz created");
    Ok(quiz)
  }

  /// All quizzes with their question counts, oldest first.
  #[instrument(level = "debug", skip(self))]
  pub async fn find_all(&self) -> Vec<QuizSummary> {
    let tables = self.tables.read().await;
    let mut out: Vec<QuizSummary> = tables
      .quizzes
      .values()
      .map(|q| QuizSummary {
        id: q.id.clone(),
        title: q.title.clone(),
        created_at: q.created_at,
        updated_at: q.updated_at,
        question_count: tables.questions.get(&q.id).map_or(0, Vec::len),
      })
      .collect();
    out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    out
  }

  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn find_one(&self, id: &str) -> Result<Quiz, StoreError> {
    let tables = self.tables.read().await;
    let record = tables
      .quizzes
      .get(id)
      .ok_or_else(|| StoreError::QuizNotFound(id.to_string()))?;
    let rows = tables.questions.get(id).map(Vec::as_slice).unwrap_or_default();
    Ok(assemble(record, rows))
  }

  /// Apply a partial update. A present question list replaces all existing questions.
  #[instrument(level = "info", skip(self, patch), fields(%id, replace_questions = patch.questions.is_some()))]
  pub async fn update(&self, id: &str, patch: QuizPatch) -> Result<Quiz, StoreError> {
    let new_rows = match &patch.questions {
      Some(drafts) => Some(encode_questions(id, drafts)?),
      None => None,
    };

    let mut tables = self.tables.write().await;
    let record = tables
      .quizzes
      .get_mut(id)
      .ok_or_else(|| StoreError::QuizNotFound(id.to_string()))?;
    if let Some(title) = patch.title {
      record.title = title;
    }
    record.updated_at = Utc::now();
    let record = record.clone();

    if let Some(rows) = new_rows {
      tables.questions.insert(id.to_string(), rows);
    }
    let rows = tables.questions.get(id).map(Vec::as_slice).unwrap_or_default();
    let quiz = assemble(&record, rows);
    info!(target: "quiz", %id, questions = quiz.questions.len(), "Quiz updated");
    Ok(quiz)
  }

  #[instrument(level = "info", skip(self), fields(%id))]
  pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
    let mut tables = self.tables.write().await;
    if tables.quizzes.remove(id).is_none() {
      return Err(StoreError::QuizNotFound(id.to_string()));
    }
    let dropped = tables.questions.remove(id).map_or(0, |rows| rows.len());
    info!(target: "quiz", %id, dropped_questions = dropped, "Quiz deleted");
    Ok(())
  }
}

fn encode_questions(quiz_id: &str, drafts: &[QuestionDraft]) -> Result<Vec<QuestionRecord>, StoreError> {
  drafts.iter().map(|d| encode_question(quiz_id, d)).collect()
}

fn encode_question(quiz_id: &str, draft: &QuestionDraft) -> Result<QuestionRecord, StoreError> {
  let options = draft.kind.options().map(serde_json::to_string).transpose()?;
  let correct_answers = draft.kind.correct_answers().map(serde_json::to_string).transpose()?;
  Ok(QuestionRecord {
    id: Uuid::new_v4().to_string(),
    quiz_id: quiz_id.to_string(),
    r#type: draft.kind.type_name().to_string(),
    text: draft.text.clone(),
    options,
    correct_answers,
    required: draft.required,
  })
}

fn assemble(record: &QuizRecord, rows: &[QuestionRecord]) -> Quiz {
  Quiz {
    id: record.id.clone(),
    title: record.title.clone(),
    created_at: record.created_at,
    updated_at: record.updated_at,
    questions: rows.iter().map(decode_question).collect(),
  }
}

fn decode_question(row: &QuestionRecord) -> Question {
  let options = row
    .options
    .as_deref()
    .and_then(|raw| decode_column::<Vec<String>>(row, "options", raw));
  let correct_answers = row
    .correct_answers
    .as_deref()
    .and_then(|raw| decode_column::<Vec<AnswerScalar>>(row, "correct_answers", raw));
  Question {
    id: row.id.clone(),
    text: row.text.clone(),
    required: row.required,
    kind: QuestionKind::from_parts(&row.r#type, options, correct_answers),
  }
}

// Malformed stored JSON reads back as absent.
fn decode_column<T: serde::de::DeserializeOwned>(row: &QuestionRecord, column: &str, raw: &str) -> Option<T> {
  match serde_json::from_str(raw) {
    Ok(v) => Some(v),
    Err(e) => {
      warn!(target: "quiz", question_id = %row.id, quiz_id = %row.quiz_id, column, error = %e, "Unreadable question column; treating as absent");
      None
    }
  }
}
