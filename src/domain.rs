//! Domain models: questions and their per-type answer encodings, quizzes,
//! submitted answers and grading results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One element of a stored `correctAnswers` list.
/// Boolean questions may carry either `true` or `"true"`; both shapes are kept as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerScalar {
  Bool(bool),
  Text(String),
}

/// A value submitted by the quiz taker.
/// The expected shape depends on the question type, but any JSON is accepted
/// so that grading stays total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
  Flag(bool),
  Text(String),
  Selection(Vec<bool>),
  Other(serde_json::Value),
}

/// Question id -> submitted answer, for one quiz-taking session.
pub type UserAnswers = HashMap<String, Answer>;

/// Type tag as it appears on the wire and in the flat `questions` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
  Boolean,
  Input,
  Checkbox,
  #[serde(other)]
  Unknown,
}

impl QuestionType {
  pub fn as_str(&self) -> &'static str {
    match self {
      QuestionType::Boolean => "BOOLEAN",
      QuestionType::Input => "INPUT",
      QuestionType::Checkbox => "CHECKBOX",
      QuestionType::Unknown => "UNKNOWN",
    }
  }

  pub fn parse(s: &str) -> Self {
    match s {
      "BOOLEAN" => QuestionType::Boolean,
      "INPUT" => QuestionType::Input,
      "CHECKBOX" => QuestionType::Checkbox,
      _ => QuestionType::Unknown,
    }
  }
}

/// Per-type payload of a question. `options` only exists for checkbox questions.
#[derive(Clone, Debug, PartialEq)]
pub enum QuestionKind {
  /// `correct_answers[0]` holds the expected boolean.
  Boolean { correct_answers: Option<Vec<AnswerScalar>> },
  /// Any one of `correct_answers` is accepted.
  Input { correct_answers: Option<Vec<AnswerScalar>> },
  /// `correct_answers[i]` marks whether `options[i]` must be selected.
  /// Options left out by the author stay absent rather than empty.
  Checkbox {
    options: Option<Vec<String>>,
    correct_answers: Option<Vec<AnswerScalar>>,
  },
  /// Stored row with a type tag this build does not know about.
  Unknown { type_name: String },
}

impl QuestionKind {
  /// Assemble a kind from the flat (type, options, correctAnswers) triple.
  pub fn from_parts(
    type_name: &str,
    options: Option<Vec<String>>,
    correct_answers: Option<Vec<AnswerScalar>>,
  ) -> Self {
    match QuestionType::parse(type_name) {
      QuestionType::Boolean => QuestionKind::Boolean { correct_answers },
      QuestionType::Input => QuestionKind::Input { correct_answers },
      QuestionType::Checkbox => QuestionKind::Checkbox { options, correct_answers },
      QuestionType::Unknown => QuestionKind::Unknown { type_name: type_name.to_string() },
    }
  }

  pub fn type_name(&self) -> &str {
    match self {
      QuestionKind::Boolean { .. } => QuestionType::Boolean.as_str(),
      QuestionKind::Input { .. } => QuestionType::Input.as_str(),
      QuestionKind::Checkbox { .. } => QuestionType::Checkbox.as_str(),
      QuestionKind::Unknown { type_name } => type_name,
    }
  }

  pub fn options(&self) -> Option<&[String]> {
    match self {
      QuestionKind::Checkbox { options, .. } => options.as_deref(),
      _ => None,
    }
  }

  pub fn correct_answers(&self) -> Option<&[AnswerScalar]> {
    match self {
      QuestionKind::Boolean { correct_answers }
      | QuestionKind::Input { correct_answers }
      | QuestionKind::Checkbox { correct_answers, .. } => correct_answers.as_deref(),
      QuestionKind::Unknown { .. } => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Question {
  pub id: String,
  pub text: String,
  /// Displayed to the quiz taker; grading ignores it.
  pub required: bool,
  pub kind: QuestionKind,
}

/// A fully loaded quiz snapshot. Questions are owned and ordered.
#[derive(Clone, Debug, PartialEq)]
pub struct Quiz {
  pub id: String,
  pub title: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub questions: Vec<Question>,
}

/// Listing entry (no questions, only their count).
#[derive(Clone, Debug, PartialEq)]
pub struct QuizSummary {
  pub id: String,
  pub title: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub question_count: usize,
}

/// Question payload before it has been assigned an id.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionDraft {
  pub text: String,
  pub required: bool,
  pub kind: QuestionKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewQuiz {
  pub title: String,
  pub questions: Vec<QuestionDraft>,
}

/// Partial update. A present question list replaces every existing question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuizPatch {
  pub title: Option<String>,
  pub questions: Option<Vec<QuestionDraft>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
  pub correct: u32,
  pub total: u32,
  pub percentage: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionVerdict {
  pub question_id: String,
  pub correct: bool,
}

/// Aggregate score plus per-question verdicts in quiz order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
  pub score: ScoreResult,
  pub verdicts: Vec<QuestionVerdict>,
}
