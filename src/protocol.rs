//! Public HTTP request/response shapes (serde ready, camelCase on the wire).
//! Questions travel flat (`type`, `options`, `correctAnswers`) and are mapped
//! to/from the typed `QuestionKind` here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::{
    Answer, AnswerScalar, GradeReport, NewQuiz, Question, QuestionDraft, QuestionKind,
    QuestionType, QuestionVerdict, Quiz, QuizPatch, QuizSummary, UserAnswers,
};
use crate::grading::score_remark;
use crate::runtime::{QuizSession, SessionPhase};

//
// Quiz authoring
//

fn default_required() -> bool {
    true
}

fn known_question_type(t: &QuestionType) -> Result<(), ValidationError> {
    if *t == QuestionType::Unknown {
        let mut err = ValidationError::new("question_type");
        err.message = Some("type must be one of BOOLEAN, INPUT, CHECKBOX".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionIn {
    #[serde(rename = "type")]
    #[validate(custom(function = "known_question_type"))]
    pub question_type: QuestionType,
    #[validate(length(min = 1, message = "Question text is required"))]
    pub text: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answers: Option<Vec<AnswerScalar>>,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl QuestionIn {
    pub fn into_draft(self) -> QuestionDraft {
        QuestionDraft {
            text: self.text,
            required: self.required,
            kind: QuestionKind::from_parts(
                self.question_type.as_str(),
                self.options,
                self.correct_answers,
            ),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CreateQuizIn {
    #[validate(length(min = 1, message = "Quiz title is required"))]
    pub title: String,
    #[validate(nested)]
    pub questions: Vec<QuestionIn>,
}

impl CreateQuizIn {
    pub fn into_new_quiz(self) -> NewQuiz {
        NewQuiz {
            title: self.title,
            questions: self.questions.into_iter().map(QuestionIn::into_draft).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct UpdateQuizIn {
    /// Replaces the title as given; an empty string is accepted here.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Option<Vec<QuestionIn>>,
}

impl UpdateQuizIn {
    pub fn into_patch(self) -> QuizPatch {
        QuizPatch {
            title: self.title,
            questions: self
                .questions
                .map(|qs| qs.into_iter().map(QuestionIn::into_draft).collect()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub text: String,
    pub options: Option<Vec<String>>,
    pub correct_answers: Option<Vec<AnswerScalar>>,
    pub required: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOut {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub questions: Vec<QuestionOut>,
}

#[derive(Debug, Serialize)]
pub struct CountOut {
    pub questions: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizListItemOut {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "_count")]
    pub count: CountOut,
}

pub fn question_out(q: &Question) -> QuestionOut {
    QuestionOut {
        id: q.id.clone(),
        question_type: q.kind.type_name().to_string(),
        text: q.text.clone(),
        options: q.kind.options().map(<[String]>::to_vec),
        correct_answers: q.kind.correct_answers().map(<[AnswerScalar]>::to_vec),
        required: q.required,
    }
}

/// Convert a loaded `Quiz` to its public shape.
pub fn quiz_out(q: &Quiz) -> QuizOut {
    QuizOut {
        id: q.id.clone(),
        title: q.title.clone(),
        created_at: q.created_at,
        updated_at: q.updated_at,
        questions: q.questions.iter().map(question_out).collect(),
    }
}

pub fn list_item_out(s: &QuizSummary) -> QuizListItemOut {
    QuizListItemOut {
        id: s.id.clone(),
        title: s.title.clone(),
        created_at: s.created_at,
        updated_at: s.updated_at,
        count: CountOut { questions: s.question_count },
    }
}

//
// Grading
//

#[derive(Debug, Default, Deserialize)]
pub struct GradeIn {
    #[serde(default)]
    pub answers: UserAnswers,
}

#[derive(Debug, Serialize)]
pub struct GradeOut {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
    pub message: &'static str,
    pub verdicts: Vec<QuestionVerdict>,
}

pub fn grade_out(r: &GradeReport) -> GradeOut {
    GradeOut {
        correct: r.score.correct,
        total: r.score.total,
        percentage: r.score.percentage,
        message: score_remark(r.score.percentage),
        verdicts: r.verdicts.clone(),
    }
}

//
// Sessions
//

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub answer: Answer,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub id: String,
    pub quiz_id: String,
    pub phase: SessionPhase,
    pub current_index: usize,
    pub answers: UserAnswers,
    pub result: Option<GradeOut>,
}

pub fn session_out(s: &QuizSession) -> SessionOut {
    SessionOut {
        id: s.id.clone(),
        quiz_id: s.quiz_id.clone(),
        phase: s.phase,
        current_index: s.current_index,
        answers: s.answers.clone(),
        result: s.report.as_ref().map(grade_out),
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
