//! Built-in sample content so a fresh server has something to take.

use crate::domain::{AnswerScalar, NewQuiz, QuestionDraft, QuestionKind};

/// "JavaScript Fundamentals": one question of each type.
pub fn sample_quiz() -> NewQuiz {
  NewQuiz {
    title: "JavaScript Fundamentals".into(),
    questions: vec![
      QuestionDraft {
        text: "JavaScript is a statically typed language.".into(),
        required: true,
        kind: QuestionKind::Boolean { correct_answers: Some(vec![AnswerScalar::Bool(false)]) },
      },
      QuestionDraft {
        text: "What keyword is used to declare a variable in JavaScript?".into(),
        required: true,
        kind: QuestionKind::Input {
          correct_answers: Some(
            ["var", "let", "const"].iter().map(|s| AnswerScalar::Text(s.to_string())).collect(),
          ),
        },
      },
      QuestionDraft {
        text: "Which of the following are JavaScript data types?".into(),
        required: true,
        kind: QuestionKind::Checkbox {
          options: Some(
            ["String", "Number", "Boolean", "Array", "Object"]
              .iter()
              .map(|s| s.to_string())
              .collect(),
          ),
          correct_answers: Some(vec![AnswerScalar::Bool(true); 5]),
        },
      },
    ],
  }
}
