//! Grading engine: per-question correctness and the aggregate score.
//!
//! Everything here is a pure function of its arguments. Grading never fails:
//! unknown question types, missing correct answers and missing user answers all
//! resolve to a definite verdict.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::{
  Answer, AnswerScalar, GradeReport, Question, QuestionKind, QuestionVerdict, Quiz, ScoreResult,
  UserAnswers,
};
use crate::normalize::{
  normalize_boolean_answer, normalize_boolean_scalar, normalize_checkbox_answer,
  normalize_input_answer, normalize_input_scalar,
};

/// Knobs for how unanswered questions are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct GradingPolicy {
  /// When false (the default), an unanswered question is graded as if the
  /// type's empty value had been submitted, so an unanswered boolean question
  /// whose correct answer is `false` counts as correct.
  #[serde(default)]
  pub unanswered_is_incorrect: bool,
}

/// Decide whether `answer` is correct for `question`. `None` means unanswered.
pub fn grade_question(question: &Question, answer: Option<&Answer>) -> bool {
  match &question.kind {
    QuestionKind::Boolean { correct_answers } => {
      let expected = correct_answers.as_deref().and_then(|c| c.first());
      normalize_boolean_answer(answer) == normalize_boolean_scalar(expected)
    }
    QuestionKind::Input { correct_answers } => {
      let Some(accepted) = correct_answers else { return false };
      let given = normalize_input_answer(answer);
      accepted.iter().any(|c| normalize_input_scalar(c) == given)
    }
    QuestionKind::Checkbox { options, correct_answers } => {
      let Some(expected) = correct_answers else { return false };
      let given = normalize_checkbox_answer(answer, options.as_ref().map_or(0, Vec::len));
      selection_matches(&given, expected)
    }
    QuestionKind::Unknown { .. } => false,
  }
}

// Exact length and positional match; a stored "true" string never equals a checked box.
fn selection_matches(given: &[bool], expected: &[AnswerScalar]) -> bool {
  given.len() == expected.len()
    && given
      .iter()
      .zip(expected)
      .all(|(g, e)| matches!(e, AnswerScalar::Bool(b) if b == g))
}

/// `round(100 * correct / total)`, or 0 for an empty quiz.
pub fn percentage(correct: u32, total: u32) -> u32 {
  if total == 0 {
    return 0;
  }
  (f64::from(correct) * 100.0 / f64::from(total)).round() as u32
}

/// Grade a whole quiz with the default policy.
pub fn grade_quiz(quiz: &Quiz, answers: &UserAnswers) -> ScoreResult {
  Grader::default().grade(quiz, answers).score
}

/// Short verdict shown next to the final percentage.
pub fn score_remark(percentage: u32) -> &'static str {
  if percentage >= 90 { "Excellent work!" }
  else if percentage >= 80 { "Great job!" }
  else if percentage >= 70 { "Good effort!" }
  else if percentage >= 60 { "Not bad, keep studying!" }
  else { "Keep practicing!" }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Grader {
  pub policy: GradingPolicy,
}

impl Grader {
  pub fn new(policy: GradingPolicy) -> Self {
    Self { policy }
  }

  pub fn grade_one(&self, question: &Question, answers: &UserAnswers) -> bool {
    match answers.get(&question.id) {
      None if self.policy.unanswered_is_incorrect => false,
      answer => grade_question(question, answer),
    }
  }

  /// Score plus one verdict per question, in quiz order.
  #[instrument(level = "debug", target = "grading", skip_all, fields(quiz_id = %quiz.id, answered = answers.len()))]
  pub fn grade(&self, quiz: &Quiz, answers: &UserAnswers) -> GradeReport {
    let verdicts: Vec<QuestionVerdict> = quiz
      .questions
      .iter()
      .map(|q| QuestionVerdict { question_id: q.id.clone(), correct: self.grade_one(q, answers) })
      .collect();

    let total = verdicts.len() as u32;
    let correct = verdicts.iter().filter(|v| v.correct).count() as u32;
    let score = ScoreResult { correct, total, percentage: percentage(correct, total) };
    debug!(target: "grading", quiz_id = %quiz.id, correct, total, percentage = score.percentage, "Quiz graded");
    GradeReport { score, verdicts }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn question(id: &str, kind: QuestionKind) -> Question {
    Question { id: id.into(), text: format!("question {id}"), required: true, kind }
  }

  fn boolean(id: &str, correct: Option<Vec<AnswerScalar>>) -> Question {
    question(id, QuestionKind::Boolean { correct_answers: correct })
  }

  fn input(id: &str, accepted: &[&str]) -> Question {
    let correct_answers = Some(accepted.iter().map(|s| AnswerScalar::Text(s.to_string())).collect());
    question(id, QuestionKind::Input { correct_answers })
  }

  fn checkbox(id: &str, options: &[&str], correct: &[bool]) -> Question {
    question(
      id,
      QuestionKind::Checkbox {
        options: Some(options.iter().map(|s| s.to_string()).collect()),
        correct_answers: Some(correct.iter().map(|b| AnswerScalar::Bool(*b)).collect()),
      },
    )
  }

  fn quiz(questions: Vec<Question>) -> Quiz {
    let now = Utc::now();
    Quiz { id: "quiz-1".into(), title: "Sample".into(), created_at: now, updated_at: now, questions }
  }

  fn answers(pairs: Vec<(&str, Answer)>) -> UserAnswers {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
  }

  #[test]
  fn boolean_grades_over_every_representation() {
    let given: [Option<Answer>; 5] = [
      Some(Answer::Flag(true)),
      Some(Answer::Flag(false)),
      Some(Answer::Text("true".into())),
      Some(Answer::Text("false".into())),
      None,
    ];
    // Columns follow `given`: true, false, "true", "false", unanswered.
    let table: [(Option<AnswerScalar>, [bool; 5]); 5] = [
      (Some(AnswerScalar::Bool(true)), [true, false, true, false, false]),
      (Some(AnswerScalar::Bool(false)), [false, true, false, true, true]),
      (Some(AnswerScalar::Text("true".into())), [true, false, true, false, false]),
      (Some(AnswerScalar::Text("false".into())), [false, true, false, true, true]),
      (None, [false, true, false, true, true]),
    ];
    for (stored, row) in table {
      let q = boolean("b", stored.clone().map(|s| vec![s]));
      for (answer, expected) in given.iter().zip(row) {
        assert_eq!(grade_question(&q, answer.as_ref()), expected, "stored={stored:?} given={answer:?}");
      }
    }
  }

  #[test]
  fn boolean_false_answer_matches_false_key() {
    let q = boolean("b", Some(vec![AnswerScalar::Bool(false)]));
    assert!(grade_question(&q, Some(&Answer::Flag(false))));
    assert!(!grade_question(&q, Some(&Answer::Flag(true))));
  }

  #[test]
  fn input_is_case_and_whitespace_insensitive() {
    let q = input("i", &["var", "let", "const"]);
    assert!(grade_question(&q, Some(&Answer::Text("LET  ".into()))));
    assert!(grade_question(&q, Some(&Answer::Text(" VAR ".into()))));
    assert!(!grade_question(&q, Some(&Answer::Text("function".into()))));
  }

  #[test]
  fn input_without_correct_answers_is_never_correct() {
    let q = question("i", QuestionKind::Input { correct_answers: None });
    assert!(!grade_question(&q, Some(&Answer::Text("".into()))));
    assert!(!grade_question(&q, None));
  }

  #[test]
  fn checkbox_needs_exact_positional_match() {
    let q = checkbox("c", &["String", "Number", "Boolean"], &[true, true, false]);
    assert!(grade_question(&q, Some(&Answer::Selection(vec![true, true, false]))));
    assert!(!grade_question(&q, Some(&Answer::Selection(vec![true, false, false]))));
  }

  #[test]
  fn checkbox_length_change_flips_verdict() {
    let answer = Answer::Selection(vec![true, true, false]);
    let q = checkbox("c", &["String", "Number", "Boolean"], &[true, true, false]);
    assert!(grade_question(&q, Some(&answer)));

    let grown = checkbox("c", &["String", "Number", "Boolean", "Array"], &[true, true, false, false]);
    assert!(!grade_question(&grown, Some(&answer)));
  }

  #[test]
  fn checkbox_string_flags_do_not_match_booleans() {
    let q = question(
      "c",
      QuestionKind::Checkbox {
        options: Some(vec!["a".into()]),
        correct_answers: Some(vec![AnswerScalar::Text("true".into())]),
      },
    );
    assert!(!grade_question(&q, Some(&Answer::Selection(vec![true]))));
  }

  #[test]
  fn checkbox_without_correct_answers_is_never_correct() {
    let q = question(
      "c",
      QuestionKind::Checkbox { options: Some(vec!["a".into(), "b".into()]), correct_answers: None },
    );
    assert!(!grade_question(&q, None));
    assert!(!grade_question(&q, Some(&Answer::Selection(vec![true, false]))));
    assert!(!grade_question(&q, Some(&Answer::Selection(vec![false, false]))));
  }

  #[test]
  fn checkbox_without_options_grades_against_its_key() {
    let q = question(
      "c",
      QuestionKind::Checkbox { options: None, correct_answers: Some(vec![AnswerScalar::Bool(true)]) },
    );
    assert!(grade_question(&q, Some(&Answer::Selection(vec![true]))));
    assert!(!grade_question(&q, None));
  }

  #[test]
  fn unanswered_checkbox_counts_as_nothing_selected() {
    let q = checkbox("c", &["a", "b"], &[false, false]);
    assert!(grade_question(&q, None));
    let q = checkbox("c", &["a", "b"], &[true, false]);
    assert!(!grade_question(&q, None));
  }

  #[test]
  fn unknown_type_is_never_correct() {
    let q = question("u", QuestionKind::Unknown { type_name: "ESSAY".into() });
    assert!(!grade_question(&q, Some(&Answer::Text("anything".into()))));
  }

  #[test]
  fn empty_quiz_scores_zero() {
    let score = grade_quiz(&quiz(vec![]), &UserAnswers::new());
    assert_eq!(score, ScoreResult { correct: 0, total: 0, percentage: 0 });
  }

  #[test]
  fn all_three_types_answered_correctly() {
    let q = quiz(vec![
      boolean("b", Some(vec![AnswerScalar::Bool(false)])),
      input("i", &["var", "let", "const"]),
      checkbox("c", &["String", "Number", "Boolean"], &[true, true, false]),
    ]);
    let given = answers(vec![
      ("b", Answer::Flag(false)),
      ("i", Answer::Text("LET  ".into())),
      ("c", Answer::Selection(vec![true, true, false])),
    ]);
    assert_eq!(grade_quiz(&q, &given), ScoreResult { correct: 3, total: 3, percentage: 100 });
  }

  #[test]
  fn half_right_is_fifty_percent() {
    let q = quiz(vec![input("i", &["let"]), checkbox("c", &["a", "b"], &[true, false])]);
    let given = answers(vec![("i", Answer::Text("let".into())), ("c", Answer::Selection(vec![false, true]))]);
    let report = Grader::default().grade(&q, &given);
    assert_eq!(report.score, ScoreResult { correct: 1, total: 2, percentage: 50 });
    assert_eq!(
      report.verdicts,
      vec![
        QuestionVerdict { question_id: "i".into(), correct: true },
        QuestionVerdict { question_id: "c".into(), correct: false },
      ]
    );
  }

  #[test]
  fn grading_is_repeatable() {
    let q = quiz(vec![boolean("b", Some(vec![AnswerScalar::Bool(true)])), input("i", &["x"])]);
    let given = answers(vec![("b", Answer::Flag(true))]);
    assert_eq!(grade_quiz(&q, &given), grade_quiz(&q, &given));
  }

  #[test]
  fn strict_policy_fails_unanswered_questions() {
    let q = quiz(vec![boolean("b", Some(vec![AnswerScalar::Bool(false)]))]);
    let lenient = Grader::default().grade(&q, &UserAnswers::new());
    assert_eq!(lenient.score.correct, 1);

    let strict = Grader::new(GradingPolicy { unanswered_is_incorrect: true }).grade(&q, &UserAnswers::new());
    assert_eq!(strict.score, ScoreResult { correct: 0, total: 1, percentage: 0 });
  }

  #[test]
  fn percentage_rounds_half_up() {
    assert_eq!(percentage(1, 3), 33);
    assert_eq!(percentage(2, 3), 67);
    assert_eq!(percentage(1, 8), 13);
    assert_eq!(percentage(0, 0), 0);
  }

  #[test]
  fn remarks_follow_score_bands() {
    assert_eq!(score_remark(100), "Excellent work!");
    assert_eq!(score_remark(85), "Great job!");
    assert_eq!(score_remark(70), "Good effort!");
    assert_eq!(score_remark(60), "Not bad, keep studying!");
    assert_eq!(score_remark(10), "Keep practicing!");
  }
}
