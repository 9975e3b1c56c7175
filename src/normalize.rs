//! Answer normalization: turns stored correct answers and submitted answers
//! into values that can be compared directly.
//!
//! Nothing here fails. Unexpected shapes collapse to the type's empty value
//! (`false`, `""`, or "nothing selected").

use crate::domain::{Answer, AnswerScalar};

/// `true` or `"true"` is true, everything else (including an absent answer) is false.
pub fn normalize_boolean_answer(answer: Option<&Answer>) -> bool {
  match answer {
    Some(Answer::Flag(b)) => *b,
    Some(Answer::Text(s)) => s == "true",
    Some(Answer::Other(serde_json::Value::Bool(b))) => *b,
    Some(Answer::Other(serde_json::Value::String(s))) => s == "true",
    _ => false,
  }
}

/// Same rule as [`normalize_boolean_answer`], applied to a stored element.
pub fn normalize_boolean_scalar(value: Option<&AnswerScalar>) -> bool {
  match value {
    Some(AnswerScalar::Bool(b)) => *b,
    Some(AnswerScalar::Text(s)) => s == "true",
    None => false,
  }
}

/// String form, lower-cased and trimmed. An absent answer is the empty string.
pub fn normalize_input_answer(answer: Option<&Answer>) -> String {
  let raw = match answer {
    None => String::new(),
    Some(Answer::Flag(b)) => b.to_string(),
    Some(Answer::Text(s)) => s.clone(),
    Some(Answer::Selection(items)) => items
      .iter()
      .map(bool::to_string)
      .collect::<Vec<_>>()
      .join(","),
    Some(Answer::Other(v)) => json_text(v),
  };
  canonical_text(&raw)
}

pub fn normalize_input_scalar(value: &AnswerScalar) -> String {
  match value {
    AnswerScalar::Bool(b) => canonical_text(&b.to_string()),
    AnswerScalar::Text(s) => canonical_text(s),
  }
}

/// A boolean selection passes through untouched; anything else means nothing
/// was selected, i.e. `option_count` unchecked boxes.
pub fn normalize_checkbox_answer(answer: Option<&Answer>, option_count: usize) -> Vec<bool> {
  match answer {
    Some(Answer::Selection(items)) => items.clone(),
    Some(Answer::Other(serde_json::Value::Array(items))) => {
      let flags: Option<Vec<bool>> = items.iter().map(serde_json::Value::as_bool).collect();
      flags.unwrap_or_else(|| vec![false; option_count])
    }
    _ => vec![false; option_count],
  }
}

fn canonical_text(s: &str) -> String {
  s.to_lowercase().trim().to_string()
}

fn json_text(v: &serde_json::Value) -> String {
  match v {
    serde_json::Value::Null => String::new(),
    serde_json::Value::String(s) => s.clone(),
    serde_json::Value::Array(items) => items.iter().map(json_text).collect::<Vec<_>>().join(","),
    other => other.to_string(),
  }
}
