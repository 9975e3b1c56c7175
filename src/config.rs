//! Loading application configuration (grading policy + optional quiz bank) from TOML.
//!
//! Example:
//!
//! ```toml
//! seed_sample = true
//!
//! [grading]
//! unanswered_is_incorrect = false
//!
//! [sessions]
//! idle_minutes = 60
//! max_sessions = 10000
//!
//! [[quizzes]]
//! title = "Rust basics"
//!
//! [[quizzes.questions]]
//! type = "INPUT"
//! text = "Keyword for an immutable binding?"
//! correctAnswers = ["let"]
//! ```

use serde::Deserialize;
use tracing::{error, info};
use validator::Validate;

use crate::grading::GradingPolicy;
use crate::protocol::CreateQuizIn;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
  /// Insert the built-in sample quiz at startup.
  #[serde(default = "default_seed_sample")]
  pub seed_sample: bool,
  #[serde(default)]
  pub grading: GradingPolicy,
  #[serde(default)]
  pub sessions: SessionLimits,
  /// Quizzes preloaded into the store; same shape as the create endpoint body.
  #[serde(default)]
  pub quizzes: Vec<CreateQuizIn>,
}

fn default_seed_sample() -> bool {
  true
}

/// Bounds on the in-memory session map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct SessionLimits {
  /// Sessions untouched for this long are dropped when a new one is opened.
  #[serde(default = "default_idle_minutes")]
  pub idle_minutes: u32,
  /// Upper bound on live sessions; the least recently touched go first.
  #[serde(default = "default_max_sessions")]
  pub max_sessions: usize,
}

fn default_idle_minutes() -> u32 {
  60
}

fn default_max_sessions() -> usize {
  10_000
}

impl Default for SessionLimits {
  fn default() -> Self {
    Self { idle_minutes: default_idle_minutes(), max_sessions: default_max_sessions() }
  }
}

impl SessionLimits {
  pub fn idle_ttl(&self) -> chrono::Duration {
    chrono::Duration::minutes(i64::from(self.idle_minutes))
  }
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      seed_sample: true,
      grading: GradingPolicy::default(),
      sessions: SessionLimits::default(),
      quizzes: Vec::new(),
    }
  }
}

impl AppConfig {
  /// Drop bank entries that would be rejected by the create endpoint.
  pub fn valid_quizzes(&self) -> Vec<CreateQuizIn> {
    self
      .quizzes
      .iter()
      .filter(|q| match q.validate() {
        Ok(()) => true,
        Err(e) => {
          error!(target: "quizbuilder_backend", title = %q.title, error = %e, "Skipping bank quiz: invalid");
          false
        }
      })
      .cloned()
      .collect()
  }
}

pub fn parse_app_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "quizbuilder_backend", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizbuilder_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quizbuilder_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
