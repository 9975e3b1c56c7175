//! Application state: quiz store, live quiz-taking sessions and the grader.
//!
//! Sessions are process-local and nothing about them is persisted. They are
//! dropped on delete, when their quiz is deleted, after sitting idle past the
//! configured limit, or when the map is full and they are the least recently used.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::{load_app_config_from_env, AppConfig, SessionLimits};
use crate::grading::Grader;
use crate::runtime::QuizSession;
use crate::seeds::sample_quiz;
use crate::store::QuizStore;

#[derive(Clone)]
pub struct AppState {
    pub store: QuizStore,
    pub sessions: Arc<RwLock<HashMap<String, QuizSession>>>,
    pub grader: Grader,
    pub session_limits: SessionLimits,
}

impl AppState {
    /// Build state from env: load config, seed the store.
    #[instrument(level = "info", skip_all)]
    pub async fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();
        Self::from_config(cfg).await
    }

    #[instrument(level = "info", skip_all, fields(seed_sample = cfg.seed_sample, bank = cfg.quizzes.len()))]
    pub async fn from_config(cfg: AppConfig) -> Self {
        let store = QuizStore::new();

        for q in cfg.valid_quizzes() {
            let title = q.title.clone();
            if let Err(e) = store.create(q.into_new_quiz()).await {
                error!(target: "quiz", %title, error = %e, "Failed to load bank quiz");
            }
        }

        if cfg.seed_sample {
            if let Err(e) = store.create(sample_quiz()).await {
                error!(target: "quiz", error = %e, "Failed to insert sample quiz");
            }
        }

        let inventory = store.find_all().await.len();
        info!(
            target: "quizbuilder_backend",
            quizzes = inventory,
            unanswered_is_incorrect = cfg.grading.unanswered_is_incorrect,
            "Startup quiz inventory"
        );

        Self {
            store,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            grader: Grader::new(cfg.grading),
            session_limits: cfg.sessions,
        }
    }

    /// Insert a session, first sweeping idle ones and then evicting the least
    /// recently touched until there is room.
    #[instrument(level = "debug", skip(self, s), fields(id = %s.id, quiz_id = %s.quiz_id))]
    pub async fn insert_session(&self, s: QuizSession) {
        let mut sessions = self.sessions.write().await;

        let cutoff = s.touched_at - self.session_limits.idle_ttl();
        let before = sessions.len();
        sessions.retain(|_, live| live.touched_at >= cutoff);
        let expired = before - sessions.len();
        if expired > 0 {
            info!(target: "session", expired, "Expired idle sessions");
        }

        let cap = self.session_limits.max_sessions.max(1);
        while sessions.len() >= cap {
            let oldest = sessions
                .values()
                .min_by_key(|live| live.touched_at)
                .map(|live| live.id.clone());
            let Some(oldest) = oldest else { break };
            sessions.remove(&oldest);
            info!(target: "session", session_id = %oldest, "Evicted least recently used session");
        }

        sessions.insert(s.id.clone(), s);
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<QuizSession> {
        self.sessions.read().await.get(id).cloned()
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn remove_session(&self, id: &str) -> Option<QuizSession> {
        self.sessions.write().await.remove(id)
    }

    /// Drop every session taking `quiz_id`. Returns how many were removed.
    #[instrument(level = "debug", skip(self), fields(%quiz_id))]
    pub async fn remove_sessions_for_quiz(&self, quiz_id: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.quiz_id != quiz_id);
        before - sessions.len()
    }
}
