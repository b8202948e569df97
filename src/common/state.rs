use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::backend::SeriesSource;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::selectors::{populate_selectors, Selectors};
use crate::session::{session_store, ChartSession, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Selectors as populated from configuration; every new session starts here.
    pub selectors: Arc<Selectors>,
    pub source: Arc<dyn SeriesSource>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn SeriesSource>) -> Self {
        let selectors = populate_selectors(&config.devices, &config.timeframes);
        let sessions = session_store(
            config.max_sessions,
            Duration::from_secs(config.session_idle_seconds),
        );

        Self {
            config: Arc::new(config),
            selectors: Arc::new(selectors),
            source,
            sessions,
        }
    }

    /// Open a session with the default selection and an empty chart.
    pub async fn open_session(&self) -> (Uuid, Arc<ChartSession>) {
        let id = Uuid::new_v4();
        let session = Arc::new(ChartSession::new(
            self.selectors.as_ref().clone(),
            Arc::clone(&self.source),
        ));

        self.sessions.insert(id, Arc::clone(&session)).await;
        tracing::debug!(session = %id, "chart session opened");

        (id, session)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown or expired session.
    pub async fn session(&self, id: Uuid) -> AppResult<Arc<ChartSession>> {
        self.sessions
            .get(&id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }
}
