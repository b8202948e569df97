//! Per-page chart sessions.
//!
//! Every page that loads opens its own session: a selection, a chart and a
//! generation counter of its own. Requests from one page never discard or
//! overwrite another page's chart. Sessions expire after a period without
//! requests.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::SeriesSource;
use crate::chart::{ChartState, TimestampParser, CHART_CANVAS_ID};
use crate::orchestrator::{RequestOrchestrator, RequestOutcome};
use crate::selectors::Selectors;

/// Open sessions by id, evicted after `SESSION_IDLE_SECONDS` without a lookup.
pub type SessionStore = Cache<Uuid, Arc<ChartSession>>;

#[must_use]
pub fn session_store(max_sessions: u64, idle: Duration) -> SessionStore {
    Cache::builder()
        .max_capacity(max_sessions)
        .time_to_idle(idle)
        .build()
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Unknown device '{0}'")]
    UnknownDevice(String),

    #[error("Unknown timeframe '{0}'")]
    UnknownTimeframe(String),
}

pub struct ChartSession {
    selectors: RwLock<Selectors>,
    orchestrator: RequestOrchestrator,
}

impl ChartSession {
    /// New session showing `selectors` (normally the configured defaults) and
    /// a freshly initialized, empty chart.
    #[must_use]
    pub fn new(selectors: Selectors, source: Arc<dyn SeriesSource>) -> Self {
        let chart = ChartState::initialize(CHART_CANVAS_ID, TimestampParser::default());

        Self {
            selectors: RwLock::new(selectors),
            orchestrator: RequestOrchestrator::new(source, chart),
        }
    }

    pub async fn selectors(&self) -> Selectors {
        self.selectors.read().await.clone()
    }

    pub async fn chart(&self) -> ChartState {
        self.orchestrator.chart().await
    }

    #[must_use]
    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }

    /// Change the selection and request the chart for it.
    ///
    /// Both values are checked before either is applied. The request is issued
    /// while the selection is still locked, so generation order follows
    /// selection order.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` for a value the selector does not offer; the
    /// selection is then unchanged and nothing is requested.
    pub async fn select(
        &self,
        device: Option<&str>,
        timeframe: Option<&str>,
    ) -> Result<RequestOutcome, SelectionError> {
        let request = {
            let mut selectors = self.selectors.write().await;

            if let Some(device) = device
                && !selectors.device.contains(device)
            {
                return Err(SelectionError::UnknownDevice(device.to_string()));
            }
            if let Some(timeframe) = timeframe
                && !selectors.timeframe.contains(timeframe)
            {
                return Err(SelectionError::UnknownTimeframe(timeframe.to_string()));
            }

            if let Some(device) = device {
                selectors.device.select(device);
            }
            if let Some(timeframe) = timeframe {
                selectors.timeframe.select(timeframe);
            }

            self.orchestrator.begin(&selectors)
        };

        Ok(self.orchestrator.run(request).await)
    }

    /// Request the chart for the current selection.
    pub async fn refresh(&self) -> RequestOutcome {
        let request = {
            let selectors = self.selectors.read().await;
            self.orchestrator.begin(&selectors)
        };

        self.orchestrator.run(request).await
    }
}
