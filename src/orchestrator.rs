//! Fetches series for the selected device and timeframe and applies them to
//! the chart.
//!
//! Requests may overlap. Every request gets a generation token when it is
//! issued, and a response is only applied if its token is still the latest
//! one, so the most recently issued request wins regardless of the order in
//! which responses arrive.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::backend::SeriesSource;
use crate::chart::{ChartData, ChartState};
use crate::selectors::Selectors;

/// Request path for a selection: `/` + timeframe + `/` + device.
#[must_use]
pub fn request_path(timeframe: &str, device: &str) -> String {
    format!("/{timeframe}/{device}")
}

/// An issued but not yet completed chart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub generation: u64,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestOutcome {
    /// Response applied to the chart
    Applied,
    /// A newer request was issued before this one completed; its response,
    /// or its failure, was discarded
    Stale,
    /// Fetch, decode or chart update failed; the chart was not touched
    Failed,
    /// A selector had no options, nothing was requested
    Skipped,
}

pub struct RequestOrchestrator {
    source: Arc<dyn SeriesSource>,
    chart: RwLock<ChartState>,
    generation: AtomicU64,
}

impl RequestOrchestrator {
    #[must_use]
    pub fn new(source: Arc<dyn SeriesSource>, chart: ChartState) -> Self {
        Self {
            source,
            chart: RwLock::new(chart),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current chart.
    pub async fn chart(&self) -> ChartState {
        self.chart.read().await.clone()
    }

    /// Generation of the most recently issued request (0 before the first).
    #[must_use]
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Read the current selection and issue a request for it.
    ///
    /// Returns `None` when either selector has nothing selected.
    pub fn begin(&self, selectors: &Selectors) -> Option<ChartRequest> {
        let timeframe = selectors.timeframe.value()?;
        let device = selectors.device.value()?;

        let path = request_path(timeframe, device);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, path = %path, "chart request issued");

        Some(ChartRequest { generation, path })
    }

    /// Fetch the series for `request` and apply them if no newer request has
    /// been issued meanwhile. Failures are logged and otherwise swallowed.
    pub async fn execute(&self, request: ChartRequest) -> RequestOutcome {
        let response = match self.source.fetch(&request.path).await {
            Ok(r) => r,
            Err(e) => {
                // A superseded request would have been discarded anyway.
                let latest = self.latest_generation();
                if request.generation != latest {
                    tracing::debug!(
                        error = %e,
                        path = %request.path,
                        generation = request.generation,
                        latest,
                        "superseded chart request failed"
                    );
                    return RequestOutcome::Stale;
                }

                tracing::error!(
                    error = %e,
                    path = %request.path,
                    generation = request.generation,
                    "chart request failed"
                );
                return RequestOutcome::Failed;
            }
        };

        // Token check and mutation happen under the same lock.
        let mut chart = self.chart.write().await;

        let latest = self.latest_generation();
        if request.generation != latest {
            tracing::debug!(
                generation = request.generation,
                latest,
                path = %request.path,
                "discarding stale chart response"
            );
            return RequestOutcome::Stale;
        }

        match chart.update(ChartData::from(response)) {
            Ok(()) => RequestOutcome::Applied,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %request.path,
                    generation = request.generation,
                    "chart request failed"
                );
                RequestOutcome::Failed
            }
        }
    }

    /// Issue and run a request for the current selection.
    pub async fn request_chart(&self, selectors: &Selectors) -> RequestOutcome {
        let request = self.begin(selectors);
        self.run(request).await
    }

    /// Execute a request returned by [`Self::begin`], or report a skip.
    pub async fn run(&self, request: Option<ChartRequest>) -> RequestOutcome {
        match request {
            Some(request) => self.execute(request).await,
            None => {
                tracing::warn!("chart request skipped: device or timeframe list is empty");
                RequestOutcome::Skipped
            }
        }
    }
}
