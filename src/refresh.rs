use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::common::AppState;
use crate::orchestrator::RequestOutcome;
use crate::session::ChartSession;

/// Re-request every open session's chart on a fixed interval.
///
/// Returns immediately when `REFRESH_INTERVAL_SECONDS` is 0. Failures are
/// already logged by the orchestrator; the next tick simply tries again.
pub async fn run_chart_refresh(state: AppState) {
    let interval_secs = state.config.refresh_interval_seconds;
    if interval_secs == 0 {
        tracing::info!("Periodic chart refresh disabled");
        return;
    }

    tracing::info!(interval_secs, "Starting chart refresh scheduler");

    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let refreshed = refresh_sessions(&state).await;
        tracing::debug!(sessions = refreshed, "Chart refresh tick complete");
    }
}

/// Refresh each open session for its own selection. Returns how many sessions
/// were visited.
///
/// Iterating does not count as use, so abandoned sessions still expire.
pub async fn refresh_sessions(state: &AppState) -> usize {
    let sessions: Vec<Arc<ChartSession>> =
        state.sessions.iter().map(|(_, session)| session).collect();

    for session in &sessions {
        if session.refresh().await == RequestOutcome::Stale {
            tracing::debug!("Chart refresh superseded by a newer request");
        }
    }

    sessions.len()
}
