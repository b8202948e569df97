pub mod chart;
pub mod health;
pub mod page;
mod rate_limit;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::ClientIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::error::{AppError, AppResult};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        chart::get_selectors,
        chart::create_session,
        chart::get_session,
        chart::put_selection,
        chart::refresh_chart,
        chart::get_chart,
    ),
    components(
        schemas(
            crate::selectors::Selectors,
            crate::selectors::SelectControl,
            crate::selectors::SelectOption,
            crate::chart::ChartState,
            crate::chart::Dataset,
            crate::orchestrator::RequestOutcome,
            chart::SelectionRequest,
            chart::SessionResponse,
            chart::ChartUpdateResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "selectors", description = "Device and timeframe selectors"),
        (name = "sessions", description = "Per-page chart sessions"),
        (name = "chart", description = "Chart configuration and reloads"),
    ),
    info(
        title = "Sensor Chart API",
        description = "Chart gateway for temperature, humidity and pressure sensor series",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// Build the application router.
///
/// # Errors
///
/// Returns `AppError::Internal` when the rate limiter rejects its settings
/// (zero rate or burst).
pub fn build_router(state: AppState) -> AppResult<Router> {
    let config = &state.config;

    let api_routes_base = Router::new()
        .route("/selectors", get(chart::get_selectors))
        .route("/sessions", post(chart::create_session))
        .route("/sessions/{id}", get(chart::get_session))
        .route("/sessions/{id}/selection", put(chart::put_selection))
        .route("/sessions/{id}/refresh", post(chart::refresh_chart))
        .route("/sessions/{id}/chart", get(chart::get_chart));

    let api_routes = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        api_routes_base
    } else {
        tracing::info!(
            rate = %format!("{}/s burst {}", config.rate_limit_per_second, config.rate_limit_burst),
            "Rate limiting configured"
        );

        let limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .finish()
            .ok_or_else(|| {
                AppError::Internal("rate limit per second and burst must be non-zero".to_string())
            })?;

        api_routes_base.layer(GovernorLayer {
            config: Arc::new(limiter),
        })
    }
    .layer(RequestBodyLimitLayer::new(64 * 1024));

    // Page and health check (NO rate limiting)
    let page_routes = Router::new()
        .route("/", get(page::chart_page))
        .route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Ok(Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
