use axum::{
    extract::{Path, Query, State},
    http::{
        header::{self, HeaderMap, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::chart::ChartState;
use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::orchestrator::RequestOutcome;
use crate::selectors::Selectors;

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChartQuery {
    /// Response format: json (default) or csv
    #[serde(default = "default_format")]
    pub format: String,
}

/// New selection; omitted fields keep their current value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SelectionRequest {
    pub device: Option<String>,
    pub timeframe: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub selectors: Selectors,
    pub chart: ChartState,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChartUpdateResponse {
    pub outcome: RequestOutcome,
    pub chart: ChartState,
}

fn determine_format(query_format: &str, headers: &HeaderMap) -> String {
    // Query parameter takes precedence
    if query_format != "json" {
        return query_format.to_lowercase();
    }

    if let Some(accept) = headers.get(header::ACCEPT)
        && let Ok(accept_str) = accept.to_str()
        && accept_str.contains("text/csv")
    {
        return "csv".to_string();
    }

    "json".to_string()
}

/// Render the chart's labels and datasets as CSV, one row per label.
pub fn chart_to_csv(chart: &ChartState) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header_row = vec!["time".to_string()];
    header_row.extend(chart.data.datasets.iter().map(|d| d.label.clone()));
    writer
        .write_record(&header_row)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    for (i, millis) in chart.data.labels.iter().enumerate() {
        let time = DateTime::from_timestamp_millis(*millis)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let mut row = vec![time];
        for dataset in &chart.data.datasets {
            // Empty cell for a missing reading
            row.push(
                dataset
                    .data
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        writer
            .write_record(&row)
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Default selector contents
#[utoipa::path(
    get,
    path = "/api/selectors",
    responses(
        (status = 200, description = "Device and timeframe selectors", body = Selectors),
    ),
    tag = "selectors"
)]
pub async fn get_selectors(State(state): State<AppState>) -> Json<Selectors> {
    Json(state.selectors.as_ref().clone())
}

/// Open a chart session for one page
///
/// The session starts on the first device and timeframe with an empty chart.
#[utoipa::path(
    post,
    path = "/api/sessions",
    responses(
        (status = 201, description = "Session opened", body = SessionResponse),
    ),
    tag = "sessions"
)]
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let (id, session) = state.open_session().await;

    let body = SessionResponse {
        id,
        selectors: session.selectors().await,
        chart: session.chart().await,
    };

    (StatusCode::CREATED, Json(body))
}

/// Current selection and chart of a session
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 404, description = "Unknown or expired session"),
    ),
    tag = "sessions"
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.session(id).await?;

    Ok(Json(SessionResponse {
        id,
        selectors: session.selectors().await,
        chart: session.chart().await,
    }))
}

/// Change the selection and reload the chart
///
/// Backend failures do not fail this call: the outcome is `failed` and the
/// chart is returned unchanged.
#[utoipa::path(
    put,
    path = "/api/sessions/{id}/selection",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection applied, chart requested", body = ChartUpdateResponse),
        (status = 400, description = "Unknown device or timeframe"),
        (status = 404, description = "Unknown or expired session"),
    ),
    tag = "chart"
)]
pub async fn put_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(selection): Json<SelectionRequest>,
) -> AppResult<Json<ChartUpdateResponse>> {
    let session = state.session(id).await?;

    let outcome = session
        .select(selection.device.as_deref(), selection.timeframe.as_deref())
        .await?;
    let chart = session.chart().await;

    Ok(Json(ChartUpdateResponse { outcome, chart }))
}

/// Reload the chart for the session's current selection
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/refresh",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Chart requested", body = ChartUpdateResponse),
        (status = 404, description = "Unknown or expired session"),
    ),
    tag = "chart"
)]
pub async fn refresh_chart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ChartUpdateResponse>> {
    let session = state.session(id).await?;

    let outcome = session.refresh().await;
    let chart = session.chart().await;

    Ok(Json(ChartUpdateResponse { outcome, chart }))
}

/// Current chart of a session
///
/// Returns the Chart.js configuration as JSON, or the charted series as CSV.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/chart",
    params(("id" = Uuid, Path, description = "Session id"), ChartQuery),
    responses(
        (status = 200, description = "Chart configuration", body = ChartState),
        (status = 400, description = "Unsupported format"),
        (status = 404, description = "Unknown or expired session"),
    ),
    tag = "chart"
)]
pub async fn get_chart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let chart = state.session(id).await?.chart().await;

    match determine_format(&query.format, &headers).as_str() {
        "json" => Ok(Json(chart).into_response()),
        "csv" => {
            let body = chart_to_csv(&chart)?;
            Ok((
                [(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))],
                body,
            )
                .into_response())
        }
        other => Err(AppError::BadRequest(format!("Unsupported format '{other}'"))),
    }
}
