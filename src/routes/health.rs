use axum::http::StatusCode;

/// Liveness probe
///
/// Always 200 while the process is serving. Backend reachability is not
/// checked here; failed chart requests only show up in the logs.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is up"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
