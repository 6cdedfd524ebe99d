use axum::Json;
use common::api::HealthBody;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health/",
    tag = "Health",
    operation_id = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthBody),
    ),
)]
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_string(),
    })
}
