use axum::Json;
use axum::extract::{Path, State};
use common::api::{ErrorBody, ProviderStatusBody, ProviderTestBody};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// List the known AI providers and their configuration state.
#[utoipa::path(
    get,
    path = "/api/providers/",
    tag = "Providers",
    operation_id = "listProviders",
    responses(
        (status = 200, description = "Provider listing", body = Vec<ProviderStatusBody>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_providers(State(state): State<AppState>) -> Json<Vec<ProviderStatusBody>> {
    let bodies = state
        .providers
        .statuses()
        .into_iter()
        .map(|s| ProviderStatusBody {
            name: s.name.to_string(),
            configured: s.configured,
            model: s.model,
            is_default: s.is_default,
        })
        .collect();
    Json(bodies)
}

/// Run a live round-trip probe against one provider.
#[utoipa::path(
    post,
    path = "/api/providers/{name}/test/",
    tag = "Providers",
    operation_id = "testProvider",
    params(("name" = String, Path, description = "Provider name (openai, grok, gemini)")),
    responses(
        (status = 200, description = "Probe result; `success` reflects the outcome", body = ProviderTestBody),
        (status = 400, description = "Unknown or unconfigured provider", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(provider = %name))]
pub async fn test_provider(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ProviderTestBody>, AppError> {
    let outcome = state.providers.test_connection(&name).await?;
    Ok(Json(ProviderTestBody {
        provider: outcome.provider,
        success: outcome.success,
        message: outcome.message,
    }))
}
