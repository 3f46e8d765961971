//! Routes and handlers for the challenge API

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use serde::Deserialize;
use tracing::info;

use packgate_core::{ChallengeRequest, ReleaseIdentity};
use packgate_kube::{
    ConfigMapDriver, ReleaseClient, ResourceManager, SecretsDriver, StorageDriver,
};

use crate::config::StorageKind;
use crate::error::AppError;
use crate::state::AppState;

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/challenge",
            axum::routing::post(deploy_challenge).delete(destroy_challenge),
        )
        .route("/api/health", get(health))
        .with_state(state)
}

/// Release identifiers from the query string
#[derive(Debug, Deserialize)]
struct ReleaseQuery {
    name: Option<String>,
    namespace: Option<String>,
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// `POST /api/challenge?name=<name>&namespace=<namespace>`
///
/// Validation happens before any cluster contact; the cluster client is
/// built fresh per call once the request is known to be well-formed.
async fn deploy_challenge(
    State(state): State<AppState>,
    Query(query): Query<ReleaseQuery>,
    payload: Result<Json<ChallengeRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let identity = ReleaseIdentity::resolve(query.name.as_deref(), query.namespace.as_deref())
        .map_err(AppError::Validation)?;

    let Json(request) =
        payload.map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))?;
    let tree = request.to_values().map_err(AppError::Validation)?;

    let pack = state.pack_cache.get().await.map_err(AppError::PackLoad)?;

    info!(release = %identity, "deploying challenge");

    let _guard = state.locks.acquire(&identity).await;
    let client = release_client(&state).await?;
    client.install_or_upgrade(&pack, &identity, tree).await?;

    Ok(StatusCode::CREATED)
}

/// `DELETE /api/challenge?name=<name>&namespace=<namespace>`
async fn destroy_challenge(
    State(state): State<AppState>,
    Query(query): Query<ReleaseQuery>,
) -> Result<StatusCode, AppError> {
    let identity = ReleaseIdentity::resolve(query.name.as_deref(), query.namespace.as_deref())
        .map_err(AppError::Validation)?;

    info!(release = %identity, "destroying challenge");

    let _guard = state.locks.acquire(&identity).await;
    let client = release_client(&state).await?;
    client.uninstall(&identity).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Build a release client on a fresh cluster context.
async fn release_client(
    state: &AppState,
) -> Result<ReleaseClient<Box<dyn StorageDriver>, ResourceManager>, AppError> {
    let client = kube::Client::try_default()
        .await
        .map_err(packgate_kube::KubeError::Api)?;

    let storage: Box<dyn StorageDriver> = match state.config.driver {
        StorageKind::Secrets => Box::new(SecretsDriver::with_client(client.clone())),
        StorageKind::ConfigMaps => Box::new(ConfigMapDriver::with_client(client.clone())),
    };
    let applier = ResourceManager::new(client).await?;

    Ok(ReleaseClient::new(storage, applier))
}
