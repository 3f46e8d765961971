//! HTTP error mapping

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use packgate_core::CoreError;
use packgate_kube::KubeError;
use serde_json::json;

/// Errors a handler can surface to the caller
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed query string or request body
    #[error("{0}")]
    BadRequest(String),

    /// A required field is missing or malformed
    #[error("{0}")]
    Validation(CoreError),

    /// The pack artifact could not be loaded (poisoned until restart)
    #[error("{0}")]
    PackLoad(Arc<CoreError>),

    /// The cluster rejected or failed the operation
    #[error("{0}")]
    Cluster(#[from] KubeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PackLoad(_) | Self::Cluster(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = AppError::Validation(CoreError::validation("name", "release name is required"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = AppError::Cluster(KubeError::OperationFailed("denied".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::PackLoad(Arc::new(CoreError::PackNotFound {
            path: "/app/packs/challenge.tgz".to_string(),
        }));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
