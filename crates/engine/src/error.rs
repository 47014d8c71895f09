//! Unified error handling for the engine's HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::SyncError;

/// Application-level error type for the trigger API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Sync engine operation failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(repository) | Self::Sync(SyncError::Repository(repository)) => {
                repository_status(repository)
            }
            Self::Sync(SyncError::AccountNotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Sync(SyncError::OwnerMismatch(_)) => StatusCode::FORBIDDEN,
            Self::Sync(SyncError::AccountDisconnected(_)) => StatusCode::CONFLICT,
            Self::Sync(SyncError::MarketplaceNotAccessible(_) | SyncError::SpApi(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Database(repository) | Self::Sync(SyncError::Repository(repository)) => {
                repository_message(repository)
            }
            Self::Sync(SyncError::SpApi(_)) => "Upstream service error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn repository_message(error: &RepositoryError) -> String {
    match error {
        RepositoryError::NotFound => "Not found".to_string(),
        RepositoryError::Conflict(message) => format!("Conflict: {message}"),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            "Internal server error".to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Engine request error"
            );
        }

        (status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spapi::SpApiError;
    use sellerglass_core::AccountId;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        // Test that errors map to correct HTTP status codes
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "duplicate SKU".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Sync(SyncError::AccountNotFound(
                AccountId::generate()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Sync(SyncError::OwnerMismatch(
                AccountId::generate()
            ))),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Sync(SyncError::AccountDisconnected(
                AccountId::generate()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Sync(SyncError::SpApi(
                SpApiError::AuthenticationFailed("revoked".to_string())
            ))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Sync(SyncError::Repository(
                RepositoryError::NotFound
            ))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_public_message_hides_internals() {
        let err = AppError::Internal("connection string leaked".to_string());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::Database(RepositoryError::DataCorruption("row 42".to_string()));
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::Sync(SyncError::SpApi(SpApiError::AuthenticationFailed(
            "token body".to_string(),
        )));
        assert_eq!(err.public_message(), "Upstream service error");
    }

    #[test]
    fn test_public_message_exposes_domain_errors() {
        let err = AppError::Database(RepositoryError::Conflict("overlapping window".to_string()));
        assert_eq!(err.public_message(), "Conflict: overlapping window");

        let id = AccountId::generate();
        let err = AppError::Sync(SyncError::AccountDisconnected(id));
        assert_eq!(
            err.public_message(),
            format!("account {id} is disconnected; reconnect it before syncing")
        );
    }
}
