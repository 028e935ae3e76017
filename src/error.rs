use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::report::ExportError;

/// Handler-level failures that surface as an HTTP error response. Form and
/// storage problems are deliberately absent: those render back into the
/// page so the visitor can retry.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self, "request failed");

        (status, self.to_string()).into_response()
    }
}
