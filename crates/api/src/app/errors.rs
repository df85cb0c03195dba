use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bankcore_infra::{ErrorKind, ServiceError};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let kind = err.kind();
    let status = match kind {
        ErrorKind::AccountNotFound | ErrorKind::TransactionNotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidAmount
        | ErrorKind::InvalidTransactionShape
        | ErrorKind::InvalidAccountName
        | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ConcurrentModification | ErrorKind::InvalidStatusTransition => {
            StatusCode::CONFLICT
        }
        ErrorKind::Storage => {
            tracing::error!(error = %err, "store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    json_error(status, kind.as_str(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
