use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::services::SharedLedger;
use crate::app::{dto, errors};

pub async fn transfer(
    Extension(ledger): Extension<SharedLedger>,
    Json(body): Json<dto::TransferRequest>,
) -> axum::response::Response {
    let from = match dto::parse_account_id(&body.from_account_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let to = match dto::parse_account_id(&body.to_account_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let amount = match dto::parse_amount(body.amount) {
        Ok(amount) => amount,
        Err(resp) => return resp,
    };

    let description = body.description.unwrap_or_default();
    match ledger.transfer(from, to, amount, &description).await {
        Ok(tx) => (StatusCode::CREATED, Json(tx)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_transactions(
    Extension(ledger): Extension<SharedLedger>,
) -> axum::response::Response {
    match ledger.list_transactions().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_transaction(
    Extension(ledger): Extension<SharedLedger>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_transaction_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match ledger.get_transaction(id).await {
        Ok(tx) => (StatusCode::OK, Json(tx)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
