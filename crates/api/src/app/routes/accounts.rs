use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::services::SharedLedger;
use crate::app::{dto, errors};

pub async fn create_account(
    Extension(ledger): Extension<SharedLedger>,
    Json(body): Json<dto::CreateAccountRequest>,
) -> axum::response::Response {
    let initial_balance = match body.initial_balance.map(dto::parse_amount).transpose() {
        Ok(balance) => balance,
        Err(resp) => return resp,
    };

    match ledger.create_account(&body.name, initial_balance).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_accounts(Extension(ledger): Extension<SharedLedger>) -> axum::response::Response {
    match ledger.list_accounts().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_account(
    Extension(ledger): Extension<SharedLedger>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_account_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match ledger.get_account(id).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn deposit(
    Extension(ledger): Extension<SharedLedger>,
    Path(id): Path<String>,
    Json(body): Json<dto::MovementRequest>,
) -> axum::response::Response {
    let id = match dto::parse_account_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let amount = match dto::parse_amount(body.amount) {
        Ok(amount) => amount,
        Err(resp) => return resp,
    };

    let description = body.description.unwrap_or_default();
    match ledger.deposit(id, amount, &description).await {
        Ok(tx) => (StatusCode::CREATED, Json(tx)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(ledger): Extension<SharedLedger>,
    Path(id): Path<String>,
    Json(body): Json<dto::MovementRequest>,
) -> axum::response::Response {
    let id = match dto::parse_account_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let amount = match dto::parse_amount(body.amount) {
        Ok(amount) => amount,
        Err(resp) => return resp,
    };

    let description = body.description.unwrap_or_default();
    match ledger.withdraw(id, amount, &description).await {
        Ok(tx) => (StatusCode::CREATED, Json(tx)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_account_transactions(
    Extension(ledger): Extension<SharedLedger>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_account_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match ledger.list_transactions_for_account(id).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
