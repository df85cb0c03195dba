use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use bankcore_banking::Money;
use bankcore_core::{AccountId, TransactionId};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------
//
// Amounts arrive as raw decimals and become `Money` in the handler, so an
// out-of-range value is answered like any other invalid amount.

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(default)]
    pub initial_balance: Option<Decimal>,
}

/// Body of `/accounts/:id/deposit` and `/accounts/:id/withdraw`.
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

// -------------------------
// Amount and id parsing
// -------------------------

pub fn parse_amount(raw: Decimal) -> Result<Money, axum::response::Response> {
    Money::new(raw).map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_amount", e.to_string())
    })
}

pub fn parse_account_id(raw: &str) -> Result<AccountId, axum::response::Response> {
    raw.parse()
        .map_err(|e: bankcore_core::DomainError| {
            errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string())
        })
}

pub fn parse_transaction_id(raw: &str) -> Result<TransactionId, axum::response::Response> {
    raw.parse()
        .map_err(|e: bankcore_core::DomainError| {
            errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string())
        })
}
