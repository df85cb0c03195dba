use axum::{
    Router,
    routing::{get, post},
};

pub mod accounts;
pub mod system;
pub mod transactions;

/// Router for all ledger endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/accounts", post(accounts::create_account).get(accounts::list_accounts))
        .route("/accounts/:id", get(accounts::get_account))
        .route("/accounts/:id/deposit", post(accounts::deposit))
        .route("/accounts/:id/withdraw", post(accounts::withdraw))
        .route("/accounts/:id/transactions", get(accounts::list_account_transactions))
        .route("/transfers", post(transactions::transfer))
        .route("/transactions", get(transactions::list_transactions))
        .route("/transactions/:id", get(transactions::get_transaction))
}
