use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over in-memory stores, bound to an ephemeral port.
        let app = bankcore_api::app::build_app(bankcore_api::app::services::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn open_account(&self, name: &str, initial_balance: &str) -> String {
        let (status, body) = self
            .post(
                "/accounts",
                json!({ "name": name, "initial_balance": initial_balance }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn balance(&self, id: &str) -> String {
        let (status, body) = self.get(&format!("/accounts/{id}")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["balance"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn deposit_completes_and_updates_balance() {
    let srv = TestServer::spawn().await;
    let id = srv.open_account("Alice", "0").await;

    let (status, tx) = srv
        .post(
            &format!("/accounts/{id}/deposit"),
            json!({ "amount": "100.00", "description": "Initial" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{tx}");
    assert_eq!(tx["type"], "DEPOSIT");
    assert_eq!(tx["status"], "COMPLETED");
    assert_eq!(tx["amount"], "100.00");
    assert_eq!(tx["to_account_id"], id.as_str());
    assert!(tx["from_account_id"].is_null());

    assert_eq!(srv.balance(&id).await, "100.00");
}

#[tokio::test]
async fn overdraft_is_rejected_and_recorded_as_failed() {
    let srv = TestServer::spawn().await;
    let id = srv.open_account("Bob", "50.00").await;

    let (status, body) = srv
        .post(&format!("/accounts/{id}/withdraw"), json!({ "amount": "80.00" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "insufficient_funds");

    assert_eq!(srv.balance(&id).await, "50.00");

    let (status, history) = srv.get(&format!("/accounts/{id}/transactions")).await;
    assert_eq!(status, StatusCode::OK);
    let items = history["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "WITHDRAWAL");
    assert_eq!(items[0]["status"], "FAILED");
}

#[tokio::test]
async fn transfer_moves_money_between_accounts() {
    let srv = TestServer::spawn().await;
    let a = srv.open_account("A", "200.00").await;
    let b = srv.open_account("B", "0").await;

    let (status, tx) = srv
        .post(
            "/transfers",
            json!({
                "from_account_id": a,
                "to_account_id": b,
                "amount": "75.50",
                "description": "rent",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{tx}");
    assert_eq!(tx["type"], "TRANSFER");
    assert_eq!(tx["status"], "COMPLETED");

    assert_eq!(srv.balance(&a).await, "124.50");
    assert_eq!(srv.balance(&b).await, "75.50");

    let tx_id = tx["id"].as_str().unwrap();
    let (status, fetched) = srv.get(&format!("/transactions/{tx_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, tx);

    let (_, all) = srv.get("/transactions").await;
    assert_eq!(all["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_positive_amount_is_bad_request_and_leaves_no_trace() {
    let srv = TestServer::spawn().await;
    let id = srv.open_account("Carol", "10.00").await;

    let (status, body) = srv
        .post(&format!("/accounts/{id}/deposit"), json!({ "amount": "-5" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_transaction_shape");

    assert_eq!(srv.balance(&id).await, "10.00");
    let (_, history) = srv.get(&format!("/accounts/{id}/transactions")).await;
    assert!(history["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn transfer_to_same_account_is_invalid_shape() {
    let srv = TestServer::spawn().await;
    let id = srv.open_account("Dan", "10.00").await;

    let (status, body) = srv
        .post(
            "/transfers",
            json!({ "from_account_id": id, "to_account_id": id, "amount": "1.00" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_transaction_shape");
    assert_eq!(srv.balance(&id).await, "10.00");
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let srv = TestServer::spawn().await;

    let missing = bankcore_core::AccountId::new();
    let (status, body) = srv.get(&format!("/accounts/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "account_not_found");

    let (status, body) = srv
        .post(&format!("/accounts/{missing}/deposit"), json!({ "amount": "1" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "account_not_found");

    let (status, body) = srv.get("/accounts/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let missing_tx = bankcore_core::TransactionId::new();
    let (status, body) = srv.get(&format!("/transactions/{missing_tx}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "transaction_not_found");
}

#[tokio::test]
async fn blank_name_is_rejected_and_accounts_are_listed_oldest_first() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.post("/accounts", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_account_name");

    let first = srv.open_account("First", "1").await;
    let second = srv.open_account("Second", "2").await;

    let (status, body) = srv.get("/accounts").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
}

#[tokio::test]
async fn amounts_beyond_the_supported_range_are_bad_requests() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post(
            "/accounts",
            json!({ "name": "Huge", "initial_balance": "79228162514264337593543950335" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_amount");

    let max = "999999999999999999.99";
    let id = srv.open_account("Big", max).await;

    let (status, body) = srv
        .post(&format!("/accounts/{id}/deposit"), json!({ "amount": max }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_amount");
    assert_eq!(srv.balance(&id).await, max);

    let (status, body) = srv
        .post(
            &format!("/accounts/{id}/withdraw"),
            json!({ "amount": "1000000000000000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_amount");
}
