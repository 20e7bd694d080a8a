mod common;

use algo_dashboard::error::{CANCELLED_NOTICE, CONNECT_FAILED_NOTICE};
use common::TestEnvironment;
use reqwest::StatusCode;
use serde_json::json;

const RECIPIENT: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    let body = env.http.get(env.url("/health")).send().await?.text().await?;
    assert_eq!(body, "OK");
    Ok(())
}

#[tokio::test]
async fn test_connect_loads_account_data() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    env.ledger.fund(&env.wallet_address, 5_000_000)?;
    env.ledger.add_asset(&env.wallet_address, 10, 3, false)?;

    let before = env.get_json("/api/dashboard").await?;
    assert!(before["address"].is_null());

    let address = env.connect().await?;
    assert_eq!(address, env.wallet_address);

    let state = env.get_json("/api/dashboard").await?;
    assert_eq!(state["address"], json!(env.wallet_address));
    assert_eq!(state["balance"], json!("5"));
    assert_eq!(state["assets"], json!([{"id": 10, "amount": 3, "is_frozen": false}]));
    assert_eq!(state["genesis"]["id"], json!("mocknet-v1.0"));

    // Persisted for the next start
    let stored = std::fs::read_to_string(env.temp_dir.path().join("connected_address.txt"))?;
    assert_eq!(stored.trim(), env.wallet_address);
    Ok(())
}

#[tokio::test]
async fn test_rejected_connect() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;

    let http = env.http.clone();
    let url = env.url("/api/session/connect");
    let request = tokio::spawn(async move { http.post(url).send().await });

    let approval = env.next_approval().await?;
    assert_eq!(approval["request"]["kind"], json!("connect"));
    env.decide(approval["id"].as_str().unwrap(), false).await?;

    let response = request.await??;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["notice"], json!(CONNECT_FAILED_NOTICE));

    assert!(env.get_json("/api/dashboard").await?["address"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_send_confirm_and_history() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    env.ledger.fund(&env.wallet_address, 5_000_000)?;
    env.connect().await?;

    let http = env.http.clone();
    let url = env.url("/api/transactions");
    let request = tokio::spawn(async move {
        http.post(url)
            .json(&json!({"recipient": RECIPIENT, "amount": "1.5"}))
            .send()
            .await
    });

    let approval = env.next_approval().await?;
    assert_eq!(approval["request"]["kind"], json!("sign"));
    assert_eq!(approval["request"]["txn_type"], json!("pay"));
    assert_eq!(approval["request"]["amount_microalgos"], json!(1_500_000));
    env.decide(approval["id"].as_str().unwrap(), true).await?;

    let response = request.await??;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let tx_id = body["tx_id"].as_str().unwrap().to_string();
    assert_eq!(tx_id.len(), 52);
    assert_eq!(
        body["notice"],
        json!(format!("Transaction successful with ID: {}", tx_id))
    );

    let state: serde_json::Value = env.http.post(env.url("/api/refresh")).send().await?.json().await?;
    assert_eq!(state["pending"].as_array().map(|p| p.len()), Some(1));
    assert_eq!(state["pending"][0]["amount"], json!("1.5"));

    env.http
        .post(format!("{}/mock/confirm", env.node_url))
        .send()
        .await?;

    let state: serde_json::Value = env.http.post(env.url("/api/refresh")).send().await?.json().await?;
    assert_eq!(state["pending"], json!([]));
    assert_eq!(state["balance"], json!("3.499"));
    assert_eq!(state["history"].as_array().map(|h| h.len()), Some(1));
    assert_eq!(state["history"][0]["hash"], json!(tx_id));
    assert_eq!(env.ledger.last_history_limit()?, Some(10));
    assert_eq!(state["transfers"][0]["amount"], json!(1.5));
    assert_eq!(state["transfers"][0]["sum_out"], json!(1.5));
    Ok(())
}

/// Approve every request the wallet raises until `done` finishes
async fn approving<T>(
    env: &TestEnvironment,
    done: tokio::task::JoinHandle<T>,
) -> anyhow::Result<T> {
    while !done.is_finished() {
        if let Some(first) = env.manager.approvals.list().first() {
            env.decide(&first.id, true).await?;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    Ok(done.await?)
}

#[tokio::test]
async fn test_deploy_store_and_read_contract() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    env.ledger.fund(&env.wallet_address, 5_000_000)?;
    env.connect().await?;
    let confirmer = env.auto_confirm();

    let http = env.http.clone();
    let url = env.url("/api/smart-contract/deploy");
    let deploy = tokio::spawn(async move {
        http.post(url)
            .json(&json!({"code": "#pragma version 6\nint 1\nreturn"}))
            .send()
            .await
    });
    let response = approving(&env, deploy).await??;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let app_id = body["appId"].as_u64().unwrap();
    assert_eq!(body["txId"].as_str().map(str::len), Some(52));

    // Nothing stored yet
    let response = env
        .http
        .post(env.url("/api/smart-contract/interact"))
        .json(&json!({"appId": app_id, "action": "read"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let http = env.http.clone();
    let url = env.url("/api/smart-contract/interact");
    let store = tokio::spawn(async move {
        http.post(url)
            .json(&json!({"appId": app_id, "action": "store", "value": "hello"}))
            .send()
            .await
    });
    let response = approving(&env, store).await??;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], json!("Value stored successfully"));

    let body: serde_json::Value = env
        .http
        .post(env.url("/api/smart-contract/interact"))
        .json(&json!({"appId": app_id, "action": "read"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["stored_value"], json!("aGVsbG8="));
    assert_eq!(body["text"], json!("hello"));

    confirmer.abort();
    Ok(())
}

#[tokio::test]
async fn test_contract_requests_are_validated() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    env.connect().await?;

    for body in [
        json!({"action": "read"}),
        json!({"appId": 1001, "action": "store"}),
        json!({"appId": 1001, "action": "delete"}),
    ] {
        let response = env
            .http
            .post(env.url("/api/smart-contract/interact"))
            .json(&body)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = env
        .http
        .post(env.url("/api/smart-contract/deploy"))
        .json(&json!({"code": "int 1"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(env.manager.approvals.list().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cancelled_signature() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    env.ledger.fund(&env.wallet_address, 5_000_000)?;
    env.connect().await?;

    let http = env.http.clone();
    let url = env.url("/api/transactions");
    let request = tokio::spawn(async move {
        http.post(url)
            .json(&json!({"recipient": RECIPIENT, "amount": 1}))
            .send()
            .await
    });

    let approval = env.next_approval().await?;
    env.decide(approval["id"].as_str().unwrap(), false).await?;

    let response = request.await??;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["notice"], json!(CANCELLED_NOTICE));

    let state = env.get_json("/api/dashboard").await?;
    assert_eq!(state["pending"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_invalid_draft_is_rejected_up_front() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    env.connect().await?;

    let response = env
        .http
        .post(env.url("/api/transactions"))
        .json(&json!({"recipient": "not-an-address", "amount": "1"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(env.manager.approvals.list().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_send_without_session() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    let response = env
        .http
        .post(env.url("/api/transactions"))
        .json(&json!({"recipient": RECIPIENT, "amount": "1"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn test_unknown_approval() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    let status = env.decide("does-not-exist", true).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_disconnect_clears_view() -> anyhow::Result<()> {
    let env = TestEnvironment::new().await?;
    env.ledger.fund(&env.wallet_address, 1_000_000)?;
    env.connect().await?;

    let response = env.http.post(env.url("/api/session/disconnect")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let state = env.get_json("/api/dashboard").await?;
    assert!(state["address"].is_null());
    assert!(state["balance"].is_null());
    assert!(!env.temp_dir.path().join("connected_address.txt").exists());
    Ok(())
}
