//! Dashboard Integration Tests
//!
//! Drives the library end to end over HTTP against the in-memory mock node:
//! connect, fetch, send, confirm, history and contracts, plus the failure
//! paths.
//!
//! Each test starts its own mock node on an ephemeral port, so tests run in
//! parallel without sharing ledger state.
//!
//! Run with: cargo test --test dashboard_test -- --nocapture

use algo_dashboard::*;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use node_mock::Ledger;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const RECIPIENT: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Serve a fresh mock ledger, returning it with its base URL
async fn start_node(api_key: Option<&str>) -> anyhow::Result<(Arc<Ledger>, String)> {
    let ledger = Arc::new(Ledger::new("mocknet-v1.0", api_key.map(String::from)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    let router = node_mock::create_router(ledger.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    Ok((ledger, url))
}

/// Approves pairing, declines every signature
struct DeclineSignatures;

#[async_trait]
impl Approver for DeclineSignatures {
    async fn approve(&self, request: ApprovalRequest) -> bool {
        matches!(request, ApprovalRequest::Connect { .. })
    }
}

/// Declines pairing, approves every signature
struct SignOnly;

#[async_trait]
impl Approver for SignOnly {
    async fn approve(&self, request: ApprovalRequest) -> bool {
        matches!(request, ApprovalRequest::Sign { .. })
    }
}

struct Setup {
    dashboard: Dashboard,
    address: String,
}

fn build_dashboard(
    node_url: &str,
    api_key: &str,
    approver: Arc<dyn Approver>,
    store: Arc<dyn AddressStore>,
) -> Setup {
    let wallet = LocalWallet::from_seed([3u8; 32], approver);
    build_with_wallet(node_url, api_key, wallet, store, HistoryWindow::default())
}

fn build_with_wallet(
    node_url: &str,
    api_key: &str,
    wallet: LocalWallet,
    store: Arc<dyn AddressStore>,
    window: HistoryWindow,
) -> Setup {
    let address = wallet.address().to_string();
    let indexer_config = IndexerConfig {
        url: format!("{}/graphql", node_url),
        api_key: api_key.to_string(),
        network: "algorand_testnet".to_string(),
    };

    let dashboard = Dashboard::new(
        Collaborators {
            node: Arc::new(AlgodClient::new(&AlgodConfig {
                url: node_url.to_string(),
                token: None,
            })),
            indexer: Arc::new(BitqueryClient::new(&indexer_config)),
            pairing: Arc::new(wallet),
            store,
        },
        "algorand_testnet",
        window,
    );

    Setup { dashboard, address }
}

#[tokio::test]
async fn test_send_flow_end_to_end() -> anyhow::Result<()> {
    init_logging();
    let (ledger, url) = start_node(None).await?;
    let setup = build_dashboard(
        &url,
        "",
        Arc::new(AutoApprove),
        Arc::new(MemoryAddressStore::default()),
    );
    ledger.fund(&setup.address, 5_000_000)?;
    ledger.add_asset(&setup.address, 10, 3, false)?;

    let connected = setup.dashboard.connect().await?;
    assert_eq!(connected, setup.address);

    let state = setup.dashboard.state().await;
    assert_eq!(state.balance, Some(Decimal::new(5, 0)));
    assert_eq!(
        state.assets,
        vec![AssetBalance {
            id: 10,
            amount: 3,
            is_frozen: false
        }]
    );
    assert!(state.genesis.is_some());

    let tx_id = setup
        .dashboard
        .send(&DraftPayment::new(RECIPIENT, "0.25"))
        .await?;
    log::info!("✓ Submitted {}", tx_id);
    assert_eq!(success_notice(&tx_id), format!("Transaction successful with ID: {}", tx_id));

    setup.dashboard.refresh().await;
    let state = setup.dashboard.state().await;
    assert_eq!(state.pending.len(), 1);
    assert_eq!(state.pending[0].receiver.as_deref(), Some(RECIPIENT));
    assert_eq!(state.pending[0].amount, Decimal::new(25, 2));

    assert_eq!(ledger.confirm()?, 1);
    setup.dashboard.refresh().await;

    let state = setup.dashboard.state().await;
    assert!(state.pending.is_empty());
    assert_eq!(state.balance, Some(Decimal::new(4_749, 3)));
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].hash, tx_id);
    assert_eq!(state.history[0].currency_symbol, "ALGO");
    assert_eq!(ledger.account(RECIPIENT)?.amount, 250_000);
    Ok(())
}

#[tokio::test]
async fn test_declined_signature_is_cancelled() -> anyhow::Result<()> {
    init_logging();
    let (ledger, url) = start_node(None).await?;
    let setup = build_dashboard(
        &url,
        "",
        Arc::new(DeclineSignatures),
        Arc::new(MemoryAddressStore::default()),
    );
    ledger.fund(&setup.address, 5_000_000)?;
    setup.dashboard.connect().await?;

    let err = setup
        .dashboard
        .send(&DraftPayment::new(RECIPIENT, "1"))
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.notice(), error::CANCELLED_NOTICE);

    assert!(ledger.pending_for(&setup.address)?.top_transactions.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_overspend_is_a_generic_failure() -> anyhow::Result<()> {
    init_logging();
    let (_ledger, url) = start_node(None).await?;
    let setup = build_dashboard(
        &url,
        "",
        Arc::new(AutoApprove),
        Arc::new(MemoryAddressStore::default()),
    );
    setup.dashboard.connect().await?;

    let err = setup
        .dashboard
        .send(&DraftPayment::new(RECIPIENT, "1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Submission(DashboardError::NodeRejected { status: 400, .. })
    ));
    assert_eq!(err.notice(), error::FAILED_NOTICE);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_services_leave_state_empty() -> anyhow::Result<()> {
    init_logging();
    let setup = build_dashboard(
        "http://127.0.0.1:1",
        "",
        Arc::new(AutoApprove),
        Arc::new(MemoryAddressStore::default()),
    );

    let address = setup.dashboard.connect().await?;
    let state = setup.dashboard.state().await;
    assert_eq!(state.address.as_deref(), Some(address.as_str()));
    assert_eq!(state.balance, None);
    assert!(state.assets.is_empty());
    assert!(state.pending.is_empty());
    assert!(state.history.is_empty());
    assert!(state.genesis.is_none());
    Ok(())
}

#[tokio::test]
async fn test_history_failure_does_not_block_account_data() -> anyhow::Result<()> {
    init_logging();
    let (ledger, url) = start_node(Some("right-key")).await?;
    let setup = build_dashboard(
        &url,
        "wrong-key",
        Arc::new(AutoApprove),
        Arc::new(MemoryAddressStore::default()),
    );
    ledger.fund(&setup.address, 2_000_000)?;

    setup.dashboard.connect().await?;
    let state = setup.dashboard.state().await;
    assert_eq!(state.balance, Some(Decimal::new(2, 0)));
    assert!(state.history.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_start_restores_persisted_address() -> anyhow::Result<()> {
    init_logging();
    let temp_dir = TempDir::new()?;
    let (ledger, url) = start_node(None).await?;
    let store = Arc::new(FileAddressStore::new_with_base_dir(temp_dir.path().to_path_buf()));

    // First run connects and persists
    let first = build_dashboard(&url, "", Arc::new(AutoApprove), store.clone());
    ledger.fund(&first.address, 1_000_000)?;
    first.dashboard.connect().await?;

    // Second run has an unpaired wallet but the stored address
    let second = build_dashboard(&url, "", Arc::new(AutoApprove), store.clone());
    let restored = second.dashboard.start().await;
    assert_eq!(restored.as_deref(), Some(second.address.as_str()));

    let once = second.dashboard.state().await;
    assert_eq!(once.balance, Some(Decimal::new(1, 0)));

    let again = second.dashboard.start().await;
    assert_eq!(again, restored);
    assert_eq!(second.dashboard.state().await, once);
    Ok(())
}

#[tokio::test]
async fn test_start_without_session() -> anyhow::Result<()> {
    init_logging();
    let (_ledger, url) = start_node(None).await?;
    let setup = build_dashboard(
        &url,
        "",
        Arc::new(AutoApprove),
        Arc::new(MemoryAddressStore::default()),
    );

    assert_eq!(setup.dashboard.start().await, None);
    assert_eq!(setup.dashboard.state().await, DashboardState::default());
    Ok(())
}

#[tokio::test]
async fn test_restart_can_send_without_pairing_again() -> anyhow::Result<()> {
    init_logging();
    let temp_dir = TempDir::new()?;
    let (ledger, url) = start_node(None).await?;
    let store = Arc::new(FileAddressStore::new_with_base_dir(temp_dir.path().to_path_buf()));
    let session_file = temp_dir.path().join("wallet_session.txt");

    let wallet = LocalWallet::from_seed([3u8; 32], Arc::new(AutoApprove))
        .with_session_file(&session_file);
    let first = build_with_wallet(&url, "", wallet, store.clone(), HistoryWindow::default());
    ledger.fund(&first.address, 2_000_000)?;
    first.dashboard.connect().await?;
    assert!(session_file.exists());

    // A fresh process would refuse a new pairing prompt
    let wallet = LocalWallet::from_seed([3u8; 32], Arc::new(SignOnly))
        .with_session_file(&session_file);
    let second = build_with_wallet(&url, "", wallet, store, HistoryWindow::default());
    assert_eq!(second.dashboard.start().await.as_deref(), Some(second.address.as_str()));

    let tx_id = second
        .dashboard
        .send(&DraftPayment::new(RECIPIENT, "0.5"))
        .await?;
    assert_eq!(ledger.confirm()?, 1);
    second.dashboard.refresh().await;
    assert_eq!(second.dashboard.state().await.history[0].hash, tx_id);
    assert_eq!(ledger.account(RECIPIENT)?.amount, 500_000);

    second.dashboard.disconnect().await?;
    assert!(!session_file.exists());
    Ok(())
}

#[tokio::test]
async fn test_fixed_window_excludes_older_records() -> anyhow::Result<()> {
    init_logging();
    let (ledger, url) = start_node(None).await?;
    let march = HistoryWindow::Fixed {
        from: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        till: Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
    };
    let wallet = LocalWallet::from_seed([3u8; 32], Arc::new(AutoApprove));
    let setup = build_with_wallet(
        &url,
        "",
        wallet,
        Arc::new(MemoryAddressStore::default()),
        march,
    );
    let peer_wallet = LocalWallet::from_seed([4u8; 32], Arc::new(AutoApprove));
    let peer = build_with_wallet(
        &url,
        "",
        peer_wallet,
        Arc::new(MemoryAddressStore::default()),
        HistoryWindow::default(),
    );
    ledger.fund(&setup.address, 5_000_000)?;
    ledger.fund(&peer.address, 5_000_000)?;
    setup.dashboard.connect().await?;
    peer.dashboard.connect().await?;

    let january = setup.dashboard.send(&DraftPayment::new(RECIPIENT, "1")).await?;
    ledger.confirm_at(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap())?;
    let in_window = setup.dashboard.send(&DraftPayment::new(RECIPIENT, "2")).await?;
    ledger.confirm_at(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap())?;
    peer.dashboard
        .send(&DraftPayment::new(setup.address.clone(), "0.5"))
        .await?;
    ledger.confirm_at(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())?;

    setup.dashboard.refresh().await;
    let state = setup.dashboard.state().await;
    let hashes: Vec<_> = state.history.iter().map(|r| r.hash.as_str()).collect();
    assert_eq!(hashes, vec![in_window.as_str()]);
    assert!(!hashes.contains(&january.as_str()));

    assert_eq!(state.transfers.len(), 2);
    assert_eq!(state.transfers[0].sender, peer.address);
    assert_eq!(state.transfers[0].sum_in, 0.5);
    assert_eq!(state.transfers[0].count_in, 1);
    assert_eq!(state.transfers[1].sum_out, 2.0);
    assert_eq!(state.transfers[1].date, "2024-03-05");
    Ok(())
}

#[tokio::test]
async fn test_contract_deploy_store_read() -> anyhow::Result<()> {
    init_logging();
    let (ledger, url) = start_node(None).await?;
    let Setup { dashboard, address } = build_dashboard(
        &url,
        "",
        Arc::new(AutoApprove),
        Arc::new(MemoryAddressStore::default()),
    );
    let dashboard = dashboard.with_confirmation_policy(ConfirmationPolicy {
        poll_interval: Duration::from_millis(20),
        max_attempts: 50,
    });
    ledger.fund(&address, 5_000_000)?;
    dashboard.connect().await?;
    let confirmer = node_mock::spawn_confirmer(ledger.clone(), Duration::from_millis(25));

    let deployment = dashboard
        .deploy_contract("#pragma version 6\nint 1\nreturn")
        .await?;
    assert_eq!(deployment.app_id, 1001);

    let request = InteractRequest {
        app_id: deployment.app_id,
        action: "store".to_string(),
        value: Some("hi".to_string()),
    };
    assert!(matches!(
        dashboard.interact_contract(&request).await?,
        InteractOutcome::Store { .. }
    ));

    let read = InteractRequest {
        action: "read".to_string(),
        value: None,
        ..request
    };
    match dashboard.interact_contract(&read).await? {
        InteractOutcome::Read(value) => assert_eq!(value.text.as_deref(), Some("hi")),
        other => panic!("unexpected outcome: {:?}", other),
    }

    let err = dashboard.deploy_contract("int 1").await.unwrap_err();
    assert!(matches!(err, ContractError::Compile(_)));

    confirmer.abort();
    Ok(())
}
