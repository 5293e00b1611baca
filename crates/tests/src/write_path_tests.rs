//! Integration tests for the write path over HTTP: nonce resolution, sign
//! once, racing broadcast with rejection handling, and confirmation.

use std::sync::Arc;

use multirpc_core::{
    types::{ConfirmationState, TxPriority},
    EngineError, EngineEvent, MultiRpc, RecordingObserver, TxCollaborators,
};
use serde_json::json;

use crate::mock_infrastructure::{
    engine_config, EvmRpcMock, FlatFeeEstimator, JsonCodec, SimpleMulticall, StaticSigner,
};

const HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

fn collaborators() -> TxCollaborators {
    TxCollaborators {
        fee_estimator: Arc::new(FlatFeeEstimator { gas_price: 10 }),
        codec: Arc::new(JsonCodec),
        signer: Arc::new(StaticSigner::new()),
    }
}

#[tokio::test]
async fn transaction_is_broadcast_and_confirmed() {
    let mut server = EvmRpcMock::new().await;
    server
        .chain_id(56)
        .transaction_count(5)
        .accept_raw_transaction(HASH)
        .receipt(HASH, 0x30, true);
    let url = server.url();

    let config = engine_config(&[("1", &[url.as_str()])], &[("1", &[url.as_str()])]);
    let observer = RecordingObserver::new();
    let engine = MultiRpc::connect_with(config, Arc::new(SimpleMulticall), observer.clone())
        .await
        .unwrap()
        .with_transactions(collaborators());

    let outcome = engine
        .send_transaction("transfer", &[json!(1)], TxPriority::Medium, true)
        .await
        .unwrap();

    assert_eq!(outcome.hash.to_string(), HASH);
    let receipt = outcome.receipt.unwrap();
    assert_eq!(receipt.block_number, 48);
    assert!(receipt.status);

    let events = observer.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::RaceWon { operation: "broadcast", .. })));
    assert!(events.contains(&EngineEvent::Confirmation {
        hash: outcome.hash,
        state: ConfirmationState::Confirmed,
    }));

    // nonce, broadcast, and receipt mocks were each exercised
    assert!(server.all_called());
}

#[tokio::test]
async fn fire_and_forget_skips_confirmation() {
    let mut server = EvmRpcMock::new().await;
    server.chain_id(56).transaction_count(0).accept_raw_transaction(HASH);
    let url = server.url();

    let config = engine_config(&[("1", &[url.as_str()])], &[("1", &[url.as_str()])]);
    let engine = MultiRpc::connect(config, Arc::new(SimpleMulticall))
        .await
        .unwrap()
        .with_transactions(collaborators());

    let outcome =
        engine.send_transaction("transfer", &[json!(1)], TxPriority::High, false).await.unwrap();
    assert_eq!(outcome.hash.to_string(), HASH);
    assert!(outcome.receipt.is_none());
}

#[tokio::test]
async fn ignorable_rejection_does_not_spoil_a_sibling_acceptance() {
    let mut view = EvmRpcMock::new().await;
    view.chain_id(56).transaction_count(3);
    let mut rejecting = EvmRpcMock::new().await;
    rejecting.chain_id(56).rpc_error("eth_sendRawTransaction", -32000, "nonce too low");
    let mut accepting = EvmRpcMock::new().await;
    accepting.chain_id(56).accept_raw_transaction(HASH);
    let (view_url, rejecting_url, accepting_url) = (view.url(), rejecting.url(), accepting.url());

    let config = engine_config(
        &[("1", &[view_url.as_str()])],
        &[("1", &[rejecting_url.as_str(), accepting_url.as_str()])],
    );
    let engine = MultiRpc::connect(config, Arc::new(SimpleMulticall))
        .await
        .unwrap()
        .with_transactions(collaborators());

    let outcome =
        engine.send_transaction("transfer", &[json!(1)], TxPriority::Medium, false).await.unwrap();
    assert_eq!(outcome.hash.to_string(), HASH);
}

#[tokio::test]
async fn fatal_rejection_aborts_the_broadcast() {
    let mut view = EvmRpcMock::new().await;
    view.chain_id(56).transaction_count(3);
    let mut rejecting = EvmRpcMock::new().await;
    rejecting.chain_id(56).rpc_error("eth_sendRawTransaction", -32000, "invalid signature");
    let (view_url, rejecting_url) = (view.url(), rejecting.url());

    let config =
        engine_config(&[("1", &[view_url.as_str()])], &[("1", &[rejecting_url.as_str()])]);
    let engine = MultiRpc::connect(config, Arc::new(SimpleMulticall))
        .await
        .unwrap()
        .with_transactions(collaborators());

    let err = engine
        .send_transaction("transfer", &[json!(1)], TxPriority::Medium, false)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TransactionRejected(message) if message == "invalid signature"));
}

#[tokio::test]
async fn unreachable_group_falls_back_to_the_next() {
    let mut view = EvmRpcMock::new().await;
    view.chain_id(56).transaction_count(3);
    let mut flaky = EvmRpcMock::new().await;
    flaky.chain_id(56).http_error("eth_sendRawTransaction", 500);
    let mut accepting = EvmRpcMock::new().await;
    accepting.chain_id(56).accept_raw_transaction(HASH);
    let (view_url, flaky_url, accepting_url) = (view.url(), flaky.url(), accepting.url());

    let config = engine_config(
        &[("1", &[view_url.as_str()])],
        &[("1", &[flaky_url.as_str()]), ("2", &[accepting_url.as_str()])],
    );
    let engine = MultiRpc::connect(config, Arc::new(SimpleMulticall))
        .await
        .unwrap()
        .with_transactions(collaborators());

    let outcome =
        engine.send_transaction("transfer", &[json!(1)], TxPriority::Low, false).await.unwrap();
    assert_eq!(outcome.hash.to_string(), HASH);
}
