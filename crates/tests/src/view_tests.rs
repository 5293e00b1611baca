//! Integration tests for batched view-call execution over HTTP: winner
//! selection within a group and fallback to later groups.

use std::sync::Arc;

use multirpc_core::{
    engine::ViewCall, types::BlockId, EngineError, EngineEvent, MultiRpc, RecordingObserver,
};
use serde_json::json;

use crate::mock_infrastructure::{engine_config, EvmRpcMock, SimpleMulticall};

#[tokio::test]
async fn batched_calls_answer_values_and_block_number() {
    let mut server = EvmRpcMock::new().await;
    server.chain_id(56).eth_call(&json!("0x2a")).block_number(0x10);
    let url = server.url();

    let config = engine_config(&[("1", &[url.as_str()])], &[("1", &[url.as_str()])]);
    let engine = MultiRpc::connect(config, Arc::new(SimpleMulticall)).await.unwrap();

    let calls =
        [ViewCall::new("balanceOf", vec![json!("0x00")]), ViewCall::new("totalSupply", vec![])];
    let page = engine.call_view(&calls, BlockId::Latest).await.unwrap();

    assert_eq!(page.block_number, 16);
    assert_eq!(page.values, vec![json!("0x2a"), json!("0x2a")]);
}

#[tokio::test]
async fn failing_group_falls_back_to_the_next() {
    let mut broken = EvmRpcMock::new().await;
    broken.chain_id(56).rpc_error("eth_call", -32000, "execution reverted");
    let mut healthy = EvmRpcMock::new().await;
    healthy.chain_id(56).eth_call(&json!("0x01")).block_number(0x20);
    let (broken_url, healthy_url) = (broken.url(), healthy.url());

    let config = engine_config(
        &[("1", &[broken_url.as_str()]), ("2", &[healthy_url.as_str()])],
        &[("1", &[healthy_url.as_str()])],
    );
    let observer = RecordingObserver::new();
    let engine = MultiRpc::connect_with(config, Arc::new(SimpleMulticall), observer.clone())
        .await
        .unwrap();

    let calls = [ViewCall::new("totalSupply", vec![])];
    let page = engine.call_view(&calls, BlockId::Latest).await.unwrap();
    assert_eq!(page.block_number, 32);

    let winner = healthy_url.trim_start_matches("http://").to_string();
    assert!(observer.events().iter().any(|e| matches!(
        e,
        EngineEvent::RaceWon { operation: "view", endpoint } if *endpoint == winner
    )));
}

#[tokio::test]
async fn exhausted_groups_surface_an_aggregate_failure() {
    let mut broken = EvmRpcMock::new().await;
    broken.chain_id(56).rpc_error("eth_call", -32000, "execution reverted");
    let url = broken.url();

    let config = engine_config(&[("1", &[url.as_str()])], &[("1", &[url.as_str()])]);
    let engine = MultiRpc::connect(config, Arc::new(SimpleMulticall)).await.unwrap();

    let calls = [ViewCall::new("totalSupply", vec![])];
    let err = engine.call_view(&calls, BlockId::Latest).await.unwrap_err();
    assert!(matches!(err, EngineError::AllEndpointsFailed { last: Some(_) }));
}
