//! Integration tests for pool setup over HTTP: connectivity probing,
//! dropped endpoints, and chain id resolution.

use std::sync::Arc;

use multirpc_core::{EngineError, EngineEvent, MultiRpc, RecordingObserver};

use crate::mock_infrastructure::{engine_config, EvmRpcMock, SimpleMulticall};

fn label(mock: &EvmRpcMock) -> String {
    mock.url().trim_start_matches("http://").to_string()
}

#[tokio::test]
async fn chain_id_is_the_maximum_across_endpoints() {
    let mut a = EvmRpcMock::new().await;
    a.chain_id(5);
    let mut b = EvmRpcMock::new().await;
    b.chain_id(7);
    let (a_url, b_url) = (a.url(), b.url());

    let config = engine_config(
        &[("1", &[a_url.as_str(), b_url.as_str()])],
        &[("1", &[a_url.as_str()])],
    );
    let observer = RecordingObserver::new();

    let engine = MultiRpc::connect_with(config, Arc::new(SimpleMulticall), observer.clone())
        .await
        .unwrap();

    assert_eq!(engine.chain_id(), 7);
    assert!(observer.events().contains(&EngineEvent::ChainIdResolved { chain_id: 7 }));
}

#[tokio::test]
async fn unreachable_endpoint_is_dropped_but_setup_succeeds() {
    let mut good = EvmRpcMock::new().await;
    good.chain_id(1);
    let mut dead = EvmRpcMock::new().await;
    dead.rpc_error("eth_chainId", -32000, "node is syncing");
    let (good_url, dead_url) = (good.url(), dead.url());

    let config = engine_config(
        &[("1", &[good_url.as_str(), dead_url.as_str()])],
        &[("1", &[good_url.as_str()])],
    );
    let observer = RecordingObserver::new();

    let engine = MultiRpc::connect_with(config, Arc::new(SimpleMulticall), observer.clone())
        .await
        .unwrap();

    assert_eq!(engine.pools().view.all_endpoints().count(), 1);
    let dropped = label(&dead);
    assert!(observer.events().iter().any(|e| matches!(
        e,
        EngineEvent::EndpointDropped { endpoint, .. } if *endpoint == dropped
    )));
}

#[tokio::test]
async fn pool_emptied_by_probing_fails_setup() {
    let mut good = EvmRpcMock::new().await;
    good.chain_id(1);
    let mut dead = EvmRpcMock::new().await;
    dead.rpc_error("eth_chainId", -32000, "node is syncing");
    let (good_url, dead_url) = (good.url(), dead.url());

    let config = engine_config(
        &[("1", &[good_url.as_str()])],
        &[("1", &[dead_url.as_str()])],
    );
    let observer = RecordingObserver::new();

    let err = MultiRpc::connect_with(config, Arc::new(SimpleMulticall), observer)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoEndpointAvailable));
}

#[tokio::test]
async fn shared_url_lands_in_both_pools() {
    let mut shared = EvmRpcMock::new().await;
    shared.chain_id(56);
    let url = shared.url();

    let config = engine_config(&[("1", &[url.as_str()])], &[("1", &[url.as_str()])]);
    let observer = RecordingObserver::new();

    let engine = MultiRpc::connect_with(config, Arc::new(SimpleMulticall), observer)
        .await
        .unwrap();
    assert_eq!(engine.pools().view.all_endpoints().count(), 1);
    assert_eq!(engine.pools().transaction.all_endpoints().count(), 1);
    assert_eq!(engine.chain_id(), 56);
}
