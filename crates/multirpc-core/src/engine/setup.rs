//! Pool construction: build endpoints from configured URLs, probe
//! connectivity, resolve the chain id, and fail fast when a pool ends up
//! with nothing usable.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};
use tracing::{info, warn};

use crate::{
    config::EngineConfig,
    engine::errors::EngineError,
    observer::{EngineEvent, EngineObserver},
    pool::{Pool, Pools},
    rpc::{Endpoint, RpcApi},
};

/// Builds endpoints from config, drops the unreachable ones, and resolves
/// the chain id.
///
/// Each unique URL is probed once with `eth_chainId`; endpoints failing the
/// probe are dropped with a warning and an `EndpointDropped` event, never
/// failing setup by themselves. The resolved chain id is the maximum value
/// observed across all usable endpoints, so a single misconfigured endpoint
/// reporting a higher id wins.
///
/// # Errors
///
/// [`EngineError::NoEndpointAvailable`] if any configured pool is left with
/// zero usable endpoints after the probe.
pub async fn setup_pools<F>(
    config: &EngineConfig,
    make_rpc: F,
    observer: &dyn EngineObserver,
) -> Result<(Pools, u64), EngineError>
where
    F: Fn(&str) -> Arc<dyn RpcApi>,
{
    let probe_timeout = config.timeouts.setup();

    // the same URL in both pools shares one endpoint and one probe
    let mut probed: HashMap<String, Option<(Arc<Endpoint>, u64)>> = HashMap::new();
    let mut chain_ids: Vec<u64> = Vec::new();

    for url in config.pools.view.values().chain(config.pools.transaction.values()).flatten() {
        if probed.contains_key(url.as_str()) {
            continue;
        }
        let outcome = probe(url, &make_rpc, probe_timeout, observer).await;
        if let Some((_, chain_id)) = &outcome {
            chain_ids.push(*chain_id);
        }
        probed.insert(url.clone(), outcome);
    }

    let view = Pool::new("view", materialize(&config.pools.view, &probed));
    let transaction = Pool::new("transaction", materialize(&config.pools.transaction, &probed));

    if view.is_empty() || transaction.is_empty() {
        return Err(EngineError::NoEndpointAvailable);
    }

    // maximum observed value wins
    let chain_id = chain_ids.iter().copied().max().ok_or(EngineError::NoEndpointAvailable)?;

    info!(
        chain_id,
        view_endpoints = view.all_endpoints().count(),
        transaction_endpoints = transaction.all_endpoints().count(),
        "pools ready"
    );
    observer.on_event(EngineEvent::ChainIdResolved { chain_id });

    Ok((Pools { view, transaction }, chain_id))
}

fn materialize(
    urls: &BTreeMap<String, Vec<String>>,
    probed: &HashMap<String, Option<(Arc<Endpoint>, u64)>>,
) -> BTreeMap<String, Vec<Arc<Endpoint>>> {
    let mut groups: BTreeMap<String, Vec<Arc<Endpoint>>> = BTreeMap::new();
    for (key, group_urls) in urls {
        let entry = groups.entry(key.clone()).or_default();
        for url in group_urls {
            if let Some(Some((endpoint, _))) = probed.get(url.as_str()) {
                entry.push(Arc::clone(endpoint));
            }
        }
    }
    groups
}

async fn probe<F>(
    url: &str,
    make_rpc: &F,
    timeout: Duration,
    observer: &dyn EngineObserver,
) -> Option<(Arc<Endpoint>, u64)>
where
    F: Fn(&str) -> Arc<dyn RpcApi>,
{
    let endpoint = Arc::new(Endpoint::new(url, make_rpc(url)));
    match endpoint.rpc().chain_id(timeout).await {
        Ok(chain_id) => {
            endpoint.update_health(true, None).await;
            Some((endpoint, chain_id))
        }
        Err(error) => {
            warn!(endpoint = %endpoint.name(), error = %error, "ignoring unreachable endpoint");
            observer.on_event(EngineEvent::EndpointDropped {
                endpoint: endpoint.name().to_string(),
                error: error.to_string(),
            });
            None
        }
    }
}
