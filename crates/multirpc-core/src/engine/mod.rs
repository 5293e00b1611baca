//! The execution engine: setup, racing reads, nonce resolution, transaction
//! build/sign/broadcast, confirmation polling, and generic multi-pool reads,
//! composed behind the [`MultiRpc`] facade.

pub mod broadcast;
pub mod classify;
pub mod confirm;
pub mod errors;
pub mod nonce;
pub mod query;
pub mod race;
pub mod setup;
pub mod tx;
pub mod view;

pub use classify::{ErrorClass, IGNORABLE_BROADCAST_REJECTIONS};
pub use errors::EngineError;
pub use race::{race, RaceWinner};
pub use tx::{FeeEstimator, TransactionCodec, TransactionSigner};
pub use view::{BatchedViewResult, Multicall, ViewCall};

use std::sync::Arc;
use tracing::info;

use crate::{
    config::EngineConfig,
    observer::{EngineObserver, NullObserver},
    pool::Pools,
    rpc::{HttpClient, HttpRpcClient, RpcApi},
    types::{
        Address, Block, BlockId, Hash32, SignedTransactionEnvelope, TxPriority, TxReceipt,
    },
};

/// The collaborators needed for the write path.
#[derive(Clone)]
pub struct TxCollaborators {
    pub fee_estimator: Arc<dyn FeeEstimator>,
    pub codec: Arc<dyn TransactionCodec>,
    pub signer: Arc<dyn TransactionSigner>,
}

/// Outcome of [`MultiRpc::send_transaction`].
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub hash: Hash32,
    /// `None` on the fire-and-forget path.
    pub receipt: Option<TxReceipt>,
}

/// Redundant multi-endpoint RPC execution engine.
///
/// Owns the materialized pools and the resolved chain id; read operations
/// race the view pool, writes fan out across the transaction pool and are
/// confirmed against the endpoint that won the broadcast.
pub struct MultiRpc {
    config: EngineConfig,
    pools: Pools,
    chain_id: u64,
    multicall: Arc<dyn Multicall>,
    tx_collaborators: Option<TxCollaborators>,
    observer: Arc<dyn EngineObserver>,
}

impl std::fmt::Debug for MultiRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiRpc")
            .field("config", &self.config)
            .field("pools", &self.pools)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl MultiRpc {
    /// Connects to the configured endpoints over HTTP and materializes the
    /// pools, dropping unreachable endpoints along the way.
    ///
    /// # Errors
    ///
    /// HTTP client construction failures, or
    /// [`EngineError::NoEndpointAvailable`] when a pool ends up empty.
    pub async fn connect(
        config: EngineConfig,
        multicall: Arc<dyn Multicall>,
    ) -> Result<Self, EngineError> {
        Self::connect_with(config, multicall, Arc::new(NullObserver)).await
    }

    /// Like [`MultiRpc::connect`], with an injected observer.
    ///
    /// # Errors
    ///
    /// See [`MultiRpc::connect`].
    pub async fn connect_with(
        config: EngineConfig,
        multicall: Arc<dyn Multicall>,
        observer: Arc<dyn EngineObserver>,
    ) -> Result<Self, EngineError> {
        let http = Arc::new(HttpClient::new()?);
        let make_rpc = |url: &str| {
            Arc::new(HttpRpcClient::new(url, Arc::clone(&http))) as Arc<dyn RpcApi>
        };
        let (pools, chain_id) = setup::setup_pools(&config, make_rpc, observer.as_ref()).await?;
        Ok(Self { config, pools, chain_id, multicall, tx_collaborators: None, observer })
    }

    /// Assembles an engine from already-materialized pools. Setup probing
    /// and chain id resolution are skipped; intended for embedders that
    /// manage endpoints themselves, and for tests.
    #[must_use]
    pub fn from_pools(
        config: EngineConfig,
        pools: Pools,
        chain_id: u64,
        multicall: Arc<dyn Multicall>,
        observer: Arc<dyn EngineObserver>,
    ) -> Self {
        Self { config, pools, chain_id, multicall, tx_collaborators: None, observer }
    }

    /// Enables the write path.
    #[must_use]
    pub fn with_transactions(mut self, collaborators: TxCollaborators) -> Self {
        self.tx_collaborators = Some(collaborators);
        self
    }

    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    #[must_use]
    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    /// Executes a batch of view calls against the view pool.
    ///
    /// # Errors
    ///
    /// See [`view::call_view`].
    pub async fn call_view(
        &self,
        calls: &[ViewCall],
        block: BlockId,
    ) -> Result<BatchedViewResult, EngineError> {
        view::call_view(
            &self.pools.view,
            &self.multicall,
            calls,
            block,
            self.config.timeouts.view(),
            self.observer.as_ref(),
        )
        .await
    }

    /// Resolves the next nonce for `address` (maximum across view endpoints).
    ///
    /// # Errors
    ///
    /// See [`nonce::resolve_nonce`].
    pub async fn resolve_nonce(&self, address: Address) -> Result<u64, EngineError> {
        nonce::resolve_nonce(&self.pools.view, address, self.config.timeouts.view()).await
    }

    /// Builds, signs once, broadcasts, and (unless fire-and-forget)
    /// confirms a transaction.
    ///
    /// With `confirm` the receipt is polled on the endpoint that won the
    /// broadcast, inside the configured confirmation window; without it the
    /// hash is returned right after a winning broadcast.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotConfigured`] without [`TxCollaborators`]; otherwise
    /// any build, broadcast, or confirmation failure.
    pub async fn send_transaction(
        &self,
        function: &str,
        args: &[serde_json::Value],
        priority: TxPriority,
        confirm: bool,
    ) -> Result<TxOutcome, EngineError> {
        let collaborators = self
            .tx_collaborators
            .as_ref()
            .ok_or(EngineError::NotConfigured("transaction collaborators"))?;

        let nonce = self.resolve_nonce(collaborators.signer.address()).await?;

        let view_endpoints: Vec<_> =
            self.pools.view.all_endpoints().map(Arc::clone).collect();
        let fees = collaborators
            .fee_estimator
            .estimate(priority, self.chain_id, &view_endpoints)
            .await?;

        // gas simulation, when enabled, runs against exactly the first
        // endpoint of the first usable broadcast group
        let simulate_on = self
            .pools
            .transaction
            .groups()
            .iter()
            .find_map(|group| group.endpoints.first());

        let envelope = tx::build_and_sign(
            collaborators.codec.as_ref(),
            collaborators.signer.as_ref(),
            &self.config.transaction,
            function,
            args,
            nonce,
            self.chain_id,
            fees,
            simulate_on,
            self.config.timeouts.view(),
        )
        .await?;

        self.broadcast_signed(&envelope, confirm).await
    }

    /// Broadcasts an already-signed envelope, then optionally confirms it
    /// inside the configured confirmation window.
    ///
    /// # Errors
    ///
    /// Broadcast or confirmation failures.
    pub async fn broadcast_signed(
        &self,
        envelope: &SignedTransactionEnvelope,
        confirm: bool,
    ) -> Result<TxOutcome, EngineError> {
        let winner = broadcast::broadcast(
            &self.pools.transaction,
            envelope,
            self.config.timeouts.broadcast(),
            self.observer.as_ref(),
        )
        .await?;
        let hash = winner.value;

        if !confirm {
            info!(hash = %hash, "fire and forget, skipping confirmation");
            return Ok(TxOutcome { hash, receipt: None });
        }

        let receipt = confirm::wait_for_receipt(
            &winner.endpoint,
            hash,
            self.config.timeouts.confirmation(),
            self.config.timeouts.view(),
            self.observer.as_ref(),
        )
        .await?;

        Ok(TxOutcome { hash, receipt: Some(receipt) })
    }

    /// Looks up a transaction receipt across the view pool.
    ///
    /// # Errors
    ///
    /// See [`query::get_tx_receipt`].
    pub async fn get_tx_receipt(&self, hash: Hash32) -> Result<TxReceipt, EngineError> {
        query::get_tx_receipt(
            &self.pools.view,
            hash,
            self.config.timeouts.view(),
            self.observer.as_ref(),
        )
        .await
    }

    /// Looks up a block across the view pool.
    ///
    /// # Errors
    ///
    /// See [`query::get_block`].
    pub async fn get_block(
        &self,
        block: BlockId,
        full_transactions: bool,
    ) -> Result<Block, EngineError> {
        query::get_block(
            &self.pools.view,
            block,
            full_transactions,
            self.config.timeouts.view(),
            self.observer.as_ref(),
        )
        .await
    }
}
