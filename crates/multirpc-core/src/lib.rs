//! Redundant multi-endpoint JSON-RPC execution engine.
//!
//! Wraps a set of interchangeable RPC endpoints, organized into redundancy
//! groups inside two pools (view reads and transaction broadcast), and runs
//! every operation against a whole group at once: the first endpoint to
//! succeed wins, the rest are cancelled. Transactions are signed exactly
//! once, fanned out as identical raw bytes, and confirmed against the
//! endpoint that accepted them, with a bounded retry budget.
//!
//! Chain-specific knowledge (ABI encoding, fee strategies, key material)
//! stays behind the collaborator traits in [`engine`]: [`engine::Multicall`],
//! [`engine::FeeEstimator`], [`engine::TransactionCodec`], and
//! [`engine::TransactionSigner`].
//!
//! # Example
//!
//! ```no_run
//! use multirpc_core::{config::EngineConfig, engine::MultiRpc};
//! # use multirpc_core::engine::Multicall;
//! # async fn demo(multicall: std::sync::Arc<dyn Multicall>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::load()?;
//! let engine = MultiRpc::connect(config, multicall).await?;
//! println!("chain id: {}", engine.chain_id());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod observer;
pub mod pool;
pub mod rpc;
pub mod types;

pub use config::EngineConfig;
pub use engine::{EngineError, MultiRpc, TxCollaborators, TxOutcome};
pub use observer::{EngineEvent, EngineObserver, NullObserver, RecordingObserver};
pub use pool::{Pool, Pools, RedundancyGroup};
pub use rpc::{Endpoint, RpcError};
