//! Reusable mock infrastructure shared by the integration test modules.

pub mod collaborators;
pub mod rpc_mock;

pub use collaborators::{
    engine_config, FlatFeeEstimator, JsonCodec, SimpleMulticall, StaticSigner,
};
pub use rpc_mock::EvmRpcMock;
