//! Per-endpoint JSON-RPC plumbing: the pooled HTTP client, the `RpcApi`
//! trait and its HTTP implementation, and the `Endpoint` value the engine
//! races over.

pub mod client;
pub mod endpoint;
pub mod errors;
pub mod http_client;

pub use client::{HttpRpcClient, RpcApi};
pub use endpoint::{Endpoint, EndpointHealth};
pub use errors::RpcError;
pub use http_client::{HttpClient, HttpClientConfig};
