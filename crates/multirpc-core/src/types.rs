//! Wire and domain value types.
//!
//! JSON-RPC 2.0 protocol structs plus the handful of chain-domain values the
//! engine moves around: hashes, addresses, fee parameters, receipts, and the
//! signed transaction envelope that gets broadcast to every endpoint of a
//! redundancy group.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, sync::Arc};

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for the JSON-RPC version - zero allocation for static usage.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// JSON-RPC 2.0 request structure.
///
/// `jsonrpc` uses `Cow<'static, str>` so constructing with the static version
/// string allocates nothing; `id` is an `Arc` so it can be echoed into
/// responses without deep-copying the JSON value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub method: String,
    pub params: Option<serde_json::Value>,
    pub id: Arc<serde_json::Value>,
}

impl JsonRpcRequest {
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        params: Option<serde_json::Value>,
        id: serde_json::Value,
    ) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, method: method.into(), params, id: Arc::new(id) }
    }
}

/// JSON-RPC 2.0 response structure.
///
/// Contains either a `result` or an `error`, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    /// `None` only when the field is absent; a literal `null` result
    /// (not-found answers) is preserved as `Some(Value::Null)`.
    #[serde(default, deserialize_with = "null_result_is_present")]
    pub result: Option<serde_json::Value>,
    pub error: Option<JsonRpcError>,
    pub id: Arc<serde_json::Value>,
}

fn null_result_is_present<'de, D>(
    deserializer: D,
) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 error object.
///
/// Standard codes: `-32700` parse error, `-32600` invalid request, `-32601`
/// method not found, `-32602` invalid params, `-32603` internal error,
/// `-32000..=-32099` server-defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Error type for parsing hex-encoded wire values.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValueParseError {
    #[error("missing 0x prefix")]
    MissingPrefix,
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// Parses a 0x-prefixed hex quantity into a `u64`.
pub fn parse_hex_u64(value: &str) -> Result<u64, ValueParseError> {
    let digits = value.strip_prefix("0x").ok_or(ValueParseError::MissingPrefix)?;
    u64::from_str_radix(digits, 16).map_err(|e| ValueParseError::InvalidHex(e.to_string()))
}

/// Renders a quantity as a 0x-prefixed hex string without leading zeros.
#[must_use]
pub fn to_hex_quantity(value: u128) -> String {
    format!("0x{value:x}")
}

fn parse_fixed_bytes<const N: usize>(value: &str) -> Result<[u8; N], ValueParseError> {
    let digits = value.strip_prefix("0x").ok_or(ValueParseError::MissingPrefix)?;
    let bytes = hex::decode(digits).map_err(|e| ValueParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(ValueParseError::InvalidLength { expected: N, actual: bytes.len() });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// 32-byte hash (transaction hashes, block hashes).
///
/// # Example
/// ```
/// use multirpc_core::types::Hash32;
///
/// let hash: Hash32 = "0xabcd1234abcd1234abcd1234abcd1234abcd1234abcd1234abcd1234abcd1234"
///     .try_into()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl TryFrom<&str> for Hash32 {
    type Error = ValueParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse_fixed_bytes::<32>(value).map(Hash32)
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(arr: [u8; 32]) -> Self {
        Hash32(arr)
    }
}

impl std::fmt::Display for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Hash32 {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl TryFrom<&str> for Address {
    type Error = ValueParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse_fixed_bytes::<20>(value).map(Address)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Address {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Block selector for read calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    #[default]
    Latest,
    Finalized,
    Number(u64),
    Hash(Hash32),
}

impl BlockId {
    /// Renders the selector as the JSON-RPC block parameter.
    #[must_use]
    pub fn as_param(&self) -> serde_json::Value {
        match self {
            BlockId::Latest => serde_json::Value::String("latest".into()),
            BlockId::Finalized => serde_json::Value::String("finalized".into()),
            BlockId::Number(n) => serde_json::Value::String(format!("0x{n:x}")),
            BlockId::Hash(h) => serde_json::Value::String(h.to_string()),
        }
    }

    /// Returns `true` if the selector is a block hash (routed to
    /// `eth_getBlockByHash` instead of `eth_getBlockByNumber`).
    #[must_use]
    pub fn is_hash(&self) -> bool {
        matches!(self, BlockId::Hash(_))
    }
}

/// Priority tier consumed by the fee estimation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TxPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Fee parameters produced by the fee estimation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeParameters {
    Legacy { gas_price: u128 },
    Eip1559 { max_fee_per_gas: u128, max_priority_fee_per_gas: u128 },
}

impl FeeParameters {
    /// Writes the fee fields into a JSON transaction object.
    pub fn apply_to(&self, tx: &mut serde_json::Map<String, serde_json::Value>) {
        match self {
            FeeParameters::Legacy { gas_price } => {
                tx.insert("gasPrice".into(), to_hex_quantity(*gas_price).into());
            }
            FeeParameters::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas } => {
                tx.insert("maxFeePerGas".into(), to_hex_quantity(*max_fee_per_gas).into());
                tx.insert(
                    "maxPriorityFeePerGas".into(),
                    to_hex_quantity(*max_priority_fee_per_gas).into(),
                );
            }
        }
    }
}

/// Transaction-level parameters resolved before building: sender, nonce,
/// gas limit, chain id, and fee parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub from: Address,
    pub nonce: u64,
    pub gas_limit: u64,
    pub chain_id: u64,
    pub fees: FeeParameters,
}

/// An unsigned transaction object produced by the codec collaborator.
///
/// The engine treats the payload as opaque JSON apart from forwarding it to
/// `eth_estimateGas` when simulation is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub params: TxParams,
    pub payload: serde_json::Value,
}

/// A transaction signed exactly once.
///
/// Immutable after creation; the identical `raw` bytes are broadcast to every
/// endpoint in a race, never re-signed per endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransactionEnvelope {
    pub raw: Bytes,
    pub hash: Hash32,
}

/// A mined transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: Hash32,
    pub block_number: u64,
    /// `true` for a successful execution status.
    pub status: bool,
    pub raw: serde_json::Value,
}

impl TxReceipt {
    /// Parses a receipt from its JSON-RPC representation.
    pub fn from_value(raw: serde_json::Value) -> Result<Self, ValueParseError> {
        let hash = raw
            .get("transactionHash")
            .and_then(serde_json::Value::as_str)
            .ok_or(ValueParseError::MissingField("transactionHash"))?;
        let block_number = raw
            .get("blockNumber")
            .and_then(serde_json::Value::as_str)
            .ok_or(ValueParseError::MissingField("blockNumber"))?;
        let status = raw
            .get("status")
            .and_then(serde_json::Value::as_str)
            .ok_or(ValueParseError::MissingField("status"))?;

        Ok(Self {
            transaction_hash: Hash32::try_from(hash)?,
            block_number: parse_hex_u64(block_number)?,
            status: parse_hex_u64(status)? == 1,
            raw,
        })
    }
}

/// Confirmation poller state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationState {
    /// Receipt not available yet; polling continues.
    Waiting,
    /// Receipt found with success status.
    Confirmed,
    /// Receipt found with failing status. Never retried.
    Failed,
    /// Retry budget exhausted; the last error propagates.
    GivenUp,
}

/// A block header (full transaction bodies stay in `raw` when requested).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub hash: Hash32,
    pub raw: serde_json::Value,
}

impl Block {
    /// Parses a block from its JSON-RPC representation.
    pub fn from_value(raw: serde_json::Value) -> Result<Self, ValueParseError> {
        let number = raw
            .get("number")
            .and_then(serde_json::Value::as_str)
            .ok_or(ValueParseError::MissingField("number"))?;
        let hash = raw
            .get("hash")
            .and_then(serde_json::Value::as_str)
            .ok_or(ValueParseError::MissingField("hash"))?;

        Ok(Self {
            number: parse_hex_u64(number)?,
            hash: Hash32::try_from(hash)?,
            raw,
        })
    }
}
