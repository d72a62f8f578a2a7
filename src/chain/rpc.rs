//! JSON-RPC surface of the chain emulator.
//!
//! Only the read-mostly subset a dapp needs to discover the local network is
//! served: client version, network/chain id, accounts, balances, block height,
//! plus `evm_mine` to advance the chain by hand.

use alloy::primitives::Address;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::chain::store::{ChainState, ChainStore};

pub const CLIENT_VERSION: &str = concat!("devstack-chain/v", env!("CARGO_PKG_VERSION"));

const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const SERVER_ERROR: i64 = -32000;

/// Chain state plus the backend it is persisted to.
#[derive(Debug)]
pub struct Ledger {
    state: ChainState,
    store: Box<dyn ChainStore>,
}

impl Ledger {
    pub fn new(state: ChainState, store: Box<dyn ChainStore>) -> Self {
        Self { state, store }
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    /// Advance one block and persist.
    pub fn mine(&mut self) -> std::io::Result<u64> {
        self.state.block_number += 1;
        self.store.persist(&self.state)?;
        Ok(self.state.block_number)
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.store.persist(&self.state)
    }
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct RpcState {
    pub ledger: Arc<Mutex<Ledger>>,
    pub network_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

pub fn router(state: RpcState) -> Router {
    Router::new().route("/", post(handle_rpc)).with_state(state)
}

async fn handle_rpc(State(state): State<RpcState>, Json(req): Json<RpcRequest>) -> Json<RpcResponse> {
    tracing::trace!(method = %req.method, "Chain RPC call");
    let (result, error) = match dispatch(&state, &req.method, &req.params) {
        Ok(value) => (Some(value), None),
        Err(e) => (None, Some(e)),
    };
    Json(RpcResponse {
        jsonrpc: "2.0".to_string(),
        id: req.id,
        result,
        error,
    })
}

/// Execute a single RPC method against the ledger.
pub fn dispatch(state: &RpcState, method: &str, params: &[Value]) -> Result<Value, RpcError> {
    let mut ledger = state
        .ledger
        .lock()
        .map_err(|_| RpcError::new(SERVER_ERROR, "ledger lock poisoned"))?;

    match method {
        "web3_clientVersion" => Ok(json!(CLIENT_VERSION)),
        "net_version" => Ok(json!(state.network_id.to_string())),
        "eth_chainId" => Ok(json!(format!("{:#x}", state.network_id))),
        "eth_accounts" => {
            let accounts: Vec<String> = ledger
                .state()
                .addresses()
                .iter()
                .map(ToString::to_string)
                .collect();
            Ok(json!(accounts))
        }
        "eth_getBalance" => {
            let address = param_address(params, 0)?;
            Ok(json!(format!("{:#x}", ledger.state().balance_of(&address))))
        }
        "eth_blockNumber" => Ok(json!(format!("{:#x}", ledger.state().block_number))),
        "evm_mine" => {
            ledger
                .mine()
                .map_err(|e| RpcError::new(SERVER_ERROR, format!("failed to persist block: {}", e)))?;
            Ok(json!("0x0"))
        }
        other => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("the method {} does not exist/is not available", other),
        )),
    }
}

fn param_address(params: &[Value], index: usize) -> Result<Address, RpcError> {
    params
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::new(INVALID_PARAMS, format!("missing address at position {}", index)))?
        .parse()
        .map_err(|e| RpcError::new(INVALID_PARAMS, format!("invalid address: {}", e)))
}
