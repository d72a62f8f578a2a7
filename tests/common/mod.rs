//! Shared utilities for orchestrator integration tests.

#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::path::Path;

use devstack::config::StackConfig;
use serde_json::{json, Value};

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

/// Bind a port on all interfaces and keep it bound while the listener lives.
pub fn occupy_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Stack config with unique ports and every directory under `root`.
/// The migration is a shell script that succeeds.
pub fn test_config(root: &Path) -> StackConfig {
    let mut config = StackConfig::default();
    config.chain.port = free_port();
    config.chain.data_dir = root.join("data").join("db");
    config.storage.api_port = free_port();
    config.storage.gateway_port = free_port();
    config.storage.data_dir = root.join("data").join("ipfs");
    config.contracts.project_dir = root.to_path_buf();
    config.contracts.executable = "sh".to_string();
    config.contracts.args = vec!["-c".to_string(), "exit 0".to_string()];
    config.fixtures.dir = root.join("fixtures");
    config
}

/// Replace the migration with an inline shell script.
pub fn migration_script(config: &mut StackConfig, script: &str) {
    config.contracts.args = vec!["-c".to_string(), script.to_string()];
}

/// Write `count` fixture files spread over nested directories.
pub fn write_fixtures(dir: &Path, count: usize) {
    for i in 0..count {
        let sub = dir.join(format!("listing-{}", i % 3));
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join(format!("{}.json", i)), format!("{{\"id\":{}}}", i)).unwrap();
    }
}

pub fn localhost(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Call a JSON-RPC method on the chain emulator and return `result`.
pub async fn rpc(port: u16, method: &str, params: Value) -> Value {
    let response: Value = http_client()
        .post(format!("http://{}/", localhost(port)))
        .json(&json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}))
        .send()
        .await
        .expect("chain unreachable")
        .json()
        .await
        .unwrap();
    response["result"].clone()
}
