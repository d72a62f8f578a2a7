//! Local port probing.
//!
//! A port counts as in use when a transient listener on all interfaces
//! cannot be bound to it. A successful bind is released immediately.

use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

/// Report whether `port` is already bound on the local host.
pub async fn is_port_in_use(port: u16) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    match TcpListener::bind(addr).await {
        Ok(listener) => {
            drop(listener);
            tracing::trace!(port, "Port is free");
            false
        }
        Err(e) => {
            tracing::debug!(port, error = %e, "Port probe bind failed, treating as in use");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn occupied_port_is_in_use() {
        let holder = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).await.unwrap();
        let port = holder.local_addr().unwrap().port();

        assert!(is_port_in_use(port).await);
    }

    #[tokio::test]
    async fn released_port_is_free() {
        let holder = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).await.unwrap();
        let port = holder.local_addr().unwrap().port();
        drop(holder);

        assert!(!is_port_in_use(port).await);
        // probing must not leave the port bound
        assert!(!is_port_in_use(port).await);
    }
}
