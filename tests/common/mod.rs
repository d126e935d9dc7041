//! Common test utilities for integration tests.
//!
//! Every test starts its own server on an ephemeral loopback port, so tests
//! can run in parallel.
//!
//! # Example
//!
//! ```ignore
//! let server = TestServer::start(ScriptedProducer::from_texts(["a", "b"])).await;
//! let client = server.client();
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::net::SocketAddr;
use std::sync::Arc;

use tokenflow::client::{StreamClient, Subscription, SessionUpdate};
use tokenflow::server::start_server_on;
use tokenflow::traits::FragmentProducer;
use tokio::task::JoinHandle;

/// A transport server running in the background for one test.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by `producer` on `127.0.0.1:0`.
    pub async fn start(producer: impl FragmentProducer + 'static) -> Self {
        Self::start_shared(Arc::new(producer)).await
    }

    pub async fn start_shared(producer: Arc<dyn FragmentProducer>) -> Self {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (handle, addr) = start_server_on(addr, producer)
            .await
            .expect("Failed to start stream server");
        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url(), path_and_query)
    }

    pub fn client(&self) -> StreamClient {
        StreamClient::new(self.base_url())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Pull every update from a subscription, keeping the subscription around
/// for inspection.
pub async fn drain(subscription: &mut Subscription) -> Vec<SessionUpdate> {
    let mut updates = Vec::new();
    while let Some(update) = subscription.next().await {
        updates.push(update);
    }
    updates
}

/// Fetch a raw response body from the server.
pub async fn get_body(url: &str) -> String {
    reqwest::get(url)
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read body")
}
