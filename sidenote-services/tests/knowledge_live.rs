//! Live tests against a running local knowledge base service
//! (requires --features live-tests).
//!
//! Run with: cargo test --features live-tests --test knowledge_live
//!
//! Expects the service at its default address with the API token in
//! SIDENOTE_KB_TOKEN.

#[cfg(feature = "live-tests")]
use std::sync::Arc;

#[cfg(feature = "live-tests")]
use sidenote_core::MemoryStore;
#[cfg(feature = "live-tests")]
use sidenote_services::{ConnectionConfig, KnowledgeBaseClient, KnowledgeService};

#[cfg(feature = "live-tests")]
async fn live_client() -> Option<KnowledgeBaseClient> {
    let token = match std::env::var("SIDENOTE_KB_TOKEN") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            eprintln!("SIDENOTE_KB_TOKEN not set; skipping knowledge base live test.");
            return None;
        }
    };

    let mut client = KnowledgeBaseClient::new(Arc::new(MemoryStore::new()));
    client
        .save_config(ConnectionConfig {
            base_url: sidenote_services::knowledge::DEFAULT_BASE_URL.to_string(),
            token,
        })
        .await
        .ok()?;
    Some(client)
}

#[cfg(feature = "live-tests")]
#[tokio::test]
async fn test_live_connection_and_message() {
    let Some(mut client) = live_client().await else {
        return;
    };

    assert!(client.test_connection().await, "knowledge base unreachable");
    assert!(client.show_message("sidenote live test").await);
}
