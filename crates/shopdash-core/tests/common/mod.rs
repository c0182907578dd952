//! Shared setup for the integration tests: a client wired to a wiremock
//! server, an in-memory credential store and a channel navigator.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use shopdash_core::auth::{MemoryBackend, TokenBackend};
use shopdash_core::{
    ApiClient, ChannelNavigator, CredentialStore, Navigation, SessionContext, StoreError, TokenKind,
};
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::MockServer;

pub struct Harness {
    pub client: ApiClient,
    pub store: Arc<CredentialStore>,
    pub session: SessionContext,
    pub nav_rx: UnboundedReceiver<Navigation>,
}

impl Harness {
    pub async fn new(server: &MockServer) -> Self {
        Self::with_backend(server, MemoryBackend::new()).await
    }

    pub async fn with_backend(server: &MockServer, backend: impl TokenBackend + 'static) -> Self {
        let store = Arc::new(CredentialStore::new(backend));
        let (navigator, nav_rx) = ChannelNavigator::new();
        let navigator = Arc::new(navigator);

        let client = ApiClient::new(
            &format!("{}/api", server.uri()),
            Duration::from_secs(5),
            store.clone(),
            navigator.clone(),
        )
        .expect("client builds");
        let session = SessionContext::new(store.clone(), client.auth().clone(), navigator);

        Self {
            client,
            store,
            session,
            nav_rx,
        }
    }

    pub fn with_tokens(self, access: &str, refresh: &str) -> Self {
        self.store.set_pair(access, refresh).expect("store tokens");
        self
    }

    /// All navigation requests sent so far
    pub fn navigations(&mut self) -> Vec<Navigation> {
        let mut seen = Vec::new();
        while let Ok(nav) = self.nav_rx.try_recv() {
            seen.push(nav);
        }
        seen
    }
}

/// Unreadable until cleared, like a damaged session file
#[derive(Default)]
pub struct CorruptBackend {
    cleared: AtomicBool,
}

impl TokenBackend for CorruptBackend {
    fn name(&self) -> &'static str {
        "corrupt"
    }

    fn read(&self, _kind: TokenKind) -> Result<Option<String>, StoreError> {
        if self.cleared.load(Ordering::SeqCst) {
            Ok(None)
        } else {
            Err(StoreError::Corrupt("session.json: expected value".to_string()))
        }
    }

    fn write(&self, _tokens: &[(TokenKind, &str)]) -> Result<(), StoreError> {
        Err(StoreError::Corrupt("session.json: expected value".to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Empty store that rejects every write and counts clears
#[derive(Default)]
pub struct ReadOnlyBackend {
    pub clears: Arc<AtomicUsize>,
}

impl TokenBackend for ReadOnlyBackend {
    fn name(&self) -> &'static str {
        "read-only"
    }

    fn read(&self, _kind: TokenKind) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn write(&self, _tokens: &[(TokenKind, &str)]) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn order_json(order_number: &str, status: &str) -> Value {
    json!({
        "order_number": order_number,
        "userID": 7,
        "username": "alice",
        "product_id": 3,
        "quantity": 1,
        "amount": "25.00",
        "invoice_id": null,
        "delivery_method": "Courier",
        "delivery_address": "12 Main St",
        "payment_method": "Card",
        "payment_status": "Paid",
        "order_status": status,
        "timestamp": "2025-04-02T09:30:00Z"
    })
}

pub fn summary_json() -> Value {
    json!({
        "total_revenue": "980.00",
        "active_orders": 3,
        "total_products": 14,
        "total_customers": 6,
        "revenue_trend": [{"month": "Mar", "amount": 980.0}],
        "recent_orders": []
    })
}
