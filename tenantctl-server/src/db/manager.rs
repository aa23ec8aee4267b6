//! Tenant connection lifecycle manager.
//!
//! A process-wide registry mapping `(tenant key, url)` to a live connection
//! handle: lazy creation, reuse, explicit teardown. The manager is an owned
//! component held in application state and passed by reference into request
//! handlers, never a hidden static.
//!
//! Registry entries are per-key single-flight cells: the first caller for an
//! absent key performs the open while concurrent callers wait on the same
//! cell and reuse its result, so unrelated tenants' opens never serialize
//! against each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use thiserror::Error;
use tokio::sync::OnceCell;

use tenantctl_core::ConnectionConfig;

/// Maximum connections sqlx keeps inside one tenant handle.
/// Kept low; the service caches one handle per tenant, not a pool farm.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Error opening a tenant connection.
#[derive(Debug, Error)]
#[error("failed to connect to '{url}': {source}")]
pub struct ConnectionError {
    pub url: String,
    #[source]
    pub source: sqlx::Error,
}

/// Opens and closes the handles the manager caches.
///
/// The production connector opens sqlx `Any` pools; tests substitute a mock
/// to observe open counts without a database.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: Send + Sync + 'static;

    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Handle, ConnectionError>;

    async fn disconnect(&self, handle: &Self::Handle);
}

/// sqlx-backed connector. Driver selection follows the URL scheme.
pub struct SqlxConnector {
    max_connections: u32,
}

impl SqlxConnector {
    pub fn new(max_connections: u32) -> Self {
        Self { max_connections }
    }
}

impl Default for SqlxConnector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONNECTIONS)
    }
}

#[async_trait]
impl Connector for SqlxConnector {
    type Handle = AnyPool;

    async fn connect(&self, config: &ConnectionConfig) -> Result<AnyPool, ConnectionError> {
        AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&config.url)
            .await
            .map_err(|source| ConnectionError {
                url: config.url.clone(),
                source,
            })
    }

    async fn disconnect(&self, handle: &AnyPool) {
        handle.close().await;
    }
}

type Entry<H> = Arc<OnceCell<Arc<H>>>;

/// Manager over sqlx `Any` pools, as held in application state.
pub type TenantConnections = ConnectionManager<SqlxConnector>;

/// The tenant connection manager.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    registry: Mutex<HashMap<String, Entry<C::Handle>>>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            registry: Mutex::new(HashMap::new()),
        }
    }

    /// A tenant is identified by the `(tenant key, url)` pair, not the URL
    /// alone.
    fn composite_key(tenant_key: &str, config: &ConnectionConfig) -> String {
        format!("{}_{}", tenant_key, config.url)
    }

    /// Returns the live handle for `(tenant_key, config.url)`, opening it on
    /// first request.
    ///
    /// Cached handles are returned as-is; there is no freshness or health
    /// check. Concurrent calls for one absent key perform exactly one open
    /// and observe the same handle. An open failure leaves no registry entry
    /// behind.
    pub async fn get_connection(
        &self,
        tenant_key: &str,
        config: &ConnectionConfig,
    ) -> Result<Arc<C::Handle>, ConnectionError> {
        let key = Self::composite_key(tenant_key, config);

        loop {
            let cell = {
                let mut registry = self.registry.lock().expect("registry poisoned");
                Arc::clone(registry.entry(key.clone()).or_default())
            };

            let handle = match cell
                .get_or_try_init(|| async { self.connector.connect(config).await.map(Arc::new) })
                .await
            {
                Ok(handle) => Arc::clone(handle),
                Err(err) => {
                    // Drop the never-initialized cell so a bad URL does not
                    // accumulate registry entries.
                    let mut registry = self.registry.lock().expect("registry poisoned");
                    let abandoned = registry
                        .get(&key)
                        .is_some_and(|c| Arc::ptr_eq(c, &cell) && c.get().is_none());
                    if abandoned {
                        registry.remove(&key);
                    }
                    return Err(err);
                }
            };

            // A close may have raced the open. Only hand out handles that are
            // still registered; anything evicted mid-open is closed here and
            // the lookup starts over.
            let still_registered = {
                let registry = self.registry.lock().expect("registry poisoned");
                registry.get(&key).is_some_and(|c| Arc::ptr_eq(c, &cell))
            };
            if still_registered {
                return Ok(handle);
            }
            self.connector.disconnect(&handle).await;
        }
    }

    /// Closes and removes the handle for `(tenant_key, config.url)`.
    ///
    /// No-op when the key has no entry. The entry is removed regardless of
    /// how the close goes, so a stuck handle cannot pin its registry slot.
    pub async fn close_connection(&self, tenant_key: &str, config: &ConnectionConfig) {
        let key = Self::composite_key(tenant_key, config);
        let cell = {
            let mut registry = self.registry.lock().expect("registry poisoned");
            registry.remove(&key)
        };

        if let Some(cell) = cell {
            if let Some(handle) = cell.get() {
                self.connector.disconnect(handle).await;
                tracing::debug!(key = %key, "closed tenant connection");
            }
        }
    }

    /// Closes every registered handle and clears the registry.
    ///
    /// Intended to run once, at process shutdown; the registry repopulates
    /// lazily if anything calls `get_connection` afterwards.
    pub async fn close_all_connections(&self) {
        let entries: Vec<(String, Entry<C::Handle>)> = {
            let mut registry = self.registry.lock().expect("registry poisoned");
            registry.drain().collect()
        };

        for (key, cell) in entries {
            if let Some(handle) = cell.get() {
                self.connector.disconnect(handle).await;
                tracing::debug!(key = %key, "closed tenant connection");
            }
        }
        tracing::info!("all tenant connections closed");
    }

    /// Number of registered entries, counting opens still in flight.
    pub fn len(&self) -> usize {
        self.registry.lock().expect("registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: Connector + Default> Default for ConnectionManager<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use tenantctl_core::Provider;

    struct MockConnector {
        opens: AtomicUsize,
        closes: AtomicUsize,
        fail: AtomicBool,
    }

    impl MockConnector {
        fn new() -> Self {
            Self {
                opens: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        type Handle = usize;

        async fn connect(&self, config: &ConnectionConfig) -> Result<usize, ConnectionError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ConnectionError {
                    url: config.url.clone(),
                    source: sqlx::Error::PoolClosed,
                });
            }
            // Widen the first-open window so concurrent callers pile onto it.
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(self.opens.fetch_add(1, Ordering::SeqCst))
        }

        async fn disconnect(&self, _handle: &usize) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig::new(Provider::Sqlite, "sqlite://tenants.db")
    }

    fn manager() -> ConnectionManager<MockConnector> {
        ConnectionManager::new(MockConnector::new())
    }

    #[tokio::test]
    async fn repeated_gets_return_the_same_handle() {
        let manager = manager();
        let config = config();

        let first = manager.get_connection("acme", &config).await.unwrap();
        let second = manager.get_connection("acme", &config).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.connector.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_gets_open_exactly_once() {
        let manager = Arc::new(manager());
        let config = config();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let config = config.clone();
                tokio::spawn(async move { manager.get_connection("acme", &config).await.unwrap() })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap());
        }

        assert_eq!(manager.connector.opens.load(Ordering::SeqCst), 1);
        assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn distinct_tenants_on_one_url_get_distinct_handles() {
        let manager = manager();
        let config = config();

        let acme = manager.get_connection("acme", &config).await.unwrap();
        let globex = manager.get_connection("globex", &config).await.unwrap();

        assert!(!Arc::ptr_eq(&acme, &globex));
        assert_eq!(manager.connector.opens.load(Ordering::SeqCst), 2);
        assert_eq!(manager.len(), 2);
    }

    #[tokio::test]
    async fn close_on_absent_key_is_a_noop() {
        let manager = manager();
        manager.close_connection("nobody", &config()).await;
        assert!(manager.is_empty());
        assert_eq!(manager.connector.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn close_then_get_reopens() {
        let manager = manager();
        let config = config();

        let first = manager.get_connection("acme", &config).await.unwrap();
        manager.close_connection("acme", &config).await;
        assert!(manager.is_empty());

        let second = manager.get_connection("acme", &config).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(manager.connector.opens.load(Ordering::SeqCst), 2);
        assert_eq!(manager.connector.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_all_empties_the_registry() {
        let manager = manager();
        let config = config();

        manager.get_connection("acme", &config).await.unwrap();
        manager.get_connection("globex", &config).await.unwrap();
        assert_eq!(manager.len(), 2);

        manager.close_all_connections().await;
        assert!(manager.is_empty());
        assert_eq!(manager.connector.closes.load(Ordering::SeqCst), 2);

        manager.get_connection("acme", &config).await.unwrap();
        assert_eq!(manager.connector.opens.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failed_open_stores_no_entry() {
        let manager = manager();
        let config = config();

        manager.connector.fail.store(true, Ordering::SeqCst);
        assert!(manager.get_connection("acme", &config).await.is_err());
        assert!(manager.is_empty());

        manager.connector.fail.store(false, Ordering::SeqCst);
        let handle = manager.get_connection("acme", &config).await;
        assert!(handle.is_ok());
        assert_eq!(manager.len(), 1);
    }
}
