use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::network::{Network, NetworkError};

/// Process-wide list of the default project's networks.
///
/// Filled lazily and never invalidated. Only one refresh runs at a time.
/// Callers that queued behind a refresh take its outcome, even an empty one,
/// rather than fetching again themselves. A failed or empty refresh leaves the
/// cache empty and the next request after it tries again.
#[derive(Debug, Default)]
pub struct DefaultNetworkCache {
    networks: Mutex<Vec<Network>>,
    refreshing: Mutex<()>,
    /// Completed refresh attempts, successful or not
    generation: AtomicU64,
}

impl DefaultNetworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<Network> {
        self.networks.lock().await.clone()
    }

    pub async fn is_populated(&self) -> bool {
        !self.networks.lock().await.is_empty()
    }

    /// Cached defaults, calling `fetch` first when the cache is empty.
    /// Fetch errors are logged and swallowed.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Vec<Network>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Network>, NetworkError>>,
    {
        let seen = {
            let cached = self.networks.lock().await;
            if !cached.is_empty() {
                return cached.clone();
            }
            self.generation.load(Ordering::Acquire)
        };

        let _refresh = self.refreshing.lock().await;
        if self.generation.load(Ordering::Acquire) != seen {
            return self.snapshot().await;
        }

        let fetched = match fetch().await {
            Ok(networks) => reduce_defaults(networks),
            Err(e) => {
                tracing::error!(error = %e, "Failed to get default networks");
                Vec::new()
            }
        };

        let mut cached = self.networks.lock().await;
        if !fetched.is_empty() {
            tracing::info!("Cached {} default networks", fetched.len());
            *cached = fetched;
        }
        self.generation.fetch_add(1, Ordering::Release);
        cached.clone()
    }
}

/// Collapse networks to `{id, label}` records, one per id.
/// The first occurrence keeps its position; the last label wins.
pub fn reduce_defaults(networks: Vec<Network>) -> Vec<Network> {
    let mut reduced: Vec<Network> = Vec::with_capacity(networks.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for network in networks {
        let Some(id) = network.api_id().map(str::to_string) else {
            tracing::debug!("Skipping default network without an id");
            continue;
        };

        match positions.get(&id) {
            Some(&index) => reduced[index].label = network.label,
            None => {
                positions.insert(id.clone(), reduced.len());
                reduced.push(Network {
                    id: Some(id),
                    label: network.label,
                    ..Default::default()
                });
            }
        }
    }

    reduced
}
