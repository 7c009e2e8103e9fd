//! Directory of relying-party clients, cached over a pluggable backend.
//!
//! The whole registry is fetched at once and kept as an immutable snapshot. Reads are served
//! from the snapshot while it is younger than the freshness window; past that, the next reader
//! fetches a new one and swaps it in. Concurrent readers may trigger duplicate fetches, and
//! a failed fetch leaves the previous snapshot in place without serving it.

use crate::metrics_provider::METRICS_PROVIDER;
use crate::policy::PolicyContext;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, instrument};

mod claims;
mod config;
mod error;
pub mod json;
pub mod kubernetes;
mod record;
pub mod redirect_uri;
mod require;

#[cfg(test)]
mod tests;

pub use config::{BackendConfig, ClientRegistryConfig};
pub use error::Error;
pub use record::ClientRecord;
pub use require::RequireCheck;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetches every client record, keyed by client id.
    async fn fetch_all(&self) -> Result<HashMap<String, ClientRecord>, Error>;
}

#[derive(Debug)]
pub struct Snapshot {
    pub clients: HashMap<String, Arc<ClientRecord>>,
    pub fetched_at: Instant,
}

pub struct ClientRegistry {
    backend: Box<dyn Backend>,
    freshness: Duration,
    snapshot: ArcSwapOption<Snapshot>,
}

impl ClientRegistry {
    pub const DEFAULT_FRESHNESS_MS: u64 = 2000;
    pub const DEFAULT_FRESHNESS: Duration = Duration::from_millis(Self::DEFAULT_FRESHNESS_MS);

    pub fn new(backend: Box<dyn Backend>, freshness: Duration) -> Self {
        Self {
            backend,
            freshness,
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// Returns the current snapshot, refreshing it first if it is stale.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, Error> {
        if let Some(snapshot) = self.snapshot.load_full() {
            if snapshot.fetched_at.elapsed() <= self.freshness {
                return Ok(snapshot);
            }
            debug!("Client registry snapshot is stale, refreshing");
        }

        self.refresh().await
    }

    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, Error> {
        let result = self.backend.fetch_all().await;

        let label = if result.is_ok() { "success" } else { "error" };
        METRICS_PROVIDER
            .client_registry_refresh_total
            .with_label_values(&[self.backend.name(), label])
            .inc();

        let clients = result.inspect_err(|e| error!("Unable to refresh client registry: {e}"))?;

        let snapshot = Arc::new(Snapshot {
            clients: clients
                .into_iter()
                .map(|(client_id, record)| (client_id, Arc::new(record)))
                .collect(),
            fetched_at: Instant::now(),
        });
        debug!("Client registry refreshed with {} clients", snapshot.clients.len());

        self.snapshot.store(Some(snapshot.clone()));
        Ok(snapshot)
    }

    pub async fn get(&self, client_id: &str) -> Result<Arc<ClientRecord>, Error> {
        self.snapshot()
            .await?
            .clients
            .get(client_id)
            .cloned()
            .ok_or_else(|| Error::UnknownClient(client_id.to_string()))
    }

    pub async fn contains(&self, client_id: &str) -> Result<bool, Error> {
        Ok(self.snapshot().await?.clients.contains_key(client_id))
    }

    /// Checks the client's requirements against what is known of the user.
    #[instrument(skip(self, context))]
    pub async fn authorize(&self, client_id: &str, context: &PolicyContext) -> Result<(), Error> {
        let record = self.get(client_id).await?;
        let formula = record.policy()?;

        if formula.evaluate(context) {
            Ok(())
        } else {
            Err(Error::PolicyNotSatisfied(client_id.to_string()))
        }
    }
}
