use crate::client_registry::{Backend as RegistryBackend, ClientRecord, Error};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BackendConfig {
    pub path: PathBuf,
}

/// Client registry kept in a JSON document mapping client ids to records.
///
/// The file is read again on every fetch, so edits are picked up on the next refresh.
#[derive(Debug)]
pub struct Backend {
    path: PathBuf,
}

impl Backend {
    pub fn new(config: &BackendConfig) -> Self {
        info!("Using JSON client registry at {}", config.path.display());
        Self {
            path: config.path.clone(),
        }
    }
}

#[async_trait]
impl RegistryBackend for Backend {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn fetch_all(&self) -> Result<HashMap<String, ClientRecord>, Error> {
        let content = tokio::fs::read(&self.path).await.map_err(|error| {
            Error::BackendUnavailable(format!("Unable to read {}: {error}", self.path.display()))
        })?;

        let mut clients: HashMap<String, ClientRecord> = serde_json::from_slice(&content)?;
        for (client_id, record) in &mut clients {
            record.client_id.clone_from(client_id);
        }

        debug!("Loaded {} clients from {}", clients.len(), self.path.display());
        Ok(clients)
    }
}
