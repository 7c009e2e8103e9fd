use crate::client_registry::{json, kubernetes, Backend, ClientRegistry, Error};
use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClientRegistryConfig {
    #[serde(default = "ClientRegistryConfig::default_freshness_ms")]
    pub freshness_ms: u64,
    #[serde(flatten)]
    pub backend: BackendConfig,
}

/// Selected by `db_type`; an unknown or missing type is rejected when loading.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "db_type", rename_all = "snake_case")]
pub enum BackendConfig {
    Json(json::BackendConfig),
    Kubernetes(kubernetes::BackendConfig),
}

impl ClientRegistryConfig {
    fn default_freshness_ms() -> u64 {
        ClientRegistry::DEFAULT_FRESHNESS_MS
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_millis(self.freshness_ms)
    }

    pub async fn to_registry(&self, base_url: &str) -> Result<ClientRegistry, Error> {
        let backend: Box<dyn Backend> = match &self.backend {
            BackendConfig::Json(config) => Box::new(json::Backend::new(config)),
            BackendConfig::Kubernetes(config) => {
                Box::new(kubernetes::Backend::new(config, base_url).await?)
            }
        };

        Ok(ClientRegistry::new(backend, self.freshness()))
    }
}
