use crate::client_registry::ClientRegistryConfig;
use crate::tequila::TequilaConfig;
use hyper::Uri;
use serde::Deserialize;
use std::fs;
use std::path::Path;

mod error;

pub use error::Error;

#[derive(Clone, Debug, Deserialize)]
pub struct Configuration {
    /// Public URL of the broker deployment, used to build return URLs and to select
    /// Kubernetes client resources.
    pub base_url: String,
    #[serde(default)]
    pub tequila: TequilaConfig,
    #[serde(default)]
    pub client_registry: Option<ClientRegistryConfig>,
    #[serde(default)]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub tracing: Option<TracingConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TracingConfig {
    pub endpoint: String,
    #[serde(default = "TracingConfig::default_sampling_rate")]
    pub sampling_rate: f64,
}

impl TracingConfig {
    fn default_sampling_rate() -> f64 {
        1.0
    }
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config_str = fs::read_to_string(path)?;
        Self::load_from_str(&config_str)
    }

    pub fn load_from_str(slice: &str) -> Result<Self, Error> {
        let config: Configuration = toml::from_str(slice).map_err(|e| {
            println!("Configuration file format error:");
            println!("{e}");
            Error::ConfigurationFileFormat(e.to_string())
        })?;

        let base_url = config
            .base_url
            .parse::<Uri>()
            .map_err(|e| Error::InvalidValue(format!("base_url '{}': {e}", config.base_url)))?;
        if base_url.scheme().is_none() || base_url.authority().is_none() {
            return Err(Error::InvalidValue(format!(
                "base_url '{}' must be an absolute URL",
                config.base_url
            )));
        }

        if let Some(tracing) = config
            .observability
            .as_ref()
            .and_then(|observability| observability.tracing.as_ref())
        {
            if !(0.0..=1.0).contains(&tracing.sampling_rate) {
                return Err(Error::InvalidValue(
                    "observability.tracing.sampling_rate must be between 0 and 1".to_string(),
                ));
            }
        }

        Ok(config)
    }
}
