use tequila_broker::client_registry::ClientRegistry;
use tequila_broker::configuration::Configuration;

pub mod authorize;
pub mod check_redirect;
pub mod clients;
mod error;
pub mod fetch_attributes;
pub mod login;

pub use error::Error;

/// Builds the client registry, failing if the configuration has none.
pub async fn client_registry(config: &Configuration) -> Result<ClientRegistry, Error> {
    let registry_config = config
        .client_registry
        .as_ref()
        .ok_or(Error::MissingClientRegistry)?;

    Ok(registry_config.to_registry(&config.base_url).await?)
}
