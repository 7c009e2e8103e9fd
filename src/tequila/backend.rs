use crate::tequila::{AttributeSet, Error, RedirectTarget, TequilaClient, TequilaConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

pub const AUTH_CLASS: &str = "tequila";
const CALLBACK_PATH: &str = "back-from-tequila";

/// Outcome of a completed login round-trip.
#[derive(Clone, Debug, Serialize)]
pub struct AuthenticatedUser {
    pub auth_class: String,
    pub authenticated_at: DateTime<Utc>,
    pub attributes: AttributeSet,
}

/// What the host's adapter layer calls to run a login against an upstream authority.
#[async_trait]
pub trait LoginBackend: Send + Sync {
    /// Path, relative to the broker's base URL, that must be routed to `handle_callback`.
    fn callback_endpoint(&self) -> String;

    async fn start_login(&self, requester: &str) -> Result<RedirectTarget, Error>;

    async fn handle_callback(&self, key: &str) -> Result<AuthenticatedUser, Error>;
}

pub struct TequilaBackend {
    name: String,
    base_url: String,
    requested_attributes: Vec<String>,
    client: TequilaClient,
}

impl TequilaBackend {
    pub fn new(base_url: &str, config: &TequilaConfig) -> Result<Self, Error> {
        Ok(Self::with_client(
            base_url,
            config,
            TequilaClient::new(config)?,
        ))
    }

    pub fn with_client(base_url: &str, config: &TequilaConfig, client: TequilaClient) -> Self {
        Self {
            name: config.backend_name.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            requested_attributes: config.request.clone(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_url(&self) -> String {
        format!("{}/{}", self.base_url, self.callback_endpoint())
    }
}

#[async_trait]
impl LoginBackend for TequilaBackend {
    fn callback_endpoint(&self) -> String {
        format!("{}/{CALLBACK_PATH}", self.name)
    }

    #[instrument(skip(self))]
    async fn start_login(&self, requester: &str) -> Result<RedirectTarget, Error> {
        info!("Starting Tequila login for {requester}");
        self.client
            .create_request(
                requester,
                &self.return_url(),
                &self.requested_attributes,
                None,
            )
            .await
    }

    #[instrument(skip(self, key))]
    async fn handle_callback(&self, key: &str) -> Result<AuthenticatedUser, Error> {
        let attributes = self.client.fetch_attributes(key).await?;
        debug!("Back from Tequila with {attributes:?}");

        Ok(AuthenticatedUser {
            auth_class: AUTH_CLASS.to_string(),
            authenticated_at: Utc::now(),
            attributes,
        })
    }
}
