use crate::metrics_provider::METRICS_PROVIDER;
use crate::tequila::http_client::{HttpClient, HttpClientConfig, TextResponse};
use crate::tequila::{wire, AttributeSet, Error, TequilaConfig};
use hyper::{StatusCode, Uri};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument};

const FALLBACK_HOST: &str = "tequila.epfl.ch";
const HOST_LABEL: &str = "tequila";
const DEFAULT_PORT: u16 = 443;
const DEFAULT_PROTOCOL: &str = "https";

/// Where to send the browser after a successful `createrequest`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the Tequila server host from the local host name by swapping its first label.
pub fn derive_server_host(local_hostname: &str) -> String {
    match local_hostname.split_once('.') {
        Some((_, domain)) if !domain.is_empty() => format!("{HOST_LABEL}.{domain}"),
        // Single-label names show up in containers
        _ => FALLBACK_HOST.to_string(),
    }
}

#[derive(Clone, Debug)]
struct Endpoints {
    create_request: Uri,
    auth: String,
    fetch_attributes: Uri,
    logout: String,
}

impl Endpoints {
    fn new(protocol: &str, host: &str, port: u16) -> Result<Self, Error> {
        let cgi = |name: &str| format!("{protocol}://{host}:{port}/cgi-bin/tequila/{name}");
        let parse = |uri: String| {
            uri.parse::<Uri>()
                .map_err(|e| Error::Configuration(format!("Invalid Tequila URI '{uri}': {e}")))
        };

        Ok(Self {
            create_request: parse(cgi("createrequest"))?,
            auth: cgi("auth"),
            fetch_attributes: parse(cgi("fetchattributes"))?,
            logout: cgi("logout"),
        })
    }
}

/// Headless client for the Tequila challenge/response protocol.
///
/// A login goes through `createrequest` (obtain a key and redirect the browser to `auth`),
/// then `fetchattributes` once the browser comes back with the key. Keys are single-use, so a
/// failed fetch ends the attempt.
#[derive(Clone, Debug)]
pub struct TequilaClient {
    client_name: String,
    http_client: HttpClient,
    endpoints: Endpoints,
}

impl TequilaClient {
    pub fn new(config: &TequilaConfig) -> Result<Self, Error> {
        let host = match &config.host {
            Some(host) => host.clone(),
            None => {
                let local = whoami::fallible::hostname().unwrap_or_default();
                derive_server_host(&local)
            }
        };
        let port = config.port.unwrap_or(DEFAULT_PORT);
        let protocol = config.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL);

        let endpoints = Endpoints::new(protocol, &host, port)?;
        info!("Using Tequila server at {protocol}://{host}:{port}");

        let http_client = HttpClient::new(HttpClientConfig {
            server_ca_bundle: config.server_ca_bundle.clone(),
            timeout: config.timeout_ms.map(Duration::from_millis),
        })?;

        Ok(Self {
            client_name: config.client_name.clone(),
            http_client,
            endpoints,
        })
    }

    pub fn logout_uri(&self) -> &str {
        &self.endpoints.logout
    }

    /// Obtains a request key and returns the URI the browser must visit to authenticate.
    #[instrument(skip(self, requested_attributes))]
    pub async fn create_request(
        &self,
        service: &str,
        return_url: &str,
        requested_attributes: &[String],
        require: Option<&str>,
    ) -> Result<RedirectTarget, Error> {
        let mut fields = vec![
            ("client", self.client_name.clone()),
            ("service", service.to_string()),
            ("urlaccess", return_url.to_string()),
        ];
        if !requested_attributes.is_empty() {
            fields.push(("request", requested_attributes.join(",")));
        }
        if let Some(require) = require {
            fields.push(("require", require.to_string()));
        }

        let body = wire::encode(&fields);
        debug!("Sending to {}: {body}", self.endpoints.create_request);

        let response = self
            .post("createrequest", &self.endpoints.create_request, body)
            .await?;

        let mut fields = wire::decode(&response.body);
        let Some(key) = fields.remove("key") else {
            return Err(Error::RemoteProtocol {
                status: response.status,
                body: response.body,
            });
        };

        let query = serde_urlencoded::to_string([("requestkey", key.as_str())])?;
        let redirect = RedirectTarget(format!("{}?{query}", self.endpoints.auth));
        debug!("Redirecting to {redirect}");
        Ok(redirect)
    }

    /// Redeems a request key for the authenticated user's attributes.
    #[instrument(skip(self, key))]
    pub async fn fetch_attributes(&self, key: &str) -> Result<AttributeSet, Error> {
        let body = wire::encode(&[("key", key)]);

        let response = self
            .post("fetchattributes", &self.endpoints.fetch_attributes, body)
            .await?;

        Ok(AttributeSet::from_wire(wire::decode(&response.body)))
    }

    async fn post(&self, endpoint: &str, uri: &Uri, body: String) -> Result<TextResponse, Error> {
        let timer = METRICS_PROVIDER
            .tequila_request_duration
            .with_label_values(&[endpoint])
            .start_timer();

        let result = self.http_client.post_text(uri, body).await;
        timer.observe_duration();

        let result = result.and_then(|response| {
            if response.status == StatusCode::OK {
                Ok(response)
            } else {
                debug!(
                    "Negative response from {endpoint} ({}): {}",
                    response.status, response.body
                );
                Err(Error::RemoteProtocol {
                    status: response.status,
                    body: response.body,
                })
            }
        });

        let label = match &result {
            Ok(_) => "success",
            Err(Error::RemoteProtocol { .. }) => "rejected",
            Err(_) => "error",
        };
        METRICS_PROVIDER
            .tequila_requests_total
            .with_label_values(&[endpoint, label])
            .inc();

        result
    }
}
