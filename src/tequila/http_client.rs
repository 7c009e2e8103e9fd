use crate::tequila::Error;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use rustls::RootCertStore;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::CertificateDer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Plain-text POST client used for the Tequila back channel.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Option<Duration>,
}

#[derive(Clone, Debug, Default)]
pub struct HttpClientConfig {
    pub server_ca_bundle: Option<String>,
    pub timeout: Option<Duration>,
}

#[derive(Debug)]
pub struct TextResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, Error> {
        let tls_config = build_tls_config(config.server_ca_bundle)?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    pub async fn post_text(&self, uri: &Uri, body: String) -> Result<TextResponse, Error> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body(Full::new(Bytes::from(body)))?;

        let exchange = async {
            let response = self.client.request(request).await?;
            let status = response.status();
            let body = response.into_body().collect().await?.to_bytes();
            Ok::<_, Error>(TextResponse {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        };

        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, exchange).await.map_err(|_| {
                warn!("Request to {uri} timed out after {timeout:?}");
                Error::Timeout
            })??,
            None => exchange.await?,
        };

        debug!("{uri} answered with status {}", response.status);
        Ok(response)
    }
}

fn build_tls_config(ca_bundle: Option<String>) -> Result<rustls::ClientConfig, Error> {
    let mut root_store = RootCertStore::empty();

    let certs = if let Some(bundle) = ca_bundle {
        CertificateDer::pem_file_iter(&bundle)
            .and_then(|certs| certs.collect::<Result<Vec<_>, _>>())
            .map_err(|e| Error::Configuration(format!("Unable to read CA bundle {bundle}: {e}")))?
    } else {
        rustls_native_certs::load_native_certs().certs
    };

    root_store.add_parsable_certificates(certs);

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Configuration(format!("Unable to build TLS configuration: {e}")))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(config)
}
