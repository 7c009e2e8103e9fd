use crate::client_registry::{Backend as RegistryBackend, ClientRecord, Error};
use crate::policy::ClauseSpec;
use async_trait::async_trait;
use kube::api::{Api, ListParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "BackendConfig::default_group")]
    pub group: String,
    #[serde(default = "BackendConfig::default_version")]
    pub version: String,
    #[serde(default = "BackendConfig::default_kind")]
    pub kind: String,
    #[serde(default = "BackendConfig::default_plural")]
    pub plural: String,
    // All namespaces when unset
    pub namespace: Option<String>,
}

impl BackendConfig {
    fn default_group() -> String {
        "tequila.epfl.ch".to_string()
    }

    fn default_version() -> String {
        "v1".to_string()
    }

    fn default_kind() -> String {
        "OIDCClient".to_string()
    }

    fn default_plural() -> String {
        "oidcclients".to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ClientResourceSpec {
    oidc: OidcSpec,
    #[serde(default)]
    tequila: TequilaSpec,
}

#[derive(Debug, Deserialize)]
struct OidcSpec {
    #[serde(rename = "providerURL")]
    provider_url: String,
    #[serde(rename = "clientID")]
    client_id: String,
    #[serde(rename = "redirectURIs", default)]
    redirect_uris: Vec<String>,
    #[serde(rename = "extraIDTokenClaims", default)]
    extra_id_token_claims: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct TequilaSpec {
    #[serde(default)]
    requires: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Condition {
    AnyOf { or: Vec<Equality> },
    Equals(Equality),
}

#[derive(Debug, Deserialize)]
struct Equality {
    key: String,
    value: String,
}

impl From<Condition> for ClauseSpec {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Equals(Equality { key, value }) => ClauseSpec::equals(key, value),
            Condition::AnyOf { or } => {
                ClauseSpec::any_of(or.into_iter().map(|Equality { key, value }| (key, value)))
            }
        }
    }
}

fn same_base_url(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

/// Maps custom resources to client records, keeping only those declared for `base_url`.
fn records_from_resources<'a, I>(base_url: &str, resources: I) -> HashMap<String, ClientRecord>
where
    I: IntoIterator<Item = (Option<&'a str>, &'a Value)>,
{
    let mut clients = HashMap::new();

    for (name, data) in resources {
        let name = name.unwrap_or("<unnamed>");

        let Some(spec) = data.get("spec") else {
            warn!("Skipping client resource {name}: no spec");
            continue;
        };

        let spec = match ClientResourceSpec::deserialize(spec) {
            Ok(spec) => spec,
            Err(error) => {
                warn!("Skipping client resource {name}: {error}");
                continue;
            }
        };

        if !same_base_url(&spec.oidc.provider_url, base_url) {
            debug!(
                "Skipping client resource {name}: provider {} is not {base_url}",
                spec.oidc.provider_url
            );
            continue;
        }

        let record = ClientRecord {
            client_id: spec.oidc.client_id.clone(),
            redirect_uris: spec.oidc.redirect_uris,
            extra_id_token_claims: spec.oidc.extra_id_token_claims,
            tequila_requires: spec
                .tequila
                .requires
                .into_iter()
                .map(ClauseSpec::from)
                .collect(),
            extra: spec.oidc.extra,
        };

        if clients.insert(spec.oidc.client_id.clone(), record).is_some() {
            warn!(
                "Client {} is declared by several resources, keeping {name}",
                spec.oidc.client_id
            );
        }
    }

    clients
}

/// Client registry backed by namespaced custom resources, listed on every fetch.
pub struct Backend {
    api: Api<DynamicObject>,
    base_url: String,
}

impl Backend {
    pub async fn new(config: &BackendConfig, base_url: &str) -> Result<Self, Error> {
        let client = kube::Client::try_default().await?;

        let gvk = GroupVersionKind::gvk(&config.group, &config.version, &config.kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, &config.plural);

        let api = match &config.namespace {
            Some(namespace) => Api::namespaced_with(client, namespace, &resource),
            None => Api::all_with(client, &resource),
        };

        info!(
            "Using Kubernetes client registry ({}/{} {})",
            config.group, config.version, config.plural
        );

        Ok(Self {
            api,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl RegistryBackend for Backend {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    async fn fetch_all(&self) -> Result<HashMap<String, ClientRecord>, Error> {
        let resources = self.api.list(&ListParams::default()).await?;

        let clients = records_from_resources(
            &self.base_url,
            resources
                .items
                .iter()
                .map(|resource| (resource.metadata.name.as_deref(), &resource.data)),
        );

        debug!(
            "Loaded {} clients out of {} resources",
            clients.len(),
            resources.items.len()
        );
        Ok(clients)
    }
}
