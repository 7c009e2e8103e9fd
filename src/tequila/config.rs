use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TequilaConfig {
    #[serde(default = "TequilaConfig::default_backend_name")]
    pub backend_name: String,
    #[serde(default = "TequilaConfig::default_client_name")]
    pub client_name: String,
    #[serde(default = "TequilaConfig::default_request")]
    pub request: Vec<String>,
    #[serde(default = "TequilaConfig::default_groups_attribute")]
    pub groups_attribute: String,
    // Derived from the local host name when unset
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub server_ca_bundle: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Default for TequilaConfig {
    fn default() -> Self {
        TequilaConfig {
            backend_name: TequilaConfig::default_backend_name(),
            client_name: TequilaConfig::default_client_name(),
            request: TequilaConfig::default_request(),
            groups_attribute: TequilaConfig::default_groups_attribute(),
            host: None,
            port: None,
            protocol: None,
            server_ca_bundle: None,
            timeout_ms: None,
        }
    }
}

impl TequilaConfig {
    fn default_backend_name() -> String {
        "tequila".to_string()
    }

    fn default_client_name() -> String {
        "SATOSA TequilaBackend".to_string()
    }

    fn default_request() -> Vec<String> {
        ["name", "firstname", "lastname", "email", "group"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn default_groups_attribute() -> String {
        "group".to_string()
    }
}
