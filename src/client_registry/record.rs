use crate::policy::{self, ClauseSpec, PolicyFormula};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Metadata for one relying-party client.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ClientRecord {
    // Registry documents key records by client id
    #[serde(skip)]
    pub client_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub redirect_uris: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extra_id_token_claims: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tequila_requires: Vec<ClauseSpec>,
    /// Host-owned fields (`response_types`, `token_endpoint_auth_method`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientRecord {
    pub fn policy(&self) -> Result<PolicyFormula, policy::Error> {
        PolicyFormula::parse(&self.tequila_requires)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
