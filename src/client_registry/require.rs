use crate::client_registry::{ClientRegistry, Error};
use crate::metrics_provider::METRICS_PROVIDER;
use crate::policy::PolicyContext;
use crate::tequila::{AttributeSet, TequilaConfig};
use tracing::{debug, info, instrument};

/// Response-side check of the client's `tequila_requires` against the released groups.
///
/// Only logins that went through the Tequila backend are checked.
#[derive(Clone, Debug)]
pub struct RequireCheck {
    backend_name: String,
    groups_attribute: String,
}

impl RequireCheck {
    pub fn new(config: &TequilaConfig) -> Self {
        Self {
            backend_name: config.backend_name.clone(),
            groups_attribute: config.groups_attribute.clone(),
        }
    }

    #[instrument(skip(self, registry, attributes))]
    pub async fn check(
        &self,
        registry: &ClientRegistry,
        target_backend: &str,
        client_id: &str,
        attributes: &AttributeSet,
    ) -> Result<(), Error> {
        if target_backend != self.backend_name {
            debug!("Login went through {target_backend}, nothing to check");
            return Ok(());
        }

        let result = self.evaluate(registry, client_id, attributes).await;

        let label = match &result {
            Ok(()) => "allowed",
            Err(e) if e.is_access_denied() => "denied",
            Err(_) => "error",
        };
        METRICS_PROVIDER
            .authorization_decisions_total
            .with_label_values(&[label])
            .inc();

        result
    }

    async fn evaluate(
        &self,
        registry: &ClientRegistry,
        client_id: &str,
        attributes: &AttributeSet,
    ) -> Result<(), Error> {
        let record = registry.get(client_id).await?;
        let formula = record.policy()?;

        if formula.is_empty() {
            return Ok(());
        }

        let groups = attributes
            .get(&self.groups_attribute)
            .filter(|groups| !groups.is_empty())
            .ok_or_else(|| Error::MissingGroups(client_id.to_string()))?;

        if formula.evaluate(&PolicyContext::with_groups(groups.iter().cloned())) {
            Ok(())
        } else {
            info!("Access to {client_id} denied by {formula}");
            Err(Error::PolicyNotSatisfied(client_id.to_string()))
        }
    }
}
