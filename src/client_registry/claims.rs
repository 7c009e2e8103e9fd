use crate::client_registry::{ClientRegistry, Error};
use crate::tequila::AttributeSet;

impl ClientRegistry {
    /// Claims to add to the ID token of `client_id`.
    ///
    /// Claims the host already decided on win. Otherwise the client's `extra_id_token_claims`
    /// are picked from the user's claims; unknown clients get nothing.
    pub async fn extra_id_token_claims(
        &self,
        client_id: &str,
        base_claims: AttributeSet,
        user_claims: &AttributeSet,
    ) -> Result<AttributeSet, Error> {
        if !base_claims.is_empty() {
            return Ok(base_claims);
        }

        let snapshot = self.snapshot().await?;
        let Some(record) = snapshot.clients.get(client_id) else {
            return Ok(AttributeSet::new());
        };

        Ok(user_claims.select(&record.extra_id_token_claims))
    }
}
