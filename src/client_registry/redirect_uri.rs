use crate::client_registry::{ClientRegistry, Error};
use hyper::Uri;
use tracing::debug;

/// Whether `requested` is registered in `allowed`, either verbatim or through a wildcard entry.
///
/// A wildcard entry is `<scheme>://<authority>/*` and matches any path, query and fragment on
/// that origin.
pub fn is_allowed<S: AsRef<str>>(requested: &str, allowed: &[S]) -> bool {
    if allowed.iter().any(|uri| uri.as_ref() == requested) {
        return true;
    }

    let Some(wildcard) = wildcard_form(requested) else {
        debug!("Redirect URI {requested} cannot be parsed, exact match only");
        return false;
    };

    allowed.iter().any(|uri| uri.as_ref() == wildcard)
}

fn wildcard_form(uri: &str) -> Option<String> {
    let uri = uri.parse::<Uri>().ok()?;
    let scheme = uri.scheme_str()?;
    let authority = uri.authority()?;

    Some(format!("{scheme}://{authority}/*"))
}

impl ClientRegistry {
    pub async fn is_redirect_uri_allowed(
        &self,
        client_id: &str,
        requested: &str,
    ) -> Result<bool, Error> {
        let record = self.get(client_id).await?;
        Ok(is_allowed(requested, &record.redirect_uris))
    }
}
