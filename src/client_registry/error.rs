use crate::policy;
use std::{fmt, io};
use tracing::debug;

#[derive(Debug)]
pub enum Error {
    /// The registry could not be (re)loaded from its backend.
    BackendUnavailable(String),
    UnknownClient(String),
    PolicyNotSatisfied(String),
    /// The client has requirements but the user carries no groups to check them against.
    MissingGroups(String),
    Policy(policy::Error),
}

impl Error {
    /// Whether this is a legitimate access denial rather than a technical or configuration
    /// failure.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            Error::UnknownClient(_) | Error::PolicyNotSatisfied(_) | Error::MissingGroups(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BackendUnavailable(err) => write!(f, "Client registry unavailable: {err}"),
            Error::UnknownClient(client_id) => write!(f, "Unknown client {client_id}"),
            Error::PolicyNotSatisfied(client_id) => {
                write!(f, "You do not have access to this Web application ({client_id})")
            }
            Error::MissingGroups(client_id) => write!(
                f,
                "Requirements of {client_id} cannot be checked: no groups were released for the user"
            ),
            Error::Policy(err) => write!(f, "Error in Tequila requirements: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<policy::Error> for Error {
    fn from(error: policy::Error) -> Self {
        debug!("Policy error: {error}");
        Error::Policy(error)
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        debug!("I/O error: {error:?}");
        Error::BackendUnavailable(format!("I/O error: {error}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        debug!("JSON error: {error:?}");
        Error::BackendUnavailable(format!("Invalid client registry document: {error}"))
    }
}

impl From<kube::Error> for Error {
    fn from(error: kube::Error) -> Self {
        debug!("Kubernetes error: {error:?}");
        Error::BackendUnavailable(format!("Kubernetes API error: {error}"))
    }
}
