use hyper::StatusCode;
use std::fmt;
use tracing::debug;

#[derive(Debug)]
pub enum Error {
    /// The server answered, but not with something we can use.
    RemoteProtocol {
        status: StatusCode,
        body: String,
    },
    /// The server could not be reached or the exchange broke off.
    Transport(String),
    Timeout,
    Configuration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::RemoteProtocol { status, body } => {
                write!(f, "Tequila protocol error (status {status}): {body}")
            }
            Error::Transport(err) => write!(f, "Tequila transport error: {err}"),
            Error::Timeout => write!(f, "Tequila request timed out"),
            Error::Configuration(err) => write!(f, "Tequila configuration error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<hyper_util::client::legacy::Error> for Error {
    fn from(error: hyper_util::client::legacy::Error) -> Self {
        debug!("HTTP client error: {error:?}");
        Error::Transport(error.to_string())
    }
}

impl From<hyper::Error> for Error {
    fn from(error: hyper::Error) -> Self {
        debug!("Hyper error: {error:?}");
        Error::Transport(error.to_string())
    }
}

impl From<hyper::http::Error> for Error {
    fn from(error: hyper::http::Error) -> Self {
        debug!("HTTP request build error: {error:?}");
        Error::Configuration(error.to_string())
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(error: serde_urlencoded::ser::Error) -> Self {
        Error::Configuration(format!("Unable to encode request key: {error}"))
    }
}
