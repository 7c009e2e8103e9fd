use std::{fmt, io};
use tequila_broker::{client_registry, configuration, tequila};

#[derive(Debug)]
pub enum Error {
    IO(io::Error),
    Configuration(configuration::Error),
    Tequila(tequila::Error),
    ClientRegistry(client_registry::Error),
    MissingClientRegistry,
    RedirectNotAllowed(String),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IO(err) => write!(f, "IO error: {err}"),
            Error::Configuration(err) => {
                write!(f, "Configuration error: ")?;
                write!(f, "{err}")
            }
            Error::Tequila(err) => write!(f, "Tequila error: {err}"),
            Error::ClientRegistry(err) => write!(f, "Client registry error: {err}"),
            Error::MissingClientRegistry => {
                write!(f, "No [client_registry] section in the configuration")
            }
            Error::RedirectNotAllowed(uri) => write!(f, "Redirect URI {uri} is not registered"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IO(err)
    }
}

impl From<configuration::Error> for Error {
    fn from(err: configuration::Error) -> Self {
        Error::Configuration(err)
    }
}

impl From<tequila::Error> for Error {
    fn from(err: tequila::Error) -> Self {
        Error::Tequila(err)
    }
}

impl From<client_registry::Error> for Error {
    fn from(err: client_registry::Error) -> Self {
        Error::ClientRegistry(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
