use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// No clause kind recognizes this requirement; carries its JSON rendering.
    UnknownClause(String),
    MalformedPolicy(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownClause(spec) => write!(f, "Unknown requirement: {spec}"),
            Error::MalformedPolicy(err) => write!(f, "Malformed requirement: {err}"),
        }
    }
}

impl std::error::Error for Error {}
