mod attributes;
mod backend;
mod client;
mod config;
mod error;
mod http_client;
pub mod wire;


pub use attributes::{AttributeSet, GROUP_ATTRIBUTE};
pub use backend::{AuthenticatedUser, LoginBackend, TequilaBackend, AUTH_CLASS};
pub use client::{derive_server_host, RedirectTarget, TequilaClient};
pub use config::TequilaConfig;
pub use error::Error;
