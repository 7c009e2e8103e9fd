#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod client_registry;
pub mod configuration;
pub mod metrics_provider;
pub mod policy;
pub mod tequila;
