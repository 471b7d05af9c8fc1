//! Exchange adapters and the registry the router selects them from

pub mod auth;
pub mod messages;
pub mod registry;
pub mod rest;

pub use registry::ExchangeRegistry;
pub use rest::FuturesRestClient;
