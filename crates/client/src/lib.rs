//! `portal-client`: the HTTP side of the portal.
//!
//! Configuration, the reqwest transport, backend error parsing, the
//! authorization gateway (bearer + one-shot refresh), the auth and resource
//! endpoints, the SQLite session store, and the [`Portal`] composition root.

pub mod auth_api;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod portal;
pub mod resources;
pub mod store;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use auth_api::AuthApi;
pub use config::{ClientConfig, ConfigError};
pub use gateway::AuthGateway;
pub use portal::Portal;
pub use resources::{CategoriesApi, PlansApi, SubscriptionsApi};
pub use store::SqliteStore;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};
