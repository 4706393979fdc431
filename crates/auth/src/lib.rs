//! `portal-auth`: client-side session and authorization boundary.
//!
//! Owns the session lifecycle (hydrate, sign in, sign out, token refresh
//! writes) and the route guard. This crate is decoupled from HTTP: the auth
//! endpoints are reached through [`AuthBackend`], storage through
//! `portal_core::KeyValueStore`, and routing through [`Navigator`].

pub mod backend;
pub mod credentials;
pub mod guard;
pub mod identity;
pub mod manager;
pub mod navigation;
pub mod roles;
pub mod routes;
pub mod session;

pub use backend::AuthBackend;
pub use credentials::{Credentials, RegisterRequest, Registration};
pub use guard::{GuardDecision, GuardState, RouteGuard};
pub use identity::Identity;
pub use manager::SessionManager;
pub use navigation::{HistoryNavigator, Navigation, Navigator};
pub use roles::Role;
pub use routes::RouteAccess;
pub use session::{AuthGrant, AuthState, Session};
