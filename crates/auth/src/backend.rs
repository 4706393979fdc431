use async_trait::async_trait;

use portal_core::PortalResult;

use crate::{AuthGrant, Credentials, RegisterRequest, Role};

/// The unauthenticated half of the auth API.
///
/// Implementations send these calls without a bearer credential and never
/// attempt a token refresh: a 401 here means the credentials were rejected.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for tokens at the entry point for `role`.
    async fn login(&self, role: Role, credentials: &Credentials) -> PortalResult<AuthGrant>;

    async fn register(&self, request: &RegisterRequest) -> PortalResult<AuthGrant>;

    /// Best-effort server-side logout. Callers ignore the outcome.
    async fn logout(&self, access_token: &str) -> PortalResult<()>;
}
