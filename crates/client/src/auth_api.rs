//! Auth endpoints, sent without refresh handling.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use portal_auth::{AuthBackend, AuthGrant, Credentials, RegisterRequest, Role};
use portal_core::{PortalError, PortalResult};

use crate::errors::{self, ErrorContext};
use crate::transport::{ApiRequest, HttpTransport};

pub const LOGIN_PATH: &str = "/auth/login/";
pub const ADMIN_LOGIN_PATH: &str = "/auth/admin/login/";
pub const REGISTER_PATH: &str = "/auth/register/";
pub const LOGOUT_PATH: &str = "/auth/logout/";
pub const REFRESH_PATH: &str = "/auth/token/refresh/";

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Clone)]
pub struct AuthApi {
    transport: Arc<dyn HttpTransport>,
}

impl AuthApi {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> PortalResult<String> {
        let request = ApiRequest::post(
            REFRESH_PATH,
            serde_json::json!({ "refresh": refresh_token }),
        );
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(errors::from_response(&response, ErrorContext::Resource));
        }
        let body: RefreshResponse = response.json()?;
        if body.access.is_empty() {
            return Err(PortalError::decode("refresh response carried an empty access token"));
        }
        Ok(body.access)
    }

    async fn grant(&self, request: ApiRequest, context: ErrorContext) -> PortalResult<AuthGrant> {
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(errors::from_response(&response, context));
        }
        response.json()
    }
}

#[async_trait]
impl AuthBackend for AuthApi {
    async fn login(&self, role: Role, credentials: &Credentials) -> PortalResult<AuthGrant> {
        let (path, context) = match role {
            Role::Customer => (LOGIN_PATH, ErrorContext::CustomerLogin),
            Role::Admin => (ADMIN_LOGIN_PATH, ErrorContext::AdminLogin),
        };
        self.grant(ApiRequest::post_json(path, credentials)?, context)
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> PortalResult<AuthGrant> {
        self.grant(
            ApiRequest::post_json(REGISTER_PATH, request)?,
            ErrorContext::Register,
        )
        .await
    }

    async fn logout(&self, access_token: &str) -> PortalResult<()> {
        let request = ApiRequest::post(LOGOUT_PATH, serde_json::json!({})).with_bearer(access_token);
        let response = self.transport.send(&request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(errors::from_response(&response, ErrorContext::Resource))
        }
    }
}
