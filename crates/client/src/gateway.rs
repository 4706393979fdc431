//! Authorization gateway.
//!
//! Every protected call goes through [`AuthGateway::send`], which attaches the
//! current access token and, on a 401, refreshes once and replays the call.
//! A call is replayed at most once; a second 401 (or a failed refresh) ends
//! the session and sends the user to the login page.
//!
//! Refreshes are single-flighted: concurrent 401s queue on one lock, and a
//! caller that gets the lock after another has already swapped the token
//! reuses the new token instead of refreshing again.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;

use portal_auth::navigation::{Navigation, Navigator};
use portal_auth::{SessionManager, routes};
use portal_core::{PortalError, PortalResult};

use crate::auth_api::AuthApi;
use crate::errors::{self, ErrorContext};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

/// Replays allowed per call.
pub const MAX_RETRIES: u8 = 1;

const UNAUTHORIZED: u16 = 401;

#[derive(Debug, Error)]
enum RefreshError {
    #[error("no refresh token available")]
    MissingRefreshToken,
    #[error("refresh rejected: {0}")]
    Rejected(PortalError),
    #[error("failed to persist refreshed token: {0}")]
    Persist(PortalError),
    #[error("session ended while refreshing")]
    SessionEnded,
    #[error("a different session signed in while refreshing")]
    SessionChanged,
}

/// Tokens of the session a call started under.
struct Origin {
    access: Option<String>,
    refresh: Option<String>,
}

pub struct AuthGateway {
    transport: Arc<dyn HttpTransport>,
    auth: AuthApi,
    session: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
    refresh_lock: Mutex<()>,
}

impl AuthGateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth: AuthApi::new(transport.clone()),
            transport,
            session,
            navigator,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Send `request` with the current bearer. Returns the 2xx response, or
    /// the non-success status folded into a [`PortalError`].
    ///
    /// A refresh only ever serves the session the call started under. If a
    /// different user signs in meanwhile, the call fails with its 401 and the
    /// new session is left alone.
    pub async fn send(&self, request: ApiRequest) -> PortalResult<ApiResponse> {
        let session = self.session.session();
        let origin = Origin {
            access: session.as_ref().map(|s| s.access_token.clone()),
            refresh: session.map(|s| s.refresh_token),
        };
        let mut retries: u8 = 0;
        let mut token = origin.access.clone();

        loop {
            let mut attempt = request.clone();
            attempt.bearer = token.clone();

            let response = self.transport.send(&attempt).await?;
            if response.status != UNAUTHORIZED {
                return if response.is_success() {
                    Ok(response)
                } else {
                    Err(errors::from_response(&response, ErrorContext::Resource))
                };
            }

            if retries >= MAX_RETRIES {
                tracing::warn!(path = %request.path, "request rejected after token refresh");
                return Err(self.reject(&origin, &response).await);
            }
            retries += 1;

            match self.refresh(&origin, token.as_deref()).await {
                Ok(fresh) => {
                    tracing::debug!(path = %request.path, "replaying request with refreshed token");
                    token = Some(fresh);
                }
                Err(err) => {
                    tracing::warn!(path = %request.path, error = %err, "token refresh failed");
                    return Err(self.reject(&origin, &response).await);
                }
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, request: ApiRequest) -> PortalResult<T> {
        self.send(request).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> PortalResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post_json(path, body)?).await?.json()
    }

    async fn refresh(&self, origin: &Origin, stale: Option<&str>) -> Result<String, RefreshError> {
        let _guard = self.refresh_lock.lock().await;

        let Some(current) = self.session.session() else {
            return Err(match origin.refresh {
                Some(_) => RefreshError::SessionEnded,
                None => RefreshError::MissingRefreshToken,
            });
        };
        if origin.refresh.as_deref() != Some(current.refresh_token.as_str()) {
            return Err(RefreshError::SessionChanged);
        }
        if stale != Some(current.access_token.as_str()) {
            return Ok(current.access_token);
        }

        let access = self
            .auth
            .refresh(&current.refresh_token)
            .await
            .map_err(RefreshError::Rejected)?;
        let applied = self
            .session
            .update_access_token(&current.refresh_token, &access)
            .await
            .map_err(RefreshError::Persist)?;
        if !applied {
            return Err(match self.session.session() {
                Some(_) => RefreshError::SessionChanged,
                None => RefreshError::SessionEnded,
            });
        }
        tracing::info!("access token refreshed");
        Ok(access)
    }

    /// Unrecoverable 401. Ends the session the call started under and sends
    /// the user to login; a session that replaced it in the meantime is kept.
    async fn reject(&self, origin: &Origin, response: &ApiResponse) -> PortalError {
        let current = self.session.refresh_token();
        if current.is_none() || current == origin.refresh {
            self.session.expire().await;
            self.navigator.navigate(Navigation::replace(routes::LOGIN));
        } else {
            tracing::debug!("keeping the session that signed in during the call");
        }
        errors::from_response(response, ErrorContext::Resource)
    }
}
