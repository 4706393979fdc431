//! Session manager: owns the in-memory session and its persisted copy.

use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, watch};

use portal_core::{KeyValueStore, PortalError, PortalResult};

use crate::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY, USER_ROLE_KEY};
use crate::{AuthBackend, AuthGrant, AuthState, Credentials, Identity, Registration, Role, Session};

/// Owns session state for one client instance.
///
/// Shared as `Arc<SessionManager>` by the authorization gateway and the route
/// guard. Tokens are only ever written here: by login/register, by the
/// gateway's refresh step through [`SessionManager::update_access_token`],
/// and cleared by logout/expiry.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    backend: Arc<dyn AuthBackend>,
    session: RwLock<Option<Session>>,
    state: watch::Sender<AuthState>,
    // Serializes every change to the session and its persisted copy.
    mutation: Mutex<()>,
}

impl SessionManager {
    /// Create a manager in the loading state. Call [`initialize`](Self::initialize)
    /// before the first guard decision.
    pub fn new(store: Arc<dyn KeyValueStore>, backend: Arc<dyn AuthBackend>) -> Self {
        let (state, _) = watch::channel(AuthState {
            is_loading: true,
            ..AuthState::default()
        });
        Self {
            store,
            backend,
            session: RwLock::new(None),
            state,
            mutation: Mutex::new(()),
        }
    }

    /// Hydrate from the persistent store.
    ///
    /// A missing or unparsable field means no session, and then all four
    /// persisted keys are purged so a partial session never survives.
    pub async fn initialize(&self) {
        let _mutation = self.mutation.lock().await;
        let session = match self.read_persisted().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted session; treating as signed out");
                None
            }
        };

        match &session {
            Some(s) => {
                tracing::info!(user_id = %s.user.id, role = %s.role, "session restored");
            }
            None => {
                if let Err(err) = self.store.remove_all(&SESSION_KEYS).await {
                    tracing::error!(error = %err, "failed to purge persisted session");
                }
            }
        }

        self.replace(session);
    }

    /// Current state snapshot (never blocks on IO).
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.refresh_token.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.read().as_ref().map(|s| s.role)
    }

    /// Customer login (`/auth/login/`).
    pub async fn login(&self, credentials: &Credentials) -> PortalResult<Identity> {
        self.sign_in(Role::Customer, credentials).await
    }

    /// Admin login (`/auth/admin/login/`). The session role is `admin`
    /// regardless of what the returned user payload says.
    pub async fn admin_login(&self, credentials: &Credentials) -> PortalResult<Identity> {
        self.sign_in(Role::Admin, credentials).await
    }

    /// Register a customer account and sign it in.
    pub async fn register(&self, registration: &Registration) -> PortalResult<Identity> {
        registration.validate()?;
        let grant = self.backend.register(&registration.to_request()).await?;
        self.establish(grant, Role::Customer).await
    }

    /// Sign out locally, then tell the server without waiting for it.
    pub async fn logout(&self) {
        let access = self.access_token();
        self.clear().await;
        tracing::info!("signed out");

        let Some(token) = access else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        handle.spawn(async move {
            if let Err(err) = backend.logout(&token).await {
                tracing::debug!(error = %err, "server-side logout failed (ignored)");
            }
        });
    }

    /// Forced sign-out after an unrecoverable authorization failure.
    pub async fn expire(&self) {
        if self.read().is_some() {
            tracing::warn!("session expired; purging credentials");
        }
        self.clear().await;
    }

    /// Replace the access token minted from `refresh_token`.
    ///
    /// Applies only while the current session is still the one holding
    /// `refresh_token`; the refresh token, user and role are left untouched.
    /// Returns `false` (and writes nothing) when the session was cleared or
    /// replaced while the refresh was in flight.
    pub async fn update_access_token(
        &self,
        refresh_token: &str,
        access_token: &str,
    ) -> PortalResult<bool> {
        let _mutation = self.mutation.lock().await;

        let owns_token = self
            .read()
            .as_ref()
            .is_some_and(|s| s.refresh_token == refresh_token);
        if !owns_token {
            tracing::debug!("discarding refreshed token for a session that is gone");
            return Ok(false);
        }

        self.store.set(ACCESS_TOKEN_KEY, access_token).await?;

        let mut guard = self.write();
        if let Some(session) = guard.as_mut() {
            session.access_token = access_token.to_string();
            tracing::debug!(user_id = %session.user.id, "access token refreshed");
        }
        Ok(true)
    }

    async fn sign_in(&self, role: Role, credentials: &Credentials) -> PortalResult<Identity> {
        credentials.validate()?;
        let grant = self.backend.login(role, credentials).await?;
        self.establish(grant, role).await
    }

    async fn establish(&self, grant: AuthGrant, role: Role) -> PortalResult<Identity> {
        let session = Session::from_grant(grant, role);
        let entries = session
            .to_entries()
            .map_err(|e| PortalError::storage(format!("failed to serialize user: {e}")))?;

        let _mutation = self.mutation.lock().await;
        if let Err(err) = self.store.write_all(&entries).await {
            // A non-transactional store may hold some of the keys by now.
            if let Err(cleanup) = self.store.remove_all(&SESSION_KEYS).await {
                tracing::error!(error = %cleanup, "failed to purge partially written session");
            }
            return Err(err);
        }

        let user = session.user.clone();
        tracing::info!(user_id = %user.id, role = %role, "session established");
        self.replace(Some(session));
        Ok(user)
    }

    async fn clear(&self) {
        let _mutation = self.mutation.lock().await;
        self.replace(None);
        if let Err(err) = self.store.remove_all(&SESSION_KEYS).await {
            tracing::error!(error = %err, "failed to purge persisted session");
        }
    }

    async fn read_persisted(&self) -> PortalResult<Option<Session>> {
        Ok(Session::from_persisted(
            self.store.get(ACCESS_TOKEN_KEY).await?,
            self.store.get(REFRESH_TOKEN_KEY).await?,
            self.store.get(USER_KEY).await?,
            self.store.get(USER_ROLE_KEY).await?,
        ))
    }

    fn replace(&self, session: Option<Session>) {
        let next = AuthState {
            is_loading: false,
            is_authenticated: session.is_some(),
            role: session.as_ref().map(|s| s.role),
            user: session.as_ref().map(|s| s.user.clone()),
        };
        *self.write() = session;
        self.state.send_replace(next);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
