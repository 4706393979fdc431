//! Composition root: wires configuration, storage, transport and the portal
//! services into one handle.

use std::sync::Arc;

use anyhow::Context;

use portal_auth::{HistoryNavigator, Navigator, RouteGuard, SessionManager};
use portal_core::{KeyValueStore, MemoryStore};
use portal_purchasing::{Checkout, DraftRepository};

use crate::auth_api::AuthApi;
use crate::config::ClientConfig;
use crate::gateway::AuthGateway;
use crate::resources::{CategoriesApi, PlansApi, SubscriptionsApi};
use crate::store::SqliteStore;
use crate::transport::{HttpTransport, ReqwestTransport};

pub struct Portal {
    config: ClientConfig,
    navigator: Arc<dyn Navigator>,
    session: Arc<SessionManager>,
    gateway: Arc<AuthGateway>,
    guard: RouteGuard,
    plans: PlansApi,
    categories: CategoriesApi,
    subscriptions: SubscriptionsApi,
    checkout: Checkout,
}

impl Portal {
    /// Initialize logging, read the environment, open the session database and
    /// hydrate the session. Navigation is recorded in a [`HistoryNavigator`].
    pub async fn from_env() -> anyhow::Result<Self> {
        portal_observability::init();
        let config = ClientConfig::from_env().context("invalid portal configuration")?;
        Self::connect(config, Arc::new(HistoryNavigator::new())).await
    }

    pub async fn connect(config: ClientConfig, navigator: Arc<dyn Navigator>) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&config.session_db)
            .await
            .with_context(|| {
                format!("failed to open session store at {}", config.session_db.display())
            })?;
        let transport = ReqwestTransport::new(config.api_base_url.clone(), config.http_timeout)
            .context("failed to build HTTP transport")?;

        let portal = Self::assemble(
            config,
            Arc::new(store),
            Arc::new(MemoryStore::new()),
            Arc::new(transport),
            navigator,
        );
        portal.session.initialize().await;
        tracing::info!(
            api = %portal.config.api_base_url,
            authenticated = portal.session.state().is_authenticated,
            "portal ready"
        );
        Ok(portal)
    }

    /// Wire services over explicit stores and transport. The session is left
    /// in the loading state; call `session().initialize()` before use.
    pub fn assemble(
        config: ClientConfig,
        persistent: Arc<dyn KeyValueStore>,
        ephemeral: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Arc::new(SessionManager::new(
            persistent,
            Arc::new(AuthApi::new(transport.clone())),
        ));
        let gateway = Arc::new(AuthGateway::new(
            transport,
            session.clone(),
            navigator.clone(),
        ));
        let subscriptions = SubscriptionsApi::new(gateway.clone());
        let checkout = Checkout::new(
            DraftRepository::new(ephemeral),
            Arc::new(subscriptions.clone()),
            navigator.clone(),
        )
        .with_processing_delay(config.payment_delay);

        Self {
            guard: RouteGuard::new(session.clone()),
            plans: PlansApi::new(gateway.clone()),
            categories: CategoriesApi::new(gateway.clone()),
            subscriptions,
            checkout,
            config,
            navigator,
            session,
            gateway,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn gateway(&self) -> &Arc<AuthGateway> {
        &self.gateway
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn plans(&self) -> &PlansApi {
        &self.plans
    }

    pub fn categories(&self) -> &CategoriesApi {
        &self.categories
    }

    pub fn subscriptions(&self) -> &SubscriptionsApi {
        &self.subscriptions
    }

    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }
}
