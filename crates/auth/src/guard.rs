//! Route guard: decides whether a protected view may render.

use std::sync::Arc;

use crate::navigation::Navigation;
use crate::routes::{self, RouteAccess};
use crate::{AuthState, SessionManager};

/// Reconciled view of loading, identity and authorization for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Unauthenticated,
    AuthenticatedAllowed,
    AuthenticatedDenied,
}

/// What the view layer should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Neutral placeholder, no redirect.
    Placeholder,
    Render,
    Redirect(Navigation),
}

/// Classify `state` against `access`.
///
/// - No IO
/// - No caching: callers evaluate on every render
pub fn classify(state: &AuthState, access: &RouteAccess) -> GuardState {
    if state.is_loading {
        return GuardState::Loading;
    }
    if access.is_public() {
        return GuardState::AuthenticatedAllowed;
    }
    if !state.is_authenticated {
        return GuardState::Unauthenticated;
    }
    if access.permits(state.role) {
        GuardState::AuthenticatedAllowed
    } else {
        GuardState::AuthenticatedDenied
    }
}

/// Decide what to do for a visit to `requested_path`.
pub fn evaluate(state: &AuthState, access: &RouteAccess, requested_path: &str) -> GuardDecision {
    match classify(state, access) {
        GuardState::Loading => GuardDecision::Placeholder,
        GuardState::AuthenticatedAllowed => GuardDecision::Render,
        GuardState::Unauthenticated => GuardDecision::Redirect(
            Navigation::replace(access.login_path()).with_from(requested_path),
        ),
        GuardState::AuthenticatedDenied => {
            GuardDecision::Redirect(Navigation::replace(routes::LANDING))
        }
    }
}

/// Guard bound to a session manager.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionManager>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Evaluate against explicit access rules.
    pub fn check(&self, requested_path: &str, access: &RouteAccess) -> GuardDecision {
        let state = self.session.state();
        let decision = evaluate(&state, access, requested_path);
        if let GuardDecision::Redirect(nav) = &decision {
            tracing::debug!(requested = requested_path, redirect = %nav.path, "route guard redirect");
        }
        decision
    }

    /// Evaluate against the portal route table. Unknown routes render (the
    /// view layer shows its not-found page).
    pub fn check_path(&self, requested_path: &str) -> GuardDecision {
        let access = routes::access_for(requested_path).unwrap_or(RouteAccess::Public);
        self.check(requested_path, &access)
    }

    pub fn state(&self, access: &RouteAccess) -> GuardState {
        classify(&self.session.state(), access)
    }
}
