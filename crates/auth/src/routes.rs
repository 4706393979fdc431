//! Portal route table and role requirements.

use portal_core::PlanId;

use crate::Role;

pub const LANDING: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const ADMIN_LOGIN: &str = "/admin/login";
pub const PLANS: &str = "/plans";
pub const PAYMENT: &str = "/payment";
pub const DASHBOARD: &str = "/dashboard";
pub const SUBSCRIPTIONS: &str = "/subscriptions";
pub const ADMIN_DASHBOARD: &str = "/admin";

pub fn plan_path(plan_id: PlanId) -> String {
    format!("{PLANS}/{plan_id}")
}

pub fn subscribe_path(plan_id: PlanId) -> String {
    format!("/subscribe/{plan_id}")
}

/// Who may render a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    /// Any signed-in user, whatever the role.
    Authenticated,
    /// Signed-in users holding one of these roles.
    Roles(Vec<Role>),
}

impl RouteAccess {
    pub fn customer_only() -> Self {
        Self::Roles(vec![Role::Customer])
    }

    pub fn admin_only() -> Self {
        Self::Roles(vec![Role::Admin])
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    /// Whether a signed-in user with `role` may render the route.
    ///
    /// Against a role set, an absent role is always denied.
    pub fn permits(&self, role: Option<Role>) -> bool {
        match self {
            Self::Public | Self::Authenticated => true,
            Self::Roles(allowed) => role.is_some_and(|r| allowed.contains(&r)),
        }
    }

    /// Login entry point for unauthenticated visitors.
    pub fn login_path(&self) -> &'static str {
        match self {
            Self::Roles(allowed) if allowed.contains(&Role::Admin) => ADMIN_LOGIN,
            _ => LOGIN,
        }
    }
}

#[derive(Clone, Copy)]
enum Access {
    Public,
    Customer,
    Admin,
}

const ROUTE_TABLE: &[(&str, Access)] = &[
    (LANDING, Access::Public),
    (LOGIN, Access::Public),
    (REGISTER, Access::Public),
    (ADMIN_LOGIN, Access::Public),
    (PLANS, Access::Public),
    ("/plans/:id", Access::Public),
    (DASHBOARD, Access::Customer),
    ("/subscribe/:planId", Access::Customer),
    (PAYMENT, Access::Customer),
    (SUBSCRIPTIONS, Access::Customer),
    (ADMIN_DASHBOARD, Access::Admin),
    ("/admin/categories", Access::Admin),
    ("/admin/plans", Access::Admin),
    ("/admin/subscriptions", Access::Admin),
];

/// Access rule for a concrete path, or `None` for an unknown route.
pub fn access_for(path: &str) -> Option<RouteAccess> {
    let path = normalize(path);
    ROUTE_TABLE
        .iter()
        .find(|(pattern, _)| matches_pattern(pattern, path))
        .map(|(_, access)| match access {
            Access::Public => RouteAccess::Public,
            Access::Customer => RouteAccess::customer_only(),
            Access::Admin => RouteAccess::admin_only(),
        })
}

/// Where to go after a successful login.
///
/// Resumes `from` when it is an internal, non-login route the new role may
/// render; otherwise the role's home page.
pub fn resume_after_login(role: Role, from: Option<&str>) -> String {
    let home = match role {
        Role::Customer => DASHBOARD,
        Role::Admin => ADMIN_DASHBOARD,
    };

    let Some(from) = from else {
        return home.to_string();
    };
    if !from.starts_with('/') || from.starts_with("//") || from.starts_with("/\\") {
        return home.to_string();
    }
    let target = normalize(from);
    if [LOGIN, ADMIN_LOGIN, REGISTER].contains(&target) {
        return home.to_string();
    }
    match access_for(target) {
        Some(access) if access.permits(Some(role)) => from.to_string(),
        _ => home.to_string(),
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p.starts_with(':') => {
                if s.is_empty() {
                    return false;
                }
            }
            (Some(p), Some(s)) if p == s => {}
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_table_matches_portal() {
        assert_eq!(access_for("/"), Some(RouteAccess::Public));
        assert_eq!(access_for("/plans/12"), Some(RouteAccess::Public));
        assert_eq!(access_for("/subscribe/12"), Some(RouteAccess::customer_only()));
        assert_eq!(access_for("/payment?step=2"), Some(RouteAccess::customer_only()));
        assert_eq!(access_for("/admin/plans/"), Some(RouteAccess::admin_only()));
        assert_eq!(access_for("/admin/login"), Some(RouteAccess::Public));
        assert_eq!(access_for("/subscribe/"), None);
        assert_eq!(access_for("/nowhere"), None);
    }

    #[test]
    fn absent_role_is_denied_against_role_sets() {
        assert!(!RouteAccess::customer_only().permits(None));
        assert!(!RouteAccess::admin_only().permits(Some(Role::Customer)));
        assert!(RouteAccess::admin_only().permits(Some(Role::Admin)));
        assert!(RouteAccess::Authenticated.permits(None));
    }

    #[test]
    fn login_entry_point_follows_required_role() {
        assert_eq!(RouteAccess::admin_only().login_path(), ADMIN_LOGIN);
        assert_eq!(
            RouteAccess::Roles(vec![Role::Customer, Role::Admin]).login_path(),
            ADMIN_LOGIN
        );
        assert_eq!(RouteAccess::customer_only().login_path(), LOGIN);
        assert_eq!(RouteAccess::Authenticated.login_path(), LOGIN);
    }

    #[test]
    fn resume_after_login_prefers_preserved_path() {
        assert_eq!(resume_after_login(Role::Customer, Some("/subscribe/4")), "/subscribe/4");
        assert_eq!(resume_after_login(Role::Customer, None), DASHBOARD);
        assert_eq!(resume_after_login(Role::Admin, None), ADMIN_DASHBOARD);
        // Not renderable by the new role, external, or a login page.
        assert_eq!(resume_after_login(Role::Customer, Some("/admin/plans")), DASHBOARD);
        assert_eq!(resume_after_login(Role::Customer, Some("//evil.example")), DASHBOARD);
        assert_eq!(resume_after_login(Role::Admin, Some("/admin/login")), ADMIN_DASHBOARD);
    }

    #[test]
    fn resume_after_login_rejects_backslash_protocol_relative_paths() {
        assert_eq!(resume_after_login(Role::Customer, Some("/\\evil.example")), DASHBOARD);
        assert_eq!(resume_after_login(Role::Admin, Some("/\\evil.example/admin")), ADMIN_DASHBOARD);
    }

    #[test]
    fn path_helpers() {
        assert_eq!(subscribe_path(PlanId::new(3)), "/subscribe/3");
        assert_eq!(plan_path(PlanId::new(3)), "/plans/3");
    }
}
