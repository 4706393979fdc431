//! Session model and its persisted representation.

use serde::{Deserialize, Serialize};

use crate::{Identity, Role};

/// Persistent store key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Persistent store key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Persistent store key for the serialized [`Identity`].
pub const USER_KEY: &str = "user";
/// Persistent store key for the role tag.
pub const USER_ROLE_KEY: &str = "user_role";

/// Every persisted session key. Written together, purged together.
pub const SESSION_KEYS: [&str; 4] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY, USER_ROLE_KEY];

/// Successful login/register payload: `{access, refresh, user}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGrant {
    pub access: String,
    pub refresh: String,
    pub user: Identity,
}

impl core::fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthGrant")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// An authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Identity,
    pub role: Role,
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn from_grant(grant: AuthGrant, role: Role) -> Self {
        Self {
            user: grant.user,
            role,
            access_token: grant.access,
            refresh_token: grant.refresh,
        }
    }

    /// The four persisted entries, in store form.
    pub fn to_entries(&self) -> serde_json::Result<[(&'static str, String); 4]> {
        Ok([
            (ACCESS_TOKEN_KEY, self.access_token.clone()),
            (REFRESH_TOKEN_KEY, self.refresh_token.clone()),
            (USER_KEY, serde_json::to_string(&self.user)?),
            (USER_ROLE_KEY, self.role.as_str().to_string()),
        ])
    }

    /// Rebuild a session from persisted values.
    ///
    /// Returns `None` unless all four values are present and parse; a
    /// partially persisted session is never hydrated.
    pub fn from_persisted(
        access_token: Option<String>,
        refresh_token: Option<String>,
        user: Option<String>,
        role: Option<String>,
    ) -> Option<Self> {
        let access_token = access_token.filter(|t| !t.is_empty())?;
        let refresh_token = refresh_token.filter(|t| !t.is_empty())?;
        let user: Identity = serde_json::from_str(&user?).ok()?;
        let role: Role = role?.parse().ok()?;

        Some(Self {
            user,
            role,
            access_token,
            refresh_token,
        })
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("role", &self.role)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Public view of the session layer, consumed by the route guard and views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub role: Option<Role>,
    pub user: Option<Identity>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::UserId;

    fn user_json() -> String {
        r#"{"id": 9, "email": "sam@example.com"}"#.to_string()
    }

    #[test]
    fn hydrates_only_complete_sessions() {
        let full = Session::from_persisted(
            Some("a".into()),
            Some("r".into()),
            Some(user_json()),
            Some("customer".into()),
        )
        .expect("complete session");
        assert_eq!(full.user.id, UserId::new(9));
        assert_eq!(full.role, Role::Customer);

        assert!(Session::from_persisted(None, Some("r".into()), Some(user_json()), Some("admin".into())).is_none());
        assert!(Session::from_persisted(Some("a".into()), None, Some(user_json()), Some("admin".into())).is_none());
        assert!(Session::from_persisted(Some("a".into()), Some("r".into()), Some("{not json".into()), Some("admin".into())).is_none());
        assert!(Session::from_persisted(Some("a".into()), Some("r".into()), Some(user_json()), Some("root".into())).is_none());
        assert!(Session::from_persisted(Some("".into()), Some("r".into()), Some(user_json()), Some("admin".into())).is_none());
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let session = Session::from_persisted(
            Some("secret-access".into()),
            Some("secret-refresh".into()),
            Some(user_json()),
            Some("admin".into()),
        )
        .unwrap();

        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("sam@example.com"));
    }

    #[test]
    fn entries_round_trip_through_store_form() {
        let session = Session::from_persisted(
            Some("a".into()),
            Some("r".into()),
            Some(user_json()),
            Some("admin".into()),
        )
        .unwrap();

        let entries = session.to_entries().unwrap();
        let get = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        };
        let rebuilt = Session::from_persisted(
            get(ACCESS_TOKEN_KEY),
            get(REFRESH_TOKEN_KEY),
            get(USER_KEY),
            get(USER_ROLE_KEY),
        );
        assert_eq!(rebuilt, Some(session));
    }
}
