//! Login and registration inputs with their local (pre-submit) validation.
//!
//! Validation failures are `PortalError::Validation` and never reach the
//! network.

use serde::Serialize;

use portal_core::{FieldErrors, PortalResult};

const NAME_MAX_LEN: usize = 50;
const PASSWORD_MIN_LEN: usize = 8;

/// Body of `POST /auth/login/` and `POST /auth/admin/login/`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> PortalResult<()> {
        let mut errors = FieldErrors::new();
        if !is_plausible_email(&self.email) {
            errors.add("email", "Please enter a valid email address");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form as entered by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn validate(&self) -> PortalResult<()> {
        let mut errors = FieldErrors::new();

        check_name(&mut errors, "first_name", "First name", &self.first_name);
        check_name(&mut errors, "last_name", "Last name", &self.last_name);

        if !is_plausible_email(self.email.trim()) {
            errors.add("email", "Please enter a valid email address");
        }
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            errors.add("password", "Password must be at least 8 characters");
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords don't match");
        }

        errors.into_result()
    }

    /// Wire body for `POST /auth/register/`.
    pub fn to_request(&self) -> RegisterRequest {
        let optional = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: optional(&self.first_name),
            last_name: optional(&self.last_name),
        }
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /auth/register/`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl core::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn check_name(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.add(field, format!("{label} is required"));
    } else if len > NAME_MAX_LEN {
        errors.add(field, format!("{label} is too long"));
    }
}

/// Basic shape check: `local@domain.tld`, no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::PortalError;

    fn registration() -> Registration {
        Registration {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            password: "correct horse".into(),
            confirm_password: "correct horse".into(),
        }
    }

    fn field_errors(result: PortalResult<()>) -> FieldErrors {
        match result {
            Err(PortalError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_plausible_email("a@b.co"));
        assert!(is_plausible_email("first.last+tag@mail.example.com"));
        assert!(!is_plausible_email("invalid-email"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.com"));
        assert!(!is_plausible_email("a@@b.com"));
        assert!(!is_plausible_email("a b@c.com"));
        assert!(!is_plausible_email("a@b..com"));
    }

    #[test]
    fn login_requires_email_and_password() {
        let fields = field_errors(Credentials::new("nope", "").validate());
        assert!(fields.contains("email"));
        assert!(fields.contains("password"));

        assert!(Credentials::new("  ok@example.com ", "x").validate().is_ok());
    }

    #[test]
    fn credentials_trim_email_and_hide_password() {
        let creds = Credentials::new(" ok@example.com ", "hunter22");
        assert_eq!(creds.email, "ok@example.com");
        assert!(!format!("{creds:?}").contains("hunter22"));
    }

    #[test]
    fn registration_rules() {
        assert!(registration().validate().is_ok());

        let mut short = registration();
        short.password = "short".into();
        short.confirm_password = "short".into();
        let fields = field_errors(short.validate());
        assert_eq!(fields.get("password"), Some("Password must be at least 8 characters"));

        let mut mismatch = registration();
        mismatch.confirm_password = "something else".into();
        let fields = field_errors(mismatch.validate());
        assert_eq!(fields.get("confirm_password"), Some("Passwords don't match"));

        let mut names = registration();
        names.first_name = "   ".into();
        names.last_name = "x".repeat(51);
        let fields = field_errors(names.validate());
        assert_eq!(fields.get("first_name"), Some("First name is required"));
        assert_eq!(fields.get("last_name"), Some("Last name is too long"));
    }

    #[test]
    fn register_request_drops_blank_names() {
        let mut reg = registration();
        reg.last_name = " ".into();
        let body = serde_json::to_value(reg.to_request()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "email": "grace@example.com",
                "password": "correct horse",
                "first_name": "Grace"
            })
        );
    }
}
