//! Strongly-typed backend identifiers.
//!
//! The backend issues integer primary keys; each resource gets its own
//! newtype so a plan id can never be passed where a user id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::PortalError;

/// Identifier of a portal user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of an insurance plan.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(i64);

/// Identifier of a property category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

/// Identifier of a policy subscription.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(i64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = PortalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| PortalError::validation($name, e.to_string()))?;
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(UserId, "user_id");
impl_int_newtype!(PlanId, "plan_id");
impl_int_newtype!(CategoryId, "category_id");
impl_int_newtype!(SubscriptionId, "subscription_id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_route_parameters() {
        let id: PlanId = " 42 ".parse().unwrap();
        assert_eq!(id, PlanId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = "abc".parse::<PlanId>().unwrap_err();
        assert!(matches!(err, PortalError::Validation(ref f) if f.contains("plan_id")));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&SubscriptionId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
