//! `portal-core`: shared building blocks for the portal client.
//!
//! This crate holds no HTTP and no session logic: the error taxonomy, the
//! backend identifiers, the catalog DTOs and the key/value storage seam.

pub mod catalog;
pub mod error;
pub mod id;
pub mod money;
pub mod storage;

pub use catalog::{
    partition_by_coverage, Category, NewSubscription, Page, PageQuery, Plan, PlanQuery,
    Subscription,
};
pub use error::{FieldErrors, PortalError, PortalResult};
pub use id::{CategoryId, PlanId, SubscriptionId, UserId};
pub use money::Money;
pub use storage::{KeyValueStore, MemoryStore};
