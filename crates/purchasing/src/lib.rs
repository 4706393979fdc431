//! Purchase flow: plan selection → review → payment → confirmation.
//!
//! The in-progress purchase lives in an ephemeral [`DraftRepository`] between
//! review and payment. The subscription itself is created through an injected
//! [`PurchaseFinalizer`], so this crate performs no HTTP.

pub mod checkout;
pub mod draft;
pub mod period;

pub use checkout::{Checkout, Payment, PaymentStatus, PurchaseFinalizer, Review};
pub use draft::{DraftRepository, PurchaseDraft, PENDING_DRAFT_KEY};
pub use period::{check_start_date, coverage_end};
