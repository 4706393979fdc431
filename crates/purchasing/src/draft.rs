//! Purchase draft handed from the review step to the payment step.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use portal_core::{
    KeyValueStore, Money, NewSubscription, Plan, PlanId, PortalError, PortalResult,
};

use crate::period::coverage_end;

/// Ephemeral storage key holding the in-progress purchase.
pub const PENDING_DRAFT_KEY: &str = "pendingSubscription";

/// An in-progress purchase, as stored between review and payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDraft {
    pub plan_id: PlanId,
    pub plan_name: String,
    #[serde(rename = "price")]
    pub unit_price: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_months: u32,
}

impl PurchaseDraft {
    /// Price the selected plan over a coverage period starting `start_date`.
    pub fn for_plan(plan: &Plan, start_date: NaiveDate) -> PortalResult<Self> {
        Ok(Self {
            plan_id: plan.id,
            plan_name: plan.name.clone(),
            unit_price: plan.price,
            start_date,
            end_date: coverage_end(start_date, plan.duration_months)?,
            duration_months: plan.duration_months,
        })
    }

    /// Body for the purchase-creation call.
    pub fn to_request(&self) -> NewSubscription {
        NewSubscription {
            insurance_plan: self.plan_id,
            start_date: self.start_date,
        }
    }
}

/// Tab-scoped draft repository.
///
/// Holds at most one draft: writing replaces whatever was there, whichever
/// plan it was for.
#[derive(Clone)]
pub struct DraftRepository {
    store: Arc<dyn KeyValueStore>,
}

impl DraftRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn write(&self, draft: &PurchaseDraft) -> PortalResult<()> {
        let json = serde_json::to_string(draft)
            .map_err(|e| PortalError::storage(format!("failed to serialize draft: {e}")))?;
        self.store.set(PENDING_DRAFT_KEY, &json).await
    }

    /// The stored draft, if any. An unreadable draft is discarded.
    pub async fn read(&self) -> PortalResult<Option<PurchaseDraft>> {
        let Some(json) = self.store.get(PENDING_DRAFT_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(draft) => Ok(Some(draft)),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable purchase draft");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn clear(&self) -> PortalResult<()> {
        self.store.remove(PENDING_DRAFT_KEY).await
    }
}
