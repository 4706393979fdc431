//! Select → review → payment → confirmation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use portal_auth::navigation::{Navigation, Navigator};
use portal_auth::routes;
use portal_core::{NewSubscription, Plan, PortalError, PortalResult, Subscription};

use crate::draft::{DraftRepository, PurchaseDraft};
use crate::period::check_start_date;

/// Default simulated payment processing time.
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(2_000);

/// Creates the purchased subscription on the backend.
///
/// Implemented by the HTTP client on top of the authorization gateway.
#[async_trait]
pub trait PurchaseFinalizer: Send + Sync {
    async fn create_subscription(&self, request: &NewSubscription) -> PortalResult<Subscription>;
}

/// A priced selection awaiting the user's confirmation. Nothing is stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    draft: PurchaseDraft,
}

impl Review {
    pub fn draft(&self) -> &PurchaseDraft {
        &self.draft
    }

    /// Go back to date selection, keeping the chosen start date for the form.
    pub fn back(self) -> NaiveDate {
        self.draft.start_date
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentStatus {
    /// Form enabled.
    Ready,
    /// Submitted; form disabled until the outcome is known.
    Processing,
    Confirmed(Subscription),
}

/// The payment step, bound to the draft it was opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    draft: PurchaseDraft,
    status: PaymentStatus,
}

impl Payment {
    pub fn draft(&self) -> &PurchaseDraft {
        &self.draft
    }

    pub fn status(&self) -> &PaymentStatus {
        &self.status
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.status, PaymentStatus::Ready)
    }

    pub fn confirmation(&self) -> Option<&Subscription> {
        match &self.status {
            PaymentStatus::Confirmed(sub) => Some(sub),
            _ => None,
        }
    }
}

/// Drives one tab's purchase flow.
pub struct Checkout {
    drafts: DraftRepository,
    finalizer: Arc<dyn PurchaseFinalizer>,
    navigator: Arc<dyn Navigator>,
    processing_delay: Duration,
}

impl Checkout {
    pub fn new(
        drafts: DraftRepository,
        finalizer: Arc<dyn PurchaseFinalizer>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            drafts,
            finalizer,
            navigator,
            processing_delay: DEFAULT_PROCESSING_DELAY,
        }
    }

    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    /// Select step: price `plan` for coverage starting `start_date`.
    pub fn select(&self, plan: &Plan, start_date: NaiveDate, today: NaiveDate) -> PortalResult<Review> {
        check_start_date(start_date, today)?;
        let draft = PurchaseDraft::for_plan(plan, start_date)?;
        Ok(Review { draft })
    }

    /// Review step: store the draft and move on to payment.
    pub async fn confirm(&self, review: Review) -> PortalResult<PurchaseDraft> {
        self.drafts.write(&review.draft).await?;
        tracing::info!(
            plan_id = %review.draft.plan_id,
            start_date = %review.draft.start_date,
            end_date = %review.draft.end_date,
            "purchase draft saved"
        );
        self.navigator.navigate(Navigation::push(routes::PAYMENT));
        Ok(review.draft)
    }

    /// Payment step entry. Without a stored draft the user is sent back to
    /// the plan catalog and `None` is returned.
    pub async fn open_payment(&self) -> PortalResult<Option<Payment>> {
        match self.drafts.read().await? {
            Some(draft) => Ok(Some(Payment {
                draft,
                status: PaymentStatus::Ready,
            })),
            None => {
                tracing::debug!("no purchase draft; redirecting to plans");
                self.navigator.navigate(Navigation::push(routes::PLANS));
                Ok(None)
            }
        }
    }

    /// Simulate payment, then create the subscription.
    ///
    /// On success the stored draft is removed and the step is confirmed. On
    /// failure the draft stays exactly as submitted and the form is enabled
    /// again for another attempt.
    pub async fn submit(&self, payment: &mut Payment) -> PortalResult<Subscription> {
        if !payment.can_submit() {
            return Err(PortalError::validation("payment", "Payment already submitted"));
        }
        payment.status = PaymentStatus::Processing;

        tokio::time::sleep(self.processing_delay).await;

        let request = payment.draft.to_request();
        match self.finalizer.create_subscription(&request).await {
            Ok(subscription) => {
                if let Err(err) = self.drafts.clear().await {
                    tracing::warn!(error = %err, "purchase succeeded but the draft could not be cleared");
                }
                tracing::info!(
                    subscription_id = %subscription.id,
                    plan_id = %subscription.insurance_plan,
                    "purchase confirmed"
                );
                payment.status = PaymentStatus::Confirmed(subscription.clone());
                Ok(subscription)
            }
            Err(err) => {
                tracing::warn!(error = %err, plan_id = %payment.draft.plan_id, "purchase failed; draft kept");
                payment.status = PaymentStatus::Ready;
                Err(err)
            }
        }
    }
}
