//! Catalog resources as the backend serves them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{CategoryId, PlanId, SubscriptionId, UserId};
use crate::money::Money;

/// Paginated list envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Number of pages needed to show `count` items, `page_size` at a time.
    pub fn total_pages(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.count.div_ceil(u64::from(page_size))
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub price: Money,
    pub duration_months: u32,
    pub property_category: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub insurance_plan: PlanId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_plan_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub user: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl Subscription {
    /// Coverage is active through the end date, inclusive.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.end_date >= today
    }

    /// Label used when the plan name was not expanded by the backend.
    pub fn plan_label(&self) -> String {
        self.insurance_plan_name
            .clone()
            .unwrap_or_else(|| format!("Plan #{}", self.insurance_plan))
    }
}

/// Split subscriptions into `(active, expired)` as of `today`.
pub fn partition_by_coverage(
    subscriptions: Vec<Subscription>,
    today: NaiveDate,
) -> (Vec<Subscription>, Vec<Subscription>) {
    subscriptions
        .into_iter()
        .partition(|sub| sub.is_active_on(today))
}

/// Request body for `POST /policy-subscriptions/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub insurance_plan: PlanId,
    pub start_date: NaiveDate,
}

/// Query parameters accepted by `GET /insurance-plans/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Plain page/page_size parameters for the other list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn subscription(id: i64, end: NaiveDate) -> Subscription {
        Subscription {
            id: SubscriptionId::new(id),
            insurance_plan: PlanId::new(3),
            insurance_plan_name: None,
            start_date: date(2024, 1, 1),
            end_date: end,
            user: UserId::new(1),
            user_email: None,
        }
    }

    #[test]
    fn plan_price_accepts_decimal_strings() {
        let plan: Plan = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Home Basic",
            "price": "149.99",
            "duration_months": 12,
            "property_category": 2
        }))
        .unwrap();

        assert_eq!(plan.price, Money::from_cents(14999));
        assert!(plan.property_category_name.is_none());
    }

    #[test]
    fn plan_with_unusable_price_is_rejected() {
        for price in [serde_json::json!("NaN"), serde_json::json!("inf"), serde_json::json!(-5)] {
            let result = serde_json::from_value::<Plan>(serde_json::json!({
                "id": 1,
                "name": "Home Basic",
                "price": price,
                "duration_months": 12,
                "property_category": 2
            }));
            assert!(result.is_err(), "price {price} should be rejected");
        }
    }

    #[test]
    fn page_counts_round_up() {
        let page: Page<Category> = Page {
            count: 19,
            next: Some("http://localhost/api/property-categories/?page=2".into()),
            previous: None,
            results: vec![],
        };
        assert_eq!(page.total_pages(9), 3);
        assert_eq!(page.total_pages(0), 0);
        assert!(page.has_next());
    }

    #[test]
    fn coverage_ending_today_is_still_active() {
        let today = date(2024, 6, 1);
        let subs = vec![
            subscription(1, date(2024, 6, 1)),
            subscription(2, date(2024, 5, 31)),
            subscription(3, date(2025, 1, 1)),
        ];

        let (active, expired) = partition_by_coverage(subs, today);
        assert_eq!(active.iter().map(|s| s.id.get()).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].plan_label(), "Plan #3");
    }

    #[test]
    fn plan_query_omits_unset_parameters() {
        let query = PlanQuery {
            page: Some(2),
            search: Some("flood".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, serde_json::json!({"page": 2, "search": "flood"}));
    }
}
