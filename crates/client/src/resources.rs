//! Catalog and subscription endpoints, all behind the gateway.

use std::sync::Arc;

use async_trait::async_trait;

use portal_core::{
    Category, NewSubscription, Page, PageQuery, Plan, PlanId, PlanQuery, PortalResult,
    Subscription,
};
use portal_purchasing::PurchaseFinalizer;

use crate::gateway::AuthGateway;
use crate::transport::ApiRequest;

pub const PLANS_PATH: &str = "/insurance-plans/";
pub const CATEGORIES_PATH: &str = "/property-categories/";
pub const SUBSCRIPTIONS_PATH: &str = "/policy-subscriptions/";

#[derive(Clone)]
pub struct PlansApi {
    gateway: Arc<AuthGateway>,
}

impl PlansApi {
    pub fn new(gateway: Arc<AuthGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &PlanQuery) -> PortalResult<Page<Plan>> {
        self.gateway
            .get_json(ApiRequest::get(PLANS_PATH).with_query(query)?)
            .await
    }

    pub async fn get(&self, id: PlanId) -> PortalResult<Plan> {
        self.gateway
            .get_json(ApiRequest::get(format!("{PLANS_PATH}{id}/")))
            .await
    }
}

#[derive(Clone)]
pub struct CategoriesApi {
    gateway: Arc<AuthGateway>,
}

impl CategoriesApi {
    pub fn new(gateway: Arc<AuthGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &PageQuery) -> PortalResult<Page<Category>> {
        self.gateway
            .get_json(ApiRequest::get(CATEGORIES_PATH).with_query(query)?)
            .await
    }
}

#[derive(Clone)]
pub struct SubscriptionsApi {
    gateway: Arc<AuthGateway>,
}

impl SubscriptionsApi {
    pub fn new(gateway: Arc<AuthGateway>) -> Self {
        Self { gateway }
    }

    /// The signed-in customer's subscriptions (all of them for an admin).
    pub async fn list(&self, query: &PageQuery) -> PortalResult<Page<Subscription>> {
        self.gateway
            .get_json(ApiRequest::get(SUBSCRIPTIONS_PATH).with_query(query)?)
            .await
    }

    pub async fn create(&self, request: &NewSubscription) -> PortalResult<Subscription> {
        self.gateway.post_json(SUBSCRIPTIONS_PATH, request).await
    }
}

#[async_trait]
impl PurchaseFinalizer for SubscriptionsApi {
    async fn create_subscription(&self, request: &NewSubscription) -> PortalResult<Subscription> {
        self.create(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use portal_auth::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY, USER_ROLE_KEY};
    use portal_auth::{HistoryNavigator, SessionManager};
    use portal_core::{MemoryStore, Money, PortalError};

    use crate::auth_api::AuthApi;
    use crate::testing::ScriptedTransport;
    use crate::transport::ApiResponse;

    async fn gateway(transport: Arc<ScriptedTransport>) -> Arc<AuthGateway> {
        let store = MemoryStore::with_entries([
            (ACCESS_TOKEN_KEY, "a1"),
            (REFRESH_TOKEN_KEY, "r1"),
            (USER_KEY, r#"{"id": 1, "email": "ana@example.com"}"#),
            (USER_ROLE_KEY, "customer"),
        ]);
        let session = Arc::new(SessionManager::new(
            Arc::new(store),
            Arc::new(AuthApi::new(transport.clone())),
        ));
        session.initialize().await;
        Arc::new(AuthGateway::new(
            transport,
            session,
            Arc::new(HistoryNavigator::new()),
        ))
    }

    #[tokio::test]
    async fn plan_detail_path_includes_id() {
        let transport = Arc::new(ScriptedTransport::new(vec![ApiResponse::new(
            200,
            r#"{"id": 9, "name": "Flood Cover", "price": "310.00", "duration_months": 12, "property_category": 2}"#,
        )]));
        let plans = PlansApi::new(gateway(transport.clone()).await);

        let plan = plans.get(PlanId::new(9)).await.unwrap();

        assert_eq!(plan.price, Money::from_cents(31000));
        assert_eq!(transport.requests()[0].path, "/insurance-plans/9/");
    }

    #[tokio::test]
    async fn create_subscription_posts_plan_and_start_date() {
        let transport = Arc::new(ScriptedTransport::new(vec![ApiResponse::new(
            201,
            r#"{"id": 40, "insurance_plan": 9, "start_date": "2024-01-31", "end_date": "2025-01-31", "user": 1}"#,
        )]));
        let subscriptions = SubscriptionsApi::new(gateway(transport.clone()).await);
        let request = NewSubscription {
            insurance_plan: PlanId::new(9),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        };

        let created = subscriptions.create_subscription(&request).await.unwrap();

        assert_eq!(created.end_date, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        let sent = transport.requests();
        assert_eq!(sent[0].path, SUBSCRIPTIONS_PATH);
        assert_eq!(
            sent[0].body,
            Some(serde_json::json!({"insurance_plan": 9, "start_date": "2024-01-31"}))
        );
    }

    #[tokio::test]
    async fn server_field_errors_reach_the_caller() {
        let transport = Arc::new(ScriptedTransport::new(vec![ApiResponse::new(
            400,
            r#"{"start_date": ["Start date cannot be in the past."]}"#,
        )]));
        let subscriptions = SubscriptionsApi::new(gateway(transport).await);
        let request = NewSubscription {
            insurance_plan: PlanId::new(9),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };

        let err = subscriptions.create(&request).await.unwrap_err();
        assert!(matches!(err, PortalError::Validation(ref f) if f.contains("start_date")));
    }

    #[tokio::test]
    async fn category_list_sends_page_params() {
        let transport = Arc::new(ScriptedTransport::new(vec![ApiResponse::new(
            200,
            r#"{"count": 1, "next": null, "previous": null, "results": [{"id": 2, "name": "Home"}]}"#,
        )]));
        let categories = CategoriesApi::new(gateway(transport.clone()).await);

        let page = categories
            .list(&PageQuery {
                page: Some(1),
                page_size: Some(50),
            })
            .await
            .unwrap();

        assert_eq!(page.results[0].name, "Home");
        let mut query = transport.requests()[0].query.clone();
        query.sort();
        assert_eq!(
            query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("page_size".to_string(), "50".to_string()),
            ]
        );
    }
}
