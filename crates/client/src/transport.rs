//! HTTP transport seam and its reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use portal_core::{PortalError, PortalResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request relative to the API base URL.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

impl core::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            body: Some(body),
            ..Self::get(path)
        }
    }

    /// POST with a serializable body.
    pub fn post_json<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> PortalResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| PortalError::decode(format!("failed to encode request body: {e}")))?;
        Ok(Self::post(path, value))
    }

    /// Append query parameters from a flat struct. `None` fields are skipped.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> PortalResult<Self> {
        let value = serde_json::to_value(query)
            .map_err(|e| PortalError::decode(format!("failed to encode query: {e}")))?;
        let serde_json::Value::Object(fields) = value else {
            return Err(PortalError::decode("query parameters must be a flat object"));
        };
        for (key, value) in fields {
            match value {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => self.query.push((key, s)),
                other => self.query.push((key, other.to_string())),
            }
        }
        Ok(self)
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Raw response: status plus the unparsed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> PortalResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| PortalError::decode(format!("unexpected response body: {e}")))
    }
}

/// Sends requests and returns whatever status came back.
///
/// Only transport failures are errors here; status handling belongs to the
/// caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> PortalResult<ApiResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// `base_url` must already be normalized (no trailing slash).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PortalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> PortalResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = ?request.method, path = %request.path, "dispatching request");

        let mut req = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        if let Some(token) = &request.bearer {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PortalError::network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| PortalError::network(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::{CategoryId, PlanQuery};

    #[test]
    fn query_skips_unset_fields() {
        let query = PlanQuery {
            page: Some(2),
            property_category: Some(CategoryId::new(5)),
            search: Some("home".into()),
            ..PlanQuery::default()
        };
        let req = ApiRequest::get("/insurance-plans/").with_query(&query).unwrap();

        let mut pairs = req.query.clone();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("property_category".to_string(), "5".to_string()),
                ("search".to_string(), "home".to_string()),
            ]
        );
    }

    #[test]
    fn debug_hides_bearer() {
        let req = ApiRequest::get("/policy-subscriptions/").with_bearer("secret-token");
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn undecodable_success_body_is_a_decode_error() {
        let resp = ApiResponse::new(200, "<html>");
        let err = resp.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, PortalError::Decode(_)));
    }
}
