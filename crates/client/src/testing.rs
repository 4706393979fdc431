//! In-crate test doubles.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use portal_core::{PortalError, PortalResult};

use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

type Handler = Box<dyn Fn(&ApiRequest) -> PortalResult<ApiResponse> + Send + Sync>;

/// Records every request and answers from a queue or a routing closure.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    delay: Duration,
    slow_path: Option<String>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    /// Answer requests in order; an exhausted queue is a network error.
    pub(crate) fn new(responses: Vec<ApiResponse>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::routed(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| PortalError::network("no scripted response"))
        })
    }

    pub(crate) fn routed(
        handler: impl Fn(&ApiRequest) -> PortalResult<ApiResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: Duration::ZERO,
            slow_path: None,
            requests: Mutex::default(),
        }
    }

    /// Hold every response for `delay` so that concurrent calls overlap.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Hold only responses for `path`.
    pub(crate) fn with_delay_on(mut self, path: &str, delay: Duration) -> Self {
        self.delay = delay;
        self.slow_path = Some(path.to_string());
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> PortalResult<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let slow = self.slow_path.as_deref().is_none_or(|p| p == request.path);
        if slow && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.handler)(request)
    }
}
