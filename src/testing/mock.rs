//! Mock transport for isolated unit testing
//!
//! [`ScriptedTransport`] answers requests from per-URL queues. Each queued
//! answer is consumed once, except the last one for a URL, which keeps being
//! returned. URLs without a script behave like a refused connection.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use crate::suap::transport::{HttpTransport, ProviderRequest, ProviderResponse, TransportError};

type Answer = Result<ProviderResponse, TransportError>;

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Answer>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an HTTP answer for `url`
    #[must_use]
    pub fn respond(self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.push(url, Ok(ProviderResponse::new(status, body)))
    }

    /// Queue a transport failure for `url`
    #[must_use]
    pub fn fail(self, url: &str, error: TransportError) -> Self {
        self.push(url, Err(error))
    }

    fn push(self, url: &str, answer: Answer) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_default()
            .push_back(answer);
        self
    }

    /// Every request received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for one URL, in order
    #[must_use]
    pub fn requests_to(&self, url: &str) -> Vec<ProviderRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url == url)
            .collect()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, TransportError> {
        let url = request.url.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = scripts.get_mut(&url) else {
            return Err(TransportError::Connect(format!("no script for {url}")));
        };

        match queue.len() {
            0 => Err(TransportError::Connect(format!("no script for {url}"))),
            1 => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Other("script drained".to_string()))),
            _ => queue
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Other("script drained".to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suap::transport::RequestBody;

    #[tokio::test]
    async fn test_last_answer_repeats() {
        let transport = ScriptedTransport::new()
            .respond("https://a", 500, "first")
            .respond("https://a", 200, "second");

        let get = || ProviderRequest::post("https://a", RequestBody::Empty);
        assert_eq!(transport.send(get()).await.unwrap().body, "first");
        assert_eq!(transport.send(get()).await.unwrap().body, "second");
        assert_eq!(transport.send(get()).await.unwrap().body, "second");
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_unscripted_url_is_unreachable() {
        let transport = ScriptedTransport::new();
        let result = transport
            .send(ProviderRequest::get_with_bearer("https://nowhere", "t"))
            .await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
        assert_eq!(transport.requests_to("https://nowhere").len(), 1);
    }
}
