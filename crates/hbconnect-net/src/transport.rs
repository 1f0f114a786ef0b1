//! HTTP transport abstraction.
//!
//! The client layers only need "send this request, give me the response".
//! [`ReqwestTransport`] does that over the network; [`memory`] does it from
//! a script for tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

use crate::error::TransportError;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// An outbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Look up a request header by name (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    /// Response headers (lowercase keys).
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_lowercase(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Look up a response header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        let lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k == &lower)
            .map(|(_, v)| v.as_str())
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// Sends HTTP requests.
///
/// Implementations must be thread-safe (Send + Sync). A non-success status
/// is still `Ok`; only failures to get a response are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request).await
    }
}

/// A [`reqwest`]-backed transport.
///
/// Redirects are not followed so callers see 3xx responses as they are.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            inner: builder.build().unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.inner.get(request.url.as_str()),
            Method::Post => self.inner.post(request.url.as_str()).body(request.body),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder.send().await?;
        let status = resp.status();

        let headers: Vec<(String, String)> = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();

        let body = resp.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}

/// A scripted in-memory transport for testing.
///
/// Responses are queued per URL prefix and handed out in order; every
/// request is recorded.
pub mod memory {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    type Outcome = std::result::Result<HttpResponse, String>;

    #[derive(Debug)]
    struct Route {
        prefix: String,
        outcomes: VecDeque<Outcome>,
        /// Replayed once the queue is empty.
        fallback: Option<Outcome>,
    }

    /// In-memory transport implementation.
    #[derive(Debug, Default)]
    pub struct MemoryTransport {
        routes: Mutex<Vec<Route>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl MemoryTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response for requests whose URL starts with `prefix`.
        pub fn respond(&self, prefix: &str, response: HttpResponse) -> &Self {
            self.push(prefix, Ok(response), false)
        }

        /// Queue a connection failure.
        pub fn fail(&self, prefix: &str, reason: &str) -> &Self {
            self.push(prefix, Err(reason.to_string()), false)
        }

        /// Answer every request to `prefix` with `response` once queued
        /// outcomes run out.
        pub fn always(&self, prefix: &str, response: HttpResponse) -> &Self {
            self.push(prefix, Ok(response), true)
        }

        /// Fail every request to `prefix` once queued outcomes run out.
        pub fn always_fail(&self, prefix: &str, reason: &str) -> &Self {
            self.push(prefix, Err(reason.to_string()), true)
        }

        fn push(&self, prefix: &str, outcome: Outcome, fallback: bool) -> &Self {
            let mut routes = lock(&self.routes);
            let index = match routes.iter().position(|r| r.prefix == prefix) {
                Some(i) => i,
                None => {
                    routes.push(Route {
                        prefix: prefix.to_string(),
                        outcomes: VecDeque::new(),
                        fallback: None,
                    });
                    routes.len() - 1
                }
            };
            let route = &mut routes[index];
            if fallback {
                route.fallback = Some(outcome);
            } else {
                route.outcomes.push_back(outcome);
            }
            self
        }

        /// All requests seen so far.
        pub fn requests(&self) -> Vec<HttpRequest> {
            lock(&self.requests).clone()
        }

        pub fn request_count(&self) -> usize {
            lock(&self.requests).len()
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[async_trait]
    impl HttpTransport for MemoryTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            let url = request.url.clone();
            lock(&self.requests).push(request);

            let outcome = {
                let mut routes = lock(&self.routes);
                // Longest matching prefix wins.
                routes
                    .iter_mut()
                    .filter(|r| url.starts_with(&r.prefix))
                    .max_by_key(|r| r.prefix.len())
                    .and_then(|r| r.outcomes.pop_front().or_else(|| r.fallback.clone()))
            };

            match outcome {
                Some(Ok(response)) => Ok(response),
                Some(Err(reason)) => Err(TransportError::Connection(reason)),
                None => Err(TransportError::Connection(format!("no route for {url}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryTransport;
    use super::*;

    #[tokio::test]
    async fn test_memory_transport_replays_in_order() {
        let transport = MemoryTransport::new();
        transport
            .respond("http://node", HttpResponse::new(200, "first"))
            .respond("http://node", HttpResponse::new(201, "second"));

        let a = transport.execute(HttpRequest::get("http://node/a")).await.unwrap();
        let b = transport.execute(HttpRequest::get("http://node/b")).await.unwrap();

        assert_eq!(a.text(), "first");
        assert_eq!(b.status, 201);
        assert!(transport.execute(HttpRequest::get("http://node/c")).await.is_err());
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_memory_transport_longest_prefix() {
        let transport = MemoryTransport::new();
        transport
            .always("http://node", HttpResponse::new(200, "root"))
            .always("http://node/~meta@1.0", HttpResponse::new(200, "meta"));

        let meta = transport
            .execute(HttpRequest::get("http://node/~meta@1.0/info/address"))
            .await
            .unwrap();
        let root = transport.execute(HttpRequest::get("http://node/x")).await.unwrap();

        assert_eq!(meta.text(), "meta");
        assert_eq!(root.text(), "root");
    }

    #[tokio::test]
    async fn test_memory_transport_failure() {
        let transport = MemoryTransport::new();
        transport.fail("http://node", "connection refused");

        let err = transport
            .execute(HttpRequest::post("http://node", "body"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(ref r) if r == "connection refused"));
        assert_eq!(transport.requests()[0].method, Method::Post);
    }

    #[test]
    fn test_response_helpers() {
        let resp = HttpResponse::new(302, "").with_header("Location", "/elsewhere");
        assert!(resp.is_redirect());
        assert!(!resp.is_success());
        assert_eq!(resp.header("location"), Some("/elsewhere"));
        assert_eq!(HttpResponse::new(404, "").status_text, "Not Found");
    }

    #[test]
    fn test_request_builder() {
        let req = HttpRequest::get("http://node")
            .header("Accept", "application/json")
            .headers([("accept-bundle", "true")]);
        assert_eq!(req.header_value("accept"), Some("application/json"));
        assert_eq!(req.header_value("Accept-Bundle"), Some("true"));
    }
}
