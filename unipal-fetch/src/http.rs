//! HTTP transport seam.
//!
//! All upstream traffic goes through the [`Transport`] trait so providers
//! can be tested against scripted responses. [`ReqwestTransport`] is the
//! production implementation. Responses carry the final URL after
//! redirects because the registration system signals an expired session by
//! bouncing the request to its login page.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which upstream family a request targets. Maintenance (503) maps to a
/// different error per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    /// Scraped university services behind the SSO.
    Portal,
    /// The app's own backend API.
    HubApi,
}

/// HTTP method subset used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

/// Request body payloads.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
    /// JSON document.
    Json(serde_json::Value),
}

/// One outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Extra headers, in order.
    pub headers: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Per-request deadline.
    pub timeout: Duration,
    /// Upstream family, for maintenance mapping.
    pub mode: ClientMode,
}

impl HttpRequest {
    /// A GET request against a portal service.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            mode: ClientMode::Portal,
        }
    }

    /// A bodyless DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            ..Self::get(url)
        }
    }

    /// A POST request with URL-encoded form fields.
    pub fn post_form(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(RequestBody::Form(fields)),
            timeout: DEFAULT_TIMEOUT,
            mode: ClientMode::Portal,
        }
    }

    /// A request with a JSON body.
    pub fn json(method: Method, url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Some(RequestBody::Json(body)),
            timeout: DEFAULT_TIMEOUT,
            mode: ClientMode::Portal,
        }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the upstream family.
    pub fn mode(mut self, mode: ClientMode) -> Self {
        self.mode = mode;
        self
    }
}

/// One response, after following redirects.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// URL the response was ultimately served from.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Deserializes the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_str(&self.body)
            .map_err(|e| FetchError::Network(format!("Malformed response body: {e}")))
    }
}

/// Transport seam for all upstream traffic.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the decoded response.
    ///
    /// Implementations map 503 to the per-family maintenance error and any
    /// other non-success status to [`FetchError::Network`]. Redirects are
    /// followed; `final_url` reflects the landing URL.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Production transport backed by a shared reqwest client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the shared client. Cookies are managed by the session layer,
    /// not by the client.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("unipal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = reqwest::Url::parse(&request.url)
            .map_err(|_| FetchError::InvalidUrl(request.url.clone()))?;

        let mut builder = self.client.request(method, url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        match &request.body {
            Some(RequestBody::Form(fields)) => builder = builder.form(fields),
            Some(RequestBody::Json(value)) => builder = builder.json(value),
            None => {}
        }

        let response = builder.send().await.map_err(|e| FetchError::from_reqwest(&e))?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        debug!(url = %request.url, status, %final_url, "Request completed");

        if status == 503 {
            return Err(match request.mode {
                ClientMode::Portal => FetchError::PortalMaintenance,
                ClientMode::HubApi => FetchError::ApiMaintenance,
            });
        }
        if !(200..300).contains(&status) {
            return Err(FetchError::Network(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;
        Ok(HttpResponse {
            final_url,
            status,
            body,
        })
    }
}
