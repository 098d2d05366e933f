//! HTTP backend.
//!
//! [`HttpExecutor`] turns a resolved step into an [`HttpRequest`] and sends
//! it through an [`HttpTransport`]. The default transport wraps a
//! caller-supplied [`reqwest::Client`], so pooling and TLS stay under the
//! host's control.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{Instrument, debug, debug_span};

use super::{BackendError, BackendExecutor};
use crate::{broker::BoxError, state::parse_lenient};

/// A request ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully qualified URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Query parameter name/value pairs.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

/// A received response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body text.
    pub body: String,
}

/// Capability to perform one HTTP exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Use an existing client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self { Self { client } }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Executes REST steps.
#[derive(Clone, Debug, Default)]
pub struct HttpExecutor<T = ReqwestTransport> {
    transport: T,
}

impl<T: HttpTransport> HttpExecutor<T> {
    /// Send requests through `transport`.
    #[must_use]
    pub fn new(transport: T) -> Self { Self { transport } }
}

/// Build the request for `url` from a resolved step payload.
///
/// A payload object carrying any of `headers`, `queryParams` or `body` is
/// read as a request envelope; any other payload is sent whole as the body.
/// A `null` payload sends no body.
///
/// # Errors
///
/// Returns [`BackendError::InvalidMethod`] when `operation` is not an HTTP
/// method, or [`BackendError::InvalidRequest`] when envelope sections have
/// the wrong shape.
pub fn build_request(url: &str, operation: &str, payload: &str) -> Result<HttpRequest, BackendError> {
    let method = Method::from_bytes(operation.to_ascii_uppercase().as_bytes())
        .map_err(|_| BackendError::InvalidMethod(operation.to_owned()))?;
    let payload = if payload.trim().is_empty() {
        Value::Null
    } else {
        parse_lenient(payload)
    };

    let mut request = HttpRequest {
        method,
        url: url.to_owned(),
        headers: Vec::new(),
        query: Vec::new(),
        body: None,
    };
    match payload {
        Value::Null => {}
        Value::Object(mut fields)
            if ["headers", "queryParams", "body"]
                .iter()
                .any(|k| fields.contains_key(*k)) =>
        {
            if let Some(headers) = fields.remove("headers") {
                request.headers = pairs("headers", headers)?;
            }
            if let Some(query) = fields.remove("queryParams") {
                request.query = pairs("queryParams", query)?;
            }
            request.body = fields.remove("body").filter(|b| !b.is_null());
        }
        other => request.body = Some(other),
    }
    Ok(request)
}

fn pairs(section: &str, value: Value) -> Result<Vec<(String, String)>, BackendError> {
    let fields: Map<String, Value> = match value {
        Value::Object(fields) => fields,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(BackendError::InvalidRequest(format!(
                "'{section}' must be an object"
            )));
        }
    };
    Ok(fields
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (name, text)
        })
        .collect())
}

#[async_trait]
impl<T: HttpTransport> BackendExecutor for HttpExecutor<T> {
    async fn execute(&self, target: &str, operation: &str, request: &str) -> Result<String, BackendError> {
        let request = build_request(target, operation, request)?;
        let span = debug_span!("http", method = %request.method, url = %request.url);
        let response = self
            .transport
            .send(request)
            .instrument(span)
            .await
            .map_err(BackendError::Transport)?;
        debug!(status = response.status, "http response received");

        if response.body.trim().is_empty() {
            return Ok(Value::Null.to_string());
        }
        serde_json::from_str::<Value>(&response.body).map_err(|e| BackendError::MalformedResponse {
            status: response.status,
            reason: e.to_string(),
        })?;
        Ok(response.body)
    }
}
