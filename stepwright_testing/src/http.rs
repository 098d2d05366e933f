//! Local HTTP server returning canned JSON bodies.
//!
//! Built on an `axum` router with a single fallback handler that records
//! every request and answers from a `(method, path)` table.

use std::{
    collections::HashMap,
    io,
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use log::warn;
use tokio::{net::TcpListener, task::JoinHandle};

/// A request as seen by [`CannedHttpServer`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceivedRequest {
    /// Request method.
    pub method: String,
    /// Path without the query string.
    pub path: String,
    /// Raw query string, empty when absent.
    pub query: String,
    /// Headers with lower-cased names.
    pub headers: Vec<(String, String)>,
    /// Body text.
    pub body: String,
}

impl ReceivedRequest {
    /// First header named `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

type Routes = HashMap<(String, String), (u16, String)>;

#[derive(Clone)]
struct Canned {
    routes: Arc<Routes>,
    seen: Arc<Mutex<Vec<ReceivedRequest>>>,
}

/// Local server answering `(method, path)` pairs with fixed responses.
///
/// Unrouted requests receive `404` with a JSON error body. The server stops
/// when dropped.
pub struct CannedHttpServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
    task: JoinHandle<()>,
}

impl CannedHttpServer {
    /// Bind to an ephemeral localhost port and start serving `routes`,
    /// given as `(method, path, status, body)`.
    ///
    /// # Errors
    ///
    /// Returns any error from binding the listener.
    pub async fn start<I>(routes: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = (&'static str, &'static str, u16, String)>,
    {
        let routes: Routes = routes
            .into_iter()
            .map(|(method, path, status, body)| ((method.to_owned(), path.to_owned()), (status, body)))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(answer).with_state(Canned {
            routes: Arc::new(routes),
            seen: Arc::clone(&requests),
        });

        let listener = TcpListener::bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0)).await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                warn!("canned HTTP server on {addr} stopped: {err}");
            }
        });

        Ok(Self {
            addr,
            requests,
            task,
        })
    }

    /// Bound address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr { self.addr }

    /// Port to put in an endpoint configuration.
    #[must_use]
    pub fn port(&self) -> u16 { self.addr.port() }

    /// `http://127.0.0.1:<port><path>`.
    #[must_use]
    pub fn url(&self, path: &str) -> String { format!("http://{}{path}", self.addr) }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for CannedHttpServer {
    fn drop(&mut self) { self.task.abort(); }
}

async fn answer(
    State(canned): State<Canned>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = ReceivedRequest {
        method: method.as_str().to_owned(),
        path: uri.path().to_owned(),
        query: uri.query().unwrap_or_default().to_owned(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, payload) = canned
        .routes
        .get(&(request.method.clone(), request.path.clone()))
        .cloned()
        .unwrap_or_else(|| (404, r#"{"error":"not found"}"#.to_owned()));
    canned
        .seen
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request);

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], payload).into_response()
}
