//! Routing of resolved steps to backend executors.

use log::debug;

use crate::{
    backend::{BackendError, BackendExecutor, HttpExecutor, LocalCallExecutor, MessageExecutor},
    config::EndpointConfig,
    scenario::BackendKind,
};

/// Holds one executor per [`BackendKind`] and the endpoint used to qualify
/// relative REST targets.
///
/// # Examples
///
/// ```
/// use stepwright::{
///     backend::{LocalCallExecutor, LocalCallRegistry},
///     config::EndpointConfig,
///     dispatch::StepDispatcher,
///     scenario::BackendKind,
/// };
///
/// let registry = LocalCallRegistry::new();
/// let dispatcher = StepDispatcher::new(EndpointConfig::new("http://svc", 9000, "/api"))
///     .with_local(LocalCallExecutor::new(registry));
/// assert_eq!(
///     dispatcher.target_for(BackendKind::Rest, "/users/1"),
///     "http://svc:9000/api/users/1"
/// );
/// ```
#[derive(Clone, Default)]
pub struct StepDispatcher<H = HttpExecutor, L = LocalCallExecutor, M = MessageExecutor> {
    endpoint: EndpointConfig,
    http: H,
    local: L,
    message: M,
}

impl StepDispatcher {
    /// Create a dispatcher with the default executors and no broker.
    #[must_use]
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }
}

impl<H, L, M> StepDispatcher<H, L, M> {
    /// Replace the REST executor.
    #[must_use]
    pub fn with_http<H2>(self, http: H2) -> StepDispatcher<H2, L, M> {
        StepDispatcher {
            endpoint: self.endpoint,
            http,
            local: self.local,
            message: self.message,
        }
    }

    /// Replace the in-process executor.
    #[must_use]
    pub fn with_local<L2>(self, local: L2) -> StepDispatcher<H, L2, M> {
        StepDispatcher {
            endpoint: self.endpoint,
            http: self.http,
            local,
            message: self.message,
        }
    }

    /// Replace the broker executor.
    #[must_use]
    pub fn with_message<M2>(self, message: M2) -> StepDispatcher<H, L, M2> {
        StepDispatcher {
            endpoint: self.endpoint,
            http: self.http,
            local: self.local,
            message,
        }
    }

    /// Endpoint used for relative REST targets.
    #[must_use]
    pub fn endpoint(&self) -> &EndpointConfig { &self.endpoint }

    /// Executor for in-process targets.
    #[must_use]
    pub fn local(&self) -> &L { &self.local }

    /// Final target for a resolved target template.
    ///
    /// Relative REST targets are qualified against the endpoint; other
    /// targets are returned unchanged.
    #[must_use]
    pub fn target_for(&self, kind: BackendKind, resolved: &str) -> String {
        match kind {
            BackendKind::Rest => self.endpoint.qualify(resolved),
            BackendKind::LocalCall | BackendKind::Message => resolved.to_owned(),
        }
    }
}

impl<H, L, M> StepDispatcher<H, L, M>
where
    H: BackendExecutor,
    L: BackendExecutor,
    M: BackendExecutor,
{
    /// Send a step to the executor for `kind`.
    ///
    /// `target` must already have passed through [`Self::target_for`].
    ///
    /// # Errors
    ///
    /// Propagates the executor's [`BackendError`].
    pub async fn dispatch(
        &self,
        kind: BackendKind,
        target: &str,
        operation: &str,
        request: &str,
    ) -> Result<String, BackendError> {
        debug!("dispatching {operation} {target} to {kind:?} backend");
        match kind {
            BackendKind::Rest => self.http.execute(target, operation, request).await,
            BackendKind::LocalCall => self.local.execute(target, operation, request).await,
            BackendKind::Message => self.message.execute(target, operation, request).await,
        }
    }
}
