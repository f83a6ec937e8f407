//! Guidance request controller. Owns the lifecycle of one logical request:
//! validate, dispatch, await under a deadline, classify, then expose retry.
//!
//! At most one call is in flight per controller. A new `submit` aborts the
//! outstanding call, and a generation counter makes sure a stale completion
//! that races past the abort is discarded (last submit wins).
//!
//! The state lock is a `std::sync::Mutex` and is never held across an
//! `.await`, so a controller can be shared as `Arc<GuidanceRequestController<_>>`.

pub mod classify;
pub mod validation;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::errors::{ErrorInfo, TransportError};
use crate::flows::{FlowConfig, FlowPayload};
use crate::transport::{endpoint_url, HttpResponse, Transport};

use self::classify::classify_response;
use self::validation::validate_input;

const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

/// Lifecycle of one logical request. Exactly one variant holds at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<P> {
    Idle,
    Pending,
    Succeeded(P),
    Failed(ErrorInfo),
}

impl<P> RequestState<P> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    pub fn payload(&self) -> Option<&P> {
        match self {
            RequestState::Succeeded(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            RequestState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Pending => "pending",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed(_) => "failed",
        }
    }
}

/// What a `submit` call learned about its own request.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<P> {
    /// This submit's outcome was applied; carries the resulting state.
    Settled(RequestState<P>),
    /// A newer submit replaced this one; its outcome was discarded.
    Superseded,
}

impl<P> Completion<P> {
    pub fn state(&self) -> Option<&RequestState<P>> {
        match self {
            Completion::Settled(state) => Some(state),
            Completion::Superseded => None,
        }
    }
}

struct Inner<P> {
    state: RequestState<P>,
    generation: u64,
    last_input: Option<String>,
    in_flight: Option<AbortHandle>,
}

/// A dispatched request, handed from the synchronous bookkeeping step to the
/// awaiting step of `submit`. Owns the spawned call for as long as `submit`
/// is running.
///
/// Dropping it aborts the call. If `submit` itself was dropped before the
/// call resolved and no newer submit has started, the state goes back to
/// `Idle` so `submit` can be called again.
struct CallGuard<'a, P> {
    controller: &'a GuidanceRequestController<P>,
    generation: u64,
    request_id: Uuid,
    task: JoinHandle<Result<HttpResponse, TransportError>>,
}

impl<P> Drop for CallGuard<'_, P> {
    fn drop(&mut self) {
        self.task.abort();

        let mut inner = self.controller.lock();
        if inner.generation != self.generation || !inner.state.is_pending() {
            return;
        }
        debug!(
            "{} request {} abandoned by its caller",
            self.controller.flow.name, self.request_id
        );
        inner.in_flight = None;
        inner.state = RequestState::Idle;
    }
}

pub struct GuidanceRequestController<P> {
    flow: FlowConfig,
    base_url: Option<String>,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    inner: Mutex<Inner<P>>,
}

impl<P: FlowPayload> GuidanceRequestController<P> {
    /// Creates a controller for the payload's own flow.
    pub fn new(transport: Arc<dyn Transport>, base_url: Option<String>) -> Self {
        Self::with_flow(P::flow(), transport, base_url)
    }

    /// Creates a controller for an explicit flow configuration.
    pub fn with_flow(
        flow: FlowConfig,
        transport: Arc<dyn Transport>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            flow,
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            transport,
            inner: Mutex::new(Inner {
                state: RequestState::Idle,
                generation: 0,
                last_input: None,
                in_flight: None,
            }),
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self::new(transport, config.base_url.clone()).with_timeout(config.timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn flow(&self) -> &FlowConfig {
        &self.flow
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState<P> {
        self.lock().state.clone()
    }

    /// The last input that passed validation, if any.
    pub fn last_input(&self) -> Option<String> {
        self.lock().last_input.clone()
    }

    /// Validates `input`, dispatches one POST and resolves the state.
    ///
    /// Any call still in flight is aborted first, even when `input` then
    /// fails local validation.
    pub async fn submit(&self, input: &str) -> Completion<P> {
        let mut call = match self.begin(input) {
            Ok(call) => call,
            Err(settled) => return settled,
        };
        let (generation, request_id) = (call.generation, call.request_id);

        let result: Result<P, ErrorInfo> =
            match tokio::time::timeout(self.timeout, &mut call.task).await {
                Ok(Ok(Ok(response))) => classify_response(&self.flow, &response),
                Ok(Ok(Err(e))) => {
                    warn!("{} request {} failed in transport: {}", self.flow.name, request_id, e);
                    Err(e.into())
                }
                Ok(Err(join_error)) if join_error.is_cancelled() => {
                    debug!("{} request {} was cancelled", self.flow.name, request_id);
                    return Completion::Superseded;
                }
                Ok(Err(join_error)) => {
                    warn!("{} request {} panicked: {}", self.flow.name, request_id, join_error);
                    Err(ErrorInfo::unknown(MSG_UNEXPECTED))
                }
                Err(_elapsed) => {
                    call.task.abort();
                    // wait for the aborted call to be dropped so its connection is released
                    let _ = (&mut call.task).await;
                    warn!(
                        "{} request {} timed out after {}s",
                        self.flow.name,
                        request_id,
                        self.timeout.as_secs()
                    );
                    Err(ErrorInfo::timed_out())
                }
            };

        self.finish(generation, request_id, result)
    }

    /// Re-submits the last input when the current failure is retryable.
    /// Returns `None` (and touches nothing) otherwise.
    pub async fn retry(&self) -> Option<Completion<P>> {
        let input = {
            let inner = self.lock();
            match &inner.state {
                RequestState::Failed(error) if error.retryable => inner.last_input.clone(),
                _ => None,
            }
        }?;

        info!("Retrying {} request", self.flow.name);
        Some(self.submit(&input).await)
    }

    /// Moves `Failed` back to `Idle`. Returns whether anything changed.
    pub fn clear_error(&self) -> bool {
        let mut inner = self.lock();
        if matches!(inner.state, RequestState::Failed(_)) {
            inner.state = RequestState::Idle;
            true
        } else {
            false
        }
    }

    /// Synchronous half of `submit`: cancels the previous call, validates,
    /// and either settles immediately or spawns the HTTP call.
    fn begin(&self, input: &str) -> Result<CallGuard<'_, P>, Completion<P>> {
        let mut inner = self.lock();
        inner.generation += 1;
        let generation = inner.generation;

        if let Some(previous) = inner.in_flight.take() {
            debug!("Aborting superseded {} request", self.flow.name);
            previous.abort();
        }

        let input = match validate_input(&self.flow, input) {
            Ok(input) => input,
            Err(error) => {
                debug!("{} input rejected: {}", self.flow.name, error.message);
                inner.state = RequestState::Failed(error);
                return Err(Completion::Settled(inner.state.clone()));
            }
        };

        let Some(base_url) = self.base_url.as_deref() else {
            warn!("No backend base URL configured for {}", self.flow.name);
            inner.state = RequestState::Failed(ErrorInfo::configuration());
            return Err(Completion::Settled(inner.state.clone()));
        };

        let url = endpoint_url(base_url, self.flow.endpoint);
        let mut body = Map::new();
        body.insert(self.flow.field_name.to_string(), Value::String(input.clone()));
        let body = Value::Object(body);

        let request_id = Uuid::new_v4();
        info!("{} request {} dispatched to {}", self.flow.name, request_id, url);

        let transport = Arc::clone(&self.transport);
        let task = tokio::spawn(async move { transport.post_json(&url, &body).await });

        inner.state = RequestState::Pending;
        inner.last_input = Some(input);
        inner.in_flight = Some(task.abort_handle());

        Ok(CallGuard {
            controller: self,
            generation,
            request_id,
            task,
        })
    }

    fn finish(
        &self,
        generation: u64,
        request_id: Uuid,
        result: Result<P, ErrorInfo>,
    ) -> Completion<P> {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(
                "Discarding stale {} response for request {}",
                self.flow.name, request_id
            );
            return Completion::Superseded;
        }

        inner.in_flight = None;
        inner.state = match result {
            Ok(payload) => {
                info!("{} request {} succeeded", self.flow.name, request_id);
                RequestState::Succeeded(payload)
            }
            Err(error) => {
                info!(
                    "{} request {} failed ({}, retryable={}): {}",
                    self.flow.name,
                    request_id,
                    error.kind.as_str(),
                    error.retryable,
                    error.message
                );
                RequestState::Failed(error)
            }
        };
        Completion::Settled(inner.state.clone())
    }
}

impl<P> GuidanceRequestController<P> {
    fn lock(&self) -> MutexGuard<'_, Inner<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> Drop for GuidanceRequestController<P> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = inner.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests;
