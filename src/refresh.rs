//! Refresh protocol for the order collection.
//!
//! A [`RefreshCoordinator`] runs at most one refresh at a time through a
//! caller-supplied [`OrderSource`]. Every refresh owns a [`CancellationToken`];
//! a result is committed only while its token is uncancelled and still the
//! active one, so torn-down or superseded calls can never overwrite newer data.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::models::OrderRecord;

pub const UNKNOWN_REASON: &str = "Unknown reason";

/// Why a refresh failed. Retained by the coordinator for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("remote returned status {status}: {}", .reason.as_deref().unwrap_or(UNKNOWN_REASON))]
    Status { status: u16, reason: Option<String> },
    #[error("malformed orderbook payload: {0}")]
    Decode(String),
}

impl RefreshError {
    /// Underlying reason, or a generic fallback when the remote gave none.
    pub fn reason(&self) -> String {
        let reason = match self {
            RefreshError::Transport(r) | RefreshError::Decode(r) => Some(r.as_str()),
            RefreshError::Status { reason, .. } => reason.as_deref(),
        };
        match reason.map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => UNKNOWN_REASON.to_string(),
        }
    }

    pub fn display_message(&self) -> String {
        format!("Error while loading the orderbook: {}", self.reason())
    }
}

impl From<reqwest::Error> for RefreshError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RefreshError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().map(String::from),
            },
            None if e.is_decode() => RefreshError::Decode(e.to_string()),
            None => RefreshError::Transport(e.to_string()),
        }
    }
}

/// Cooperative cancellation shared between the coordinator and one refresh call.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once `cancel` has been called on this token or any clone of it.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // the sender lives as long as `self`, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    pub fn same_as(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Remote provider of order snapshots.
///
/// Implementations are expected to ask the remote to resync first and then
/// fetch the current snapshot. Side effects after `token` fires must be safe
/// to ignore; the coordinator discards the result either way.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn refresh(&self, token: &CancellationToken) -> Result<Vec<OrderRecord>, RefreshError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    Idle,
    Refreshing,
}

/// What became of one `refresh` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New orders replaced the old collection.
    Applied { count: usize },
    /// The source failed; old orders kept, error retained.
    Failed(RefreshError),
    /// Another refresh was already running.
    Ignored,
    /// Token fired before the result could be committed. Not an error.
    Cancelled,
}

struct Inner {
    status: RefreshStatus,
    orders: Arc<Vec<OrderRecord>>,
    last_error: Option<RefreshError>,
    active: Option<CancellationToken>,
    initialized: bool,
}

pub struct RefreshCoordinator {
    source: Arc<dyn OrderSource>,
    min_loading: Duration,
    inner: Mutex<Inner>,
}

impl RefreshCoordinator {
    pub fn new(source: Arc<dyn OrderSource>, min_loading: Duration) -> Self {
        Self {
            source,
            min_loading,
            inner: Mutex::new(Inner {
                status: RefreshStatus::Idle,
                orders: Arc::new(Vec::new()),
                last_error: None,
                active: None,
                initialized: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // state is only ever replaced wholesale, so a poisoned guard is still consistent
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> RefreshStatus {
        self.lock().status
    }

    pub fn is_loading(&self) -> bool {
        self.status() == RefreshStatus::Refreshing
    }

    /// True once a refresh has settled (applied or failed) at least once.
    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn last_error(&self) -> Option<RefreshError> {
        self.lock().last_error.clone()
    }

    /// Current snapshot. Replaced as a whole on every successful refresh.
    pub fn orders(&self) -> Arc<Vec<OrderRecord>> {
        Arc::clone(&self.lock().orders)
    }

    /// Run one refresh through the source.
    ///
    /// Ignored while another refresh is in flight. Data is committed as soon
    /// as it arrives; the `Refreshing` status is then held until at least
    /// `min_loading` has passed since the start.
    pub async fn refresh(&self) -> RefreshOutcome {
        let active = match self.begin() {
            Some(active) => active,
            None => {
                debug!("refresh already in flight, request ignored");
                return RefreshOutcome::Ignored;
            }
        };
        let token = &active.token;
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.source.refresh(token) => Some(result),
        };
        let outcome = match result {
            Some(result) => self.commit(token, result),
            None => RefreshOutcome::Cancelled,
        };
        if outcome == RefreshOutcome::Cancelled {
            debug!("refresh cancelled, result discarded");
            return outcome;
        }

        let elapsed = started.elapsed();
        if elapsed < self.min_loading {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(self.min_loading - elapsed) => {}
            }
        }
        outcome
    }

    /// Fire the active token, if any. The coordinator is Idle afterwards and
    /// the in-flight call will not touch orders or the retained error.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if let Some(token) = inner.active.take() {
            token.cancel();
            inner.status = RefreshStatus::Idle;
            debug!("in-flight refresh cancelled");
        }
    }

    fn begin(&self) -> Option<ActiveRefresh<'_>> {
        let mut inner = self.lock();
        if inner.status == RefreshStatus::Refreshing {
            return None;
        }
        let token = CancellationToken::new();
        inner.status = RefreshStatus::Refreshing;
        inner.active = Some(token.clone());
        debug!("refresh started");
        Some(ActiveRefresh {
            coordinator: self,
            token,
        })
    }

    fn is_current(inner: &Inner, token: &CancellationToken) -> bool {
        !token.is_cancelled()
            && inner
                .active
                .as_ref()
                .is_some_and(|active| active.same_as(token))
    }

    fn commit(
        &self,
        token: &CancellationToken,
        result: Result<Vec<OrderRecord>, RefreshError>,
    ) -> RefreshOutcome {
        let mut inner = self.lock();
        if !Self::is_current(&inner, token) {
            return RefreshOutcome::Cancelled;
        }
        inner.initialized = true;
        match result {
            Ok(orders) => {
                let count = orders.len();
                inner.orders = Arc::new(orders);
                inner.last_error = None;
                info!("orderbook refreshed: {} orders", count);
                RefreshOutcome::Applied { count }
            }
            Err(e) => {
                warn!("orderbook refresh failed: {}", e);
                inner.last_error = Some(e.clone());
                RefreshOutcome::Failed(e)
            }
        }
    }

    fn finish(&self, token: &CancellationToken) {
        let mut inner = self.lock();
        if Self::is_current(&inner, token) {
            inner.status = RefreshStatus::Idle;
            inner.active = None;
        }
    }
}

/// Marks one refresh as in flight. Dropping it, on completion or because the
/// refresh future was aborted, timed out or unwound, returns the coordinator
/// to Idle unless the token has already been cancelled or superseded.
struct ActiveRefresh<'a> {
    coordinator: &'a RefreshCoordinator,
    token: CancellationToken,
}

impl Drop for ActiveRefresh<'_> {
    fn drop(&mut self) {
        self.coordinator.finish(&self.token);
    }
}
