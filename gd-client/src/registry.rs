use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};
use wire::{ActionRoute, RequestKind};

use crate::{logging::category_action, metrics::SyncMetrics};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub id: String,
    pub kind: RequestKind,
}

impl RequestKey {
    pub fn new(id: impl Into<String>, kind: RequestKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

impl From<&ActionRoute> for RequestKey {
    fn from(route: &ActionRoute) -> Self {
        Self::new(route.target.clone(), route.kind())
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.id, self.kind)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RequestOutcome<R> {
    Completed(R),
    /// Superseded, cancelled, or aborted before its completion ran.
    Cancelled,
}

impl<R> RequestOutcome<R> {
    pub fn completed(self) -> Option<R> {
        match self {
            RequestOutcome::Completed(value) => Some(value),
            RequestOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestOutcome::Cancelled)
    }
}

/// Caller side of one registered request. Dropping it detaches the request.
pub struct RequestHandle<R> {
    key: RequestKey,
    ticket: u64,
    join: JoinHandle<Option<R>>,
}

impl<R> RequestHandle<R> {
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub async fn wait(self) -> RequestOutcome<R> {
        match self.join.await {
            Ok(Some(value)) => RequestOutcome::Completed(value),
            Ok(None) => RequestOutcome::Cancelled,
            Err(err) => {
                if err.is_panic() {
                    warn!(
                        "{} completion panicked key={} ticket={}",
                        category_action(),
                        self.key,
                        self.ticket
                    );
                }
                RequestOutcome::Cancelled
            }
        }
    }
}

struct InFlight {
    ticket: u64,
    abort: AbortHandle,
}

/// Single-flight table: at most one live request per [`RequestKey`].
pub struct RequestRegistry {
    inflight: Mutex<HashMap<RequestKey, InFlight>>,
    tickets: AtomicU64,
    metrics: Arc<SyncMetrics>,
}

impl RequestRegistry {
    pub fn new(metrics: Arc<SyncMetrics>) -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
            tickets: AtomicU64::new(0),
            metrics,
        }
    }

    /// Starts `request` under `key`, cancelling whatever held the key before.
    ///
    /// `on_complete` runs only if the request is still the registered one
    /// when it finishes; a superseded or cancelled request never reaches it.
    pub fn issue<F, C, R>(
        self: &Arc<Self>,
        key: RequestKey,
        request: F,
        on_complete: C,
    ) -> RequestHandle<R>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
        C: FnOnce(F::Output) -> R + Send + 'static,
        R: Send + 'static,
    {
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;
        let registry = Arc::clone(self);
        let task_key = key.clone();

        let mut inflight = self.inflight.lock().expect("request registry lock poisoned");
        if let Some(previous) = inflight.remove(&key) {
            previous.abort.abort();
            self.metrics.record_request_superseded();
            debug!(
                "{} superseded key={key} ticket={} by ticket={ticket}",
                category_action(),
                previous.ticket
            );
        }
        let join = tokio::spawn(async move {
            let output = request.await;
            if registry.complete(&task_key, ticket) {
                Some(on_complete(output))
            } else {
                None
            }
        });
        inflight.insert(
            key.clone(),
            InFlight {
                ticket,
                abort: join.abort_handle(),
            },
        );
        drop(inflight);

        self.metrics.record_request_issued();
        RequestHandle { key, ticket, join }
    }

    pub fn cancel(&self, key: &RequestKey) -> bool {
        let removed = self
            .inflight
            .lock()
            .expect("request registry lock poisoned")
            .remove(key);
        match removed {
            Some(entry) => {
                entry.abort.abort();
                self.metrics.record_requests_cancelled(1);
                debug!(
                    "{} cancelled key={key} ticket={}",
                    category_action(),
                    entry.ticket
                );
                true
            }
            None => false,
        }
    }

    /// Cancels `key` only while `ticket` still owns it.
    pub fn cancel_ticket(&self, key: &RequestKey, ticket: u64) -> bool {
        let mut inflight = self.inflight.lock().expect("request registry lock poisoned");
        match inflight.get(key) {
            Some(entry) if entry.ticket == ticket => {
                if let Some(entry) = inflight.remove(key) {
                    entry.abort.abort();
                }
                drop(inflight);
                self.metrics.record_requests_cancelled(1);
                debug!("{} cancelled key={key} ticket={ticket}", category_action());
                true
            }
            _ => false,
        }
    }

    /// Cancels every kind registered for `id`; returns how many were live.
    pub fn cancel_all(&self, id: &str) -> usize {
        RequestKind::ALL
            .into_iter()
            .filter(|kind| self.cancel(&RequestKey::new(id, *kind)))
            .count()
    }

    pub fn is_pending(&self, key: &RequestKey) -> bool {
        self.inflight
            .lock()
            .expect("request registry lock poisoned")
            .contains_key(key)
    }

    pub fn pending_kinds(&self, id: &str) -> Vec<RequestKind> {
        let inflight = self.inflight.lock().expect("request registry lock poisoned");
        let mut kinds: Vec<RequestKind> = inflight
            .keys()
            .filter(|key| key.id == id)
            .map(|key| key.kind)
            .collect();
        kinds.sort();
        kinds
    }

    pub fn pending_count(&self) -> usize {
        self.inflight
            .lock()
            .expect("request registry lock poisoned")
            .len()
    }

    /// Evicts `key` if `ticket` still owns it.
    fn complete(&self, key: &RequestKey, ticket: u64) -> bool {
        let mut inflight = self.inflight.lock().expect("request registry lock poisoned");
        match inflight.get(key) {
            Some(entry) if entry.ticket == ticket => {
                inflight.remove(key);
                true
            }
            _ => false,
        }
    }
}
