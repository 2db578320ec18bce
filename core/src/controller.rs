//! Search lifecycle controller.
//!
//! # Design
//! The controller owns exactly one `SearchOutcome`. Every `submit` cancels the
//! previous in-flight call and records a fresh `ActiveSearch` id; when a call
//! settles, its id is compared with the active one under the same lock that
//! publishes the new outcome. A call whose id no longer matches is discarded,
//! so a later submit always wins regardless of completion order. The token
//! only tells the transport to stop early; the id check is what keeps stale
//! results out.
//!
//! Observers get the latest outcome through a `watch` channel and the
//! transition history, in order and bounded, through a `broadcast` channel.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{TransportError, ValidationError};
use crate::transport::SearchTransport;
use crate::types::{SearchQuery, SearchResult};

const TRANSITION_BUFFER: usize = 64;

/// The single authoritative state of the current search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchOutcome {
    #[default]
    Idle,
    Pending {
        query: SearchQuery,
    },
    Success {
        query: SearchQuery,
        result: SearchResult,
    },
    Failed {
        query: SearchQuery,
        message: String,
    },
}

impl SearchOutcome {
    pub fn is_idle(&self) -> bool {
        matches!(self, SearchOutcome::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SearchOutcome::Pending { .. })
    }

    /// The query this outcome belongs to, if any.
    pub fn query(&self) -> Option<&SearchQuery> {
        match self {
            SearchOutcome::Idle => None,
            SearchOutcome::Pending { query }
            | SearchOutcome::Success { query, .. }
            | SearchOutcome::Failed { query, .. } => Some(query),
        }
    }

    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            SearchOutcome::Success { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SearchOutcome::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// How a spawned search call ended, from the controller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The result (success or failure) became the current outcome.
    Applied,
    /// A newer submit, `clear` or `dispose` took over; the result was dropped.
    Superseded,
    /// The transport reported cancellation; nothing was published.
    Cancelled,
    /// The task panicked or was aborted before it could settle.
    Abandoned,
}

/// Handle to one submitted search.
#[derive(Debug)]
pub struct SearchTicket {
    id: u64,
    handle: JoinHandle<Settlement>,
}

impl SearchTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the call to settle.
    pub async fn settled(self) -> Settlement {
        match self.handle.await {
            Ok(settlement) => settlement,
            Err(error) => {
                warn!(search_id = self.id, %error, "search task did not complete");
                Settlement::Abandoned
            }
        }
    }
}

struct ActiveSearch {
    id: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    active: Option<ActiveSearch>,
}

impl Inner {
    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(search_id = active.id, "cancelling in-flight search");
            active.cancel.cancel();
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    state: watch::Sender<SearchOutcome>,
    transitions: broadcast::Sender<SearchOutcome>,
}

impl Shared {
    /// Callers hold the `inner` lock so publication order matches issue order.
    fn publish(&self, outcome: SearchOutcome) {
        self.state.send_replace(outcome.clone());
        // No subscribers is fine.
        let _ = self.transitions.send(outcome);
    }

    fn settle(
        &self,
        id: u64,
        query: SearchQuery,
        result: Result<SearchResult, TransportError>,
    ) -> Settlement {
        let mut inner = self.inner.lock();
        if inner.active.as_ref().map(|active| active.id) != Some(id) {
            debug!(search_id = id, keyword = %query.keyword, "discarding superseded search result");
            return Settlement::Superseded;
        }

        match result {
            Ok(result) => {
                info!(
                    search_id = id,
                    keyword = %query.keyword,
                    page = result.current_page,
                    total_results = result.total_results,
                    "search succeeded"
                );
                inner.active = None;
                self.publish(SearchOutcome::Success { query, result });
                Settlement::Applied
            }
            Err(TransportError::Cancelled) => {
                debug!(search_id = id, "search cancelled");
                Settlement::Cancelled
            }
            Err(error) => {
                warn!(search_id = id, keyword = %query.keyword, %error, "search failed");
                inner.active = None;
                self.publish(SearchOutcome::Failed {
                    query,
                    message: error.user_message(),
                });
                Settlement::Applied
            }
        }
    }
}

/// Serializes search intents into one authoritative `SearchOutcome`.
///
/// `submit` spawns onto the ambient tokio runtime and must be called from
/// within one. Dropping the controller cancels any in-flight call.
pub struct SearchController {
    transport: Arc<dyn SearchTransport>,
    shared: Arc<Shared>,
}

impl SearchController {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        let (state, _) = watch::channel(SearchOutcome::Idle);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            transport,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                state,
                transitions,
            }),
        }
    }

    /// Snapshot of the current outcome.
    pub fn outcome(&self) -> SearchOutcome {
        self.shared.state.borrow().clone()
    }

    /// Receiver that always holds the latest outcome.
    pub fn subscribe(&self) -> watch::Receiver<SearchOutcome> {
        self.shared.state.subscribe()
    }

    /// Receiver that sees each transition published after this call, in
    /// order. The buffer holds 64 transitions; a receiver further behind gets
    /// `RecvError::Lagged` and skips the oldest. Views that only re-render
    /// should use `subscribe()`.
    pub fn transitions(&self) -> broadcast::Receiver<SearchOutcome> {
        self.shared.transitions.subscribe()
    }

    /// Validate `query`, cancel whatever is in flight, publish `Pending` and
    /// start the transport call. Validation failures return immediately and
    /// leave the current outcome and any in-flight call alone.
    pub fn submit(&self, query: SearchQuery) -> Result<SearchTicket, ValidationError> {
        query.validate()?;

        let (id, cancel) = {
            let mut inner = self.shared.inner.lock();
            inner.cancel_active();
            inner.next_id += 1;
            let id = inner.next_id;
            let cancel = CancellationToken::new();
            inner.active = Some(ActiveSearch {
                id,
                cancel: cancel.clone(),
            });
            self.shared.publish(SearchOutcome::Pending {
                query: query.clone(),
            });
            (id, cancel)
        };
        debug!(search_id = id, keyword = %query.keyword, page = query.page, "search submitted");

        let shared = Arc::clone(&self.shared);
        let transport = Arc::clone(&self.transport);
        let handle = tokio::spawn(async move {
            let result = transport.execute(&query, &cancel).await;
            shared.settle(id, query, result)
        });

        Ok(SearchTicket { id, handle })
    }

    /// Resubmit the most recent query for another page.
    pub fn go_to_page(&self, page: u32) -> Result<SearchTicket, ValidationError> {
        let query = self
            .outcome()
            .query()
            .cloned()
            .ok_or(ValidationError::NoActiveQuery)?;
        self.submit(query.with_page(page))
    }

    /// Cancel any in-flight call and return to `Idle`. Already-idle
    /// controllers publish nothing.
    pub fn clear(&self) {
        let mut inner = self.shared.inner.lock();
        inner.cancel_active();
        if !self.shared.state.borrow().is_idle() {
            self.shared.publish(SearchOutcome::Idle);
        }
    }

    /// Drop a `Failed` outcome back to `Idle`; any other outcome is kept.
    pub fn dismiss_error(&self) {
        let _inner = self.shared.inner.lock();
        if matches!(*self.shared.state.borrow(), SearchOutcome::Failed { .. }) {
            self.shared.publish(SearchOutcome::Idle);
        }
    }

    /// Cancel any in-flight call without touching the outcome. Results that
    /// arrive afterwards are discarded.
    pub fn dispose(&self) {
        self.shared.inner.lock().cancel_active();
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.dispose();
    }
}
