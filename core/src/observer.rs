//! Lifecycle observers and the registry that broadcasts to them.
//!
//! # Design
//! The registry holds observers weakly: it stores a `Weak` keyed by the
//! observer's allocation address, so registering never extends an
//! observer's lifetime. Once the last `Arc` is dropped the entry stops
//! receiving events and is pruned on the next broadcast. `unregister` is
//! idempotent.
//!
//! Broadcasts snapshot the live observers under a read lock and call them
//! after the lock is released, so a hook may register or unregister
//! observers without deadlocking. Whether such a change is seen by the
//! broadcast already in progress is unspecified, as is visiting order.

use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::coding::short_type_name;
use crate::request::Request;

/// Receives pipeline lifecycle events. Every hook defaults to a no-op.
///
/// Hooks run synchronously on the task driving the request and must not
/// block.
pub trait Observer: Send + Sync {
    fn did_encode(&self, _request: &Request, _input_type: &'static str) {}

    fn did_decode(&self, _request: &Request, _output_type: &'static str) {}

    fn will_begin(&self, _request: &Request) {}

    fn did_finish(&self, _request: &Request, _duration: Duration) {}

    /// `status` is the HTTP status for rejected responses and `None` for
    /// failures that have none.
    fn did_fail(&self, _request: &Request, _status: Option<u16>, _error: &(dyn Error + 'static)) {}
}

#[derive(Default)]
pub struct ObserverRegistry {
    entries: RwLock<HashMap<usize, Weak<dyn Observer>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts both concrete observers and `Arc<dyn Observer>`.
    pub fn register<O: WeakObserver + ?Sized>(&self, observer: &Arc<O>) {
        let weak = O::downgrade(observer);
        self.entries.write().insert(identity(observer), weak);
    }

    pub fn unregister<O: Observer + ?Sized>(&self, observer: &Arc<O>) {
        self.entries.write().remove(&identity(observer));
    }

    /// Number of observers still alive.
    pub fn len(&self) -> usize {
        self.live().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn broadcast(&self, notify: impl Fn(&dyn Observer)) {
        for observer in self.live() {
            notify(observer.as_ref());
        }
    }

    fn live(&self) -> Vec<Arc<dyn Observer>> {
        let (live, total) = {
            let entries = self.entries.read();
            let live: Vec<_> = entries.values().filter_map(Weak::upgrade).collect();
            (live, entries.len())
        };
        if live.len() < total {
            self.entries.write().retain(|_, weak| weak.strong_count() > 0);
        }
        live
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}

/// Downgrades an `Arc` to the registry's type-erased weak handle.
pub trait WeakObserver {
    fn downgrade(this: &Arc<Self>) -> Weak<dyn Observer>;
}

impl<O: Observer + 'static> WeakObserver for O {
    fn downgrade(this: &Arc<Self>) -> Weak<dyn Observer> {
        let weak: Weak<O> = Arc::downgrade(this);
        weak
    }
}

impl WeakObserver for dyn Observer {
    fn downgrade(this: &Arc<Self>) -> Weak<dyn Observer> {
        Arc::downgrade(this)
    }
}

fn identity<O: ?Sized>(observer: &Arc<O>) -> usize {
    Arc::as_ptr(observer) as *const () as usize
}

/// Logs every lifecycle event through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn did_encode(&self, request: &Request, input_type: &'static str) {
        debug!(
            method = %request.method,
            path = %request.path,
            input_type = %short_type_name(input_type),
            "encoded request body"
        );
    }

    fn did_decode(&self, request: &Request, output_type: &'static str) {
        debug!(
            method = %request.method,
            path = %request.path,
            output_type = %short_type_name(output_type),
            "decoded response body"
        );
    }

    fn will_begin(&self, request: &Request) {
        info!(method = %request.method, path = %request.path, "request started");
    }

    fn did_finish(&self, request: &Request, duration: Duration) {
        info!(method = %request.method, path = %request.path, elapsed = ?duration, "request finished");
    }

    fn did_fail(&self, request: &Request, status: Option<u16>, error: &(dyn Error + 'static)) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = status.map_or(-1, i32::from),
            %error,
            "request failed"
        );
    }
}
