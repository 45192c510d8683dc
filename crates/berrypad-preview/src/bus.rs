//! Typed publish/subscribe hub.
//!
//! Every pipeline component talks to the others through an [`EventBus`]
//! owned by the host and handed to each component at construction. Events
//! are a closed enum, so handlers match exhaustively instead of looking
//! payload fields up by name.
//!
//! Dispatch is synchronous and happens on the caller's thread. Handlers for
//! one kind run in the order they subscribed; a handler that fails is logged
//! and skipped, the remaining handlers still see the event. Handlers may
//! publish further events from inside a dispatch.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::types::{DocumentId, Pane};

/// Everything that travels over the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewEvent {
    /// The edit surface committed a change; carries the full text.
    DocumentChanged { identity: DocumentId, content: String },
    /// A different document became active.
    DocumentSwitched { identity: DocumentId },
    /// A document was closed and its identity will not be used again.
    DocumentClosed { identity: DocumentId },
    /// A document's identity changed (e.g. after Save As).
    DocumentRenamed { from: DocumentId, to: DocumentId },
    /// One pane scrolled to `fraction` of its height.
    ScrollMoved { source: Pane, fraction: f64 },
    /// The editor cursor moved; 1-based line and column.
    CursorMoved { line: usize, column: usize },
    /// Human readable status line text.
    StatusUpdate { message: String },
    /// The preview finished a rebuild.
    PreviewRendered {
        identity: Option<DocumentId>,
        blocks: usize,
    },
    /// The preview pane was shown or hidden.
    PreviewToggled { visible: bool },
}

/// Discriminant of [`PreviewEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DocumentChanged,
    DocumentSwitched,
    DocumentClosed,
    DocumentRenamed,
    ScrollMoved,
    CursorMoved,
    StatusUpdate,
    PreviewRendered,
    PreviewToggled,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::DocumentChanged,
        EventKind::DocumentSwitched,
        EventKind::DocumentClosed,
        EventKind::DocumentRenamed,
        EventKind::ScrollMoved,
        EventKind::CursorMoved,
        EventKind::StatusUpdate,
        EventKind::PreviewRendered,
        EventKind::PreviewToggled,
    ];

    /// Wire name shared with the rest of the application.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::DocumentChanged => "document.changed",
            EventKind::DocumentSwitched => "document.switched",
            EventKind::DocumentClosed => "document.closed",
            EventKind::DocumentRenamed => "document.renamed",
            EventKind::ScrollMoved => "scroll.moved",
            EventKind::CursorMoved => "cursor.moved",
            EventKind::StatusUpdate => "status.update",
            EventKind::PreviewRendered => "preview.rendered",
            EventKind::PreviewToggled => "preview.toggled",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PreviewEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PreviewEvent::DocumentChanged { .. } => EventKind::DocumentChanged,
            PreviewEvent::DocumentSwitched { .. } => EventKind::DocumentSwitched,
            PreviewEvent::DocumentClosed { .. } => EventKind::DocumentClosed,
            PreviewEvent::DocumentRenamed { .. } => EventKind::DocumentRenamed,
            PreviewEvent::ScrollMoved { .. } => EventKind::ScrollMoved,
            PreviewEvent::CursorMoved { .. } => EventKind::CursorMoved,
            PreviewEvent::StatusUpdate { .. } => EventKind::StatusUpdate,
            PreviewEvent::PreviewRendered { .. } => EventKind::PreviewRendered,
            PreviewEvent::PreviewToggled { .. } => EventKind::PreviewToggled,
        }
    }
}

/// Errors a handler can report back to the bus.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BusError {
    /// The handler was registered for one kind and received another.
    #[error("handler for {expected} received {got}")]
    UnexpectedEvent { expected: EventKind, got: EventKind },

    /// Free-form failure.
    #[error("{0}")]
    Handler(String),
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Handler = Rc<dyn Fn(&PreviewEvent) -> Result<(), BusError>>;

struct Subscriber {
    id: SubscriptionId,
    handler: Handler,
}

/// Outcome of a single [`EventBus::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    /// Handlers that ran to completion.
    pub delivered: usize,
    /// Handlers that returned an error.
    pub failed: usize,
}

/// Synchronous, single-threaded event hub.
#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<HashMap<EventKind, Vec<Subscriber>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`. Registering the same closure twice
    /// delivers the event twice.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&PreviewEvent) -> Result<(), BusError> + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push(Subscriber {
                id,
                handler: Rc::new(handler),
            });
        tracing::debug!(target: "berrypad::bus", event = %kind, id = id.0, "subscribed");
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        for list in subscribers.values_mut() {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .borrow()
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Deliver `event` to every handler registered for its kind.
    pub fn publish(&self, event: PreviewEvent) -> Delivery {
        let kind = event.kind();
        // Snapshot so handlers can subscribe or publish while we iterate.
        let handlers: Vec<Handler> = self
            .subscribers
            .borrow()
            .get(&kind)
            .map(|list| list.iter().map(|s| s.handler.clone()).collect())
            .unwrap_or_default();

        tracing::trace!(target: "berrypad::bus", event = %kind, handlers = handlers.len(), "publish");

        let mut delivery = Delivery::default();
        for handler in handlers {
            match handler(&event) {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    delivery.failed += 1;
                    tracing::error!(target: "berrypad::bus", event = %kind, error = %e, "event handler failed");
                }
            }
        }
        delivery
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.borrow();
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            if let Some(list) = subscribers.get(&kind) {
                map.entry(&kind.name(), &list.len());
            }
        }
        map.finish()
    }
}
