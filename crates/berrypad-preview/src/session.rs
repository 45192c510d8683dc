//! The live preview session.
//!
//! [`PreviewSession`] wires the renderer, cache, debounce scheduler and
//! scroll synchronizer to an [`EventBus`]. The host publishes edit, switch and
//! scroll events and calls [`PreviewSession::tick`] from its event loop; the
//! session keeps the preview surface up to date.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use berrypad_common::PreviewConfig;

use crate::bus::{BusError, EventBus, EventKind, PreviewEvent, SubscriptionId};
use crate::cache::DocumentCache;
use crate::debounce::{Clock, DebounceScheduler, SystemClock};
use crate::render::{IncrementalRenderer, RenderOutcome};
use crate::scroll::{ScrollSync, ScrollSynchronizer};
use crate::surface::{PresentationSurface, Scrollable};
use crate::types::DocumentId;

struct Shared<P> {
    bus: Rc<EventBus>,
    preview: Rc<RefCell<P>>,
    renderer: RefCell<IncrementalRenderer>,
    cache: RefCell<DocumentCache>,
    debounce: RefCell<DebounceScheduler>,
    scroll: ScrollSynchronizer,
    clock: Box<dyn Clock>,
    active: RefCell<Option<DocumentId>>,
    visible: Cell<bool>,
}

/// Event-driven live preview over a presentation surface `P`.
pub struct PreviewSession<P: PresentationSurface + 'static> {
    shared: Rc<Shared<P>>,
    subscriptions: RefCell<Vec<SubscriptionId>>,
}

impl<P: PresentationSurface + 'static> std::fmt::Debug for PreviewSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSession")
            .field("active", &self.shared.active.borrow())
            .field("visible", &self.shared.visible.get())
            .field("scroll", &self.shared.scroll)
            .field("subscriptions", &self.subscriptions.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<P: PresentationSurface + 'static> PreviewSession<P> {
    /// Session driven by the wall clock.
    pub fn new(
        bus: Rc<EventBus>,
        preview: Rc<RefCell<P>>,
        editor: Rc<RefCell<dyn Scrollable>>,
        config: &PreviewConfig,
    ) -> Self {
        Self::with_clock(bus, preview, editor, config, SystemClock)
    }

    pub fn with_clock(
        bus: Rc<EventBus>,
        preview: Rc<RefCell<P>>,
        editor: Rc<RefCell<dyn Scrollable>>,
        config: &PreviewConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        let preview_pane: Rc<RefCell<dyn Scrollable>> = preview.clone();
        let scroll = ScrollSynchronizer::new(editor, preview_pane);
        scroll.set_enabled(config.sync_scroll);

        Self {
            shared: Rc::new(Shared {
                bus,
                preview,
                renderer: RefCell::new(IncrementalRenderer::new(config)),
                cache: RefCell::new(DocumentCache::new()),
                debounce: RefCell::new(DebounceScheduler::from_millis(config.debounce_ms)),
                scroll,
                clock: Box::new(clock),
                active: RefCell::new(None),
                visible: Cell::new(config.show_preview),
            }),
            subscriptions: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe the session's handlers. Calling it twice is a no-op.
    pub fn attach(&self) {
        if !self.subscriptions.borrow().is_empty() {
            return;
        }
        self.on(EventKind::DocumentChanged, Shared::<P>::on_changed);
        self.on(EventKind::DocumentSwitched, Shared::<P>::on_switched);
        self.on(EventKind::DocumentClosed, Shared::<P>::on_closed);
        self.on(EventKind::DocumentRenamed, Shared::<P>::on_renamed);
        self.on(EventKind::ScrollMoved, Shared::<P>::on_scroll);
        self.on(EventKind::PreviewToggled, Shared::<P>::on_toggled);
        tracing::debug!(target: "berrypad::session", "attached to bus");
    }

    /// Remove every handler the session registered.
    pub fn detach(&self) {
        for id in self.subscriptions.borrow_mut().drain(..) {
            self.shared.bus.unsubscribe(id);
        }
    }

    fn on(
        &self,
        kind: EventKind,
        handler: fn(&Shared<P>, &PreviewEvent) -> Result<(), BusError>,
    ) {
        let weak: Weak<Shared<P>> = Rc::downgrade(&self.shared);
        let id = self.shared.bus.subscribe(kind, move |event| match weak.upgrade() {
            Some(shared) => handler(&shared, event),
            None => Ok(()),
        });
        self.subscriptions.borrow_mut().push(id);
    }

    /// Fire the pending debounced render if its quiet period has elapsed.
    pub fn tick(&self) -> Option<RenderOutcome> {
        self.shared.tick()
    }

    /// Render the active document now, dropping any pending debounce.
    pub fn flush(&self) -> Option<RenderOutcome> {
        self.shared.debounce.borrow_mut().cancel();
        self.shared.render_active()
    }

    /// How long the host may sleep before the next [`tick`](Self::tick) matters.
    pub fn next_deadline(&self) -> Option<Duration> {
        let now = self.shared.clock.now();
        self.shared.debounce.borrow().time_until_ready(now)
    }

    pub fn active(&self) -> Option<DocumentId> {
        self.shared.active.borrow().clone()
    }

    pub fn cached(&self, id: &DocumentId) -> Option<String> {
        self.shared.cache.borrow().get(id).map(str::to_owned)
    }

    pub fn is_pending(&self) -> bool {
        self.shared.debounce.borrow().is_pending()
    }

    pub fn is_visible(&self) -> bool {
        self.shared.visible.get()
    }

    pub fn scroll(&self) -> &ScrollSynchronizer {
        &self.shared.scroll
    }
}

impl<P: PresentationSurface + 'static> Drop for PreviewSession<P> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<P: PresentationSurface + 'static> Shared<P> {
    fn on_changed(&self, event: &PreviewEvent) -> Result<(), BusError> {
        let PreviewEvent::DocumentChanged { identity, content } = event else {
            return Err(unexpected(EventKind::DocumentChanged, event));
        };
        self.cache.borrow_mut().put(identity.clone(), content.as_str());

        // The first document to report a change becomes active.
        let is_active = {
            let mut active = self.active.borrow_mut();
            *active.get_or_insert_with(|| identity.clone()) == *identity
        };
        if is_active && self.visible.get() {
            let token = self
                .debounce
                .borrow_mut()
                .notify(content.as_str(), self.clock.now());
            tracing::trace!(target: "berrypad::session", document = %identity, ?token, "render scheduled");
        }
        Ok(())
    }

    fn on_switched(&self, event: &PreviewEvent) -> Result<(), BusError> {
        let PreviewEvent::DocumentSwitched { identity } = event else {
            return Err(unexpected(EventKind::DocumentSwitched, event));
        };
        self.debounce.borrow_mut().cancel();
        *self.active.borrow_mut() = Some(identity.clone());
        self.scroll.disarm();
        tracing::debug!(target: "berrypad::session", document = %identity, "switched document");

        self.render_active();
        self.bus.publish(PreviewEvent::StatusUpdate {
            message: format!("Editing {identity}"),
        });
        Ok(())
    }

    fn on_closed(&self, event: &PreviewEvent) -> Result<(), BusError> {
        let PreviewEvent::DocumentClosed { identity } = event else {
            return Err(unexpected(EventKind::DocumentClosed, event));
        };
        self.cache.borrow_mut().evict(identity);
        self.renderer.borrow_mut().forget(identity);

        let was_active = self.active.borrow().as_ref() == Some(identity);
        if was_active {
            *self.active.borrow_mut() = None;
            self.debounce.borrow_mut().cancel();
            self.scroll.disarm();
            self.render_active();
        }
        tracing::debug!(target: "berrypad::session", document = %identity, was_active, "closed document");
        Ok(())
    }

    fn on_renamed(&self, event: &PreviewEvent) -> Result<(), BusError> {
        let PreviewEvent::DocumentRenamed { from, to } = event else {
            return Err(unexpected(EventKind::DocumentRenamed, event));
        };
        self.cache.borrow_mut().rename(from, to.clone());
        self.renderer.borrow_mut().rename(from, to);
        let mut active = self.active.borrow_mut();
        if active.as_ref() == Some(from) {
            *active = Some(to.clone());
        }
        tracing::debug!(target: "berrypad::session", %from, %to, "renamed document");
        Ok(())
    }

    fn on_scroll(&self, event: &PreviewEvent) -> Result<(), BusError> {
        let PreviewEvent::ScrollMoved { source, fraction } = event else {
            return Err(unexpected(EventKind::ScrollMoved, event));
        };
        if let ScrollSync::Applied(applied) = self.scroll.on_scroll(*source, *fraction) {
            tracing::trace!(target: "berrypad::session", source = source.as_str(), applied, "synced scroll");
        }
        Ok(())
    }

    fn on_toggled(&self, event: &PreviewEvent) -> Result<(), BusError> {
        let PreviewEvent::PreviewToggled { visible } = event else {
            return Err(unexpected(EventKind::PreviewToggled, event));
        };
        let was_visible = self.visible.replace(*visible);
        if *visible && !was_visible {
            self.render_active();
        } else if !*visible {
            self.debounce.borrow_mut().cancel();
        }
        Ok(())
    }

    fn tick(&self) -> Option<RenderOutcome> {
        let now = self.clock.now();
        let content = self.debounce.borrow_mut().poll(now)?;
        let identity = self.active.borrow().clone();
        self.render(identity.as_ref(), &content)
    }

    /// Repaint the active document from the cache, or the placeholder.
    fn render_active(&self) -> Option<RenderOutcome> {
        let identity = self.active.borrow().clone();
        let content = identity
            .as_ref()
            .and_then(|id| self.cache.borrow().get(id).map(str::to_owned))
            .unwrap_or_default();
        self.render(identity.as_ref(), &content)
    }

    fn render(&self, identity: Option<&DocumentId>, content: &str) -> Option<RenderOutcome> {
        if !self.visible.get() {
            return None;
        }

        let outcome = {
            let Ok(mut surface) = self.preview.try_borrow_mut() else {
                // Retry on a later tick rather than dropping the edit.
                tracing::debug!(target: "berrypad::session", "preview busy, deferring render");
                self.debounce
                    .borrow_mut()
                    .notify(content, self.clock.now());
                return None;
            };
            self.renderer
                .borrow_mut()
                .render(&mut *surface, identity, content)
        };

        if outcome.is_content() {
            self.scroll.arm();
        }
        self.bus.publish(PreviewEvent::PreviewRendered {
            identity: identity.cloned(),
            blocks: outcome.blocks,
        });
        if let Some(message) = &outcome.error {
            self.bus.publish(PreviewEvent::StatusUpdate {
                message: format!("Render error: {message}"),
            });
        }
        Some(outcome)
    }
}

fn unexpected(expected: EventKind, event: &PreviewEvent) -> BusError {
    BusError::UnexpectedEvent {
        expected,
        got: event.kind(),
    }
}
