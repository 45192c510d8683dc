//! Scroll synchronization between the editor and the preview.
//!
//! Applying a position to one pane usually makes that pane report a scroll of
//! its own. The `syncing` guard swallows that echo so the two panes never
//! bounce positions back and forth.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::surface::Scrollable;
use crate::types::{Pane, clamp_fraction};

/// Result of handling one scroll report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollSync {
    /// The fraction was applied to the other pane.
    Applied(f64),
    /// Echo of a sync already in progress.
    Suppressed,
    /// Nothing rendered yet for the active document.
    NotReady,
    /// Synchronization is switched off.
    Disabled,
    /// The other pane was borrowed further up the stack.
    Busy,
}

/// Mirrors fractional scroll positions between two panes.
pub struct ScrollSynchronizer {
    editor: Rc<RefCell<dyn Scrollable>>,
    preview: Rc<RefCell<dyn Scrollable>>,
    syncing: Cell<bool>,
    armed: Cell<bool>,
    enabled: Cell<bool>,
}

impl std::fmt::Debug for ScrollSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSynchronizer")
            .field("syncing", &self.syncing.get())
            .field("armed", &self.armed.get())
            .field("enabled", &self.enabled.get())
            .finish_non_exhaustive()
    }
}

impl ScrollSynchronizer {
    pub fn new(
        editor: Rc<RefCell<dyn Scrollable>>,
        preview: Rc<RefCell<dyn Scrollable>>,
    ) -> Self {
        Self {
            editor,
            preview,
            syncing: Cell::new(false),
            armed: Cell::new(false),
            enabled: Cell::new(true),
        }
    }

    /// Allow propagation once the active document has rendered content.
    pub fn arm(&self) {
        self.armed.set(true);
    }

    /// Suspend propagation until the next successful render.
    pub fn disarm(&self) {
        self.armed.set(false);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.get()
    }

    fn pane(&self, pane: Pane) -> &Rc<RefCell<dyn Scrollable>> {
        match pane {
            Pane::Editor => &self.editor,
            Pane::Preview => &self.preview,
        }
    }

    /// Handle a scroll report from `source`, mirroring it onto the other pane.
    pub fn on_scroll(&self, source: Pane, fraction: f64) -> ScrollSync {
        if !self.enabled.get() {
            return ScrollSync::Disabled;
        }
        if !self.armed.get() {
            return ScrollSync::NotReady;
        }
        if self.syncing.get() {
            tracing::trace!(target: "berrypad::scroll", source = source.as_str(), "suppressed echo");
            return ScrollSync::Suppressed;
        }

        let fraction = clamp_fraction(fraction);
        let target = source.other();
        self.syncing.set(true);
        let result = match self.pane(target).try_borrow_mut() {
            Ok(mut pane) => {
                pane.scroll_to(fraction);
                ScrollSync::Applied(fraction)
            }
            Err(_) => {
                tracing::debug!(
                    target: "berrypad::scroll",
                    pane = target.as_str(),
                    "pane busy, skipping scroll sync"
                );
                ScrollSync::Busy
            }
        };
        self.syncing.set(false);
        result
    }
}
