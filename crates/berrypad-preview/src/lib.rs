//! berrypad-preview: the live markdown preview pipeline.
//!
//! This crate provides:
//! - `EventBus` - typed, synchronous publish/subscribe between components
//! - `classify` / `format_inline` - hand-rolled block and inline scanners
//! - `IncrementalRenderer` - rebuilds a `PresentationSurface` from text
//! - `DebounceScheduler`, `ScrollSynchronizer`, `DocumentCache`
//! - `PreviewSession` - all of the above wired to a bus
//! - `EditBuffer` and `FormatAction` for the source pane

pub mod block;
pub mod bus;
pub mod cache;
pub mod debounce;
pub mod format;
pub mod inline;
pub mod layout;
pub mod render;
pub mod scroll;
pub mod session;
pub mod surface;
pub mod text;
pub mod types;

pub use block::{Block, BlockSpan, ListItem, classify, classify_blocks, join_paragraph};
pub use bus::{BusError, Delivery, EventBus, EventKind, PreviewEvent, SubscriptionId};
pub use cache::DocumentCache;
pub use debounce::{Clock, DebounceScheduler, DebounceToken, ManualClock, SystemClock};
pub use format::{FormatAction, FormatError};
pub use inline::{InlineStyle, StyledRun, format_inline};
pub use layout::{Anchor, ComponentRegistry, Layout, Region};
pub use render::{IncrementalRenderer, RenderError, RenderKind, RenderOutcome};
pub use scroll::{ScrollSync, ScrollSynchronizer};
pub use session::PreviewSession;
pub use smol_str::SmolStr;
pub use surface::{
    BlockStyle, BufferSurface, PresentationSurface, Scrollable, SpanStyle, SurfaceError,
};
pub use text::EditBuffer;
pub use types::{DocumentId, LineCol, Pane, Selection, clamp_fraction};
