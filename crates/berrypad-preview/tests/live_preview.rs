//! End-to-end event flow: edit buffer -> bus -> session -> preview surface.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use berrypad_common::PreviewConfig;
use berrypad_preview::{
    BlockStyle, BufferSurface, DocumentId, EditBuffer, EventBus, EventKind, FormatAction,
    InlineStyle, ManualClock, Pane, PresentationSurface, PreviewEvent, PreviewSession, RenderKind,
    Scrollable, SpanStyle, SurfaceError,
};

const QUIET: Duration = Duration::from_millis(50);

struct Host<P: PresentationSurface + 'static> {
    bus: Rc<EventBus>,
    editor: Rc<RefCell<EditBuffer>>,
    preview: Rc<RefCell<P>>,
    clock: ManualClock,
    session: PreviewSession<P>,
    events: Rc<RefCell<Vec<PreviewEvent>>>,
}

impl<P: PresentationSurface + 'static> Host<P> {
    fn with_surface(bus: Rc<EventBus>, surface: P) -> Self {
        let editor = Rc::new(RefCell::new(EditBuffer::new()));
        let preview = Rc::new(RefCell::new(surface));
        let clock = ManualClock::new();
        let session = PreviewSession::with_clock(
            bus.clone(),
            preview.clone(),
            editor.clone(),
            &PreviewConfig::default(),
            clock.clone(),
        );
        session.attach();

        let events = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::PreviewRendered, EventKind::StatusUpdate] {
            let events = events.clone();
            bus.subscribe(kind, move |event| {
                events.borrow_mut().push(event.clone());
                Ok(())
            });
        }

        Self {
            bus,
            editor,
            preview,
            clock,
            session,
            events,
        }
    }

    fn switch(&self, id: &str) {
        self.bus.publish(PreviewEvent::DocumentSwitched {
            identity: id.into(),
        });
    }

    /// Publish the editor's pending change, like the host's modified callback.
    fn publish_changes(&self, id: &str) {
        let event = self
            .editor
            .borrow_mut()
            .take_change_event(&DocumentId::new(id));
        if let Some(event) = event {
            self.bus.publish(event);
        }
    }

    fn type_text(&self, id: &str, text: &str) {
        self.editor.borrow_mut().type_text(text);
        self.publish_changes(id);
    }

    fn replace_all(&self, id: &str, text: &str) {
        {
            let mut editor = self.editor.borrow_mut();
            let len = editor.len_chars();
            editor.replace(0..len, text);
        }
        self.publish_changes(id);
    }

    fn renders(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind() == EventKind::PreviewRendered)
            .count()
    }

    fn statuses(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                PreviewEvent::StatusUpdate { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn settle(&self) {
        self.clock.advance(QUIET);
        self.session.tick();
    }
}

fn host() -> Host<BufferSurface> {
    Host::with_surface(Rc::new(EventBus::new()), BufferSurface::new())
}

#[test]
fn test_typing_renders_document_after_quiet_period() {
    let host = host();
    host.switch("notes.md");
    host.type_text("notes.md", "# Title\n\nSome **bold** and *italic*.\n\n- one\n- two\n");
    assert_eq!(host.preview.borrow().plain_text(), "No content\n");

    host.settle();
    let preview = host.preview.borrow();
    assert_eq!(
        preview.plain_text(),
        "Title\n\nSome bold and italic.\n\n• one\n• two\n"
    );
    assert!(preview.spans().contains(&(
        "italic".to_string(),
        SpanStyle::block(BlockStyle::Paragraph).with_inline(InlineStyle::ITALIC)
    )));
    assert!(!preview.is_editable());
    drop(preview);

    assert_eq!(
        host.events.borrow().last(),
        Some(&PreviewEvent::PreviewRendered {
            identity: Some("notes.md".into()),
            blocks: 5,
        })
    );
}

#[test]
fn test_burst_of_changes_renders_once_with_final_text() {
    let host = host();
    host.switch("a.md");
    let before = host.renders();

    for ch in ["a", "b", "c"] {
        host.type_text("a.md", ch);
        host.clock.advance(Duration::from_millis(10));
        assert_eq!(host.session.tick(), None);
    }
    host.settle();
    host.settle();

    assert_eq!(host.renders() - before, 1);
    assert_eq!(host.preview.borrow().plain_text(), "abc\n");
}

#[test]
fn test_switching_documents_repaints_from_cache() {
    let host = host();
    host.switch("x.md");
    host.replace_all("x.md", "# X");
    host.settle();

    host.switch("y.md");
    assert_eq!(host.preview.borrow().plain_text(), "No content\n");
    host.replace_all("y.md", "# Y");
    host.settle();
    assert_eq!(host.preview.borrow().plain_text(), "Y\n");

    host.switch("x.md");
    assert_eq!(host.preview.borrow().plain_text(), "X\n");
    host.switch("y.md");
    assert_eq!(host.preview.borrow().plain_text(), "Y\n");

    assert_eq!(
        host.statuses(),
        vec!["Editing x.md", "Editing y.md", "Editing x.md", "Editing y.md"]
    );
}

#[test]
fn test_switch_cancels_pending_render_of_previous_document() {
    let host = host();
    host.switch("x.md");
    host.replace_all("x.md", "x body");
    host.switch("y.md");
    assert!(!host.session.is_pending());
    host.settle();
    assert_eq!(host.preview.borrow().plain_text(), "No content\n");

    host.switch("x.md");
    assert_eq!(host.preview.borrow().plain_text(), "x body\n");
}

#[test]
fn test_rendering_same_content_is_idempotent() {
    let host = host();
    host.switch("a.md");
    host.replace_all("a.md", "> quote\n\n```\ncode\n```\n---\n1. item");
    host.settle();
    let first = host.preview.borrow().spans().to_vec();

    host.switch("a.md");
    assert_eq!(host.preview.borrow().spans(), first.as_slice());
}

#[test]
fn test_formatting_action_flows_to_preview() {
    let host = host();
    host.switch("a.md");
    host.type_text("a.md", "make this loud");
    host.editor.borrow_mut().select(5, 9);
    FormatAction::Strong
        .apply(&mut host.editor.borrow_mut())
        .unwrap();
    host.publish_changes("a.md");
    host.settle();

    assert!(host.preview.borrow().spans().contains(&(
        "this".to_string(),
        SpanStyle::block(BlockStyle::Paragraph).with_inline(InlineStyle::BOLD)
    )));
    let cursor = host.editor.borrow().cursor_event();
    assert_eq!(cursor, PreviewEvent::CursorMoved { line: 1, column: 14 });
}

#[test]
fn test_scroll_mirrors_once_content_has_rendered() {
    let host = host();
    host.switch("a.md");
    host.bus.publish(PreviewEvent::ScrollMoved {
        source: Pane::Editor,
        fraction: 0.5,
    });
    // Nothing rendered yet, so nothing is mirrored.
    assert_eq!(host.preview.borrow().scroll_fraction(), 0.0);

    host.replace_all("a.md", "text");
    host.settle();
    host.bus.publish(PreviewEvent::ScrollMoved {
        source: Pane::Editor,
        fraction: 0.5,
    });
    assert_eq!(host.preview.borrow().scroll_fraction(), 0.5);

    host.bus.publish(PreviewEvent::ScrollMoved {
        source: Pane::Preview,
        fraction: 0.25,
    });
    assert_eq!(host.editor.borrow().scroll_fraction(), 0.25);
}

#[test]
fn test_rerender_keeps_preview_scroll_position() {
    let host = host();
    host.switch("a.md");
    host.replace_all("a.md", "one");
    host.settle();
    host.preview.borrow_mut().scroll_to(0.8);

    host.replace_all("a.md", "one two");
    host.settle();
    assert_eq!(host.preview.borrow().scroll_fraction(), 0.8);
}

/// Preview surface that reports its own scroll moves on the bus, like a
/// widget's scroll callback would.
struct EchoingSurface {
    inner: BufferSurface,
    bus: Rc<EventBus>,
    echoes: Rc<RefCell<usize>>,
}

impl Scrollable for EchoingSurface {
    fn scroll_fraction(&self) -> f64 {
        self.inner.scroll_fraction()
    }

    fn scroll_to(&mut self, fraction: f64) {
        self.inner.scroll_to(fraction);
        *self.echoes.borrow_mut() += 1;
        self.bus.publish(PreviewEvent::ScrollMoved {
            source: Pane::Preview,
            fraction,
        });
    }
}

impl PresentationSurface for EchoingSurface {
    fn set_editable(&mut self, editable: bool) {
        self.inner.set_editable(editable)
    }

    fn is_editable(&self) -> bool {
        self.inner.is_editable()
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.inner.clear()
    }

    fn append(&mut self, text: &str, style: SpanStyle) -> Result<(), SurfaceError> {
        if text == "boom" {
            return Err(SurfaceError::Backend("widget refused text".into()));
        }
        self.inner.append(text, style)
    }
}

fn echoing_host() -> (Host<EchoingSurface>, Rc<RefCell<usize>>) {
    let bus = Rc::new(EventBus::new());
    let echoes = Rc::new(RefCell::new(0));
    let surface = EchoingSurface {
        inner: BufferSurface::new(),
        bus: bus.clone(),
        echoes: echoes.clone(),
    };
    (Host::with_surface(bus, surface), echoes)
}

#[test]
fn test_scroll_echo_does_not_loop() {
    let (host, echoes) = echoing_host();
    host.switch("a.md");
    host.replace_all("a.md", "text");
    host.settle();
    let echoes_before = *echoes.borrow();

    host.editor.borrow_mut().scroll_to(0.1);
    host.bus.publish(PreviewEvent::ScrollMoved {
        source: Pane::Editor,
        fraction: 0.6,
    });

    // The preview moved exactly once and its echo did not travel back.
    assert_eq!(*echoes.borrow() - echoes_before, 1);
    assert_eq!(host.preview.borrow().scroll_fraction(), 0.6);
    assert_eq!(host.editor.borrow().scroll_fraction(), 0.1);
    assert!(!host.session.scroll().is_syncing());
}

#[test]
fn test_render_error_is_shown_and_reported() {
    let (host, _) = echoing_host();
    host.switch("a.md");
    host.replace_all("a.md", "this goes **boom**");
    host.settle();

    let text = host.preview.borrow().inner.plain_text();
    assert!(text.starts_with("Render error: "), "{text}");
    assert!(text.contains("widget refused text"), "{text}");
    assert!(
        host.statuses()
            .iter()
            .any(|m| m.starts_with("Render error: "))
    );

    // The session keeps working afterwards.
    host.replace_all("a.md", "calm again");
    host.settle();
    assert_eq!(host.preview.borrow().inner.plain_text(), "calm again\n");
    let last = host.events.borrow().last().cloned();
    assert!(matches!(
        last,
        Some(PreviewEvent::PreviewRendered { blocks: 1, .. })
    ));
}

#[test]
fn test_closing_and_renaming_documents() {
    let host = host();
    host.switch("Untitled 1");
    host.replace_all("Untitled 1", "draft");
    host.settle();

    host.bus.publish(PreviewEvent::DocumentRenamed {
        from: "Untitled 1".into(),
        to: "notes.md".into(),
    });
    host.switch("other.md");
    host.switch("notes.md");
    assert_eq!(host.preview.borrow().plain_text(), "draft\n");

    host.bus.publish(PreviewEvent::DocumentClosed {
        identity: "notes.md".into(),
    });
    assert_eq!(host.session.active(), None);
    assert_eq!(host.preview.borrow().plain_text(), "No content\n");
    let outcome = host.session.flush().unwrap();
    assert_eq!(outcome.kind, RenderKind::Placeholder);
}
