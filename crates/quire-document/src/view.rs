//! The presentation boundary: one view showing one document at a time.
//!
//! A new document replaces the current one only once it has been built
//! successfully. A failed load leaves the view exactly as it was, so the
//! caller can report the error over a still-valid page.

use quire_cells::{LinkInfo, RenderContext, RenderingInfo, Selection, Surface};
use quire_common::location::{Location, resolve_location};
use quire_common::warning::{restore_warnings, take_warnings};

use crate::document::Document;
use crate::error::DocumentError;
use crate::forms::{FormError, Submission};
use crate::resource::ResourceOpener;

/// A scrollable view onto a [`Document`].
pub struct DocumentView {
    ctx: RenderContext,
    opener: Box<dyn ResourceOpener>,
    document: Option<Document>,
    width: i32,
    scroll: i32,
    selection: Option<Selection>,
    /// Nesting depth of [`DocumentView::freeze`].
    draw_lock: u32,
    layout_pending: bool,
}

impl std::fmt::Debug for DocumentView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentView")
            .field("location", &self.location())
            .field("width", &self.width)
            .field("scroll", &self.scroll)
            .field("draw_lock", &self.draw_lock)
            .field("layout_pending", &self.layout_pending)
            .finish_non_exhaustive()
    }
}

impl DocumentView {
    /// An empty view `width` pixels wide.
    #[must_use]
    pub fn new(ctx: RenderContext, opener: Box<dyn ResourceOpener>, width: i32) -> Self {
        Self {
            ctx,
            opener,
            document: None,
            width,
            scroll: 0,
            selection: None,
            draw_lock: 0,
            layout_pending: false,
        }
    }

    /// Show the document built from `markup`.
    ///
    /// # Errors
    ///
    /// Returns the parse error. The previous document stays in place.
    pub fn set_markup(&mut self, markup: &[u8], location: Option<&str>) -> Result<(), DocumentError> {
        // The new document reports its own warnings afresh; a failed parse
        // leaves the dedup set of the document still shown.
        let previous = take_warnings();
        let document =
            match Document::from_markup(markup, &mut self.ctx, self.opener.as_ref(), location) {
                Ok(document) => document,
                Err(e) => {
                    log::debug!(target: "quire.document", "keeping previous document: {e}");
                    restore_warnings(previous);
                    return Err(e);
                }
            };
        self.document = Some(document);
        self.scroll = 0;
        self.selection = None;
        self.request_layout();
        Ok(())
    }

    /// Load `location`, resolved against the current document, and scroll
    /// to its `#fragment` if it has one. A bare `#fragment` only scrolls.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the opener cannot supply the document and a
    /// parse error if it is malformed. Either way the current document is
    /// kept.
    pub fn open(&mut self, location: &str) -> Result<(), DocumentError> {
        let target = Location::parse(location);
        if !target.is_same_document() {
            let path = resolve_location(&target.path, self.location());
            let bytes = self
                .opener
                .open(&path)
                .map_err(|source| DocumentError::Io {
                    location: path.clone(),
                    source,
                })?;
            self.set_markup(&bytes, Some(&path))?;
        }
        if let Some(fragment) = &target.fragment {
            let _ = self.scroll_to_anchor(fragment);
        }
        Ok(())
    }

    /// Follow the link under a point in view coordinates, if there is one.
    ///
    /// # Errors
    ///
    /// Returns the error of loading the link target.
    pub fn follow_link(&mut self, x: i32, y: i32) -> Result<bool, DocumentError> {
        let Some(href) = self.link_at(x, y).map(|link| link.href.clone()) else {
            return Ok(false);
        };
        self.open(&href)?;
        Ok(true)
    }

    /// The link under a point in view coordinates.
    #[must_use]
    pub fn link_at(&self, x: i32, y: i32) -> Option<&LinkInfo> {
        self.document.as_ref()?.link_at(x, y + self.scroll)
    }

    /// Change the view width. The document is laid out again unless the
    /// view is frozen.
    pub fn resize(&mut self, width: i32) {
        if width != self.width {
            self.width = width;
            self.request_layout();
        }
    }

    /// Suppress relayouts until the matching [`DocumentView::thaw`].
    /// Calls nest.
    pub const fn freeze(&mut self) {
        self.draw_lock += 1;
    }

    /// Undo one [`DocumentView::freeze`]. Leaving the outermost freeze
    /// performs the relayout requested in the meantime.
    pub fn thaw(&mut self) {
        self.draw_lock = self.draw_lock.saturating_sub(1);
        if self.draw_lock == 0 && self.layout_pending {
            self.relayout();
        }
    }

    /// Whether a freeze is in effect.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.draw_lock > 0
    }

    /// Whether a relayout is waiting for the view to thaw.
    #[must_use]
    pub const fn is_layout_pending(&self) -> bool {
        self.layout_pending
    }

    fn request_layout(&mut self) {
        self.layout_pending = true;
        if !self.is_frozen() {
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        self.layout_pending = false;
        if let Some(document) = &mut self.document {
            document.layout(self.width);
        }
        self.clamp_scroll();
    }

    /// Scroll so that `y` (document coordinates) is at the top.
    pub fn scroll_to(&mut self, y: i32) {
        self.scroll = y;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let height = self.document.as_ref().map_or(0, Document::height);
        self.scroll = self.scroll.clamp(0, height.max(0));
    }

    /// Scroll to the anchor `name`. Returns `false` if there is none.
    pub fn scroll_to_anchor(&mut self, name: &str) -> bool {
        let Some((_, y)) = self
            .document
            .as_ref()
            .and_then(|document| document.anchor_position(name))
        else {
            log::debug!(target: "quire.document", "no anchor named '{name}'");
            return false;
        };
        self.scroll_to(y);
        true
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn scroll_position(&self) -> i32 {
        self.scroll
    }

    /// Paint the visible `height` pixels of the document.
    pub fn render(&self, surface: &mut dyn Surface, height: i32) {
        let Some(document) = &self.document else {
            return;
        };
        let mut info = RenderingInfo::new(&self.ctx.config);
        info.selection = self.selection;
        document.draw(&self.ctx, surface, (0, -self.scroll), &(0..height), &mut info);
    }

    /// Set or clear the selection.
    pub const fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// The selected text, empty without a selection.
    #[must_use]
    pub fn selection_text(&self) -> String {
        match (&self.document, &self.selection) {
            (Some(document), Some(selection)) => document.selection_text(selection),
            _ => String::new(),
        }
    }

    /// Choose an option of a form element.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] if there is no document or no such option.
    pub fn select(&mut self, form: usize, element: usize, index: usize) -> Result<(), FormError> {
        self.document
            .as_mut()
            .ok_or(FormError::UnknownForm(form))?
            .select(form, element, index)
    }

    /// The request for submitting `form`, with its action resolved against
    /// the current location.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownForm`] if there is no such form.
    pub fn submit(&self, form: usize, submitter: Option<usize>) -> Result<Submission, FormError> {
        let document = self.document.as_ref().ok_or(FormError::UnknownForm(form))?;
        let mut submission = document.submit(form, submitter)?;
        submission.url = resolve_location(&submission.url, document.location());
        Ok(submission)
    }

    /// The current document.
    #[must_use]
    pub const fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// The title of the current document.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.document.as_ref()?.title()
    }

    /// Location of the current document.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.document.as_ref()?.location()
    }

    /// The rendering context documents are built and drawn with.
    #[must_use]
    pub const fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// View width.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }
}
