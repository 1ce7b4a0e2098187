//! A parsed document: its cell tree plus everything the markup declared
//! alongside it.

use std::ops::Range;

use quire_cells::{
    CellDump, CellId, CellTree, Color, FindCondition, LinkInfo, Rect, RenderConfig, RenderContext,
    RenderingInfo, Selection, Surface,
};

use crate::builder::{BuiltDocument, build_document, sync_widgets};
use crate::error::DocumentError;
use crate::forms::{FormError, FormSet, Submission};
use crate::images::ImageStore;
use crate::resource::ResourceOpener;

/// A laid-out (or layable) document.
#[derive(Debug)]
pub struct Document {
    tree: CellTree,
    root: CellId,
    title: Option<String>,
    forms: FormSet,
    images: ImageStore,
    location: Option<String>,
    width: Option<i32>,
}

impl Document {
    /// Parse markup and build its cell tree. `location` is where the markup
    /// came from; relative sources resolve against it.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the markup is malformed or uses markup
    /// the builder rejects. Nothing is built in that case.
    pub fn from_markup(
        markup: &[u8],
        ctx: &mut RenderContext,
        opener: &dyn ResourceOpener,
        location: Option<&str>,
    ) -> Result<Self, DocumentError> {
        let built = build_document(markup, ctx, opener, location)?;
        log::debug!(
            target: "quire.document",
            "built {} cells from {} bytes",
            built.tree.len(),
            markup.len()
        );
        Ok(Self::from_built(built, location.map(str::to_string)))
    }

    /// Wrap the output of the tree builder.
    #[must_use]
    pub fn from_built(built: BuiltDocument, location: Option<String>) -> Self {
        let BuiltDocument {
            tree,
            root,
            title,
            forms,
            images,
        } = built;
        Self {
            tree,
            root,
            title,
            forms,
            images,
            location,
            width: None,
        }
    }

    /// Position every cell for a view `width` pixels wide. Repeating the
    /// last width is a no-op.
    pub fn layout(&mut self, width: i32) {
        if self.width == Some(width) {
            return;
        }
        self.tree.layout(self.root, width);
        self.width = Some(width);
        log::debug!(
            target: "quire.document",
            "laid out at width {width}, height {}",
            self.height()
        );
    }

    /// Width of the last layout, if any.
    #[must_use]
    pub const fn layout_width(&self) -> Option<i32> {
        self.width
    }

    /// Total height of the laid-out document.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.tree[self.root].rect.height
    }

    /// The page colour: `<body bgcolor>` or the configured default.
    #[must_use]
    pub fn background(&self, config: &RenderConfig) -> Color {
        self.tree
            .container(self.root)
            .and_then(|data| data.background)
            .unwrap_or(config.background)
    }

    /// Paint the part of the document inside the vertical range `view`
    /// (surface coordinates) with the document's top-left corner at
    /// `origin`.
    pub fn draw(
        &self,
        ctx: &RenderContext,
        surface: &mut dyn Surface,
        origin: (i32, i32),
        view: &Range<i32>,
        info: &mut RenderingInfo,
    ) {
        let width = self.width.unwrap_or_default();
        surface.fill_rect(
            Rect::new(origin.0, view.start, width, view.end - view.start),
            self.background(&ctx.config),
        );
        self.tree.draw(self.root, ctx, surface, origin, view, info);
    }

    /// The link under a point in document coordinates.
    #[must_use]
    pub fn link_at(&self, x: i32, y: i32) -> Option<&LinkInfo> {
        self.tree.link_at(self.root, x, y)
    }

    /// Document coordinates of the anchor `<a name>`.
    #[must_use]
    pub fn anchor_position(&self, name: &str) -> Option<(i32, i32)> {
        self.tree
            .find(self.root, FindCondition::Anchor(name))
            .map(|id| self.tree.absolute_position(id))
    }

    /// The whole document as plain text.
    #[must_use]
    pub fn text(&self) -> String {
        self.tree.document_text(self.root)
    }

    /// The selected part of the document as plain text.
    #[must_use]
    pub fn selection_text(&self, selection: &Selection) -> String {
        self.tree.selection_text(selection)
    }

    /// Offsets at which to cut the document into pages.
    #[must_use]
    pub fn page_breaks(&self, page_height: i32) -> Vec<i32> {
        self.tree.page_breaks(self.root, page_height)
    }

    /// A serializable snapshot of the cell tree.
    #[must_use]
    pub fn dump(&self) -> Option<CellDump> {
        self.tree.dump(self.root)
    }

    /// The document's title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Where the document was loaded from.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The forms of the document.
    #[must_use]
    pub const fn forms(&self) -> &FormSet {
        &self.forms
    }

    /// The decoded images of the document.
    #[must_use]
    pub const fn images(&self) -> &ImageStore {
        &self.images
    }

    /// The cell tree.
    #[must_use]
    pub const fn tree(&self) -> &CellTree {
        &self.tree
    }

    /// The root container.
    #[must_use]
    pub const fn root(&self) -> CellId {
        self.root
    }

    /// Choose option `index` of a radio group or drop-down and update its
    /// widgets.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] if the form, element or option does not exist.
    pub fn select(&mut self, form: usize, element: usize, index: usize) -> Result<(), FormError> {
        self.forms.select(form, element, index)?;
        sync_widgets(&mut self.tree, &self.forms);
        Ok(())
    }

    /// The request produced by submitting `form` through the submit
    /// button `submitter`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownForm`] if the form does not exist.
    pub fn submit(&self, form: usize, submitter: Option<usize>) -> Result<Submission, FormError> {
        self.forms
            .get(form)
            .map(|f| f.submission(submitter))
            .ok_or(FormError::UnknownForm(form))
    }
}
