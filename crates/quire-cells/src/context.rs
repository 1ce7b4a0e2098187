//! The state shared by everything that builds, measures or paints cells.

use crate::config::RenderConfig;
use crate::font::{
    ApproximateMeasurer, FontAttributes, FontCache, FontId, FontSpec, TextExtent, TextMeasurer,
};

/// Font cache, text measurer and configuration for one document.
pub struct RenderContext {
    /// Realized fonts.
    pub fonts: FontCache,
    /// Measurement backend.
    pub measurer: Box<dyn TextMeasurer>,
    /// Configuration.
    pub config: RenderConfig,
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("fonts", &self.fonts.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RenderContext {
    /// Create a context measuring text with `measurer`.
    #[must_use]
    pub fn new(config: RenderConfig, measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            fonts: FontCache::new(config.base_font_size),
            measurer,
            config,
        }
    }

    /// Create a context using [`ApproximateMeasurer`].
    #[must_use]
    pub fn with_approximate_metrics(config: RenderConfig) -> Self {
        Self::new(config, Box::new(ApproximateMeasurer::default()))
    }

    /// Realize `attrs` at the configured magnification.
    pub fn realize(&mut self, attrs: &FontAttributes) -> FontId {
        self.fonts.realize(attrs, self.config.magnification)
    }

    /// Look up a realized font.
    #[must_use]
    pub fn font(&self, id: FontId) -> Option<&FontSpec> {
        self.fonts.get(id)
    }

    /// Measure `text` in a realized font. Unknown fonts measure as empty.
    #[must_use]
    pub fn measure(&self, text: &str, font: FontId) -> TextExtent {
        self.fonts
            .get(font)
            .map(|spec| self.measurer.measure(text, spec))
            .unwrap_or_default()
    }
}
