//! Fonts: the attributes a document asks for, the realized fonts the
//! renderer draws with, and the metrics interface used to measure words.

use std::collections::HashMap;

use serde::Serialize;

use crate::geometry::Color;

/// Scale applied to the font size of sub- and superscript text.
pub const SCRIPT_SCALE_PERCENT: u32 = 70;

/// Vertical placement of a run of text relative to the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ScriptMode {
    /// On the baseline.
    #[default]
    Normal,
    /// Raised above the baseline.
    Superscript,
    /// Lowered below the baseline.
    Subscript,
}

/// The font state requested by the markup at some point in the document.
///
/// Two attribute sets with the same [`key`](Self::key) realize to the same
/// font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAttributes {
    /// Bold weight.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
    /// Underlined.
    pub underline: bool,
    /// Fixed-pitch face.
    pub fixed: bool,
    /// Render lowercase letters as reduced capitals.
    pub small_caps: bool,
    /// Size as a percentage of the base font size.
    pub size_percent: u32,
    /// Explicit face name, if any.
    pub face: Option<String>,
    /// Foreground colour.
    pub color: Color,
    /// Script placement.
    pub script: ScriptMode,
    /// Accumulated baseline shift in pixels. Positive values lower the text.
    pub script_baseline: i32,
}

impl Default for FontAttributes {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            fixed: false,
            small_caps: false,
            size_percent: 100,
            face: None,
            color: Color::BLACK,
            script: ScriptMode::Normal,
            script_baseline: 0,
        }
    }
}

impl FontAttributes {
    /// Canonical cache key. Colour and script shift are not part of the
    /// font itself.
    #[must_use]
    pub fn key(&self) -> String {
        format!(
            "{}{}{}{}-{}-{}",
            u8::from(self.bold),
            u8::from(self.italic),
            u8::from(self.underline),
            u8::from(self.fixed),
            self.size_percent,
            self.face.as_deref().unwrap_or_default(),
        )
    }
}

/// Handle to a realized font in a [`FontCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FontId(pub usize);

/// A realized font: everything a measurer or surface needs to render text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    /// Pixel size.
    pub size: f32,
    /// Bold weight.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
    /// Underlined.
    pub underline: bool,
    /// Fixed-pitch face.
    pub fixed: bool,
    /// Explicit face name.
    pub face: Option<String>,
}

/// Cache of realized fonts keyed by canonical attribute key and
/// magnification.
#[derive(Debug, Clone)]
pub struct FontCache {
    base_size: f32,
    by_key: HashMap<String, FontId>,
    fonts: Vec<FontSpec>,
}

impl FontCache {
    /// Create an empty cache. `base_size` is the pixel size of 100% text.
    #[must_use]
    pub fn new(base_size: f32) -> Self {
        Self {
            base_size,
            by_key: HashMap::new(),
            fonts: Vec::new(),
        }
    }

    /// Realize `attrs` at `magnification` percent, reusing a cached font
    /// when one with the same key exists.
    pub fn realize(&mut self, attrs: &FontAttributes, magnification: u32) -> FontId {
        let key = format!("{}@{magnification}", attrs.key());
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let size = self.base_size * attrs.size_percent as f32 / 100.0 * magnification as f32
            / 100.0;
        let id = FontId(self.fonts.len());
        self.fonts.push(FontSpec {
            size: size.max(1.0),
            bold: attrs.bold,
            italic: attrs.italic,
            underline: attrs.underline,
            fixed: attrs.fixed,
            face: attrs.face.clone(),
        });
        let _ = self.by_key.insert(key, id);
        log::trace!(target: "quire.layout", "realized font {id:?} at {size}px");
        id
    }

    /// Look up a realized font.
    #[must_use]
    pub fn get(&self, id: FontId) -> Option<&FontSpec> {
        self.fonts.get(id.0)
    }

    /// Number of distinct fonts realized so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Returns `true` if nothing has been realized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Pixel size of 100% text.
    #[must_use]
    pub const fn base_size(&self) -> f32 {
        self.base_size
    }
}

/// Measured box of a run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextExtent {
    /// Advance width.
    pub width: i32,
    /// Line height.
    pub height: i32,
    /// Depth below the baseline.
    pub descent: i32,
}

/// Text measurement backend.
///
/// Layout only ever sees whole pixels; implementations round.
pub trait TextMeasurer {
    /// Measure `text` rendered in `font`.
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent;
}

/// Fixed-ratio metrics for when no font file is available.
///
/// Every character advances 0.6× the font size, lines are 1.2× the font
/// size tall and descend 0.25× below the baseline. Deterministic, which makes
/// it the measurer of choice for tests.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateMeasurer {
    /// Advance width per character as a fraction of the font size.
    pub char_width_ratio: f32,
    /// Line height as a fraction of the font size.
    pub line_height_ratio: f32,
    /// Descent as a fraction of the font size.
    pub descent_ratio: f32,
}

impl Default for ApproximateMeasurer {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
            line_height_ratio: 1.2,
            descent_ratio: 0.25,
        }
    }
}

impl TextMeasurer for ApproximateMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        let chars = text.chars().count() as f32;
        TextExtent {
            width: (chars * font.size * self.char_width_ratio).round() as i32,
            height: (font.size * self.line_height_ratio).round() as i32,
            descent: (font.size * self.descent_ratio).round() as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realize_reuses_equal_keys() {
        let mut cache = FontCache::new(10.0);
        let plain = FontAttributes::default();
        let red = FontAttributes {
            color: Color::rgb(255, 0, 0),
            ..FontAttributes::default()
        };
        let bold = FontAttributes {
            bold: true,
            ..FontAttributes::default()
        };
        let a = cache.realize(&plain, 100);
        assert_eq!(cache.realize(&red, 100), a);
        assert_ne!(cache.realize(&bold, 100), a);
        assert_ne!(cache.realize(&plain, 200), a);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_realized_size_scales() {
        let mut cache = FontCache::new(10.0);
        let big = FontAttributes {
            size_percent: 200,
            ..FontAttributes::default()
        };
        let id = cache.realize(&big, 150);
        assert_eq!(cache.get(id).map(|f| f.size), Some(30.0));
    }

    #[test]
    fn test_approximate_measurer() {
        let font = FontSpec {
            size: 10.0,
            bold: false,
            italic: false,
            underline: false,
            fixed: false,
            face: None,
        };
        let extent = ApproximateMeasurer::default().measure("hello", &font);
        assert_eq!(
            extent,
            TextExtent {
                width: 30,
                height: 12,
                descent: 3
            }
        );
    }
}
