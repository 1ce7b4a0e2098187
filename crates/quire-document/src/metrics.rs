//! System fonts and text measurement backed by fontdue.
//!
//! The measurer and the rasterizer share one [`FontSet`], so that words are
//! laid out with the same advances they are drawn with.

use std::sync::Arc;

use fontdue::{Font, FontSettings};
use quire_cells::{FontSpec, TextExtent, TextMeasurer};
use quire_common::warning::warn_once;

/// Common system font paths to search for a default (regular) font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// System font paths for bold variants.
const FONT_BOLD_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// System font paths for italic variants.
const FONT_ITALIC_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
    "/Library/Fonts/Arial Italic.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansOblique.ttf",
    "C:\\Windows\\Fonts\\ariali.ttf",
];

/// System font paths for bold-italic variants.
const FONT_BOLD_ITALIC_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold Italic.ttf",
    "/Library/Fonts/Arial Bold Italic.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-BoldItalic.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBoldOblique.ttf",
    "C:\\Windows\\Fonts\\arialbi.ttf",
];

/// System font paths for fixed-pitch text.
const FONT_FIXED_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Menlo.ttc",
    "/Library/Fonts/Courier New.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// The font files available for rendering. Missing variants fall back to
/// the regular face.
#[derive(Default)]
pub struct FontSet {
    regular: Option<Font>,
    bold: Option<Font>,
    italic: Option<Font>,
    bold_italic: Option<Font>,
    fixed: Option<Font>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("regular", &self.regular.is_some())
            .field("bold", &self.bold.is_some())
            .field("italic", &self.italic.is_some())
            .field("bold_italic", &self.bold_italic.is_some())
            .field("fixed", &self.fixed.is_some())
            .finish()
    }
}

impl FontSet {
    /// Search the usual system locations.
    #[must_use]
    pub fn load_system() -> Self {
        let set = Self {
            regular: load_font_from_paths(FONT_SEARCH_PATHS, "regular"),
            bold: load_font_from_paths(FONT_BOLD_SEARCH_PATHS, "bold"),
            italic: load_font_from_paths(FONT_ITALIC_SEARCH_PATHS, "italic"),
            bold_italic: load_font_from_paths(FONT_BOLD_ITALIC_SEARCH_PATHS, "bold-italic"),
            fixed: load_font_from_paths(FONT_FIXED_SEARCH_PATHS, "fixed"),
        };
        if set.regular.is_none() {
            let _ = warn_once("fonts", "no system font found, text will not be rendered");
        }
        set
    }

    /// A set with a single face used for every variant.
    ///
    /// # Errors
    ///
    /// Returns fontdue's message if `bytes` is not a usable font.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, &'static str> {
        let font = Font::from_bytes(bytes, FontSettings::default())?;
        Ok(Self {
            regular: Some(font),
            ..Self::default()
        })
    }

    /// Whether any face is available.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.regular.is_none()
    }

    /// The best available face for `spec`, falling back through partial
    /// matches to the regular face.
    #[must_use]
    pub fn select(&self, spec: &FontSpec) -> Option<&Font> {
        let regular = self.regular.as_ref();
        if spec.fixed {
            return self.fixed.as_ref().or(regular);
        }
        match (spec.bold, spec.italic) {
            (true, true) => self
                .bold_italic
                .as_ref()
                .or(self.bold.as_ref())
                .or(regular),
            (true, false) => self.bold.as_ref().or(regular),
            (false, true) => self.italic.as_ref().or(regular),
            (false, false) => regular,
        }
    }
}

fn load_font_from_paths(paths: &[&str], label: &str) -> Option<Font> {
    for path in paths {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = Font::from_bytes(data, FontSettings::default())
        {
            log::debug!(target: "quire.document", "loaded {label} font: {path}");
            return Some(font);
        }
    }
    None
}

/// Vertical metrics of `font` at `size`: line height and descent. Fonts
/// without a horizontal metrics table use 1.2x and 0.25x the size.
#[must_use]
pub fn line_metrics(font: Option<&Font>, size: f32) -> (i32, i32) {
    match font.and_then(|font| font.horizontal_line_metrics(size)) {
        Some(metrics) => (
            metrics.new_line_size.round() as i32,
            (-metrics.descent).round() as i32,
        ),
        None => ((size * 1.2).round() as i32, (size * 0.25).round() as i32),
    }
}

/// Measures text with the per-glyph advances of real fonts.
#[derive(Debug, Clone)]
pub struct FontdueMeasurer {
    fonts: Arc<FontSet>,
}

impl FontdueMeasurer {
    /// Measure with the faces of `fonts`.
    #[must_use]
    pub const fn new(fonts: Arc<FontSet>) -> Self {
        Self { fonts }
    }
}

impl TextMeasurer for FontdueMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        let face = self.fonts.select(font);
        let width: f32 = face.map_or(0.0, |face| {
            // Font::metrics avoids rasterizing when only advances are needed.
            text.chars()
                .filter(|ch| !ch.is_control())
                .map(|ch| face.metrics(ch, font.size).advance_width)
                .sum()
        });
        let (height, descent) = line_metrics(face, font.size);
        TextExtent {
            width: width.round() as i32,
            height,
            descent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(bold: bool, fixed: bool) -> FontSpec {
        FontSpec {
            size: 10.0,
            bold,
            italic: false,
            underline: false,
            fixed,
            face: None,
        }
    }

    #[test]
    fn test_empty_set_measures_zero_width() {
        let measurer = FontdueMeasurer::new(Arc::new(FontSet::default()));
        let extent = measurer.measure("hello", &spec(false, false));
        assert_eq!(extent, TextExtent { width: 0, height: 12, descent: 3 });
    }

    #[test]
    fn test_select_without_faces() {
        let set = FontSet::default();
        assert!(set.is_empty());
        assert!(set.select(&spec(true, false)).is_none());
        assert!(set.select(&spec(false, true)).is_none());
    }

    #[test]
    fn test_invalid_font_bytes_are_rejected() {
        assert!(FontSet::from_bytes(b"not a font".to_vec()).is_err());
    }
}
