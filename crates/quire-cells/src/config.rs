//! Rendering configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::Color;

/// Tunables shared by the tree builder, layout and painting.
///
/// Every field has a default, so a JSON file only needs to name the values
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pixel size of 100% text.
    pub base_font_size: f32,
    /// Global magnification in percent.
    pub magnification: u32,
    /// Page background.
    pub background: Color,
    /// Default text colour.
    pub text_color: Color,
    /// Default hyperlink colour.
    pub link_color: Color,
    /// Background of selected text.
    pub selection_background: Color,
    /// Foreground of selected text.
    pub selection_foreground: Color,
    /// Vertical space above and below paragraphs, in pixels.
    pub paragraph_spacing: i32,
    /// Indent of definition descriptions and block quotes.
    pub block_indent: i32,
    /// Gap between a list marker and its item.
    pub list_marker_gap: i32,
    /// Default cell spacing of tables.
    pub table_cell_spacing: i32,
    /// Default cell padding of tables.
    pub table_cell_padding: i32,
    /// Size of the placeholder drawn for images that failed to load.
    pub broken_image_size: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_font_size: 14.0,
            magnification: 100,
            background: Color::WHITE,
            text_color: Color::BLACK,
            link_color: Color::LINK_BLUE,
            selection_background: Color::rgb(51, 102, 204),
            selection_foreground: Color::WHITE,
            paragraph_spacing: 8,
            block_indent: 40,
            list_marker_gap: 6,
            table_cell_spacing: 2,
            table_cell_padding: 2,
            broken_image_size: 20,
        }
    }
}

impl RenderConfig {
    /// Parse a (possibly partial) configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error for malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RenderConfig::from_json(r#"{ "magnification": 150 }"#).unwrap();
        assert_eq!(config.magnification, 150);
        assert_eq!(config.base_font_size, 14.0);
        assert_eq!(config.link_color, Color::LINK_BLUE);
    }

    #[test]
    fn test_mistyped_field_is_error() {
        assert!(RenderConfig::from_json(r#"{ "magnification": "big" }"#).is_err());
    }
}
