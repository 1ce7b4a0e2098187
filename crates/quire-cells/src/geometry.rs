//! Geometry primitives: rectangles, lengths, alignment and colour.
//!
//! All layout happens in whole pixels. Lengths given as percentages are
//! resolved against the width of the box that contains them.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Dots per inch used to convert inch-denominated attribute values.
pub const DOTS_PER_INCH: f32 = 72.0;

/// Largest magnitude of a parsed pixel length. Larger values are clamped so
/// that sums of indents, spacing and widths stay well inside `i32`.
pub const MAX_LENGTH: i32 = 100_000;

/// Largest magnitude of a parsed percentage.
pub const MAX_PERCENT: i32 = 1000;

/// A rectangle with its origin relative to the parent cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    /// X coordinate of the left edge.
    pub x: i32,
    /// Y coordinate of the top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// X coordinate of the right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Y coordinate of the bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether the point lies inside this rectangle.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// The same rectangle moved by `(dx, dy)`.
    #[must_use]
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A length that is either absolute or relative to the containing width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Length {
    /// Absolute pixels. A negative width means "parent width minus N".
    Pixels(i32),
    /// Percentage of the containing width.
    Percent(i32),
}

impl Default for Length {
    fn default() -> Self {
        Self::Pixels(0)
    }
}

impl Length {
    /// The full containing width.
    pub const FULL: Self = Self::Percent(100);

    /// Parse an attribute value: `50%`, `120`, `120px` or `0.5in`.
    ///
    /// Pixel values are clamped to [`MAX_LENGTH`] and percentages to
    /// [`MAX_PERCENT`] either way.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(percent) = value.strip_suffix('%') {
            let percent: i64 = percent.trim().parse().ok()?;
            return Some(Self::Percent(clamp_to(percent, MAX_PERCENT)));
        }
        if let Some(inches) = value.strip_suffix("in") {
            let inches: f32 = inches.trim().parse().ok()?;
            if !inches.is_finite() {
                return None;
            }
            let pixels = (inches * DOTS_PER_INCH).round() as i64;
            return Some(Self::Pixels(clamp_to(pixels, MAX_LENGTH)));
        }
        let pixels: i64 = value.strip_suffix("px").unwrap_or(value).trim().parse().ok()?;
        Some(Self::Pixels(clamp_to(pixels, MAX_LENGTH)))
    }

    /// Resolve against the containing width. Negative pixel values count back
    /// from the containing width.
    #[must_use]
    pub const fn resolve_width(self, base: i32) -> i32 {
        match self {
            Self::Pixels(px) if px < 0 => base.saturating_add(px),
            Self::Pixels(px) => px,
            Self::Percent(percent) => percent_of(base, percent),
        }
    }

    /// Resolve an offset (indent) against the containing width.
    #[must_use]
    pub const fn resolve(self, base: i32) -> i32 {
        match self {
            Self::Pixels(px) => px,
            Self::Percent(percent) => percent_of(base, percent),
        }
    }

    /// Returns `true` for percentage lengths.
    #[must_use]
    pub const fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

/// `base * percent / 100` without intermediate overflow, saturating at the
/// bounds of `i32`.
#[must_use]
pub const fn percent_of(base: i32, percent: i32) -> i32 {
    let value = base as i64 * percent as i64 / 100;
    if value > i32::MAX as i64 {
        i32::MAX
    } else if value < i32::MIN as i64 {
        i32::MIN
    } else {
        value as i32
    }
}

fn clamp_to(value: i64, limit: i32) -> i32 {
    value.clamp(-i64::from(limit), i64::from(limit)) as i32
}

/// Indentation on the four sides of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Indents {
    /// Left indent.
    pub left: Length,
    /// Right indent.
    pub right: Length,
    /// Top indent.
    pub top: Length,
    /// Bottom indent.
    pub bottom: Length,
}

impl Indents {
    /// The same pixel indent on all four sides.
    #[must_use]
    pub const fn uniform(px: i32) -> Self {
        Self {
            left: Length::Pixels(px),
            right: Length::Pixels(px),
            top: Length::Pixels(px),
            bottom: Length::Pixels(px),
        }
    }
}

/// Horizontal alignment of the lines in a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum HAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    #[strum(to_string = "center", serialize = "centre", serialize = "middle")]
    Center,
    /// Flush right.
    Right,
    /// Both edges flush; the last line is flush left.
    Justify,
}

/// Vertical alignment of content inside a container taller than it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum VAlign {
    /// Content at the top.
    #[default]
    Top,
    /// Content centred.
    #[strum(to_string = "center", serialize = "middle")]
    Center,
    /// Content at the bottom.
    Bottom,
}

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Black (#000000).
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// White (#ffffff).
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Default hyperlink blue (#0000ff).
    pub const LINK_BLUE: Self = Self::rgb(0, 0, 255);
    /// Light grey used for raised borders.
    pub const LIGHT_GREY: Self = Self::rgb(224, 224, 224);
    /// Dark grey used for sunken borders and placeholders.
    pub const DARK_GREY: Self = Self::rgb(128, 128, 128);

    /// Create a colour from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (the `#` is optional).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            // The three-digit form replicates each digit.
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// The sixteen basic colour names.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "aqua" | "cyan" => Self::rgb(0, 255, 255),
            "fuchsia" | "magenta" => Self::rgb(255, 0, 255),
            "lime" => Self::rgb(0, 255, 0),
            "maroon" => Self::rgb(128, 0, 0),
            "navy" => Self::rgb(0, 0, 128),
            "olive" => Self::rgb(128, 128, 0),
            "purple" => Self::rgb(128, 0, 128),
            "silver" => Self::rgb(192, 192, 192),
            "teal" => Self::rgb(0, 128, 128),
            _ => return None,
        };
        Some(color)
    }

    /// Parse an attribute value: a colour name or hex notation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::from_named(value).or_else(|| Self::from_hex(value))
    }

    /// `#rrggbb` notation.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_parse() {
        assert_eq!(Length::parse("50%"), Some(Length::Percent(50)));
        assert_eq!(Length::parse(" 120 "), Some(Length::Pixels(120)));
        assert_eq!(Length::parse("12px"), Some(Length::Pixels(12)));
        assert_eq!(Length::parse("0.5in"), Some(Length::Pixels(36)));
        assert_eq!(Length::parse("-20"), Some(Length::Pixels(-20)));
        assert_eq!(Length::parse("wide"), None);
    }

    #[test]
    fn test_length_parse_clamps_absurd_values() {
        assert_eq!(
            Length::parse("2000000000"),
            Some(Length::Pixels(MAX_LENGTH))
        );
        assert_eq!(
            Length::parse("-9000000000px"),
            Some(Length::Pixels(-MAX_LENGTH))
        );
        assert_eq!(
            Length::parse("1e30in"),
            Some(Length::Pixels(MAX_LENGTH))
        );
        assert_eq!(
            Length::parse("5000000%"),
            Some(Length::Percent(MAX_PERCENT))
        );
        assert_eq!(Length::parse("NaNin"), None);
    }

    #[test]
    fn test_percent_of_saturates() {
        assert_eq!(percent_of(i32::MAX, 1000), i32::MAX);
        assert_eq!(percent_of(i32::MAX, -1000), i32::MIN);
        assert_eq!(Length::Pixels(i32::MIN).resolve_width(-10), i32::MIN);
    }

    #[test]
    fn test_length_resolution() {
        assert_eq!(Length::Percent(50).resolve_width(300), 150);
        assert_eq!(Length::Pixels(-20).resolve_width(300), 280);
        assert_eq!(Length::Pixels(-20).resolve(300), -20);
        assert_eq!(Length::Pixels(40).resolve_width(300), 40);
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!("CENTER".parse::<HAlign>(), Ok(HAlign::Center));
        assert_eq!("justify".parse::<HAlign>(), Ok(HAlign::Justify));
        assert_eq!("middle".parse::<VAlign>(), Ok(VAlign::Center));
        assert!("sideways".parse::<HAlign>().is_err());
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#00ff7f"), Some(Color::rgb(0, 255, 127)));
        assert_eq!(Color::parse("Navy"), Some(Color::rgb(0, 0, 128)));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::rgb(1, 2, 255).to_hex_string(), "#0102ff");
    }
}
