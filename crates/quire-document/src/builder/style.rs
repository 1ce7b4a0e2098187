//! The font attribute frame stack.
//!
//! Every style tag pushes a copy of the current frame with one field changed
//! and its end tag pops exactly one frame. The bottom frame holds the
//! document defaults and is never popped.

use quire_cells::font::SCRIPT_SCALE_PERCENT;
use quire_cells::{Color, FontAttributes, ScriptMode};

use super::Tag;
use crate::error::BuildError;

/// Size percentages of `<font size="1">` through `<font size="7">`.
pub const FONT_SIZES: [u32; 7] = [58, 75, 100, 120, 144, 200, 288];

/// Index into [`FONT_SIZES`] of normal text.
const NORMAL_SIZE_INDEX: i32 = 2;

/// Size of the reduced capitals of small-caps text, in percent.
pub const SMALL_CAPS_PERCENT: u32 = 80;

/// Interpret the `size` attribute of `<font>`: `1`-`7` absolute, `+N`/`-N`
/// relative to normal text. Out-of-range values are clamped.
#[must_use]
pub fn font_size_percent(value: &str) -> Option<u32> {
    let value = value.trim();
    let relative = value.starts_with('+') || value.starts_with('-');
    let number: i32 = value.parse().ok()?;
    let index = if relative {
        NORMAL_SIZE_INDEX.saturating_add(number)
    } else {
        number.saturating_sub(1)
    };
    let index = index.clamp(0, FONT_SIZES.len() as i32 - 1) as usize;
    Some(FONT_SIZES[index])
}

/// The stack of font frames.
#[derive(Debug, Clone)]
pub struct FontStack {
    frames: Vec<FontAttributes>,
}

impl FontStack {
    /// A stack holding only the document defaults.
    pub fn new(color: Color) -> Self {
        Self {
            frames: vec![FontAttributes {
                color,
                ..FontAttributes::default()
            }],
        }
    }

    /// The frame in effect.
    pub fn current(&self) -> &FontAttributes {
        // The bottom frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    /// Push a copy of the current frame changed by `change`.
    pub fn push_with(&mut self, change: impl FnOnce(&mut FontAttributes)) {
        let mut frame = self.current().clone();
        change(&mut frame);
        self.frames.push(frame);
    }

    /// Pop the frame pushed by the start tag matching `</tag>`.
    pub fn pop(&mut self, tag: Tag) -> Result<FontAttributes, BuildError> {
        if self.frames.len() <= 1 {
            return Err(BuildError::StyleStackUnderflow(tag.to_string()));
        }
        self.frames
            .pop()
            .ok_or_else(|| BuildError::StyleStackUnderflow(tag.to_string()))
    }

    /// Change the document defaults, as `<body text>` does.
    pub fn set_base_color(&mut self, color: Color) {
        for frame in &mut self.frames {
            frame.color = color;
        }
    }

    /// Number of frames above the bottom frame.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }
}

/// Turn `frame` into its sub- or superscript variant. `line_size` is the
/// pixel size of the text the script sits next to.
pub fn apply_script(frame: &mut FontAttributes, mode: ScriptMode, line_size: f32) {
    let shift = (line_size / 3.0).round() as i32;
    frame.size_percent = frame.size_percent * SCRIPT_SCALE_PERCENT / 100;
    frame.script = mode;
    match mode {
        ScriptMode::Superscript => frame.script_baseline -= shift,
        ScriptMode::Subscript => frame.script_baseline += shift,
        ScriptMode::Normal => {}
    }
}

/// Split a word into runs of lowercase letters and everything else, for
/// small-caps rendering. Lowercase runs come back uppercased and flagged.
pub fn small_caps_runs(word: &str) -> Vec<(String, bool)> {
    let mut runs: Vec<(String, bool)> = Vec::new();
    for ch in word.chars() {
        let lower = ch.is_lowercase();
        match runs.last_mut() {
            Some((run, was_lower)) if *was_lower == lower => run.extend(ch.to_uppercase()),
            _ => runs.push((ch.to_uppercase().collect(), lower)),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_sizes_absolute_and_relative() {
        assert_eq!(font_size_percent("3"), Some(100));
        assert_eq!(font_size_percent("7"), Some(288));
        assert_eq!(font_size_percent("+1"), Some(120));
        assert_eq!(font_size_percent("-2"), Some(58));
        assert_eq!(font_size_percent("+9"), Some(288));
        assert_eq!(font_size_percent("0"), Some(58));
        assert_eq!(font_size_percent("big"), None);
        assert_eq!(font_size_percent("+2147483647"), Some(288));
        assert_eq!(font_size_percent("-2147483648"), Some(58));
    }

    #[test]
    fn test_stack_never_pops_base_frame() {
        let mut stack = FontStack::new(Color::BLACK);
        stack.push_with(|f| f.bold = true);
        assert!(stack.current().bold);
        assert!(stack.pop(Tag::B).is_ok());
        assert!(!stack.current().bold);
        assert_eq!(
            stack.pop(Tag::B),
            Err(BuildError::StyleStackUnderflow("b".to_string()))
        );
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_superscript_shrinks_and_raises() {
        let mut frame = FontAttributes::default();
        apply_script(&mut frame, ScriptMode::Superscript, 12.0);
        assert_eq!(frame.size_percent, 70);
        assert_eq!(frame.script_baseline, -4);
    }

    #[test]
    fn test_small_caps_runs_split_by_case() {
        assert_eq!(
            small_caps_runs("McDonald"),
            vec![
                ("M".to_string(), false),
                ("C".to_string(), true),
                ("D".to_string(), false),
                ("ONALD".to_string(), true),
            ]
        );
    }
}
