//! # Text Wrapping
//!
//! Greedy word wrap against the font metric model.
//!
//! Words are never split: a word wider than the column is emitted on a line
//! of its own and left for the serializer to clip. That keeps the wrapper
//! free of hyphenation rules at the cost of the occasional overflow.

use crate::font::{FontContext, FontRef};

/// A wrapped line and its measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width: f64,
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Whitespace (including newlines) separates words and collapses to a
    /// single space. Blank input yields no lines. The result depends only on
    /// the arguments, so calling twice gives the same lines.
    pub fn wrap(
        &self,
        fonts: &FontContext,
        text: &str,
        max_width: f64,
        font: &FontRef,
        font_size: f64,
    ) -> Vec<WrappedLine> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                current_width = fonts.measure(&current, font, font_size);
                continue;
            }

            let candidate = format!("{} {}", current, word);
            let candidate_width = fonts.measure(&candidate, font, font_size);
            if candidate_width <= max_width {
                current = candidate;
                current_width = candidate_width;
            } else {
                lines.push(WrappedLine {
                    text: std::mem::take(&mut current),
                    width: current_width,
                });
                current.push_str(word);
                current_width = fonts.measure(&current, font, font_size);
            }
        }

        if !current.is_empty() {
            lines.push(WrappedLine {
                text: current,
                width: current_width,
            });
        }

        lines
    }

    /// Wrap and keep at most `max_lines` lines. Returns the kept lines and
    /// the number that were dropped.
    pub fn wrap_capped(
        &self,
        fonts: &FontContext,
        text: &str,
        max_width: f64,
        font: &FontRef,
        font_size: f64,
        max_lines: usize,
    ) -> (Vec<WrappedLine>, usize) {
        let mut lines = self.wrap(fonts, text, max_width, font, font_size);
        let dropped = lines.len().saturating_sub(max_lines);
        lines.truncate(max_lines);
        (lines, dropped)
    }
}
