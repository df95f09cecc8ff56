//! # Style Themes
//!
//! The immutable visual description of a rendered sheet: palette,
//! typography, spacing and decoration flags. A [`StyleTheme`] is built once
//! per render by the theme resolver and shared read-only by every block
//! renderer.

use serde::{Deserialize, Serialize};

use crate::font::FontRef;
use crate::model::{Edges, RenderOptions};

/// An RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Color::BLACK;
        }
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Linear interpolation towards `other`; `t` is clamped to 0..=1.
    pub fn mix(&self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Title band, heading bars, badges.
    pub primary: Color,
    /// Light tint used for card fills.
    pub secondary: Color,
    /// Accent bar, bullets, connectors.
    pub accent: Color,
    pub background: Color,
    pub text: Color,
    /// Footer and other de-emphasized text.
    pub muted: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub title_font: FontRef,
    pub heading_font: FontRef,
    pub body_font: FontRef,
    pub title_size: f64,
    pub heading_size: f64,
    pub body_size: f64,
    pub caption_size: f64,
}

/// Page geometry. `line_spacing`, `paragraph_spacing` and
/// `section_spacing` are multipliers of the body size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub margin: Edges,
    pub line_spacing: f64,
    pub paragraph_spacing: f64,
    pub section_spacing: f64,
    pub columns: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Decorations {
    pub borders: bool,
    pub shadows: bool,
    pub gradients: bool,
    pub icons: bool,
    pub patterns: bool,
}

/// Everything a renderer needs to know about how the sheet looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTheme {
    /// Resolved theme identifier, e.g. "modern".
    pub name: String,
    /// Resolved color scheme identifier, e.g. "blue".
    pub color_scheme: String,
    pub palette: Palette,
    pub typography: Typography,
    pub spacing: Spacing,
    pub decorations: Decorations,
}

impl StyleTheme {
    /// Apply the caller's numeric overrides. Non-positive or non-finite
    /// values are ignored and the theme value kept.
    pub fn with_overrides(mut self, options: &RenderOptions) -> Self {
        if let Some(size) = options.font_size.filter(|v| v.is_finite() && *v > 0.0) {
            let scale = size / self.typography.body_size;
            self.typography.body_size = size;
            self.typography.heading_size *= scale;
            self.typography.title_size *= scale;
            self.typography.caption_size *= scale;
        }
        if let Some(spacing) = options.line_spacing.filter(|v| v.is_finite() && *v > 0.0) {
            self.spacing.line_spacing = spacing;
        }
        if let Some(margin) = options.margin_width.filter(|v| v.is_finite() && *v >= 0.0) {
            self.spacing.margin = Edges::uniform(margin);
        }
        self
    }

    /// Distance between consecutive body-text baselines.
    pub fn line_height(&self) -> f64 {
        self.typography.body_size * self.spacing.line_spacing
    }

    /// Gap after a paragraph-level unit (a card, a bullet point, a step).
    pub fn paragraph_gap(&self) -> f64 {
        self.typography.body_size * self.spacing.paragraph_spacing
    }

    /// Gap after a whole section.
    pub fn section_gap(&self) -> f64 {
        self.typography.body_size * self.spacing.section_spacing
    }

    /// Column count, never below one.
    pub fn columns(&self) -> usize {
        self.spacing.columns.max(1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeResolver;

    #[test]
    fn hex_parsing() {
        let c = Color::hex("#FF8000");
        assert!((c.r - 1.0).abs() < 1e-9);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(c.b, 0.0);
        assert_eq!(Color::hex("fff"), Color::WHITE);
        assert_eq!(Color::hex("nope"), Color::BLACK);
    }

    #[test]
    fn mix_endpoints() {
        let a = Color::rgb(0.0, 0.0, 0.0);
        let b = Color::rgb(1.0, 0.5, 0.25);
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), b);
        assert_eq!(a.mix(b, 7.0), b);
    }

    #[test]
    fn font_size_override_scales_hierarchy() {
        let base = ThemeResolver::default().resolve("modern", "blue");
        let ratio = base.typography.title_size / base.typography.body_size;
        let options = RenderOptions {
            font_size: Some(22.0),
            ..Default::default()
        };
        let t = base.with_overrides(&options);
        assert_eq!(t.typography.body_size, 22.0);
        assert!((t.typography.title_size / t.typography.body_size - ratio).abs() < 1e-9);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let base = ThemeResolver::default().resolve("modern", "blue");
        let options = RenderOptions {
            font_size: Some(0.0),
            line_spacing: Some(f64::NAN),
            margin_width: Some(-5.0),
            ..Default::default()
        };
        let t = base.clone().with_overrides(&options);
        assert_eq!(t, base);
    }

    #[test]
    fn margin_override_is_uniform() {
        let options = RenderOptions {
            margin_width: Some(30.0),
            ..Default::default()
        };
        let t = ThemeResolver::default()
            .resolve("classic", "green")
            .with_overrides(&options);
        assert_eq!(t.spacing.margin, Edges::uniform(30.0));
    }
}
