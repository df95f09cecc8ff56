//! # Font Management
//!
//! The font metric model the text wrapper measures against.
//!
//! The standard PDF fonts (Helvetica, Times, Courier) need no embedding and
//! come with built-in width tables. Custom TrueType/OpenType fonts can be
//! registered from base64 payloads; their advance widths are read with
//! ttf-parser. Lookups are read-only once registration is done, so one
//! `FontContext` can be shared by concurrent renders.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudySheetError};
use crate::model::FontEntry;
use crate::style::StyleTheme;

/// A reference to a font face: family + weight + style.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRef {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl FontRef {
    pub fn new(family: &str, weight: u32, italic: bool) -> Self {
        Self {
            family: family.to_string(),
            weight,
            italic,
        }
    }

    pub fn regular(family: &str) -> Self {
        Self::new(family, 400, false)
    }

    pub fn bold(family: &str) -> Self {
        Self::new(family, 700, false)
    }

    /// The same family and style at bold weight.
    pub fn to_bold(&self) -> Self {
        Self {
            weight: 700,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType/OpenType font supplied by the caller, reduced to the
    /// metrics needed for measuring.
    Custom(CustomFontMetrics),
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Basic Multilingual Plane only; notes are plain prose.
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == 'n' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }
}

/// The standard PDF fonts with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
            Self::TimesRoman | Self::TimesItalic => &metrics::TIMES_ROMAN,
            Self::TimesBold | Self::TimesBoldItalic => &metrics::TIMES_BOLD,
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => &metrics::COURIER,
        }
    }
}

static FALLBACK: FontData = FontData::Standard(StandardFont::Helvetica);

/// A font registry that maps font family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontRef, FontData>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = [
            (("Helvetica", 400, false), StandardFont::Helvetica),
            (("Helvetica", 700, false), StandardFont::HelveticaBold),
            (("Helvetica", 400, true), StandardFont::HelveticaOblique),
            (("Helvetica", 700, true), StandardFont::HelveticaBoldOblique),
            (("Times", 400, false), StandardFont::TimesRoman),
            (("Times", 700, false), StandardFont::TimesBold),
            (("Times", 400, true), StandardFont::TimesItalic),
            (("Times", 700, true), StandardFont::TimesBoldItalic),
            (("Courier", 400, false), StandardFont::Courier),
            (("Courier", 700, false), StandardFont::CourierBold),
            (("Courier", 400, true), StandardFont::CourierOblique),
            (("Courier", 700, true), StandardFont::CourierBoldOblique),
        ];

        for ((family, weight, italic), font) in standard_mappings {
            fonts.insert(FontRef::new(family, weight, italic), FontData::Standard(font));
        }

        Self { fonts }
    }

    /// Look up a font, snapping the weight to regular/bold and falling back
    /// to Helvetica for unknown families.
    pub fn resolve(&self, font: &FontRef) -> &FontData {
        if let Some(data) = self.fonts.get(font) {
            return data;
        }

        let snapped_weight = if font.weight >= 600 { 700 } else { 400 };
        let snapped = FontRef::new(&font.family, snapped_weight, font.italic);
        if let Some(data) = self.fonts.get(&snapped) {
            return data;
        }

        // A custom family registered only in one style still beats Helvetica.
        let upright = FontRef::new(&font.family, snapped_weight, false);
        if let Some(data) = self.fonts.get(&upright) {
            return data;
        }

        let helvetica = FontRef::new("Helvetica", snapped_weight, font.italic);
        self.fonts.get(&helvetica).unwrap_or(&FALLBACK)
    }

    /// Register a custom font by its parsed metrics.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        metrics: CustomFontMetrics,
    ) {
        self.fonts.insert(
            FontRef::new(family, weight, italic),
            FontData::Custom(metrics),
        );
    }

    /// Whether any face of `family` is registered.
    pub fn has_family(&self, family: &str) -> bool {
        self.fonts.keys().any(|k| k.family == family)
    }
}

/// Shared font context used by text wrapping and block rendering.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Build a context with the request's custom fonts registered.
    pub fn with_fonts(entries: &[FontEntry]) -> Result<Self> {
        let mut ctx = Self::new();
        for entry in entries {
            ctx.register_entry(entry)?;
        }
        Ok(ctx)
    }

    /// Decode and register a custom font entry.
    pub fn register_entry(&mut self, entry: &FontEntry) -> Result<()> {
        let data = decode_font_src(&entry.src).map_err(|e| {
            StudySheetError::Font(format!("font '{}': {}", entry.family, e))
        })?;
        let metrics = CustomFontMetrics::from_font_data(&data).ok_or_else(|| {
            StudySheetError::Font(format!(
                "font '{}': data is not a valid TrueType/OpenType font",
                entry.family
            ))
        })?;
        log::debug!(
            "Registered custom font '{}' (weight {}, italic {}, {} bytes, {} glyphs)",
            entry.family,
            entry.weight,
            entry.italic,
            data.len(),
            metrics.advance_widths.len()
        );
        self.registry
            .register(&entry.family, entry.weight, entry.italic, metrics);
        Ok(())
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, font: &FontRef, font_size: f64) -> f64 {
        match self.registry.resolve(font) {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::Custom(m) => m.char_width(ch, font_size),
        }
    }

    /// Measure the rendered width of a string in points.
    pub fn measure(&self, text: &str, font: &FontRef, font_size: f64) -> f64 {
        match self.registry.resolve(font) {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom(m) => text.chars().map(|ch| m.char_width(ch, font_size)).sum(),
        }
    }

    /// Check that every font family a theme uses is registered.
    ///
    /// Runs once per render, right after theme resolution, so that glyph
    /// measurement never has to deal with a missing face.
    pub fn validate_theme(&self, theme: &StyleTheme) -> Result<()> {
        let typography = &theme.typography;
        for font in [
            &typography.title_font,
            &typography.heading_font,
            &typography.body_font,
        ] {
            if !self.registry.has_family(&font.family) {
                return Err(StudySheetError::Font(format!(
                    "theme '{}' uses unregistered font family '{}'",
                    theme.name, font.family
                )));
            }
        }
        Ok(())
    }

    /// Resolve a font reference to its font data.
    pub fn resolve(&self, font: &FontRef) -> &FontData {
        self.registry.resolve(font)
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }
}

/// Decode a font `src`: a `data:` URI or raw base64.
fn decode_font_src(src: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::Engine;

    let payload = match src.strip_prefix("data:") {
        Some(rest) => match rest.split_once(";base64,") {
            Some((_, b64)) => b64,
            None => return Err("data URI is not base64-encoded".to_string()),
        },
        None => src,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', &FontRef::regular("Helvetica"), 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.measure("Knowledge", &FontRef::regular("Helvetica"), 12.0);
        let bold = ctx.measure("Knowledge", &FontRef::bold("Helvetica"), 12.0);
        assert!(bold > regular, "Bold text should be wider than regular");
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let w1 = ctx.char_width('A', &FontRef::regular("Helvetica"), 12.0);
        let w2 = ctx.char_width('A', &FontRef::regular("UnknownFont"), 12.0);
        assert!((w1 - w2).abs() < 0.001);
    }

    #[test]
    fn test_font_context_weight_resolution() {
        let ctx = FontContext::new();
        let w700 = ctx.char_width('A', &FontRef::new("Helvetica", 700, false), 12.0);
        let w800 = ctx.char_width('A', &FontRef::new("Helvetica", 800, false), 12.0);
        assert!((w700 - w800).abs() < 0.001);
    }

    #[test]
    fn test_times_narrower_than_helvetica() {
        let ctx = FontContext::new();
        let text = "the quick brown fox";
        let times = ctx.measure(text, &FontRef::regular("Times"), 12.0);
        let helv = ctx.measure(text, &FontRef::regular("Helvetica"), 12.0);
        assert!(times < helv);
    }

    #[test]
    fn test_measure_scales_with_size() {
        let ctx = FontContext::new();
        let font = FontRef::regular("Helvetica");
        let w10 = ctx.measure("Cells", &font, 10.0);
        let w20 = ctx.measure("Cells", &font, 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_base64_is_font_error() {
        let entry = FontEntry {
            family: "Broken".to_string(),
            src: "not base64 at all!!".to_string(),
            weight: 400,
            italic: false,
        };
        let err = FontContext::with_fonts(&[entry]).err().unwrap();
        assert!(matches!(err, StudySheetError::Font(_)));
    }

    #[test]
    fn test_non_font_payload_is_rejected() {
        // Valid base64 ("hello"), but not a font.
        let entry = FontEntry {
            family: "Hello".to_string(),
            src: "data:font/ttf;base64,aGVsbG8=".to_string(),
            weight: 400,
            italic: false,
        };
        let mut ctx = FontContext::new();
        assert!(ctx.register_entry(&entry).is_err());
        assert!(!ctx.registry().has_family("Hello"));
    }

    const MONO700: &[u8] = include_bytes!("../../tests/fixtures/mono700.ttf");

    #[test]
    fn test_custom_metrics_from_truetype() {
        let metrics = CustomFontMetrics::from_font_data(MONO700).unwrap();
        assert_eq!(metrics.units_per_em, 1000);
        assert_eq!(metrics.default_advance, 700);
        assert!((metrics.char_width('A', 10.0) - 7.0).abs() < 1e-9);
        // Outside the cmap: falls back to the width of 'n'.
        assert!((metrics.char_width('é', 10.0) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_registered_custom_font_measures_with_its_metrics() {
        let mut ctx = FontContext::new();
        let metrics = CustomFontMetrics::from_font_data(MONO700).unwrap();
        ctx.registry.register("Mono700", 400, false, metrics);

        let mono = ctx.measure("nnnn", &FontRef::regular("Mono700"), 10.0);
        let helv = ctx.measure("nnnn", &FontRef::regular("Helvetica"), 10.0);
        assert!((mono - 28.0).abs() < 1e-9);
        assert!((helv - 22.24).abs() < 1e-9);
    }

    #[test]
    fn test_decode_font_src_variants() {
        assert_eq!(decode_font_src("aGk=").unwrap(), b"hi".to_vec());
        assert_eq!(
            decode_font_src("data:font/ttf;base64,aGk=").unwrap(),
            b"hi".to_vec()
        );
        assert!(decode_font_src("data:font/ttf,aGk=").is_err());
    }
}
