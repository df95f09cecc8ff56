//! # Theme Resolver
//!
//! Maps a theme identifier and a color-scheme identifier to a concrete
//! [`StyleTheme`]. Themes carry typography, spacing and decoration flags;
//! color schemes carry the palette. The two are combined at resolve time.
//!
//! The tables live in an explicit [`ThemeRegistry`] value handed to the
//! resolver, so callers can add their own themes without touching any
//! global state. Unknown identifiers never fail: they resolve to the
//! default "modern" theme and "blue" scheme.

use std::collections::HashMap;

use crate::font::FontRef;
use crate::model::Edges;
use crate::style::{Color, Decorations, Palette, Spacing, StyleTheme, Typography};

pub const DEFAULT_THEME: &str = "modern";
pub const DEFAULT_COLOR_SCHEME: &str = "blue";

/// The non-color half of a theme.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDefinition {
    pub typography: Typography,
    pub spacing: Spacing,
    pub decorations: Decorations,
}

/// Immutable table of known themes and color schemes.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: HashMap<String, ThemeDefinition>,
    schemes: HashMap<String, Palette>,
    default_theme: ThemeDefinition,
    default_scheme: Palette,
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ThemeRegistry {
    /// The built-in themes (modern, classic, minimal, academic, vibrant)
    /// and color schemes (blue, green, purple, orange, red, teal, gray).
    pub fn builtin() -> Self {
        let themes: HashMap<String, ThemeDefinition> = [
            ("modern", modern()),
            ("classic", classic()),
            ("minimal", minimal()),
            ("academic", academic()),
            ("vibrant", vibrant()),
        ]
        .into_iter()
        .map(|(id, def)| (id.to_string(), def))
        .collect();

        let schemes: HashMap<String, Palette> = [
            ("blue", scheme("#2563EB", "#EFF4FF", "#F59E0B", "#1F2937")),
            ("green", scheme("#15803D", "#ECFDF3", "#CA8A04", "#1C2A22")),
            ("purple", scheme("#7C3AED", "#F5F0FF", "#EC4899", "#2A2140")),
            ("orange", scheme("#EA580C", "#FFF4EC", "#0EA5E9", "#2D2118")),
            ("red", scheme("#DC2626", "#FEF1F1", "#0F766E", "#2B1B1B")),
            ("teal", scheme("#0F766E", "#ECFDFA", "#F97316", "#16302D")),
            ("gray", scheme("#374151", "#F3F4F6", "#6B7280", "#111827")),
        ]
        .into_iter()
        .map(|(id, palette)| (id.to_string(), palette))
        .collect();

        Self {
            themes,
            schemes,
            default_theme: modern(),
            default_scheme: scheme("#2563EB", "#EFF4FF", "#F59E0B", "#1F2937"),
        }
    }

    /// Register (or replace) a theme.
    pub fn with_theme(mut self, id: &str, definition: ThemeDefinition) -> Self {
        self.themes.insert(normalize(id), definition);
        self
    }

    /// Register (or replace) a color scheme.
    pub fn with_color_scheme(mut self, id: &str, palette: Palette) -> Self {
        self.schemes.insert(normalize(id), palette);
        self
    }

    pub fn theme_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.themes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn color_scheme_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schemes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Resolves identifiers against a registry.
#[derive(Debug, Clone, Default)]
pub struct ThemeResolver {
    registry: ThemeRegistry,
}

impl ThemeResolver {
    pub fn new(registry: ThemeRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a theme and color scheme. Identifiers are trimmed and
    /// matched case-insensitively; unknown ones fall back to the defaults.
    pub fn resolve(&self, theme_id: &str, color_scheme_id: &str) -> StyleTheme {
        let theme_key = normalize(theme_id);
        let (name, definition) = match self.registry.themes.get(&theme_key) {
            Some(def) => (theme_key, def),
            None => {
                log::warn!(
                    "Unknown theme '{}', falling back to '{}'",
                    theme_id,
                    DEFAULT_THEME
                );
                (DEFAULT_THEME.to_string(), &self.registry.default_theme)
            }
        };

        let scheme_key = normalize(color_scheme_id);
        let (color_scheme, palette) = match self.registry.schemes.get(&scheme_key) {
            Some(palette) => (scheme_key, *palette),
            None => {
                log::warn!(
                    "Unknown color scheme '{}', falling back to '{}'",
                    color_scheme_id,
                    DEFAULT_COLOR_SCHEME
                );
                (
                    DEFAULT_COLOR_SCHEME.to_string(),
                    self.registry.default_scheme,
                )
            }
        };

        StyleTheme {
            name,
            color_scheme,
            palette,
            typography: definition.typography.clone(),
            spacing: definition.spacing,
            decorations: definition.decorations,
        }
    }
}

fn normalize(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

fn scheme(primary: &str, secondary: &str, accent: &str, text: &str) -> Palette {
    Palette {
        primary: Color::hex(primary),
        secondary: Color::hex(secondary),
        accent: Color::hex(accent),
        background: Color::WHITE,
        text: Color::hex(text),
        muted: Color::hex("#6B7280"),
    }
}

fn typography(family: &str, title: f64, heading: f64, body: f64) -> Typography {
    Typography {
        title_font: FontRef::bold(family),
        heading_font: FontRef::bold(family),
        body_font: FontRef::regular(family),
        title_size: title,
        heading_size: heading,
        body_size: body,
        caption_size: (body - 2.0).max(6.0),
    }
}

fn modern() -> ThemeDefinition {
    ThemeDefinition {
        typography: typography("Helvetica", 26.0, 15.0, 11.0),
        spacing: Spacing {
            margin: Edges::uniform(50.0),
            line_spacing: 1.4,
            paragraph_spacing: 0.8,
            section_spacing: 1.8,
            columns: 1,
        },
        decorations: Decorations {
            borders: false,
            shadows: true,
            gradients: false,
            icons: true,
            patterns: false,
        },
    }
}

fn classic() -> ThemeDefinition {
    ThemeDefinition {
        typography: typography("Times", 28.0, 16.0, 11.0),
        spacing: Spacing {
            margin: Edges::uniform(60.0),
            line_spacing: 1.5,
            paragraph_spacing: 1.0,
            section_spacing: 2.0,
            columns: 1,
        },
        decorations: Decorations {
            borders: true,
            ..Default::default()
        },
    }
}

fn minimal() -> ThemeDefinition {
    ThemeDefinition {
        typography: typography("Helvetica", 22.0, 13.0, 10.0),
        spacing: Spacing {
            margin: Edges::symmetric(56.0, 64.0),
            line_spacing: 1.5,
            paragraph_spacing: 0.8,
            section_spacing: 2.2,
            columns: 1,
        },
        decorations: Decorations::default(),
    }
}

fn academic() -> ThemeDefinition {
    ThemeDefinition {
        typography: typography("Times", 24.0, 14.0, 10.5),
        spacing: Spacing {
            margin: Edges::uniform(54.0),
            line_spacing: 1.35,
            paragraph_spacing: 0.7,
            section_spacing: 1.6,
            columns: 2,
        },
        decorations: Decorations {
            borders: true,
            icons: false,
            ..Default::default()
        },
    }
}

fn vibrant() -> ThemeDefinition {
    ThemeDefinition {
        typography: typography("Helvetica", 30.0, 16.0, 11.0),
        spacing: Spacing {
            margin: Edges::uniform(44.0),
            line_spacing: 1.45,
            paragraph_spacing: 0.9,
            section_spacing: 1.8,
            columns: 1,
        },
        decorations: Decorations {
            borders: false,
            shadows: true,
            gradients: true,
            icons: true,
            patterns: true,
        },
    }
}
