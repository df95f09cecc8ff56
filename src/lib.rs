//! # Studysheet
//!
//! A page-native layout engine for study notes.
//!
//! A note (title, key concepts, summary sections, process steps, and the
//! original text) goes in; a list of fixed-size pages of positioned drawing
//! primitives comes out. Turning those primitives into PDF bytes, pixels or
//! anything else is left to the caller.
//!
//! Content is never laid out on an unbounded canvas and cut up later. Each
//! block is rendered into fragments and the page flow manager places them
//! one at a time against the space left on the current page, breaking pages
//! (or dropping content, if asked to) as it goes.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Note, options, content blocks
//!       ↓
//!   [theme]    Theme + color scheme → StyleTheme
//!       ↓
//!   [font]     Metrics for measuring text
//!       ↓
//!   [text]     Greedy word wrap
//!       ↓
//!   [layout]   Block renderers → page flow → pages
//! ```

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod style;
pub mod text;
pub mod theme;

pub use error::{Result, StudySheetError};

use chrono::{DateTime, Utc};

use font::FontContext;
use layout::{LayoutEngine, Page};
use model::{Note, RenderOptions, RenderRequest};
use theme::ThemeResolver;

/// Lay out a note into pages.
///
/// This is the primary entry point. Unknown theme or color scheme names
/// fall back to the defaults; the only failures are bad custom fonts and an
/// unparseable `generatedAt` timestamp.
pub fn render(note: &Note, options: &RenderOptions) -> Result<Vec<Page>> {
    render_with(&ThemeResolver::default(), note, options)
}

/// Like [`render`], resolving themes against a caller-supplied registry.
pub fn render_with(
    resolver: &ThemeResolver,
    note: &Note,
    options: &RenderOptions,
) -> Result<Vec<Page>> {
    let fonts = FontContext::with_fonts(&options.fonts)?;
    let theme = resolver
        .resolve(&options.theme, &options.color_scheme)
        .with_overrides(options);
    fonts.validate_theme(&theme)?;
    let generated_at = generated_at(options)?;

    log::debug!(
        "Rendering '{}' with theme {}/{}",
        note.display_title(),
        theme.name,
        theme.color_scheme
    );
    let pages = LayoutEngine::new().assemble(note, &theme, options, &fonts, generated_at);
    log::debug!("Rendered {} page(s)", pages.len());
    Ok(pages)
}

/// Render a request described as JSON to pages.
pub fn render_json(json: &str) -> Result<Vec<Page>> {
    let request: RenderRequest = serde_json::from_str(json)?;
    render(&request.note, &request.options)
}

/// Render a request described as JSON and serialize the pages back to JSON.
pub fn render_to_json(json: &str) -> Result<String> {
    let pages = render_json(json)?;
    Ok(serde_json::to_string_pretty(&pages)?)
}

fn generated_at(options: &RenderOptions) -> Result<DateTime<Utc>> {
    match options.generated_at.as_deref() {
        Some(stamp) => DateTime::parse_from_rfc3339(stamp.trim())
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| StudySheetError::Timestamp(format!("'{}': {}", stamp, e))),
        None => Ok(Utc::now()),
    }
}
