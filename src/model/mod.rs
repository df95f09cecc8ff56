//! # Note Model
//!
//! The input representation for the engine: a finished study note as
//! produced by the upstream summarization pipeline, plus the render
//! options that select a theme and tune the page.
//!
//! The note is deliberately forgiving. Every collection defaults to empty
//! and a missing title is recovered locally, because the engine never
//! rejects a well-typed note. [`Note::blocks`] turns the note into the
//! ordered [`ContentBlock`] sequence the layout engine walks.

use serde::{Deserialize, Deserializer, Serialize};

/// Title used when the note arrives with a blank one.
pub const UNTITLED: &str = "Untitled Note";

/// A finished study note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "vec_skipping_null")]
    pub key_concepts: Vec<KeyConcept>,
    #[serde(default, deserialize_with = "vec_skipping_null")]
    pub summary_points: Vec<SummarySection>,
    #[serde(default, deserialize_with = "vec_skipping_null")]
    pub process_flow: Vec<ProcessStep>,
    /// The unprocessed source text. Only rendered when the note has
    /// neither key concepts nor summary sections.
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyConcept {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub definition: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarySection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(default, deserialize_with = "vec_skipping_null")]
    pub points: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessStep {
    /// Display number. Need not be contiguous; steps render in the order given.
    #[serde(default, deserialize_with = "null_as_default")]
    pub step: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// One semantic unit of note content, in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Title {
        text: String,
    },
    KeyConcept {
        /// 1-based position among the note's key concepts.
        index: usize,
        title: String,
        definition: String,
    },
    SummarySection {
        heading: String,
        points: Vec<String>,
    },
    ProcessStep {
        step_number: u32,
        title: String,
        description: String,
    },
    RawText {
        text: String,
    },
}

impl ContentBlock {
    /// Short name of the variant, used when logging flow decisions.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentBlock::Title { .. } => "Title",
            ContentBlock::KeyConcept { .. } => "KeyConcept",
            ContentBlock::SummarySection { .. } => "SummarySection",
            ContentBlock::ProcessStep { .. } => "ProcessStep",
            ContentBlock::RawText { .. } => "RawText",
        }
    }
}

impl Note {
    /// The title to render, substituting [`UNTITLED`] for a blank one.
    pub fn display_title(&self) -> &str {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            UNTITLED
        } else {
            trimmed
        }
    }

    /// Whether the raw-text fallback replaces the structured sections.
    pub fn uses_raw_fallback(&self) -> bool {
        self.key_concepts.is_empty() && self.summary_points.is_empty()
    }

    /// Flatten the note into content blocks in the fixed traversal order:
    /// title, key concepts, summary sections, process steps, and the raw
    /// text fallback when there are no concepts and no summary sections.
    pub fn blocks(&self) -> Vec<ContentBlock> {
        if self.title.trim().is_empty() {
            log::warn!("Note has no title, using '{}'", UNTITLED);
        }
        let mut blocks = vec![ContentBlock::Title {
            text: self.display_title().to_string(),
        }];

        blocks.extend(
            self.key_concepts
                .iter()
                .enumerate()
                .map(|(i, c)| ContentBlock::KeyConcept {
                    index: i + 1,
                    title: c.title.clone(),
                    definition: c.definition.clone(),
                }),
        );

        blocks.extend(
            self.summary_points
                .iter()
                .map(|s| ContentBlock::SummarySection {
                    heading: s.heading.clone(),
                    points: s.points.clone(),
                }),
        );

        blocks.extend(self.process_flow.iter().map(|p| ContentBlock::ProcessStep {
            step_number: p.step,
            title: p.title.clone(),
            description: p.description.clone(),
        }));

        if self.uses_raw_fallback() {
            blocks.push(ContentBlock::RawText {
                text: self.original_content.clone(),
            });
        }

        blocks
    }
}

/// A complete render request: the note plus how to render it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: Note,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: RenderOptions,
}

/// Read an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list that may itself be `null` or contain `null` entries.
fn vec_skipping_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

/// What to do when a fragment does not fit in the remaining page space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Open a new page and keep flowing.
    #[default]
    PageBreak,
    /// Skip the rest of the current section. Used for single-page sheets.
    StopAndDrop,
}

/// Caller-facing options. Numeric overrides left as `None` take the
/// theme's values (modern: font size 11, line spacing 1.4, margin 50).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_color_scheme")]
    pub color_scheme: String,
    /// Body font size in points.
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Line height as a multiple of the font size.
    #[serde(default)]
    pub line_spacing: Option<f64>,
    /// Uniform page margin in points.
    #[serde(default)]
    pub margin_width: Option<f64>,
    #[serde(default = "default_true")]
    pub include_header: bool,
    #[serde(default = "default_true")]
    pub include_footer: bool,
    #[serde(default = "default_true")]
    pub include_visual_elements: bool,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub overflow: OverflowPolicy,
    /// RFC 3339 timestamp printed in the footer. Defaults to now.
    #[serde(default)]
    pub generated_at: Option<String>,
    /// Custom fonts to register before layout.
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            color_scheme: default_color_scheme(),
            font_size: None,
            line_spacing: None,
            margin_width: None,
            include_header: true,
            include_footer: true,
            include_visual_elements: true,
            page_size: PageSize::default(),
            overflow: OverflowPolicy::default(),
            generated_at: None,
            fonts: Vec::new(),
        }
    }
}

fn default_theme() -> String {
    "modern".to_string()
}

fn default_color_scheme() -> String {
    "blue".to_string()
}

fn default_true() -> bool {
    true
}

/// A custom font to register with the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
    /// Font weight (100-900). Defaults to 400.
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}
