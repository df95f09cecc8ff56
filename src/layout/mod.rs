//! # Page-Aware Sheet Layout
//!
//! This is the heart of the engine.
//!
//! Nothing is laid out on an infinite canvas and sliced afterwards. Each
//! content block is rendered into one or more *fragments*: atomic groups of
//! primitives positioned relative to their own top edge. The page flow
//! manager then asks, before every fragment, "does this fit?":
//!
//! 1. If it fits: place it at the cursor, reduce remaining space
//! 2. If it doesn't fit and the policy is page-break: open a new page
//!    and place it at the top margin
//! 3. If it doesn't fit and the policy is stop-and-drop: skip it and the
//!    rest of its section
//!
//! Fragments that must not be separated from their successor (section
//! labels, heading bars) are measured together with it. Primitives that
//! only make sense next to the previous fragment (process connectors) are
//! dropped when the fragment lands on a fresh page.
//!
//! Output coordinates use a top-left page origin with y growing downward.
//! A text run's `y` is its baseline.

pub mod blocks;
pub mod page_flow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::font::{FontContext, FontRef};
use crate::model::{ContentBlock, Note, RenderOptions};
use crate::style::{Color, StyleTheme};
use crate::text::TextLayout;

use blocks::{BlockRenderer, RenderContext};
use page_flow::PageFlow;

pub use page_flow::{FlowDecision, FlowOutcome, FlowState, LayoutCursor};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single positioned drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderPrimitive {
    #[serde(rename_all = "camelCase")]
    TextRun {
        text: String,
        x: f64,
        /// Baseline.
        y: f64,
        size: f64,
        font: FontRef,
        color: Color,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_width: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    FilledRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
        #[serde(skip_serializing_if = "Option::is_none")]
        border_color: Option<Color>,
        #[serde(skip_serializing_if = "Option::is_none")]
        border_width: Option<f64>,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        fill: Color,
    },
    Line {
        from: Point,
        to: Point,
        thickness: f64,
        color: Color,
    },
}

impl RenderPrimitive {
    /// Shift the primitive down by `dy` points.
    fn offset_y(&mut self, dy: f64) {
        match self {
            RenderPrimitive::TextRun { y, .. }
            | RenderPrimitive::FilledRect { y, .. }
            | RenderPrimitive::Circle { y, .. } => *y += dy,
            RenderPrimitive::Line { from, to, .. } => {
                from.y += dy;
                to.y += dy;
            }
        }
    }

    /// The text of a text run, if this is one.
    pub fn text(&self) -> Option<&str> {
        match self {
            RenderPrimitive::TextRun { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Vertical extent `(top, bottom)` of the primitive.
    pub fn vertical_extent(&self) -> (f64, f64) {
        match self {
            RenderPrimitive::TextRun { y, size, .. } => (y - size, *y),
            RenderPrimitive::FilledRect { y, height, .. } => (*y, y + height),
            RenderPrimitive::Circle { y, radius, .. } => (y - radius, y + radius),
            RenderPrimitive::Line { from, to, .. } => (from.y.min(to.y), from.y.max(to.y)),
        }
    }
}

/// An atomic, page-independent group of primitives.
///
/// Primitive `y` values are relative to the fragment's top edge; the page
/// flow manager translates them when the fragment is placed.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub height: f64,
    pub primitives: Vec<RenderPrimitive>,
    /// Drawn only when the fragment lands on the same page as the
    /// fragment placed before it.
    pub joins_previous: Vec<RenderPrimitive>,
    /// Measure this fragment together with the next one.
    pub keep_with_next: bool,
}

impl Fragment {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            ..Default::default()
        }
    }

    pub fn push(&mut self, primitive: RenderPrimitive) {
        self.primitives.push(primitive);
    }
}

/// A finished page: primitives in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub primitives: Vec<RenderPrimitive>,
}

impl Page {
    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(RenderPrimitive::text)
    }
}

/// Space kept free at the bottom of every page for the footer.
fn footer_reserve(theme: &StyleTheme, options: &RenderOptions) -> f64 {
    if options.include_footer {
        theme.typography.caption_size + 16.0
    } else {
        0.0
    }
}

/// The document assembler: walks a note's blocks in order and flows
/// their fragments into pages.
pub struct LayoutEngine {
    text_layout: TextLayout,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            text_layout: TextLayout::new(),
        }
    }

    /// Lay out a note into pages of primitives.
    ///
    /// `generated_at` is the timestamp printed in the footer.
    pub fn assemble(
        &self,
        note: &Note,
        theme: &StyleTheme,
        options: &RenderOptions,
        fonts: &FontContext,
        generated_at: DateTime<Utc>,
    ) -> Vec<Page> {
        let (page_width, page_height) = options.page_size.dimensions();
        let mut flow = PageFlow::new(
            theme,
            page_width,
            page_height,
            options.overflow,
            footer_reserve(theme, options),
        );

        let ctx = RenderContext {
            fonts,
            text: &self.text_layout,
            theme,
            page_width,
            include_header: options.include_header,
        };
        let renderer = BlockRenderer::new(&ctx);

        let blocks = note.blocks();
        for section in group_sections(&blocks) {
            flow.begin_section();
            let cursor = flow.cursor();
            let mut fragments = Vec::new();

            if let Some(label) = section_label(&section[0]) {
                fragments.push(renderer.section_label(label, &cursor));
            }

            match &section[0] {
                ContentBlock::KeyConcept { .. } => {
                    for row in section.chunks(theme.columns()) {
                        fragments.push(renderer.concept_row(row, &cursor));
                    }
                }
                _ => {
                    let mut previous: Option<usize> = None;
                    for block in section {
                        let prev = previous.and_then(|i| fragments.get(i));
                        let rendered = renderer.render(block, &cursor, prev);
                        if !rendered.is_empty() {
                            previous = Some(fragments.len() + rendered.len() - 1);
                        }
                        fragments.extend(rendered);
                    }
                }
            }

            let placed = flow.place_all(fragments);
            if placed > 0 {
                flow.advance(theme.section_gap());
            }
            log::debug!(
                "Section {} placed {} fragment(s), now on page {}",
                section[0].kind_name(),
                placed,
                flow.cursor().page_index + 1
            );
        }

        if options.include_visual_elements {
            flow.begin_section();
            let cursor = flow.cursor();
            let banner = renderer.feature_banner(
                note.key_concepts.len(),
                note.summary_points.len(),
                note.process_flow.len(),
                &cursor,
            );
            flow.place_all(vec![banner]);
        }

        let dropped = flow.dropped();
        let mut pages = flow.finish();
        if dropped > 0 {
            log::debug!("Dropped {} fragment(s) that did not fit", dropped);
        }

        if options.include_footer {
            self.inject_footers(&mut pages, theme, fonts, generated_at);
        }

        pages
    }

    /// Append the footer (divider, generation date, page number) to every
    /// page. Runs after layout because the page count is needed.
    fn inject_footers(
        &self,
        pages: &mut [Page],
        theme: &StyleTheme,
        fonts: &FontContext,
        generated_at: DateTime<Utc>,
    ) {
        let total = pages.len();
        let margin = theme.spacing.margin;
        let size = theme.typography.caption_size;
        let font = theme.typography.body_font.clone();
        let color = theme.palette.muted;
        let stamp = format!("Generated on {}", generated_at.format("%B %-d, %Y"));

        for page in pages.iter_mut() {
            let baseline = page.height - margin.bottom - 4.0;
            let divider_y = baseline - size - 6.0;
            let left = margin.left;
            let right = page.width - margin.right;

            page.primitives.push(RenderPrimitive::Line {
                from: Point::new(left, divider_y),
                to: Point::new(right, divider_y),
                thickness: 0.5,
                color,
            });
            page.primitives.push(RenderPrimitive::TextRun {
                text: stamp.clone(),
                x: left,
                y: baseline,
                size,
                font: font.clone(),
                color,
                max_width: None,
            });

            let number = format!("Page {} of {}", page.index + 1, total);
            let width = fonts.measure(&number, &font, size);
            page.primitives.push(RenderPrimitive::TextRun {
                text: number,
                x: (right - width).max(left),
                y: baseline,
                size,
                font: font.clone(),
                color,
                max_width: None,
            });
        }
    }
}

/// Split blocks into runs of the same variant. Each run is one section.
fn group_sections(blocks: &[ContentBlock]) -> Vec<&[ContentBlock]> {
    let mut sections = Vec::new();
    let mut start = 0;
    for i in 1..=blocks.len() {
        if i == blocks.len() || blocks[i].kind_name() != blocks[start].kind_name() {
            if start < i {
                sections.push(&blocks[start..i]);
            }
            start = i;
        }
    }
    sections
}

fn section_label(block: &ContentBlock) -> Option<&'static str> {
    match block {
        ContentBlock::Title { .. } => None,
        ContentBlock::KeyConcept { .. } => Some("Key Concepts"),
        ContentBlock::SummarySection { .. } => Some("Summary"),
        ContentBlock::ProcessStep { .. } => Some("Process Flow"),
        ContentBlock::RawText { .. } => Some("Notes"),
    }
}
