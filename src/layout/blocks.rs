//! # Block Renderers
//!
//! One rendering strategy per [`ContentBlock`] variant. Each strategy reads
//! a cursor snapshot and the theme, and returns fragments whose primitive
//! `y` values are relative to the fragment top. None of them touch the
//! cursor; the page flow manager decides where the fragments land.
//!
//! Several strategies deliberately cap how much text they draw: concept
//! cards have a fixed height and show at most three definition lines,
//! bullet points and step descriptions are capped as well, and the raw text
//! fallback stops after a fixed number of lines. Whatever wraps past a cap
//! is dropped, not paginated.

use crate::font::{FontContext, FontRef};
use crate::model::ContentBlock;
use crate::style::{Color, StyleTheme};
use crate::text::{TextLayout, WrappedLine};

use super::{Fragment, LayoutCursor, Point, RenderPrimitive};

/// Definition lines drawn inside a key concept card.
pub const MAX_DEFINITION_LINES: usize = 3;
/// Lines drawn per summary bullet point.
pub const MAX_POINT_LINES: usize = 3;
/// Description lines drawn per process step.
pub const MAX_STEP_LINES: usize = 2;
/// Lines of original content drawn by the raw text fallback.
pub const MAX_RAW_LINES: usize = 40;
/// Lines a title may wrap to.
pub const MAX_TITLE_LINES: usize = 2;

pub const EMPTY_CONTENT_TEXT: &str = "No content available.";

const ACCENT_BAR_HEIGHT: f64 = 6.0;
const TITLE_BAND_PADDING: f64 = 14.0;
const GRADIENT_STEPS: usize = 12;

const ICON_RADIUS: f64 = 4.0;

const CARD_PADDING: f64 = 12.0;
const CARD_GAP: f64 = 12.0;
const BADGE_RADIUS: f64 = 11.0;
const SHADOW_OFFSET: f64 = 2.5;

const BULLET_RADIUS: f64 = 2.5;
const BULLET_INDENT: f64 = 16.0;

const STEP_RADIUS: f64 = 13.0;
const STEP_TOP_PADDING: f64 = 8.0;
const STEP_TEXT_INDENT: f64 = 40.0;
const CONNECTOR_THICKNESS: f64 = 2.0;

const BANNER_HEIGHT: f64 = 44.0;

/// Read-only inputs shared by every renderer call for one document.
pub struct RenderContext<'a> {
    pub fonts: &'a FontContext,
    pub text: &'a TextLayout,
    pub theme: &'a StyleTheme,
    pub page_width: f64,
    /// Draw the title band and accent bar.
    pub include_header: bool,
}

pub struct BlockRenderer<'a> {
    ctx: &'a RenderContext<'a>,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(ctx: &'a RenderContext<'a>) -> Self {
        Self { ctx }
    }

    fn theme(&self) -> &StyleTheme {
        self.ctx.theme
    }

    /// Width of the content column for a cursor at `cursor.x`.
    pub fn content_width(&self, cursor: &LayoutCursor) -> f64 {
        let margin = self.theme().spacing.margin;
        (self.ctx.page_width - cursor.x - margin.right).max(0.0)
    }

    fn wrap(
        &self,
        text: &str,
        max_width: f64,
        font: &FontRef,
        size: f64,
        max_lines: usize,
    ) -> Vec<WrappedLine> {
        let (lines, dropped) =
            self.ctx
                .text
                .wrap_capped(self.ctx.fonts, text, max_width, font, size, max_lines);
        if dropped > 0 {
            log::debug!("Dropped {} wrapped line(s) past the {}-line cap", dropped, max_lines);
        }
        lines
    }

    #[allow(clippy::too_many_arguments)]
    fn text_run(
        &self,
        text: &str,
        x: f64,
        y: f64,
        size: f64,
        font: &FontRef,
        color: Color,
        max_width: Option<f64>,
    ) -> RenderPrimitive {
        RenderPrimitive::TextRun {
            text: text.to_string(),
            x,
            y,
            size,
            font: font.clone(),
            color,
            max_width,
        }
    }

    /// Render one block. `previous` is the fragment rendered for the block
    /// before it in the same section, if any.
    pub fn render(
        &self,
        block: &ContentBlock,
        cursor: &LayoutCursor,
        previous: Option<&Fragment>,
    ) -> Vec<Fragment> {
        match block {
            ContentBlock::Title { text } => vec![self.title(text, cursor)],
            ContentBlock::KeyConcept { .. } => {
                vec![self.concept_row(std::slice::from_ref(block), cursor)]
            }
            ContentBlock::SummarySection { heading, points } => {
                self.summary_section(heading, points, cursor)
            }
            ContentBlock::ProcessStep {
                step_number,
                title,
                description,
            } => vec![self.process_step(*step_number, title, description, cursor, previous)],
            ContentBlock::RawText { text } => self.raw_text(text, cursor),
        }
    }

    /// Accent bar, background band and the bold title.
    pub fn title(&self, text: &str, cursor: &LayoutCursor) -> Fragment {
        let theme = self.theme();
        let ty = &theme.typography;
        let palette = &theme.palette;
        let width = self.content_width(cursor);
        let line_height = ty.title_size * 1.2;

        let lines = self.wrap(text, width, &ty.title_font, ty.title_size, MAX_TITLE_LINES);
        let text_height = lines.len() as f64 * line_height;
        let band_bottom = text_height + TITLE_BAND_PADDING;
        let mut fragment = Fragment::new(band_bottom);

        let text_color = if self.ctx.include_header {
            // The band starts at the page edge, above the cursor.
            let band_top = -cursor.y;
            let band_height = band_bottom - band_top;
            if theme.decorations.gradients {
                let step = band_height / GRADIENT_STEPS as f64;
                for i in 0..GRADIENT_STEPS {
                    let t = i as f64 / (GRADIENT_STEPS - 1) as f64;
                    fragment.push(RenderPrimitive::FilledRect {
                        x: 0.0,
                        y: band_top + i as f64 * step,
                        width: self.ctx.page_width,
                        height: step,
                        fill: palette.primary.mix(palette.accent, t * 0.6),
                        border_color: None,
                        border_width: None,
                    });
                }
            } else {
                fragment.push(RenderPrimitive::FilledRect {
                    x: 0.0,
                    y: band_top,
                    width: self.ctx.page_width,
                    height: band_height,
                    fill: palette.primary,
                    border_color: None,
                    border_width: None,
                });
            }
            fragment.push(RenderPrimitive::FilledRect {
                x: 0.0,
                y: band_top,
                width: self.ctx.page_width,
                height: ACCENT_BAR_HEIGHT,
                fill: palette.accent,
                border_color: None,
                border_width: None,
            });
            Color::WHITE
        } else {
            palette.primary
        };

        for (i, line) in lines.iter().enumerate() {
            fragment.push(self.text_run(
                &line.text,
                cursor.x,
                i as f64 * line_height + ty.title_size * 0.9,
                ty.title_size,
                &ty.title_font,
                text_color,
                Some(width),
            ));
        }

        fragment
    }

    /// A section heading that stays with the first fragment after it.
    pub fn section_label(&self, label: &str, cursor: &LayoutCursor) -> Fragment {
        let theme = self.theme();
        let ty = &theme.typography;
        let mut fragment = Fragment::new(ty.heading_size * 1.3 + theme.paragraph_gap());
        fragment.keep_with_next = true;

        let mut x = cursor.x;
        if theme.decorations.icons {
            fragment.push(RenderPrimitive::Circle {
                x: x + ICON_RADIUS,
                y: ty.heading_size * 0.65,
                radius: ICON_RADIUS,
                fill: theme.palette.accent,
            });
            x += ICON_RADIUS * 2.0 + 6.0;
        }
        fragment.push(self.text_run(
            label,
            x,
            ty.heading_size,
            ty.heading_size,
            &ty.heading_font,
            theme.palette.primary,
            None,
        ));
        fragment
    }

    /// Height of a concept card. Depends on the theme only, never on the
    /// concept's content.
    pub fn card_height(&self) -> f64 {
        let theme = self.theme();
        CARD_PADDING
            + self.card_header_height()
            + 4.0
            + MAX_DEFINITION_LINES as f64 * theme.line_height()
            + CARD_PADDING * 0.5
    }

    fn card_header_height(&self) -> f64 {
        let title_size = self.theme().typography.body_size + 1.5;
        (BADGE_RADIUS * 2.0).max(title_size * 1.2)
    }

    /// One row of key concept cards, one card per column.
    pub fn concept_row(&self, concepts: &[ContentBlock], cursor: &LayoutCursor) -> Fragment {
        let theme = self.theme();
        let columns = theme.columns();
        let width = self.content_width(cursor);
        let card_width = (width - CARD_GAP * (columns - 1) as f64) / columns as f64;
        let mut fragment = Fragment::new(self.card_height() + theme.paragraph_gap());

        for (slot, block) in concepts.iter().take(columns).enumerate() {
            if let ContentBlock::KeyConcept {
                index,
                title,
                definition,
            } = block
            {
                let x = cursor.x + slot as f64 * (card_width + CARD_GAP);
                self.concept_card(&mut fragment, *index, title, definition, x, card_width);
            }
        }
        fragment
    }

    fn concept_card(
        &self,
        fragment: &mut Fragment,
        index: usize,
        title: &str,
        definition: &str,
        x: f64,
        width: f64,
    ) {
        let theme = self.theme();
        let ty = &theme.typography;
        let palette = &theme.palette;
        let height = self.card_height();

        if theme.decorations.shadows {
            fragment.push(RenderPrimitive::FilledRect {
                x: x + SHADOW_OFFSET,
                y: SHADOW_OFFSET,
                width,
                height,
                fill: palette.text.mix(Color::WHITE, 0.85),
                border_color: None,
                border_width: None,
            });
        }
        let (border_color, border_width) = if theme.decorations.borders {
            (Some(palette.primary), Some(1.0))
        } else {
            (None, None)
        };
        fragment.push(RenderPrimitive::FilledRect {
            x,
            y: 0.0,
            width,
            height,
            fill: palette.secondary,
            border_color,
            border_width,
        });

        // Numbered badge.
        let badge_x = x + CARD_PADDING + BADGE_RADIUS;
        let badge_y = CARD_PADDING + BADGE_RADIUS;
        fragment.push(RenderPrimitive::Circle {
            x: badge_x,
            y: badge_y,
            radius: BADGE_RADIUS,
            fill: palette.primary,
        });
        let number = index.to_string();
        let number_size = ty.body_size * 0.9;
        let number_font = ty.body_font.to_bold();
        let number_width = self.ctx.fonts.measure(&number, &number_font, number_size);
        fragment.push(self.text_run(
            &number,
            badge_x - number_width / 2.0,
            badge_y + number_size * 0.35,
            number_size,
            &number_font,
            Color::WHITE,
            None,
        ));

        // Concept title: first wrapped line only.
        let title_size = ty.body_size + 1.5;
        let title_x = x + CARD_PADDING + BADGE_RADIUS * 2.0 + 8.0;
        let title_width = (x + width - CARD_PADDING - title_x).max(0.0);
        let fallback = format!("Concept {}", index);
        let title = if title.trim().is_empty() {
            fallback.as_str()
        } else {
            title
        };
        if let Some(line) = self
            .wrap(title, title_width, &ty.heading_font, title_size, 1)
            .first()
        {
            fragment.push(self.text_run(
                &line.text,
                title_x,
                badge_y + title_size * 0.35,
                title_size,
                &ty.heading_font,
                palette.text,
                Some(title_width),
            ));
        }

        // Definition: the first few wrapped lines; the rest never shows.
        let text_width = (width - CARD_PADDING * 2.0).max(0.0);
        let first_baseline = CARD_PADDING + self.card_header_height() + 4.0 + ty.body_size;
        let lines = self.wrap(
            definition,
            text_width,
            &ty.body_font,
            ty.body_size,
            MAX_DEFINITION_LINES,
        );
        for (i, line) in lines.iter().enumerate() {
            fragment.push(self.text_run(
                &line.text,
                x + CARD_PADDING,
                first_baseline + i as f64 * theme.line_height(),
                ty.body_size,
                &ty.body_font,
                palette.text,
                Some(text_width),
            ));
        }
    }

    /// Heading bar followed by one fragment per bullet point.
    pub fn summary_section(
        &self,
        heading: &str,
        points: &[String],
        cursor: &LayoutCursor,
    ) -> Vec<Fragment> {
        let theme = self.theme();
        let ty = &theme.typography;
        let palette = &theme.palette;
        let width = self.content_width(cursor);
        let line_height = theme.line_height();

        let heading_size = ty.heading_size * 0.85;
        let bar_height = heading_size + 12.0;
        let mut bar = Fragment::new(bar_height + theme.paragraph_gap());
        bar.keep_with_next = true;
        bar.push(RenderPrimitive::FilledRect {
            x: cursor.x,
            y: 0.0,
            width,
            height: bar_height,
            fill: palette.primary,
            border_color: None,
            border_width: None,
        });
        let mut text_x = cursor.x + 10.0;
        if theme.decorations.icons {
            bar.push(RenderPrimitive::Circle {
                x: cursor.x + 12.0,
                y: bar_height / 2.0,
                radius: ICON_RADIUS,
                fill: Color::WHITE,
            });
            text_x = cursor.x + 24.0;
        }
        let heading = if heading.trim().is_empty() {
            "Summary"
        } else {
            heading
        };
        bar.push(self.text_run(
            heading,
            text_x,
            bar_height / 2.0 + heading_size * 0.35,
            heading_size,
            &ty.heading_font,
            Color::WHITE,
            Some(cursor.x + width - text_x),
        ));

        let mut fragments = vec![bar];
        let text_width = (width - BULLET_INDENT).max(0.0);
        for point in points {
            let lines = self.wrap(
                point,
                text_width,
                &ty.body_font,
                ty.body_size,
                MAX_POINT_LINES,
            );
            if lines.is_empty() {
                continue;
            }

            let mut fragment =
                Fragment::new(lines.len() as f64 * line_height + theme.paragraph_gap() * 0.5);
            fragment.push(RenderPrimitive::Circle {
                x: cursor.x + BULLET_RADIUS + 3.0,
                y: ty.body_size * 0.65,
                radius: BULLET_RADIUS,
                fill: palette.accent,
            });
            for (i, line) in lines.iter().enumerate() {
                fragment.push(self.text_run(
                    &line.text,
                    cursor.x + BULLET_INDENT,
                    ty.body_size + i as f64 * line_height,
                    ty.body_size,
                    &ty.body_font,
                    palette.text,
                    Some(text_width),
                ));
            }
            fragments.push(fragment);
        }

        // A heading without points has nothing to stay with.
        if fragments.len() == 1 {
            fragments[0].keep_with_next = false;
        }
        fragments
    }

    /// A numbered process step, joined to the previous step by a connector.
    pub fn process_step(
        &self,
        step_number: u32,
        title: &str,
        description: &str,
        cursor: &LayoutCursor,
        previous: Option<&Fragment>,
    ) -> Fragment {
        let theme = self.theme();
        let ty = &theme.typography;
        let palette = &theme.palette;
        let width = self.content_width(cursor);
        let line_height = theme.line_height();

        let circle_x = cursor.x + STEP_RADIUS;
        let circle_y = STEP_TOP_PADDING + STEP_RADIUS;
        let circle_bottom = STEP_TOP_PADDING + STEP_RADIUS * 2.0;

        let title_size = ty.body_size + 1.0;
        let title_baseline = STEP_TOP_PADDING + title_size;
        let text_x = cursor.x + STEP_TEXT_INDENT;
        let text_width = (width - STEP_TEXT_INDENT).max(0.0);

        let lines = self.wrap(
            description,
            text_width,
            &ty.body_font,
            ty.body_size,
            MAX_STEP_LINES,
        );
        let text_bottom = title_baseline + lines.len() as f64 * line_height + ty.body_size * 0.3;
        let mut fragment = Fragment::new(circle_bottom.max(text_bottom) + theme.paragraph_gap());

        if let Some(prev) = previous {
            // From the previous circle's bottom edge down to this circle's top.
            fragment.joins_previous.push(RenderPrimitive::Line {
                from: Point::new(circle_x, circle_bottom - prev.height),
                to: Point::new(circle_x, STEP_TOP_PADDING),
                thickness: CONNECTOR_THICKNESS,
                color: palette.accent,
            });
        }

        fragment.push(RenderPrimitive::Circle {
            x: circle_x,
            y: circle_y,
            radius: STEP_RADIUS,
            fill: palette.primary,
        });
        let number = step_number.to_string();
        let number_font = ty.body_font.to_bold();
        let number_width = self.ctx.fonts.measure(&number, &number_font, ty.body_size);
        fragment.push(self.text_run(
            &number,
            circle_x - number_width / 2.0,
            circle_y + ty.body_size * 0.35,
            ty.body_size,
            &number_font,
            Color::WHITE,
            None,
        ));

        let fallback = format!("Step {}", step_number);
        let title = if title.trim().is_empty() {
            fallback.as_str()
        } else {
            title
        };
        if let Some(line) = self
            .wrap(title, text_width, &ty.heading_font, title_size, 1)
            .first()
        {
            fragment.push(self.text_run(
                &line.text,
                text_x,
                title_baseline,
                title_size,
                &ty.heading_font,
                palette.text,
                Some(text_width),
            ));
        }

        for (i, line) in lines.iter().enumerate() {
            fragment.push(self.text_run(
                &line.text,
                text_x,
                title_baseline + (i + 1) as f64 * line_height,
                ty.body_size,
                &ty.body_font,
                palette.text,
                Some(text_width),
            ));
        }

        fragment
    }

    /// The unprocessed original content, one fragment per line.
    pub fn raw_text(&self, text: &str, cursor: &LayoutCursor) -> Vec<Fragment> {
        let theme = self.theme();
        let ty = &theme.typography;
        let width = self.content_width(cursor);
        let line_height = theme.line_height();

        let lines = self.wrap(text, width, &ty.body_font, ty.body_size, MAX_RAW_LINES);
        if lines.is_empty() {
            let mut fragment = Fragment::new(line_height);
            fragment.push(self.text_run(
                EMPTY_CONTENT_TEXT,
                cursor.x,
                ty.body_size,
                ty.body_size,
                &ty.body_font,
                theme.palette.muted,
                Some(width),
            ));
            return vec![fragment];
        }

        lines
            .iter()
            .map(|line| {
                let mut fragment = Fragment::new(line_height);
                fragment.push(self.text_run(
                    &line.text,
                    cursor.x,
                    ty.body_size,
                    ty.body_size,
                    &ty.body_font,
                    theme.palette.text,
                    Some(width),
                ));
                fragment
            })
            .collect()
    }

    /// Closing band that summarises what the sheet contains.
    pub fn feature_banner(
        &self,
        concepts: usize,
        sections: usize,
        steps: usize,
        cursor: &LayoutCursor,
    ) -> Fragment {
        let theme = self.theme();
        let ty = &theme.typography;
        let palette = &theme.palette;
        let width = self.content_width(cursor);
        let mut fragment = Fragment::new(BANNER_HEIGHT + theme.paragraph_gap());

        let (border_color, border_width) = if theme.decorations.borders {
            (Some(palette.primary), Some(1.0))
        } else {
            (None, None)
        };
        fragment.push(RenderPrimitive::FilledRect {
            x: cursor.x,
            y: 0.0,
            width,
            height: BANNER_HEIGHT,
            fill: palette.secondary,
            border_color,
            border_width,
        });

        let items = [
            (concepts, "Key Concept", "Key Concepts", palette.primary),
            (sections, "Summary Section", "Summary Sections", palette.accent),
            (
                steps,
                "Process Step",
                "Process Steps",
                palette.primary.mix(palette.accent, 0.5),
            ),
        ];
        let slot_width = width / items.len() as f64;
        let label_font = ty.body_font.to_bold();
        for (i, (count, singular, plural, color)) in items.iter().enumerate() {
            let slot_x = cursor.x + i as f64 * slot_width;
            fragment.push(RenderPrimitive::Circle {
                x: slot_x + 14.0,
                y: BANNER_HEIGHT / 2.0,
                radius: 6.0,
                fill: *color,
            });
            let label = format!("{} {}", count, if *count == 1 { singular } else { plural });
            fragment.push(self.text_run(
                &label,
                slot_x + 26.0,
                BANNER_HEIGHT / 2.0 + ty.caption_size * 0.35,
                ty.caption_size,
                &label_font,
                palette.text,
                Some((slot_width - 30.0).max(0.0)),
            ));
        }
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeResolver;

    struct Fixture {
        fonts: FontContext,
        text: TextLayout,
        theme: StyleTheme,
    }

    impl Fixture {
        fn new(theme_id: &str) -> Self {
            Self {
                fonts: FontContext::new(),
                text: TextLayout::new(),
                theme: ThemeResolver::default().resolve(theme_id, "blue"),
            }
        }

        fn ctx(&self) -> RenderContext<'_> {
            RenderContext {
                fonts: &self.fonts,
                text: &self.text,
                theme: &self.theme,
                page_width: 595.28,
                include_header: true,
            }
        }

        fn cursor(&self) -> LayoutCursor {
            let margin = self.theme.spacing.margin;
            LayoutCursor {
                x: margin.left,
                y: margin.top,
                page_index: 0,
                remaining_height: 700.0,
            }
        }
    }

    fn count<F: Fn(&RenderPrimitive) -> bool>(fragment: &Fragment, f: F) -> usize {
        fragment.primitives.iter().filter(|p| f(p)).count()
    }

    fn texts(fragment: &Fragment) -> Vec<&str> {
        fragment.primitives.iter().filter_map(|p| p.text()).collect()
    }

    fn concept(index: usize, title: &str, definition: &str) -> ContentBlock {
        ContentBlock::KeyConcept {
            index,
            title: title.to_string(),
            definition: definition.to_string(),
        }
    }

    #[test]
    fn title_has_band_accent_and_text() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let cursor = fx.cursor();
        let f = BlockRenderer::new(&ctx).title("Cell Biology", &cursor);
        assert_eq!(texts(&f), vec!["Cell Biology"]);
        assert_eq!(count(&f, |p| matches!(p, RenderPrimitive::FilledRect { .. })), 2);
        // Band reaches the top page edge once translated by the cursor.
        let top = f
            .primitives
            .iter()
            .map(|p| p.vertical_extent().0)
            .fold(f64::INFINITY, f64::min);
        assert!((top + cursor.y).abs() < 1e-9);
    }

    #[test]
    fn title_without_header_is_plain_text() {
        let fx = Fixture::new("modern");
        let mut ctx = fx.ctx();
        ctx.include_header = false;
        let f = BlockRenderer::new(&ctx).title("Cell Biology", &fx.cursor());
        assert_eq!(f.primitives.len(), 1);
        assert!(matches!(
            &f.primitives[0],
            RenderPrimitive::TextRun { color, .. } if *color == fx.theme.palette.primary
        ));
    }

    #[test]
    fn gradient_band_is_stepped() {
        let fx = Fixture::new("vibrant");
        let ctx = fx.ctx();
        let f = BlockRenderer::new(&ctx).title("Waves", &fx.cursor());
        let rects = count(&f, |p| matches!(p, RenderPrimitive::FilledRect { .. }));
        assert_eq!(rects, GRADIENT_STEPS + 1);
    }

    #[test]
    fn long_title_capped_at_two_lines() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let title = "An Exceptionally Long Title ".repeat(10);
        let f = BlockRenderer::new(&ctx).title(&title, &fx.cursor());
        assert_eq!(texts(&f).len(), MAX_TITLE_LINES);
    }

    #[test]
    fn card_height_ignores_content() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let r = BlockRenderer::new(&ctx);
        let short = r.concept_row(&[concept(1, "A", "short")], &fx.cursor());
        let long = r.concept_row(&[concept(1, "A", &"word ".repeat(500))], &fx.cursor());
        assert_eq!(short.height, long.height);
    }

    #[test]
    fn card_draws_at_most_three_definition_lines() {
        let fx = Fixture::new("minimal");
        let ctx = fx.ctx();
        let f = BlockRenderer::new(&ctx).concept_row(
            &[concept(4, "Entropy", &"disorder ".repeat(300))],
            &fx.cursor(),
        );
        // badge number + title + 3 definition lines
        let t = texts(&f);
        assert_eq!(t.len(), 2 + MAX_DEFINITION_LINES);
        assert_eq!(t[0], "4");
        assert_eq!(t[1], "Entropy");
        assert_eq!(count(&f, |p| matches!(p, RenderPrimitive::Circle { .. })), 1);
    }

    #[test]
    fn card_content_stays_inside_card() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let r = BlockRenderer::new(&ctx);
        let f = r.concept_row(&[concept(1, "A", &"word ".repeat(100))], &fx.cursor());
        for p in &f.primitives {
            let (top, bottom) = p.vertical_extent();
            assert!(top >= 0.0);
            assert!(bottom <= r.card_height() + SHADOW_OFFSET + 1e-9);
        }
    }

    #[test]
    fn blank_concept_title_gets_placeholder() {
        let fx = Fixture::new("minimal");
        let ctx = fx.ctx();
        let f = BlockRenderer::new(&ctx).concept_row(&[concept(2, "  ", "d")], &fx.cursor());
        assert!(texts(&f).contains(&"Concept 2"));
    }

    #[test]
    fn two_column_row_places_cards_side_by_side() {
        let fx = Fixture::new("academic");
        assert_eq!(fx.theme.columns(), 2);
        let ctx = fx.ctx();
        let f = BlockRenderer::new(&ctx).concept_row(
            &[concept(1, "Left", "a"), concept(2, "Right", "b")],
            &fx.cursor(),
        );
        let xs: Vec<f64> = f
            .primitives
            .iter()
            .filter_map(|p| match p {
                RenderPrimitive::Circle { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs.len(), 2);
        assert!(xs[1] > xs[0] + 100.0);
    }

    #[test]
    fn shadow_and_border_follow_decorations() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let f = BlockRenderer::new(&ctx).concept_row(&[concept(1, "A", "b")], &fx.cursor());
        // modern: shadow, no border
        let rects: Vec<&RenderPrimitive> = f
            .primitives
            .iter()
            .filter(|p| matches!(p, RenderPrimitive::FilledRect { .. }))
            .collect();
        assert_eq!(rects.len(), 2);
        assert!(matches!(rects[1], RenderPrimitive::FilledRect { border_color: None, .. }));

        let fx = Fixture::new("classic");
        let ctx = fx.ctx();
        let f = BlockRenderer::new(&ctx).concept_row(&[concept(1, "A", "b")], &fx.cursor());
        let rects: Vec<&RenderPrimitive> = f
            .primitives
            .iter()
            .filter(|p| matches!(p, RenderPrimitive::FilledRect { .. }))
            .collect();
        assert_eq!(rects.len(), 1);
        assert!(matches!(
            rects[0],
            RenderPrimitive::FilledRect { border_width: Some(_), .. }
        ));
    }

    #[test]
    fn summary_section_bullets_and_caps() {
        let fx = Fixture::new("minimal");
        let ctx = fx.ctx();
        let points = vec![
            "Short point".to_string(),
            "   ".to_string(),
            "long ".repeat(200),
        ];
        let frags = BlockRenderer::new(&ctx).summary_section("Overview", &points, &fx.cursor());
        // heading + two non-blank points
        assert_eq!(frags.len(), 3);
        assert!(frags[0].keep_with_next);
        assert_eq!(texts(&frags[0]), vec!["Overview"]);
        assert_eq!(texts(&frags[1]), vec!["Short point"]);
        assert_eq!(texts(&frags[2]).len(), MAX_POINT_LINES);
        for f in &frags[1..] {
            assert_eq!(count(f, |p| matches!(p, RenderPrimitive::Circle { .. })), 1);
        }
    }

    #[test]
    fn summary_lines_advance_by_line_height() {
        let fx = Fixture::new("minimal");
        let ctx = fx.ctx();
        let frags = BlockRenderer::new(&ctx).summary_section(
            "H",
            &["word ".repeat(60)],
            &fx.cursor(),
        );
        let ys: Vec<f64> = frags[1]
            .primitives
            .iter()
            .filter_map(|p| match p {
                RenderPrimitive::TextRun { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        for pair in ys.windows(2) {
            assert!((pair[1] - pair[0] - fx.theme.line_height()).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_summary_heading_does_not_keep_with_next() {
        let fx = Fixture::new("minimal");
        let ctx = fx.ctx();
        let frags = BlockRenderer::new(&ctx).summary_section("", &[], &fx.cursor());
        assert_eq!(frags.len(), 1);
        assert!(!frags[0].keep_with_next);
        assert_eq!(texts(&frags[0]), vec!["Summary"]);
    }

    #[test]
    fn first_step_has_no_connector() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let r = BlockRenderer::new(&ctx);
        let first = r.process_step(1, "Mix", "Combine the reagents", &fx.cursor(), None);
        assert!(first.joins_previous.is_empty());
        assert_eq!(texts(&first), vec!["1", "Mix", "Combine the reagents"]);

        let second = r.process_step(2, "Heat", "", &fx.cursor(), Some(&first));
        assert_eq!(second.joins_previous.len(), 1);
        if let RenderPrimitive::Line { from, to, .. } = &second.joins_previous[0] {
            // Starts at the previous circle's bottom edge.
            let prev_bottom = STEP_TOP_PADDING + 2.0 * STEP_RADIUS;
            assert!((from.y + first.height - prev_bottom).abs() < 1e-9);
            assert_eq!(to.y, STEP_TOP_PADDING);
        } else {
            panic!("connector should be a line");
        }
    }

    #[test]
    fn step_description_capped() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let f = BlockRenderer::new(&ctx).process_step(
            7,
            "",
            &"detail ".repeat(200),
            &fx.cursor(),
            None,
        );
        let t = texts(&f);
        assert_eq!(t[1], "Step 7");
        assert_eq!(t.len(), 2 + MAX_STEP_LINES);
    }

    #[test]
    fn raw_text_capped_and_placeholder() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let r = BlockRenderer::new(&ctx);
        assert_eq!(r.raw_text(&"lorem ipsum ".repeat(2000), &fx.cursor()).len(), MAX_RAW_LINES);

        let empty = r.raw_text("  ", &fx.cursor());
        assert_eq!(empty.len(), 1);
        assert_eq!(texts(&empty[0]), vec![EMPTY_CONTENT_TEXT]);
    }

    #[test]
    fn banner_pluralizes_counts() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let f = BlockRenderer::new(&ctx).feature_banner(1, 0, 3, &fx.cursor());
        assert_eq!(
            texts(&f),
            vec!["1 Key Concept", "0 Summary Sections", "3 Process Steps"]
        );
    }

    #[test]
    fn dispatch_matches_variant() {
        let fx = Fixture::new("modern");
        let ctx = fx.ctx();
        let r = BlockRenderer::new(&ctx);
        let cursor = fx.cursor();
        let frags = r.render(&concept(1, "A", "b"), &cursor, None);
        assert_eq!(frags.len(), 1);
        let frags = r.render(
            &ContentBlock::RawText {
                text: "one two".to_string(),
            },
            &cursor,
            None,
        );
        assert_eq!(texts(&frags[0]), vec!["one two"]);
    }
}
