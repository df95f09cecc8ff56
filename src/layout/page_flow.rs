//! # Page Flow
//!
//! Owns the layout cursor and the pages, and decides what happens when a
//! fragment does not fit in the space left on the current page.
//!
//! Running out of space is never an error. Under [`OverflowPolicy::PageBreak`]
//! a new page is opened; under [`OverflowPolicy::StopAndDrop`] the rest of
//! the current section is skipped and flow resumes with the next section.

use crate::model::OverflowPolicy;
use crate::style::StyleTheme;

use super::{Fragment, Page, RenderPrimitive};

/// Tolerance for floating point comparisons against remaining space.
const EPSILON: f64 = 0.001;

/// Where the next fragment goes. Only [`PageFlow`] ever mutates it; block
/// renderers receive copies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    /// Left edge of the content area.
    pub x: f64,
    /// Top of the next fragment.
    pub y: f64,
    pub page_index: usize,
    pub remaining_height: f64,
}

/// What to do with a fragment about to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDecision {
    /// It fits (or it is alone on a fresh page): place it here.
    Place,
    /// Open a new page and place it at the top.
    NewPage,
    /// Skip it.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Flowing,
    /// Stop-and-drop gave up on the current section.
    Truncated,
}

/// Result of [`PageFlow::before_block`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowOutcome {
    /// The cursor the fragment should be placed at.
    pub cursor: LayoutCursor,
    /// Whether the estimated height exceeded the space that was left.
    pub overflowed: bool,
    pub decision: FlowDecision,
}

/// Decide what to do with a fragment of `estimated_height`.
///
/// `at_page_top` means nothing has been placed on the current page yet.
/// A fragment that does not fit on an empty page is placed there anyway,
/// under either policy.
pub fn decide(
    cursor: &LayoutCursor,
    estimated_height: f64,
    policy: OverflowPolicy,
    at_page_top: bool,
) -> FlowDecision {
    if at_page_top || estimated_height <= cursor.remaining_height + EPSILON {
        return FlowDecision::Place;
    }

    match policy {
        OverflowPolicy::PageBreak => FlowDecision::NewPage,
        OverflowPolicy::StopAndDrop => FlowDecision::Drop,
    }
}

pub struct PageFlow<'a> {
    theme: &'a StyleTheme,
    policy: OverflowPolicy,
    page_width: f64,
    page_height: f64,
    footer_reserve: f64,
    cursor: LayoutCursor,
    state: FlowState,
    pages: Vec<Page>,
    current: Page,
    fragments_on_page: usize,
    /// Page of the last fragment placed in the current section.
    previous_page: Option<usize>,
    dropped: usize,
}

impl<'a> PageFlow<'a> {
    pub fn new(
        theme: &'a StyleTheme,
        page_width: f64,
        page_height: f64,
        policy: OverflowPolicy,
        footer_reserve: f64,
    ) -> Self {
        let mut flow = Self {
            theme,
            policy,
            page_width,
            page_height,
            footer_reserve,
            cursor: LayoutCursor {
                x: 0.0,
                y: 0.0,
                page_index: 0,
                remaining_height: 0.0,
            },
            state: FlowState::Flowing,
            pages: Vec::new(),
            current: Page {
                index: 0,
                width: page_width,
                height: page_height,
                primitives: Vec::new(),
            },
            fragments_on_page: 0,
            previous_page: None,
            dropped: 0,
        };
        flow.open_page(0);
        flow
    }

    /// A snapshot of the cursor.
    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Number of fragments skipped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Height available for content on an empty page.
    pub fn page_capacity(&self) -> f64 {
        let margin = self.theme.spacing.margin;
        (self.page_height - margin.vertical() - self.footer_reserve).max(0.0)
    }

    /// Start a new section: a truncated flow resumes.
    pub fn begin_section(&mut self) {
        self.state = FlowState::Flowing;
        self.previous_page = None;
    }

    /// Check `estimated_height` against the remaining space and apply the
    /// overflow policy. Opens a new page when the decision calls for it.
    pub fn before_block(&mut self, estimated_height: f64) -> FlowOutcome {
        let overflowed = estimated_height > self.cursor.remaining_height + EPSILON;

        if self.state == FlowState::Truncated {
            return FlowOutcome {
                cursor: self.cursor,
                overflowed,
                decision: FlowDecision::Drop,
            };
        }

        let decision = decide(
            &self.cursor,
            estimated_height,
            self.policy,
            self.fragments_on_page == 0,
        );
        match decision {
            FlowDecision::Place => {}
            FlowDecision::NewPage => {
                log::debug!(
                    "Page {} full ({:.1}pt left, {:.1}pt needed), breaking",
                    self.cursor.page_index + 1,
                    self.cursor.remaining_height,
                    estimated_height
                );
                self.break_page();
            }
            FlowDecision::Drop => {
                log::debug!(
                    "Page {} full ({:.1}pt left, {:.1}pt needed), truncating section",
                    self.cursor.page_index + 1,
                    self.cursor.remaining_height,
                    estimated_height
                );
                self.state = FlowState::Truncated;
            }
        }

        FlowOutcome {
            cursor: self.cursor,
            overflowed,
            decision,
        }
    }

    /// Place a fragment at the cursor and advance past it.
    pub fn place(&mut self, fragment: Fragment) {
        let dy = self.cursor.y;
        let joined = self.previous_page == Some(self.cursor.page_index);

        if joined {
            for mut primitive in fragment.joins_previous {
                primitive.offset_y(dy);
                self.current.primitives.push(primitive);
            }
        }
        for mut primitive in fragment.primitives {
            primitive.offset_y(dy);
            self.current.primitives.push(primitive);
        }

        self.cursor.y += fragment.height;
        self.cursor.remaining_height = (self.cursor.remaining_height - fragment.height).max(0.0);
        self.fragments_on_page += 1;
        self.previous_page = Some(self.cursor.page_index);
    }

    /// Flow a section's fragments. A fragment flagged `keep_with_next` is
    /// measured together with its successor. Returns how many were placed.
    pub fn place_all(&mut self, fragments: Vec<Fragment>) -> usize {
        let heights: Vec<f64> = fragments.iter().map(|f| f.height).collect();
        let mut placed = 0;

        for (i, fragment) in fragments.into_iter().enumerate() {
            let mut estimated = fragment.height;
            if fragment.keep_with_next {
                estimated += heights.get(i + 1).copied().unwrap_or(0.0);
            }
            // A pair taller than a page cannot be kept together.
            if estimated > self.page_capacity() {
                estimated = fragment.height;
            }

            match self.before_block(estimated).decision {
                FlowDecision::Drop => self.dropped += 1,
                FlowDecision::Place | FlowDecision::NewPage => {
                    self.place(fragment);
                    placed += 1;
                }
            }
        }

        placed
    }

    /// Leave up to `gap` points of empty space below the last fragment.
    /// The gap is clamped to what is left, so it never breaks a page or
    /// drops content.
    pub fn advance(&mut self, gap: f64) {
        let gap = gap.clamp(0.0, self.cursor.remaining_height);
        self.cursor.y += gap;
        self.cursor.remaining_height -= gap;
    }

    /// Close the last page and return all pages.
    pub fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }

    fn break_page(&mut self) {
        let next = self.cursor.page_index + 1;
        let finished = std::mem::replace(
            &mut self.current,
            Page {
                index: next,
                width: self.page_width,
                height: self.page_height,
                primitives: Vec::new(),
            },
        );
        self.pages.push(finished);
        self.open_page(next);
    }

    /// Reset the cursor to the top margin and paint the page background.
    fn open_page(&mut self, index: usize) {
        let margin = self.theme.spacing.margin;
        self.cursor = LayoutCursor {
            x: margin.left,
            y: margin.top,
            page_index: index,
            remaining_height: self.page_capacity(),
        };
        self.fragments_on_page = 0;

        let palette = &self.theme.palette;
        self.current.primitives.push(RenderPrimitive::FilledRect {
            x: 0.0,
            y: 0.0,
            width: self.page_width,
            height: self.page_height,
            fill: palette.background,
            border_color: None,
            border_width: None,
        });

        if self.theme.decorations.patterns {
            let dot = palette.secondary.mix(palette.accent, 0.35);
            let origin_x = self.page_width - 12.0;
            let origin_y = self.page_height - 12.0;
            for row in 0..4 {
                for col in 0..(4 - row) {
                    self.current.primitives.push(RenderPrimitive::Circle {
                        x: origin_x - col as f64 * 9.0,
                        y: origin_y - row as f64 * 9.0,
                        radius: 1.5,
                        fill: dot,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeResolver;

    fn cursor(remaining: f64) -> LayoutCursor {
        LayoutCursor {
            x: 50.0,
            y: 100.0,
            page_index: 0,
            remaining_height: remaining,
        }
    }

    fn block(height: f64) -> Fragment {
        let mut f = Fragment::new(height);
        f.push(RenderPrimitive::FilledRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height,
            fill: crate::style::Color::BLACK,
            border_color: None,
            border_width: None,
        });
        f
    }

    fn theme() -> StyleTheme {
        ThemeResolver::default().resolve("minimal", "gray")
    }

    #[test]
    fn fits_is_placed() {
        for policy in [OverflowPolicy::PageBreak, OverflowPolicy::StopAndDrop] {
            assert_eq!(decide(&cursor(100.0), 60.0, policy, false), FlowDecision::Place);
            assert_eq!(decide(&cursor(100.0), 100.0, policy, false), FlowDecision::Place);
        }
    }

    #[test]
    fn overflow_follows_policy() {
        assert_eq!(
            decide(&cursor(50.0), 60.0, OverflowPolicy::PageBreak, false),
            FlowDecision::NewPage
        );
        assert_eq!(
            decide(&cursor(50.0), 60.0, OverflowPolicy::StopAndDrop, false),
            FlowDecision::Drop
        );
    }

    #[test]
    fn oversized_on_fresh_page_is_placed() {
        for policy in [OverflowPolicy::PageBreak, OverflowPolicy::StopAndDrop] {
            assert_eq!(
                decide(&cursor(50.0), 500.0, policy, true),
                FlowDecision::Place
            );
        }
    }

    #[test]
    fn stop_and_drop_keeps_oversized_first_fragment() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::StopAndDrop, 0.0);
        let capacity = flow.page_capacity();

        assert_eq!(flow.place_all(vec![block(capacity + 50.0)]), 1);
        assert_eq!(flow.dropped(), 0);
        assert_eq!(flow.state(), FlowState::Flowing);
        assert_eq!(flow.cursor().remaining_height, 0.0);
        assert_eq!(flow.finish().len(), 1);
    }

    #[test]
    fn advance_is_clamped_to_remaining_space() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::PageBreak, 0.0);
        let capacity = flow.page_capacity();
        flow.place(block(capacity - 4.0));

        let before = flow.cursor();
        flow.advance(18.0);
        let after = flow.cursor();
        assert_eq!(after.page_index, 0);
        assert_eq!(after.remaining_height, 0.0);
        assert!((after.y - before.y - 4.0).abs() < 1e-9);

        flow.advance(18.0);
        assert_eq!(flow.cursor(), after);
        assert_eq!(flow.dropped(), 0);
        assert_eq!(flow.finish().len(), 1);
    }

    #[test]
    fn advance_leaves_gap_before_next_fragment() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::PageBreak, 0.0);
        let top = flow.cursor().y;
        flow.place(block(10.0));
        flow.advance(6.0);
        flow.place(block(10.0));
        let pages = flow.finish();
        assert_eq!(pages[0].primitives[2].vertical_extent().0, top + 16.0);
    }

    #[test]
    fn page_break_resets_cursor_to_top_margin() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::PageBreak, 0.0);
        let capacity = flow.page_capacity();
        flow.place(block(capacity - 10.0));

        let outcome = flow.before_block(40.0);
        assert!(outcome.overflowed);
        assert_eq!(outcome.decision, FlowDecision::NewPage);
        assert_eq!(outcome.cursor.page_index, 1);
        assert_eq!(outcome.cursor.y, theme.spacing.margin.top);
        assert_eq!(outcome.cursor.remaining_height, capacity);

        flow.place(block(40.0));
        assert_eq!(flow.finish().len(), 2);
    }

    #[test]
    fn remaining_height_never_negative() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::PageBreak, 0.0);
        let n = flow.place_all(vec![block(10_000.0), block(20.0)]);
        assert_eq!(n, 2);
        assert!(flow.cursor().remaining_height >= 0.0);
        assert_eq!(flow.cursor().page_index, 1);
    }

    #[test]
    fn stop_and_drop_skips_rest_of_section_only() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::StopAndDrop, 0.0);
        let capacity = flow.page_capacity();

        let placed = flow.place_all(vec![block(capacity - 30.0), block(40.0), block(5.0)]);
        assert_eq!(placed, 1);
        assert_eq!(flow.state(), FlowState::Truncated);
        assert_eq!(flow.dropped(), 2);

        flow.begin_section();
        assert_eq!(flow.state(), FlowState::Flowing);
        assert_eq!(flow.place_all(vec![block(20.0)]), 1);

        let pages = flow.finish();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn keep_with_next_moves_pair_together() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::PageBreak, 0.0);
        let capacity = flow.page_capacity();
        flow.place(block(capacity - 30.0));

        let mut label = block(20.0);
        label.keep_with_next = true;
        flow.place_all(vec![label, block(20.0)]);

        let pages = flow.finish();
        assert_eq!(pages.len(), 2);
        // Page 2 holds its background plus both fragments.
        assert_eq!(pages[1].primitives.len(), 3);
    }

    #[test]
    fn joins_previous_dropped_after_page_break() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::PageBreak, 0.0);
        let capacity = flow.page_capacity();

        let mut second = block(capacity - 5.0);
        second.joins_previous.push(RenderPrimitive::Line {
            from: crate::layout::Point::new(0.0, -10.0),
            to: crate::layout::Point::new(0.0, 0.0),
            thickness: 1.0,
            color: crate::style::Color::BLACK,
        });
        let mut third = block(10.0);
        third.joins_previous = second.joins_previous.clone();

        flow.place_all(vec![block(20.0), second, third]);
        let pages = flow.finish();
        assert_eq!(pages.len(), 3);
        let lines = |p: &Page| {
            p.primitives
                .iter()
                .filter(|x| matches!(x, RenderPrimitive::Line { .. }))
                .count()
        };
        assert_eq!(lines(&pages[1]), 0);
        assert_eq!(lines(&pages[2]), 0);
    }

    #[test]
    fn placed_primitives_are_translated() {
        let theme = theme();
        let mut flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::PageBreak, 0.0);
        let top = flow.cursor().y;
        flow.place(block(10.0));
        flow.place(block(10.0));
        let pages = flow.finish();
        let tops: Vec<f64> = pages[0].primitives[1..]
            .iter()
            .map(|p| p.vertical_extent().0)
            .collect();
        assert_eq!(tops, vec![top, top + 10.0]);
    }

    #[test]
    fn patterns_add_corner_dots() {
        let theme = ThemeResolver::default().resolve("vibrant", "blue");
        assert!(theme.decorations.patterns);
        let flow = PageFlow::new(&theme, 400.0, 300.0, OverflowPolicy::PageBreak, 0.0);
        let pages = flow.finish();
        let dots = pages[0]
            .primitives
            .iter()
            .filter(|p| matches!(p, RenderPrimitive::Circle { .. }))
            .count();
        assert_eq!(dots, 10);
    }
}
