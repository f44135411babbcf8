//! Text layout for the overlay box.
//!
//! Layout is a pure function of the image size, the text, the options and a
//! [`TextMeasurer`]. The quote starts at `font_scale * width` pixels and
//! shrinks by [`SHRINK_STEP`] until the box fits inside the image minus the
//! vertical margins. If it still does not fit at the minimum size, trailing
//! lines are dropped and the last kept line ends with [`ELLIPSIS`].

use super::overlay_box::OverlayBox;
use super::position::BoxAnchor;
use super::render_options::RenderOptions;
use super::text_overlay::QuoteText;

/// Attribution size relative to the quote size.
pub const ATTRIBUTION_SCALE: f32 = 0.7;
/// Inner padding of the box relative to the quote size.
pub const PADDING_SCALE: f32 = 0.75;
/// Space between quote and attribution, in quote line heights.
pub const ATTRIBUTION_GAP: f32 = 0.5;
pub const SHRINK_STEP: f32 = 0.9;
/// Vertical margin kept free above and below the box, relative to the image height.
pub const MARGIN_RATIO: f32 = 0.05;
pub const ELLIPSIS: &str = "…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Quote,
    Attribution,
}

pub trait TextMeasurer {
    /// Advance width of `text` in pixels.
    fn text_width(&self, text: &str, px: f32, style: TextStyle) -> f32;
    /// Distance between two consecutive baselines in pixels.
    fn line_height(&self, px: f32, style: TextStyle) -> f32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: TextStyle,
    pub px: f32,
    /// Top-left corner of the line box.
    pub x: i32,
    pub y: i32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub overlay_box: OverlayBox,
    pub lines: Vec<PlacedLine>,
    pub quote_px: f32,
    pub truncated: bool,
}

impl TextLayout {
    pub fn quote_line_count(&self) -> usize {
        self.lines.iter().filter(|l| l.style == TextStyle::Quote).count()
    }

    pub fn attribution_line_count(&self) -> usize {
        self.lines.iter().filter(|l| l.style == TextStyle::Attribution).count()
    }
}

struct Block {
    quote_px: f32,
    padding: f32,
    inner_width: f32,
    quote_lines: Vec<String>,
    quote_line_height: f32,
    attribution_px: f32,
    attribution_lines: Vec<String>,
    attribution_line_height: f32,
}

impl Block {
    /// Wraps only as many lines as `max_height` can hold plus one, which is
    /// enough to tell that the block overflows.
    fn measure(text: &QuoteText, px: f32, box_width: u32, max_height: f32, measurer: &dyn TextMeasurer) -> Self {
        let padding = px * PADDING_SCALE;
        let inner_width = (box_width as f32 - 2.0 * padding).max(1.0);
        let attribution_px = px * ATTRIBUTION_SCALE;
        let quote_line_height = measurer.line_height(px, TextStyle::Quote);
        let attribution_line_height = measurer.line_height(attribution_px, TextStyle::Attribution);

        let quote_lines = wrap(
            text.quote(),
            px,
            TextStyle::Quote,
            inner_width,
            line_capacity(max_height, quote_line_height),
            measurer,
        );
        let attribution_lines = text
            .attribution()
            .map(|a| {
                wrap(
                    a,
                    attribution_px,
                    TextStyle::Attribution,
                    inner_width,
                    line_capacity(max_height, attribution_line_height),
                    measurer,
                )
            })
            .unwrap_or_default();

        Self {
            quote_px: px,
            padding,
            inner_width,
            quote_lines,
            quote_line_height,
            attribution_px,
            attribution_lines,
            attribution_line_height,
        }
    }

    fn attribution_height(&self) -> f32 {
        if self.attribution_lines.is_empty() {
            0.0
        } else {
            self.quote_line_height * ATTRIBUTION_GAP
                + self.attribution_lines.len() as f32 * self.attribution_line_height
        }
    }

    fn height(&self) -> f32 {
        2.0 * self.padding
            + self.quote_lines.len() as f32 * self.quote_line_height
            + self.attribution_height()
    }

    /// Drops lines until the block fits in `max_height`. Returns true if anything was cut.
    fn truncate_to(&mut self, max_height: f32, measurer: &dyn TextMeasurer) -> bool {
        let mut truncated = false;

        let quote_budget = max_height - 2.0 * self.padding - self.attribution_height();
        let max_quote_lines = ((quote_budget / self.quote_line_height).floor() as usize).max(1);
        if self.quote_lines.len() > max_quote_lines {
            self.quote_lines.truncate(max_quote_lines);
            end_with_ellipsis(&mut self.quote_lines, self.quote_px, TextStyle::Quote, self.inner_width, measurer);
            truncated = true;
        }

        if self.height() > max_height && !self.attribution_lines.is_empty() {
            let budget = max_height
                - 2.0 * self.padding
                - self.quote_lines.len() as f32 * self.quote_line_height
                - self.quote_line_height * ATTRIBUTION_GAP;
            let max_lines = ((budget / self.attribution_line_height).floor() as usize).max(1);
            if self.attribution_lines.len() > max_lines {
                self.attribution_lines.truncate(max_lines);
                end_with_ellipsis(
                    &mut self.attribution_lines,
                    self.attribution_px,
                    TextStyle::Attribution,
                    self.inner_width,
                    measurer,
                );
                truncated = true;
            }
        }

        truncated
    }
}

fn line_capacity(max_height: f32, line_height: f32) -> usize {
    if line_height > 0.0 {
        (max_height / line_height).floor() as usize
    } else {
        usize::MAX - 1
    }
}

pub fn plan(
    image_width: u32,
    image_height: u32,
    text: &QuoteText,
    options: &RenderOptions,
    measurer: &dyn TextMeasurer,
) -> TextLayout {
    let box_width = OverlayBox::box_width_for(image_width);
    let box_x = (image_width - box_width) / 2;
    let margin = (image_height as f32 * MARGIN_RATIO).floor() as u32;
    let max_height = image_height.saturating_sub(2 * margin) as f32;

    // 小さすぎる画像では最小サイズも下げる
    let min_px = options.min_font_px.min(image_height as f32 / 4.0).max(1.0);
    let mut px = (image_width as f32 * options.font_scale).max(min_px);

    let mut block = Block::measure(text, px, box_width, max_height, measurer);
    while block.height() > max_height && px > min_px {
        px = (px * SHRINK_STEP).max(min_px);
        block = Block::measure(text, px, box_width, max_height, measurer);
    }

    let truncated = block.height() > max_height && block.truncate_to(max_height, measurer);

    let box_height = (block.height().ceil() as u32).min(image_height);
    let free = image_height - box_height;
    let box_y = match options.anchor {
        BoxAnchor::Top => margin.min(free),
        BoxAnchor::Center => free / 2,
        BoxAnchor::Bottom => free.saturating_sub(margin),
    };
    let overlay_box = OverlayBox {
        x: box_x,
        y: box_y,
        width: box_width,
        height: box_height,
    };

    let lines = place_lines(&block, &overlay_box, measurer);

    TextLayout {
        overlay_box,
        lines,
        quote_px: block.quote_px,
        truncated,
    }
}

fn place_lines(block: &Block, overlay_box: &OverlayBox, measurer: &dyn TextMeasurer) -> Vec<PlacedLine> {
    let mut lines = Vec::with_capacity(block.quote_lines.len() + block.attribution_lines.len());
    let mut cursor = overlay_box.y as f32 + block.padding;

    // 引用は中央揃え
    for text in &block.quote_lines {
        let width = measurer.text_width(text, block.quote_px, TextStyle::Quote);
        let x = overlay_box.x as f32 + (overlay_box.width as f32 - width) / 2.0;
        lines.push(PlacedLine {
            text: text.clone(),
            style: TextStyle::Quote,
            px: block.quote_px,
            x: x.floor() as i32,
            y: cursor.floor() as i32,
            height: block.quote_line_height.floor() as u32,
        });
        cursor += block.quote_line_height;
    }

    if block.attribution_lines.is_empty() {
        return lines;
    }
    cursor += block.quote_line_height * ATTRIBUTION_GAP;

    // 署名は右揃え
    let right_edge = (overlay_box.x + overlay_box.width) as f32 - block.padding;
    for text in &block.attribution_lines {
        let width = measurer.text_width(text, block.attribution_px, TextStyle::Attribution);
        lines.push(PlacedLine {
            text: text.clone(),
            style: TextStyle::Attribution,
            px: block.attribution_px,
            x: (right_edge - width).floor() as i32,
            y: cursor.floor() as i32,
            height: block.attribution_line_height.floor() as u32,
        });
        cursor += block.attribution_line_height;
    }

    lines
}

/// Greedy word wrap. Explicit newlines start a new line and words wider than
/// `max_width` are broken between characters.
///
/// Stops as soon as more than `max_lines` lines exist, so the result holds at
/// most `max_lines + 1` lines. The lines kept are the same as a full wrap's.
pub fn wrap(
    text: &str,
    px: f32,
    style: TextStyle,
    max_width: f32,
    max_lines: usize,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let fits = |s: &str| measurer.text_width(s, px, style) <= max_width;
    let limit = max_lines.saturating_add(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if lines.len() >= limit {
                break;
            }
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_string();
                continue;
            }
            for ch in word.chars() {
                if lines.len() >= limit {
                    break;
                }
                current.push(ch);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        if lines.len() >= limit {
            break;
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

fn end_with_ellipsis(lines: &mut [String], px: f32, style: TextStyle, max_width: f32, measurer: &dyn TextMeasurer) {
    let Some(last) = lines.last_mut() else {
        return;
    };
    let mut kept = last.trim_end().to_string();
    while !kept.is_empty() && measurer.text_width(&format!("{}{}", kept, ELLIPSIS), px, style) > max_width {
        kept.pop();
        kept.truncate(kept.trim_end().len());
    }
    *last = format!("{}{}", kept, ELLIPSIS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Every character is half an em wide, lines are 1.2 em apart.
    struct MonoMeasurer;

    impl TextMeasurer for MonoMeasurer {
        fn text_width(&self, text: &str, px: f32, _style: TextStyle) -> f32 {
            text.chars().count() as f32 * px * 0.5
        }

        fn line_height(&self, px: f32, _style: TextStyle) -> f32 {
            px * 1.2
        }
    }

    fn quote(q: &str, a: Option<&str>) -> QuoteText {
        QuoteText::new(q, a).unwrap()
    }

    fn lines_overlap(a: &PlacedLine, b: &PlacedLine) -> bool {
        a.y < b.y + b.height as i32 && b.y < a.y + a.height as i32
    }

    #[test]
    fn test_example_scenario() {
        let text = quote("The only limit is your mind.", Some("— Anon"));
        let layout = plan(1000, 800, &text, &RenderOptions::default(), &MonoMeasurer);

        assert_eq!(layout.overlay_box.width, 800);
        assert_eq!(layout.overlay_box.x, 100);
        assert!(layout.overlay_box.fits_within(1000, 800));
        assert_eq!(layout.quote_line_count(), 1);
        assert_eq!(layout.attribution_line_count(), 1);
        assert!(!lines_overlap(&layout.lines[0], &layout.lines[1]));
        assert!(!layout.truncated);
    }

    #[test]
    fn test_box_is_centered_by_default() {
        let text = quote("Centered", None);
        let layout = plan(1000, 800, &text, &RenderOptions::default(), &MonoMeasurer);
        let b = layout.overlay_box;
        let above = b.y;
        let below = 800 - (b.y + b.height);
        assert!(above.abs_diff(below) <= 1, "above={} below={}", above, below);
    }

    #[test]
    fn test_top_and_bottom_anchor_keep_margin() {
        let text = quote("Anchored", Some("Someone"));
        let mut options = RenderOptions::default();

        options.anchor = BoxAnchor::Top;
        let top = plan(1000, 800, &text, &options, &MonoMeasurer).overlay_box;
        assert_eq!(top.y, 40);

        options.anchor = BoxAnchor::Bottom;
        let bottom = plan(1000, 800, &text, &options, &MonoMeasurer).overlay_box;
        assert_eq!(bottom.y + bottom.height, 760);
    }

    #[test]
    fn test_box_always_inside_image() {
        let long = "word ".repeat(400);
        let texts = [
            quote("Short", None),
            quote("A medium length quote that wraps a bit", Some("Author")),
            quote(&long, Some(long.as_str())),
        ];
        let sizes = [(1, 1), (10, 10), (64, 32), (320, 2000), (2000, 120), (1000, 800)];

        for anchor in [BoxAnchor::Top, BoxAnchor::Center, BoxAnchor::Bottom] {
            let options = RenderOptions { anchor, ..RenderOptions::default() };
            for (w, h) in sizes {
                for text in &texts {
                    let layout = plan(w, h, text, &options, &MonoMeasurer);
                    assert!(
                        layout.overlay_box.fits_within(w, h),
                        "{:?} escapes {}x{}",
                        layout.overlay_box,
                        w,
                        h
                    );
                    assert_eq!(layout.overlay_box.width, OverlayBox::box_width_for(w));
                }
            }
        }
    }

    #[test]
    fn test_box_height_grows_with_line_count() {
        let options = RenderOptions::default();
        let mut previous: Option<(usize, u32)> = None;

        for words in [5, 10, 20, 40] {
            let text = quote(&"word ".repeat(words), Some("Author"));
            let layout = plan(1000, 2000, &text, &options, &MonoMeasurer);
            let current = (layout.quote_line_count(), layout.overlay_box.height);
            if let Some((lines, height)) = previous {
                assert!(current.0 > lines);
                assert!(current.1 > height);
            }
            previous = Some(current);
        }
    }

    #[test]
    fn test_empty_attribution_excludes_line() {
        let options = RenderOptions::default();
        let with = plan(1000, 800, &quote("Quote", Some("Author")), &options, &MonoMeasurer);
        let without = plan(1000, 800, &quote("Quote", Some("  ")), &options, &MonoMeasurer);

        assert_eq!(without.attribution_line_count(), 0);
        assert!(without.overlay_box.height < with.overlay_box.height);
        // padding*2 + one quote line
        assert_eq!(without.overlay_box.height, (2.0 * 37.5 + 60.0_f32).ceil() as u32);
    }

    #[test]
    fn test_attribution_is_right_aligned_and_smaller() {
        let layout = plan(1000, 800, &quote("Quote", Some("Author")), &RenderOptions::default(), &MonoMeasurer);
        let attribution = layout.lines.iter().find(|l| l.style == TextStyle::Attribution).unwrap();
        let b = layout.overlay_box;

        assert!(attribution.px < layout.quote_px);
        let right = attribution.x as f32 + MonoMeasurer.text_width("Author", attribution.px, TextStyle::Attribution);
        assert!(((b.x + b.width) as f32 - 37.5 - right).abs() <= 1.0);
    }

    #[test]
    fn test_shrinks_before_truncating() {
        let options = RenderOptions::default();
        // 12 lines at 50px do not fit in 400px of height, a smaller size does
        let text = quote(&"word ".repeat(60), None);
        let layout = plan(1000, 400, &text, &options, &MonoMeasurer);

        assert!(layout.quote_px < 50.0);
        assert!(layout.quote_px >= options.min_font_px);
        assert!(!layout.truncated);
        assert!(layout.overlay_box.fits_within(1000, 400));
    }

    #[test]
    fn test_truncates_with_ellipsis_at_minimum_size() {
        let options = RenderOptions::default();
        let text = quote(&"lorem ipsum ".repeat(150), Some("Author"));
        let layout = plan(400, 300, &text, &options, &MonoMeasurer);

        assert!(layout.truncated);
        assert_eq!(layout.quote_px, options.min_font_px);
        let last_quote = layout.lines.iter().filter(|l| l.style == TextStyle::Quote).last().unwrap();
        assert!(last_quote.text.ends_with(ELLIPSIS));
        assert_eq!(layout.attribution_line_count(), 1);
        assert!(layout.overlay_box.fits_within(400, 300));

        let b = layout.overlay_box;
        for line in &layout.lines {
            assert!(line.y >= b.y as i32);
            assert!(line.y + line.height as i32 <= (b.y + b.height) as i32);
        }
    }

    #[test]
    fn test_lines_never_overlap() {
        let text = quote(&"several words here ".repeat(10), Some("A rather long attribution line"));
        let layout = plan(600, 900, &text, &RenderOptions::default(), &MonoMeasurer);

        for (i, a) in layout.lines.iter().enumerate() {
            for b in &layout.lines[i + 1..] {
                assert!(!lines_overlap(a, b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_wrap_respects_width_and_newlines() {
        let lines = wrap("aa bb cc\ndd", 10.0, TextStyle::Quote, 25.0, usize::MAX, &MonoMeasurer);
        assert_eq!(lines, vec!["aa bb", "cc", "dd"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let lines = wrap("abcdefghij", 10.0, TextStyle::Quote, 20.0, usize::MAX, &MonoMeasurer);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_stops_past_line_limit() {
        let full = wrap(&"aa bb ".repeat(50), 10.0, TextStyle::Quote, 25.0, usize::MAX, &MonoMeasurer);
        assert_eq!(full.len(), 50);

        let capped = wrap(&"aa bb ".repeat(50), 10.0, TextStyle::Quote, 25.0, 3, &MonoMeasurer);
        assert_eq!(capped, full[..4].to_vec());

        let capped = wrap(&"x".repeat(1000), 10.0, TextStyle::Quote, 20.0, 1, &MonoMeasurer);
        assert_eq!(capped, vec!["xxxx", "xxxx"]);
    }

    /// Counts width measurements to bound the work done by `plan`.
    struct CountingMeasurer(Cell<usize>);

    impl TextMeasurer for CountingMeasurer {
        fn text_width(&self, text: &str, px: f32, style: TextStyle) -> f32 {
            self.0.set(self.0.get() + 1);
            MonoMeasurer.text_width(text, px, style)
        }

        fn line_height(&self, px: f32, style: TextStyle) -> f32 {
            MonoMeasurer.line_height(px, style)
        }
    }

    #[test]
    fn test_huge_quote_is_planned_with_bounded_work() {
        // 200 KB, far beyond what any box can show
        let huge = "word ".repeat(40_000);
        let text = QuoteText::with_max_chars(&huge, Some(huge.as_str()), usize::MAX).unwrap();
        let measurer = CountingMeasurer(Cell::new(0));

        let layout = plan(1000, 800, &text, &RenderOptions::default(), &measurer);

        assert!(layout.truncated);
        assert!(layout.overlay_box.fits_within(1000, 800));
        // re-wrapping all 80k words at every shrink step takes over a million
        assert!(measurer.0.get() < 50_000, "{} width measurements", measurer.0.get());
    }

    #[test]
    fn test_ellipsis_fits_width() {
        let mut lines = vec!["abcd".to_string()];
        end_with_ellipsis(&mut lines, 10.0, TextStyle::Quote, 20.0, &MonoMeasurer);
        assert_eq!(lines, vec!["abc…"]);
    }
}
