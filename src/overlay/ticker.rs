//! Ticker crawl, progress strip, and the source credit.

use kurbo::Rect;

use crate::foundation::core::{Canvas, FrameIndex, Rgba8};
use crate::scene::tree::{SceneNode, TextAlign, TextStyle, Visual};

pub(crate) const TICKER_Z: i32 = 100;
pub(crate) const PROGRESS_Z: i32 = 101;
pub(crate) const SOURCE_Z: i32 = 105;

/// Logical advance per glyph at the crawl's font size.
const CHAR_ADVANCE: f64 = 56.0;
/// Eight ideographic spaces between and around entries.
const PAD: &str = "\u{3000}\u{3000}\u{3000}\u{3000}\u{3000}\u{3000}\u{3000}\u{3000}";
const FALLBACK_TEXT: &str = "カツミとヒロシの本音ニューストーク";

/// Joined crawl text with padding runs on both ends.
pub(crate) fn ticker_text(texts: &[String]) -> String {
    if texts.is_empty() {
        return format!("{PAD}{FALLBACK_TEXT}{PAD}");
    }
    format!("{PAD}{}{PAD}", texts.join(PAD))
}

/// Emits the crawl: the text run enters from the right edge and wraps once
/// it has fully crossed the canvas.
pub(crate) fn emit_ticker(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    frame: FrameIndex,
    texts: &[String],
) {
    let text = ticker_text(texts);
    let text_width = text.chars().count() as f64 * CHAR_ADVANCE;
    let offset = (frame.0 as f64 * 1.2) % (text_width + canvas.width_f());
    let x = canvas.width_f() - offset;

    let bar_top = canvas.height_f() - 80.0;
    nodes.push(SceneNode::new(
        "ticker.bar",
        TICKER_Z,
        Visual::Rect {
            rect: Rect::new(0.0, bar_top, canvas.width_f(), canvas.height_f()),
            fill: Rgba8::BLACK.with_alpha(0.95),
            corner_radius: 0.0,
        },
    ));
    nodes.push(SceneNode::new(
        "ticker.text",
        TICKER_Z,
        Visual::Text {
            rect: Rect::new(x, bar_top, x + text_width, canvas.height_f() - 10.0),
            content: text,
            style: TextStyle::new(48.0, Rgba8::WHITE),
        },
    ));
}

/// Bottom progress strip: channel-colored fill over a faint track.
pub(crate) fn emit_progress(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    frame: FrameIndex,
    duration_in_frames: u64,
    channel_color: Rgba8,
) {
    let y0 = canvas.height_f() - 6.0;
    nodes.push(SceneNode::new(
        "progress.track",
        PROGRESS_Z,
        Visual::Rect {
            rect: Rect::new(0.0, y0, canvas.width_f(), canvas.height_f()),
            fill: Rgba8::BLACK.with_alpha(0.3),
            corner_radius: 0.0,
        },
    ));
    let fraction = if duration_in_frames > 0 {
        frame.0 as f64 / duration_in_frames as f64
    } else {
        0.0
    };
    nodes.push(SceneNode::new(
        "progress.fill",
        PROGRESS_Z,
        Visual::Rect {
            rect: Rect::new(0.0, y0, canvas.width_f() * fraction, canvas.height_f()),
            fill: channel_color,
            corner_radius: 0.0,
        },
    ));
}

/// News-source credit over the subtitle bar's top edge. Skipped for empty
/// sources and for first-hand reporting, which credits nobody.
pub(crate) fn emit_source(nodes: &mut Vec<SceneNode>, canvas: Canvas, bar_top: f64, source: &str) {
    if source.is_empty() || source == "独自取材" {
        return;
    }
    nodes.push(SceneNode::new(
        "source",
        SOURCE_Z,
        Visual::Text {
            rect: Rect::new(0.0, bar_top - 2.0, canvas.width_f() - 20.0, bar_top - 2.0 + 34.0),
            content: format!("出典：{source}"),
            style: TextStyle {
                align: TextAlign::Right,
                ..TextStyle::new(28.0, Rgba8::WHITE)
            },
        },
    ));
}
