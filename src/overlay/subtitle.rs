//! Subtitle presentation over the bottom bar.
//!
//! Three styles share the same mount box: a progress underline, a fade-and-
//! swell bold treatment, and a per-line karaoke highlight. Back-room frames
//! drop the dressing entirely and use the centered yellow line instead.

use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::animation::interp::interpolate_clamped;
use crate::foundation::core::{Canvas, FrameIndex, Rgba8, Transform2D};
use crate::foundation::error::KawaraResult;
use crate::overlay::approx_text_width;
use crate::scene::tree::{SceneNode, TextAlign, TextStyle, Visual};
use crate::timeline::script::ScriptLine;

pub(crate) const SUBTITLE_Z: i32 = 40;

/// Width the subtitle column actually spans at 1920 wide.
const AREA_WIDTH: f64 = 1580.0;
const INSET_LEFT: f64 = 220.0;
const INSET_RIGHT: f64 = 170.0;
const LINE_HEIGHT: f64 = 1.15;

const UNDERLINE_COLOR: Rgba8 = Rgba8::rgb(0xff, 0x6b, 0x6b);
const BACK_ROOM_TEXT: Rgba8 = Rgba8::rgb(0xff, 0xff, 0x00);

/// How a spoken line is dressed while it plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleStyle {
    /// An orange-red rule grows under the text as the line progresses.
    Underline,
    /// The line fades in dim and swells slightly as it firms up.
    Bold,
    /// A warm band sweeps across each wrapped line in turn.
    #[default]
    Highlight,
}

/// Font size stepped down for longer lines so they stay inside the bar.
pub(crate) fn subtitle_font_size(text: &str) -> f64 {
    let len = text.chars().count();
    if len > 30 {
        72.0
    } else if len > 20 {
        82.0
    } else {
        95.0
    }
}

/// Splits a line so each piece fits the subtitle column at `font_size`.
///
/// Up to 90% of the column stays on one line. Past that, the split point
/// walks backwards to land after a particle or closing punctuation; if none
/// is found in the 85%..90% window the text breaks hard. A leftover of three
/// characters or fewer is not worth its own line.
pub fn split_by_width(text: &str, font_size: f64) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let max_chars = (AREA_WIDTH * 0.90 / font_size) as usize;
    let min_chars = (AREA_WIDTH * 0.85 / font_size) as usize;
    if max_chars == 0 || chars.len() <= max_chars {
        return vec![text.to_owned()];
    }

    const BREAK_AFTER: &str = "。、！？）」』】〉》のがはをにでもへとやけどてからまでよりならばし";
    let mut at = max_chars;
    for i in (min_chars.max(1)..=max_chars).rev() {
        if BREAK_AFTER.contains(chars[i - 1]) {
            at = i;
            break;
        }
    }
    if chars.len() - at <= 3 {
        return vec![text.to_owned()];
    }

    let head: String = chars[..at].iter().collect();
    let tail: String = chars[at..].iter().collect();
    let mut lines = vec![head];
    lines.extend(split_by_width(&tail, font_size));
    lines
}

/// Emits the current spoken line into the bottom bar.
///
/// `bar_top` is the top edge of the translucent bar; the text mounts just
/// inside it. `highlight` overrides the sweep color for the highlight style.
pub(crate) fn emit_subtitle(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    frame: FrameIndex,
    line: &ScriptLine,
    bar_top: f64,
    style: SubtitleStyle,
    highlight: Option<Rgba8>,
) -> KawaraResult<()> {
    let elapsed = frame.0.saturating_sub(line.start_frame.0) as f64;
    let fade_in = interpolate_clamped(elapsed, &[0.0, 5.0], &[0.0, 1.0])?;
    let progress = line.progress(frame);
    let font_size = subtitle_font_size(&line.text);
    let block = Rect::new(
        INSET_LEFT,
        bar_top + 8.0,
        canvas.width_f() - INSET_RIGHT,
        canvas.height_f() - 100.0,
    );

    match style {
        SubtitleStyle::Underline => {
            let text_w = approx_text_width(&line.text, font_size).min(block.width());
            nodes.push(
                SceneNode::new(
                    "subtitle.text",
                    SUBTITLE_Z,
                    Visual::Text {
                        rect: block,
                        content: line.text.clone(),
                        style: TextStyle {
                            line_height: Some(LINE_HEIGHT),
                            ..TextStyle::new(font_size, Rgba8::WHITE)
                        },
                    },
                )
                .with_opacity(fade_in),
            );
            let rule_y = block.y0 + font_size * LINE_HEIGHT - 2.0;
            nodes.push(
                SceneNode::new(
                    "subtitle.rule",
                    SUBTITLE_Z,
                    Visual::Rect {
                        rect: Rect::new(block.x0, rule_y, block.x0 + text_w * progress, rule_y + 8.0),
                        fill: UNDERLINE_COLOR,
                        corner_radius: 4.0,
                    },
                )
                .with_opacity(fade_in),
            );
        }
        SubtitleStyle::Bold => {
            let firmness = (progress * 3.0).min(1.0);
            let scale = 0.97 + firmness * 0.03;
            nodes.push(
                SceneNode::new(
                    "subtitle.text",
                    SUBTITLE_Z,
                    Visual::Text {
                        rect: block,
                        content: line.text.clone(),
                        style: TextStyle {
                            weight: 900,
                            line_height: Some(LINE_HEIGHT),
                            ..TextStyle::new(font_size, Rgba8::WHITE)
                        },
                    },
                )
                .with_opacity(fade_in * (0.4 + firmness * 0.6))
                .with_transform(Transform2D {
                    scale: Vec2::new(scale, scale),
                    anchor: block.center().to_vec2(),
                    ..Transform2D::default()
                }),
            );
        }
        SubtitleStyle::Highlight => {
            let band = highlight.unwrap_or(Rgba8::rgba(220, 140, 30, 128));
            let lines = split_by_width(&line.text, font_size);
            let total = lines.len() as f64;
            for (i, piece) in lines.iter().enumerate() {
                let started = i as f64 / total;
                let per_line = ((progress - started) * total).clamp(0.0, 1.0);
                let y0 = block.y0 + i as f64 * font_size * LINE_HEIGHT;
                let piece_w = approx_text_width(piece, font_size).min(block.width());
                // The band covers the lower 45% of the glyph box, like a
                // marker dragged under the characters.
                nodes.push(
                    SceneNode::new(
                        "subtitle.band",
                        SUBTITLE_Z,
                        Visual::Rect {
                            rect: Rect::new(
                                block.x0 - 10.0,
                                y0 + font_size * 0.55,
                                block.x0 - 10.0 + (piece_w + 20.0) * per_line,
                                y0 + font_size * LINE_HEIGHT + 4.0,
                            ),
                            fill: band,
                            corner_radius: 6.0,
                        },
                    )
                    .with_opacity(fade_in),
                );
                nodes.push(
                    SceneNode::new(
                        "subtitle.text",
                        SUBTITLE_Z,
                        Visual::Text {
                            rect: Rect::new(block.x0, y0, block.x1, y0 + font_size * LINE_HEIGHT),
                            content: piece.clone(),
                            style: TextStyle {
                                line_height: Some(LINE_HEIGHT),
                                ..TextStyle::new(font_size, Rgba8::WHITE)
                            },
                        },
                    )
                    .with_opacity(fade_in),
                );
            }
        }
    }
    Ok(())
}

/// Centered yellow line for back-room frames, both inside the news show
/// and in the stand-alone back-room composition.
pub(crate) fn emit_centered_subtitle(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    line: &ScriptLine,
    bar_top: f64,
) {
    nodes.push(SceneNode::new(
        "subtitle.text",
        SUBTITLE_Z,
        Visual::Text {
            rect: Rect::new(
                120.0,
                bar_top + 30.0,
                canvas.width_f() - 120.0,
                canvas.height_f() - 80.0,
            ),
            content: line.text.clone(),
            style: TextStyle {
                line_height: Some(1.25),
                ..TextStyle::centered(72.0, BACK_ROOM_TEXT)
            },
        },
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::script::Speaker;

    fn line(text: &str, start: u64, end: u64) -> ScriptLine {
        ScriptLine {
            speaker: Speaker::Katsumi,
            text: text.to_owned(),
            emotion: String::new(),
            start_frame: FrameIndex(start),
            end_frame: FrameIndex(end),
            section: None,
        }
    }

    #[test]
    fn short_text_never_splits() {
        assert_eq!(split_by_width("年金が上がる", 95.0), vec!["年金が上がる"]);
    }

    #[test]
    fn split_lands_after_a_particle() {
        // 24 chars at 72px: max = 1580*0.9/72 = 19, min = 18. The particle
        // が sits in the scan window, so the break lands right after it.
        let text = "あいうえおかきくけこさしすせそたつが九十一二三四";
        let lines = split_by_width(text, 72.0);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with('が'));
        assert_eq!(lines[0].chars().count(), 18);
    }

    #[test]
    fn hard_break_when_no_particle_in_window() {
        let text: String = std::iter::repeat_n('あ', 40).collect();
        let lines = split_by_width(&text, 72.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 19);
        // The 21-char remainder leaves only a 2-char tail past the next
        // hard break, so it stays whole.
        assert_eq!(lines[1].chars().count(), 21);
    }

    #[test]
    fn tiny_tail_folds_into_the_last_line() {
        // 21 chars leaves a 2-char tail past the hard break, so no split.
        let text: String = std::iter::repeat_n('あ', 21).collect();
        assert_eq!(split_by_width(&text, 72.0).len(), 1);
    }

    #[test]
    fn font_size_steps_down_with_length() {
        assert_eq!(subtitle_font_size("短い"), 95.0);
        let mid: String = std::iter::repeat_n('あ', 21).collect();
        assert_eq!(subtitle_font_size(&mid), 82.0);
        let long: String = std::iter::repeat_n('あ', 31).collect();
        assert_eq!(subtitle_font_size(&long), 72.0);
    }

    #[test]
    fn underline_rule_tracks_line_progress() {
        let mut nodes = Vec::new();
        let l = line("こんにちは", 0, 100);
        emit_subtitle(
            &mut nodes,
            Canvas::full_hd(),
            FrameIndex(50),
            &l,
            648.0,
            SubtitleStyle::Underline,
            None,
        )
        .unwrap();
        assert_eq!(nodes.len(), 2);
        let rule = match &nodes[1].visual {
            Visual::Rect { rect, .. } => rect,
            _ => unreachable!(),
        };
        // Five fullwidth chars at 95px, half way through the line.
        assert!((rule.width() - 95.0 * 5.0 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn bold_style_firms_up_within_the_first_third() {
        let mut nodes = Vec::new();
        let l = line("こんにちは", 0, 90);
        emit_subtitle(
            &mut nodes,
            Canvas::full_hd(),
            FrameIndex(45),
            &l,
            648.0,
            SubtitleStyle::Bold,
            None,
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert!((nodes[0].opacity - 1.0).abs() < 1e-9);
        assert!((nodes[0].transform.scale.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn highlight_sweeps_line_by_line() {
        let text: String = std::iter::repeat_n('あ', 40).collect();
        let l = line(&text, 0, 90);
        let mut nodes = Vec::new();
        emit_subtitle(
            &mut nodes,
            Canvas::full_hd(),
            FrameIndex(45),
            &l,
            648.0,
            SubtitleStyle::Highlight,
            None,
        )
        .unwrap();
        // Two wrapped lines, band + text each.
        assert_eq!(nodes.len(), 4);
        let band_widths: Vec<f64> = nodes
            .iter()
            .filter_map(|n| match &n.visual {
                Visual::Rect { rect, .. } => Some(rect.width()),
                _ => None,
            })
            .collect();
        // At half progress the first band is fully swept, the second has
        // not started.
        assert!(band_widths[0] > 1000.0);
        assert!(band_widths[1].abs() < 1e-9);
    }

    #[test]
    fn centered_back_room_line_is_yellow_and_undressed() {
        let mut nodes = Vec::new();
        let l = line("ここだけの話", 0, 100);
        emit_centered_subtitle(&mut nodes, Canvas::full_hd(), &l, 648.0);
        assert_eq!(nodes.len(), 1);
        match &nodes[0].visual {
            Visual::Text { style, .. } => {
                assert_eq!(style.color, BACK_ROOM_TEXT);
                assert_eq!(style.align, TextAlign::Center);
                assert_eq!(style.font_size, 72.0);
            }
            _ => unreachable!(),
        }
    }
}
