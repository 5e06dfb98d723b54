//! Listener letter panel for the radio layout. The letter types itself out
//! character by character behind a blinking cursor.

use kurbo::Rect;

use crate::animation::interp::interpolate_clamped;
use crate::foundation::core::{Canvas, FrameIndex, Rgba8};
use crate::foundation::error::KawaraResult;
use crate::overlay::approx_text_width;
use crate::overlay::checklist::SIDE_PANEL_Z;
use crate::scene::tree::{SceneNode, TextAlign, TextStyle, Visual};
use crate::show::props::ListenerLetterData;

const GOLD: Rgba8 = Rgba8::rgb(0xff, 0xd7, 0x00);

/// Count of letter characters visible at `elapsed` frames after mount.
/// Typing starts 20 frames in and runs at two frames per character.
pub(crate) fn visible_chars(elapsed: f64, len: usize) -> KawaraResult<usize> {
    let len_f = len as f64;
    let shown = interpolate_clamped(elapsed, &[20.0, 20.0 + len_f * 2.0], &[0.0, len_f])?;
    Ok((shown.floor() as usize).min(len))
}

pub(crate) fn emit_letter(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    frame: FrameIndex,
    start: FrameIndex,
    data: &ListenerLetterData,
    channel_color: Rgba8,
) -> KawaraResult<()> {
    if frame.0 < start.0 {
        return Ok(());
    }
    let elapsed = (frame.0 - start.0) as f64;
    let fade = interpolate_clamped(elapsed, &[0.0, 25.0], &[0.0, 1.0])?;
    if fade <= 0.0 {
        return Ok(());
    }

    let x1 = canvas.width_f() - 310.0;
    let x0 = x1 - 520.0;
    let cx0 = x0 + 20.0;
    let cx1 = x1 - 20.0;

    let letter: Vec<char> = data.letter_text.chars().collect();
    let shown = visible_chars(elapsed, letter.len())?;
    let complete = shown >= letter.len();
    let mut body: String = std::iter::once('「').chain(letter[..shown].iter().copied()).collect();
    if complete {
        body.push('」');
    } else if (frame.0 as f64 * 0.3).sin() > 0.0 {
        // The gold cursor flattens into the body run.
        body.push('|');
    }

    // Body box height follows what has been typed so far.
    let inner_w = cx1 - cx0 - 16.0;
    let body_lines = (approx_text_width(&body, 22.0) / inner_w).ceil().max(1.0);
    let body_h = (body_lines * 22.0 * 1.6 + 20.0).clamp(120.0, 350.0);

    let header_h = 26.0 * 1.2;
    let sender_h = 20.0 * 1.2;
    let panel = Rect::new(
        x0,
        10.0,
        x1,
        10.0 + 16.0 + header_h + 6.0 + 2.0 + 8.0 + sender_h + 10.0 + body_h + 16.0,
    );
    nodes.push(
        SceneNode::new(
            "letter.panel",
            SIDE_PANEL_Z,
            Visual::Rect {
                rect: panel,
                fill: Rgba8::BLACK.with_alpha(0.88),
                corner_radius: 12.0,
            },
        )
        .with_opacity(fade),
    );
    nodes.push(
        SceneNode::new(
            "letter.accent",
            SIDE_PANEL_Z,
            Visual::Rect {
                rect: Rect::new(panel.x0, panel.y0, panel.x0 + 5.0, panel.y1),
                fill: channel_color,
                corner_radius: 2.5,
            },
        )
        .with_opacity(fade),
    );

    let header_y = panel.y0 + 16.0;
    nodes.push(
        SceneNode::new(
            "letter.header",
            SIDE_PANEL_Z,
            Visual::Text {
                rect: Rect::new(cx0, header_y, cx1, header_y + header_h),
                content: "今日のお便り".to_owned(),
                style: TextStyle {
                    weight: 900,
                    ..TextStyle::centered(26.0, GOLD)
                },
            },
        )
        .with_opacity(fade),
    );
    let rule_y = header_y + header_h + 6.0;
    nodes.push(
        SceneNode::new(
            "letter.header.rule",
            SIDE_PANEL_Z,
            Visual::Rect {
                rect: Rect::new(cx0, rule_y, cx1, rule_y + 2.0),
                fill: Rgba8::WHITE.with_alpha(0.2),
                corner_radius: 0.0,
            },
        )
        .with_opacity(fade),
    );
    let sender_y = rule_y + 2.0 + 8.0;
    nodes.push(
        SceneNode::new(
            "letter.sender",
            SIDE_PANEL_Z,
            Visual::Text {
                rect: Rect::new(cx0, sender_y, cx1, sender_y + sender_h),
                content: format!("{} さんより", data.sender_label),
                style: TextStyle {
                    weight: 500,
                    align: TextAlign::Right,
                    ..TextStyle::new(20.0, Rgba8::WHITE.with_alpha(0.6))
                },
            },
        )
        .with_opacity(fade),
    );

    let body_y = sender_y + sender_h + 10.0;
    let body_box = Rect::new(cx0, body_y, cx1, body_y + body_h);
    nodes.push(
        SceneNode::new(
            "letter.body.box",
            SIDE_PANEL_Z,
            Visual::Rect {
                rect: body_box,
                fill: Rgba8::WHITE.with_alpha(0.06),
                corner_radius: 8.0,
            },
        )
        .with_opacity(fade),
    );
    nodes.push(
        SceneNode::new(
            "letter.body",
            SIDE_PANEL_Z,
            Visual::Text {
                rect: body_box.inset((-8.0, -10.0)),
                content: body,
                style: TextStyle {
                    weight: 500,
                    line_height: Some(1.6),
                    ..TextStyle::new(22.0, Rgba8::WHITE)
                },
            },
        )
        .with_opacity(fade),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ListenerLetterData {
        ListenerLetterData {
            sender_label: "68歳・主婦・東京都".to_owned(),
            letter_text: "年金だけでは暮らせません".to_owned(),
        }
    }

    fn body_at(frame: u64) -> String {
        let mut nodes = Vec::new();
        emit_letter(
            &mut nodes,
            Canvas::full_hd(),
            FrameIndex(frame),
            FrameIndex(216),
            &data(),
            Rgba8::WHITE,
        )
        .unwrap();
        match &nodes.iter().find(|n| n.id == "letter.body").unwrap().visual {
            Visual::Text { content, .. } => content.clone(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn typing_starts_after_twenty_frames() {
        assert_eq!(visible_chars(10.0, 12).unwrap(), 0);
        assert_eq!(visible_chars(20.0, 12).unwrap(), 0);
        // Two frames per character.
        assert_eq!(visible_chars(26.0, 12).unwrap(), 3);
        assert_eq!(visible_chars(32.0, 12).unwrap(), 6);
        assert_eq!(visible_chars(44.0, 12).unwrap(), 12);
        assert_eq!(visible_chars(1000.0, 12).unwrap(), 12);
    }

    #[test]
    fn body_opens_with_a_bracket_and_closes_when_done() {
        let early = body_at(244);
        assert!(early.starts_with('「'));
        assert!(!early.contains('」'));
        let done = body_at(600);
        assert_eq!(done, "「年金だけでは暮らせません」");
    }

    #[test]
    fn cursor_blinks_while_typing() {
        // Mid-typing frames: sin(240 * 0.3) > 0, sin(250 * 0.3) < 0.
        assert!(body_at(240).contains('|'));
        assert!(!body_at(250).contains('|'));
    }
}
