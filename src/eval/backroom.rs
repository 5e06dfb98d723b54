//! Stand-alone back-room talk.
//!
//! Same bottom-bar layout as the main show, but on a bare black set: no
//! studio photo, no cast, yellow centered dialogue. A subscribe nudge sways
//! at the top while the location title slides in from the right. The whole
//! scene fades in and out over fifteen frames at each end.

use std::f64::consts::PI;

use kurbo::Rect;

use crate::eval::evaluator::EvalCtx;
use crate::foundation::core::{Rgba8, Transform2D};
use crate::foundation::error::KawaraResult;
use crate::overlay::subtitle::{SUBTITLE_Z, emit_centered_subtitle};
use crate::scene::tree::{SceneNode, TextAlign, TextStyle, Visual, scale_opacity};
use crate::show::props::BackRoomProps;
use crate::timeline::script::active_line;

const HEADER_Z: i32 = 10;
const BAR_FRACTION: f64 = 0.40;

const SUBSCRIBE_TEXT: &str = "チャンネル登録よろしくね";
const LOCATION_TEXT: &str = "控室にて";

pub(crate) fn emit(
    nodes: &mut Vec<SceneNode>,
    props: &BackRoomProps,
    ctx: EvalCtx,
) -> KawaraResult<()> {
    let frame = ctx.frame;
    let canvas = ctx.canvas;
    let f = frame.0 as f64;
    let bar_top = canvas.height_f() * (1.0 - BAR_FRACTION);
    let first = nodes.len();

    nodes.push(SceneNode::new(
        "backdrop",
        0,
        Visual::Rect {
            rect: Rect::new(0.0, 0.0, canvas.width_f(), canvas.height_f()),
            fill: Rgba8::BLACK,
            corner_radius: 0.0,
        },
    ));

    // Gentle vertical sway on a three second period.
    let sway = ((f / ctx.fps.as_f64()) * (2.0 * PI / 3.0)).sin() * 6.0;
    nodes.push(
        SceneNode::new(
            "header.subscribe",
            HEADER_Z,
            Visual::Text {
                rect: Rect::new(40.0, 80.0, canvas.width_f(), 145.0),
                content: SUBSCRIBE_TEXT.to_owned(),
                style: TextStyle::new(50.0, Rgba8::rgb(0xff, 0xff, 0x00).with_alpha(0.95)),
            },
        )
        .with_transform(Transform2D::translated(0.0, sway)),
    );

    let slide = ((1.0 - (f / 20.0).min(1.0)) * 400.0).max(0.0);
    nodes.push(
        SceneNode::new(
            "header.location",
            HEADER_Z,
            Visual::Text {
                rect: Rect::new(0.0, 150.0, canvas.width_f() - 40.0, 254.0),
                content: LOCATION_TEXT.to_owned(),
                style: TextStyle {
                    align: TextAlign::Right,
                    ..TextStyle::new(80.0, Rgba8::WHITE)
                },
            },
        )
        .with_opacity((f / 15.0).min(1.0))
        .with_transform(Transform2D::translated(slide, 0.0)),
    );

    nodes.push(SceneNode::new(
        "bar.shade",
        SUBTITLE_Z,
        Visual::Rect {
            rect: Rect::new(0.0, bar_top, canvas.width_f(), canvas.height_f()),
            fill: Rgba8::BLACK.with_alpha(0.75),
            corner_radius: 0.0,
        },
    ));

    if let Some((_, line)) = active_line(&props.script, frame) {
        emit_centered_subtitle(nodes, canvas, line, bar_top);
    }

    let fade_in = (f / 15.0).min(1.0);
    let fade_out = ((ctx.duration as f64 - f) / 15.0).min(1.0);
    scale_opacity(&mut nodes[first..], fade_in * fade_out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{Canvas, Fps, FrameIndex};
    use crate::timeline::script::{ScriptLine, Speaker};

    fn ctx_at(frame: u64, duration: u64) -> EvalCtx {
        EvalCtx {
            frame: FrameIndex(frame),
            fps: Fps::news_default(),
            canvas: Canvas::full_hd(),
            duration,
        }
    }

    fn props() -> BackRoomProps {
        BackRoomProps {
            script: vec![ScriptLine {
                speaker: Speaker::Hiroshi,
                text: "今日の収録どうだった?".to_owned(),
                emotion: String::new(),
                start_frame: FrameIndex(0),
                end_frame: FrameIndex(200),
                section: None,
            }],
            audio_path: "audio/hikae1.wav".to_owned(),
            bgm_path: None,
            jingle_path: None,
        }
    }

    #[test]
    fn scene_fades_in_and_out() {
        let props = props();

        let mut start = Vec::new();
        emit(&mut start, &props, ctx_at(0, 300)).unwrap();
        assert!(start.iter().all(|n| n.opacity == 0.0));

        let mut mid = Vec::new();
        emit(&mut mid, &props, ctx_at(150, 300)).unwrap();
        let backdrop = mid.iter().find(|n| n.id == "backdrop").unwrap();
        assert_eq!(backdrop.opacity, 1.0);

        let mut tail = Vec::new();
        emit(&mut tail, &props, ctx_at(297, 300)).unwrap();
        let backdrop = tail.iter().find(|n| n.id == "backdrop").unwrap();
        assert!((backdrop.opacity - 0.2).abs() < 1e-9);
    }

    #[test]
    fn location_title_slides_in_from_the_right() {
        let props = props();

        let mut first = Vec::new();
        emit(&mut first, &props, ctx_at(0, 300)).unwrap();
        let title = first.iter().find(|n| n.id == "header.location").unwrap();
        assert_eq!(title.transform.translate.x, 400.0);

        let mut settled = Vec::new();
        emit(&mut settled, &props, ctx_at(40, 300)).unwrap();
        let title = settled.iter().find(|n| n.id == "header.location").unwrap();
        assert_eq!(title.transform.translate.x, 0.0);
    }

    #[test]
    fn subscribe_nudge_sways_on_a_three_second_period() {
        let props = props();
        // A quarter period at 24 fps lands 18 frames in.
        let mut nodes = Vec::new();
        emit(&mut nodes, &props, ctx_at(18, 300)).unwrap();
        let header = nodes.iter().find(|n| n.id == "header.subscribe").unwrap();
        assert!((header.transform.translate.y - 6.0).abs() < 1e-9);
    }

    #[test]
    fn dialogue_is_yellow_and_centered() {
        let props = props();
        let mut nodes = Vec::new();
        emit(&mut nodes, &props, ctx_at(100, 300)).unwrap();
        let subtitle = nodes.iter().find(|n| n.id == "subtitle.text").unwrap();
        match &subtitle.visual {
            Visual::Text { style, .. } => {
                assert_eq!(style.color, Rgba8::rgb(0xff, 0xff, 0x00));
                assert_eq!(style.align, TextAlign::Center);
            }
            _ => unreachable!(),
        }
    }
}
