//! Picture-story slideshow.
//!
//! Full-bleed slides play back to back over a black base, each fading in
//! over its first twentieth and out over its last, with a slight push-in
//! across its run. Narration and subtitles are baked into the artwork; the
//! only chrome is the pill indicator up top and a progress line along the
//! bottom edge.

use kurbo::{Rect, Vec2};

use crate::animation::interp::interpolate_clamped;
use crate::eval::evaluator::EvalCtx;
use crate::foundation::core::{Rgba8, Transform2D};
use crate::foundation::error::KawaraResult;
use crate::scene::tree::{SceneNode, Visual};
use crate::show::props::KamishibaiProps;

const SLIDE_Z: i32 = 1;
const HUD_Z: i32 = 10;

const PILL_GAP: f64 = 8.0;
const PILL_ACTIVE_W: f64 = 24.0;
const PILL_W: f64 = 10.0;

pub(crate) fn emit(
    nodes: &mut Vec<SceneNode>,
    props: &KamishibaiProps,
    ctx: EvalCtx,
) -> KawaraResult<()> {
    let canvas = ctx.canvas;
    let w = canvas.width_f();
    let h = canvas.height_f();
    let f = ctx.frame.0 as f64;

    nodes.push(SceneNode::new(
        "backdrop",
        0,
        Visual::Rect {
            rect: Rect::new(0.0, 0.0, w, h),
            fill: Rgba8::BLACK,
            corner_radius: 0.0,
        },
    ));
    let Some(last_slide) = props.slides.last() else {
        return Ok(());
    };

    let starts = props.slide_starts();
    let active = props.slides.iter().enumerate().find_map(|(i, slide)| {
        let start = starts[i].0;
        (ctx.frame.0 >= start && ctx.frame.0 < start + slide.duration_frames).then_some(i)
    });

    if let Some(i) = active {
        let slide = &props.slides[i];
        let elapsed = f - starts[i].0 as f64;
        let progress =
            interpolate_clamped(elapsed, &[0.0, slide.duration_frames as f64], &[0.0, 1.0])?;
        let opacity =
            interpolate_clamped(progress, &[0.0, 0.05, 0.95, 1.0], &[0.0, 1.0, 1.0, 0.0])?;
        let scale = interpolate_clamped(progress, &[0.0, 1.0], &[1.0, 1.03])?;
        nodes.push(
            SceneNode::new(
                format!("slide.{i}"),
                SLIDE_Z,
                Visual::image(Rect::new(0.0, 0.0, w, h), slide.image_path.clone()),
            )
            .with_opacity(opacity)
            .with_transform(Transform2D {
                scale: Vec2::new(scale, scale),
                anchor: Vec2::new(w / 2.0, h / 2.0),
                ..Transform2D::default()
            }),
        );
    }

    // Pill indicator, centered along the top. The active slide's pill is
    // wider and takes the channel color.
    let count = props.slides.len();
    let total = (count as f64 - 1.0) * PILL_GAP
        + (count as f64 - 1.0) * PILL_W
        + if active.is_some() { PILL_ACTIVE_W } else { PILL_W };
    let mut x = (w - total) / 2.0;
    for i in 0..count {
        let (pill_w, fill) = if active == Some(i) {
            (PILL_ACTIVE_W, props.channel_color)
        } else {
            (PILL_W, Rgba8::WHITE.with_alpha(0.4))
        };
        nodes.push(SceneNode::new(
            format!("indicator.{i}"),
            HUD_Z,
            Visual::Rect {
                rect: Rect::new(x, 12.0, x + pill_w, 22.0),
                fill,
                corner_radius: 5.0,
            },
        ));
        x += pill_w + PILL_GAP;
    }

    // Progress line pinned to the bottom edge, running over the whole deck
    // rather than the composition length.
    let last = props.slides.len() - 1;
    let total_frames = starts[last].0 + last_slide.duration_frames;
    let overall = (f / total_frames as f64).min(1.0);
    nodes.push(SceneNode::new(
        "progress",
        HUD_Z,
        Visual::Rect {
            rect: Rect::new(0.0, h - 4.0, w * overall, h),
            fill: props.channel_color,
            corner_radius: 0.0,
        },
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{Canvas, Fps, FrameIndex};
    use crate::show::props::KamishibaiSlide;

    fn ctx_at(frame: u64, duration: u64) -> EvalCtx {
        EvalCtx {
            frame: FrameIndex(frame),
            fps: Fps::news_default(),
            canvas: Canvas::full_hd(),
            duration,
        }
    }

    fn slide(image: &str, duration: u64) -> KamishibaiSlide {
        KamishibaiSlide {
            image_path: image.to_owned(),
            audio_path: format!("{image}.wav"),
            duration_frames: duration,
            subtitle: String::new(),
            tag: String::new(),
        }
    }

    fn props() -> KamishibaiProps {
        KamishibaiProps {
            slides: vec![slide("k/01.png", 200), slide("k/02.png", 100)],
            ..KamishibaiProps::default()
        }
    }

    #[test]
    fn slides_hand_over_at_their_boundaries() {
        let props = props();
        let mut first = Vec::new();
        emit(&mut first, &props, ctx_at(100, 300)).unwrap();
        assert!(first.iter().any(|n| n.id == "slide.0"));
        assert!(!first.iter().any(|n| n.id == "slide.1"));

        let mut second = Vec::new();
        emit(&mut second, &props, ctx_at(200, 300)).unwrap();
        assert!(!second.iter().any(|n| n.id == "slide.0"));
        assert!(second.iter().any(|n| n.id == "slide.1"));
    }

    #[test]
    fn slide_fades_in_and_pushes_in() {
        let props = props();
        let mut at_start = Vec::new();
        emit(&mut at_start, &props, ctx_at(0, 300)).unwrap();
        let image = at_start.iter().find(|n| n.id == "slide.0").unwrap();
        assert_eq!(image.opacity, 0.0);
        assert_eq!(image.transform.scale.x, 1.0);

        // 5% of 200 frames in, the slide has fully resolved.
        let mut resolved = Vec::new();
        emit(&mut resolved, &props, ctx_at(10, 300)).unwrap();
        let image = resolved.iter().find(|n| n.id == "slide.0").unwrap();
        assert_eq!(image.opacity, 1.0);

        // The push-in runs the whole slide.
        let mut late = Vec::new();
        emit(&mut late, &props, ctx_at(100, 300)).unwrap();
        let image = late.iter().find(|n| n.id == "slide.0").unwrap();
        assert!((image.transform.scale.x - 1.015).abs() < 1e-9);
        assert_eq!(image.transform.anchor, Vec2::new(960.0, 540.0));
    }

    #[test]
    fn active_pill_is_wide_and_colored() {
        let props = props();
        let mut nodes = Vec::new();
        emit(&mut nodes, &props, ctx_at(250, 300)).unwrap();
        let first = nodes.iter().find(|n| n.id == "indicator.0").unwrap();
        let second = nodes.iter().find(|n| n.id == "indicator.1").unwrap();
        match (&first.visual, &second.visual) {
            (Visual::Rect { rect: idle, fill: idle_fill, .. }, Visual::Rect { rect: active, fill, .. }) => {
                assert_eq!(idle.width(), 10.0);
                assert_eq!(active.width(), 24.0);
                assert_eq!(*fill, props.channel_color);
                assert_eq!(idle_fill.a, (0.4_f64 * 255.0).round() as u8);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn progress_tracks_the_deck_not_the_composition() {
        let props = props();
        // The deck is 300 frames; at frame 150 the line is half the canvas
        // even if the composition runs longer.
        let mut nodes = Vec::new();
        emit(&mut nodes, &props, ctx_at(150, 400)).unwrap();
        let bar = nodes.iter().find(|n| n.id == "progress").unwrap();
        match &bar.visual {
            Visual::Rect { rect, .. } => assert_eq!(rect.x1, 960.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn gap_frames_show_only_the_chrome() {
        let props = props();
        let mut nodes = Vec::new();
        emit(&mut nodes, &props, ctx_at(350, 400)).unwrap();
        assert!(!nodes.iter().any(|n| n.id.starts_with("slide.")));
        assert!(nodes.iter().any(|n| n.id == "indicator.0"));

        // Past the deck's end the progress line pins at full width.
        let bar = nodes.iter().find(|n| n.id == "progress").unwrap();
        match &bar.visual {
            Visual::Rect { rect, .. } => assert_eq!(rect.x1, 1920.0),
            _ => unreachable!(),
        }
    }
}
