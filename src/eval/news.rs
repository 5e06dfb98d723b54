//! Main show assembly.
//!
//! Emits the full studio frame in painter layers: backdrop, opening slide,
//! transition covers on the way into the back room, data overlays, cast and
//! subtitles. Covered layers are still emitted; the fade, blackout and label
//! covers simply draw over them, so a frame inside a transition window keeps
//! the same body underneath.

use kurbo::{Rect, Vec2};

use crate::animation::interp::interpolate_clamped;
use crate::eval::evaluator::EvalCtx;
use crate::foundation::core::{Canvas, FrameIndex, Rgba8, Transform2D};
use crate::foundation::error::KawaraResult;
use crate::overlay::budget::emit_budget;
use crate::overlay::characters::emit_cast;
use crate::overlay::chart::{CHART_Z, ChartLayout, emit_chart};
use crate::overlay::checklist::emit_checklist;
use crate::overlay::letter::emit_letter;
use crate::overlay::quote::emit_quote_slide;
use crate::overlay::slide::emit_title_slide;
use crate::overlay::subtitle::{SUBTITLE_Z, emit_centered_subtitle, emit_subtitle};
use crate::overlay::ticker::{emit_progress, emit_source, emit_ticker};
use crate::scene::tree::{SceneNode, TextAlign, TextStyle, Visual};
use crate::show::props::{LayoutPattern, NewsShowProps};
use crate::timeline::script::active_line;
use crate::timeline::segments::Segment;
use crate::timeline::triggers::resolve_active;

const FADE_Z: i32 = 999;
const LABEL_Z: i32 = 1000;

/// The translucent bar takes the bottom 40% of the canvas.
const BAR_FRACTION: f64 = 0.40;

/// Frames after the opening slide at which the side overlays mount.
const OVERLAY_DELAY: u64 = 48;

const CHALK_IMAGE: &str = "chalk_illustration.png";
const BACK_ROOM_LABEL: &str = "控 室 に て";

fn full(canvas: Canvas) -> Rect {
    Rect::new(0.0, 0.0, canvas.width_f(), canvas.height_f())
}

pub(crate) fn emit(
    nodes: &mut Vec<SceneNode>,
    props: &NewsShowProps,
    ctx: EvalCtx,
    slide_duration: u64,
    back_room_start: Option<FrameIndex>,
) -> KawaraResult<()> {
    let frame = ctx.frame;
    let canvas = ctx.canvas;
    let f = frame.0 as f64;
    let bar_top = canvas.height_f() * (1.0 - BAR_FRACTION);

    let line = active_line(&props.script, frame);
    let back_room = line.is_some_and(|(_, l)| l.is_back_room());
    let ending = line.is_some_and(|(_, l)| l.is_ending());
    let chart = resolve_active(frame, &props.chart_data, |t| t.trigger_frame);

    // Backdrop: the studio photo with a slow push-in, black once the hosts
    // have moved to the back room. The image box overscans vertically so the
    // zoom never exposes an edge.
    if back_room {
        nodes.push(SceneNode::new(
            "backdrop.backroom",
            0,
            Visual::Rect {
                rect: full(canvas),
                fill: Rgba8::BLACK,
                corner_radius: 0.0,
            },
        ));
    } else if frame.0 >= slide_duration {
        let zoom = interpolate_clamped(f, &[0.0, ctx.duration as f64], &[1.0, 1.08])?;
        let top = -0.075 * canvas.width_f();
        let image = Rect::new(
            0.0,
            top,
            canvas.width_f(),
            top + 1.15 * canvas.height_f(),
        );
        let center = image.center();
        nodes.push(
            SceneNode::new(
                "backdrop.studio",
                0,
                Visual::image(image, props.background_image.clone()),
            )
            .with_transform(Transform2D {
                scale: Vec2::new(zoom, zoom),
                anchor: Vec2::new(center.x, center.y),
                ..Transform2D::default()
            }),
        );
    }

    // Opening slide. A configured quote wins over the plain title card.
    if frame.0 < slide_duration {
        if let Some(quote) = &props.quote {
            emit_quote_slide(nodes, canvas, frame, slide_duration, quote)?;
        } else if let Some(image) = &props.slide_image {
            emit_title_slide(
                nodes,
                canvas,
                frame,
                slide_duration,
                image,
                &props.title,
                props.channel_color,
            );
        }
    }

    emit_transition(nodes, props, ctx, slide_duration, back_room_start)?;

    if frame.0 >= slide_duration && !ending && chart.is_none() {
        let texts: Vec<String> = match &props.ticker {
            Some(texts) => texts.clone(),
            None => std::iter::once(props.title.clone())
                .chain(props.key_points.iter().cloned())
                .collect(),
        };
        emit_ticker(nodes, canvas, frame, &texts);
    }

    if !back_room {
        emit_source(nodes, canvas, bar_top, &props.source);
    }

    nodes.push(SceneNode::new(
        "bar.shade",
        SUBTITLE_Z,
        Visual::Rect {
            rect: Rect::new(0.0, bar_top, canvas.width_f(), canvas.height_f()),
            fill: Rgba8::BLACK.with_alpha(0.75),
            corner_radius: 0.0,
        },
    ));

    // Active chart: chalkboard dressing on the left, data panel beside it.
    // Switching triggers swaps the panel without an outgoing fade.
    if let Some(win) = chart {
        let trigger = &props.chart_data[win.index];
        let elapsed = win.elapsed(frame);
        let slide_in = interpolate_clamped(elapsed, &[0.0, 12.0], &[40.0, 0.0])?;
        let fade_in = interpolate_clamped(elapsed, &[0.0, 8.0], &[0.0, 1.0])?;
        let panel = Rect::new(0.0, 0.0, canvas.width_f() / 2.0, bar_top - 4.0);
        let shift = Transform2D::translated(-slide_in, 0.0);
        nodes.push(
            SceneNode::new(
                "chalk.panel",
                CHART_Z,
                Visual::Rect {
                    rect: panel,
                    fill: Rgba8::BLACK,
                    corner_radius: 0.0,
                },
            )
            .with_opacity(fade_in)
            .with_transform(shift),
        );
        nodes.push(
            SceneNode::new("chalk.image", CHART_Z, Visual::image(panel, CHALK_IMAGE))
                .with_opacity(fade_in)
                .with_transform(shift),
        );
        emit_chart(nodes, &trigger.data, elapsed, ChartLayout::Compact)?;
    }

    let overlay_start = FrameIndex(slide_duration + OVERLAY_DELAY);
    match props.layout_pattern {
        Some(LayoutPattern::Documentary) => {
            if let Some(data) = &props.household_budget {
                emit_budget(nodes, frame, overlay_start, data, props.channel_color)?;
            }
        }
        Some(LayoutPattern::Checklist) => {
            if let Some(data) = &props.checklist {
                emit_checklist(nodes, canvas, frame, data, props.channel_color)?;
            }
        }
        Some(LayoutPattern::Radio) => {
            if let Some(data) = &props.listener_letter {
                emit_letter(nodes, canvas, frame, overlay_start, data, props.channel_color)?;
            }
        }
        None => {}
    }

    emit_progress(nodes, canvas, frame, ctx.duration, props.channel_color);

    if !back_room {
        emit_cast(
            nodes,
            canvas,
            frame,
            line.map(|(_, l)| (l.speaker, l.emotion.as_str())),
        );
    }

    if let Some((_, l)) = line {
        if back_room {
            emit_centered_subtitle(nodes, canvas, l, bar_top);
        } else {
            emit_subtitle(
                nodes,
                canvas,
                frame,
                l,
                bar_top,
                props.subtitle_style,
                props.subtitle_color,
            )?;
        }
    }

    Ok(())
}

/// Covers for the walk from the studio to the back room: a ramped fade, a
/// silent blackout, then the location label over black.
fn emit_transition(
    nodes: &mut Vec<SceneNode>,
    props: &NewsShowProps,
    ctx: EvalCtx,
    slide_duration: u64,
    back_room_start: Option<FrameIndex>,
) -> KawaraResult<()> {
    let timing = if slide_duration == 0 {
        props.timing.without_opening()
    } else {
        props.timing
    };
    let Some(start) = back_room_start else {
        return Ok(());
    };
    let canvas = ctx.canvas;
    match timing.segment_at(ctx.frame, back_room_start) {
        Segment::FadeToBlack => {
            let fade_from = start.0 as i64 - timing.fade_out_lead as i64;
            let elapsed = (ctx.frame.0 as i64 - fade_from).max(0) as f64;
            let fade_len = (timing.fade_out_lead - timing.blackout_lead).max(1) as f64;
            nodes.push(
                SceneNode::new(
                    "transition.fade",
                    FADE_Z,
                    Visual::Rect {
                        rect: full(canvas),
                        fill: Rgba8::BLACK,
                        corner_radius: 0.0,
                    },
                )
                .with_opacity((elapsed / fade_len).min(1.0)),
            );
        }
        Segment::Blackout => {
            nodes.push(SceneNode::new(
                "transition.blackout",
                FADE_Z,
                Visual::Rect {
                    rect: full(canvas),
                    fill: Rgba8::BLACK,
                    corner_radius: 0.0,
                },
            ));
        }
        Segment::BackRoomLabel => {
            let label_from = start.0 as i64 - timing.label_lead as i64;
            let elapsed = (ctx.frame.0 as i64 - label_from).max(0) as f64;
            let text_opacity = if elapsed < 30.0 {
                0.0
            } else {
                ((elapsed - 30.0) / 15.0).min(1.0)
            };
            nodes.push(SceneNode::new(
                "label.cover",
                LABEL_Z,
                Visual::Rect {
                    rect: full(canvas),
                    fill: Rgba8::BLACK,
                    corner_radius: 0.0,
                },
            ));
            let mid = canvas.height_f() / 2.0;
            nodes.push(
                SceneNode::new(
                    "label.text",
                    LABEL_Z,
                    Visual::Text {
                        rect: Rect::new(0.0, mid - 72.0, canvas.width_f(), mid + 72.0),
                        content: BACK_ROOM_LABEL.to_owned(),
                        style: TextStyle {
                            letter_spacing: 24.0,
                            line_height: Some(1.2),
                            align: TextAlign::Center,
                            ..TextStyle::new(120.0, Rgba8::WHITE)
                        },
                    },
                )
                .with_opacity(text_opacity),
            );
        }
        _ => {}
    }
    Ok(())
}
