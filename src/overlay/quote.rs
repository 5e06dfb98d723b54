//! Opening quote slide: a gold-dressed memorial card over near-black.
//!
//! Reveals run banner first, then the quote panel, then the portrait pops
//! in from the left with a late glow.

use kurbo::{Rect, Vec2};

use crate::animation::interp::interpolate_clamped;
use crate::foundation::core::{Canvas, FrameIndex, Rgba8, Transform2D};
use crate::foundation::error::KawaraResult;
use crate::overlay::approx_text_width;
use crate::overlay::slide::SLIDE_Z;
use crate::scene::tree::{ImageFit, SceneNode, TextAlign, TextStyle, Visual};

const GOLD: Rgba8 = Rgba8::rgb(0xc8, 0xa8, 0x4e);
const NEAR_BLACK: Rgba8 = Rgba8::rgb(0x0a, 0x0a, 0x0a);
const PANEL_FILL: Rgba8 = Rgba8::rgba(30, 30, 30, 230);

const PORTRAIT_ASSET: &str = "setouchi_jakucho.png";
const PORTRAIT_NAME: &str = "瀬戸内寂聴";
const PANEL_HEADER: &str = "瀬戸内寂聴の言葉";
const ATTRIBUTION: &str = "——瀬戸内寂聴";
const BANNER_TEXT: &str = "今日の一言";

/// Emits the quote slide for a frame inside `[0, duration)`.
pub(crate) fn emit_quote_slide(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    frame: FrameIndex,
    duration: u64,
    quote: &str,
) -> KawaraResult<()> {
    let f = frame.0 as f64;
    let dur = duration as f64;
    let fade_out = interpolate_clamped(f, &[dur - 15.0, dur], &[1.0, 0.0])?;
    let banner_opacity = interpolate_clamped(f, &[0.0, 20.0], &[0.0, 1.0])?;
    let text_opacity = interpolate_clamped(f, &[20.0, 45.0], &[0.0, 1.0])?;
    let icon_opacity = interpolate_clamped(f, &[50.0, 75.0], &[0.0, 1.0])?;
    let icon_scale = interpolate_clamped(f, &[50.0, 75.0], &[0.3, 1.0])?;
    let icon_slide = interpolate_clamped(f, &[50.0, 75.0], &[-120.0, 0.0])?;
    let glow = interpolate_clamped(f, &[60.0, 80.0], &[0.0, 1.0])?;

    let full = Rect::new(0.0, 0.0, canvas.width_f(), canvas.height_f());
    nodes.push(
        SceneNode::new(
            "quote.bg",
            SLIDE_Z,
            Visual::Rect {
                rect: full,
                fill: NEAR_BLACK,
                corner_radius: 0.0,
            },
        )
        .with_opacity(fade_out),
    );

    // Upper area between the top margin and the banner.
    let area_center_y = (60.0 + canvas.height_f() - 320.0) / 2.0;

    // Portrait block: 480px circle plus the name caption.
    let name_h = 36.0 * 1.2;
    let block_h = 480.0 + 16.0 + name_h;
    let icon = Rect::new(
        60.0,
        area_center_y - block_h / 2.0,
        540.0,
        area_center_y - block_h / 2.0 + 480.0,
    );
    let pop = Transform2D {
        translate: Vec2::new(icon_slide, 0.0),
        scale: Vec2::new(icon_scale, icon_scale),
        anchor: Vec2::new(icon.center().x, area_center_y),
        ..Transform2D::default()
    };
    if glow > 0.0 {
        nodes.push(
            SceneNode::new(
                "quote.icon.glow",
                SLIDE_Z,
                Visual::Arc {
                    center: icon.center(),
                    radius: 255.0,
                    stroke_width: 30.0,
                    start_angle: 0.0,
                    sweep_angle: std::f64::consts::TAU,
                    color: GOLD.with_alpha(glow * 0.8),
                },
            )
            .with_opacity(icon_opacity * fade_out)
            .with_transform(pop),
        );
    }
    nodes.push(
        SceneNode::new(
            "quote.icon.border",
            SLIDE_Z,
            Visual::Rect {
                rect: icon.inset(4.0),
                fill: GOLD,
                corner_radius: 244.0,
            },
        )
        .with_opacity(icon_opacity * fade_out)
        .with_transform(pop),
    );
    nodes.push(
        SceneNode::new(
            "quote.icon",
            SLIDE_Z,
            Visual::Image {
                rect: icon,
                asset: PORTRAIT_ASSET.to_owned(),
                fit: ImageFit::Cover,
                corner_radius: 240.0,
                brightness: 1.0,
            },
        )
        .with_opacity(icon_opacity * fade_out)
        .with_transform(pop),
    );
    nodes.push(
        SceneNode::new(
            "quote.icon.name",
            SLIDE_Z,
            Visual::Text {
                rect: Rect::new(60.0, icon.y1 + 16.0, 540.0, icon.y1 + 16.0 + name_h),
                content: PORTRAIT_NAME.to_owned(),
                style: TextStyle {
                    weight: 700,
                    ..TextStyle::centered(36.0, GOLD)
                },
            },
        )
        .with_opacity(icon_opacity * fade_out)
        .with_transform(pop),
    );

    // Quote panel fills the rest of the row.
    let panel_x0 = 600.0;
    let panel_x1 = canvas.width_f() - 60.0;
    let inner_w = panel_x1 - panel_x0 - 96.0;
    let quote_lines: f64 = quote
        .split('\n')
        .map(|seg| (approx_text_width(seg, 52.0) / inner_w).ceil().max(1.0))
        .sum();
    let quote_h = quote_lines * 52.0 * 1.6;
    let panel_h = 40.0 + 28.0 * 1.2 + 24.0 + quote_h + 24.0 + 30.0 * 1.2 + 40.0;
    let panel = Rect::new(
        panel_x0,
        area_center_y - panel_h / 2.0,
        panel_x1,
        area_center_y + panel_h / 2.0,
    );
    nodes.push(
        SceneNode::new(
            "quote.panel.border",
            SLIDE_Z,
            Visual::Rect {
                rect: panel.inset(2.0),
                fill: GOLD,
                corner_radius: 16.0,
            },
        )
        .with_opacity(text_opacity * fade_out),
    );
    nodes.push(
        SceneNode::new(
            "quote.panel",
            SLIDE_Z,
            Visual::Rect {
                rect: panel,
                fill: PANEL_FILL,
                corner_radius: 16.0,
            },
        )
        .with_opacity(text_opacity * fade_out),
    );
    let header_y = panel.y0 + 40.0;
    nodes.push(
        SceneNode::new(
            "quote.panel.header",
            SLIDE_Z,
            Visual::Text {
                rect: Rect::new(panel.x0 + 48.0, header_y, panel.x1 - 48.0, header_y + 34.0),
                content: PANEL_HEADER.to_owned(),
                style: TextStyle {
                    weight: 600,
                    ..TextStyle::new(28.0, GOLD)
                },
            },
        )
        .with_opacity(text_opacity * fade_out),
    );
    let quote_y = header_y + 34.0 + 24.0;
    nodes.push(
        SceneNode::new(
            "quote.panel.text",
            SLIDE_Z,
            Visual::Text {
                rect: Rect::new(panel.x0 + 48.0, quote_y, panel.x1 - 48.0, quote_y + quote_h),
                content: quote.to_owned(),
                style: TextStyle {
                    line_height: Some(1.6),
                    ..TextStyle::new(52.0, Rgba8::WHITE)
                },
            },
        )
        .with_opacity(text_opacity * fade_out),
    );
    let attribution_y = quote_y + quote_h + 24.0;
    nodes.push(
        SceneNode::new(
            "quote.panel.attribution",
            SLIDE_Z,
            Visual::Text {
                rect: Rect::new(
                    panel.x0 + 48.0,
                    attribution_y,
                    panel.x1 - 48.0,
                    attribution_y + 36.0,
                ),
                content: ATTRIBUTION.to_owned(),
                style: TextStyle {
                    weight: 600,
                    align: TextAlign::Right,
                    ..TextStyle::new(30.0, GOLD)
                },
            },
        )
        .with_opacity(text_opacity * fade_out),
    );

    // Bottom banner.
    let banner = Rect::new(
        0.0,
        canvas.height_f() - 280.0,
        canvas.width_f(),
        canvas.height_f(),
    );
    nodes.push(
        SceneNode::new(
            "quote.banner",
            SLIDE_Z,
            Visual::Rect {
                rect: banner,
                fill: Rgba8::BLACK.with_alpha(0.85),
                corner_radius: 0.0,
            },
        )
        .with_opacity(banner_opacity * fade_out),
    );
    nodes.push(
        SceneNode::new(
            "quote.banner.text",
            SLIDE_Z,
            Visual::Text {
                rect: banner,
                content: BANNER_TEXT.to_owned(),
                style: TextStyle {
                    weight: 900,
                    line_height: Some(1.3),
                    ..TextStyle::centered(128.0, Rgba8::rgb(0xff, 0xd7, 0x00))
                },
            },
        )
        .with_opacity(banner_opacity * fade_out),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_at(frame: u64) -> Vec<SceneNode> {
        let mut nodes = Vec::new();
        emit_quote_slide(
            &mut nodes,
            Canvas::full_hd(),
            FrameIndex(frame),
            168,
            "花のように\n生きなさい",
        )
        .unwrap();
        nodes
    }

    fn opacity_of(nodes: &[SceneNode], id: &str) -> f64 {
        nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.opacity)
            .unwrap()
    }

    #[test]
    fn reveals_run_banner_then_panel_then_portrait() {
        let nodes = emit_at(10);
        assert!((opacity_of(&nodes, "quote.banner") - 0.5).abs() < 1e-9);
        assert_eq!(opacity_of(&nodes, "quote.panel"), 0.0);
        assert_eq!(opacity_of(&nodes, "quote.icon"), 0.0);

        let nodes = emit_at(45);
        assert_eq!(opacity_of(&nodes, "quote.panel"), 1.0);
        assert_eq!(opacity_of(&nodes, "quote.icon"), 0.0);

        let nodes = emit_at(75);
        assert_eq!(opacity_of(&nodes, "quote.icon"), 1.0);
    }

    #[test]
    fn portrait_pops_in_from_the_left() {
        let nodes = emit_at(60);
        let icon = nodes.iter().find(|n| n.id == "quote.icon").unwrap();
        // 10 of 25 frames in: scale 0.3 + 0.7 * 0.4, offset -120 * 0.6.
        assert!((icon.transform.scale.x - 0.58).abs() < 1e-9);
        assert!((icon.transform.translate.x + 72.0).abs() < 1e-9);
    }

    #[test]
    fn glow_ring_appears_late() {
        assert!(!emit_at(55).iter().any(|n| n.id == "quote.icon.glow"));
        let nodes = emit_at(70);
        let glow = nodes.iter().find(|n| n.id == "quote.icon.glow").unwrap();
        match &glow.visual {
            Visual::Arc { color, .. } => assert_eq!(color.a, (0.5 * 0.8 * 255.0_f64).round() as u8),
            _ => unreachable!(),
        }
    }

    #[test]
    fn slide_fades_out_at_the_end() {
        let nodes = emit_at(163);
        for node in &nodes {
            assert!(node.opacity <= 1.0 / 3.0 + 1e-9);
        }
        assert!((opacity_of(&nodes, "quote.bg") - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn panel_height_tracks_the_quote_lines() {
        let one = emit_at(45);
        let mut two_nodes = Vec::new();
        emit_quote_slide(
            &mut two_nodes,
            Canvas::full_hd(),
            FrameIndex(45),
            168,
            "一行目\n二行目\n三行目\n四行目",
        )
        .unwrap();
        let h = |nodes: &[SceneNode]| match &nodes.iter().find(|n| n.id == "quote.panel").unwrap().visual {
            Visual::Rect { rect, .. } => rect.height(),
            _ => unreachable!(),
        };
        assert!(h(&two_nodes) > h(&one));
    }
}
