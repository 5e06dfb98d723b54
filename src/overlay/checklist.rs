//! Benefit checklist panel. Items tick off as the script reaches them.

use kurbo::{Rect, Vec2};

use crate::animation::interp::interpolate_clamped;
use crate::foundation::core::{Canvas, FrameIndex, Rgba8, Transform2D};
use crate::foundation::error::KawaraResult;
use crate::scene::tree::{SceneNode, TextAlign, TextStyle, Visual};
use crate::show::props::ChecklistData;

pub(crate) const SIDE_PANEL_Z: i32 = 45;

const GOLD: Rgba8 = Rgba8::rgb(0xff, 0xd7, 0x00);
const CHECK_GREEN: Rgba8 = Rgba8::rgb(0x4c, 0xaf, 0x50);

const HEADER_H: f64 = 28.0 * 1.2;
const ROW_H: f64 = 24.0 * 1.2 + 20.0 * 1.2;
const ROW_STRIDE: f64 = ROW_H + 8.0;
const FOOTER_H: f64 = 22.0 * 1.2;

/// Emits the checklist. This panel runs on the absolute frame clock, not a
/// mount offset, because check frames come straight from the script timing.
pub(crate) fn emit_checklist(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    frame: FrameIndex,
    data: &ChecklistData,
    channel_color: Rgba8,
) -> KawaraResult<()> {
    let f = frame.0 as f64;
    let fade = interpolate_clamped(f, &[0.0, 20.0], &[0.0, 1.0])?;
    if fade <= 0.0 {
        return Ok(());
    }

    let x1 = canvas.width_f() - 310.0;
    let x0 = x1 - 520.0;
    let checked = data
        .items
        .iter()
        .filter(|item| frame.0 >= item.checked_at_frame.0)
        .count();

    let header_block = HEADER_H + 8.0 + 2.0 + 10.0;
    let rows_block = data.items.len() as f64 * ROW_STRIDE;
    let footer_block = if checked > 0 {
        2.0 + 6.0 + FOOTER_H + 6.0
    } else {
        0.0
    };
    let panel = Rect::new(
        x0,
        10.0,
        x1,
        10.0 + 14.0 + header_block + rows_block + footer_block + 14.0,
    );
    nodes.push(
        SceneNode::new(
            "checklist.panel",
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
            "checklist.accent",
            SIDE_PANEL_Z,
            Visual::Rect {
                rect: Rect::new(panel.x0, panel.y0, panel.x0 + 5.0, panel.y1),
                fill: channel_color,
                corner_radius: 2.5,
            },
        )
        .with_opacity(fade),
    );

    let cx0 = panel.x0 + 18.0;
    let cx1 = panel.x1 - 18.0;
    let header_y = panel.y0 + 14.0;
    nodes.push(
        SceneNode::new(
            "checklist.header",
            SIDE_PANEL_Z,
            Visual::Text {
                rect: Rect::new(cx0, header_y, cx1, header_y + HEADER_H),
                content: data.title.clone(),
                style: TextStyle {
                    weight: 900,
                    ..TextStyle::centered(28.0, GOLD)
                },
            },
        )
        .with_opacity(fade),
    );
    let rule_y = header_y + HEADER_H + 8.0;
    nodes.push(
        SceneNode::new(
            "checklist.header.rule",
            SIDE_PANEL_Z,
            Visual::Rect {
                rect: Rect::new(cx0, rule_y, cx1, rule_y + 2.0),
                fill: Rgba8::WHITE.with_alpha(0.2),
                corner_radius: 0.0,
            },
        )
        .with_opacity(fade),
    );

    let rows_top = rule_y + 2.0 + 10.0;
    for (i, item) in data.items.iter().enumerate() {
        let is_checked = frame.0 >= item.checked_at_frame.0;
        let check_anim = if is_checked {
            interpolate_clamped(
                (frame.0 - item.checked_at_frame.0) as f64,
                &[0.0, 10.0],
                &[0.0, 1.0],
            )?
        } else {
            0.0
        };
        let reveal = interpolate_clamped(
            f,
            &[i as f64 * 8.0, i as f64 * 8.0 + 15.0],
            &[0.0, 1.0],
        )?;
        let opacity = fade * reveal;
        let slide = Transform2D::translated((1.0 - reveal) * 20.0, 0.0);
        let y = rows_top + i as f64 * ROW_STRIDE;

        let box_rect = Rect::new(cx0, y + (ROW_H - 32.0) / 2.0, cx0 + 32.0, y + (ROW_H - 32.0) / 2.0 + 32.0);
        nodes.push(
            SceneNode::new(
                format!("checklist.item{i}.box"),
                SIDE_PANEL_Z,
                Visual::Rect {
                    rect: box_rect,
                    fill: if is_checked {
                        CHECK_GREEN
                    } else {
                        Rgba8::WHITE.with_alpha(0.4)
                    },
                    corner_radius: 6.0,
                },
            )
            .with_opacity(opacity)
            .with_transform(slide),
        );
        nodes.push(
            SceneNode::new(
                format!("checklist.item{i}.box.inner"),
                SIDE_PANEL_Z,
                Visual::Rect {
                    rect: box_rect.inset(-3.0),
                    fill: if is_checked {
                        CHECK_GREEN.with_alpha(0.3)
                    } else {
                        Rgba8::BLACK.with_alpha(0.88)
                    },
                    corner_radius: 4.0,
                },
            )
            .with_opacity(opacity)
            .with_transform(slide),
        );
        if is_checked {
            nodes.push(
                SceneNode::new(
                    format!("checklist.item{i}.ok"),
                    SIDE_PANEL_Z,
                    Visual::Text {
                        rect: box_rect,
                        content: "OK".to_owned(),
                        style: TextStyle {
                            weight: 900,
                            ..TextStyle::centered(22.0, CHECK_GREEN)
                        },
                    },
                )
                .with_opacity(opacity * check_anim)
                .with_transform(Transform2D {
                    translate: slide.translate,
                    scale: Vec2::new(0.5 + check_anim * 0.5, 0.5 + check_anim * 0.5),
                    anchor: box_rect.center().to_vec2(),
                    ..Transform2D::default()
                }),
            );
        }

        let text_x = box_rect.x1 + 10.0;
        nodes.push(
            SceneNode::new(
                format!("checklist.item{i}.label"),
                SIDE_PANEL_Z,
                Visual::Text {
                    rect: Rect::new(text_x, y, cx1, y + 24.0 * 1.2),
                    content: item.label.clone(),
                    style: TextStyle {
                        weight: 700,
                        ..TextStyle::new(24.0, if is_checked { CHECK_GREEN } else { Rgba8::WHITE })
                    },
                },
            )
            .with_opacity(opacity)
            .with_transform(slide),
        );
        nodes.push(
            SceneNode::new(
                format!("checklist.item{i}.amount"),
                SIDE_PANEL_Z,
                Visual::Text {
                    rect: Rect::new(text_x, y + 24.0 * 1.2, cx1, y + ROW_H),
                    content: item.amount.clone(),
                    style: TextStyle {
                        weight: 500,
                        ..TextStyle::new(
                            20.0,
                            if is_checked {
                                CHECK_GREEN.with_alpha(0.8)
                            } else {
                                Rgba8::WHITE.with_alpha(0.6)
                            },
                        )
                    },
                },
            )
            .with_opacity(opacity)
            .with_transform(slide),
        );
        if is_checked {
            nodes.push(
                SceneNode::new(
                    format!("checklist.item{i}.get"),
                    SIDE_PANEL_Z,
                    Visual::Text {
                        rect: Rect::new(text_x, y, cx1, y + ROW_H),
                        content: "GET!".to_owned(),
                        style: TextStyle {
                            weight: 900,
                            align: TextAlign::Right,
                            ..TextStyle::new(22.0, GOLD)
                        },
                    },
                )
                .with_opacity(opacity * check_anim)
                .with_transform(slide),
            );
        }
    }

    if checked > 0 {
        let footer_rule_y = rows_top + rows_block + 2.0;
        nodes.push(
            SceneNode::new(
                "checklist.footer.rule",
                SIDE_PANEL_Z,
                Visual::Rect {
                    rect: Rect::new(cx0, footer_rule_y, cx1, footer_rule_y + 2.0),
                    fill: Rgba8::WHITE.with_alpha(0.3),
                    corner_radius: 0.0,
                },
            )
            .with_opacity(fade),
        );
        let footer_y = footer_rule_y + 2.0 + 6.0;
        nodes.push(
            SceneNode::new(
                "checklist.footer",
                SIDE_PANEL_Z,
                Visual::Text {
                    rect: Rect::new(cx0, footer_y, cx1, footer_y + FOOTER_H),
                    content: format!("{checked}/{} 件確認済み", data.items.len()),
                    style: TextStyle {
                        weight: 700,
                        ..TextStyle::centered(22.0, GOLD)
                    },
                },
            )
            .with_opacity(fade),
        );
    }
    Ok(())
}
