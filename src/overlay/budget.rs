//! Household budget panel for the documentary layout.
//!
//! A ledger card: pension income up top, expenses dropping in one by one,
//! and the remainder with a health bar that goes red in deficit.

use kurbo::Rect;

use crate::animation::interp::interpolate_clamped;
use crate::foundation::core::{FrameIndex, Rgba8, Transform2D};
use crate::foundation::error::KawaraResult;
use crate::foundation::math::group_thousands;
use crate::scene::tree::{SceneNode, TextAlign, TextStyle, Visual};
use crate::show::props::HouseholdBudgetData;

pub(crate) const BUDGET_Z: i32 = 30;

const GOLD: Rgba8 = Rgba8::rgb(0xff, 0xd7, 0x00);
const INCOME_GREEN: Rgba8 = Rgba8::rgb(0x4c, 0xaf, 0x50);
const DEFICIT_RED: Rgba8 = Rgba8::rgb(0xff, 0x33, 0x33);

/// Emits the budget panel. `start` is when the panel mounts; before that
/// nothing is drawn.
pub(crate) fn emit_budget(
    nodes: &mut Vec<SceneNode>,
    frame: FrameIndex,
    start: FrameIndex,
    data: &HouseholdBudgetData,
    channel_color: Rgba8,
) -> KawaraResult<()> {
    if frame.0 < start.0 {
        return Ok(());
    }
    let elapsed = (frame.0 - start.0) as f64;
    let fade = interpolate_clamped(elapsed, &[0.0, 20.0], &[0.0, 1.0])?;
    if fade <= 0.0 {
        return Ok(());
    }

    let panel = Rect::new(810.0, 10.0, 1630.0, 650.0);
    nodes.push(
        SceneNode::new(
            "budget.panel",
            BUDGET_Z,
            Visual::Rect {
                rect: panel,
                fill: Rgba8::BLACK.with_alpha(0.88),
                corner_radius: 16.0,
            },
        )
        .with_opacity(fade),
    );
    nodes.push(
        SceneNode::new(
            "budget.accent",
            BUDGET_Z,
            Visual::Rect {
                rect: Rect::new(panel.x0, panel.y0, panel.x0 + 6.0, panel.y1),
                fill: channel_color,
                corner_radius: 3.0,
            },
        )
        .with_opacity(fade),
    );

    let x0 = panel.x0 + 28.0;
    let x1 = panel.x1 - 28.0;
    let top = panel.y0 + 24.0;
    let bottom = panel.y1 - 24.0;

    nodes.push(
        SceneNode::new(
            "budget.header",
            BUDGET_Z,
            Visual::Text {
                rect: Rect::new(x0, top, x1, top + 43.2),
                content: format!("{}の家計簿", data.person_label),
                style: TextStyle {
                    weight: 900,
                    ..TextStyle::new(36.0, GOLD)
                },
            },
        )
        .with_opacity(fade),
    );
    let rule_y = top + 43.2 + 10.0;
    nodes.push(
        SceneNode::new(
            "budget.header.rule",
            BUDGET_Z,
            Visual::Rect {
                rect: Rect::new(x0, rule_y, x1, rule_y + 3.0),
                fill: Rgba8::WHITE.with_alpha(0.25),
                corner_radius: 0.0,
            },
        )
        .with_opacity(fade),
    );

    let income_y = rule_y + 3.0 + 8.0;
    let income_style = TextStyle {
        weight: 700,
        ..TextStyle::new(38.0, INCOME_GREEN)
    };
    nodes.push(
        SceneNode::new(
            "budget.income.label",
            BUDGET_Z,
            Visual::Text {
                rect: Rect::new(x0, income_y, x1, income_y + 45.6),
                content: "年金収入".to_owned(),
                style: income_style.clone(),
            },
        )
        .with_opacity(fade),
    );
    nodes.push(
        SceneNode::new(
            "budget.income.value",
            BUDGET_Z,
            Visual::Text {
                rect: Rect::new(x0, income_y, x1, income_y + 45.6),
                content: format!("{}円", group_thousands(data.income)),
                style: TextStyle {
                    align: TextAlign::Right,
                    ..income_style
                },
            },
        )
        .with_opacity(fade),
    );
    let divider_y = income_y + 45.6 + 8.0;
    nodes.push(
        SceneNode::new(
            "budget.divider",
            BUDGET_Z,
            Visual::Rect {
                rect: Rect::new(x0, divider_y, x1, divider_y + 2.0),
                fill: Rgba8::WHITE.with_alpha(0.15),
                corner_radius: 0.0,
            },
        )
        .with_opacity(fade),
    );

    // Fixed footer geometry, measured up from the panel floor.
    let bar = Rect::new(x0, bottom - 12.0, x1, bottom);
    let total_y1 = bar.y0 - 8.0;
    let total_y0 = total_y1 - 52.8;
    let total_rule_y = total_y0 - 10.0 - 3.0;
    let rows_top = divider_y + 2.0 + 8.0;
    let rows_bottom = total_rule_y - 6.0;

    let total_expenses: i64 = data.expenses.iter().map(|e| e.amount).sum();
    let remaining = data.income - total_expenses;
    let deficit = remaining < 0;

    let stride = if data.expenses.is_empty() {
        0.0
    } else {
        (rows_bottom - rows_top) / data.expenses.len() as f64
    };
    for (i, entry) in data.expenses.iter().enumerate() {
        let delay = 10.0 + i as f64 * 8.0;
        let progress = interpolate_clamped(elapsed - delay, &[0.0, 15.0], &[0.0, 1.0])?;
        let slide = Transform2D::translated((1.0 - progress) * 30.0, 0.0);
        let y = rows_top + stride * (i as f64 + 0.5) - 19.2;
        let row_style = TextStyle {
            weight: 600,
            ..TextStyle::new(32.0, Rgba8::WHITE.with_alpha(0.9))
        };
        nodes.push(
            SceneNode::new(
                format!("budget.expense{i}.label"),
                BUDGET_Z,
                Visual::Text {
                    rect: Rect::new(x0, y, x1, y + 38.4),
                    content: entry.label.clone(),
                    style: row_style.clone(),
                },
            )
            .with_opacity(fade * progress)
            .with_transform(slide),
        );
        nodes.push(
            SceneNode::new(
                format!("budget.expense{i}.value"),
                BUDGET_Z,
                Visual::Text {
                    rect: Rect::new(x0, y, x1, y + 38.4),
                    content: format!("-{}円", group_thousands(entry.amount)),
                    style: TextStyle {
                        align: TextAlign::Right,
                        ..row_style
                    },
                },
            )
            .with_opacity(fade * progress)
            .with_transform(slide),
        );
    }

    nodes.push(
        SceneNode::new(
            "budget.total.rule",
            BUDGET_Z,
            Visual::Rect {
                rect: Rect::new(x0, total_rule_y, x1, total_rule_y + 3.0),
                fill: Rgba8::WHITE.with_alpha(0.3),
                corner_radius: 0.0,
            },
        )
        .with_opacity(fade),
    );
    let total_color = if deficit { DEFICIT_RED } else { GOLD };
    let total_style = TextStyle {
        weight: 900,
        ..TextStyle::new(44.0, total_color)
    };
    nodes.push(
        SceneNode::new(
            "budget.total.label",
            BUDGET_Z,
            Visual::Text {
                rect: Rect::new(x0, total_y0, x1, total_y1),
                content: "残り".to_owned(),
                style: total_style.clone(),
            },
        )
        .with_opacity(fade),
    );
    nodes.push(
        SceneNode::new(
            "budget.total.value",
            BUDGET_Z,
            Visual::Text {
                rect: Rect::new(x0, total_y0, x1, total_y1),
                content: format!("{}円", group_thousands(remaining)),
                style: TextStyle {
                    align: TextAlign::Right,
                    ..total_style
                },
            },
        )
        .with_opacity(fade),
    );

    nodes.push(
        SceneNode::new(
            "budget.bar.track",
            BUDGET_Z,
            Visual::Rect {
                rect: bar,
                fill: Rgba8::WHITE.with_alpha(0.15),
                corner_radius: 6.0,
            },
        )
        .with_opacity(fade),
    );
    let fraction = if data.income > 0 {
        (remaining as f64 / data.income as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    nodes.push(
        SceneNode::new(
            "budget.bar.fill",
            BUDGET_Z,
            Visual::Rect {
                rect: Rect::new(bar.x0, bar.y0, bar.x0 + bar.width() * fraction, bar.y1),
                fill: if deficit { DEFICIT_RED } else { INCOME_GREEN },
                corner_radius: 6.0,
            },
        )
        .with_opacity(fade),
    );
    Ok(())
}
