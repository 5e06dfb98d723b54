//! Animated data-chart panels.
//!
//! Eight chart kinds share one panel chrome and one animation clock: the
//! frames elapsed since the chart's trigger. Geometry builds up over 60
//! frames, the panel fades in over the first 10, and staggered kinds
//! (ranking, poll) delay each row on top of that.

use kurbo::{Point, Rect, Vec2};

use crate::animation::curves::{count_up, stagger_progress};
use crate::animation::interp::interpolate_clamped;
use crate::foundation::core::{FrameIndex, Rgba8, Transform2D};
use crate::foundation::error::{KawaraError, KawaraResult};
use crate::foundation::math::group_thousands;
use crate::overlay::approx_text_width;
use crate::overlay::sentiment::{classify_label, sentiment_color};
use crate::scene::tree::{SceneNode, TextAlign, TextStyle, Visual, scale_opacity};

/// Painter layer shared by the whole chart block.
pub(crate) const CHART_Z: i32 = 100;

const LABEL_LINE_HEIGHT: f64 = 1.15;
const VALUE_LINE_HEIGHT: f64 = 1.1;

const UNIT_GREY: Rgba8 = Rgba8::rgb(0xcc, 0xcc, 0xcc);
const NEGATIVE_VALUE: Rgba8 = Rgba8::rgb(0xff, 0x33, 0x33);
const NEGATIVE_UNIT: Rgba8 = Rgba8::rgb(0xff, 0x66, 0x66);
const COMPARE_RIGHT_FILL: Rgba8 = Rgba8::rgb(0x66, 0x66, 0x66);
const COMPARE_RIGHT_TEXT: Rgba8 = Rgba8::rgb(0x99, 0x99, 0x99);
const QUIZ_GOLD: Rgba8 = Rgba8::rgb(0xff, 0xd7, 0x00);
const MEDALS: [Rgba8; 3] = [
    Rgba8::rgb(0xff, 0xd7, 0x00),
    Rgba8::rgb(0xc0, 0xc0, 0xc0),
    Rgba8::rgb(0xcd, 0x7f, 0x32),
];
const POLL_RUNNER_UP: [Rgba8; 4] = [
    Rgba8::rgb(0x2e, 0xcc, 0x71),
    Rgba8::rgb(0x27, 0xae, 0x60),
    Rgba8::rgb(0x1a, 0xbc, 0x9c),
    Rgba8::rgb(0x16, 0xa0, 0x85),
];

/// Closed set of chart visualizations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Horizontal bar growing toward a maximum.
    Bar,
    /// Large count-up number.
    Number,
    /// Ring that fills clockwise, value beside it.
    Pie,
    /// Ring with the value in its center.
    Donut,
    /// Two-sided share bar.
    Compare,
    /// Card that flips from `???` to the value.
    Flipcard,
    /// Top-three list with medals and bars.
    Ranking,
    /// Vote shares with per-item percentages.
    Poll,
}

/// One series entry for ranking and poll charts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartItem {
    pub label: String,
    pub value: f64,
}

/// Static payload of one chart overlay.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub label: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ChartItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Styles a number chart as a loss: red value with a bounce loop.
    #[serde(default)]
    pub negative: bool,
}

impl ChartSpec {
    /// Structural checks run at show load, before any frame is evaluated.
    pub(crate) fn validate(&self, ctx: &str) -> KawaraResult<()> {
        if self.label.is_empty() {
            return Err(KawaraError::validation(format!("{ctx}: empty label")));
        }
        if !self.value.is_finite() {
            return Err(KawaraError::validation(format!("{ctx}: non-finite value")));
        }
        if matches!(self.kind, ChartKind::Ranking | ChartKind::Poll) && self.items.is_empty() {
            return Err(KawaraError::validation(format!(
                "{ctx}: {:?} chart needs at least one item",
                self.kind
            )));
        }
        for (i, item) in self.items.iter().enumerate() {
            if !item.value.is_finite() || item.value < 0.0 {
                return Err(KawaraError::validation(format!(
                    "{ctx}: item {i} ({}) has a bad value",
                    item.label
                )));
            }
        }
        Ok(())
    }
}

/// A chart scheduled to take over the chart window at a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartTrigger {
    pub trigger_frame: FrameIndex,
    pub data: ChartSpec,
}

/// Panel geometry variant. The flagship show always uses the compact panel
/// beside the illustration; the full panel spans the usable width for
/// chart-first cuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChartLayout {
    Compact,
    Full,
}

impl ChartLayout {
    fn panel_rect(self) -> Rect {
        match self {
            ChartLayout::Compact => Rect::new(280.0, 10.0, 800.0, 650.0),
            ChartLayout::Full => Rect::new(310.0, 10.0, 1610.0, 650.0),
        }
    }

    fn content_rect(self) -> Rect {
        match self {
            ChartLayout::Compact => self.panel_rect().inset((-18.0, -20.0)),
            ChartLayout::Full => self.panel_rect().inset((-16.0, -12.0)),
        }
    }

    /// Compact panels center their stack; full panels run top-down.
    fn centers(self) -> bool {
        matches!(self, ChartLayout::Compact)
    }

    fn label_font_size(self, label: &str) -> f64 {
        let n = label.chars().count();
        match self {
            ChartLayout::Compact => match n {
                0..=6 => 56.0,
                7..=10 => 46.0,
                _ => 38.0,
            },
            ChartLayout::Full => match n {
                0..=6 => 100.0,
                7..=10 => 80.0,
                11..=14 => 68.0,
                15..=18 => 60.0,
                19..=24 => 52.0,
                _ => 44.0,
            },
        }
    }

    fn number_font_size(self, formatted_len: usize) -> f64 {
        match self {
            ChartLayout::Compact => match formatted_len {
                0..=3 => 130.0,
                4..=5 => 100.0,
                6..=7 => 80.0,
                _ => 64.0,
            },
            ChartLayout::Full => match formatted_len {
                0..=3 => 280.0,
                4..=5 => 200.0,
                6..=7 => 160.0,
                8..=9 => 120.0,
                _ => 100.0,
            },
        }
    }
}

/// Emits the active chart at `elapsed` frames past its trigger. The caller
/// owns the surrounding dressing (illustration panel, trigger resolution).
pub(crate) fn emit_chart(
    nodes: &mut Vec<SceneNode>,
    spec: &ChartSpec,
    elapsed: f64,
    layout: ChartLayout,
) -> KawaraResult<()> {
    let progress = interpolate_clamped(elapsed, &[0.0, 60.0], &[0.0, 1.0])?;
    let fade = interpolate_clamped(elapsed, &[0.0, 10.0], &[0.0, 1.0])?;
    let accent = sentiment_color(classify_label(&spec.label));

    let mut chart = Vec::new();
    push_panel(&mut chart, layout, accent);
    match spec.kind {
        ChartKind::Bar => bar(&mut chart, spec, layout, progress, accent),
        ChartKind::Number => number(&mut chart, spec, layout, elapsed, progress, accent)?,
        ChartKind::Pie => ring(&mut chart, spec, layout, progress, accent, RingStyle::Pie),
        ChartKind::Donut => ring(&mut chart, spec, layout, progress, accent, RingStyle::Donut),
        ChartKind::Compare => compare(&mut chart, spec, layout, progress, accent),
        ChartKind::Flipcard => flipcard(&mut chart, spec, layout, elapsed, accent)?,
        ChartKind::Ranking => ranking(&mut chart, spec, layout, elapsed, accent),
        ChartKind::Poll => poll(&mut chart, spec, layout, elapsed, accent),
    }
    scale_opacity(&mut chart, fade);
    nodes.append(&mut chart);
    Ok(())
}

fn push_panel(chart: &mut Vec<SceneNode>, layout: ChartLayout, accent: Rgba8) {
    let panel = layout.panel_rect();
    chart.push(SceneNode::new(
        "chart.panel",
        CHART_Z,
        Visual::Rect {
            rect: panel,
            fill: Rgba8::BLACK.with_alpha(0.85),
            corner_radius: 16.0,
        },
    ));
    chart.push(SceneNode::new(
        "chart.accent",
        CHART_Z,
        Visual::Rect {
            rect: Rect::new(panel.x0, panel.y0, panel.x0 + 6.0, panel.y1),
            fill: accent,
            corner_radius: 0.0,
        },
    ));
}

fn label_node(text: &str, layout: ChartLayout, y: f64, size: f64) -> SceneNode {
    let content = layout.content_rect();
    let align = if layout.centers() {
        TextAlign::Center
    } else {
        TextAlign::Left
    };
    SceneNode::new(
        "chart.label",
        CHART_Z,
        Visual::Text {
            rect: Rect::new(content.x0, y, content.x1, y + size * LABEL_LINE_HEIGHT),
            content: text.to_owned(),
            style: TextStyle {
                weight: 900,
                align,
                line_height: Some(LABEL_LINE_HEIGHT),
                ..TextStyle::new(size, Rgba8::WHITE)
            },
        },
    )
}

/// Value text plus a smaller unit run, bottom-aligned and centered together
/// at `center`. Returns the pair so callers can attach transforms.
fn value_pair_nodes(
    center: Point,
    value: &str,
    value_size: f64,
    value_color: Rgba8,
    value_weight: u16,
    unit: &str,
    unit_size: f64,
    unit_color: Rgba8,
    unit_weight: u16,
    gap: f64,
) -> (SceneNode, Option<SceneNode>) {
    let value_w = approx_text_width(value, value_size);
    let unit_w = if unit.is_empty() {
        0.0
    } else {
        approx_text_width(unit, unit_size) + gap
    };
    let total_w = value_w + unit_w;
    let value_h = value_size * VALUE_LINE_HEIGHT;
    let x0 = center.x - total_w / 2.0;
    let bottom = center.y + value_h / 2.0;
    let value_node = SceneNode::new(
        "chart.value",
        CHART_Z,
        Visual::Text {
            rect: Rect::new(x0, bottom - value_h, x0 + value_w, bottom),
            content: value.to_owned(),
            style: TextStyle {
                weight: value_weight,
                ..TextStyle::new(value_size, value_color)
            },
        },
    );
    let unit_node = (!unit.is_empty()).then(|| {
        let unit_h = unit_size * VALUE_LINE_HEIGHT;
        SceneNode::new(
            "chart.unit",
            CHART_Z,
            Visual::Text {
                rect: Rect::new(x0 + value_w + gap, bottom - unit_h, x0 + total_w, bottom),
                content: unit.to_owned(),
                style: TextStyle {
                    weight: unit_weight,
                    ..TextStyle::new(unit_size, unit_color)
                },
            },
        )
    });
    (value_node, unit_node)
}

/// Count-up display: one decimal under 10, grouped integer otherwise.
fn animated_display(value: f64, progress: f64) -> String {
    if value < 10.0 {
        format!("{:.1}", value * progress)
    } else {
        group_thousands(count_up(value, progress))
    }
}

fn stack_top(layout: ChartLayout, total_height: f64) -> f64 {
    let content = layout.content_rect();
    if layout.centers() {
        content.y0 + (content.height() - total_height) / 2.0
    } else {
        content.y0
    }
}

fn bar(chart: &mut Vec<SceneNode>, spec: &ChartSpec, layout: ChartLayout, progress: f64, accent: Rgba8) {
    let content = layout.content_rect();
    let label_size = layout.label_font_size(&spec.label);
    let label_h = label_size * LABEL_LINE_HEIGHT;
    let value_h = 80.0 * VALUE_LINE_HEIGHT;
    let mut y = stack_top(layout, label_h + 12.0 + 28.0 + 2.0 + value_h);

    chart.push(label_node(&spec.label, layout, y, label_size));
    y += label_h + 12.0;

    let max = spec.max_value.unwrap_or(100.0);
    let fraction = if max > 0.0 { spec.value / max } else { 0.0 };
    let track = Rect::new(content.x0, y, content.x1, y + 28.0);
    chart.push(SceneNode::new(
        "chart.bar.track",
        CHART_Z,
        Visual::Rect {
            rect: track,
            fill: Rgba8::WHITE.with_alpha(0.15),
            corner_radius: 8.0,
        },
    ));
    let fill_w = (track.width() * fraction * progress).min(track.width());
    chart.push(SceneNode::new(
        "chart.bar.fill",
        CHART_Z,
        Visual::Rect {
            rect: Rect::new(track.x0, track.y0, track.x0 + fill_w, track.y1),
            fill: accent,
            corner_radius: 8.0,
        },
    ));
    y += 28.0 + 2.0;

    // Value right-aligned against the panel edge, unit trailing in grey.
    let unit_w = if spec.unit.is_empty() {
        0.0
    } else {
        approx_text_width(&spec.unit, 40.0) + 4.0
    };
    chart.push(SceneNode::new(
        "chart.value",
        CHART_Z,
        Visual::Text {
            rect: Rect::new(content.x0, y, content.x1 - unit_w, y + value_h),
            content: animated_display(spec.value, progress),
            style: TextStyle {
                weight: 900,
                align: TextAlign::Right,
                ..TextStyle::new(80.0, accent)
            },
        },
    ));
    if !spec.unit.is_empty() {
        chart.push(SceneNode::new(
            "chart.unit",
            CHART_Z,
            Visual::Text {
                rect: Rect::new(content.x1 - unit_w + 4.0, y + value_h - 44.0, content.x1, y + value_h),
                content: spec.unit.clone(),
                style: TextStyle {
                    weight: 900,
                    ..TextStyle::new(40.0, UNIT_GREY)
                },
            },
        ));
    }
}

fn number(
    chart: &mut Vec<SceneNode>,
    spec: &ChartSpec,
    layout: ChartLayout,
    elapsed: f64,
    progress: f64,
    accent: Rgba8,
) -> KawaraResult<()> {
    let display = group_thousands(count_up(spec.value, progress));
    let value_size = layout.number_font_size(display.chars().count());
    let unit_size = (value_size * 0.4).round().max(32.0);

    let content = layout.content_rect();
    let label_size = layout.label_font_size(&spec.label);
    let label_h = label_size * LABEL_LINE_HEIGHT;
    let subtitle_h = spec.subtitle.as_ref().map_or(0.0, |_| 48.0 * 1.2 + 2.0);
    let value_h = value_size * VALUE_LINE_HEIGHT;
    let mut y = stack_top(layout, label_h + subtitle_h + 16.0 + value_h);

    chart.push(label_node(&spec.label, layout, y, label_size));
    y += label_h;
    if let Some(subtitle) = &spec.subtitle {
        chart.push(SceneNode::new(
            "chart.subtitle",
            CHART_Z,
            Visual::Text {
                rect: Rect::new(content.x0, y, content.x1, y + 48.0 * 1.2),
                content: subtitle.clone(),
                style: TextStyle {
                    line_height: Some(1.2),
                    ..TextStyle::new(48.0, Rgba8::WHITE.with_alpha(0.8))
                },
            },
        ));
        y += subtitle_h;
    }
    y += 16.0;

    let value_color = if spec.negative { NEGATIVE_VALUE } else { accent };
    let unit_color = if spec.negative { NEGATIVE_UNIT } else { UNIT_GREY };
    let center = Point::new(content.center().x, y + value_h / 2.0);
    let (mut value_node, unit_node) = value_pair_nodes(
        center, &display, value_size, value_color, 900, &spec.unit, unit_size, unit_color, 700, 6.0,
    );
    if spec.negative {
        // Loss values pulse on a 30-frame loop.
        let scale = interpolate_clamped(
            elapsed % 30.0,
            &[0.0, 8.0, 16.0, 24.0, 30.0],
            &[1.0, 1.12, 0.95, 1.06, 1.0],
        )?;
        value_node = value_node.with_transform(Transform2D {
            scale: Vec2::new(scale, scale),
            anchor: center.to_vec2(),
            ..Transform2D::default()
        });
    }
    chart.push(value_node);
    chart.extend(unit_node);
    Ok(())
}

enum RingStyle {
    Pie,
    Donut,
}

fn ring(
    chart: &mut Vec<SceneNode>,
    spec: &ChartSpec,
    layout: ChartLayout,
    progress: f64,
    accent: Rgba8,
    style: RingStyle,
) {
    let (radius, track_width, arc_width) = match style {
        RingStyle::Pie => (180.0, 28.0, 30.0),
        RingStyle::Donut => (190.0, 22.0, 22.0),
    };
    let max = spec.max_value.unwrap_or(100.0);
    let fraction = if max > 0.0 { spec.value / max } else { 0.0 };
    let sweep = std::f64::consts::TAU * (fraction * progress).clamp(0.0, 1.0);

    let content = layout.content_rect();
    let center = Point::new(content.x0 + 220.0, content.center().y);
    let (track_id, arc_id) = match style {
        RingStyle::Pie => ("chart.pie.track", "chart.pie.arc"),
        RingStyle::Donut => ("chart.donut.track", "chart.donut.arc"),
    };
    chart.push(SceneNode::new(
        track_id,
        CHART_Z,
        Visual::Arc {
            center,
            radius,
            stroke_width: track_width,
            start_angle: 0.0,
            sweep_angle: std::f64::consts::TAU,
            color: Rgba8::WHITE.with_alpha(0.15),
        },
    ));
    chart.push(SceneNode::new(
        arc_id,
        CHART_Z,
        Visual::Arc {
            center,
            radius,
            stroke_width: arc_width,
            start_angle: 0.0,
            sweep_angle: sweep,
            color: accent,
        },
    ));

    let display = count_up(spec.value, progress).to_string();
    let label_size = layout.label_font_size(&spec.label);
    let label_h = label_size * LABEL_LINE_HEIGHT;
    // Text block to the right of the ring.
    let block_x = content.x0 + 440.0 + 40.0;
    match style {
        RingStyle::Pie => {
            let block_h = label_h + 80.0 * VALUE_LINE_HEIGHT;
            let mut y = content.center().y - block_h / 2.0;
            chart.push(SceneNode::new(
                "chart.label",
                CHART_Z,
                Visual::Text {
                    rect: Rect::new(block_x, y, content.x1, y + label_h),
                    content: spec.label.clone(),
                    style: TextStyle {
                        weight: 900,
                        line_height: Some(LABEL_LINE_HEIGHT),
                        ..TextStyle::new(label_size, Rgba8::WHITE)
                    },
                },
            ));
            y += label_h;
            chart.push(SceneNode::new(
                "chart.value",
                CHART_Z,
                Visual::Text {
                    rect: Rect::new(block_x, y, content.x1, y + 80.0 * VALUE_LINE_HEIGHT),
                    content: format!("{display}{}", spec.unit),
                    style: TextStyle {
                        weight: 900,
                        ..TextStyle::new(80.0, accent)
                    },
                },
            ));
        }
        RingStyle::Donut => {
            let (value_node, unit_node) = value_pair_nodes(
                center,
                &display,
                120.0,
                Rgba8::WHITE,
                900,
                &spec.unit,
                64.0,
                Rgba8::WHITE,
                900,
                0.0,
            );
            chart.push(value_node);
            chart.extend(unit_node);
            let y = content.center().y - label_h / 2.0;
            chart.push(SceneNode::new(
                "chart.label",
                CHART_Z,
                Visual::Text {
                    rect: Rect::new(block_x, y, content.x1, y + label_h),
                    content: spec.label.clone(),
                    style: TextStyle {
                        weight: 900,
                        line_height: Some(LABEL_LINE_HEIGHT),
                        ..TextStyle::new(label_size, Rgba8::WHITE)
                    },
                },
            ));
        }
    }
}

fn compare(chart: &mut Vec<SceneNode>, spec: &ChartSpec, layout: ChartLayout, progress: f64, accent: Rgba8) {
    let content = layout.content_rect();
    let label_size = layout.label_font_size(&spec.label);
    let label_h = label_size * LABEL_LINE_HEIGHT;
    let footer_h = 48.0 * 1.2;
    let mut y = stack_top(layout, label_h + 90.0 + 6.0 + footer_h);

    chart.push(label_node(&spec.label, layout, y, label_size));
    y += label_h;

    let compare_value = spec.compare_value.unwrap_or(0.0);
    let total = spec.value + compare_value;
    let (left_share, right_share) = if total > 0.0 {
        (spec.value / total, compare_value / total)
    } else {
        (0.0, 0.0)
    };
    let left_pct = left_share * progress * 100.0;
    let right_pct = right_share * progress * 100.0;
    let left_display = (left_share * 100.0 * progress).round() as i64;
    let right_display = (right_share * 100.0 * progress).round() as i64;

    let row = Rect::new(content.x0, y, content.x1, y + 90.0);
    let left_w = row.width() * left_pct / 100.0;
    let right_w = row.width() * right_pct / 100.0;
    chart.push(SceneNode::new(
        "chart.compare.left",
        CHART_Z,
        Visual::Rect {
            rect: Rect::new(row.x0, row.y0, row.x0 + left_w, row.y1),
            fill: accent,
            corner_radius: 18.0,
        },
    ));
    chart.push(SceneNode::new(
        "chart.compare.right",
        CHART_Z,
        Visual::Rect {
            rect: Rect::new(row.x0 + left_w + 4.0, row.y0, row.x0 + left_w + 4.0 + right_w, row.y1),
            fill: COMPARE_RIGHT_FILL,
            corner_radius: 18.0,
        },
    ));
    // In-bar percentages only once a side is wide enough to hold one.
    if left_pct > 15.0 {
        chart.push(SceneNode::new(
            "chart.compare.left_pct",
            CHART_Z,
            Visual::Text {
                rect: Rect::new(row.x0, row.y0, row.x0 + left_w, row.y1),
                content: format!("{left_display}%"),
                style: TextStyle::centered(64.0, Rgba8::WHITE),
            },
        ));
    }
    if right_pct > 15.0 {
        chart.push(SceneNode::new(
            "chart.compare.right_pct",
            CHART_Z,
            Visual::Text {
                rect: Rect::new(row.x0 + left_w + 4.0, row.y0, row.x0 + left_w + 4.0 + right_w, row.y1),
                content: format!("{right_display}%"),
                style: TextStyle::centered(64.0, Rgba8::WHITE),
            },
        ));
    }
    y += 90.0 + 6.0;

    chart.push(SceneNode::new(
        "chart.compare.left_label",
        CHART_Z,
        Visual::Text {
            rect: Rect::new(content.x0, y, content.center().x, y + footer_h),
            content: format!("{left_display}{}", spec.unit),
            style: TextStyle::new(48.0, accent),
        },
    ));
    let right_label = spec.compare_label.as_deref().unwrap_or("その他");
    chart.push(SceneNode::new(
        "chart.compare.right_label",
        CHART_Z,
        Visual::Text {
            rect: Rect::new(content.center().x, y, content.x1, y + footer_h),
            content: format!("{right_label} {right_display}{}", spec.unit),
            style: TextStyle {
                align: TextAlign::Right,
                ..TextStyle::new(48.0, COMPARE_RIGHT_TEXT)
            },
        },
    ));
}

fn flipcard(
    chart: &mut Vec<SceneNode>,
    spec: &ChartSpec,
    layout: ChartLayout,
    elapsed: f64,
    accent: Rgba8,
) -> KawaraResult<()> {
    let content = layout.content_rect();
    let label_size = layout.label_font_size(&spec.label);
    let label_h = label_size * LABEL_LINE_HEIGHT;
    let mut y = stack_top(layout, label_h + 180.0);

    chart.push(label_node(&spec.label, layout, y, label_size));
    y += label_h;

    let rotation_deg = interpolate_clamped(elapsed, &[5.0, 30.0], &[0.0, 180.0])?;
    let show_front = rotation_deg < 90.0;
    let card = Rect::new(content.x0, y, content.x1, y + 180.0);
    // The Y-axis flip projects to a horizontal squash about the card center.
    let squash = Transform2D {
        scale: Vec2::new(rotation_deg.to_radians().cos().abs(), 1.0),
        anchor: card.center().to_vec2(),
        ..Transform2D::default()
    };

    if show_front {
        chart.push(
            SceneNode::new(
                "chart.flip.card",
                CHART_Z,
                Visual::Rect {
                    rect: card,
                    fill: Rgba8::WHITE.with_alpha(0.1),
                    corner_radius: 10.0,
                },
            )
            .with_transform(squash),
        );
        chart.push(
            SceneNode::new(
                "chart.flip.face",
                CHART_Z,
                Visual::Text {
                    rect: card,
                    content: "???".to_owned(),
                    style: TextStyle {
                        weight: 400,
                        ..TextStyle::centered(48.0, Rgba8::rgb(0xaa, 0xaa, 0xaa))
                    },
                },
            )
            .with_transform(squash),
        );
    } else {
        chart.push(
            SceneNode::new(
                "chart.flip.card",
                CHART_Z,
                Visual::Rect {
                    rect: card,
                    fill: accent,
                    corner_radius: 10.0,
                },
            )
            .with_transform(squash),
        );
        let display = if spec.value < 10.0 {
            format!("{:.1}", spec.value)
        } else {
            group_thousands(spec.value.round() as i64)
        };
        let (value_node, unit_node) = value_pair_nodes(
            card.center(),
            &display,
            80.0,
            Rgba8::WHITE,
            900,
            &spec.unit,
            40.0,
            Rgba8::WHITE,
            900,
            0.0,
        );
        chart.push(value_node.with_transform(squash));
        chart.extend(unit_node.map(|n| n.with_transform(squash)));
    }
    Ok(())
}

fn ranking(chart: &mut Vec<SceneNode>, spec: &ChartSpec, layout: ChartLayout, elapsed: f64, accent: Rgba8) {
    let content = layout.content_rect();
    let label_size = layout.label_font_size(&spec.label);
    let label_h = label_size * LABEL_LINE_HEIGHT;
    let items = &spec.items[..spec.items.len().min(3)];
    let row_h = 48.0 * VALUE_LINE_HEIGHT + 2.0 + 28.0;
    let stride = row_h + 6.0;
    let total_h = label_h + items.len() as f64 * stride;
    let mut y = stack_top(layout, total_h);

    chart.push(label_node(&spec.label, layout, y, label_size));
    y += label_h;

    let max_value = items.iter().map(|i| i.value).fold(0.0, f64::max);
    for (i, item) in items.iter().enumerate() {
        let p = stagger_progress(elapsed, i as f64 * 15.0, 20.0);
        let slide = Transform2D::translated((1.0 - p) * 200.0, 0.0);
        let final_value = format!("{}{}", item.value.round() as i64, spec.unit);
        let value_w = approx_text_width(&final_value, 56.0);
        let bar_x0 = content.x0 + 28.0 + 8.0;
        let bar_x1 = content.x1 - value_w - 8.0;

        chart.push(
            SceneNode::new(
                format!("chart.rank{i}.medal"),
                CHART_Z,
                Visual::Rect {
                    rect: Rect::new(content.x0, y + row_h / 2.0 - 14.0, content.x0 + 28.0, y + row_h / 2.0 + 14.0),
                    fill: MEDALS[i],
                    corner_radius: 14.0,
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        chart.push(
            SceneNode::new(
                format!("chart.rank{i}.place"),
                CHART_Z,
                Visual::Text {
                    rect: Rect::new(content.x0, y + row_h / 2.0 - 14.0, content.x0 + 28.0, y + row_h / 2.0 + 14.0),
                    content: (i + 1).to_string(),
                    style: TextStyle {
                        weight: 900,
                        ..TextStyle::centered(24.0, Rgba8::BLACK)
                    },
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        chart.push(
            SceneNode::new(
                format!("chart.rank{i}.label"),
                CHART_Z,
                Visual::Text {
                    rect: Rect::new(bar_x0, y, bar_x1, y + 48.0 * VALUE_LINE_HEIGHT),
                    content: item.label.clone(),
                    style: TextStyle {
                        weight: 400,
                        ..TextStyle::new(48.0, Rgba8::WHITE)
                    },
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        let track_y = y + 48.0 * VALUE_LINE_HEIGHT + 2.0;
        chart.push(
            SceneNode::new(
                format!("chart.rank{i}.track"),
                CHART_Z,
                Visual::Rect {
                    rect: Rect::new(bar_x0, track_y, bar_x1, track_y + 28.0),
                    fill: Rgba8::WHITE.with_alpha(0.15),
                    corner_radius: 14.0,
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        let fill_fraction = if max_value > 0.0 { item.value / max_value } else { 0.0 };
        let fill_w = (bar_x1 - bar_x0) * fill_fraction * p;
        chart.push(
            SceneNode::new(
                format!("chart.rank{i}.fill"),
                CHART_Z,
                Visual::Rect {
                    rect: Rect::new(bar_x0, track_y, bar_x0 + fill_w, track_y + 28.0),
                    fill: accent,
                    corner_radius: 5.0,
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        chart.push(
            SceneNode::new(
                format!("chart.rank{i}.value"),
                CHART_Z,
                Visual::Text {
                    rect: Rect::new(bar_x1 + 8.0, y, content.x1, y + row_h),
                    content: format!("{}{}", count_up(item.value, p), spec.unit),
                    style: TextStyle {
                        weight: 900,
                        align: TextAlign::Right,
                        ..TextStyle::new(56.0, accent)
                    },
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        y += stride;
    }
}

fn poll(chart: &mut Vec<SceneNode>, spec: &ChartSpec, layout: ChartLayout, elapsed: f64, accent: Rgba8) {
    let content = layout.content_rect();
    let label_size = layout.label_font_size(&spec.label);
    let label_h = label_size * 1.2;
    let items = &spec.items[..spec.items.len().min(5)];
    let count = items.len();

    // Row typography shrinks as the field grows.
    let item_label_size = match count {
        0..=2 => 72.0,
        3 => 60.0,
        4 => 50.0,
        _ => 42.0,
    };
    let pct_size = match count {
        0..=2 => 80.0,
        3 => 64.0,
        4 => 52.0,
        _ => 44.0,
    };
    let bar_h = match count {
        0..=2 => 24.0,
        3 => 18.0,
        _ => 14.0,
    };
    let gap = if count <= 3 { 4.0 } else { 2.0 };

    let header_h = 28.0 * 1.2 + 8.0;
    let row_h = |top: bool| {
        let text = if top { pct_size * 1.2 } else { pct_size };
        let bar = if top { bar_h * 1.3 } else { bar_h };
        text * VALUE_LINE_HEIGHT + 2.0 + bar + gap
    };
    let total_h = label_h
        + 4.0
        + header_h
        + items
            .iter()
            .enumerate()
            .map(|(i, _)| row_h(i == 0))
            .sum::<f64>();
    let mut y = stack_top(layout, total_h);

    // Accent tick before the question, mirroring the panel border.
    let tick_w = approx_text_width("|", label_size) + 8.0;
    chart.push(SceneNode::new(
        "chart.poll.tick",
        CHART_Z,
        Visual::Text {
            rect: Rect::new(content.x0, y, content.x0 + tick_w, y + label_h),
            content: "|".to_owned(),
            style: TextStyle {
                weight: 900,
                ..TextStyle::new(label_size, accent)
            },
        },
    ));
    chart.push(SceneNode::new(
        "chart.label",
        CHART_Z,
        Visual::Text {
            rect: Rect::new(content.x0 + tick_w, y, content.x1, y + label_h),
            content: spec.label.clone(),
            style: TextStyle {
                weight: 900,
                line_height: Some(1.2),
                ..TextStyle::new(label_size, Rgba8::WHITE)
            },
        },
    ));
    y += label_h + 4.0;

    let total_votes: f64 = spec.items.iter().map(|i| i.value).sum();
    let header = if total_votes > 0.0 {
        format!("{}人に聞きました", total_votes.round() as i64)
    } else {
        "みんなの声".to_owned()
    };
    chart.push(SceneNode::new(
        "chart.poll.header",
        CHART_Z,
        Visual::Text {
            rect: Rect::new(content.x0, y, content.x1, y + 28.0 * 1.2),
            content: header,
            style: TextStyle {
                weight: 400,
                ..TextStyle::new(28.0, Rgba8::WHITE.with_alpha(0.5))
            },
        },
    ));
    y += header_h;

    for (i, item) in items.iter().enumerate() {
        let p = stagger_progress(elapsed, i as f64 * 10.0, 25.0);
        let slide = Transform2D::translated((1.0 - p) * 60.0, 0.0);
        let is_top = i == 0;
        let quiz_hidden = item.label == "？？？";
        let pct = if total_votes > 0.0 {
            item.value / total_votes * 100.0
        } else {
            0.0
        };

        let label_fs = if is_top { item_label_size * 1.2 } else { item_label_size };
        let pct_fs = if is_top { pct_size * 1.2 } else { pct_size };
        let text_h = pct_fs.max(label_fs) * VALUE_LINE_HEIGHT;
        let label_color = if quiz_hidden {
            QUIZ_GOLD
        } else if is_top {
            Rgba8::WHITE
        } else {
            Rgba8::WHITE.with_alpha(0.85)
        };
        let pct_color = if quiz_hidden {
            QUIZ_GOLD
        } else if is_top {
            accent
        } else {
            Rgba8::WHITE.with_alpha(0.7)
        };
        let pct_text = if quiz_hidden {
            "??%".to_owned()
        } else {
            format!("{}%", (pct * p).round() as i64)
        };

        chart.push(
            SceneNode::new(
                format!("chart.poll{i}.label"),
                CHART_Z,
                Visual::Text {
                    rect: Rect::new(content.x0, y, content.x1 - pct_fs * 3.0, y + text_h),
                    content: item.label.clone(),
                    style: TextStyle {
                        weight: 900,
                        ..TextStyle::new(label_fs, label_color)
                    },
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        chart.push(
            SceneNode::new(
                format!("chart.poll{i}.pct"),
                CHART_Z,
                Visual::Text {
                    rect: Rect::new(content.x1 - pct_fs * 3.0, y, content.x1, y + text_h),
                    content: pct_text,
                    style: TextStyle {
                        weight: 900,
                        align: TextAlign::Right,
                        ..TextStyle::new(pct_fs, pct_color)
                    },
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        y += text_h + 2.0;

        let this_bar_h = if is_top { bar_h * 1.3 } else { bar_h };
        chart.push(
            SceneNode::new(
                format!("chart.poll{i}.track"),
                CHART_Z,
                Visual::Rect {
                    rect: Rect::new(content.x0, y, content.x1, y + this_bar_h),
                    fill: Rgba8::WHITE.with_alpha(0.1),
                    corner_radius: 6.0,
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        let fill_color = if quiz_hidden {
            QUIZ_GOLD
        } else if i == 0 {
            accent
        } else {
            POLL_RUNNER_UP[i - 1]
        };
        let fill_w = content.width() * pct / 100.0 * p;
        chart.push(
            SceneNode::new(
                format!("chart.poll{i}.fill"),
                CHART_Z,
                Visual::Rect {
                    rect: Rect::new(content.x0, y, content.x0 + fill_w, y + this_bar_h),
                    fill: fill_color,
                    corner_radius: 6.0,
                },
            )
            .with_opacity(p)
            .with_transform(slide),
        );
        y += this_bar_h + gap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_nodes(spec: &ChartSpec, elapsed: f64) -> Vec<SceneNode> {
        let mut nodes = Vec::new();
        emit_chart(&mut nodes, spec, elapsed, ChartLayout::Compact).unwrap();
        nodes
    }

    fn find<'a>(nodes: &'a [SceneNode], id: &str) -> &'a SceneNode {
        nodes
            .iter()
            .find(|n| n.id == id)
            .unwrap_or_else(|| panic!("missing node {id}"))
    }

    fn text_content<'a>(node: &'a SceneNode) -> &'a str {
        match &node.visual {
            Visual::Text { content, .. } => content,
            other => panic!("expected text, got {other:?}"),
        }
    }

    fn bar_spec() -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            label: "負担増の割合".to_owned(),
            value: 62.0,
            unit: "%".to_owned(),
            max_value: None,
            compare_value: None,
            compare_label: None,
            items: Vec::new(),
            subtitle: None,
            negative: false,
        }
    }

    #[test]
    fn label_font_size_steps_down() {
        assert_eq!(ChartLayout::Compact.label_font_size("年金額"), 56.0);
        assert_eq!(ChartLayout::Compact.label_font_size("年金支給額の平均"), 46.0);
        assert_eq!(
            ChartLayout::Compact.label_font_size("厚生年金の平均受給額はいくら"),
            38.0
        );
        assert_eq!(ChartLayout::Full.label_font_size("年金額"), 100.0);
        assert_eq!(
            ChartLayout::Full.label_font_size("厚生年金の平均受給額はいくら"),
            68.0
        );
        assert_eq!(
            ChartLayout::Full.label_font_size("厚生年金の平均受給額はいくらになるのか検証"),
            52.0
        );
    }

    #[test]
    fn number_font_size_follows_formatted_length() {
        // 230000 formats as 230,000: seven glyphs.
        assert_eq!(ChartLayout::Compact.number_font_size(7), 80.0);
        assert_eq!(ChartLayout::Compact.number_font_size(3), 130.0);
        assert_eq!(ChartLayout::Full.number_font_size(9), 120.0);
        assert_eq!(ChartLayout::Full.number_font_size(12), 100.0);
    }

    #[test]
    fn chart_fades_in_over_ten_frames() {
        let nodes = chart_nodes(&bar_spec(), 0.0);
        assert_eq!(find(&nodes, "chart.panel").opacity, 0.0);
        let nodes = chart_nodes(&bar_spec(), 5.0);
        assert_eq!(find(&nodes, "chart.panel").opacity, 0.5);
        let nodes = chart_nodes(&bar_spec(), 60.0);
        assert_eq!(find(&nodes, "chart.panel").opacity, 1.0);
    }

    #[test]
    fn bar_fill_reaches_its_share_of_the_track() {
        let nodes = chart_nodes(&bar_spec(), 60.0);
        let track = match find(&nodes, "chart.bar.track").visual {
            Visual::Rect { rect, .. } => rect,
            _ => unreachable!(),
        };
        let fill = match find(&nodes, "chart.bar.fill").visual {
            Visual::Rect { rect, .. } => rect,
            _ => unreachable!(),
        };
        let expected = track.width() * 0.62;
        assert!((fill.width() - expected).abs() < 1e-9);
        assert_eq!(text_content(find(&nodes, "chart.value")), "62");
    }

    #[test]
    fn bar_under_ten_shows_one_decimal() {
        let spec = ChartSpec {
            value: 6.4,
            ..bar_spec()
        };
        let nodes = chart_nodes(&spec, 30.0);
        assert_eq!(text_content(find(&nodes, "chart.value")), "3.2");
    }

    #[test]
    fn negative_number_bounces_and_turns_red() {
        let spec = ChartSpec {
            kind: ChartKind::Number,
            label: "実質負担額".to_owned(),
            value: 52_300.0,
            unit: "円".to_owned(),
            negative: true,
            ..bar_spec()
        };
        // elapsed 68: count-up done, bounce phase 68 % 30 = 8 peaks at 1.12.
        let nodes = chart_nodes(&spec, 68.0);
        let value = find(&nodes, "chart.value");
        assert_eq!(text_content(value), "52,300");
        assert!((value.transform.scale.x - 1.12).abs() < 1e-9);
        match &value.visual {
            Visual::Text { style, .. } => assert_eq!(style.color, NEGATIVE_VALUE),
            _ => unreachable!(),
        }
    }

    #[test]
    fn pie_sweep_tracks_progress() {
        let spec = ChartSpec {
            kind: ChartKind::Pie,
            value: 50.0,
            ..bar_spec()
        };
        let nodes = chart_nodes(&spec, 30.0);
        let sweep = match find(&nodes, "chart.pie.arc").visual {
            Visual::Arc { sweep_angle, .. } => sweep_angle,
            _ => unreachable!(),
        };
        // Half share at half progress: a quarter turn.
        assert!((sweep - std::f64::consts::TAU * 0.25).abs() < 1e-9);
    }

    #[test]
    fn compare_with_zero_total_stays_at_zero() {
        let spec = ChartSpec {
            kind: ChartKind::Compare,
            value: 0.0,
            compare_value: Some(0.0),
            ..bar_spec()
        };
        let nodes = chart_nodes(&spec, 60.0);
        let left = match find(&nodes, "chart.compare.left").visual {
            Visual::Rect { rect, .. } => rect,
            _ => unreachable!(),
        };
        assert_eq!(left.width(), 0.0);
        // Narrow sides hide their in-bar percentage.
        assert!(nodes.iter().all(|n| n.id != "chart.compare.left_pct"));
        assert_eq!(text_content(find(&nodes, "chart.compare.right_label")), "その他 0%");
    }

    #[test]
    fn flipcard_shows_front_then_back() {
        let spec = ChartSpec {
            kind: ChartKind::Flipcard,
            value: 230_000.0,
            unit: "円".to_owned(),
            ..bar_spec()
        };
        // Rotation hits 90 degrees halfway through [5, 30].
        let nodes = chart_nodes(&spec, 10.0);
        assert_eq!(text_content(find(&nodes, "chart.flip.face")), "???");
        let nodes = chart_nodes(&spec, 30.0);
        assert_eq!(text_content(find(&nodes, "chart.value")), "230,000");
    }

    #[test]
    fn ranking_rows_stagger_in() {
        let spec = ChartSpec {
            kind: ChartKind::Ranking,
            items: vec![
                ChartItem { label: "東京".to_owned(), value: 320.0 },
                ChartItem { label: "大阪".to_owned(), value: 210.0 },
                ChartItem { label: "福岡".to_owned(), value: 90.0 },
            ],
            ..bar_spec()
        };
        let nodes = chart_nodes(&spec, 20.0);
        // Row 0 finished its 20-frame ramp; row 1 is 5/20 in; row 2 pending.
        assert_eq!(find(&nodes, "chart.rank0.label").opacity, 1.0);
        assert_eq!(find(&nodes, "chart.rank1.label").opacity, 0.25);
        assert_eq!(find(&nodes, "chart.rank2.label").opacity, 0.0);
        assert_eq!(find(&nodes, "chart.rank1.label").transform.translate.x, 150.0);
    }

    #[test]
    fn poll_totals_and_quiz_mask() {
        let spec = ChartSpec {
            kind: ChartKind::Poll,
            items: vec![
                ChartItem { label: "？？？".to_owned(), value: 60.0 },
                ChartItem { label: "賛成".to_owned(), value: 40.0 },
            ],
            ..bar_spec()
        };
        let nodes = chart_nodes(&spec, 120.0);
        assert_eq!(text_content(find(&nodes, "chart.poll.header")), "100人に聞きました");
        assert_eq!(text_content(find(&nodes, "chart.poll0.pct")), "??%");
        assert_eq!(text_content(find(&nodes, "chart.poll1.pct")), "40%");
        match find(&nodes, "chart.poll0.fill").visual {
            Visual::Rect { fill, .. } => assert_eq!(fill, QUIZ_GOLD),
            _ => unreachable!(),
        }
    }

    #[test]
    fn poll_with_no_votes_shows_fallback_header() {
        let spec = ChartSpec {
            kind: ChartKind::Poll,
            items: vec![ChartItem { label: "未回答".to_owned(), value: 0.0 }],
            ..bar_spec()
        };
        let nodes = chart_nodes(&spec, 60.0);
        assert_eq!(text_content(find(&nodes, "chart.poll.header")), "みんなの声");
        assert_eq!(text_content(find(&nodes, "chart.poll0.pct")), "0%");
    }

    #[test]
    fn validation_rejects_empty_series() {
        let spec = ChartSpec {
            kind: ChartKind::Ranking,
            ..bar_spec()
        };
        assert!(spec.validate("charts[0]").is_err());
        assert!(bar_spec().validate("charts[0]").is_ok());
    }

    #[test]
    fn full_layout_widens_the_panel() {
        let mut nodes = Vec::new();
        emit_chart(&mut nodes, &bar_spec(), 60.0, ChartLayout::Full).unwrap();
        let panel = match find(&nodes, "chart.panel").visual {
            Visual::Rect { rect, .. } => rect,
            _ => unreachable!(),
        };
        assert_eq!(panel.x0, 310.0);
        assert_eq!(panel.width(), 1300.0);
    }
}
