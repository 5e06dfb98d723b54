//! Consultation opening.
//!
//! A letter fills the screen and is read out line by line: dark themed
//! backdrop, floating light orbs, a consultation title and consultant
//! profile across the top, and the letter text with a progress rule under
//! the line currently being read. Four seasonal palettes restyle the same
//! layout.

use kurbo::{Rect, Vec2};

use crate::animation::curves::ramp;
use crate::animation::interp::{Extrapolate, interpolate, interpolate_clamped};
use crate::eval::evaluator::EvalCtx;
use crate::foundation::core::{Rgba8, Transform2D};
use crate::foundation::error::KawaraResult;
use crate::overlay::approx_text_width;
use crate::scene::tree::{ImageFit, SceneNode, TextStyle, Visual};
use crate::show::props::{ColorScheme, ConsultationProps};

const BG_Z: i32 = 0;
const DECOR_Z: i32 = 1;
const CORNER_Z: i32 = 2;
const HEADER_Z: i32 = 10;
const AREA_Z: i32 = 20;
const TEXT_Z: i32 = 21;
const ICON_Z: i32 = 30;

const HOST_ICON: &str = "katsumi_neutral.png";

/// Colors of one seasonal theme.
pub(crate) struct Palette {
    pub bg: Rgba8,
    pub text: Rgba8,
    pub title: Rgba8,
    pub title_bg: Rgba8,
    pub title_border: Rgba8,
    pub profile_bg: Rgba8,
    pub border: Rgba8,
    pub box_bg: Rgba8,
    pub accent: Rgba8,
    pub decor: Rgba8,
    pub keyword: Rgba8,
}

pub(crate) fn palette(scheme: ColorScheme) -> Palette {
    match scheme {
        ColorScheme::Nenkin => Palette {
            bg: Rgba8::rgb(0x1a, 0x08, 0x08),
            text: Rgba8::rgb(0xff, 0xe0, 0xe0),
            title: Rgba8::rgb(0xff, 0xb8, 0xb8),
            title_bg: Rgba8::rgb(212, 60, 60).with_alpha(0.25),
            title_border: Rgba8::rgb(255, 140, 140).with_alpha(0.5),
            profile_bg: Rgba8::rgb(212, 60, 60).with_alpha(0.20),
            border: Rgba8::rgb(255, 140, 140).with_alpha(0.30),
            box_bg: Rgba8::rgb(30, 8, 8).with_alpha(0.92),
            accent: Rgba8::rgb(0xff, 0x70, 0x70),
            decor: Rgba8::rgb(255, 100, 100).with_alpha(0.12),
            keyword: Rgba8::rgb(0xff, 0xcc, 0x00),
        },
        ColorScheme::Sakura => Palette {
            bg: Rgba8::rgb(0x1a, 0x0a, 0x12),
            text: Rgba8::rgb(0xff, 0xe0, 0xec),
            title: Rgba8::rgb(0xff, 0xb8, 0xd4),
            title_bg: Rgba8::rgb(212, 80, 138).with_alpha(0.25),
            title_border: Rgba8::rgb(255, 150, 190).with_alpha(0.5),
            profile_bg: Rgba8::rgb(212, 80, 138).with_alpha(0.20),
            border: Rgba8::rgb(255, 150, 190).with_alpha(0.30),
            box_bg: Rgba8::rgb(30, 10, 20).with_alpha(0.92),
            accent: Rgba8::rgb(0xff, 0x90, 0xc0),
            decor: Rgba8::rgb(255, 120, 180).with_alpha(0.12),
            keyword: Rgba8::rgb(0xff, 0xcc, 0x00),
        },
        ColorScheme::Fuji => Palette {
            bg: Rgba8::rgb(0x11, 0x08, 0x20),
            text: Rgba8::rgb(0xe8, 0xd4, 0xff),
            title: Rgba8::rgb(0xd4, 0xb0, 0xff),
            title_bg: Rgba8::rgb(138, 80, 212).with_alpha(0.25),
            title_border: Rgba8::rgb(190, 140, 255).with_alpha(0.5),
            profile_bg: Rgba8::rgb(138, 80, 212).with_alpha(0.20),
            border: Rgba8::rgb(180, 140, 255).with_alpha(0.30),
            box_bg: Rgba8::rgb(20, 10, 40).with_alpha(0.92),
            accent: Rgba8::rgb(0xb0, 0x90, 0xff),
            decor: Rgba8::rgb(170, 120, 255).with_alpha(0.12),
            keyword: Rgba8::rgb(0x80, 0xff, 0xcc),
        },
        ColorScheme::Kinmokusei => Palette {
            bg: Rgba8::rgb(0x1a, 0x14, 0x08),
            text: Rgba8::rgb(0xff, 0xf0, 0xd4),
            title: Rgba8::rgb(0xff, 0xd4, 0x90),
            title_bg: Rgba8::rgb(212, 144, 48).with_alpha(0.25),
            title_border: Rgba8::rgb(255, 200, 120).with_alpha(0.5),
            profile_bg: Rgba8::rgb(212, 144, 48).with_alpha(0.20),
            border: Rgba8::rgb(255, 200, 120).with_alpha(0.30),
            box_bg: Rgba8::rgb(40, 25, 8).with_alpha(0.92),
            accent: Rgba8::rgb(0xff, 0xb0, 0x60),
            decor: Rgba8::rgb(255, 180, 80).with_alpha(0.12),
            keyword: Rgba8::rgb(0x80, 0xd4, 0xff),
        },
    }
}

/// Break candidates for letter wrapping: closing punctuation and particles.
const LINE_BREAKS: &str = "。、！？）」』】〉》のがはをにでもへとや";
const MAX_LINE_CHARS: usize = 25;

/// Wraps the letter into reading lines of at most `MAX_LINE_CHARS + 3`
/// characters. The break point backtracks up to five characters to land
/// after a particle or closing punctuation; a leftover of three characters
/// or fewer stays attached rather than opening a dangling line.
pub(crate) fn split_text(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= MAX_LINE_CHARS {
        return vec![text.to_owned()];
    }
    let mut at = MAX_LINE_CHARS;
    let mut found = false;
    let mut i = MAX_LINE_CHARS;
    while i > 0 && i >= MAX_LINE_CHARS - 5 {
        if LINE_BREAKS.contains(chars[i - 1]) {
            at = i;
            found = true;
            break;
        }
        i -= 1;
    }
    if !found {
        at = MAX_LINE_CHARS;
    }
    if chars.len() - at <= 3 {
        return vec![text.to_owned()];
    }
    let head: String = chars[..at].iter().collect();
    let tail: String = chars[at..].iter().collect();
    let mut lines = vec![head];
    lines.extend(split_text(&tail));
    lines
}

/// Font size fitted so every wrapped line lands inside the letter box.
fn letter_font_size(line_count: usize) -> f64 {
    let per_line = 810.0 / (line_count as f64 * 1.5);
    per_line.floor().clamp(30.0, 66.0)
}

fn letter_line_height(font_size: f64) -> f64 {
    if font_size >= 58.0 {
        1.6
    } else if font_size >= 46.0 {
        1.5
    } else {
        1.45
    }
}

pub(crate) fn emit(
    nodes: &mut Vec<SceneNode>,
    props: &ConsultationProps,
    ctx: EvalCtx,
) -> KawaraResult<()> {
    let canvas = ctx.canvas;
    let f = ctx.frame.0 as f64;
    let fps = ctx.fps.as_f64();
    let w = canvas.width_f();
    let h = canvas.height_f();
    let pal = palette(props.color_scheme);

    let header_fade = interpolate_clamped(f, &[fps * 0.5, fps * 1.5], &[0.0, 1.0])?;
    let text_start = fps * 2.0;
    let text_fade = interpolate_clamped(f, &[text_start, text_start + fps * 0.5], &[0.0, 1.0])?;
    let decor_float = interpolate(
        f,
        &[0.0, fps * 10.0],
        &[0.0, 360.0],
        Extrapolate::Extend,
        Extrapolate::Extend,
    )?;
    let glow_pulse = interpolate_clamped(
        f % (fps * 3.0),
        &[0.0, fps * 1.5, fps * 3.0],
        &[0.4, 0.8, 0.4],
    )?;

    nodes.push(SceneNode::new(
        "backdrop",
        BG_Z,
        Visual::Rect {
            rect: Rect::new(0.0, 0.0, w, h),
            fill: pal.bg,
            corner_radius: 0.0,
        },
    ));

    // Drifting light orbs, circling once every ten seconds.
    let rad = decor_float.to_radians();
    let orb1 = Rect::new(0.0, 0.0, 500.0, 500.0)
        + Vec2::new(
            w * (10.0 + rad.cos() * 5.0) / 100.0,
            h * (30.0 + rad.sin() * 8.0) / 100.0,
        );
    nodes.push(SceneNode::new(
        "decor.orb.0",
        DECOR_Z,
        Visual::Rect {
            rect: orb1,
            fill: pal.decor,
            corner_radius: 250.0,
        },
    ));
    let rad2 = (decor_float + 120.0).to_radians();
    let orb2_right = w - w * (8.0 + rad2.cos() * 4.0) / 100.0;
    let orb2 = Rect::new(orb2_right - 400.0, 0.0, orb2_right, 400.0)
        + Vec2::new(0.0, h * (55.0 + rad2.sin() * 6.0) / 100.0);
    nodes.push(SceneNode::new(
        "decor.orb.1",
        DECOR_Z,
        Visual::Rect {
            rect: orb2,
            fill: pal.decor,
            corner_radius: 200.0,
        },
    ));
    nodes.push(
        SceneNode::new(
            "decor.glow",
            DECOR_Z,
            Visual::Rect {
                rect: Rect::new(w * 0.25, -80.0, w * 0.75, 170.0),
                fill: pal.decor,
                corner_radius: 125.0,
            },
        )
        .with_opacity(glow_pulse),
    );

    emit_corners(nodes, w, h, pal.border);

    // Header row: consultation title on the left, consultant profile on the
    // right, both boxed with a bottom rule.
    let title_w = approx_text_width(&props.consultation_title, 56.0) + 72.0;
    let title_box = Rect::new(30.0, 24.0, 30.0 + title_w, 108.0);
    emit_header_box(
        nodes,
        "header.title",
        title_box,
        &props.consultation_title,
        TextStyle {
            weight: 900,
            letter_spacing: 2.0,
            ..TextStyle::new(56.0, pal.title)
        },
        pal.title_bg,
        pal.title_border,
        header_fade,
    );
    let profile_w = approx_text_width(&props.consultant_profile, 38.0) + 72.0;
    let profile_box = Rect::new(w - 30.0 - profile_w, 24.0, w - 30.0, 90.0);
    emit_header_box(
        nodes,
        "header.profile",
        profile_box,
        &props.consultant_profile,
        TextStyle::new(38.0, pal.keyword),
        pal.profile_bg,
        pal.title_border,
        header_fade,
    );

    // Letter box with a faint inner frame.
    let area = Rect::new(30.0, 130.0, w - 30.0, h - 70.0);
    nodes.push(
        SceneNode::new(
            "area.border",
            AREA_Z,
            Visual::Rect {
                rect: area.inset(1.0),
                fill: pal.border,
                corner_radius: 17.0,
            },
        )
        .with_opacity(text_fade),
    );
    nodes.push(
        SceneNode::new(
            "area",
            AREA_Z,
            Visual::Rect {
                rect: area,
                fill: pal.box_bg,
                corner_radius: 16.0,
            },
        )
        .with_opacity(text_fade),
    );
    emit_inner_frame(nodes, area.inset(-12.0), pal.border, text_fade * 0.25);

    // The letter itself. Lines share the window past the intro evenly; the
    // active line carries a growing rule, finished lines keep a faint one.
    let lines = split_text(&props.consultation_text);
    let font_size = letter_font_size(lines.len());
    let line_height = letter_line_height(font_size);
    let frames_per_line = (ctx.duration as f64 - text_start) / lines.len() as f64;
    let text_x = area.x0 + 40.0;
    let mut y = area.y0 + 35.0;
    for (i, line) in lines.iter().enumerate() {
        let line_start = text_start + i as f64 * frames_per_line;
        let line_end = line_start + frames_per_line;
        let active = f >= line_start;
        let past = f >= line_end;
        let row_h = font_size * line_height;
        let row = Rect::new(text_x, y, area.x1 - 40.0, y + row_h);

        let dim = if active { 1.0 } else { 0.15 };
        let mut node = SceneNode::new(
            format!("line.{i}"),
            TEXT_Z,
            Visual::Text {
                rect: row,
                content: line.clone(),
                style: TextStyle {
                    weight: 800,
                    line_height: Some(line_height),
                    ..TextStyle::new(font_size, pal.text)
                },
            },
        )
        .with_opacity(dim * text_fade);
        if active && !past {
            node = node.with_transform(Transform2D {
                scale: Vec2::new(1.01, 1.01),
                anchor: Vec2::new(row.x0, row.center().y),
                ..Transform2D::default()
            });
        }
        nodes.push(node);

        let line_w = approx_text_width(line, font_size);
        if active && !past {
            let progress = ramp(f, line_start, line_end);
            nodes.push(
                SceneNode::new(
                    format!("line.{i}.rule"),
                    TEXT_Z,
                    Visual::Rect {
                        rect: Rect::new(
                            text_x,
                            row.y1 - 11.0,
                            text_x + line_w * progress,
                            row.y1 - 6.0,
                        ),
                        fill: pal.accent,
                        corner_radius: 3.0,
                    },
                )
                .with_opacity(text_fade),
            );
        } else if past {
            nodes.push(
                SceneNode::new(
                    format!("line.{i}.rule"),
                    TEXT_Z,
                    Visual::Rect {
                        rect: Rect::new(text_x, row.y1 - 10.0, text_x + line_w, row.y1 - 6.0),
                        fill: pal.accent.with_alpha(0.2),
                        corner_radius: 2.0,
                    },
                )
                .with_opacity(text_fade),
            );
        }
        y += row_h;
    }

    // Host icon in the corner, rounded with a soft accent border.
    let icon = Rect::new(w - 235.0, h - 235.0, w - 55.0, h - 55.0);
    nodes.push(
        SceneNode::new(
            "icon.border",
            ICON_Z,
            Visual::Rect {
                rect: icon.inset(3.0),
                fill: Rgba8 {
                    a: 0x55,
                    ..pal.accent
                },
                corner_radius: 93.0,
            },
        )
        .with_opacity(header_fade),
    );
    nodes.push(
        SceneNode::new(
            "icon",
            ICON_Z,
            Visual::Image {
                rect: icon,
                asset: HOST_ICON.to_owned(),
                fit: ImageFit::Cover,
                corner_radius: 90.0,
                brightness: 1.0,
            },
        )
        .with_opacity(header_fade),
    );

    Ok(())
}

fn emit_header_box(
    nodes: &mut Vec<SceneNode>,
    id: &str,
    rect: Rect,
    text: &str,
    style: TextStyle,
    fill: Rgba8,
    rule: Rgba8,
    opacity: f64,
) {
    nodes.push(
        SceneNode::new(
            format!("{id}.box"),
            HEADER_Z,
            Visual::Rect {
                rect,
                fill,
                corner_radius: 10.0,
            },
        )
        .with_opacity(opacity),
    );
    nodes.push(
        SceneNode::new(
            format!("{id}.rule"),
            HEADER_Z,
            Visual::Rect {
                rect: Rect::new(rect.x0, rect.y1 - 3.0, rect.x1, rect.y1),
                fill: rule,
                corner_radius: 0.0,
            },
        )
        .with_opacity(opacity),
    );
    nodes.push(
        SceneNode::new(
            id,
            HEADER_Z,
            Visual::Text {
                rect: Rect::new(rect.x0 + 36.0, rect.y0 + 14.0, rect.x1 - 36.0, rect.y1 - 14.0),
                content: text.to_owned(),
                style,
            },
        )
        .with_opacity(opacity),
    );
}

/// Half-frame marks in all four corners.
fn emit_corners(nodes: &mut Vec<SceneNode>, w: f64, h: f64, color: Rgba8) {
    let arms = [
        ("tl", Rect::new(10.0, 10.0, 80.0, 12.0), Rect::new(10.0, 10.0, 12.0, 80.0)),
        ("tr", Rect::new(w - 80.0, 10.0, w - 10.0, 12.0), Rect::new(w - 12.0, 10.0, w - 10.0, 80.0)),
        ("bl", Rect::new(10.0, h - 12.0, 80.0, h - 10.0), Rect::new(10.0, h - 80.0, 12.0, h - 10.0)),
        ("br", Rect::new(w - 80.0, h - 12.0, w - 10.0, h - 10.0), Rect::new(w - 12.0, h - 80.0, w - 10.0, h - 10.0)),
    ];
    for (name, horizontal, vertical) in arms {
        for (axis, rect) in [("h", horizontal), ("v", vertical)] {
            nodes.push(
                SceneNode::new(
                    format!("corner.{name}.{axis}"),
                    CORNER_Z,
                    Visual::Rect {
                        rect,
                        fill: color,
                        corner_radius: 0.0,
                    },
                )
                .with_opacity(0.5),
            );
        }
    }
}

/// One-pixel frame drawn as four edge strips.
fn emit_inner_frame(nodes: &mut Vec<SceneNode>, rect: Rect, color: Rgba8, opacity: f64) {
    let edges = [
        ("top", Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + 1.0)),
        ("bottom", Rect::new(rect.x0, rect.y1 - 1.0, rect.x1, rect.y1)),
        ("left", Rect::new(rect.x0, rect.y0 + 1.0, rect.x0 + 1.0, rect.y1 - 1.0)),
        ("right", Rect::new(rect.x1 - 1.0, rect.y0 + 1.0, rect.x1, rect.y1 - 1.0)),
    ];
    for (name, edge) in edges {
        nodes.push(
            SceneNode::new(
                format!("area.frame.{name}"),
                AREA_Z,
                Visual::Rect {
                    rect: edge,
                    fill: color,
                    corner_radius: 0.0,
                },
            )
            .with_opacity(opacity),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{Canvas, Fps, FrameIndex};

    fn ctx_at(frame: u64, duration: u64) -> EvalCtx {
        EvalCtx {
            frame: FrameIndex(frame),
            fps: Fps::news_default(),
            canvas: Canvas::full_hd(),
            duration,
        }
    }

    fn props() -> ConsultationProps {
        ConsultationProps {
            consultation_text: "夫が亡くなってから年金だけでは暮らしが苦しく、これからが不安でたまりません。".to_owned(),
            consultation_title: "今日のお悩み".to_owned(),
            consultant_profile: "70代・女性".to_owned(),
            audio_path: None,
            jingle_path: None,
            color_scheme: ColorScheme::Nenkin,
        }
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(split_text("年金が心配です"), vec!["年金が心配です"]);
    }

    #[test]
    fn break_lands_after_a_particle() {
        let text: String = "あ".repeat(24) + "の" + &"あ".repeat(5);
        let lines = split_text(&text);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 25);
        assert!(lines[0].ends_with('の'));
        assert_eq!(lines[1], "あ".repeat(5));
    }

    #[test]
    fn tiny_leftover_stays_attached() {
        let text: String = "あ".repeat(25) + "のああ";
        let lines = split_text(&text);
        assert_eq!(lines, vec![text]);
    }

    #[test]
    fn font_size_shrinks_with_line_count() {
        assert_eq!(letter_font_size(1), 66.0);
        assert_eq!(letter_font_size(9), 60.0);
        assert_eq!(letter_font_size(13), 41.0);
        assert_eq!(letter_font_size(30), 30.0);
    }

    #[test]
    fn palettes_differ_where_it_shows() {
        assert_eq!(palette(ColorScheme::Nenkin).bg.to_hex(), "#1a0808");
        assert_eq!(palette(ColorScheme::Fuji).keyword.to_hex(), "#80ffcc");
        assert_eq!(
            palette(ColorScheme::Kinmokusei).accent.to_hex(),
            "#ffb060"
        );
        // Yellow keywords are shared by the warm schemes only.
        assert_eq!(
            palette(ColorScheme::Sakura).keyword,
            palette(ColorScheme::Nenkin).keyword
        );
    }

    #[test]
    fn header_waits_half_a_second_then_fades_in() {
        let props = props();
        let mut early = Vec::new();
        emit(&mut early, &props, ctx_at(0, 480)).unwrap();
        let title = early.iter().find(|n| n.id == "header.title").unwrap();
        assert_eq!(title.opacity, 0.0);

        let mut late = Vec::new();
        emit(&mut late, &props, ctx_at(40, 480)).unwrap();
        let title = late.iter().find(|n| n.id == "header.title").unwrap();
        assert_eq!(title.opacity, 1.0);
    }

    #[test]
    fn reading_rule_walks_the_lines() {
        let props = props();
        // Two lines at 24 fps: text starts at 48, ends at 480.
        let lines = split_text(&props.consultation_text);
        assert_eq!(lines.len(), 2);

        // Halfway through the first line's window.
        let mut nodes = Vec::new();
        emit(&mut nodes, &props, ctx_at(156, 480)).unwrap();
        let rule = nodes.iter().find(|n| n.id == "line.0.rule").unwrap();
        let full = approx_text_width(&lines[0], 66.0);
        match &rule.visual {
            Visual::Rect { rect, fill, .. } => {
                assert!((rect.width() - full * 0.5).abs() < 1e-6);
                assert_eq!(*fill, palette(ColorScheme::Nenkin).accent);
            }
            _ => unreachable!(),
        }
        // The second line is still dimmed.
        let second = nodes.iter().find(|n| n.id == "line.1").unwrap();
        assert!((second.opacity - 0.15).abs() < 1e-9);

        // Once its window closes the first line keeps a faint full rule.
        let mut later = Vec::new();
        emit(&mut later, &props, ctx_at(300, 480)).unwrap();
        let rule = later.iter().find(|n| n.id == "line.0.rule").unwrap();
        match &rule.visual {
            Visual::Rect { rect, fill, .. } => {
                assert!((rect.width() - full).abs() < 1e-6);
                assert_eq!(fill.a, (0.2_f64 * 255.0).round() as u8);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn host_icon_is_round_and_faded_in_with_the_header() {
        let props = props();
        let mut nodes = Vec::new();
        emit(&mut nodes, &props, ctx_at(240, 480)).unwrap();
        let icon = nodes.iter().find(|n| n.id == "icon").unwrap();
        match &icon.visual {
            Visual::Image { corner_radius, fit, asset, .. } => {
                assert_eq!(*corner_radius, 90.0);
                assert_eq!(*fit, ImageFit::Cover);
                assert_eq!(asset, "katsumi_neutral.png");
            }
            _ => unreachable!(),
        }
    }
}
