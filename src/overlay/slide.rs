//! Opening title slide: full-bleed image, channel-colored title band, and
//! an attention badge picked from the title's keywords.

use kurbo::{Rect, Vec2};

use crate::foundation::core::{Canvas, FrameIndex, Rgba8, Transform2D};
use crate::overlay::approx_text_width;
use crate::scene::tree::{SceneNode, TextStyle, Visual};

pub(crate) const SLIDE_Z: i32 = 1000;

const BADGE_INK: Rgba8 = Rgba8::rgb(0x1a, 0x23, 0x7e);
const BADGE_BORDER: Rgba8 = Rgba8::rgb(0xc5, 0xca, 0xe9);

const FALLBACK_BADGES: [&str; 5] = [
    "知ってた？",
    "損しないで！",
    "要チェック！",
    "見逃し厳禁！",
    "今すぐ確認！",
];

/// Attention badge for the opening, keyed off the title. Rules are ordered;
/// the first hit wins, and titles matching nothing rotate through a stock
/// list by length.
pub(crate) fn badge_text(title: &str) -> &'static str {
    const RULES: [(&[&str], &str); 6] = [
        (&["期限", "締切", "まで"], "期限迫る！"),
        (&["申請", "受給", "もらえ"], "もうもらった？"),
        (&["損", "負担", "減額"], "損しないで！"),
        (&["改正", "変更", "新"], "知ってた？"),
        (&["廃止", "縮小", "削減"], "これマジ？"),
        (&["増額", "拡充", "引き上げ"], "要チェック！"),
    ];
    for (needles, badge) in RULES {
        if needles.iter().any(|n| title.contains(n)) {
            return badge;
        }
    }
    FALLBACK_BADGES[title.chars().count() % FALLBACK_BADGES.len()]
}

fn title_font_size(title: &str) -> f64 {
    match title.chars().count() {
        0..=10 => 200.0,
        11..=15 => 160.0,
        16..=20 => 130.0,
        21..=25 => 110.0,
        26..=30 => 95.0,
        31..=40 => 80.0,
        _ => 68.0,
    }
}

/// Emits the title slide for a frame inside `[0, duration)`.
pub(crate) fn emit_title_slide(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    frame: FrameIndex,
    duration: u64,
    image: &str,
    title: &str,
    channel_color: Rgba8,
) {
    let f = frame.0 as f64;
    let fade_out = ((duration as f64 - f) / 10.0).min(1.0);
    let title_progress = (f / 15.0).min(1.0);
    let title_scale = 0.85 + title_progress * 0.15;
    let title_opacity = (f / 8.0).min(1.0);
    let badge_progress = ((f - 4.0) / 12.0).clamp(0.0, 1.0);
    let badge_scale = 0.9 + badge_progress * 0.1;
    let badge_opacity = ((f - 4.0) / 6.0).clamp(0.0, 1.0);
    let pulse = 1.0 + (f * 0.15).sin() * 0.005;

    let full = Rect::new(0.0, 0.0, canvas.width_f(), canvas.height_f());
    nodes.push(
        SceneNode::new("slide.image", SLIDE_Z, Visual::image(full, image)).with_opacity(fade_out),
    );
    // Flattened stand-in for the 0.3 to 0.6 darkening gradient.
    nodes.push(
        SceneNode::new(
            "slide.dim",
            SLIDE_Z,
            Visual::Rect {
                rect: full,
                fill: Rgba8::BLACK.with_alpha(0.45),
                corner_radius: 0.0,
            },
        )
        .with_opacity(fade_out),
    );
    nodes.push(
        SceneNode::new(
            "slide.mascot",
            SLIDE_Z + 1,
            Visual::Image {
                rect: Rect::new(
                    20.0,
                    canvas.height_f() * 0.02,
                    220.0,
                    canvas.height_f() * 0.02 + 200.0,
                ),
                asset: "mascot.png".to_owned(),
                fit: crate::scene::tree::ImageFit::Contain,
                corner_radius: 0.0,
                brightness: 1.0,
            },
        )
        .with_opacity(title_opacity * fade_out),
    );

    if title.is_empty() {
        return;
    }

    let font_size = title_font_size(title);
    let band = Rect::new(
        canvas.width_f() * 0.08,
        canvas.height_f() * 0.20,
        canvas.width_f() * 0.92,
        canvas.height_f() * 0.88,
    );
    let text_w = approx_text_width(title, font_size).min(band.width() - 80.0);
    let card_w = text_w + 80.0;
    let card_h = font_size * 1.3 + 48.0;
    let center = band.center();
    let card = Rect::new(
        center.x - card_w / 2.0,
        center.y - card_h / 2.0,
        center.x + card_w / 2.0,
        center.y + card_h / 2.0,
    );
    let swell = Transform2D {
        scale: Vec2::new(title_scale * pulse, title_scale * pulse),
        anchor: center.to_vec2(),
        ..Transform2D::default()
    };
    // White border as an outer card behind the colored one.
    nodes.push(
        SceneNode::new(
            "slide.title.border",
            SLIDE_Z + 1,
            Visual::Rect {
                rect: card.inset(4.0),
                fill: Rgba8::WHITE,
                corner_radius: 8.0,
            },
        )
        .with_opacity(title_opacity * fade_out)
        .with_transform(swell),
    );
    nodes.push(
        SceneNode::new(
            "slide.title.card",
            SLIDE_Z + 1,
            Visual::Rect {
                rect: card,
                fill: channel_color,
                corner_radius: 8.0,
            },
        )
        .with_opacity(title_opacity * fade_out)
        .with_transform(swell),
    );
    nodes.push(
        SceneNode::new(
            "slide.title.text",
            SLIDE_Z + 1,
            Visual::Text {
                rect: card,
                content: title.to_owned(),
                style: TextStyle {
                    weight: 900,
                    letter_spacing: 2.0,
                    line_height: Some(1.3),
                    ..TextStyle::centered(font_size, Rgba8::WHITE)
                },
            },
        )
        .with_opacity(title_opacity * fade_out)
        .with_transform(swell),
    );

    let badge = badge_text(title);
    let badge_w = approx_text_width(badge, 72.0) + badge.chars().count() as f64 * 8.0 + 100.0;
    let badge_h = 72.0 * 1.2 + 24.0;
    let badge_box = Rect::new(
        240.0,
        canvas.height_f() * 0.02,
        240.0 + badge_w,
        canvas.height_f() * 0.02 + badge_h,
    );
    let badge_swell = Transform2D {
        scale: Vec2::new(badge_scale, badge_scale),
        anchor: badge_box.center().to_vec2(),
        ..Transform2D::default()
    };
    nodes.push(
        SceneNode::new(
            "slide.badge.border",
            SLIDE_Z + 1,
            Visual::Rect {
                rect: badge_box.inset(3.0),
                fill: BADGE_BORDER,
                corner_radius: 4.0,
            },
        )
        .with_opacity(badge_opacity * fade_out)
        .with_transform(badge_swell),
    );
    nodes.push(
        SceneNode::new(
            "slide.badge.card",
            SLIDE_Z + 1,
            Visual::Rect {
                rect: badge_box,
                fill: Rgba8::WHITE,
                corner_radius: 4.0,
            },
        )
        .with_opacity(badge_opacity * fade_out)
        .with_transform(badge_swell),
    );
    nodes.push(
        SceneNode::new(
            "slide.badge.text",
            SLIDE_Z + 1,
            Visual::Text {
                rect: badge_box,
                content: badge.to_owned(),
                style: TextStyle {
                    weight: 900,
                    letter_spacing: 8.0,
                    ..TextStyle::centered(72.0, BADGE_INK)
                },
            },
        )
        .with_opacity(badge_opacity * fade_out)
        .with_transform(badge_swell),
    );
}
