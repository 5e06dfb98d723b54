//! Cast rendering.
//!
//! Both hosts sit inside the subtitle bar for the whole show. Only three
//! poses are drawn per character; the free-form emotion tag on a script
//! line buckets into one of them. The speaking character bounces and shows
//! an optional bubble icon; the listener dims and falls back to neutral.

use kurbo::Rect;

use crate::foundation::core::{Canvas, FrameIndex, Transform2D};
use crate::scene::tree::{ImageFit, SceneNode, Visual};
use crate::timeline::script::Speaker;

pub(crate) const CAST_Z: i32 = 50;
pub(crate) const BUBBLE_Z: i32 = 51;

/// Pose bucket for an emotion tag. Unknown and empty tags read neutral.
fn pose_for(emotion: &str) -> &'static str {
    match emotion.to_lowercase().as_str() {
        "neutral" | "normal" | "default" | "smile" | "calm" => "neutral",
        "happy" | "excited" | "guts" | "surprised" | "laugh" | "bakusho" | "idea" | "hirameki" => {
            "guts"
        }
        "concerned" | "tired" | "yareyare" | "sad" | "fuseru" | "doyon" | "question"
        | "thinking" | "henken" | "shocked" | "aogu" | "sukashi" | "imaichi" | "akire" | "fuman"
        | "ganakkari" | "tameiki" | "uso" => "yareyare",
        _ => "neutral",
    }
}

/// Bubble icon file for an emotion tag, when one exists.
fn bubble_for(emotion: &str) -> Option<&'static str> {
    match emotion.to_lowercase().as_str() {
        "question" | "thinking" => Some("gimon.png"),
        "idea" | "hirameki" => Some("hirameki.png"),
        "happy" | "excited" => Some("iine.png"),
        "guts" => Some("suki.png"),
        "concerned" | "tired" | "yareyare" | "imaichi" | "akire" | "fuman" | "ganakkari"
        | "tameiki" | "uso" => Some("moyamoya.png"),
        "surprised" | "shocked" => Some("odoroki.png"),
        _ => None,
    }
}

pub(crate) fn pose_asset(speaker: Speaker, emotion: &str) -> String {
    format!("{}_{}.png", speaker.asset_base(), pose_for(emotion))
}

pub(crate) fn bubble_asset(emotion: &str) -> Option<String> {
    bubble_for(emotion).map(|file| format!("emotions/{file}"))
}

/// Emits both characters and the speaker's bubble. `speaking` is the
/// current line's speaker and emotion; `None` renders both hosts idle.
pub(crate) fn emit_cast(
    nodes: &mut Vec<SceneNode>,
    canvas: Canvas,
    frame: FrameIndex,
    speaking: Option<(Speaker, &str)>,
) {
    let bounce = (frame.0 as f64 * 0.5).sin() * 3.0;
    for speaker in [Speaker::Katsumi, Speaker::Hiroshi] {
        let is_active = speaking.is_some_and(|(s, _)| s == speaker);
        let emotion = match speaking {
            Some((s, emotion)) if s == speaker => emotion,
            _ => "neutral",
        };
        let rect = match speaker {
            Speaker::Katsumi => Rect::new(5.0, 0.0, 205.0, 140.0),
            Speaker::Hiroshi => {
                Rect::new(canvas.width_f() - 205.0, 0.0, canvas.width_f() - 5.0, 140.0)
            }
        };
        let rect = rect + kurbo::Vec2::new(0.0, canvas.height_f() - 85.0 - 140.0);
        let mut node = SceneNode::new(
            format!("cast.{}", speaker.asset_base()),
            CAST_Z,
            Visual::Image {
                rect,
                asset: pose_asset(speaker, emotion),
                fit: ImageFit::Contain,
                corner_radius: 6.0,
                brightness: if is_active { 1.0 } else { 0.75 },
            },
        );
        if is_active {
            node = node.with_transform(Transform2D::translated(0.0, bounce));
        }
        nodes.push(node);
    }

    if let Some((speaker, emotion)) = speaking {
        if let Some(asset) = bubble_asset(emotion) {
            let x0 = match speaker {
                Speaker::Katsumi => 30.0,
                Speaker::Hiroshi => canvas.width_f() - 130.0,
            };
            let y0 = canvas.height_f() - 230.0 - 100.0;
            nodes.push(SceneNode::new(
                "cast.bubble",
                BUBBLE_Z,
                Visual::Image {
                    rect: Rect::new(x0, y0, x0 + 100.0, y0 + 100.0),
                    asset,
                    fit: ImageFit::Contain,
                    corner_radius: 0.0,
                    brightness: 1.0,
                },
            ));
        }
    }
}
