//! Frame equality without frame comparison.
//!
//! Many frames of a talk show are visually identical: nothing moves while a
//! chart holds and nobody speaks. [`fingerprint_scene`] walks the evaluated
//! scene field by field into two independently seeded FNV-1a streams, so a
//! host can skip re-rendering frames whose digests match without keeping
//! whole scenes around.

use crate::foundation::math::Fnv1a64;
use crate::scene::tree::{FrameScene, SceneNode, Visual};

const HI_SEED: u64 = Fnv1a64::OFFSET_BASIS;
const LO_SEED: u64 = 0x9ae1_6a3b_2f90_404f;

/// 128-bit digest of one evaluated frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl SceneFingerprint {
    /// Lowercase 32-character hex form, `hi` first.
    pub fn to_hex(self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }
}

pub fn fingerprint_scene(scene: &FrameScene) -> SceneFingerprint {
    let mut a = Fnv1a64::new(HI_SEED);
    let mut b = Fnv1a64::new(LO_SEED);

    write_u64_pair(&mut a, &mut b, scene.frame.0);
    write_u64_pair(&mut a, &mut b, scene.nodes.len() as u64);
    for node in &scene.nodes {
        write_node_pair(&mut a, &mut b, node);
    }

    write_u64_pair(&mut a, &mut b, scene.audio.len() as u64);
    for cue in &scene.audio {
        write_str_pair(&mut a, &mut b, &cue.asset);
        write_f64_pair(&mut a, &mut b, cue.volume);
        write_u64_pair(&mut a, &mut b, cue.start_frame.0);
        write_u8_pair(&mut a, &mut b, u8::from(cue.loops));
    }

    SceneFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

fn write_node_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, node: &SceneNode) {
    write_str_pair(a, b, &node.id);
    write_u64_pair(a, b, node.z as i64 as u64);
    write_f64_pair(a, b, node.opacity);
    let t = node.transform;
    for v in [
        t.translate.x,
        t.translate.y,
        t.rotation_rad,
        t.scale.x,
        t.scale.y,
        t.anchor.x,
        t.anchor.y,
    ] {
        write_f64_pair(a, b, v);
    }
    match &node.visual {
        Visual::Rect {
            rect,
            fill,
            corner_radius,
        } => {
            write_u8_pair(a, b, 0);
            write_rect_pair(a, b, *rect);
            write_color_pair(a, b, *fill);
            write_f64_pair(a, b, *corner_radius);
        }
        Visual::Text {
            rect,
            content,
            style,
        } => {
            write_u8_pair(a, b, 1);
            write_rect_pair(a, b, *rect);
            write_str_pair(a, b, content);
            write_f64_pair(a, b, style.font_size);
            write_color_pair(a, b, style.color);
            write_u64_pair(a, b, u64::from(style.weight));
            write_u8_pair(a, b, style.align as u8);
            write_f64_pair(a, b, style.letter_spacing);
            match style.line_height {
                Some(lh) => {
                    write_u8_pair(a, b, 1);
                    write_f64_pair(a, b, lh);
                }
                None => write_u8_pair(a, b, 0),
            }
        }
        Visual::Image {
            rect,
            asset,
            fit,
            corner_radius,
            brightness,
        } => {
            write_u8_pair(a, b, 2);
            write_rect_pair(a, b, *rect);
            write_str_pair(a, b, asset);
            write_u8_pair(a, b, *fit as u8);
            write_f64_pair(a, b, *corner_radius);
            write_f64_pair(a, b, *brightness);
        }
        Visual::Arc {
            center,
            radius,
            stroke_width,
            start_angle,
            sweep_angle,
            color,
        } => {
            write_u8_pair(a, b, 3);
            write_f64_pair(a, b, center.x);
            write_f64_pair(a, b, center.y);
            write_f64_pair(a, b, *radius);
            write_f64_pair(a, b, *stroke_width);
            write_f64_pair(a, b, *start_angle);
            write_f64_pair(a, b, *sweep_angle);
            write_color_pair(a, b, *color);
        }
    }
}

fn write_rect_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, rect: kurbo::Rect) {
    for v in [rect.x0, rect.y0, rect.x1, rect.y1] {
        write_f64_pair(a, b, v);
    }
}

fn write_color_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, color: crate::foundation::core::Rgba8) {
    a.write_bytes(&[color.r, color.g, color.b, color.a]);
    b.write_bytes(&[color.r, color.g, color.b, color.a]);
}

fn write_u8_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u8) {
    a.write_u8(v);
    b.write_u8(v);
}

fn write_u64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u64) {
    a.write_u64(v);
    b.write_u64(v);
}

fn write_f64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: f64) {
    a.write_f64(v);
    b.write_f64(v);
}

fn write_str_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, s: &str) {
    write_u64_pair(a, b, s.len() as u64);
    a.write_bytes(s.as_bytes());
    b.write_bytes(s.as_bytes());
}
