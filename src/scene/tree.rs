//! Declarative per-frame output model.
//!
//! Evaluation produces a flat [`FrameScene`]: draw nodes in painter order
//! plus the audio cues audible at that frame. The tree carries no pixels.
//! A host compositor resolves asset paths, rasterizes text, and mixes audio.

use crate::foundation::core::{FrameIndex, Rgba8, Transform2D};
use kurbo::{Point, Rect};

/// How an image asset is scaled into its layout box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFit {
    /// Fill the box, cropping overflow.
    #[default]
    Cover,
    /// Fit entirely inside the box, letterboxing.
    Contain,
    /// Stretch to the box, ignoring aspect ratio.
    Fill,
}

/// Horizontal alignment of a text run within its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Typesetting for one text run. Sizes are canvas pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub color: Rgba8,
    /// CSS-style weight, 100..=900.
    #[serde(default = "default_weight")]
    pub weight: u16,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub letter_spacing: f64,
    /// Multiple of the font size; the host's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
}

fn default_weight() -> u16 {
    700
}

impl TextStyle {
    /// Bold run with default alignment and spacing. The show sets type bold
    /// almost everywhere, so callers override the exceptions.
    pub fn new(font_size: f64, color: Rgba8) -> Self {
        Self {
            font_size,
            color,
            weight: default_weight(),
            align: TextAlign::default(),
            letter_spacing: 0.0,
            line_height: None,
        }
    }

    pub fn centered(font_size: f64, color: Rgba8) -> Self {
        Self {
            align: TextAlign::Center,
            ..Self::new(font_size, color)
        }
    }
}

/// Drawable payload of a scene node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visual {
    /// Filled, optionally rounded rectangle.
    Rect {
        rect: Rect,
        fill: Rgba8,
        #[serde(default)]
        corner_radius: f64,
    },
    /// Text run laid out inside a box.
    Text {
        rect: Rect,
        content: String,
        style: TextStyle,
    },
    /// External raster asset scaled into a box. `asset` is a path the host
    /// resolves against its media root.
    Image {
        rect: Rect,
        asset: String,
        #[serde(default)]
        fit: ImageFit,
        #[serde(default)]
        corner_radius: f64,
        /// 1.0 is unfiltered; lower values darken the image.
        #[serde(default = "default_brightness")]
        brightness: f64,
    },
    /// Stroked ring segment. `start_angle` is radians clockwise from twelve
    /// o'clock; `sweep_angle` extends clockwise.
    Arc {
        center: Point,
        radius: f64,
        stroke_width: f64,
        start_angle: f64,
        sweep_angle: f64,
        color: Rgba8,
    },
}

/// One draw node. Nodes are flat; grouping happens at emission time by
/// multiplying opacity down and baking transforms.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneNode {
    /// Stable dotted identifier, e.g. `chart.panel` or `cast.katsumi`.
    pub id: String,
    /// Painter layer. Higher layers draw later.
    pub z: i32,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Transform2D::is_identity")]
    pub transform: Transform2D,
    pub visual: Visual,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_brightness() -> f64 {
    1.0
}

impl Visual {
    /// Cover-fit image with no rounding or filter.
    pub fn image(rect: Rect, asset: impl Into<String>) -> Self {
        Visual::Image {
            rect,
            asset: asset.into(),
            fit: ImageFit::default(),
            corner_radius: 0.0,
            brightness: 1.0,
        }
    }
}

impl SceneNode {
    pub fn new(id: impl Into<String>, z: i32, visual: Visual) -> Self {
        Self {
            id: id.into(),
            z,
            opacity: 1.0,
            transform: Transform2D::default(),
            visual,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = transform;
        self
    }
}

/// An audio asset audible at the evaluated frame. `start_frame` anchors the
/// host's seek position within the asset; looping cues wrap around.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioCue {
    pub asset: String,
    pub volume: f64,
    pub start_frame: FrameIndex,
    #[serde(default, rename = "loop")]
    pub loops: bool,
}

/// Complete evaluation result for one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameScene {
    pub frame: FrameIndex,
    pub nodes: Vec<SceneNode>,
    pub audio: Vec<AudioCue>,
}

impl FrameScene {
    pub fn new(frame: FrameIndex) -> Self {
        Self {
            frame,
            nodes: Vec::new(),
            audio: Vec::new(),
        }
    }

    /// Sorts nodes into painter order: ascending z, emission order within a
    /// layer. The sort is stable, so equal layers keep their relative order.
    pub fn sort_for_paint(&mut self) {
        self.nodes.sort_by_key(|node| node.z);
    }
}

/// Multiplies a group opacity into every node of a slice.
pub(crate) fn scale_opacity(nodes: &mut [SceneNode], factor: f64) {
    for node in nodes {
        node.opacity *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_node(id: &str, z: i32) -> SceneNode {
        SceneNode::new(
            id,
            z,
            Visual::Rect {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                fill: Rgba8::BLACK,
                corner_radius: 0.0,
            },
        )
    }

    #[test]
    fn painter_sort_is_stable_within_a_layer() {
        let mut scene = FrameScene::new(FrameIndex(0));
        scene.nodes.push(rect_node("top", 100));
        scene.nodes.push(rect_node("bg", 0));
        scene.nodes.push(rect_node("first", 50));
        scene.nodes.push(rect_node("second", 50));
        scene.sort_for_paint();
        let ids: Vec<&str> = scene.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["bg", "first", "second", "top"]);
    }

    #[test]
    fn group_opacity_multiplies_down() {
        let mut nodes = vec![rect_node("a", 0).with_opacity(0.5), rect_node("b", 0)];
        scale_opacity(&mut nodes, 0.5);
        assert_eq!(nodes[0].opacity, 0.25);
        assert_eq!(nodes[1].opacity, 0.5);
    }

    #[test]
    fn visual_serializes_with_type_tag() {
        let node = rect_node("bar", 3);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["visual"]["type"], "rect");
        assert_eq!(json["visual"]["fill"], "#000000");
        assert_eq!(json["z"], 3);
        // Identity transform stays out of the serialized form.
        assert!(json.get("transform").is_none());
    }

    #[test]
    fn audio_cue_uses_loop_key() {
        let cue = AudioCue {
            asset: "main_bgm.mp3".to_owned(),
            volume: 0.1,
            start_frame: FrameIndex(168),
            loops: true,
        };
        let json = serde_json::to_value(&cue).unwrap();
        assert_eq!(json["loop"], true);
        let back: AudioCue = serde_json::from_value(json).unwrap();
        assert_eq!(back, cue);
    }

    #[test]
    fn scene_round_trips_through_json() {
        let mut scene = FrameScene::new(FrameIndex(42));
        scene.nodes.push(
            SceneNode::new(
                "subtitle.text",
                60,
                Visual::Text {
                    rect: Rect::new(220.0, 656.0, 1750.0, 1080.0),
                    content: "年金が変わります".to_owned(),
                    style: TextStyle::new(95.0, Rgba8::WHITE),
                },
            )
            .with_opacity(0.8),
        );
        scene.audio.push(AudioCue {
            asset: "narration.mp3".to_owned(),
            volume: 1.0,
            start_frame: FrameIndex(0),
            loops: false,
        });
        let json = serde_json::to_string(&scene).unwrap();
        let back: FrameScene = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scene);
    }
}
