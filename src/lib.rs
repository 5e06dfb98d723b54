//! Kawara evaluates narrated "news show" video compositions frame by frame.
//!
//! Everything in this crate is a pure function from `(FrameIndex, props)` to a
//! declarative [`FrameScene`]: a flat list of visual primitives (rects, text,
//! images, arcs) plus the audio cues active at that frame. A host compositor
//! owns the clock, samples the evaluator once per output frame, and turns the
//! scene plus referenced media files into pixels. Kawara itself never
//! rasterizes and never performs I/O during evaluation.
//!
//! # Pipeline overview
//!
//! 1. **Describe**: build a [`Show`] from JSON (serde) or via [`ShowBuilder`]
//! 2. **Validate**: `show.validate()` fails fast on malformed input
//! 3. **Evaluate**: `Evaluator + FrameIndex -> FrameScene` (what is visible,
//!    in what order, plus active audio)
//! 4. **Consume**: serialize the scene, or digest it with
//!    [`fingerprint_scene`] for change detection
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: identical inputs yield byte-identical
//!   scenes; there is no hidden state and no ambient clock.
//! - **No I/O in evaluation**: asset references stay paths, never file reads.
#![forbid(unsafe_code)]

mod animation;
mod audio;
mod eval;
mod foundation;
mod overlay;
mod scene;
mod show;
mod timeline;

pub use animation::curves::{count_up, ramp, stagger_progress};
pub use animation::interp::{Curve, Extrapolate, interpolate, interpolate_clamped};
pub use audio::cues::{AudioPlan, PlannedCue, chart_jingle_asset};
pub use eval::evaluator::Evaluator;
pub use eval::fingerprint::{SceneFingerprint, fingerprint_scene};
pub use foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8, Transform2D, Vec2,
};
pub use foundation::error::{KawaraError, KawaraResult};
pub use overlay::chart::{ChartItem, ChartKind, ChartSpec, ChartTrigger};
pub use overlay::sentiment::{Sentiment, classify_label, sentiment_color};
pub use overlay::subtitle::{SubtitleStyle, split_by_width};
pub use scene::tree::{
    AudioCue, FrameScene, ImageFit, SceneNode, TextAlign, TextStyle, Visual,
};
pub use show::dsl::ShowBuilder;
pub use show::props::{
    BackRoomProps, BudgetEntry, ChecklistData, ChecklistItem, ColorScheme, ConsultationProps,
    HouseholdBudgetData, KamishibaiProps, KamishibaiSlide, LayoutPattern, ListenerLetterData,
    NewsShowProps, Show, ShowKind,
};
pub use timeline::script::{ScriptLine, Speaker};
pub use timeline::segments::{SceneTimingConfig, Segment};
pub use timeline::triggers::{ActiveWindow, resolve_active};
