//! Top-level frame evaluation.
//!
//! [`Evaluator`] binds a validated [`Show`] to a precomputed audio plan, then
//! produces one [`FrameScene`] per requested frame. Evaluation is pure: the
//! same show and frame always yield the same scene, so frames can be computed
//! in any order or in parallel.

use rayon::prelude::*;

use crate::audio::cues::{self, AudioPlan};
use crate::eval::fingerprint::{self, SceneFingerprint};
use crate::eval::{backroom, kamishibai, news, opening};
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{KawaraError, KawaraResult};
use crate::scene::tree::FrameScene;
use crate::show::props::{Show, ShowKind};
use crate::timeline::script::back_room_start;

/// Shared per-frame inputs handed to the kind-specific emitters.
#[derive(Clone, Copy)]
pub(crate) struct EvalCtx {
    pub frame: FrameIndex,
    pub fps: Fps,
    pub canvas: Canvas,
    pub duration: u64,
}

/// Evaluates show frames into declarative scene trees.
///
/// Construction validates the show once and lays out the whole-show audio
/// plan, so [`Evaluator::evaluate`] does no re-validation per frame.
pub struct Evaluator<'a> {
    show: &'a Show,
    slide_duration: u64,
    back_room_start: Option<FrameIndex>,
    audio: AudioPlan,
}

impl<'a> Evaluator<'a> {
    pub fn new(show: &'a Show) -> KawaraResult<Self> {
        show.validate()?;
        let duration = show.duration_in_frames;
        let (slide_duration, entry, audio) = match &show.kind {
            ShowKind::NewsShow(props) => {
                let slide_duration = props.effective_slide_duration();
                let entry = back_room_start(&props.script);
                let plan = cues::news_plan(props, slide_duration, entry, duration)?;
                (slide_duration, entry, plan)
            }
            ShowKind::BackRoomScene(props) => (0, None, cues::back_room_plan(props, duration)?),
            ShowKind::ConsultationOpening(props) => {
                (0, None, cues::consultation_plan(props, show.fps, duration)?)
            }
            ShowKind::Kamishibai(props) => (0, None, cues::kamishibai_plan(props, duration)?),
        };
        Ok(Self {
            show,
            slide_duration,
            back_room_start: entry,
            audio,
        })
    }

    pub fn show(&self) -> &Show {
        self.show
    }

    /// Every audio cue the show will ever play, with its active window.
    pub fn audio_plan(&self) -> &AudioPlan {
        &self.audio
    }

    /// Builds the full scene tree and active audio cues for one frame.
    ///
    /// Nodes come back sorted for painting (ascending z, ties in emit order).
    #[tracing::instrument(skip(self), fields(frame = frame.0))]
    pub fn evaluate(&self, frame: FrameIndex) -> KawaraResult<FrameScene> {
        if frame.0 >= self.show.duration_in_frames {
            return Err(KawaraError::evaluation(format!(
                "frame {} is out of bounds for duration {}",
                frame.0, self.show.duration_in_frames
            )));
        }
        let ctx = EvalCtx {
            frame,
            fps: self.show.fps,
            canvas: self.show.canvas,
            duration: self.show.duration_in_frames,
        };

        let mut scene = FrameScene::new(frame);
        match &self.show.kind {
            ShowKind::NewsShow(props) => news::emit(
                &mut scene.nodes,
                props,
                ctx,
                self.slide_duration,
                self.back_room_start,
            )?,
            ShowKind::BackRoomScene(props) => backroom::emit(&mut scene.nodes, props, ctx)?,
            ShowKind::ConsultationOpening(props) => opening::emit(&mut scene.nodes, props, ctx)?,
            ShowKind::Kamishibai(props) => kamishibai::emit(&mut scene.nodes, props, ctx)?,
        }
        scene.audio = self.audio.at(frame);
        scene.sort_for_paint();
        Ok(scene)
    }

    /// Evaluates every `step`-th frame of `range`, in ascending order.
    pub fn evaluate_range(&self, range: FrameRange, step: u64) -> KawaraResult<Vec<FrameScene>> {
        let frames = range_frames(range, step)?;
        let mut scenes = Vec::with_capacity(frames.len());
        for frame in frames {
            scenes.push(self.evaluate(frame)?);
        }
        Ok(scenes)
    }

    /// Like [`Evaluator::evaluate_range`], fanned out across the rayon pool.
    /// Output order matches the serial version.
    pub fn evaluate_range_parallel(
        &self,
        range: FrameRange,
        step: u64,
    ) -> KawaraResult<Vec<FrameScene>> {
        let frames = range_frames(range, step)?;
        let results = frames
            .par_iter()
            .map(|frame| self.evaluate(*frame))
            .collect::<Vec<_>>();
        let mut scenes = Vec::with_capacity(results.len());
        for result in results {
            scenes.push(result?);
        }
        Ok(scenes)
    }

    /// Stable digest of one frame's evaluated scene.
    pub fn fingerprint(&self, frame: FrameIndex) -> KawaraResult<SceneFingerprint> {
        let scene = self.evaluate(frame)?;
        Ok(fingerprint::fingerprint_scene(&scene))
    }
}

fn range_frames(range: FrameRange, step: u64) -> KawaraResult<Vec<FrameIndex>> {
    if step == 0 {
        return Err(KawaraError::validation("frame step must be at least 1"));
    }
    Ok((range.start.0..range.end.0)
        .step_by(step as usize)
        .map(FrameIndex)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::show::dsl::ShowBuilder;
    use crate::timeline::script::{SECTION_BACK_ROOM, Speaker};

    fn tiny_show() -> Show {
        let mut builder = ShowBuilder::news("年金ニュース", 600)
            .narration("audio/ep1.wav")
            .background("backgrounds/studio.png")
            .line(Speaker::Katsumi, "こんにちは", 0, 300)
            .line(Speaker::Hiroshi, "年金の話です", 300, 600);
        builder = builder.key_point("受給額が変わる");
        match builder.build() {
            Ok(show) => show,
            Err(err) => panic!("fixture show must validate: {err}"),
        }
    }

    #[test]
    fn evaluate_is_deterministic() {
        let show = tiny_show();
        let eval = Evaluator::new(&show).unwrap();
        let a = eval.evaluate(FrameIndex(120)).unwrap();
        let b = eval.evaluate(FrameIndex(120)).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            eval.fingerprint(FrameIndex(120)).unwrap(),
            eval.fingerprint(FrameIndex(120)).unwrap()
        );
    }

    #[test]
    fn evaluate_rejects_out_of_bounds_frames() {
        let show = tiny_show();
        let eval = Evaluator::new(&show).unwrap();
        let err = eval.evaluate(FrameIndex(600)).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn nodes_come_back_sorted_by_z() {
        let show = tiny_show();
        let eval = Evaluator::new(&show).unwrap();
        let scene = eval.evaluate(FrameIndex(60)).unwrap();
        assert!(!scene.nodes.is_empty());
        for pair in scene.nodes.windows(2) {
            assert!(pair[0].z <= pair[1].z);
        }
    }

    #[test]
    fn narration_and_bgm_are_active_from_frame_zero_without_a_slide() {
        let show = tiny_show();
        let eval = Evaluator::new(&show).unwrap();
        let scene = eval.evaluate(FrameIndex(0)).unwrap();
        let assets: Vec<&str> = scene.audio.iter().map(|c| c.asset.as_str()).collect();
        assert!(assets.contains(&"audio/ep1.wav"));
        assert!(assets.contains(&"main_bgm.mp3"));
    }

    #[test]
    fn range_evaluation_steps_through_frames() {
        let show = tiny_show();
        let eval = Evaluator::new(&show).unwrap();
        let range = FrameRange::new(FrameIndex(0), FrameIndex(10)).unwrap();
        let scenes = eval.evaluate_range(range, 4).unwrap();
        let frames: Vec<u64> = scenes.iter().map(|s| s.frame.0).collect();
        assert_eq!(frames, vec![0, 4, 8]);

        let err = eval.evaluate_range(range, 0).unwrap_err();
        assert!(err.to_string().contains("step"));
    }

    #[test]
    fn parallel_range_matches_serial_order() {
        let show = tiny_show();
        let eval = Evaluator::new(&show).unwrap();
        let range = FrameRange::new(FrameIndex(0), FrameIndex(24)).unwrap();
        let serial = eval.evaluate_range(range, 3).unwrap();
        let parallel = eval.evaluate_range_parallel(range, 3).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn construction_rejects_invalid_shows() {
        let mut show = tiny_show();
        show.duration_in_frames = 0;
        assert!(Evaluator::new(&show).is_err());
    }

    #[test]
    fn back_room_frames_black_out_the_studio() {
        let mut builder = ShowBuilder::news("年金ニュース", 1200)
            .narration("audio/ep2.wav")
            .background("backgrounds/studio.png")
            .line(Speaker::Katsumi, "本編です", 0, 900);
        builder = builder.script_line(crate::timeline::script::ScriptLine {
            speaker: Speaker::Hiroshi,
            text: "お疲れさまでした".to_owned(),
            emotion: String::new(),
            start_frame: FrameIndex(900),
            end_frame: FrameIndex(1200),
            section: Some(SECTION_BACK_ROOM.to_owned()),
        });
        let show = builder.build().unwrap();
        let eval = Evaluator::new(&show).unwrap();

        let scene = eval.evaluate(FrameIndex(1000)).unwrap();
        assert!(scene.nodes.iter().any(|n| n.id == "backdrop.backroom"));
    }
}
