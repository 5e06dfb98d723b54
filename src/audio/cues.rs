//! Time-scoped audio cue planning.
//!
//! Evaluation is per frame, but audio is inherently windowed: a narration
//! track "at" frame 4000 started playing long before. The planner lays out
//! every cue's active window once per show; per-frame evaluation then just
//! filters the plan. Mixing and decoding stay on the host's side.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{FrameIndex, FrameRange, Fps};
use crate::foundation::error::KawaraResult;
use crate::overlay::chart::ChartTrigger;
use crate::scene::tree::AudioCue;
use crate::show::props::{BackRoomProps, ConsultationProps, KamishibaiProps, NewsShowProps};

const MAIN_BGM: &str = "main_bgm.mp3";
const MAIN_JINGLE: &str = "main_jingle.mp3";
const BACK_ROOM_JINGLE: &str = "hikaeshitsu_jingle.mp3";
const KAMISHIBAI_BGM: &str = "hikaeshitsu_bgm.mp3";

/// Longest a one-shot jingle or switch SE stays audible.
const JINGLE_WINDOW: u64 = 90;
/// Two chart SEs closer than this collapse into the first.
const SE_MIN_GAP: u64 = 60;

const MONEY_KEYWORDS: [&str; 19] = [
    "合計", "総額", "金額", "万円", "億", "兆", "費用", "支出", "収入", "給付", "受給",
    "年金額", "手取り", "月額", "年額", "平均", "中央値", "世帯", "貯蓄",
];
const NEGATIVE_KEYWORDS: [&str; 26] = [
    "減", "少な", "足りな", "不足", "下が", "苦し", "厳し", "いまいち", "お役所", "政治家",
    "金持ち", "格差", "負担", "不安", "心配", "大変", "困", "赤字", "マイナス", "低", "悪",
    "問題", "危", "高齢", "老後", "介護",
];

/// Chart switch SE for a chart label. Money terms win over negative ones;
/// anything else gets the stock jingle.
pub fn chart_jingle_asset(label: &str) -> &'static str {
    if MONEY_KEYWORDS.iter().any(|kw| label.contains(kw)) {
        "chart_money.mp3"
    } else if NEGATIVE_KEYWORDS.iter().any(|kw| label.contains(kw)) {
        "chart_negative.mp3"
    } else {
        "chart_jingle.mp3"
    }
}

/// One audio asset scheduled onto the show timeline. `window.start` is both
/// when it becomes audible and the host's seek anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedCue {
    pub asset: String,
    pub volume: f64,
    pub window: FrameRange,
    #[serde(default)]
    pub loops: bool,
}

/// The complete cue list for one show.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioPlan {
    cues: Vec<PlannedCue>,
}

impl AudioPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cue: PlannedCue) {
        self.cues.push(cue);
    }

    pub fn cues(&self) -> &[PlannedCue] {
        &self.cues
    }

    /// Cues audible at `frame`, in plan order.
    pub fn at(&self, frame: FrameIndex) -> Vec<AudioCue> {
        self.cues
            .iter()
            .filter(|cue| cue.window.contains(frame))
            .map(|cue| AudioCue {
                asset: cue.asset.clone(),
                volume: cue.volume,
                start_frame: cue.window.start,
                loops: cue.loops,
            })
            .collect()
    }
}

fn window(start: u64, end: u64) -> KawaraResult<FrameRange> {
    FrameRange::new(FrameIndex(start.min(end)), FrameIndex(end))
}

/// Full audio plan for the flagship news show.
pub(crate) fn news_plan(
    props: &NewsShowProps,
    slide_duration: u64,
    back_room_start: Option<FrameIndex>,
    duration: u64,
) -> KawaraResult<AudioPlan> {
    let mut plan = AudioPlan::new();

    if slide_duration > 0 {
        let jingle = if props.quote.is_some() {
            MAIN_JINGLE.to_owned()
        } else {
            props
                .slide_jingle
                .clone()
                .unwrap_or_else(|| MAIN_JINGLE.to_owned())
        };
        plan.push(PlannedCue {
            asset: jingle,
            volume: 0.3,
            window: window(0, slide_duration.min(duration))?,
            loops: false,
        });
    }

    plan.push(PlannedCue {
        asset: props.audio_path.clone(),
        volume: 1.0,
        window: window(slide_duration, duration)?,
        loops: false,
    });
    plan.push(PlannedCue {
        asset: MAIN_BGM.to_owned(),
        volume: 0.1,
        window: window(slide_duration, duration)?,
        loops: true,
    });

    if let Some(bs) = back_room_start {
        if bs.0 < duration {
            plan.push(PlannedCue {
                asset: props
                    .back_room_jingle
                    .clone()
                    .unwrap_or_else(|| BACK_ROOM_JINGLE.to_owned()),
                volume: 0.3,
                window: window(bs.0, (bs.0 + JINGLE_WINDOW).min(duration))?,
                loops: false,
            });
        }
    }

    plan_chart_cues(&mut plan, &props.chart_data, duration)?;
    Ok(plan)
}

/// Chart switch SEs. Triggers outside the show, or crowding the previous
/// trigger, make no sound.
pub(crate) fn plan_chart_cues(
    plan: &mut AudioPlan,
    triggers: &[ChartTrigger],
    duration: u64,
) -> KawaraResult<()> {
    for (i, trigger) in triggers.iter().enumerate() {
        let at = trigger.trigger_frame.0;
        if at >= duration {
            continue;
        }
        if i > 0 && at.saturating_sub(triggers[i - 1].trigger_frame.0) < SE_MIN_GAP {
            continue;
        }
        let se_frames = JINGLE_WINDOW.min(duration - at);
        if se_frames == 0 {
            continue;
        }
        plan.push(PlannedCue {
            asset: chart_jingle_asset(&trigger.data.label).to_owned(),
            volume: 0.3,
            window: window(at, at + se_frames)?,
            loops: false,
        });
    }
    Ok(())
}

pub(crate) fn back_room_plan(props: &BackRoomProps, duration: u64) -> KawaraResult<AudioPlan> {
    let mut plan = AudioPlan::new();
    plan.push(PlannedCue {
        asset: props
            .jingle_path
            .clone()
            .unwrap_or_else(|| BACK_ROOM_JINGLE.to_owned()),
        volume: 0.3,
        window: window(0, JINGLE_WINDOW.min(duration))?,
        loops: false,
    });
    plan.push(PlannedCue {
        asset: props.audio_path.clone(),
        volume: 1.0,
        window: window(0, duration)?,
        loops: false,
    });
    if let Some(bgm) = &props.bgm_path {
        plan.push(PlannedCue {
            asset: bgm.clone(),
            volume: 0.1,
            window: window(0, duration)?,
            loops: false,
        });
    }
    Ok(plan)
}

pub(crate) fn consultation_plan(
    props: &ConsultationProps,
    fps: Fps,
    duration: u64,
) -> KawaraResult<AudioPlan> {
    let mut plan = AudioPlan::new();
    plan.push(PlannedCue {
        asset: props
            .jingle_path
            .clone()
            .unwrap_or_else(|| BACK_ROOM_JINGLE.to_owned()),
        volume: 0.5,
        window: window(0, duration)?,
        loops: false,
    });
    if let Some(narration) = &props.audio_path {
        let start = fps.secs_to_frames_round(1.0);
        plan.push(PlannedCue {
            asset: narration.clone(),
            volume: 1.0,
            window: window(start, duration)?,
            loops: false,
        });
    }
    Ok(plan)
}

pub(crate) fn kamishibai_plan(props: &KamishibaiProps, duration: u64) -> KawaraResult<AudioPlan> {
    let mut plan = AudioPlan::new();
    plan.push(PlannedCue {
        asset: props
            .bgm_path
            .clone()
            .unwrap_or_else(|| KAMISHIBAI_BGM.to_owned()),
        volume: props.bgm_volume,
        window: window(0, duration)?,
        loops: true,
    });
    let mut start = 0u64;
    for slide in &props.slides {
        let end = (start + slide.duration_frames).min(duration);
        plan.push(PlannedCue {
            asset: slide.audio_path.clone(),
            volume: 1.0,
            window: window(start.min(duration), end)?,
            loops: false,
        });
        start += slide.duration_frames;
    }
    Ok(plan)
}
