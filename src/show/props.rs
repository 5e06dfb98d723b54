//! Serde model of the show JSON.
//!
//! One `Show` document fully determines every frame: static metadata plus the
//! typed props of one composition kind. Nothing here is interpreted at parse
//! time; `validate()` runs the structural checks and the evaluator reads the
//! rest verbatim.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8};
use crate::foundation::error::{KawaraError, KawaraResult};
use crate::overlay::chart::ChartTrigger;
use crate::overlay::subtitle::SubtitleStyle;
use crate::timeline::script::{ScriptLine, validate_script};
use crate::timeline::segments::SceneTimingConfig;

/// Top-level show document. `kind` selects the composition; its props are
/// flattened beside the shared fields in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Show {
    #[serde(default)]
    pub fps: Fps,
    #[serde(default)]
    pub canvas: Canvas,
    pub duration_in_frames: u64,
    #[serde(flatten)]
    pub kind: ShowKind,
}

/// The registered composition kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShowKind {
    /// The flagship two-character news talk.
    NewsShow(NewsShowProps),
    /// Standalone closing talk on the back-room set.
    BackRoomScene(BackRoomProps),
    /// Consultation-letter cold open.
    ConsultationOpening(ConsultationProps),
    /// Picture-story slideshow.
    Kamishibai(KamishibaiProps),
}

impl Show {
    /// Show at the format's stock fps and raster.
    pub fn new(duration_in_frames: u64, kind: ShowKind) -> Self {
        Self {
            fps: Fps::default(),
            canvas: Canvas::default(),
            duration_in_frames,
            kind,
        }
    }

    /// Fail-fast structural checks over the whole document.
    pub fn validate(&self) -> KawaraResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(KawaraError::validation("fps must have num>0 and den>0"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(KawaraError::validation("canvas width/height must be > 0"));
        }
        if self.duration_in_frames == 0 {
            return Err(KawaraError::validation("duration_in_frames must be > 0"));
        }
        match &self.kind {
            ShowKind::NewsShow(props) => props.validate(),
            ShowKind::BackRoomScene(props) => props.validate(),
            ShowKind::ConsultationOpening(props) => props.validate(),
            ShowKind::Kamishibai(props) => props.validate(),
        }
    }
}

/// Which side panel accompanies the main talk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPattern {
    /// Household-budget breakdown panel.
    Documentary,
    /// Claim-it checklist panel.
    Checklist,
    /// Listener-letter panel.
    Radio,
}

/// Input data for the household-budget panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseholdBudgetData {
    /// Whose budget, e.g. `73歳女性・一人暮らし`.
    pub person_label: String,
    /// Monthly pension income in yen.
    pub income: i64,
    pub expenses: Vec<BudgetEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub label: String,
    /// Yen per month.
    pub amount: i64,
}

impl HouseholdBudgetData {
    /// Income minus all expenses; negative when the budget runs a deficit.
    pub fn remaining(&self) -> i64 {
        self.income - self.expenses.iter().map(|e| e.amount).sum::<i64>()
    }

    fn validate(&self) -> KawaraResult<()> {
        if self.person_label.is_empty() {
            return Err(KawaraError::validation("household_budget: empty person_label"));
        }
        if self.income < 0 {
            return Err(KawaraError::validation("household_budget: negative income"));
        }
        for (i, entry) in self.expenses.iter().enumerate() {
            if entry.amount < 0 {
                return Err(KawaraError::validation(format!(
                    "household_budget.expenses[{i}] ({}): negative amount",
                    entry.label
                )));
            }
        }
        Ok(())
    }
}

/// Input data for the checklist panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChecklistData {
    pub title: String,
    pub items: Vec<ChecklistItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    /// Display amount, e.g. `月5,310円`.
    pub amount: String,
    /// Frame at which the check mark lands.
    pub checked_at_frame: FrameIndex,
}

impl ChecklistData {
    fn validate(&self) -> KawaraResult<()> {
        if self.title.is_empty() {
            return Err(KawaraError::validation("checklist: empty title"));
        }
        if self.items.is_empty() {
            return Err(KawaraError::validation("checklist: no items"));
        }
        Ok(())
    }
}

/// Input data for the listener-letter panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListenerLetterData {
    /// Sender line, e.g. `68歳・主婦・東京都`.
    pub sender_label: String,
    pub letter_text: String,
}

impl ListenerLetterData {
    fn validate(&self) -> KawaraResult<()> {
        if self.letter_text.is_empty() {
            return Err(KawaraError::validation("listener_letter: empty letter_text"));
        }
        Ok(())
    }
}

/// Props of the flagship news show.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsShowProps {
    pub title: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default = "default_channel_color")]
    pub channel_color: Rgba8,
    /// Attribution line; empty or `独自取材` suppresses the credit.
    #[serde(default)]
    pub source: String,
    pub script: Vec<ScriptLine>,
    /// Narration track for the whole talk.
    pub audio_path: String,
    pub background_image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
    /// Overrides the ticker run; `None` falls back to title + key points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<Vec<String>>,
    #[serde(default)]
    pub subtitle_style: SubtitleStyle,
    /// Highlight band color for the highlight subtitle style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_color: Option<Rgba8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chart_data: Vec<ChartTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_pattern: Option<LayoutPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_budget: Option<HouseholdBudgetData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<ChecklistData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener_letter: Option<ListenerLetterData>,
    /// Opening quote; takes precedence over the title slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    /// Title-slide artwork for shows without a quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_jingle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_room_jingle: Option<String>,
    #[serde(default)]
    pub timing: SceneTimingConfig,
}

fn default_channel_color() -> Rgba8 {
    Rgba8::rgb(0x22, 0x8b, 0x22)
}

impl Default for NewsShowProps {
    fn default() -> Self {
        Self {
            title: String::new(),
            channel_name: String::new(),
            channel_color: default_channel_color(),
            source: String::new(),
            script: Vec::new(),
            audio_path: String::new(),
            background_image: String::new(),
            key_points: Vec::new(),
            ticker: None,
            subtitle_style: SubtitleStyle::default(),
            subtitle_color: None,
            chart_data: Vec::new(),
            layout_pattern: None,
            household_budget: None,
            checklist: None,
            listener_letter: None,
            quote: None,
            slide_image: None,
            slide_jingle: None,
            back_room_jingle: None,
            timing: SceneTimingConfig::default(),
        }
    }
}

impl NewsShowProps {
    /// Opening slide length actually used: the configured duration when the
    /// show has a quote or a title slide image, zero for a cold open.
    pub fn effective_slide_duration(&self) -> u64 {
        if self.quote.is_some() || self.slide_image.is_some() {
            self.timing.slide_duration
        } else {
            0
        }
    }

    pub fn validate(&self) -> KawaraResult<()> {
        if self.title.is_empty() {
            return Err(KawaraError::validation("news_show: empty title"));
        }
        if self.audio_path.is_empty() {
            return Err(KawaraError::validation("news_show: empty audio_path"));
        }
        if self.background_image.is_empty() {
            return Err(KawaraError::validation("news_show: empty background_image"));
        }
        if self.script.is_empty() {
            return Err(KawaraError::validation("news_show: empty script"));
        }
        validate_script(&self.script)?;

        for (i, pair) in self.chart_data.windows(2).enumerate() {
            if pair[1].trigger_frame.0 < pair[0].trigger_frame.0 {
                return Err(KawaraError::validation(format!(
                    "chart_data[{}] triggers at {} before chart_data[{i}] at {}",
                    i + 1,
                    pair[1].trigger_frame.0,
                    pair[0].trigger_frame.0
                )));
            }
        }
        for (i, trigger) in self.chart_data.iter().enumerate() {
            trigger.data.validate(&format!("chart_data[{i}]"))?;
        }

        if let Some(budget) = &self.household_budget {
            budget.validate()?;
        }
        if let Some(checklist) = &self.checklist {
            checklist.validate()?;
        }
        if let Some(letter) = &self.listener_letter {
            letter.validate()?;
        }
        Ok(())
    }
}

/// Props of the standalone back-room talk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BackRoomProps {
    pub script: Vec<ScriptLine>,
    pub audio_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jingle_path: Option<String>,
}

impl BackRoomProps {
    pub fn validate(&self) -> KawaraResult<()> {
        if self.audio_path.is_empty() {
            return Err(KawaraError::validation("back_room_scene: empty audio_path"));
        }
        if self.script.is_empty() {
            return Err(KawaraError::validation("back_room_scene: empty script"));
        }
        validate_script(&self.script)
    }
}

/// Named palette of the consultation opening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Deep red, the pension-topic look.
    #[default]
    Nenkin,
    /// Pink.
    Sakura,
    /// Purple.
    Fuji,
    /// Amber.
    Kinmokusei,
}

/// Props of the consultation-letter cold open.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultationProps {
    pub consultation_text: String,
    pub consultation_title: String,
    #[serde(default)]
    pub consultant_profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jingle_path: Option<String>,
    #[serde(default)]
    pub color_scheme: ColorScheme,
}

impl ConsultationProps {
    pub fn validate(&self) -> KawaraResult<()> {
        if self.consultation_text.is_empty() {
            return Err(KawaraError::validation(
                "consultation_opening: empty consultation_text",
            ));
        }
        if self.consultation_title.is_empty() {
            return Err(KawaraError::validation(
                "consultation_opening: empty consultation_title",
            ));
        }
        Ok(())
    }
}

/// Props of the picture-story slideshow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KamishibaiProps {
    pub slides: Vec<KamishibaiSlide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm_path: Option<String>,
    #[serde(default = "default_kamishibai_bgm_volume")]
    pub bgm_volume: f64,
    #[serde(default = "default_kamishibai_channel_color")]
    pub channel_color: Rgba8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KamishibaiSlide {
    pub image_path: String,
    pub audio_path: String,
    pub duration_frames: u64,
    /// Narration text, carried for authoring tools; not drawn.
    #[serde(default)]
    pub subtitle: String,
    /// Story-beat tag, e.g. `hook` or `summary`.
    #[serde(default)]
    pub tag: String,
}

fn default_kamishibai_bgm_volume() -> f64 {
    0.15
}

fn default_kamishibai_channel_color() -> Rgba8 {
    Rgba8::rgb(0x8b, 0x45, 0x13)
}

impl Default for KamishibaiProps {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            bgm_path: None,
            bgm_volume: default_kamishibai_bgm_volume(),
            channel_color: default_kamishibai_channel_color(),
        }
    }
}

impl KamishibaiProps {
    /// Accumulated start frame of each slide, in order.
    pub fn slide_starts(&self) -> Vec<FrameIndex> {
        let mut starts = Vec::with_capacity(self.slides.len());
        let mut at = 0u64;
        for slide in &self.slides {
            starts.push(FrameIndex(at));
            at += slide.duration_frames;
        }
        starts
    }

    pub fn validate(&self) -> KawaraResult<()> {
        if self.slides.is_empty() {
            return Err(KawaraError::validation("kamishibai: no slides"));
        }
        for (i, slide) in self.slides.iter().enumerate() {
            if slide.image_path.is_empty() {
                return Err(KawaraError::validation(format!(
                    "kamishibai.slides[{i}]: empty image_path"
                )));
            }
            if slide.audio_path.is_empty() {
                return Err(KawaraError::validation(format!(
                    "kamishibai.slides[{i}]: empty audio_path"
                )));
            }
            if slide.duration_frames == 0 {
                return Err(KawaraError::validation(format!(
                    "kamishibai.slides[{i}]: duration_frames must be > 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.bgm_volume) {
            return Err(KawaraError::validation("kamishibai: bgm_volume outside 0..=1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::script::Speaker;

    fn minimal_news() -> NewsShowProps {
        NewsShowProps {
            title: "年金制度の話".to_owned(),
            audio_path: "ep1.wav".to_owned(),
            background_image: "bg.png".to_owned(),
            script: vec![ScriptLine {
                speaker: Speaker::Katsumi,
                text: "こんにちは".to_owned(),
                emotion: String::new(),
                start_frame: FrameIndex(0),
                end_frame: FrameIndex(100),
                section: None,
            }],
            ..NewsShowProps::default()
        }
    }

    #[test]
    fn kind_tag_roundtrips_through_json() {
        let show = Show::new(13139, ShowKind::NewsShow(minimal_news()));
        let json = serde_json::to_string(&show).unwrap();
        assert!(json.contains("\"kind\":\"news_show\""));

        let back: Show = serde_json::from_str(&json).unwrap();
        assert_eq!(back, show);
        assert_eq!(back.fps, Fps::default());
        assert_eq!(back.canvas, Canvas::full_hd());
    }

    #[test]
    fn missing_defaults_fill_in() {
        let json = r#"{
            "duration_in_frames": 480,
            "kind": "consultation_opening",
            "consultation_text": "年金だけでは暮らせません。どうすれば良いでしょうか。",
            "consultation_title": "今日のお悩み"
        }"#;
        let show: Show = serde_json::from_str(json).unwrap();
        show.validate().unwrap();
        let ShowKind::ConsultationOpening(props) = &show.kind else {
            panic!("wrong kind");
        };
        assert_eq!(props.color_scheme, ColorScheme::Nenkin);
        assert!(props.audio_path.is_none());
    }

    #[test]
    fn effective_slide_duration_needs_an_opening() {
        let mut props = minimal_news();
        assert_eq!(props.effective_slide_duration(), 0);

        props.quote = Some("道はいつも開かれている".to_owned());
        assert_eq!(props.effective_slide_duration(), 168);

        props.quote = None;
        props.slide_image = Some("thumb.png".to_owned());
        assert_eq!(props.effective_slide_duration(), 168);
    }

    #[test]
    fn validation_rejects_unsorted_chart_triggers() {
        use crate::overlay::chart::{ChartKind, ChartSpec};

        let spec = |label: &str| ChartSpec {
            kind: ChartKind::Number,
            label: label.to_owned(),
            value: 1.0,
            unit: String::new(),
            max_value: None,
            compare_value: None,
            compare_label: None,
            items: Vec::new(),
            subtitle: None,
            negative: false,
        };
        let mut props = minimal_news();
        props.chart_data = vec![
            ChartTrigger {
                trigger_frame: FrameIndex(500),
                data: spec("a"),
            },
            ChartTrigger {
                trigger_frame: FrameIndex(300),
                data: spec("b"),
            },
        ];
        let err = props.validate().unwrap_err();
        assert!(err.to_string().contains("chart_data[1]"));
    }

    #[test]
    fn validation_rejects_negative_budget_amounts() {
        let mut props = minimal_news();
        props.household_budget = Some(HouseholdBudgetData {
            person_label: "73歳女性".to_owned(),
            income: 130000,
            expenses: vec![BudgetEntry {
                label: "家賃".to_owned(),
                amount: -40000,
            }],
        });
        assert!(props.validate().is_err());
    }

    #[test]
    fn budget_remaining_goes_negative() {
        let data = HouseholdBudgetData {
            person_label: "73歳女性".to_owned(),
            income: 130000,
            expenses: vec![
                BudgetEntry {
                    label: "家賃".to_owned(),
                    amount: 60000,
                },
                BudgetEntry {
                    label: "食費".to_owned(),
                    amount: 85000,
                },
            ],
        };
        assert_eq!(data.remaining(), -15000);
    }

    #[test]
    fn kamishibai_slide_starts_accumulate() {
        let slide = |frames: u64| KamishibaiSlide {
            image_path: "s.png".to_owned(),
            audio_path: "s.wav".to_owned(),
            duration_frames: frames,
            subtitle: String::new(),
            tag: String::new(),
        };
        let props = KamishibaiProps {
            slides: vec![slide(100), slide(80), slide(120)],
            ..KamishibaiProps::default()
        };
        assert_eq!(
            props.slide_starts(),
            vec![FrameIndex(0), FrameIndex(100), FrameIndex(180)]
        );
        props.validate().unwrap();
    }

    #[test]
    fn show_level_checks_come_first() {
        let show = Show {
            duration_in_frames: 0,
            ..Show::new(1, ShowKind::NewsShow(minimal_news()))
        };
        let err = show.validate().unwrap_err();
        assert!(err.to_string().contains("duration_in_frames"));
    }
}
