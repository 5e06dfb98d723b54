use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8};
use crate::foundation::error::KawaraResult;
use crate::overlay::chart::{ChartSpec, ChartTrigger};
use crate::overlay::subtitle::SubtitleStyle;
use crate::show::props::{
    ChecklistData, HouseholdBudgetData, LayoutPattern, ListenerLetterData, NewsShowProps, Show,
    ShowKind,
};
use crate::timeline::script::{ScriptLine, Speaker};
use crate::timeline::segments::SceneTimingConfig;

/// Chainable construction of a news show, ending in full validation. Tests
/// and demos use this; production inputs arrive as JSON.
pub struct ShowBuilder {
    fps: Fps,
    canvas: Canvas,
    duration: u64,
    props: NewsShowProps,
}

impl ShowBuilder {
    pub fn news(title: impl Into<String>, duration_in_frames: u64) -> Self {
        Self {
            fps: Fps::default(),
            canvas: Canvas::default(),
            duration: duration_in_frames,
            props: NewsShowProps {
                title: title.into(),
                ..NewsShowProps::default()
            },
        }
    }

    pub fn fps(mut self, fps: Fps) -> Self {
        self.fps = fps;
        self
    }

    pub fn canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn channel(mut self, name: impl Into<String>, color: Rgba8) -> Self {
        self.props.channel_name = name.into();
        self.props.channel_color = color;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.props.source = source.into();
        self
    }

    pub fn narration(mut self, path: impl Into<String>) -> Self {
        self.props.audio_path = path.into();
        self
    }

    pub fn background(mut self, path: impl Into<String>) -> Self {
        self.props.background_image = path.into();
        self
    }

    pub fn key_point(mut self, text: impl Into<String>) -> Self {
        self.props.key_points.push(text.into());
        self
    }

    /// Replaces the derived ticker run with explicit texts.
    pub fn ticker(mut self, texts: Vec<String>) -> Self {
        self.props.ticker = Some(texts);
        self
    }

    pub fn subtitle_style(mut self, style: SubtitleStyle) -> Self {
        self.props.subtitle_style = style;
        self
    }

    pub fn subtitle_color(mut self, color: Rgba8) -> Self {
        self.props.subtitle_color = Some(color);
        self
    }

    /// Appends a line with the neutral emotion and no section tag.
    pub fn line(self, speaker: Speaker, text: impl Into<String>, start: u64, end: u64) -> Self {
        self.script_line(ScriptLine {
            speaker,
            text: text.into(),
            emotion: String::new(),
            start_frame: FrameIndex(start),
            end_frame: FrameIndex(end),
            section: None,
        })
    }

    pub fn script_line(mut self, line: ScriptLine) -> Self {
        self.props.script.push(line);
        self
    }

    pub fn chart(mut self, trigger_frame: u64, spec: ChartSpec) -> Self {
        self.props.chart_data.push(ChartTrigger {
            trigger_frame: FrameIndex(trigger_frame),
            data: spec,
        });
        self
    }

    pub fn quote(mut self, text: impl Into<String>) -> Self {
        self.props.quote = Some(text.into());
        self
    }

    pub fn title_slide(mut self, image: impl Into<String>, jingle: Option<String>) -> Self {
        self.props.slide_image = Some(image.into());
        self.props.slide_jingle = jingle;
        self
    }

    pub fn back_room_jingle(mut self, path: impl Into<String>) -> Self {
        self.props.back_room_jingle = Some(path.into());
        self
    }

    /// Documentary layout with its budget panel, set together so the pattern
    /// never points at missing data.
    pub fn layout_documentary(mut self, data: HouseholdBudgetData) -> Self {
        self.props.layout_pattern = Some(LayoutPattern::Documentary);
        self.props.household_budget = Some(data);
        self
    }

    pub fn layout_checklist(mut self, data: ChecklistData) -> Self {
        self.props.layout_pattern = Some(LayoutPattern::Checklist);
        self.props.checklist = Some(data);
        self
    }

    pub fn layout_radio(mut self, data: ListenerLetterData) -> Self {
        self.props.layout_pattern = Some(LayoutPattern::Radio);
        self.props.listener_letter = Some(data);
        self
    }

    pub fn timing(mut self, timing: SceneTimingConfig) -> Self {
        self.props.timing = timing;
        self
    }

    pub fn build(self) -> KawaraResult<Show> {
        let show = Show {
            fps: self.fps,
            canvas: self.canvas,
            duration_in_frames: self.duration,
            kind: ShowKind::NewsShow(self.props),
        };
        show.validate()?;
        Ok(show)
    }
}
