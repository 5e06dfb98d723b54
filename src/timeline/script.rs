use crate::foundation::core::FrameIndex;
use crate::foundation::error::{KawaraError, KawaraResult};
use crate::timeline::triggers::resolve_active;

/// The two cast members of the show. Script JSON carries their on-screen
/// names, so serde maps the Japanese strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Speaker {
    /// カツミ, drawn on the left.
    #[serde(rename = "カツミ")]
    Katsumi,
    /// ヒロシ, drawn on the right.
    #[serde(rename = "ヒロシ")]
    Hiroshi,
}

impl Speaker {
    /// Stem of the character's pose image files (`{base}_{pose}.png`).
    pub fn asset_base(self) -> &'static str {
        match self {
            Speaker::Katsumi => "katsumi",
            Speaker::Hiroshi => "hiroshi",
        }
    }
}

/// Section tag opening the closing back-room talk.
pub const SECTION_BACK_ROOM: &str = "hikaeshitsu";
/// Section tag for the back-room jingle tail.
pub const SECTION_BACK_ROOM_JINGLE: &str = "hikaeshitsu_jingle";
/// Section tag for the regular ending.
pub const SECTION_ENDING: &str = "ending";

/// One subtitle/speech unit, active over the half-open interval
/// `[start_frame, end_frame)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptLine {
    pub speaker: Speaker,
    pub text: String,
    /// Free-form emotion tag; unknown tags fall back to the neutral pose.
    #[serde(default)]
    pub emotion: String,
    pub start_frame: FrameIndex,
    pub end_frame: FrameIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl ScriptLine {
    pub fn contains(&self, frame: FrameIndex) -> bool {
        self.start_frame.0 <= frame.0 && frame.0 < self.end_frame.0
    }

    /// 0..1 progress through the line's interval, clamped.
    pub fn progress(&self, frame: FrameIndex) -> f64 {
        crate::animation::curves::ramp(
            frame.0 as f64,
            self.start_frame.0 as f64,
            self.end_frame.0 as f64,
        )
    }

    fn section_is(&self, tag: &str) -> bool {
        self.section.as_deref() == Some(tag)
    }

    /// Back-room dialogue: black set, yellow subtitles, no characters.
    pub fn is_back_room(&self) -> bool {
        self.section_is(SECTION_BACK_ROOM) || self.section_is(SECTION_BACK_ROOM_JINGLE)
    }

    /// Ending material: the ticker stays hidden from here on.
    pub fn is_ending(&self) -> bool {
        self.is_back_room() || self.section_is(SECTION_ENDING)
    }
}

/// The script line speaking at `frame`, with its index. Lines must be sorted
/// ascending by start frame.
pub fn active_line(script: &[ScriptLine], frame: FrameIndex) -> Option<(usize, &ScriptLine)> {
    let win = resolve_active(frame, script, |line| line.start_frame)?;
    let line = &script[win.index];
    line.contains(frame).then_some((win.index, line))
}

/// Start frame of the back-room talk: the first line tagged
/// [`SECTION_BACK_ROOM`]. `None` when no line carries the tag, in which case
/// the show runs its main body to the end.
pub fn back_room_start(script: &[ScriptLine]) -> Option<FrameIndex> {
    script
        .iter()
        .find(|line| line.section_is(SECTION_BACK_ROOM))
        .map(|line| line.start_frame)
}

/// Fail-fast structural checks: non-empty intervals, ascending starts, no
/// overlap between consecutive lines.
pub fn validate_script(script: &[ScriptLine]) -> KawaraResult<()> {
    for (i, line) in script.iter().enumerate() {
        if line.start_frame.0 >= line.end_frame.0 {
            return Err(KawaraError::validation(format!(
                "script[{i}]: start_frame {} must be < end_frame {}",
                line.start_frame.0, line.end_frame.0
            )));
        }
        if line.text.is_empty() {
            return Err(KawaraError::validation(format!("script[{i}]: empty text")));
        }
    }
    for (i, pair) in script.windows(2).enumerate() {
        if pair[1].start_frame.0 < pair[0].start_frame.0 {
            return Err(KawaraError::validation(format!(
                "script[{}] starts at {} before script[{i}] at {}",
                i + 1,
                pair[1].start_frame.0,
                pair[0].start_frame.0
            )));
        }
        if pair[1].start_frame.0 < pair[0].end_frame.0 {
            return Err(KawaraError::validation(format!(
                "script[{}] overlaps script[{i}] (starts at {} before end {})",
                i + 1,
                pair[1].start_frame.0,
                pair[0].end_frame.0
            )));
        }
    }
    Ok(())
}
