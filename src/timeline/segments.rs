use crate::foundation::core::FrameIndex;

/// Frame counts steering the show's fixed transitions. All values are in
/// frames at the show's fps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SceneTimingConfig {
    /// Frames reserved for the opening slide. Zero when the show opens cold.
    #[serde(default = "default_slide_duration")]
    pub slide_duration: u64,
    /// Frames before the back-room start at which the fade to black begins.
    #[serde(default = "default_fade_out_lead")]
    pub fade_out_lead: u64,
    /// Frames before the back-room start at which the screen is fully black.
    #[serde(default = "default_blackout_lead")]
    pub blackout_lead: u64,
    /// Frames before the back-room start at which the location label appears.
    #[serde(default = "default_label_lead")]
    pub label_lead: u64,
    /// Frames after the back-room start for which the label lingers.
    #[serde(default = "default_label_tail")]
    pub label_tail: u64,
}

fn default_slide_duration() -> u64 {
    168
}

fn default_fade_out_lead() -> u64 {
    192
}

fn default_blackout_lead() -> u64 {
    132
}

fn default_label_lead() -> u64 {
    60
}

fn default_label_tail() -> u64 {
    60
}

impl Default for SceneTimingConfig {
    fn default() -> Self {
        Self {
            slide_duration: default_slide_duration(),
            fade_out_lead: default_fade_out_lead(),
            blackout_lead: default_blackout_lead(),
            label_lead: default_label_lead(),
            label_tail: default_label_tail(),
        }
    }
}

/// Exclusive phase of the main show at a given frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Opening slide covers the screen.
    OpeningSlide,
    /// Regular talk body.
    Main,
    /// Talk body with the darkening overlay ramping in.
    FadeToBlack,
    /// Fully black screen before the location label.
    Blackout,
    /// "控 室 に て" label window, black before the back-room start and over
    /// the back-room set after it.
    BackRoomLabel,
    /// Back-room talk.
    BackRoom,
}

impl SceneTimingConfig {
    /// Copy of the config with the opening slide disabled.
    pub fn without_opening(mut self) -> Self {
        self.slide_duration = 0;
        self
    }

    /// Phase active at `frame`. The transition windows are anchored to
    /// `back_room_start` and may reach below frame zero for early starts, in
    /// which case the leading windows are simply cut short.
    pub fn segment_at(&self, frame: FrameIndex, back_room_start: Option<FrameIndex>) -> Segment {
        if frame.0 < self.slide_duration {
            return Segment::OpeningSlide;
        }
        let f = frame.0 as i64;
        if let Some(start) = back_room_start {
            let start = start.0 as i64;
            let fade_from = start - self.fade_out_lead as i64;
            let blackout_from = start - self.blackout_lead as i64;
            let label_from = start - self.label_lead as i64;
            let label_to = start + self.label_tail as i64;
            if f >= label_to {
                return Segment::BackRoom;
            }
            if f >= label_from {
                return Segment::BackRoomLabel;
            }
            if f >= blackout_from {
                return Segment::Blackout;
            }
            if f >= fade_from {
                return Segment::FadeToBlack;
            }
        }
        Segment::Main
    }
}
