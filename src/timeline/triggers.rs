use crate::foundation::core::FrameIndex;

/// The state window a trigger list resolves to at one frame: which record is
/// active, when it began, and where the window ends (the next record's
/// trigger, or unbounded for the last record).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveWindow {
    /// Index of the active record in the trigger list.
    pub index: usize,
    /// The active record's trigger frame.
    pub since: FrameIndex,
    /// Exclusive upper bound; `None` means the record stays active forever.
    pub until: Option<FrameIndex>,
}

impl ActiveWindow {
    /// Frames since the window opened, the local animation clock.
    pub fn elapsed(&self, frame: FrameIndex) -> f64 {
        frame.0.saturating_sub(self.since.0) as f64
    }
}

/// Resolves which record of an ascending trigger list is active at `frame`:
/// the last record with `trigger <= frame`. Records sharing a trigger frame
/// resolve to the later list index. Returns `None` before the first trigger
/// or for an empty list.
///
/// The list must already be sorted ascending by trigger frame; resolution is
/// a binary search and never re-sorts.
pub fn resolve_active<T>(
    frame: FrameIndex,
    items: &[T],
    trigger_frame: impl Fn(&T) -> FrameIndex,
) -> Option<ActiveWindow> {
    let idx = items.partition_point(|item| trigger_frame(item).0 <= frame.0);
    if idx == 0 {
        return None;
    }
    let index = idx - 1;
    Some(ActiveWindow {
        index,
        since: trigger_frame(&items[index]),
        until: items.get(idx).map(&trigger_frame),
    })
}
