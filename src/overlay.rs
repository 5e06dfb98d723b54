pub mod budget;
pub mod characters;
pub mod chart;
pub mod checklist;
pub mod letter;
pub mod quote;
pub mod sentiment;
pub mod slide;
pub mod subtitle;
pub mod ticker;

/// Advance-width estimate for laying out inline runs next to each other.
/// Fullwidth glyphs advance one em, ASCII roughly half. The host's real
/// text engine owns final metrics; scene boxes only need to be close.
pub(crate) fn approx_text_width(text: &str, font_size: f64) -> f64 {
    let ems: f64 = text
        .chars()
        .map(|c| if c.is_ascii() { 0.55 } else { 1.0 })
        .sum();
    ems * font_size
}
