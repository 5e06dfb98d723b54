//! Keyword sentiment over chart labels.
//!
//! The accent color of a chart panel follows the tone of its label: green
//! for gains, red for cuts, blue otherwise. Rules are ordered first-match
//! with the positive list checked first, so a label naming both a gain and
//! a burden reads as a gain.

use crate::foundation::core::Rgba8;

/// Tone of a chart label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

const POSITIVE_COLOR: Rgba8 = Rgba8::rgb(0x4c, 0xaf, 0x50);
const NEGATIVE_COLOR: Rgba8 = Rgba8::rgb(0xe7, 0x4c, 0x3c);
const NEUTRAL_COLOR: Rgba8 = Rgba8::rgb(0x42, 0xa5, 0xf5);

const POSITIVE_KEYWORDS: &[&str] = &[
    "増額",
    "拡充",
    "支給",
    "もらえ",
    "引き上げ",
    "改善",
    "増加",
    "上昇",
    "プラス",
    "給付",
    "受給",
    "対象拡大",
    "無料",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "減額",
    "廃止",
    "削減",
    "負担",
    "損",
    "値上が",
    "値上げ",
    "縮小",
    "打ち切",
    "引き下げ",
    "マイナス",
    "不足",
    "赤字",
];

/// Classifies a chart label.
pub fn classify_label(label: &str) -> Sentiment {
    if POSITIVE_KEYWORDS.iter().any(|kw| label.contains(kw)) {
        return Sentiment::Positive;
    }
    if NEGATIVE_KEYWORDS.iter().any(|kw| label.contains(kw)) {
        return Sentiment::Negative;
    }
    Sentiment::Neutral
}

/// Accent color for a sentiment.
pub fn sentiment_color(sentiment: Sentiment) -> Rgba8 {
    match sentiment {
        Sentiment::Positive => POSITIVE_COLOR,
        Sentiment::Negative => NEGATIVE_COLOR,
        Sentiment::Neutral => NEUTRAL_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gains_read_positive() {
        assert_eq!(classify_label("年金支給額が増額へ"), Sentiment::Positive);
        assert_eq!(classify_label("対象拡大で無料に"), Sentiment::Positive);
    }

    #[test]
    fn cuts_read_negative() {
        assert_eq!(classify_label("保険料の値上げ"), Sentiment::Negative);
        assert_eq!(classify_label("値上がり続く食品"), Sentiment::Negative);
        assert_eq!(classify_label("老後資金の不足"), Sentiment::Negative);
    }

    #[test]
    fn positive_wins_over_negative() {
        // 負担 alone is negative, but 改善 matches first.
        assert_eq!(classify_label("負担の改善案"), Sentiment::Positive);
        // 廃止 is negative, but 給付 outranks it.
        assert_eq!(classify_label("給付金が廃止"), Sentiment::Positive);
    }

    #[test]
    fn everything_else_is_neutral() {
        assert_eq!(classify_label("平均貯蓄額"), Sentiment::Neutral);
        assert_eq!(classify_label(""), Sentiment::Neutral);
    }

    #[test]
    fn colors_match_the_palette() {
        assert_eq!(sentiment_color(Sentiment::Positive).to_hex(), "#4caf50");
        assert_eq!(sentiment_color(Sentiment::Negative).to_hex(), "#e74c3c");
        assert_eq!(sentiment_color(Sentiment::Neutral).to_hex(), "#42a5f5");
    }
}
