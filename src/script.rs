use std::ops::RangeInclusive;

use crate::text::CodePoints;

const HIRAGANA_RANGE: RangeInclusive<u32> = 0x3040..=0x309f;
const KATAKANA_RANGE: RangeInclusive<u32> = 0x30a0..=0x30ff;
const KATAKANA_PHONETIC_RANGE: RangeInclusive<u32> = 0x31f0..=0x31ff;
const FULLWIDTH_FORMS_RANGE: RangeInclusive<u32> = 0xff01..=0xff9d;
const KANJI_EXTENDED_A_RANGE: RangeInclusive<u32> = 0x3400..=0x4db5;
const COMMON_KANJI_RANGE: RangeInclusive<u32> = 0x4e00..=0x9fcb;
const KANJI_COMPATIBILITY_RANGE: RangeInclusive<u32> = 0xf900..=0xfa6a;
const CJK_PUNCTUATION_RANGE: RangeInclusive<u32> = 0x3000..=0x303f;

const CJK_RANGE: RangeInclusive<u32> = 0x4e00..=0x9fff;
const CJK_COMPATIBILITY_RANGE: RangeInclusive<u32> = 0xf900..=0xfaff;
const CJK_RADICALS_RANGE: RangeInclusive<u32> = 0x2f00..=0x2fdf;
const CJK_RADICALS_SUPPLEMENT_RANGE: RangeInclusive<u32> = 0x2e80..=0x2eff;

const HAN_RANGES: [RangeInclusive<u32>; 14] = [
    CJK_RANGE,
    CJK_COMPATIBILITY_RANGE,
    CJK_RADICALS_RANGE,
    CJK_RADICALS_SUPPLEMENT_RANGE,
    0x3400..=0x4dbf,   // Extension A
    0x20000..=0x2a6df, // Extension B
    0x2a700..=0x2b73f, // Extension C
    0x2b740..=0x2b81f, // Extension D
    0x2b820..=0x2ceaf, // Extension E
    0x2ceb0..=0x2ebef, // Extension F
    0x30000..=0x3134f, // Extension G
    0x31350..=0x323af, // Extension H
    CJK_PUNCTUATION_RANGE,
    0x2f800..=0x2fa1f, // Compatibility supplement
];

const HANGUL_RANGES: [RangeInclusive<u32>; 6] = [
    0xac00..=0xd7af, // Syllables
    0x1100..=0x11ff, // Jamo
    0x3130..=0x318f, // Compatibility Jamo
    0xa960..=0xa97f, // Jamo Extended-A
    0xd7b0..=0xd7ff, // Jamo Extended-B
    0xffa0..=0xffdf, // Halfwidth Hangul
];

/// How strongly a text belongs to a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Strength {
    #[default]
    None = 0,
    /// Shared CJK evidence only: ideographs, fullwidth forms, CJK punctuation.
    Weak = 1,
    /// Script-specific evidence: kana or Hangul.
    Strong = 2,
}

impl Strength {
    pub fn is_detected(self) -> bool {
        self != Strength::None
    }
}

/// The scripts whose fonts need a coverage check before typesetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Japanese,
    Chinese,
    Korean,
}

impl Script {
    pub const ALL: [Script; 3] = [Script::Japanese, Script::Chinese, Script::Korean];

    /// Glyph whose ink tells us whether a font covers the script.
    pub fn exemplar(self) -> &'static str {
        match self {
            Script::Japanese => "あ",
            Script::Chinese => "沉",
            Script::Korean => "작",
        }
    }

    /// Two full-width glyphs compared against `"wwww"` for pitch detection.
    pub fn pitch_sample(self) -> &'static str {
        match self {
            Script::Japanese => "目目",
            Script::Chinese => "沉沉",
            Script::Korean => "작작",
        }
    }

    /// Page shown instead of the text when the font lacks coverage.
    pub fn missing_font_message(self) -> &'static str {
        match self {
            Script::Japanese => "   Error:   \nNot Japanese font",
            Script::Chinese => "   Error:   \nNot Chinese font",
            Script::Korean => "   Error:   \nNot Korean font",
        }
    }

    pub fn classify(self, text: impl AsRef<[u8]>) -> Strength {
        match self {
            Script::Japanese => japanese_strength(text),
            Script::Chinese => chinese_strength(text),
            Script::Korean => korean_strength(text),
        }
    }
}

/// Scans every code point and keeps the strongest evidence. A malformed
/// sequence discards everything seen so far.
fn scan_max(bytes: &[u8], strength_of: impl Fn(u32) -> Strength) -> Strength {
    let mut points = CodePoints::new(bytes);
    let strength = points.by_ref().map(strength_of).max().unwrap_or_default();

    if points.hit_malformed() {
        return Strength::None;
    }

    strength
}

pub fn japanese_strength(text: impl AsRef<[u8]>) -> Strength {
    scan_max(text.as_ref(), |u| {
        if HIRAGANA_RANGE.contains(&u)
            || KATAKANA_RANGE.contains(&u)
            || KATAKANA_PHONETIC_RANGE.contains(&u)
        {
            Strength::Strong
        } else if FULLWIDTH_FORMS_RANGE.contains(&u)
            || KANJI_EXTENDED_A_RANGE.contains(&u)
            || COMMON_KANJI_RANGE.contains(&u)
            || KANJI_COMPATIBILITY_RANGE.contains(&u)
            || CJK_PUNCTUATION_RANGE.contains(&u)
        {
            Strength::Weak
        } else {
            Strength::None
        }
    })
}

/// Stops at the first Han code point. Chinese has no script-specific block
/// to tell it apart, so the verdict is never stronger than weak.
pub fn chinese_strength(text: impl AsRef<[u8]>) -> Strength {
    for u in CodePoints::new(text.as_ref()) {
        if HAN_RANGES.iter().any(|range| range.contains(&u)) {
            return Strength::Weak;
        }
    }

    Strength::None
}

pub fn korean_strength(text: impl AsRef<[u8]>) -> Strength {
    scan_max(text.as_ref(), |u| {
        if HANGUL_RANGES.iter().any(|range| range.contains(&u)) {
            Strength::Strong
        } else if CJK_RANGE.contains(&u)
            || CJK_COMPATIBILITY_RANGE.contains(&u)
            || CJK_RADICALS_RANGE.contains(&u)
            || CJK_RADICALS_SUPPLEMENT_RANGE.contains(&u)
            || CJK_PUNCTUATION_RANGE.contains(&u)
        {
            Strength::Weak
        } else {
            Strength::None
        }
    })
}

/// First script, in Japanese, Chinese, Korean order, that `text` shows any
/// evidence of.
pub fn detect(text: &str) -> Option<Script> {
    Script::ALL
        .into_iter()
        .find(|script| script.classify(text.as_bytes()).is_detected())
}
