//! Half-width to full-width remapping applied before vertical layout.

/// A pure text transform applied to a column before it is fitted.
pub trait TextNormalizer {
    fn normalize(&self, text: &str) -> String;
}

impl<F: Fn(&str) -> String> TextNormalizer for F {
    fn normalize(&self, text: &str) -> String {
        self(text)
    }
}

/// Leaves text untouched; used for faces without CJK coverage.
pub struct Identity;

impl TextNormalizer for Identity {
    fn normalize(&self, text: &str) -> String {
        text.to_owned()
    }
}

/// Table-driven full-width mapping: printable ASCII to the Fullwidth Forms
/// block and half-width katakana (with voicing marks folded in) to their
/// full-width counterparts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fullwidth;

// U+FF61..=U+FF9F in order.
const HALFWIDTH_KATAKANA: [char; 63] = [
    '。', '「', '」', '、', '・', 'ヲ', 'ァ', 'ィ', 'ゥ', 'ェ', 'ォ', 'ャ', 'ュ', 'ョ', 'ッ', 'ー',
    'ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク', 'ケ', 'コ', 'サ', 'シ', 'ス', 'セ', 'ソ', 'タ',
    'チ', 'ツ', 'テ', 'ト', 'ナ', 'ニ', 'ヌ', 'ネ', 'ノ', 'ハ', 'ヒ', 'フ', 'ヘ', 'ホ', 'マ', 'ミ',
    'ム', 'メ', 'モ', 'ヤ', 'ユ', 'ヨ', 'ラ', 'リ', 'ル', 'レ', 'ロ', 'ワ', 'ン', '゛', '゜',
];

const HALFWIDTH_VOICED_MARK: char = '\u{ff9e}';
const HALFWIDTH_SEMI_VOICED_MARK: char = '\u{ff9f}';

fn voiced(kana: char) -> Option<char> {
    match kana {
        'ウ' => Some('ヴ'),
        // Each of these is followed directly by its voiced form.
        'カ' | 'キ' | 'ク' | 'ケ' | 'コ' | 'サ' | 'シ' | 'ス' | 'セ' | 'ソ' | 'タ' | 'チ' | 'ツ'
        | 'テ' | 'ト' | 'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => char::from_u32(kana as u32 + 1),
        _ => None,
    }
}

fn semi_voiced(kana: char) -> Option<char> {
    match kana {
        'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => char::from_u32(kana as u32 + 2),
        _ => None,
    }
}

fn widen(c: char) -> char {
    match c {
        '!'..='~' => char::from_u32(c as u32 - 0x21 + 0xff01).unwrap_or(c),
        '\u{ff61}'..='\u{ff9f}' => HALFWIDTH_KATAKANA[(c as u32 - 0xff61) as usize],
        _ => c,
    }
}

impl TextNormalizer for Fullwidth {
    fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 3);
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            let wide = widen(c);
            let folded = match chars.peek() {
                Some(&HALFWIDTH_VOICED_MARK) if c != HALFWIDTH_VOICED_MARK => voiced(wide),
                Some(&HALFWIDTH_SEMI_VOICED_MARK) if c != HALFWIDTH_SEMI_VOICED_MARK => {
                    semi_voiced(wide)
                }
                _ => None,
            };

            match folded {
                Some(folded) => {
                    out.push(folded);
                    chars.next();
                }
                None => out.push(wide),
            }
        }

        out
    }
}

const SPACE_PLACEHOLDER: char = '\u{e001}';
const IDEOGRAPHIC_SPACE_PLACEHOLDER: char = '\u{e002}';

/// Runs `normalizer` with both kinds of space parked on private-use code
/// points, so the transform cannot widen or drop them.
pub fn normalize_preserving_spaces(text: &str, normalizer: &dyn TextNormalizer) -> String {
    let parked: String = text
        .chars()
        .map(|c| match c {
            ' ' => SPACE_PLACEHOLDER,
            '\u{3000}' => IDEOGRAPHIC_SPACE_PLACEHOLDER,
            c => c,
        })
        .collect();

    normalizer
        .normalize(&parked)
        .chars()
        .map(|c| match c {
            SPACE_PLACEHOLDER => ' ',
            IDEOGRAPHIC_SPACE_PLACEHOLDER => '\u{3000}',
            c => c,
        })
        .collect()
}
