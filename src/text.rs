//! Byte-level UTF-8 helpers used by the typesetter.
//!
//! Text is split into "characters" by lead bytes: every byte that is not a
//! continuation byte (`10xxxxxx`) starts a new unit. This keeps the splitter
//! total over arbitrary input, which matters because the caller may hand us
//! text that was unescaped byte by byte.

/// Whether `byte` starts a UTF-8 sequence.
pub const fn is_lead_byte(byte: u8) -> bool {
    (byte & 0xc0) != 0x80
}

/// Number of user-visible characters in `text`.
pub const fn u8_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut len = 0;
    let mut i = 0;

    while i < bytes.len() {
        if is_lead_byte(bytes[i]) {
            len += 1;
        }
        i += 1;
    }

    len
}

const _: () = assert!(u8_len("abあいう漢字") == 7);
const _: () = assert!(u8_len("𠮷") == 1);
const _: () = assert!(u8_len("😃😃") == 2);

/// Splits `text` into character units. Concatenating the result yields `text`.
pub fn split_chars(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut chars = Vec::with_capacity(bytes.len());
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate().skip(1) {
        if is_lead_byte(byte) {
            chars.push(&text[start..i]);
            start = i;
        }
    }

    if start < bytes.len() {
        chars.push(&text[start..]);
    }

    chars
}

/// Sequence length announced by a lead byte, or `None` for a byte no
/// standard mask recognises (a stray continuation byte, `0xfe`, `0xff`).
pub const fn sequence_len(lead: u8) -> Option<usize> {
    if lead & 0x80 == 0 {
        Some(1)
    } else if lead & 0xe0 == 0xc0 {
        Some(2)
    } else if lead & 0xf0 == 0xe0 {
        Some(3)
    } else if lead & 0xf8 == 0xf0 {
        Some(4)
    } else if lead & 0xfc == 0xf8 {
        Some(5)
    } else if lead & 0xfe == 0xfc {
        Some(6)
    } else {
        None
    }
}

/// Decodes the code point at the front of `bytes`, returning it with the
/// number of bytes consumed.
///
/// Five- and six-byte forms are recognised for length but cannot be decoded;
/// they report `None` just like a malformed lead byte, so callers scanning a
/// string stop instead of looping.
pub fn decode_first(bytes: &[u8]) -> Option<(u32, usize)> {
    let lead = *bytes.first()?;
    let len = sequence_len(lead)?;

    if bytes.len() < len {
        return None;
    }

    let cont = |i: usize| (bytes[i] & 0x3f) as u32;

    let code = match len {
        1 => lead as u32,
        2 => ((lead & 0x1f) as u32) << 6 | cont(1),
        3 => ((lead & 0x0f) as u32) << 12 | cont(1) << 6 | cont(2),
        4 => ((lead & 0x07) as u32) << 18 | cont(1) << 12 | cont(2) << 6 | cont(3),
        _ => return None,
    };

    Some((code, len))
}

/// Iterator over the code points of a byte string that stops at the first
/// undecodable sequence.
pub struct CodePoints<'a> {
    bytes: &'a [u8],
    malformed: bool,
}

impl<'a> CodePoints<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            malformed: false,
        }
    }

    /// Whether iteration ended on a malformed sequence rather than the end of input.
    pub fn hit_malformed(&self) -> bool {
        self.malformed
    }
}

impl Iterator for CodePoints<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.bytes.is_empty() || self.malformed {
            return None;
        }

        match decode_first(self.bytes) {
            Some((code, len)) => {
                self.bytes = &self.bytes[len..];
                Some(code)
            }
            None => {
                self.malformed = true;
                None
            }
        }
    }
}

/// Splits text into rows on line breaks, normalising `\r\n` and `\r` first.
/// A trailing newline produces a trailing empty row.
pub fn split_rows(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    normalized.split('\n').map(str::to_owned).collect()
}

/// Removes every space, ideographic space, tab, CR and LF.
pub fn strip_whitespace(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '\u{3000}' | '\t' | '\r' | '\n'))
        .collect()
}

/// Escapes tab, newline, carriage return, form feed and backslash.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }

    out
}

/// Reverses [`escape`]. Unknown escapes keep the escaped character and a
/// lone trailing backslash is kept literally.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// Tabs are typeset as three spaces.
pub fn expand_tabs(text: &str) -> String {
    text.replace('\t', "   ")
}
