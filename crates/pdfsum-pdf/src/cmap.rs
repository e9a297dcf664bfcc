//! ToUnicode CMap parsing: the `bfchar` and `bfrange` sections that map
//! character codes to Unicode text.

use std::collections::HashMap;

/// Code-to-Unicode table read from a font's `/ToUnicode` stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToUnicode {
    /// Bytes per character code, taken from the first mapping's source code.
    code_width: usize,
    chars: HashMap<u32, String>,
    ranges: Vec<CodeRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CodeRange {
    low: u32,
    high: u32,
    target: RangeTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RangeTarget {
    /// `<lo> <hi> <dst>`: the last UTF-16 unit of `dst` is offset by `code - lo`.
    Offset(Vec<u16>),
    /// `<lo> <hi> [<d0> <d1> ...]`: one destination per code.
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Word(String),
}

#[derive(Clone, Copy)]
enum Section {
    None,
    Char,
    Range,
}

impl ToUnicode {
    /// Parse a (decompressed) CMap stream. Sections other than `bfchar` and
    /// `bfrange` are ignored, as are malformed entries.
    pub fn parse(data: &[u8]) -> Self {
        let mut cmap = ToUnicode::default();
        let mut tokens = tokenize(data).into_iter().peekable();
        let mut section = Section::None;

        while let Some(token) = tokens.next() {
            match (&token, section) {
                (Token::Word(w), _) if w == "beginbfchar" => section = Section::Char,
                (Token::Word(w), _) if w == "beginbfrange" => section = Section::Range,
                (Token::Word(w), _) if w == "endbfchar" || w == "endbfrange" => {
                    section = Section::None
                }
                (Token::Hex(src), Section::Char) => {
                    if let Some(Token::Hex(dst)) = tokens.next() {
                        cmap.note_width(src);
                        cmap.chars.insert(code_of(src), utf16_text(&dst));
                    }
                }
                (Token::Hex(low), Section::Range) => {
                    let Some(Token::Hex(high)) = tokens.next() else {
                        continue;
                    };
                    let target = match tokens.next() {
                        Some(Token::Hex(dst)) => RangeTarget::Offset(utf16_units(&dst)),
                        Some(Token::ArrayStart) => {
                            let mut list = Vec::new();
                            while let Some(Token::Hex(dst)) =
                                tokens.next_if(|t| matches!(t, Token::Hex(_)))
                            {
                                list.push(utf16_text(&dst));
                            }
                            let _ = tokens.next_if_eq(&Token::ArrayEnd);
                            RangeTarget::List(list)
                        }
                        _ => continue,
                    };
                    cmap.note_width(low);
                    cmap.ranges.push(CodeRange {
                        low: code_of(low),
                        high: code_of(&high),
                        target,
                    });
                }
                _ => {}
            }
        }
        cmap
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty() && self.ranges.is_empty()
    }

    /// Bytes per character code; 1 when no mapping has been read.
    pub fn code_width(&self) -> usize {
        self.code_width.max(1)
    }

    /// Unicode text for one character code.
    pub fn lookup(&self, code: u32) -> Option<String> {
        if let Some(text) = self.chars.get(&code) {
            return Some(text.clone());
        }
        let range = self.ranges.iter().find(|r| r.low <= code && code <= r.high)?;
        let index = code - range.low;
        match &range.target {
            RangeTarget::Offset(units) => {
                let mut units = units.clone();
                let last = units.last_mut()?;
                *last = last.wrapping_add(u16::try_from(index).ok()?);
                Some(String::from_utf16_lossy(&units))
            }
            RangeTarget::List(list) => list.get(usize::try_from(index).ok()?).cloned(),
        }
    }

    fn note_width(&mut self, src: &[u8]) {
        if self.code_width == 0 && !src.is_empty() {
            self.code_width = src.len().min(4);
        }
    }
}

/// Big-endian integer value of a hex code (at most 4 bytes).
pub(crate) fn code_of(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

fn utf16_text(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            // Dictionary delimiters, not hex strings
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let end = data[i..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(data.len(), |p| i + p);
                tokens.push(Token::Hex(hex_bytes(&data[i + 1..end])));
                i = end + 1;
            }
            b'(' => {
                let mut depth = 0usize;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < data.len()
                    && !data[i].is_ascii_whitespace()
                    && !b"<>[]()%".contains(&data[i])
                {
                    i += 1;
                }
                if i == start {
                    i += 1;
                    continue;
                }
                tokens.push(Token::Word(String::from_utf8_lossy(&data[start..i]).into_owned()));
            }
        }
    }
    tokens
}

/// Hex digits to bytes; whitespace is skipped and an odd trailing digit is
/// padded with 0.
fn hex_bytes(hex: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = hex
        .iter()
        .filter_map(|&c| (c as char).to_digit(16))
        .map(|d| d as u8)
        .collect();
    digits
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => (hi << 4) | lo,
            [hi] => hi << 4,
            _ => 0,
        })
        .collect()
}
