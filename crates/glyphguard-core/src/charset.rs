//! 受限码点集合（双向控制字符、零宽字符、BOM）
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::GlyphError;

/// 闭区间码点范围 `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodepointRange {
    start: u32,
    end: u32,
}

/// 内置受限范围
const DEFAULT_RANGES: &[CodepointRange] = &[
    // ZWSP、ZWNJ、ZWJ、LRM、RLM
    CodepointRange::new_unchecked(0x200B, 0x200F),
    // LRE、RLE、PDF、LRO、RLO
    CodepointRange::new_unchecked(0x202A, 0x202E),
    // WORD JOINER 与不可见运算符
    CodepointRange::new_unchecked(0x2060, 0x2064),
    // LRI、RLI、FSI、PDI
    CodepointRange::new_unchecked(0x2066, 0x2069),
    // BOM / ZWNBSP
    CodepointRange::new_unchecked(0xFEFF, 0xFEFF),
];

impl CodepointRange {
    const fn new_unchecked(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// 构造范围；`end < start` 视为非法
    pub fn new(start: char, end: char) -> Result<Self, GlyphError> {
        if end < start {
            return Err(GlyphError::InvalidCodepoint {
                input: format!("{}..{}", format_codepoint(start), format_codepoint(end)),
                reason: "range end precedes range start".to_string(),
            });
        }
        Ok(Self { start: start as u32, end: end as u32 })
    }

    pub fn single(ch: char) -> Self {
        Self { start: ch as u32, end: ch as u32 }
    }

    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        let cp = ch as u32;
        self.start <= cp && cp <= self.end
    }
}

impl FromStr for CodepointRange {
    type Err = GlyphError;

    /// 支持 `U+202A..U+202E` 与单个 `U+FEFF` 两种写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("..") {
            Some((lo, hi)) => Self::new(parse_codepoint(lo)?, parse_codepoint(hi)?),
            None => Ok(Self::single(parse_codepoint(s)?)),
        }
    }
}

impl fmt::Display for CodepointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "U+{:04X}", self.start)
        } else {
            write!(f, "U+{:04X}..U+{:04X}", self.start, self.end)
        }
    }
}

/// 解析 `U+202E` / `u+202e` / `0x202E` / `202E` 形式的码点
pub fn parse_codepoint(input: &str) -> Result<char, GlyphError> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("U+")
        .or_else(|| trimmed.strip_prefix("u+"))
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let invalid = |reason: &str| GlyphError::InvalidCodepoint {
        input: input.to_string(),
        reason: reason.to_string(),
    };
    if hex.is_empty() {
        return Err(invalid("empty codepoint"));
    }
    let value = u32::from_str_radix(hex, 16).map_err(|_| invalid("not a hexadecimal number"))?;
    char::from_u32(value).ok_or_else(|| invalid("not a Unicode scalar value"))
}

/// `U+202E` 形式
pub fn format_codepoint(ch: char) -> String {
    format!("U+{:04X}", ch as u32)
}

/// 常见受限码点的可读名称（报告中使用）
pub fn codepoint_name(ch: char) -> Option<&'static str> {
    let name = match ch as u32 {
        0x200B => "ZERO WIDTH SPACE",
        0x200C => "ZERO WIDTH NON-JOINER",
        0x200D => "ZERO WIDTH JOINER",
        0x200E => "LEFT-TO-RIGHT MARK",
        0x200F => "RIGHT-TO-LEFT MARK",
        0x202A => "LEFT-TO-RIGHT EMBEDDING",
        0x202B => "RIGHT-TO-LEFT EMBEDDING",
        0x202C => "POP DIRECTIONAL FORMATTING",
        0x202D => "LEFT-TO-RIGHT OVERRIDE",
        0x202E => "RIGHT-TO-LEFT OVERRIDE",
        0x2060 => "WORD JOINER",
        0x2061 => "FUNCTION APPLICATION",
        0x2062 => "INVISIBLE TIMES",
        0x2063 => "INVISIBLE SEPARATOR",
        0x2064 => "INVISIBLE PLUS",
        0x2066 => "LEFT-TO-RIGHT ISOLATE",
        0x2067 => "RIGHT-TO-LEFT ISOLATE",
        0x2068 => "FIRST STRONG ISOLATE",
        0x2069 => "POP DIRECTIONAL ISOLATE",
        0xFEFF => "ZERO WIDTH NO-BREAK SPACE",
        _ => return None,
    };
    Some(name)
}

/// 受限码点集合（不可变，worker 间只读共享）
///
/// `allowed` 为显式放行的码点，优先于 `ranges`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedCharSet {
    ranges: Vec<CodepointRange>,
    allowed: BTreeSet<char>,
    /// 所有范围中的最小起点，用于快速跳过 ASCII 等普通字符
    floor: u32,
}

impl Default for RestrictedCharSet {
    fn default() -> Self {
        Self::from_ranges(DEFAULT_RANGES.to_vec())
    }
}

impl RestrictedCharSet {
    pub fn from_ranges(mut ranges: Vec<CodepointRange>) -> Self {
        ranges.sort();
        ranges.dedup();
        let floor = ranges.iter().map(|r| r.start).min().unwrap_or(u32::MAX);
        Self { ranges, allowed: BTreeSet::new(), floor }
    }

    /// 放行单个码点（例如文档中合法的 RTL 标记）
    pub fn allow(&mut self, ch: char) {
        self.allowed.insert(ch);
    }

    pub fn ranges(&self) -> &[CodepointRange] {
        &self.ranges
    }

    pub fn allowed(&self) -> impl Iterator<Item = char> + '_ {
        self.allowed.iter().copied()
    }

    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        if (ch as u32) < self.floor {
            return false;
        }
        self.ranges.iter().any(|r| r.contains(ch)) && !self.allowed.contains(&ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_covers_bidi_and_zero_width() {
        let set = RestrictedCharSet::default();
        for ch in ['\u{202E}', '\u{2066}', '\u{2069}', '\u{200B}', '\u{200D}', '\u{FEFF}', '\u{2060}'] {
            assert!(set.contains(ch), "{} should be restricted", format_codepoint(ch));
        }
        for ch in ['a', ' ', '\n', 'é', '中', '\u{2065}', '\u{202F}'] {
            assert!(!set.contains(ch), "{} should be allowed", format_codepoint(ch));
        }
    }

    #[test]
    fn allow_list_overrides_ranges() {
        let mut set = RestrictedCharSet::default();
        set.allow('\u{200F}');
        assert!(!set.contains('\u{200F}'));
        assert!(set.contains('\u{200E}'));
    }

    #[test]
    fn parses_ranges_and_single_codepoints() {
        let r: CodepointRange = "U+202A..U+202E".parse().unwrap();
        assert_eq!(r, CodepointRange::new('\u{202A}', '\u{202E}').unwrap());
        let single: CodepointRange = "0xFEFF".parse().unwrap();
        assert_eq!(single.to_string(), "U+FEFF");
        assert_eq!(r.to_string(), "U+202A..U+202E");
    }

    #[test]
    fn rejects_malformed_codepoints() {
        assert!("U+ZZZZ".parse::<CodepointRange>().is_err());
        assert!("U+202E..U+202A".parse::<CodepointRange>().is_err());
        assert!(parse_codepoint("U+D800").is_err());
        assert!(parse_codepoint("").is_err());
    }

    #[test]
    fn ascii_ranges_still_work_below_default_floor() {
        let set = RestrictedCharSet::from_ranges(vec![CodepointRange::single('\t')]);
        assert!(set.contains('\t'));
        assert!(!set.contains('\u{202E}'));
    }
}
