//! Sizes in megabytes
//!
//! The simulator counts capacity in abstract units; the front end treats one
//! unit as a megabyte and accepts `GB` as 1024 of them.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Megabytes per gigabyte
pub const MB_PER_GB: usize = 1024;

/// Error from parsing a size
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    #[error("malformed size '{0}', expected e.g. 100, 100MB or 2GB")]
    Malformed(String),
    #[error("size must be positive")]
    Zero,
    #[error("size '{0}' is too large")]
    Overflow(String),
}

/// Named object sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Small,
    Medium,
    Large,
    Huge,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Small, Preset::Medium, Preset::Large, Preset::Huge];

    /// Size in megabytes
    pub const fn size(self) -> usize {
        match self {
            Preset::Small => 10,
            Preset::Medium => 100,
            Preset::Large => 500,
            Preset::Huge => MB_PER_GB,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Preset::Small => "small",
            Preset::Medium => "medium",
            Preset::Large => "large",
            Preset::Huge => "huge",
        }
    }
}

impl FromStr for Preset {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SizeError::Malformed(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), format_size(self.size()))
    }
}

fn size_regex() -> &'static Regex {
    static SIZE_RE: OnceLock<Regex> = OnceLock::new();
    SIZE_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([0-9]+)\s*(mb|m|gb|g)?\s*$").expect("size pattern is valid")
    })
}

/// Parse a size such as `100`, `100MB`, `2 gb` or a preset name
///
/// Bare numbers are megabytes.
pub fn parse_size(input: &str) -> Result<usize, SizeError> {
    if let Ok(preset) = input.parse::<Preset>() {
        return Ok(preset.size());
    }

    let caps = size_regex()
        .captures(input)
        .ok_or_else(|| SizeError::Malformed(input.trim().to_string()))?;

    let value: usize = caps[1]
        .parse()
        .map_err(|_| SizeError::Overflow(input.trim().to_string()))?;
    let scale = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(unit) if unit.starts_with('g') => MB_PER_GB,
        _ => 1,
    };

    let size = value
        .checked_mul(scale)
        .ok_or_else(|| SizeError::Overflow(input.trim().to_string()))?;
    if size == 0 {
        return Err(SizeError::Zero);
    }
    Ok(size)
}

/// Format megabytes the way the memory panel shows them
///
/// Below one gigabyte: `"512 MB"`, otherwise `"1.5 GB"`.
pub fn format_size(mb: usize) -> String {
    if mb >= MB_PER_GB {
        format!("{:.1} GB", mb as f64 / MB_PER_GB as f64)
    } else {
        format!("{} MB", mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_units() {
        assert_eq!(parse_size("100"), Ok(100));
        assert_eq!(parse_size("100MB"), Ok(100));
        assert_eq!(parse_size(" 100 mb "), Ok(100));
        assert_eq!(parse_size("2GB"), Ok(2048));
        assert_eq!(parse_size("1 g"), Ok(1024));
    }

    #[test]
    fn test_parse_presets() {
        assert_eq!(parse_size("small"), Ok(10));
        assert_eq!(parse_size("Medium"), Ok(100));
        assert_eq!(parse_size("LARGE"), Ok(500));
        assert_eq!(parse_size("huge"), Ok(1024));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_size("0"), Err(SizeError::Zero));
        assert_eq!(parse_size("0GB"), Err(SizeError::Zero));
        assert!(matches!(parse_size("-5"), Err(SizeError::Malformed(_))));
        assert!(matches!(parse_size("10 TB"), Err(SizeError::Malformed(_))));
        assert!(matches!(parse_size(""), Err(SizeError::Malformed(_))));
        // non-ASCII digits are not sizes
        assert!(matches!(parse_size("\u{663}"), Err(SizeError::Malformed(_))));
        assert!(matches!(parse_size("\u{663}GB"), Err(SizeError::Malformed(_))));
        assert!(matches!(
            parse_size("99999999999999999999999"),
            Err(SizeError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 MB");
        assert_eq!(format_size(1023), "1023 MB");
        assert_eq!(format_size(1024), "1.0 GB");
        assert_eq!(format_size(1536), "1.5 GB");
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::Small.to_string(), "small (10 MB)");
        assert_eq!(Preset::Huge.to_string(), "huge (1.0 GB)");
    }
}
