//! Terminal color capability detection

use std::env;

/// Pair budget for terminals that advertise 24-bit color
pub const TRUECOLOR_PAIRS: u32 = 32767;

/// Pair budget for `*-256color` terminals
pub const EXTENDED_PAIRS: u32 = 256;

/// Pair budget for basic 8/16 color terminals
pub const BASIC_PAIRS: u32 = 64;

/// What the terminal can do with color pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCaps {
    /// Number of addressable color pairs, built-in slots included
    pub capacity: u32,
    /// Whether RGB colors can be bound
    pub truecolor: bool,
}

impl Default for TermCaps {
    fn default() -> Self {
        Self {
            capacity: EXTENDED_PAIRS,
            truecolor: false,
        }
    }
}

impl TermCaps {
    /// Detect capabilities from `TERM` and `COLORTERM`
    pub fn from_env() -> Self {
        let term = env::var("TERM").ok();
        let colorterm = env::var("COLORTERM").ok();
        Self::detect(term.as_deref(), colorterm.as_deref())
    }

    pub fn detect(term: Option<&str>, colorterm: Option<&str>) -> Self {
        let term = term.map(str::trim).unwrap_or_default();
        if term.is_empty() || term == "dumb" {
            return Self {
                capacity: 0,
                truecolor: false,
            };
        }

        let colorterm = colorterm.map(str::to_lowercase).unwrap_or_default();
        if colorterm == "truecolor" || colorterm == "24bit" || term.ends_with("-direct") {
            return Self {
                capacity: TRUECOLOR_PAIRS,
                truecolor: true,
            };
        }

        let capacity = if term.contains("256color") {
            EXTENDED_PAIRS
        } else {
            BASIC_PAIRS
        };

        Self {
            capacity,
            truecolor: false,
        }
    }

    /// Apply config overrides on top of detected values
    pub fn with_overrides(self, capacity: Option<u32>, truecolor: Option<bool>) -> Self {
        Self {
            capacity: capacity.unwrap_or(self.capacity),
            truecolor: truecolor.unwrap_or(self.truecolor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_dumb_terminal() {
        assert_eq!(TermCaps::detect(Some("dumb"), None).capacity, 0);
        assert_eq!(TermCaps::detect(None, Some("truecolor")).capacity, 0);
    }

    #[test]
    fn test_detect_truecolor() {
        let caps = TermCaps::detect(Some("xterm-256color"), Some("truecolor"));
        assert_eq!(caps.capacity, TRUECOLOR_PAIRS);
        assert!(caps.truecolor);

        let caps = TermCaps::detect(Some("xterm-direct"), None);
        assert!(caps.truecolor);
    }

    #[test]
    fn test_detect_256color() {
        let caps = TermCaps::detect(Some("screen-256color"), None);
        assert_eq!(caps.capacity, EXTENDED_PAIRS);
        assert!(!caps.truecolor);
    }

    #[test]
    fn test_detect_basic() {
        let caps = TermCaps::detect(Some("xterm"), Some(""));
        assert_eq!(caps.capacity, BASIC_PAIRS);
    }

    #[test]
    fn test_with_overrides() {
        let caps = TermCaps::detect(Some("xterm"), None).with_overrides(Some(18), None);
        assert_eq!(caps.capacity, 18);
        assert!(!caps.truecolor);

        let caps = caps.with_overrides(None, Some(true));
        assert_eq!(caps.capacity, 18);
        assert!(caps.truecolor);
    }
}
