//! Color values and color pair keys
//!
//! A [`ColorKey`] is what callers ask the allocator for: a foreground and a
//! background, each of which may be a concrete color or one of two sentinels.
//!
//! # Color syntax
//!
//! - Hex colors: `#RRGGBB` or `#RGB`
//! - Named colors: `red`, `light_blue`, `dark_gray`, ...
//! - 256-color index: `0` to `255`
//! - `reset`: the concrete reset color
//! - `default`: inherit the terminal default
//! - `unset` / `none` / empty: not specified

use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;

/// One side (foreground or background) of a color pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorValue {
    /// Not specified
    #[default]
    Unset,
    /// Inherit the terminal's default color
    Default,
    /// A concrete color
    Color(Color),
}

impl ColorValue {
    /// Translate the value into what a binder expects.
    ///
    /// `Default` becomes [`Color::Reset`], the binder's inherit sentinel.
    /// `Unset` and concrete colors pass through.
    pub fn normalized(self) -> Self {
        match self {
            ColorValue::Default => ColorValue::Color(Color::Reset),
            other => other,
        }
    }

    pub fn is_unset(self) -> bool {
        self == ColorValue::Unset
    }

    /// The concrete color, if any
    pub fn color(self) -> Option<Color> {
        match self {
            ColorValue::Color(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Color> for ColorValue {
    fn from(color: Color) -> Self {
        ColorValue::Color(color)
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::Unset => write!(f, "unset"),
            ColorValue::Default => write!(f, "default"),
            ColorValue::Color(c) => write!(f, "{}", color_name(*c)),
        }
    }
}

impl FromStr for ColorValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color_value(s).ok_or_else(|| format!("invalid color: {:?}", s.trim()))
    }
}

/// Foreground/background pair used as the allocation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorKey {
    pub fg: ColorValue,
    pub bg: ColorValue,
}

impl ColorKey {
    pub fn new(fg: impl Into<ColorValue>, bg: impl Into<ColorValue>) -> Self {
        Self {
            fg: fg.into(),
            bg: bg.into(),
        }
    }

    /// Whether this key means "no color configured".
    ///
    /// Both sides unset, or both sides default, never get a slot.
    pub fn is_no_color(&self) -> bool {
        matches!(
            (self.fg, self.bg),
            (ColorValue::Unset, ColorValue::Unset) | (ColorValue::Default, ColorValue::Default)
        )
    }

    /// Key with both sides normalized for the binder
    pub fn normalized(&self) -> Self {
        Self {
            fg: self.fg.normalized(),
            bg: self.bg.normalized(),
        }
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.fg, self.bg)
    }
}

impl FromStr for ColorKey {
    type Err = String;

    /// Parse `"<fg> on <bg>"`. A lone `"<fg>"` leaves the background unset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (fg, bg) = match s.split_once(" on ") {
            Some((fg, bg)) => (fg, bg),
            None => (s, ""),
        };
        Ok(Self {
            fg: fg.parse()?,
            bg: bg.parse()?,
        })
    }
}

/// Canonical color names; `color_name` writes these and the parser reads them
const NAMED_COLORS: &[(&str, Color)] = &[
    ("reset", Color::Reset),
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("gray", Color::Gray),
    ("dark_gray", Color::DarkGray),
    ("light_red", Color::LightRed),
    ("light_green", Color::LightGreen),
    ("light_yellow", Color::LightYellow),
    ("light_blue", Color::LightBlue),
    ("light_magenta", Color::LightMagenta),
    ("light_cyan", Color::LightCyan),
    ("white", Color::White),
];

/// Parse a color string, sentinels included
pub fn parse_color_value(s: &str) -> Option<ColorValue> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "" | "unset" | "none" => return Some(ColorValue::Unset),
        "default" => return Some(ColorValue::Default),
        _ => {}
    }

    parse_color(s).map(ColorValue::Color)
}

/// Parse a concrete color string into a ratatui Color
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    // 256-color index
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<u8>().ok().map(Color::Indexed);
    }

    parse_named_color(s)
}

/// Parse the digits of `#RGB` or `#RRGGBB`
fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;

    match hex.len() {
        3 => {
            // Each nibble doubles: F -> FF
            let channel = |shift: u32| (((value >> shift) & 0xF) * 0x11) as u8;
            Some(Color::Rgb(channel(8), channel(4), channel(0)))
        }
        6 => {
            let channel = |shift: u32| ((value >> shift) & 0xFF) as u8;
            Some(Color::Rgb(channel(16), channel(8), channel(0)))
        }
        _ => None,
    }
}

/// Match a name case-insensitively, ignoring `_` and spelling `grey` as `gray`
fn parse_named_color(s: &str) -> Option<Color> {
    let fold = |name: &str| name.to_lowercase().replace('_', "").replace("grey", "gray");
    let wanted = fold(s);

    NAMED_COLORS
        .iter()
        .find(|&&(name, _)| fold(name) == wanted)
        .map(|&(_, color)| color)
}

/// Name a color in the same syntax the parser accepts
fn color_name(color: Color) -> String {
    match color {
        Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
        Color::Indexed(i) => i.to_string(),
        named => NAMED_COLORS
            .iter()
            .find(|&&(_, c)| c == named)
            .map_or_else(|| format!("{:?}", named), |(name, _)| name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Color Parsing Tests ==========

    #[test]
    fn test_parse_hex_color_6_digits() {
        assert_eq!(parse_color("#FF5733"), Some(Color::Rgb(255, 87, 51)));
    }

    #[test]
    fn test_parse_hex_color_3_digits() {
        assert_eq!(parse_color("#F53"), Some(Color::Rgb(255, 85, 51)));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert_eq!(parse_color("#GG0000"), None);
        assert_eq!(parse_color("#FF"), None);
        assert_eq!(parse_color("#FFFFFFF"), None);
        assert_eq!(parse_color("#é1"), None);
        assert_eq!(parse_color("#+1+1+1"), None);
        assert_eq!(parse_color("#-12"), None);
        assert_eq!(parse_color("#"), None);
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color("GREEN"), Some(Color::Green));
        assert_eq!(parse_color("dark_gray"), Some(Color::DarkGray));
        assert_eq!(parse_color("DarkGrey"), Some(Color::DarkGray));
        assert_eq!(parse_color("lightblue"), Some(Color::LightBlue));
        assert_eq!(parse_color("invalid"), None);
    }

    #[test]
    fn test_parse_256_color_index() {
        assert_eq!(parse_color("0"), Some(Color::Indexed(0)));
        assert_eq!(parse_color("255"), Some(Color::Indexed(255)));
        assert_eq!(parse_color("256"), None);
        assert_eq!(parse_color("+7"), None);
    }

    // ========== ColorValue Tests ==========

    #[test]
    fn test_parse_sentinels() {
        assert_eq!(parse_color_value(""), Some(ColorValue::Unset));
        assert_eq!(parse_color_value("none"), Some(ColorValue::Unset));
        assert_eq!(parse_color_value("Default"), Some(ColorValue::Default));
        assert_eq!(
            parse_color_value("reset"),
            Some(ColorValue::Color(Color::Reset))
        );
        assert_eq!(parse_color_value("blue"), Some(ColorValue::Color(Color::Blue)));
    }

    #[test]
    fn test_normalized_default_becomes_reset() {
        assert_eq!(
            ColorValue::Default.normalized(),
            ColorValue::Color(Color::Reset)
        );
        assert_eq!(ColorValue::Unset.normalized(), ColorValue::Unset);
        assert_eq!(
            ColorValue::Color(Color::Red).normalized(),
            ColorValue::Color(Color::Red)
        );
    }

    #[test]
    fn test_color_value_display() {
        assert_eq!(ColorValue::Unset.to_string(), "unset");
        assert_eq!(ColorValue::Default.to_string(), "default");
        assert_eq!(ColorValue::Color(Color::LightCyan).to_string(), "light_cyan");
        assert_eq!(
            ColorValue::Color(Color::Rgb(255, 0, 16)).to_string(),
            "#FF0010"
        );
        assert_eq!(ColorValue::Color(Color::Indexed(34)).to_string(), "34");
    }

    // ========== ColorKey Tests ==========

    #[test]
    fn test_color_key_parse() {
        let key: ColorKey = "yellow on blue".parse().unwrap();
        assert_eq!(key, ColorKey::new(Color::Yellow, Color::Blue));

        let key: ColorKey = "  #FF0000  ".parse().unwrap();
        assert_eq!(key.fg, ColorValue::Color(Color::Rgb(255, 0, 0)));
        assert_eq!(key.bg, ColorValue::Unset);

        let key: ColorKey = "default on 236".parse().unwrap();
        assert_eq!(key.fg, ColorValue::Default);
        assert_eq!(key.bg, ColorValue::Color(Color::Indexed(236)));
    }

    #[test]
    fn test_color_key_parse_invalid() {
        assert!("purple on black".parse::<ColorKey>().is_err());
        assert!("red on #12".parse::<ColorKey>().is_err());
    }

    #[test]
    fn test_color_key_no_color() {
        assert!(ColorKey::default().is_no_color());
        assert!(ColorKey::new(ColorValue::Default, ColorValue::Default).is_no_color());
        assert!(!ColorKey::new(ColorValue::Default, ColorValue::Unset).is_no_color());
        assert!(!ColorKey::new(Color::Red, ColorValue::Unset).is_no_color());
    }

    #[test]
    fn test_color_key_display_parses_back() {
        let key = ColorKey::new(Color::Rgb(1, 2, 3), ColorValue::Default);
        assert_eq!(key.to_string(), "#010203 on default");
        assert_eq!(key.to_string().parse::<ColorKey>().unwrap(), key);
    }

    #[test]
    fn test_every_color_displays_and_parses_back() {
        let mut colors: Vec<Color> = NAMED_COLORS.iter().map(|&(_, c)| c).collect();
        colors.extend([
            Color::Rgb(0, 0, 0),
            Color::Rgb(255, 128, 1),
            Color::Indexed(0),
            Color::Indexed(255),
        ]);
        let sides = colors
            .iter()
            .map(|&c| ColorValue::Color(c))
            .chain([ColorValue::Unset, ColorValue::Default]);

        for side in sides {
            for other in [ColorValue::Unset, ColorValue::Default, ColorValue::Color(Color::Red)] {
                for key in [ColorKey::new(side, other), ColorKey::new(other, side)] {
                    assert_eq!(key.to_string().parse::<ColorKey>(), Ok(key), "{}", key);
                }
            }
        }
    }

    #[test]
    fn test_reset_and_default_display_differently() {
        let reset = ColorKey::new(Color::Reset, Color::Red);
        let default = ColorKey::new(ColorValue::Default, Color::Red);
        assert_ne!(reset.to_string(), default.to_string());
        assert_eq!("reset on red".parse::<ColorKey>(), Ok(reset));
        assert_eq!("default on red".parse::<ColorKey>(), Ok(default));
    }
}
