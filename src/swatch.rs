//! Color swatch output for the `cpair` binary
//!
//! Allocates one pair per configured object and prints a sample of each.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use log::debug;
use ratatui::style::Color;

use crate::allocator::{ColorPair, ColorPairAllocator};
use crate::color::ColorKey;
use crate::config::Config;
use crate::error::Result;
use crate::term::{PairBinder, PairTable, TermCaps};

const SAMPLE: &str = " Sample ";

/// One configured object and the pair it got, if any
#[derive(Debug)]
pub struct SwatchLine {
    pub name: String,
    pub key: ColorKey,
    pub pair: Option<ColorPair>,
}

/// Allocate and print a swatch for every configured object
pub fn run<W: Write>(out: &mut W, config: &Config, detected: TermCaps) -> Result<()> {
    let objects = config.color_objects()?;
    let caps = config.term_caps(detected);
    debug!("terminal caps: {:?}", caps);

    let mut allocator = ColorPairAllocator::new(PairTable::new(caps));
    let lines = allocate(&mut allocator, objects);
    render(out, &mut allocator, &lines)?;

    Ok(())
}

/// Acquire a pair for every object.
///
/// Objects with no color, or that hit exhaustion, keep `pair: None` and are
/// rendered uncolored.
pub fn allocate<B: PairBinder>(
    allocator: &mut ColorPairAllocator<B>,
    objects: Vec<(String, ColorKey)>,
) -> Vec<SwatchLine> {
    objects
        .into_iter()
        .map(|(name, key)| {
            let pair = match allocator.acquire(key.fg, key.bg) {
                Ok(pair) => pair,
                Err(err) => {
                    debug!("{}: {}", name, err);
                    None
                }
            };
            SwatchLine { name, key, pair }
        })
        .collect()
}

/// Print every line, then a usage summary and pending warnings
pub fn render<W: Write>(
    out: &mut W,
    allocator: &mut ColorPairAllocator<PairTable>,
    lines: &[SwatchLine],
) -> io::Result<()> {
    let table = allocator.binder();

    for line in lines {
        let index = line
            .pair
            .as_ref()
            .map_or_else(|| "-".to_string(), |pair| pair.index().to_string());
        queue!(
            out,
            Print(format!(
                "{:<12} {:>5}  {:<28} ",
                line.name,
                index,
                line.key.to_string()
            ))
        )?;

        match line.pair.as_ref().and_then(|pair| table.binding(pair.index())) {
            Some(binding) => {
                if let Some(fg) = binding.fg.color() {
                    queue!(out, SetForegroundColor(to_crossterm(fg)))?;
                }
                if let Some(bg) = binding.bg.color() {
                    queue!(out, SetBackgroundColor(to_crossterm(bg)))?;
                }
                queue!(out, Print(SAMPLE), ResetColor)?;
            }
            None => queue!(out, Print(SAMPLE))?,
        }
        queue!(out, Print("\n"))?;
    }

    queue!(
        out,
        Print(format!(
            "pairs in use: {}, remaining: {}, capacity: {}\n",
            allocator.len(),
            allocator.capacity_remaining(),
            allocator.capacity()
        ))
    )?;

    for warning in allocator.take_warnings() {
        queue!(out, Print(format!("warning: {}\n", warning)))?;
    }

    out.flush()
}

fn to_crossterm(color: Color) -> style::Color {
    match color {
        Color::Reset => style::Color::Reset,
        Color::Black => style::Color::Black,
        Color::Red => style::Color::DarkRed,
        Color::Green => style::Color::DarkGreen,
        Color::Yellow => style::Color::DarkYellow,
        Color::Blue => style::Color::DarkBlue,
        Color::Magenta => style::Color::DarkMagenta,
        Color::Cyan => style::Color::DarkCyan,
        Color::Gray => style::Color::Grey,
        Color::DarkGray => style::Color::DarkGrey,
        Color::LightRed => style::Color::Red,
        Color::LightGreen => style::Color::Green,
        Color::LightYellow => style::Color::Yellow,
        Color::LightBlue => style::Color::Blue,
        Color::LightMagenta => style::Color::Magenta,
        Color::LightCyan => style::Color::Cyan,
        Color::White => style::Color::White,
        Color::Rgb(r, g, b) => style::Color::Rgb { r, g, b },
        Color::Indexed(i) => style::Color::AnsiValue(i),
    }
}
