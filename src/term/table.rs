use std::collections::BTreeMap;

use ratatui::style::{Color, Style};

use crate::allocator::RESERVED_BASE;
use crate::color::{ColorKey, ColorValue};

use super::{BindError, PairBinder, TermCaps};

/// In-memory color pair table
///
/// Stands in for the terminal's pair registers: it remembers what each
/// slot was programmed with and turns a slot back into a renderable style.
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    caps: TermCaps,
    slots: BTreeMap<u32, ColorKey>,
}

impl PairTable {
    pub fn new(caps: TermCaps) -> Self {
        Self {
            caps,
            slots: BTreeMap::new(),
        }
    }

    pub fn caps(&self) -> TermCaps {
        self.caps
    }

    /// Colors a slot is currently programmed with
    pub fn binding(&self, index: u32) -> Option<ColorKey> {
        self.slots.get(&index).copied()
    }

    /// Resolve a slot into a ratatui style
    pub fn style(&self, index: u32) -> Option<Style> {
        let key = self.binding(index)?;
        let mut style = Style::default();
        if let Some(fg) = key.fg.color() {
            style = style.fg(fg);
        }
        if let Some(bg) = key.bg.color() {
            style = style.bg(bg);
        }
        Some(style)
    }

    /// Number of programmed slots
    pub fn bound_count(&self) -> usize {
        self.slots.len()
    }

    fn check(&self, index: u32, fg: ColorValue, bg: ColorValue) -> Result<(), BindError> {
        if index < RESERVED_BASE || index >= self.caps.capacity {
            return Err(BindError::OutOfRange {
                index,
                capacity: self.caps.capacity,
            });
        }

        let is_rgb = |v: ColorValue| matches!(v.color(), Some(Color::Rgb(..)));
        if !self.caps.truecolor && (is_rgb(fg) || is_rgb(bg)) {
            return Err(BindError::Rejected {
                index,
                reason: "terminal does not support RGB colors".to_string(),
            });
        }

        Ok(())
    }
}

impl PairBinder for PairTable {
    fn capacity(&self) -> u32 {
        self.caps.capacity
    }

    fn bind(&mut self, index: u32, fg: ColorValue, bg: ColorValue) -> Result<(), BindError> {
        if let Err(err) = self.check(index, fg, bg) {
            // A failed reprogram leaves the slot without a usable binding
            self.slots.remove(&index);
            return Err(err);
        }
        self.slots.insert(index, ColorKey { fg, bg });
        Ok(())
    }
}
