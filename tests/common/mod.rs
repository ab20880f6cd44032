//! Common test utilities

use std::collections::HashSet;

use cpair::{BindError, ColorPairAllocator, ColorValue, PairBinder};

/// Binder that records every call and rejects chosen indices
#[derive(Debug, Default)]
pub struct ScriptedBinder {
    pub capacity: u32,
    pub calls: Vec<(u32, ColorValue, ColorValue)>,
    pub reject: HashSet<u32>,
}

impl ScriptedBinder {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Reject binds for the given index
    pub fn rejecting(mut self, index: u32) -> Self {
        self.reject.insert(index);
        self
    }
}

impl PairBinder for ScriptedBinder {
    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn bind(&mut self, index: u32, fg: ColorValue, bg: ColorValue) -> Result<(), BindError> {
        self.calls.push((index, fg, bg));
        if self.reject.contains(&index) {
            return Err(BindError::Rejected {
                index,
                reason: "scripted rejection".to_string(),
            });
        }
        Ok(())
    }
}

/// Allocator over a fresh scripted binder
#[allow(dead_code)]
pub fn allocator(capacity: u32) -> ColorPairAllocator<ScriptedBinder> {
    ColorPairAllocator::new(ScriptedBinder::new(capacity))
}

/// Distinct concrete colors for generating distinct keys
#[allow(dead_code)]
pub fn indexed(n: u8) -> ColorValue {
    ColorValue::Color(ratatui::style::Color::Indexed(n))
}
