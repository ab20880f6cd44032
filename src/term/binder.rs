use thiserror::Error;

use crate::color::ColorValue;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Pair index {index} out of range (capacity {capacity})")]
    OutOfRange { index: u32, capacity: u32 },
    #[error("Pair {index} rejected: {reason}")]
    Rejected { index: u32, reason: String },
}

/// The terminal side of color pair allocation.
///
/// A binder programs a numbered slot with a foreground and background.
/// Colors arrive normalized: `ColorValue::Default` never reaches `bind`.
pub trait PairBinder {
    /// Maximum number of color pairs the terminal supports
    fn capacity(&self) -> u32;

    /// Program slot `index` with the given colors
    fn bind(&mut self, index: u32, fg: ColorValue, bg: ColorValue) -> Result<(), BindError>;
}
