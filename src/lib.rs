//! Terminal color pair allocation
//!
//! Maps `(fg, bg)` color keys onto the terminal's limited set of color pair
//! slots, sharing slots between identical keys and reclaiming them when the
//! last owner lets go.

pub mod allocator;
pub mod color;
pub mod config;
pub mod error;
pub mod swatch;
pub mod term;

pub use allocator::{
    AllocError, ColorPair, ColorPairAllocator, PairInfo, ReleaseError, RESERVED_BASE,
};
pub use color::{ColorKey, ColorValue};
pub use config::Config;
pub use error::{Error, Result};
pub use term::{BindError, PairBinder, PairTable, TermCaps};
