mod binder;
mod caps;
mod table;

pub use binder::{BindError, PairBinder};
pub use caps::TermCaps;
pub use table::PairTable;
