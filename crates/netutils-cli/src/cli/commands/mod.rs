//! CLI command handlers, one file per command.

mod hash;
mod offset;
mod upload;

pub use hash::run_hash;
pub use offset::run_offset;
pub use upload::run_upload;
