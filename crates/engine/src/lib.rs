//! Archive engine: folder catalog and per-archive reading sessions.

mod catalog;
mod session;

pub use catalog::{scan, sort_entries};
pub use session::{PageImage, ReadingSession};
