//! Caller-side audio plumbing.
//!
//! The index itself only sees decoded `AudioSignal`s. This module holds the
//! glue the CLI uses to get there: WAV decoding and discovery of a clip
//! library laid out as `<root>/<category>/<clip>.wav`.

pub mod catalog;
pub mod wav;

pub use catalog::{discover_clips, load_catalog, ClipEntry};
pub use wav::read_wav;
