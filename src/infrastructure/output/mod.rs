//! Mirrored on-disk output for extracted files.

mod mirrored_writer;

pub use mirrored_writer::{MirroredWriter, WriteResult};
