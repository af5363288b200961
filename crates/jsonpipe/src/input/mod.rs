//! Input handling for JSON Lines data.

mod reader;

pub use reader::RecordReader;
