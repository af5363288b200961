//! Fuzz target for the JSONL reader.
//!
//! Feeds arbitrary bytes through the reader and writer. Every line must
//! become a record or an error; nothing may panic.

#![no_main]

use jsonpipe::{RecordReader, RecordWriter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let dataset = RecordReader::new(data).into_dataset();
    let mut writer = RecordWriter::new(Vec::new());
    let _ = writer.write_all(dataset);
});
