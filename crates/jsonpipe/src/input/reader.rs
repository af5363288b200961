//! JSON Lines reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{JsonPipeError, Result};
use crate::record::{Dataset, Record};

/// Reads one JSON object per line.
///
/// Blank lines are skipped. A line that is not a JSON object yields a
/// `Parse` error carrying its 1-based line number.
pub struct RecordReader<R> {
    reader: R,
    source: PathBuf,
    line: usize,
    buf: String,
}

impl RecordReader<BufReader<File>> {
    /// Open a JSONL file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| JsonPipeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufReader::new(file)).with_source(path))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Read records from any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            source: PathBuf::from("<input>"),
            line: 0,
            buf: String::new(),
        }
    }

    /// Name the input in IO errors.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// Number of lines read so far, blank ones included.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// Turn the reader into a dataset.
    pub fn into_dataset<'a>(self) -> Dataset<'a>
    where
        R: 'a,
    {
        Box::new(self)
    }

    fn parse_line(&self, text: &str) -> Result<Record> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(other) => Err(JsonPipeError::Parse {
                line: self.line,
                message: format!("expected a JSON object, got {}", kind(&other)),
            }),
            Err(e) => Err(JsonPipeError::Parse {
                line: self.line,
                message: e.to_string(),
            }),
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => {
                    return Some(Err(JsonPipeError::Io {
                        path: self.source.clone(),
                        source: e,
                    }));
                }
            }

            let text = self.buf.trim();
            if !text.is_empty() {
                return Some(self.parse_line(text));
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_reads_objects_in_order() {
        let input = "{\"id\": \"A\"}\n{\"id\": \"B\", \"n\": 2}\n";
        let records: Vec<Record> = RecordReader::new(Cursor::new(input))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], json!("A"));
        assert_eq!(records[1]["n"], json!(2));
    }

    #[test]
    fn test_keeps_field_order() {
        let input = r#"{"z": 1, "a": 2, "m": 3}"#;
        let record = RecordReader::new(Cursor::new(input)).next().unwrap().unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
    }

    #[test]
    fn test_skips_blank_lines_and_handles_crlf() {
        let input = "\n{\"a\": 1}\r\n   \n{\"a\": 2}";
        let mut reader = RecordReader::new(Cursor::new(input));
        assert_eq!(reader.by_ref().count(), 2);
        assert_eq!(reader.lines_read(), 4);
    }

    #[test]
    fn test_non_object_line_is_parse_error() {
        let input = "{\"a\": 1}\n[1, 2]\n";
        let results: Vec<_> = RecordReader::new(Cursor::new(input)).collect();

        assert!(results[0].is_ok());
        match &results[1] {
            Err(JsonPipeError::Parse { line, message }) => {
                assert_eq!(*line, 2);
                assert!(message.contains("an array"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let mut reader = RecordReader::new(Cursor::new("{\"a\": \n"));
        assert!(matches!(
            reader.next(),
            Some(Err(JsonPipeError::Parse { line: 1, .. }))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let err = RecordReader::open("/nonexistent/input.jsonl").err().unwrap();
        assert!(matches!(err, JsonPipeError::Io { .. }));
    }
}
