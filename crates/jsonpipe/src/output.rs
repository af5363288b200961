//! JSON Lines writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{JsonPipeError, Result};
use crate::record::{Dataset, Record};

/// Writes each record as one compact JSON object per line.
pub struct RecordWriter<W: Write> {
    writer: W,
    destination: PathBuf,
    written: usize,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (or truncate) a JSONL file, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let io_error = |e| JsonPipeError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let file = File::create(path).map_err(io_error)?;
        Ok(Self::new(BufWriter::new(file)).with_destination(path))
    }
}

impl<W: Write> RecordWriter<W> {
    /// Write records to any writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            destination: PathBuf::from("<output>"),
            written: 0,
        }
    }

    /// Name the output in IO errors.
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Write one record.
    pub fn write(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record).map_err(|e| {
            if e.io_error_kind().is_some() {
                self.io_error(e.into())
            } else {
                JsonPipeError::Json(e)
            }
        })?;
        self.writer.write_all(b"\n").map_err(|e| self.io_error(e))?;
        self.written += 1;
        Ok(())
    }

    /// Write every record of a dataset, stopping at the first error.
    ///
    /// Records written before the error stay written. Returns the number of
    /// records written by this call.
    pub fn write_all(&mut self, dataset: Dataset<'_>) -> Result<usize> {
        let before = self.written;
        let result = dataset.into_iter().try_for_each(|item| self.write(&item?));
        self.flush()?;
        result.map(|()| self.written - before)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| self.io_error(e))
    }

    /// Total records written.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the inner writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }

    fn io_error(&self, source: std::io::Error) -> JsonPipeError {
        JsonPipeError::Io {
            path: self.destination.clone(),
            source,
        }
    }
}
