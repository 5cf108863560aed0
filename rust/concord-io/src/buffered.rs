//! Bounded-memory sequential line I/O.
//!
//! Both sides are configured with a fraction of a [`MemoryBudget`]: the reader
//! uses it as the upper bound of a chunk returned by [`BufferedInput::read_chunk`],
//! the writer as the capacity of its write-behind buffer.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use concord_common::{Result, error::Error};

use crate::MemoryBudget;

/// Smallest buffer handed to the OS-level reader/writer, regardless of the budget.
const MIN_IO_BUFFER: usize = 64;

/// Sequential line reader holding at most one chunk of lines in memory.
///
/// Lines are returned without their terminator (`\n` or `\r\n`). Bytes that are
/// not valid UTF-8 are replaced rather than failing the read.
pub struct BufferedInput {
    path: PathBuf,
    reader: BufReader<File>,
    chunk_limit: usize,
    line_buf: Vec<u8>,
}

impl BufferedInput {
    /// Opens `path` for reading with a chunk bound of `fraction` of `budget`.
    pub fn open(path: impl AsRef<Path>, budget: MemoryBudget, fraction: f64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let chunk_limit = budget.fraction(fraction)?;
        let file = File::open(&path)
            .map_err(|e| Error::io(format!("open {}", path.display()), e))?;
        Ok(BufferedInput {
            reader: BufReader::with_capacity(chunk_limit.max(MIN_IO_BUFFER), file),
            path,
            chunk_limit,
            line_buf: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maximum number of bytes accumulated by a single [`read_chunk`](Self::read_chunk).
    pub fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }

    /// Reads the next line, or `None` at end of file.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.line_buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.line_buf)
            .map_err(|e| Error::io(format!("read {}", self.path.display()), e))?;
        if read == 0 {
            return Ok(None);
        }
        if self.line_buf.last() == Some(&b'\n') {
            self.line_buf.pop();
            if self.line_buf.last() == Some(&b'\r') {
                self.line_buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.line_buf).into_owned()))
    }

    /// Reads lines until their accumulated size reaches the chunk limit.
    ///
    /// A chunk holds at least one line unless the input is exhausted, in which
    /// case the returned vector is empty.
    pub fn read_chunk(&mut self) -> Result<Vec<String>> {
        let mut chunk = Vec::new();
        let mut size = 0;
        while size < self.chunk_limit {
            match self.read_line()? {
                Some(line) => {
                    size += line.len() + 1;
                    chunk.push(line);
                }
                None => break,
            }
        }
        Ok(chunk)
    }

    pub fn close(self) {}
}

/// Sequential line writer with a write-behind buffer sized from the budget.
pub struct BufferedOutput {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl BufferedOutput {
    /// Creates (or truncates) `path` for writing.
    pub fn create(path: impl AsRef<Path>, budget: MemoryBudget, fraction: f64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let capacity = budget.fraction(fraction)?.max(MIN_IO_BUFFER);
        let file = File::create(&path)
            .map_err(|e| Error::io(format!("create {}", path.display()), e))?;
        Ok(BufferedOutput {
            writer: BufWriter::with_capacity(capacity, file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `text` followed by a line terminator.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|e| Error::io(format!("write {}", self.path.display()), e))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::io(format!("flush {}", self.path.display()), e))
    }

    /// Flushes pending output and closes the file.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }
}
