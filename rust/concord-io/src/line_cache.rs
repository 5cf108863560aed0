//! Random access to text files by line number.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Seek, SeekFrom},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use concord_common::{Result, error::Error};

/// Byte offsets of every line start within one file.
struct LineOffsets {
    starts: Vec<u64>,
}

impl LineOffsets {
    fn scan(path: &Path) -> Result<LineOffsets> {
        let file =
            File::open(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
        let mut reader = BufReader::new(file);
        let mut starts = Vec::new();
        let mut pos = 0u64;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| Error::io(format!("scan {}", path.display()), e))?;
            if read == 0 {
                break;
            }
            starts.push(pos);
            pos += read as u64;
        }
        Ok(LineOffsets { starts })
    }
}

/// Reads line `n` of a file, caching a line-offset table per file.
///
/// The first access to a file scans it once to record where each line
/// starts; later accesses seek directly. Only offsets are cached, never line
/// content, so the memory cost is one `u64` per line of each touched file.
///
/// `LineCache` is `Send + Sync`; concurrent readers share the offset tables.
#[derive(Default)]
pub struct LineCache {
    files: RwLock<HashMap<PathBuf, Arc<LineOffsets>>>,
}

impl LineCache {
    pub fn new() -> LineCache {
        Default::default()
    }

    /// Returns line `line` (1-based) of `path` without its terminator, or
    /// `None` if the file has fewer lines.
    pub fn get_line(&self, path: impl AsRef<Path>, line: u64) -> Result<Option<String>> {
        let path = path.as_ref();
        if line == 0 {
            return Ok(None);
        }
        let offsets = self.offsets(path)?;
        let Some(&start) = offsets.starts.get((line - 1) as usize) else {
            return Ok(None);
        };

        let mut file =
            File::open(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
        file.seek(SeekFrom::Start(start))
            .map_err(|e| Error::io(format!("seek {}", path.display()), e))?;
        let mut buf = Vec::new();
        BufReader::new(file)
            .read_until(b'\n', &mut buf)
            .map_err(|e| Error::io(format!("read {}", path.display()), e))?;
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Drops all cached offset tables.
    pub fn clear_cache(&self) {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn offsets(&self, path: &Path) -> Result<Arc<LineOffsets>> {
        if let Some(offsets) = self
            .files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
        {
            return Ok(Arc::clone(offsets));
        }
        let offsets = Arc::new(LineOffsets::scan(path)?);
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_path_buf(), Arc::clone(&offsets));
        Ok(offsets)
    }
}
