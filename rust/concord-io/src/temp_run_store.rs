//! Scratch storage for the sorted runs of an external sort.

use std::{
    fs,
    path::{Path, PathBuf},
};

use concord_common::{Result, error::Error};

/// A private temporary directory holding run files.
///
/// Run files are named after the half-open range of chunk indices they cover
/// (`run_<lo>_<hi>`). Sibling subranges of a merge tree are disjoint, so
/// their outputs never collide even when they are produced concurrently.
///
/// The directory and anything left in it are removed when the store is dropped.
pub struct TempRunStore {
    container: tempfile::TempDir,
}

impl TempRunStore {
    /// Creates a store under `parent_path`, or under the system temporary
    /// directory when `None`.
    pub fn new(parent_path: Option<&Path>) -> Result<TempRunStore> {
        let container = match parent_path {
            Some(parent) => tempfile::tempdir_in(parent),
            None => tempfile::tempdir(),
        }
        .map_err(|e| Error::io("create temporary run directory", e))?;
        Ok(TempRunStore { container })
    }

    pub fn path(&self) -> &Path {
        self.container.path()
    }

    /// Reserves the run file covering chunk indices `lo..hi`.
    ///
    /// The file itself is created by whoever writes the run; the returned
    /// handle removes it when dropped.
    pub fn allocate(&self, lo: usize, hi: usize) -> RunFile {
        self.allocate_named(&format!("run_{lo}_{hi}"))
    }

    /// Reserves a named scratch file that is not part of a merge tree.
    pub fn allocate_named(&self, name: &str) -> RunFile {
        RunFile {
            path: self.container.path().join(name),
        }
    }
}

/// Handle to a temporary file that is deleted when the handle is dropped.
///
/// Dropping happens on every exit path, including `?` early returns and
/// unwinding, so consumed or abandoned runs never linger on disk.
#[derive(Debug)]
pub struct RunFile {
    path: PathBuf,
}

impl RunFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("failed to remove {}: {e}", self.path.display());
        }
    }
}
