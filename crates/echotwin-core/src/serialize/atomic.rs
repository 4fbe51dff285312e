//! Whole-file reads and write-then-rename writes.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{EchoError, EchoResult};

/// Writes `bytes` to a temporary file beside `path`, then renames it over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> EchoResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| EchoError::io(path, e))?;
    tmp.write_all(bytes).map_err(|e| EchoError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| EchoError::io(path, e))?;
    tmp.persist(path).map_err(|e| EchoError::io(path, e.error))?;
    Ok(())
}

/// Reads a whole file.
pub fn read_file(path: &Path) -> EchoResult<Vec<u8>> {
    fs::read(path).map_err(|e| EchoError::io(path, e))
}
