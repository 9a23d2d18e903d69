//! Common file system operations with unified error handling

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `content` to `path` so readers never observe a partial file
///
/// The bytes go to a temporary file in the same directory first, which is
/// then renamed over `path`. A failed write leaves any previous file intact.
pub fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append one line to `path`, creating the file when missing
pub fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_data()
}

/// Check that `dir` exists (creating it if needed) and accepts new files
pub fn ensure_writable_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let probe = NamedTempFile::new_in(dir)?;
    probe.close()
}
