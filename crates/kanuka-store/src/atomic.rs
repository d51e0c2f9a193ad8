//! Crash-safe file replacement.
//!
//! Data goes to a temporary file in the destination directory, is synced,
//! then renamed over the target. Readers see either the old bytes or the
//! new bytes. If any step fails the temporary file is removed and the
//! target is left untouched.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    Ok(parent.join(format!(".{}.tmp.{}", file_name, Uuid::new_v4())))
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Atomically replace `path` with `data`.
///
/// The parent directory must already exist; it is never created here.
pub fn atomic_write(path: impl AsRef<Path>, data: &[u8]) -> io::Result<()> {
    replace(path.as_ref(), data, None)
}

/// Like [`atomic_write`], but the file is created with `mode` (on Unix)
/// before any byte is written, so it is never readable more widely.
pub fn atomic_write_with_mode(path: impl AsRef<Path>, data: &[u8], mode: u32) -> io::Result<()> {
    replace(path.as_ref(), data, Some(mode))
}

fn replace(path: &Path, data: &[u8], mode: Option<u32>) -> io::Result<()> {
    let temp = temp_path(path)?;

    let result = write_and_rename(&temp, path, data, mode);
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

#[cfg(unix)]
fn create_temp(temp: &Path, mode: Option<u32>) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    if let Some(mode) = mode {
        options.mode(mode);
    }
    options.open(temp)
}

#[cfg(not(unix))]
fn create_temp(temp: &Path, _mode: Option<u32>) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(temp)
}

fn write_and_rename(temp: &Path, path: &Path, data: &[u8], mode: Option<u32>) -> io::Result<()> {
    let mut file = create_temp(temp, mode)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp, path)?;

    if let Some(parent) = path.parent() {
        fsync_dir(parent)?;
    }
    Ok(())
}
