use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-process counter so concurrent writers in one process never share a temp name.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Create the parent directory of `path` (and its ancestors) if missing.
///
/// # Errors
/// Returns an error if a directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Path of the sibling temp file used by [`atomic_write`].
fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

    parent.join(format!(
        ".{}.tmp.{}.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
        std::process::id(),
        seq
    ))
}

/// Atomically write bytes to a file by writing to a temp file then renaming.
///
/// Readers never observe a partial write. On Windows, where rename cannot
/// replace an existing file, the old file is removed first, so a reader may
/// briefly find no file at all. The temp file is removed if any step fails.
///
/// # Errors
/// Returns an error if the write or rename fails.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    // Same directory as the target so the rename stays on one filesystem
    let temp_path = temp_path_for(path);

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    let mut renamed = fs::rename(&temp_path, path);

    // On Windows, rename fails if the target exists
    if renamed.is_err() && cfg!(windows) && path.is_file() {
        renamed = fs::remove_file(path).and_then(|()| fs::rename(&temp_path, path));
    }

    if renamed.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    renamed
}
