//! Timestamped backups taken before a document is rewritten.

use std::path::{Path, PathBuf};

use chrono::Local;
use filetime::FileTime;
use sha2::{Digest as _, Sha256};
use tracing::debug;

use crate::error::Error;

/// Copy `target` to `<stem>.backup_<stamp><.ext>` beside it, carrying over
/// permissions and access/modification times, then confirm the copy hashes
/// the same as the source.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the target is missing, `Error::Io` if the
/// copy fails, or `Error::BackupMismatch` if the copy's digest differs.
pub fn create(target: &Path, stamp: &str) -> Result<PathBuf, Error> {
    let metadata = match std::fs::metadata(target) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound { path: target.to_path_buf() });
        }
        Err(err) => return Err(Error::Io(err)),
        Ok(metadata) => metadata,
    };

    let backup = unclaimed_path(&path_for(target, stamp));
    std::fs::copy(target, &backup)?;
    filetime::set_file_times(
        &backup,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;

    let expected = digest(target)?;
    let actual = digest(&backup)?;
    if expected != actual {
        return Err(Error::BackupMismatch {
            backup,
            original: target.to_path_buf(),
        });
    }

    debug!(backup = %backup.display(), sha256 = %actual, "backup verified");
    return Ok(backup);
}

/// SHA-256 of a file's bytes as lowercase hex.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read.
fn digest(path: &Path) -> Result<String, Error> {
    let bytes = std::fs::read(path)?;
    return Ok(format!("{:x}", Sha256::digest(&bytes)));
}

/// Backup name for `target`: `index.html` becomes `index.backup_<stamp>.html`.
pub fn path_for(target: &Path, stamp: &str) -> PathBuf {
    let stem = target.file_stem().map(|s| return s.to_string_lossy()).unwrap_or_default();
    let suffix = target
        .extension()
        .map(|e| return format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    return target.with_file_name(format!("{stem}.backup_{stamp}{suffix}"));
}

/// Current local time at second resolution, e.g. `20261019_142501`.
pub fn timestamp() -> String {
    return Local::now().format("%Y%m%d_%H%M%S").to_string();
}

/// Return `candidate` if nothing exists there, otherwise the first free
/// `<stem>_<n><.ext>` sibling. Two runs inside one second keep both artifacts.
pub fn unclaimed_path(candidate: &Path) -> PathBuf {
    if !candidate.exists() {
        return candidate.to_path_buf();
    }

    let stem = candidate.file_stem().map(|s| return s.to_string_lossy()).unwrap_or_default();
    let suffix = candidate
        .extension()
        .map(|e| return format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1_u32;
    loop {
        let next = candidate.with_file_name(format!("{stem}_{n}{suffix}"));
        if !next.exists() {
            return next;
        }
        n = n.saturating_add(1);
    }
}
