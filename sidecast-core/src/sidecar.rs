//! Locked I/O and freshness checks for derived sidecar files.
//!
//! Sidecars (minified files, compressed variants, `.etag` files) are
//! created lazily under request load and shared between workers through
//! the filesystem. Advisory `flock` is the only synchronization
//! primitive: readers take a shared lock, writers an exclusive one.
//! Two requests racing to create the same sidecar may both write it;
//! last writer wins and both produce equivalent output.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use nix::fcntl::{Flock, FlockArg};

/// `file.ext` + `".gz"` → `file.ext.gz`.
pub(crate) fn appended_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

pub(crate) fn mtime(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Freshness {
    Fresh,
    Stale,
    Absent,
}

/// A derived file is fresh iff its mtime is no earlier than the mtime
/// of the file it was derived from. Equal timestamps favor the derived
/// file.
pub(crate) fn freshness(derived: &Path, source_mtime: SystemTime) -> Freshness {
    match fs::metadata(derived).and_then(|m| m.modified()) {
        Ok(derived_mtime) if derived_mtime >= source_mtime => Freshness::Fresh,
        Ok(_) => Freshness::Stale,
        Err(_) => Freshness::Absent,
    }
}

/// Best-effort removal of a stale sidecar. A concurrent request may
/// have removed it already.
pub(crate) fn remove_stale(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::debug!("failed removing stale sidecar {}: {}", path.display(), err);
        }
    }
}

/// Write a sidecar under an exclusive advisory lock. The file is
/// truncated only after the lock is held, so shared-lock readers never
/// observe a torn file.
pub(crate) fn write_exclusive(path: &Path, data: &[u8]) -> io::Result<()> {
    let file = OpenOptions::new().create(true).write(true).open(path)?;
    let lock = Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| io::Error::from(errno))?;
    lock.set_len(0)?;
    (&*lock).write_all(data)?;
    (&*lock).sync_all()?;
    Ok(())
}

/// Read a single-line sidecar under a shared advisory lock, with the
/// trailing newline trimmed.
pub(crate) fn read_locked_line(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let lock = Flock::lock(file, FlockArg::LockShared).map_err(|(_, errno)| io::Error::from(errno))?;
    let mut contents = String::new();
    (&*lock).read_to_string(&mut contents)?;
    let line = contents.lines().next().unwrap_or("");
    Ok(line.trim_end().to_string())
}
