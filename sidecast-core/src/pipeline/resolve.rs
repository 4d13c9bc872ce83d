use std::io;
use std::path::{Path, PathBuf};

use http::StatusCode;
use nix::unistd::{access, AccessFlags};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("bad request")]
    BadPath,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,
}

impl ResolveError {
    pub fn status(&self) -> StatusCode {
        match self {
            ResolveError::BadPath => StatusCode::BAD_REQUEST,
            ResolveError::Forbidden => StatusCode::FORBIDDEN,
            ResolveError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ResolvedFile {
    /// Sanitized request path relative to the root, always starting
    /// with `/`. Extended with the index file name when a directory
    /// was resolved.
    pub logical_path: String,

    /// Absolute filesystem path of the resolved regular file.
    pub file: PathBuf,
}

/// Map a raw request path to a readable regular file under `root`.
///
/// The path is split on `/` regardless of host OS so an alternate
/// separator cannot smuggle a segment past the traversal check;
/// joining uses native path joining. `root` must already be
/// canonicalized.
pub(crate) fn resolve_path(
    root: &Path,
    index_files: &[String],
    raw: &str,
) -> Result<ResolvedFile, ResolveError> {
    if raw.as_bytes().contains(&0) {
        return Err(ResolveError::BadPath);
    }

    let mut segments: Vec<String> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" => continue,
            ".." => return Err(ResolveError::Forbidden),
            other => segments.push(other.to_string()),
        }
    }

    resolve_segments(root, index_files, segments)
}

fn resolve_segments(
    root: &Path,
    index_files: &[String],
    segments: Vec<String>,
) -> Result<ResolvedFile, ResolveError> {
    let mut file = root.to_path_buf();
    for segment in &segments {
        file.push(segment);
    }

    let metadata = match std::fs::metadata(&file) {
        Ok(m) => m,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(ResolveError::NotFound),
        Err(_) => return Err(ResolveError::Forbidden),
    };

    if metadata.is_file() {
        // Symlinks inside the tree may still point elsewhere; enforce
        // containment on the canonical path.
        let canonical = file.canonicalize().map_err(|_| ResolveError::Forbidden)?;
        if !canonical.starts_with(root) {
            return Err(ResolveError::Forbidden);
        }

        if access(&canonical, AccessFlags::R_OK).is_err() {
            return Err(ResolveError::Forbidden);
        }

        return Ok(ResolvedFile {
            logical_path: format!("/{}", segments.join("/")),
            file: canonical,
        });
    }

    if metadata.is_dir() {
        for name in index_files {
            let mut extended = segments.clone();
            extended.push(name.clone());
            if let Ok(resolved) = resolve_segments(root, index_files, extended) {
                return Ok(resolved);
            }
        }
        return Err(ResolveError::Forbidden);
    }

    // Sockets, fifos, devices.
    Err(ResolveError::Forbidden)
}
