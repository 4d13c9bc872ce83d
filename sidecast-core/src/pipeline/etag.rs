use std::fs;
use std::os::unix::fs::MetadataExt;

use tracing::warn;

use crate::pipeline::Representation;
use crate::sidecar::{self, Freshness};

/// Read or materialize the `.etag` sidecar for the current
/// representation.
///
/// ETags are keyed by the representation actually served, not the
/// logical path: `style.min.css.gz` carries its own tag. The tag is a
/// strong one; this server controls both the source and the derived
/// artifact lifecycles, so same-second rewrites that would motivate a
/// weak tag do not arise.
pub(crate) fn load_or_store(rep: &Representation) -> Option<String> {
    let metadata = fs::metadata(&rep.current_file).ok()?;
    let modified = metadata.modified().ok()?;
    let sidecar_path = sidecar::appended_path(&rep.current_file, ".etag");

    match sidecar::freshness(&sidecar_path, modified) {
        Freshness::Fresh => match sidecar::read_locked_line(&sidecar_path) {
            Ok(tag) if !tag.is_empty() => return Some(tag),
            Ok(_) => {} // empty sidecar, rewrite below
            Err(_) => {
                warn!("Can't open {} for reading", sidecar_path.display());
                return None;
            }
        },
        Freshness::Stale => sidecar::remove_stale(&sidecar_path),
        Freshness::Absent => {}
    }

    let tag = format!(
        "{:x}-{:x}-{:x}",
        metadata.ino(),
        metadata.mtime(),
        metadata.size()
    );
    match sidecar::write_exclusive(&sidecar_path, format!("{tag}\n").as_bytes()) {
        Ok(()) => Some(tag),
        Err(_) => {
            warn!("Can't open {} for writing", sidecar_path.display());
            None
        }
    }
}
