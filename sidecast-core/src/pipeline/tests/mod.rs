mod policy_tests;
mod props;

use std::fs::{File, FileTimes};
use std::path::Path;
use std::time::SystemTime;

use crate::config::ServeConfig;
use crate::pipeline::Representation;

/// A representation as the policy stage would hand it to the
/// transformer stages.
pub(crate) fn representation(file: &Path, logical: &str, content_type: &str) -> Representation {
    Representation {
        logical_path: logical.to_string(),
        current_file: file.to_path_buf(),
        content_type: content_type.to_string(),
        valid_for: 86_400,
        cache_control: vec!["max-age=86400".to_string(), "public".to_string()],
        should_etag: true,
        content_encoding: None,
    }
}

pub(crate) fn config_rooted_at(root: &Path) -> ServeConfig {
    ServeConfig {
        root: root.to_path_buf(),
        ..ServeConfig::default()
    }
}

/// Pin a file's mtime so freshness comparisons do not depend on write
/// timing or filesystem timestamp granularity.
pub(crate) fn set_mtime(path: &Path, mtime: SystemTime) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_times(FileTimes::new().set_modified(mtime)).unwrap();
}
