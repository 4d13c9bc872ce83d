use std::time::{SystemTime, UNIX_EPOCH};

use httpdate::parse_http_date;

fn whole_seconds(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// True when the representation has not changed since the date the
/// client presented. Some agents append `;length=…` style suffixes;
/// anything after `;` is ignored. HTTP dates carry one-second
/// resolution, so the comparison truncates to whole seconds.
pub(crate) fn not_modified_since(file_mtime: SystemTime, header: &str) -> bool {
    let value = header.split(';').next().unwrap_or(header).trim();
    match parse_http_date(value) {
        Ok(since) => whole_seconds(file_mtime) <= whole_seconds(since),
        Err(_) => false,
    }
}

/// Tags issued by this server are unquoted, so the client echoes them
/// back verbatim; exact equality is the whole comparison.
pub(crate) fn etag_matches(tag: &str, if_none_match: &str) -> bool {
    if_none_match.trim() == tag
}
