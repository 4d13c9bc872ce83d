use crate::config::ServeConfig;

pub(crate) const TEXT_CSS: &str = "text/css";
pub(crate) const APPLICATION_JAVASCRIPT: &str = "application/javascript";

/// Cache policy for one representation.
#[derive(Debug, Clone)]
pub(crate) struct Policy {
    pub content_type: String,
    pub extension: Option<String>,
    pub valid_for: i64,
    pub cache_control: Vec<String>,
    pub should_etag: bool,
}

/// Pick content type and cache policy for a resolved logical path.
///
/// Content type precedence: per-extension override, then the MIME
/// table, then `text/plain`. Overrides for `valid_for` and
/// `cache_control` replace the defaults wholesale; `max-age` is
/// prepended unless the policy is `no-store`.
pub(crate) fn select(config: &ServeConfig, logical_path: &str) -> Policy {
    let name = logical_path.rsplit('/').next().unwrap_or(logical_path);
    let extension = name.rfind('.').map(|i| name[i..].to_string());

    let override_ = extension
        .as_deref()
        .and_then(|ext| config.types.get(ext));

    let content_type = override_
        .and_then(|t| t.content_type.clone())
        .or_else(|| {
            extension
                .as_deref()
                .and_then(|ext| mime_guess::from_ext(&ext[1..]).first_raw())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "text/plain".to_string());

    let mut valid_for = config.defaults.valid_for;
    let mut cache_control = config.defaults.cache_control.clone();
    if let Some(t) = override_ {
        if let Some(v) = t.valid_for {
            valid_for = v;
        }
        if let Some(cc) = &t.cache_control {
            cache_control = cc.clone();
        }
    }

    let no_store = cache_control.iter().any(|d| d == "no-store");
    let should_etag = config.defaults.etag && !no_store;
    if !no_store {
        cache_control.insert(0, format!("max-age={valid_for}"));
    }

    Policy {
        content_type,
        extension,
        valid_for,
        cache_control,
        should_etag,
    }
}
