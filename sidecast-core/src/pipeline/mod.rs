//! The request pipeline: resolve → type/policy → minify → compress →
//! conditional → etag → respond.
//!
//! Each transformer stage either keeps the current representation or
//! substitutes a sidecar of it; the client-visible path never changes.
//! Resolver failures are fatal to the request; minifier, compressor
//! and ETag failures degrade to the best representation available.

mod compress;
mod conditional;
mod etag;
mod minify;
mod negotiate;
mod policy;
mod resolve;
mod respond;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use anyhow::Context;
use http::StatusCode;

use crate::config::ServeConfig;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::sidecar;

pub use resolve::ResolveError;

/// What the running process can derive, detected once at startup.
/// Compressors always include gzip and deflate; zstd and the
/// minifiers depend on the compiled feature set.
#[derive(Debug, Clone)]
pub struct Capabilities {
    minify_types: Vec<&'static str>,
    encoders: Vec<compress::Encoder>,
}

impl Capabilities {
    pub fn detect() -> Self {
        let mut minify_types = Vec::new();
        if cfg!(feature = "minify-css") {
            minify_types.push(policy::TEXT_CSS);
        }
        if cfg!(feature = "minify-js") {
            minify_types.push(policy::APPLICATION_JAVASCRIPT);
        }

        let mut encoders = vec![compress::Encoder::Gzip, compress::Encoder::Deflate];
        #[cfg(feature = "zstd")]
        encoders.push(compress::Encoder::Zstd);

        Self {
            minify_types,
            encoders,
        }
    }

    fn can_minify(&self, content_type: &str) -> bool {
        self.minify_types.contains(&content_type)
    }

    fn encoder_for(&self, token: &str) -> Option<compress::Encoder> {
        self.encoders
            .iter()
            .copied()
            .find(|e| token.eq_ignore_ascii_case(e.name()))
    }
}

/// The on-disk byte sequence currently chosen for serving, plus its
/// metadata. `current_file` starts at the resolved source and is
/// substituted by the minifier and compressor stages.
#[derive(Debug)]
pub(crate) struct Representation {
    pub logical_path: String,
    pub current_file: PathBuf,
    pub content_type: String,
    pub valid_for: i64,
    pub cache_control: Vec<String>,
    pub should_etag: bool,
    pub content_encoding: Option<&'static str>,
}

impl Representation {
    fn substitute(&mut self, file: PathBuf) {
        self.current_file = file;
    }

    fn substitute_encoded(&mut self, file: PathBuf, encoding: &'static str) {
        self.current_file = file;
        self.content_encoding = Some(encoding);
    }
}

pub struct Pipeline {
    config: ServeConfig,
    caps: Capabilities,
}

impl Pipeline {
    pub fn new(mut config: ServeConfig) -> anyhow::Result<Self> {
        // Every stage resolves against the canonical root, so sidecar
        // paths and containment checks agree.
        config.root = config
            .root
            .canonicalize()
            .with_context(|| format!("cannot canonicalize root '{}'", config.root.display()))?;

        Ok(Self {
            caps: Capabilities::detect(),
            config,
        })
    }

    pub fn config(&self) -> &ServeConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Serve one request envelope. Never panics and never returns an
    /// error: every failure is either a 4xx envelope or a degraded
    /// 200.
    pub async fn handle(&self, request: &RequestEnvelope) -> ResponseEnvelope {
        let resolved =
            match resolve::resolve_path(&self.config.root, &self.config.index_files, &request.path)
            {
                Ok(r) => r,
                Err(err) => return respond::error_response(err.status()),
            };

        let policy = policy::select(&self.config, &resolved.logical_path);
        let mut rep = Representation {
            logical_path: resolved.logical_path,
            current_file: resolved.file,
            content_type: policy.content_type,
            valid_for: policy.valid_for,
            cache_control: policy.cache_control,
            should_etag: policy.should_etag,
            content_encoding: None,
        };

        minify::apply(&self.config, &self.caps, &mut rep);

        if let Some(accept) = request.accept_encoding.as_deref() {
            compress::apply(&self.config, &self.caps, &mut rep, accept);
        }

        // Validators refer to the exact representation about to be
        // served, so conditionals run only after substitution settles.
        if let Some(since) = request.if_modified_since.as_deref() {
            if let Ok(mtime) = sidecar::mtime(&rep.current_file) {
                if conditional::not_modified_since(mtime, since) {
                    return respond::not_modified();
                }
            }
        }

        let tag = if rep.should_etag {
            etag::load_or_store(&rep)
        } else {
            None
        };

        if let (Some(tag), Some(if_none_match)) = (tag.as_deref(), request.if_none_match.as_deref())
        {
            if conditional::etag_matches(tag, if_none_match) {
                return respond::not_modified();
            }
        }

        match respond::build_ok(&self.config, &rep, tag.as_deref()).await {
            Ok(response) => response,
            // Permission errors are the realistic failure here; the
            // resolver already ruled out absence.
            Err(_) => respond::error_response(StatusCode::FORBIDDEN),
        }
    }
}
