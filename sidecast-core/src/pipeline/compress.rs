use std::fs;
use std::io::{self, Write};
use std::path::Path;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use tracing::warn;

use crate::config::ServeConfig;
use crate::pipeline::negotiate::{self, is_inert};
use crate::pipeline::{Capabilities, Representation};
use crate::sidecar::{self, Freshness};

/// A content coding the process can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoder {
    Gzip,
    Deflate,
    #[cfg(feature = "zstd")]
    Zstd,
}

impl Encoder {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Encoder::Gzip => "gzip",
            Encoder::Deflate => "deflate",
            #[cfg(feature = "zstd")]
            Encoder::Zstd => "zstd",
        }
    }

    /// On-disk sidecar suffix. Deflate historically uses `.zip`; kept
    /// verbatim for compatibility with existing trees.
    pub(crate) fn suffix(self) -> &'static str {
        match self {
            Encoder::Gzip => ".gz",
            Encoder::Deflate => ".zip",
            #[cfg(feature = "zstd")]
            Encoder::Zstd => ".zstd",
        }
    }

    fn encode(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Encoder::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Encoder::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            #[cfg(feature = "zstd")]
            Encoder::Zstd => zstd::encode_all(data, zstd::DEFAULT_COMPRESSION_LEVEL),
        }
    }
}

/// Substitute a compressed sidecar of the current representation for
/// the highest-ranked acceptable coding, producing it if necessary.
/// Unknown codings are skipped; a coding that fails to generate is
/// logged and the next one is tried.
pub(crate) fn apply(
    config: &ServeConfig,
    caps: &Capabilities,
    rep: &mut Representation,
    accept_encoding: &str,
) {
    if !config.defaults.compress {
        return;
    }

    let source_mtime = match sidecar::mtime(&rep.current_file) {
        Ok(t) => t,
        Err(_) => return,
    };

    for preference in negotiate::parse_accept_encoding(accept_encoding) {
        if is_inert(&preference.name) {
            continue;
        }
        let Some(encoder) = caps.encoder_for(&preference.name) else {
            continue;
        };

        let candidate = sidecar::appended_path(&rep.current_file, encoder.suffix());
        match sidecar::freshness(&candidate, source_mtime) {
            Freshness::Fresh => {
                rep.substitute_encoded(candidate, encoder.name());
                return;
            }
            Freshness::Stale => sidecar::remove_stale(&candidate),
            Freshness::Absent => {}
        }

        match produce(&rep.current_file, &candidate, encoder) {
            Ok(()) => {
                rep.substitute_encoded(candidate, encoder.name());
                return;
            }
            Err(err) => {
                warn!(
                    "Failed compressing {} with {}: {}",
                    rep.current_file.display(),
                    encoder.name(),
                    err
                );
            }
        }
    }
}

fn produce(source: &Path, candidate: &Path, encoder: Encoder) -> io::Result<()> {
    let data = fs::read(source)?;
    let encoded = encoder.encode(&data)?;
    sidecar::write_exclusive(candidate, &encoded)
}
