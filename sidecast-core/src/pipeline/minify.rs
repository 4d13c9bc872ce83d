use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::config::ServeConfig;
use crate::pipeline::policy::{APPLICATION_JAVASCRIPT, TEXT_CSS};
use crate::pipeline::{Capabilities, Representation};
use crate::sidecar::{self, Freshness};

/// Substitute a fresh `.min.css`/`.min.js` sibling for the current
/// representation, producing it if the process carries a minifier for
/// the content type. Any failure leaves the representation unchanged.
pub(crate) fn apply(config: &ServeConfig, caps: &Capabilities, rep: &mut Representation) {
    if !config.defaults.minify {
        return;
    }
    if rep.content_type != TEXT_CSS && rep.content_type != APPLICATION_JAVASCRIPT {
        return;
    }

    // Already-minified inputs are never minified again.
    let relative = rep.logical_path.trim_start_matches('/');
    let Some(min_relative) = minified_name(relative) else {
        return;
    };

    let candidate = match &config.min_cache_dir {
        // Flatten the path into the cache directory namespace; only
        // `/` is rewritten, so distinct logical paths cannot collide.
        Some(dir) => config
            .root
            .join(dir)
            .join(min_relative.replace('/', "%2F")),
        None => {
            let name = min_relative.rsplit('/').next().unwrap_or(&min_relative);
            rep.current_file.with_file_name(name)
        }
    };

    let source_mtime = match sidecar::mtime(&rep.current_file) {
        Ok(t) => t,
        Err(_) => return,
    };

    match sidecar::freshness(&candidate, source_mtime) {
        Freshness::Fresh => {
            // A fresh pre-existing sidecar is used even when no
            // minifier is built in.
            rep.substitute(candidate);
            return;
        }
        Freshness::Stale => sidecar::remove_stale(&candidate),
        Freshness::Absent => {}
    }

    if !caps.can_minify(&rep.content_type) {
        return;
    }

    match produce(&rep.current_file, &candidate, &rep.content_type) {
        Ok(()) => rep.substitute(candidate),
        Err(err) => warn!(
            "Failed minifying {}: {}",
            rep.current_file.display(),
            err
        ),
    }
}

/// `style.css` → `style.min.css`; `None` for inputs that already carry
/// the minified suffix or are neither CSS nor JS by name.
fn minified_name(name: &str) -> Option<String> {
    if let Some(base) = name.strip_suffix(".css") {
        if base.ends_with(".min") {
            return None;
        }
        return Some(format!("{base}.min.css"));
    }
    if let Some(base) = name.strip_suffix(".js") {
        if base.ends_with(".min") {
            return None;
        }
        return Some(format!("{base}.min.js"));
    }
    None
}

fn produce(source: &Path, candidate: &Path, content_type: &str) -> io::Result<()> {
    let text = fs::read_to_string(source)?;

    let minified = match content_type {
        TEXT_CSS => minify_css(&text)?,
        _ => minify_js(&text)?,
    };
    if minified.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "minifier produced empty output",
        ));
    }

    if let Some(parent) = candidate.parent() {
        fs::create_dir_all(parent)?;
    }
    sidecar::write_exclusive(candidate, minified.as_bytes())
}

#[cfg(feature = "minify-css")]
fn minify_css(source: &str) -> io::Result<String> {
    use lightningcss::printer::PrinterOptions;
    use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};

    let mut sheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    let output = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    Ok(output.code)
}

#[cfg(not(feature = "minify-css"))]
fn minify_css(_source: &str) -> io::Result<String> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "built without a CSS minifier",
    ))
}

#[cfg(feature = "minify-js")]
fn minify_js(source: &str) -> io::Result<String> {
    use oxc_allocator::Allocator;
    use oxc_codegen::{Codegen, CodegenOptions};
    use oxc_mangler::MangleOptions;
    use oxc_minifier::{CompressOptions, Minifier, MinifierOptions};
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::default()).parse();
    if !parsed.errors.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("parse error: {:?}", parsed.errors[0]),
        ));
    }
    let mut program = parsed.program;

    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let minified = Minifier::new(options).build(&allocator, &mut program);

    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: false,
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program);

    Ok(output.code)
}

#[cfg(not(feature = "minify-js"))]
fn minify_js(_source: &str) -> io::Result<String> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "built without a JavaScript minifier",
    ))
}
