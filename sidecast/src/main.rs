use std::path::PathBuf;

use clap::Parser;
use sidecast_core::config::ServeConfig;
use sidecast_core::logging::init_logging;
use sidecast_core::server;

#[derive(Parser, Debug)]
#[command(
    name = "sidecast",
    version,
    about = "Static file server with durable minified, compressed and ETag sidecars"
)]
struct Cli {
    /// Directory to serve
    dir: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(long)]
    listen: Option<String>,

    /// Disable minification of CSS and JavaScript
    #[arg(long)]
    no_minify: bool,

    /// Disable negotiated compression
    #[arg(long)]
    no_compress: bool,

    /// Disable ETag generation
    #[arg(long)]
    no_etag: bool,

    /// Directory (relative to the root) for minified outputs
    #[arg(long)]
    min_cache_dir: Option<PathBuf>,

    /// Index file tried for directory requests (repeatable)
    #[arg(long = "index")]
    index_files: Vec<String>,
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServeConfig::from_file(path).expect("Failed to load configuration"),
        None => ServeConfig::default(),
    };

    // Flags override file values, which override built-in defaults.
    if let Some(dir) = cli.dir {
        config.root = dir;
    }
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if cli.no_minify {
        config.defaults.minify = false;
    }
    if cli.no_compress {
        config.defaults.compress = false;
    }
    if cli.no_etag {
        config.defaults.etag = false;
    }
    if let Some(dir) = cli.min_cache_dir {
        config.min_cache_dir = Some(dir);
    }
    if !cli.index_files.is_empty() {
        config.index_files = cli.index_files;
    }

    config.validate().expect("Invalid configuration");

    server::run(config).expect("Failed to start server");
}
