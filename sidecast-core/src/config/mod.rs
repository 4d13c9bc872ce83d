
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Server-wide configuration, immutable after construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Directory all served files must reside under.
    pub root: PathBuf,

    /// Charset appended to text-ish content types.
    pub encoding: String,

    pub defaults: Defaults,

    /// Per-extension overrides, keyed by dot-prefixed extension
    /// (e.g. `".less"`).
    pub types: HashMap<String, TypeOverride>,

    /// Directory (relative to `root`) minified outputs are written to
    /// and read from exclusively. When unset, minified files are
    /// written next to their sources.
    pub min_cache_dir: Option<PathBuf>,

    /// File names tried, in order, when a request resolves to a
    /// directory.
    pub index_files: Vec<String>,

    /// Listen address for the HTTP runner.
    pub listen: String,

    /// Worker thread override for the HTTP runner.
    pub threads: Option<usize>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            encoding: "UTF-8".to_string(),
            defaults: Defaults::default(),
            types: HashMap::new(),
            min_cache_dir: None,
            index_files: vec!["index.html".to_string()],
            listen: "127.0.0.1:3000".to_string(),
            threads: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Validity window in seconds, used for `max-age` and `Expires`.
    /// Negative means "already expired".
    pub valid_for: i64,

    /// Base `Cache-Control` directives.
    pub cache_control: Vec<String>,

    pub minify: bool,
    pub compress: bool,
    pub etag: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            valid_for: 86_400, // one day
            cache_control: vec!["public".to_string()],
            minify: true,
            compress: true,
            etag: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeOverride {
    pub content_type: Option<String>,
    pub valid_for: Option<i64>,
    pub cache_control: Option<Vec<String>>,
}

impl ServeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse TOML in {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.root.is_dir() {
            anyhow::bail!("root '{}' is not a directory", self.root.display());
        }
        if let Some(dir) = &self.min_cache_dir {
            if dir.is_absolute() {
                anyhow::bail!(
                    "min_cache_dir '{}' must be relative to the root",
                    dir.display()
                );
            }
        }
        if self.index_files.is_empty() {
            anyhow::bail!("index_files must not be empty");
        }
        Ok(())
    }
}
