//! Test harness: a live server on a fixed port over a scratch
//! fixture tree, started once per test binary.

use std::fs;
use std::path::Path;
use std::sync::{Once, OnceLock};

use sidecast_core::config::ServeConfig;
use sidecast_core::server::build_server;
use tempfile::TempDir;

pub const ADDR: &str = "127.0.0.1:4171";

static TREE: OnceLock<TempDir> = OnceLock::new();
static START: Once = Once::new();

pub fn server_root() -> &'static Path {
    TREE.get_or_init(build_tree).path()
}

fn build_tree() -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create fixture tree");
    let root = dir.path();

    fs::write(
        root.join("index.html"),
        "<html><body>sidecast</body></html>\n",
    )
    .unwrap();
    fs::write(root.join("style.css"), "body {  color: red;  }\n").unwrap();
    fs::write(root.join("hello.txt"), "hello over http\n").unwrap();

    dir
}

pub fn start_server() {
    START.call_once(|| {
        let config = ServeConfig {
            root: server_root().to_path_buf(),
            listen: ADDR.to_string(),
            ..ServeConfig::default()
        };

        let server = build_server(config).expect("failed to build test server");

        std::thread::spawn(move || {
            server.run_forever();
        });

        std::thread::sleep(std::time::Duration::from_millis(300));
    });
}

pub fn url(path: &str) -> String {
    format!("http://{ADDR}{path}")
}
