#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use quote_server::server::{self, QuoteServer, ServerConfig};
use rocket::local::blocking::Client;
use tempfile::TempDir;

const TEMPLATES: [(&str, &str); 4] = [
    ("index.html", include_str!("../static/index.html")),
    ("add.html", include_str!("../static/add.html")),
    ("adddb.html", include_str!("../static/adddb.html")),
    ("quote.html", include_str!("../static/quote.html")),
];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A fresh root directory holding the shipped templates.
pub fn root_with_templates() -> TempDir {
    let root = tempfile::tempdir().expect("temp dir");
    for (file, html) in TEMPLATES.iter() {
        fs::write(root.path().join(file), html).expect("write template");
    }
    root
}

/// Writes `quotes` as the backing file of database `name` under `root`.
pub fn seed_database(root: &Path, name: &str, quotes: &[&str]) {
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).expect("data dir");
    let mut content = quotes.join("\n");
    content.push('\n');
    fs::write(data_dir.join(format!("{}.qdb", name)), content).expect("seed database");
}

pub fn config_for(root: &Path) -> ServerConfig {
    ServerConfig {
        root_dir: root.to_path_buf(),
        ..ServerConfig::default()
    }
}

pub fn start_server(root: &Path) -> Arc<QuoteServer> {
    init_logging();
    Arc::new(QuoteServer::start(config_for(root)).expect("server starts"))
}

pub fn launch_server(root: &Path) -> (Arc<QuoteServer>, Client) {
    let node = start_server(root);
    let client = Client::tracked(server::build(node.clone())).expect("valid rocket instance");
    (node, client)
}
