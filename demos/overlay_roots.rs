// SPDX-License-Identifier: MIT OR Apache-2.0

//! Overlay roots example.
//!
//! Two configuration trees are layered: an application tree and a vendor
//! tree searched after it. Both are consulted for every section; on a key
//! collision the later root wins.
//!
//! To run this example:
//! ```bash
//! cargo run --example overlay_roots
//! ```

use layercfg::prelude::*;
use std::fs;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let dir = tempfile::TempDir::new().expect("temp dir");
    let app = dir.path().join("conf");
    let vendor = dir.path().join("vendor/conf");
    fs::create_dir_all(app.join("Cache")).expect("create app root");
    fs::create_dir_all(vendor.join("Cache")).expect("create vendor root");

    fs::write(
        app.join("Cache/default.yaml"),
        "backend: memory\nttl: 60\n",
    )
    .expect("write app defaults");
    fs::write(
        vendor.join("Cache/default.yaml"),
        "backend: redis\nprefix: vendor\n",
    )
    .expect("write vendor defaults");

    let mut tree = ConfigTree::builder()
        .environment("production")
        .search_root(&app)
        .search_root(&vendor)
        .build();
    let root = tree.root();
    let cache = tree.get(root, "Cache")?.section().expect("Cache section");

    println!("resolved Cache section:");
    println!(
        "{}",
        serde_yaml::to_string(&tree.data(cache)?).expect("emit")
    );
    println!("search roots for Cache:");
    for path in tree.search_roots(cache) {
        println!("  {}", path.display());
    }

    Ok(())
}
