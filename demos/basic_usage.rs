// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the layered configuration crate.
//!
//! This example demonstrates:
//! - Building a configuration tree over a directory of YAML files
//! - Environment override files winning key collisions
//! - The `!env`, `!path`, and `!map` macros
//! - Inspecting the provenance record of loaded files
//!
//! To run this example:
//! ```bash
//! cargo run --example basic_usage
//! ```

use layercfg::prelude::*;
use std::fs;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== layercfg: Basic Usage ===\n");

    // Lay out a small configuration tree in a temporary directory.
    let dir = tempfile::TempDir::new().expect("temp dir");
    let conf = dir.path().join("conf");
    fs::create_dir_all(conf.join("Db")).expect("create conf/Db");

    fs::write(
        conf.join("default.yaml"),
        "app_name: demo\nhosts: [\"db01:5432\", \"db02\"]\n",
    )
    .expect("write conf/default.yaml");
    fs::write(
        conf.join("Db").join("default.yaml"),
        concat!(
            "host: !env DB_HOST || localhost\n",
            "socket: !path run/db.sock\n",
            "pool: !map 'hosts {host: !item[host], port: !item[port] 5432}'\n",
            "debug: true\n",
        ),
    )
    .expect("write conf/Db/default.yaml");
    fs::write(conf.join("Db").join("production.yaml"), "debug: false\n")
        .expect("write conf/Db/production.yaml");

    let mut tree = ConfigTree::builder()
        .environment("production")
        .search_root(&conf)
        .project_root(dir.path())
        .build();
    let root = tree.root();

    // Example 1: uppercase names are sections, lowercase names are data.
    println!("--- Example 1: Navigation ---");
    let db = tree.get(root, "Db")?.section().expect("Db is a section");
    if let Resolved::Value(host) = tree.get(db, "host")? {
        println!("Db/host resolved to {host:?}");
    }

    // Example 2: the production override wins the `debug` collision.
    println!("\n--- Example 2: Environment override ---");
    println!("Db/debug = {:?}", tree.get(db, "debug")?);

    // Example 3: the !map macro expanded one list into structured blocks.
    println!("\n--- Example 3: Templated repetition ---");
    if let Resolved::Value(pool) = tree.get(db, "pool")? {
        println!("Db/pool = {}", serde_yaml::to_string(&pool).expect("emit"));
    }

    // Example 4: provenance of everything read so far, in read order.
    println!("--- Example 4: Provenance ---");
    for file in tree.loaded_files() {
        println!("loaded {}", file.display());
    }

    Ok(())
}
