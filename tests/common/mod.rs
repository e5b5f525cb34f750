// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixture helpers for the integration suites.

use layercfg::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A temporary on-disk configuration layout.
///
/// Files are written relative to the fixture directory; trees built from
/// it search `conf/` inside it and resolve `!path` against it.
pub struct Fixture {
    dir: TempDir,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        Fixture {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Writes a file under the fixture directory, creating parents.
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A tree over `conf/` inside the fixture, for the given environment.
    pub fn tree(&self, environment: &str) -> ConfigTree {
        ConfigTree::builder()
            .environment(environment)
            .search_root(self.dir.path().join("conf"))
            .project_root(self.dir.path())
            .build()
    }

    /// Same as [`tree`](Self::tree) but with a fixed set of environment
    /// variables instead of the process environment.
    pub fn tree_with_env(&self, environment: &str, vars: &[(&str, &str)]) -> ConfigTree {
        ConfigTree::builder()
            .environment(environment)
            .search_root(self.dir.path().join("conf"))
            .project_root(self.dir.path())
            .env_provider(StaticEnv::new(vars.iter().copied()))
            .build()
    }
}
