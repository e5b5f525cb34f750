// SPDX-License-Identifier: MIT OR Apache-2.0

//! A layered YAML configuration crate with environment overlays and
//! parse-time macros.
//!
//! This crate resolves application configuration from a directory tree of
//! YAML files into an in-memory, lazily populated section tree. Each
//! section level merges a `default` file with an environment override file
//! (`production.yaml`, `staging.yml`, ...) across any number of overlay
//! roots, and a small macro language covers the cross-referencing real
//! configs need: environment variables, filesystem paths, and templated
//! repetition over resolved lists.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Section nodes, handles, and errors
//! - **Ports**: Trait seams for environment lookup and provenance
//! - **Adapters**: File discovery, YAML loading, macro resolution
//! - **Service**: [`ConfigTree`](service::ConfigTree), the tree itself
//!
//! # Layout convention
//!
//! A section named `Db` under root `conf` merges, in order:
//!
//! ```text
//! conf/Db/{*-,}default.{yml,yaml}        always loaded
//! conf/Db/{*-,}<environment>.{yml,yaml}  environment override, wins collisions
//! ```
//!
//! Child names starting with an ASCII-uppercase letter are subsections
//! (directories one level down); all other names are data keys.
//!
//! # Macros
//!
//! - `!env NAME [|| NAME2 || literal]`: first non-null alternative
//! - `!path relative/path`: absolute path under the project root
//! - `!map <path> <template>`: expand a template once per item of a
//!   resolved list, with `!item`, `!item[host]`, `!item[port]` in scope
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use layercfg::prelude::*;
//!
//! # fn main() -> layercfg::domain::Result<()> {
//! let mut tree = ConfigTree::builder()
//!     .environment("production")
//!     .search_root("conf")
//!     .build();
//!
//! let root = tree.root();
//! let db = tree.get(root, "Db")?.section().unwrap();
//! println!("resolved: {:?}", tree.data(db)?);
//! for file in tree.loaded_files() {
//!     println!("read {}", file.display());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for
/// convenient access.
pub mod prelude {
    pub use crate::domain::{is_section_name, ConfigError, Resolved, Result, SectionId};
    pub use crate::ports::{
        EnvProvider, NullSink, ProcessEnv, ProvenanceLog, ProvenanceSink, StaticEnv,
    };
    pub use crate::service::{ConfigTree, ConfigTreeBuilder};
}
