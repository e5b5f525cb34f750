// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the configuration tree.
//!
//! This module contains [`ConfigTree`], the main entry point of the crate,
//! and its builder.

pub mod tree;

// Re-export commonly used types
pub use tree::{ConfigTree, ConfigTreeBuilder};
