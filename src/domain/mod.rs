// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types for the section tree.
//!
//! This module contains the fundamental concepts of the configuration
//! engine: section nodes and handles, the name-dispatch rule, and the
//! error types. It is independent of filesystem and parser concerns.

pub mod errors;
pub mod section;

// Re-export commonly used types
pub use errors::{ConfigError, Result};
pub use section::{is_section_name, Resolved, SectionId};
