// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer facing the filesystem and the YAML parser.
//!
//! This module contains the code that touches the outside world: file and
//! subsection discovery over `std::fs`, document loading with syntax-error
//! remapping, and the macro resolver that rewrites custom tags during
//! section construction.

pub mod discovery;
pub(crate) mod tags;
pub mod yaml;
