// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) for the engine's
//! external collaborators: environment variable lookup for the `!env`
//! macro and the provenance sink that records loaded files.

pub mod env;
pub mod provenance;

// Re-export commonly used types
pub use env::{EnvProvider, ProcessEnv, StaticEnv};
pub use provenance::{NullSink, ProvenanceLog, ProvenanceSink};
