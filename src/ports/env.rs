// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable lookup trait definition.
//!
//! This module defines the `EnvProvider` port consumed by the `!env`
//! macro. The process-backed implementation is what production code uses;
//! the static implementation lets tests exercise `!env` without mutating
//! the process environment, which is not safe under a parallel test
//! harness.

use std::collections::HashMap;

/// A source of environment variable values.
pub trait EnvProvider: Send + Sync + std::fmt::Debug {
    /// Looks up a variable by name. Returns `None` when the variable is
    /// not set or is not valid Unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
///
/// # Examples
///
/// ```
/// use layercfg::ports::{EnvProvider, ProcessEnv};
///
/// let env = ProcessEnv;
/// // PATH is set in any reasonable environment.
/// assert!(env.var("PATH").is_some());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, for tests.
///
/// **Note**: This type is primarily intended for testing. Use
/// [`ProcessEnv`] in production code.
///
/// # Examples
///
/// ```
/// use layercfg::ports::{EnvProvider, StaticEnv};
///
/// let env = StaticEnv::new([("DB_HOST", "localhost")]);
/// assert_eq!(env.var("DB_HOST").as_deref(), Some("localhost"));
/// assert_eq!(env.var("DB_PORT"), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    /// Creates a provider from key/value pairs.
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvProvider for StaticEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
