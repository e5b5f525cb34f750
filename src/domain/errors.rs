// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration engine.
//!
//! This module defines the error types that can occur while discovering,
//! parsing, and resolving layered configuration files. All errors use
//! `thiserror` for proper error handling and source chaining.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for configuration operations.
///
/// This enum represents all possible failures while building the section
/// tree or evaluating macros. It is marked as `#[non_exhaustive]` to allow
/// for future additions without breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use layercfg::domain::errors::ConfigError;
///
/// let err = ConfigError::UnresolvedMapPath {
///     path: "Db/hosts".to_string(),
///     segment: "hosts".to_string(),
///     reason: "key not found".to_string(),
/// };
/// assert!(err.to_string().contains("Db/hosts"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A matched configuration file exists but could not be read.
    ///
    /// Fatal to section construction; the partially built section is
    /// discarded and the error propagates to the original caller.
    #[error("unable to read configuration file: {}", path.display())]
    UnreadableFile {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A YAML document failed to parse and the parser reported a location.
    ///
    /// The location is remapped to the file being loaded; the raw parser
    /// error is chained as the source.
    #[error("{message} ({}, line {line}, column {column})", file.display())]
    YamlSyntax {
        /// The file that failed to parse.
        file: PathBuf,
        /// 1-based line of the syntax error within `file`.
        line: usize,
        /// 1-based column of the syntax error within `file`.
        column: usize,
        /// The parser's reason, without its location suffix.
        message: String,
        /// The original parser error.
        #[source]
        source: Box<serde_yaml::Error>,
    },

    /// A YAML document failed to parse without usable location info.
    ///
    /// The original error is surfaced unmodified apart from naming the file.
    #[error("failed to parse {}", file.display())]
    Parse {
        /// The file that failed to parse.
        file: PathBuf,
        /// The original parser error.
        #[source]
        source: Box<serde_yaml::Error>,
    },

    /// A `!map` path expression could not be walked to completion.
    #[error("!map: cannot reach path '{path}': {reason} at segment '{segment}'")]
    UnresolvedMapPath {
        /// The full `/`-separated path expression.
        path: String,
        /// The segment at which the walk stopped.
        segment: String,
        /// Why the segment could not be resolved.
        reason: String,
    },

    /// A macro invocation was malformed.
    #[error("!{tag}: {message}")]
    Macro {
        /// The macro tag, without the leading `!`.
        tag: String,
        /// What was wrong with the invocation.
        message: String,
    },

    /// Resolved section data did not match the requested Rust type.
    #[error("section '{section}' does not match the requested type")]
    Typed {
        /// The `/`-joined path of the section being converted.
        section: String,
        /// The underlying deserialization error.
        #[source]
        source: Box<serde_yaml::Error>,
    },

    /// A macro cross-reference re-entered a section that is still loading.
    #[error("circular reference while loading section '{path}'")]
    SectionCycle {
        /// The `/`-joined section path that was re-entered.
        path: String,
    },

    /// The OS-specific default configuration directory is unavailable.
    #[error("unable to determine the default configuration directory")]
    DefaultLocation,
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_unreadable_file_display() {
        let err = ConfigError::UnreadableFile {
            path: PathBuf::from("conf/Db/default.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(
            err.to_string(),
            "unable to read configuration file: conf/Db/default.yaml"
        );
    }

    #[test]
    fn test_yaml_syntax_display_names_file_and_location() {
        let inner = serde_yaml::from_str::<serde_yaml::Value>("a: b: c").unwrap_err();
        let err = ConfigError::YamlSyntax {
            file: PathBuf::from("conf/Db/default.yaml"),
            line: 4,
            column: 7,
            message: "mapping values are not allowed in this context".to_string(),
            source: Box::new(inner),
        };
        let text = err.to_string();
        assert!(text.contains("conf/Db/default.yaml"));
        assert!(text.contains("line 4"));
        assert!(text.contains("column 7"));
    }

    #[test]
    fn test_yaml_syntax_chains_source() {
        use std::error::Error;

        let inner = serde_yaml::from_str::<serde_yaml::Value>("a: b: c").unwrap_err();
        let err = ConfigError::YamlSyntax {
            file: Path::new("x.yaml").to_path_buf(),
            line: 1,
            column: 4,
            message: "mapping values are not allowed in this context".to_string(),
            source: Box::new(inner),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unresolved_map_path_display() {
        let err = ConfigError::UnresolvedMapPath {
            path: "Db/hosts".to_string(),
            segment: "hosts".to_string(),
            reason: "key not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "!map: cannot reach path 'Db/hosts': key not found at segment 'hosts'"
        );
    }

    #[test]
    fn test_macro_display() {
        let err = ConfigError::Macro {
            tag: "map".to_string(),
            message: "missing template argument".to_string(),
        };
        assert_eq!(err.to_string(), "!map: missing template argument");
    }

    #[test]
    fn test_section_cycle_display() {
        let err = ConfigError::SectionCycle {
            path: "Servers".to_string(),
        };
        assert!(err.to_string().contains("Servers"));
    }
}
