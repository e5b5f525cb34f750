// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML document loading and syntax-error remapping.
//!
//! This module reads one configuration file into a generic
//! [`serde_yaml::Value`] and rewrites parse failures so they point at the
//! file being loaded. The parser itself only knows about the string it was
//! handed; the call site here knows the path, so a located failure becomes
//! a new [`ConfigError::YamlSyntax`] with the original error chained as its
//! source. Nothing is ever mutated on an already-constructed error.

use crate::domain::{ConfigError, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Reads and parses a configuration file.
///
/// An unreadable file is [`ConfigError::UnreadableFile`]; a syntax error is
/// remapped via [`remap_parse_error`].
pub fn read_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::UnreadableFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_document(path, &content)
}

/// Parses the first YAML document of `content`.
///
/// An empty or comment-only file parses as null, which contributes nothing
/// to a section merge. Only the first document of a multi-document stream
/// is consulted.
///
/// # Examples
///
/// ```
/// use layercfg::adapters::yaml::parse_document;
/// use std::path::Path;
///
/// let value = parse_document(Path::new("inline.yaml"), "port: 5432").unwrap();
/// assert_eq!(value["port"], serde_yaml::Value::from(5432));
/// ```
pub fn parse_document(path: &Path, content: &str) -> Result<Value> {
    let mut documents = serde_yaml::Deserializer::from_str(content);
    match documents.next() {
        None => Ok(Value::Null),
        Some(document) => {
            Value::deserialize(document).map_err(|e| remap_parse_error(path, e))
        }
    }
}

/// Rewrites a raw parser error against the file being parsed.
///
/// When the parser reports a location, the result is
/// [`ConfigError::YamlSyntax`] carrying `path` plus that line and column,
/// with the original error as the source. Without a location the original
/// error propagates wrapped only with the file path; error handling here
/// never raises a failure of its own.
pub fn remap_parse_error(path: &Path, error: serde_yaml::Error) -> ConfigError {
    match error.location() {
        Some(location) => ConfigError::YamlSyntax {
            file: path.to_path_buf(),
            line: location.line(),
            column: location.column(),
            message: strip_location_suffix(&error.to_string()),
            source: Box::new(error),
        },
        None => ConfigError::Parse {
            file: path.to_path_buf(),
            source: Box::new(error),
        },
    }
}

/// Drops the parser's trailing `at line L column C` clause; the remapped
/// error restates the location itself.
fn strip_location_suffix(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
