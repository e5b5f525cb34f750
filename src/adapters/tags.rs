// SPDX-License-Identifier: MIT OR Apache-2.0

//! Macro (custom tag) resolution.
//!
//! Three macros are recognized in configuration documents:
//!
//! - `!path <relative>`: the tree's project root joined with the argument,
//!   leading slashes stripped.
//! - `!env A [|| B ...]`: the first alternative that resolves to a
//!   non-null value. Alternatives starting with an ASCII letter are
//!   environment variable names; anything else is parsed as a YAML scalar
//!   literal, so `!env MY_PORT || 5432` falls back to the integer 5432.
//! - `!map <path> <template>`: resolves `<path>` from the root of the
//!   tree and expands `<template>` once per item of the result, with the
//!   item-scoped tags `!item`, `!item[host]`, and `!item[port]` available
//!   inside the template.
//!
//! The parser surfaces custom tags as [`Value::Tagged`] nodes, so
//! resolution is a post-parse walk over each document. Unknown tags pass
//! through untouched; the engine is not a schema validator.

use crate::adapters::yaml;
use crate::domain::{ConfigError, Result};
use crate::service::tree::{ConfigTree, PathTarget};
use serde_yaml::value::TaggedValue;
use serde_yaml::Value;
use std::path::Path;

/// Resolves every macro tag in a parsed document.
///
/// `file` is the configuration file the document came from; nested parse
/// failures (an `!env` literal, a `!map` template) are remapped against it.
pub(crate) fn resolve_document(tree: &mut ConfigTree, file: &Path, value: Value) -> Result<Value> {
    match value {
        Value::Tagged(tagged) => resolve_macro(tree, file, *tagged),
        Value::Mapping(map) => map
            .into_iter()
            .map(|(key, value)| Ok((key, resolve_document(tree, file, value)?)))
            .collect::<Result<serde_yaml::Mapping>>()
            .map(Value::Mapping),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|value| resolve_document(tree, file, value))
            .collect::<Result<Vec<Value>>>()
            .map(Value::Sequence),
        other => Ok(other),
    }
}

fn resolve_macro(tree: &mut ConfigTree, file: &Path, tagged: TaggedValue) -> Result<Value> {
    if tagged.tag == "env" {
        resolve_env(tree, file, &tagged.value)
    } else if tagged.tag == "path" {
        resolve_path(tree, &tagged.value)
    } else if tagged.tag == "map" {
        resolve_map(tree, file, &tagged.value)
    } else {
        Ok(Value::Tagged(Box::new(tagged)))
    }
}

fn string_arg<'v>(tag: &str, value: &'v Value) -> Result<&'v str> {
    value.as_str().ok_or_else(|| ConfigError::Macro {
        tag: tag.to_string(),
        message: "argument must be a string scalar".to_string(),
    })
}

/// `!env`: alternatives split on `||`, evaluated left to right.
///
/// An unset or empty environment variable does not resolve; a `null`
/// literal does not resolve. All alternatives failing yields null, which
/// callers must tolerate.
fn resolve_env(tree: &ConfigTree, file: &Path, arg: &Value) -> Result<Value> {
    let arg = string_arg("env", arg)?;
    for alternative in arg.split("||") {
        let alternative = alternative.trim();
        let first = alternative.chars().next();
        let resolved = if first.is_some_and(|c| c.is_ascii_alphabetic()) {
            tree.env_var(alternative)
                .filter(|value| !value.is_empty())
                .map(Value::String)
        } else if alternative.is_empty() {
            None
        } else {
            match serde_yaml::from_str::<Value>(alternative)
                .map_err(|e| yaml::remap_parse_error(file, e))?
            {
                Value::Null => None,
                value => Some(value),
            }
        };
        if let Some(value) = resolved {
            return Ok(value);
        }
    }
    Ok(Value::Null)
}

/// `!path`: project root + `/` + argument with leading slashes stripped.
fn resolve_path(tree: &ConfigTree, arg: &Value) -> Result<Value> {
    let arg = string_arg("path", arg)?;
    let joined = tree.project_root().join(arg.trim_start_matches('/'));
    Ok(Value::String(joined.to_string_lossy().into_owned()))
}

/// `!map`: walk a `/`-separated path from the tree root, then expand the
/// template once per item of the result, in source order.
fn resolve_map(tree: &mut ConfigTree, file: &Path, arg: &Value) -> Result<Value> {
    let arg = string_arg("map", arg)?.to_string();
    let mut parts = arg.splitn(2, char::is_whitespace);
    let path_expr = parts.next().unwrap_or("").to_string();
    let template = parts.next().map(str::trim_start).unwrap_or("").to_string();
    if path_expr.is_empty() || template.is_empty() {
        return Err(ConfigError::Macro {
            tag: "map".to_string(),
            message: "expected '<path> <template>' arguments".to_string(),
        });
    }

    let items: Vec<Value> = match tree.walk_path(&path_expr)? {
        PathTarget::Value(Value::Sequence(seq)) => seq,
        PathTarget::Value(Value::Mapping(map)) => map.into_iter().map(|(_, v)| v).collect(),
        PathTarget::Value(_) | PathTarget::Section(_) => {
            let segment = path_expr.rsplit('/').next().unwrap_or(&path_expr).to_string();
            return Err(ConfigError::UnresolvedMapPath {
                path: path_expr,
                segment,
                reason: "resolved value is not iterable".to_string(),
            });
        }
    };

    let parsed_template = yaml::parse_document(file, &template)?;
    let mut expanded = Vec::with_capacity(items.len());
    for item in &items {
        expanded.push(resolve_item_tags(parsed_template.clone(), item)?);
    }
    Ok(Value::Sequence(expanded))
}

/// Resolves the item-scoped tags available inside a `!map` template.
fn resolve_item_tags(value: Value, item: &Value) -> Result<Value> {
    match value {
        Value::Tagged(tagged) => {
            if tagged.tag == "item" {
                Ok(item.clone())
            } else if tagged.tag == "item[host]" {
                Ok(Value::String(item_host(item)?))
            } else if tagged.tag == "item[port]" {
                item_port(item, &tagged.value)
            } else {
                Ok(Value::Tagged(tagged))
            }
        }
        Value::Mapping(map) => map
            .into_iter()
            .map(|(key, value)| Ok((key, resolve_item_tags(value, item)?)))
            .collect::<Result<serde_yaml::Mapping>>()
            .map(Value::Mapping),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|value| resolve_item_tags(value, item))
            .collect::<Result<Vec<Value>>>()
            .map(Value::Sequence),
        other => Ok(other),
    }
}

fn item_string(tag: &str, item: &Value) -> Result<String> {
    match item.as_str() {
        Some(s) => Ok(s.to_string()),
        None => Err(ConfigError::Macro {
            tag: tag.to_string(),
            message: "item is not a string".to_string(),
        }),
    }
}

/// `!item[host]`: the item substring before the first `:`, or the whole
/// item when it has none.
fn item_host(item: &Value) -> Result<String> {
    let item = item_string("item[host]", item)?;
    Ok(item.split(':').next().unwrap_or(&item).to_string())
}

/// `!item[port] [default]`: the substring after the first `:` parsed as an
/// integer, or the supplied default when the item has no `:`.
fn item_port(item: &Value, default: &Value) -> Result<Value> {
    let item = item_string("item[port]", item)?;
    match item.split_once(':') {
        Some((_, port)) => {
            let port: i64 = port.trim().parse().map_err(|_| ConfigError::Macro {
                tag: "item[port]".to_string(),
                message: format!("'{port}' is not an integer"),
            })?;
            Ok(Value::from(port))
        }
        None => Ok(integer_default(default)),
    }
}

/// Coerces the `!item[port]` default to an integer; a missing or
/// non-numeric default is 0.
fn integer_default(default: &Value) -> Value {
    match default {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::from(n.as_f64().unwrap_or(0.0) as i64),
        },
        Value::String(s) => Value::from(s.trim().parse::<i64>().unwrap_or(0)),
        _ => Value::from(0),
    }
}
