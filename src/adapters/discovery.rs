// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file and subsection discovery.
//!
//! This module enumerates the YAML files and child-section directories
//! belonging to one section, across a set of overlay roots. Discovery
//! never fails: a missing or unreadable directory simply contributes no
//! matches, and a section with zero matching files is a valid, empty
//! section.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File-name match groups, in merge order.
const DEFAULT_GROUP: u8 = 0;
const ENVIRONMENT_GROUP: u8 = 1;

/// Returns the merge group a file name belongs to, or `None` if the name
/// is not a data file for this environment.
///
/// A name matches when it is exactly `default.yml`, `default.yaml`,
/// `{environment}.yml`, or `{environment}.yaml`, or ends with `-` followed
/// by one of those four names (`10-default.yaml`, `99-production.yml`).
fn file_group(name: &str, environment: &str) -> Option<u8> {
    for (group, stem) in [(DEFAULT_GROUP, "default"), (ENVIRONMENT_GROUP, environment)] {
        for extension in [".yml", ".yaml"] {
            let base = format!("{stem}{extension}");
            if name == base {
                return Some(group);
            }
            if let Some(prefix) = name.strip_suffix(base.as_str()) {
                if prefix.ends_with('-') {
                    return Some(group);
                }
            }
        }
    }
    None
}

/// Enumerates the data files for a section, in merge order.
///
/// The order is an explicit, caller-visible contract rather than an
/// artifact of filesystem enumeration:
///
/// 1. roots are visited in the given overlay order;
/// 2. within one root, every `default` file precedes every environment
///    file, so the environment override always wins a key collision;
/// 3. within each of those two groups, files sort lexicographically by
///    file name.
///
/// Later files in the returned sequence override earlier ones during the
/// shallow merge.
///
/// # Examples
///
/// ```no_run
/// use layercfg::adapters::discovery::data_files;
/// use std::path::PathBuf;
///
/// let roots = vec![PathBuf::from("conf/Db"), PathBuf::from("vendor/conf/Db")];
/// for file in data_files(&roots, "production") {
///     println!("{}", file.display());
/// }
/// ```
pub fn data_files(roots: &[PathBuf], environment: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for root in roots {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::trace!(root = %root.display(), error = %e, "search root not readable");
                continue;
            }
        };
        let mut ranked: Vec<(u8, String)> = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(group) = file_group(name, environment) {
                if entry.path().is_file() {
                    ranked.push((group, name.to_string()));
                }
            }
        }
        ranked.sort();
        files.extend(ranked.into_iter().map(|(_, name)| root.join(name)));
    }
    tracing::trace!(count = files.len(), environment, "discovered data files");
    files
}

/// Enumerates the distinct child-section directory names under a root set.
///
/// A subdirectory counts only when it contains at least one matching data
/// file for this environment. Names are deduplicated across roots and
/// returned sorted. This enumeration serves tree walking and presentation;
/// lazy access works by name regardless of whether the directory was
/// listed here.
pub fn child_section_names(roots: &[PathBuf], environment: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for root in roots {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if names.contains(name) {
                continue;
            }
            if has_data_file(&path, environment) {
                names.insert(name.to_string());
            }
        }
    }
    names.into_iter().collect()
}

/// Whether a directory directly contains at least one data file.
fn has_data_file(dir: &Path, environment: &str) -> bool {
    match fs::read_dir(dir) {
        Ok(entries) => entries.flatten().any(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| file_group(name, environment).is_some())
                && entry.path().is_file()
        }),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "key: value\n").unwrap();
    }

    #[test]
    fn test_file_group_exact_names() {
        assert_eq!(file_group("default.yml", "production"), Some(0));
        assert_eq!(file_group("default.yaml", "production"), Some(0));
        assert_eq!(file_group("production.yml", "production"), Some(1));
        assert_eq!(file_group("production.yaml", "production"), Some(1));
    }

    #[test]
    fn test_file_group_hyphen_prefixed() {
        assert_eq!(file_group("10-default.yaml", "production"), Some(0));
        assert_eq!(file_group("99-production.yml", "production"), Some(1));
        // The prefix must end with a hyphen.
        assert_eq!(file_group("xdefault.yaml", "production"), None);
    }

    #[test]
    fn test_file_group_rejects_other_names() {
        assert_eq!(file_group("staging.yaml", "production"), None);
        assert_eq!(file_group("default.json", "production"), None);
        assert_eq!(file_group("default.yml.bak", "production"), None);
        assert_eq!(file_group("README.md", "production"), None);
    }

    #[test]
    fn test_data_files_merge_order_within_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "production.yaml");
        touch(root, "default.yaml");
        touch(root, "10-default.yml");
        touch(root, "20-production.yaml");
        touch(root, "unrelated.yaml");

        let files = data_files(&[root.to_path_buf()], "production");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "10-default.yml",
                "default.yaml",
                "20-production.yaml",
                "production.yaml",
            ]
        );
    }

    #[test]
    fn test_data_files_overlay_root_order() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        touch(a.path(), "default.yaml");
        touch(b.path(), "default.yaml");

        let roots = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        let files = data_files(&roots, "production");
        assert_eq!(files.len(), 2);
        assert!(files[0].starts_with(a.path()));
        assert!(files[1].starts_with(b.path()));
    }

    #[test]
    fn test_data_files_missing_root_is_empty() {
        let files = data_files(&[PathBuf::from("/nonexistent/layercfg")], "production");
        assert!(files.is_empty());
    }

    #[test]
    fn test_data_files_ignores_matching_directory_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("default.yaml")).unwrap();
        let files = data_files(&[dir.path().to_path_buf()], "production");
        assert!(files.is_empty());
    }

    #[test]
    fn test_child_section_names_requires_data_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("Db")).unwrap();
        touch(&root.join("Db"), "default.yaml");
        fs::create_dir(root.join("Empty")).unwrap();
        fs::create_dir(root.join("Redis")).unwrap();
        touch(&root.join("Redis"), "production.yml");

        let names = child_section_names(&[root.to_path_buf()], "production");
        assert_eq!(names, vec!["Db".to_string(), "Redis".to_string()]);
    }

    #[test]
    fn test_child_section_names_dedup_across_roots() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        for root in [a.path(), b.path()] {
            fs::create_dir(root.join("Db")).unwrap();
            touch(&root.join("Db"), "default.yaml");
        }
        let roots = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        assert_eq!(child_section_names(&roots, "dev"), vec!["Db".to_string()]);
    }
}
