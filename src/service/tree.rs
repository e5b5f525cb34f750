// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration tree service.
//!
//! This module provides [`ConfigTree`], the owner of the section arena and
//! the orchestrator of lazy section construction: on the first access of a
//! child name, the matching YAML files are discovered across every overlay
//! root, parsed with macro resolution bound, shallow-merged in discovery
//! order, and memoized. Subsequent accesses return the cached node and do
//! no I/O.
//!
//! The tree is single-threaded by construction: every lazy accessor takes
//! `&mut self`, so the memoizing read-with-side-effect is serialized by the
//! borrow checker. Callers that need cross-thread access wrap the tree in
//! their own mutex.

use crate::adapters::{discovery, tags, yaml};
use crate::domain::section::{is_section_name, LoadState, Resolved, Section, SectionId};
use crate::domain::{ConfigError, Result};
use crate::ports::{EnvProvider, NullSink, ProcessEnv, ProvenanceLog, ProvenanceSink};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Default base for `!path` when the builder is not given one.
static DEFAULT_PROJECT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

/// A lazily populated tree of configuration sections.
///
/// Each section corresponds to one directory level under every overlay
/// root; its data is the shallow merge of the matching `default` and
/// environment files, later files winning key collisions. The three macros
/// `!env`, `!path`, and `!map` are resolved during loading.
///
/// # Examples
///
/// ```no_run
/// use layercfg::prelude::*;
///
/// # fn main() -> layercfg::domain::Result<()> {
/// let mut tree = ConfigTree::builder()
///     .environment("production")
///     .search_root("conf")
///     .search_root("vendor/conf")
///     .build();
///
/// let root = tree.root();
/// if let Resolved::Section(db) = tree.get(root, "Db")? {
///     if let Resolved::Value(host) = tree.get(db, "host")? {
///         println!("database host: {:?}", host);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigTree {
    /// Section arena; index 0 is the root.
    arena: Vec<Section>,
    environment: String,
    project_root: PathBuf,
    env: Box<dyn EnvProvider>,
    provenance: Box<dyn ProvenanceSink>,
}

/// Where a `/`-separated path walk ended up.
#[derive(Debug)]
pub(crate) enum PathTarget {
    Section(SectionId),
    Value(Value),
}

impl ConfigTree {
    /// Creates a tree builder.
    pub fn builder() -> ConfigTreeBuilder {
        ConfigTreeBuilder::new()
    }

    /// Creates a tree rooted at the OS-appropriate configuration directory
    /// for an application.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use layercfg::service::ConfigTree;
    ///
    /// let tree = ConfigTree::from_default_location("myapp", "com.example", "production").unwrap();
    /// ```
    pub fn from_default_location(
        app_name: &str,
        qualifier: &str,
        environment: &str,
    ) -> Result<Self> {
        let dirs =
            ProjectDirs::from(qualifier, "", app_name).ok_or(ConfigError::DefaultLocation)?;
        Ok(Self::builder()
            .environment(environment)
            .search_root(dirs.config_dir())
            .build())
    }

    /// The root section handle.
    pub fn root(&self) -> SectionId {
        SectionId(0)
    }

    /// The active environment name, identical for every section.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// The base directory `!path` resolves against.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Every file read so far, in read order, across the whole tree.
    ///
    /// Empty when the tree was built with a null provenance sink.
    pub fn loaded_files(&self) -> &[PathBuf] {
        self.provenance.files()
    }

    /// The directories this section is searched in, one per overlay root.
    pub fn search_roots(&self, id: SectionId) -> &[PathBuf] {
        &self.arena[id.0].search_roots
    }

    /// The section's own name; empty for the root.
    pub fn name(&self, id: SectionId) -> &str {
        &self.arena[id.0].name
    }

    /// The owning section, or `None` for the root.
    pub fn parent(&self, id: SectionId) -> Option<SectionId> {
        self.arena[id.0].parent
    }

    /// The `/`-joined names from the root down to this section.
    pub fn section_path(&self, id: SectionId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cursor) = current {
            let section = &self.arena[cursor.0];
            if section.parent.is_some() {
                parts.push(section.name.as_str());
            }
            current = section.parent;
        }
        parts.reverse();
        parts.join("/")
    }

    /// Looks `name` up on a section.
    ///
    /// A name starting with an ASCII-uppercase letter is always a child
    /// section: the child is created and memoized on first access and the
    /// same handle is returned ever after. Any other name is a data key,
    /// resolving to its value, or to [`Resolved::Missing`] (never an
    /// error) when undeclared.
    pub fn get(&mut self, id: SectionId, name: &str) -> Result<Resolved> {
        if is_section_name(name) {
            Ok(Resolved::Section(self.materialize_child(id, name)?))
        } else {
            self.ensure_loaded(id)?;
            match self.arena[id.0].data.get(name) {
                Some(value) => Ok(Resolved::Value(value.clone())),
                None => Ok(Resolved::Missing),
            }
        }
    }

    /// Overwrites a data key directly. Files on disk are not affected.
    pub fn set(&mut self, id: SectionId, name: &str, value: impl Into<Value>) -> Result<()> {
        self.ensure_loaded(id)?;
        self.arena[id.0]
            .data
            .insert(Value::String(name.to_string()), value.into());
        Ok(())
    }

    /// A snapshot of this section's resolved key/value data.
    pub fn data(&mut self, id: SectionId) -> Result<Mapping> {
        self.ensure_loaded(id)?;
        Ok(self.arena[id.0].data.clone())
    }

    /// Deserializes this section's resolved data into a typed value.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use layercfg::prelude::*;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct DbSettings {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// # fn main() -> layercfg::domain::Result<()> {
    /// let mut tree = ConfigTree::builder().search_root("conf").build();
    /// let root = tree.root();
    /// let db = tree.get(root, "Db")?.section().unwrap();
    /// let settings: DbSettings = tree.to_typed(db)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_typed<T: DeserializeOwned>(&mut self, id: SectionId) -> Result<T> {
        self.ensure_loaded(id)?;
        let value = Value::Mapping(self.arena[id.0].data.clone());
        serde_yaml::from_value(value).map_err(|e| ConfigError::Typed {
            section: self.section_path(id),
            source: Box::new(e),
        })
    }

    /// Whether this section resolved to any data at all.
    ///
    /// A section with zero matching files exists in the tree but is empty,
    /// and reports `false` here.
    pub fn exists(&mut self, id: SectionId) -> Result<bool> {
        self.ensure_loaded(id)?;
        Ok(!self.arena[id.0].data.is_empty())
    }

    /// The discovered child-section names under this section, sorted.
    ///
    /// Enumeration only; lazy access by name works regardless of whether
    /// the name appears here.
    pub fn child_section_names(&self, id: SectionId) -> Vec<String> {
        discovery::child_section_names(&self.arena[id.0].search_roots, &self.environment)
    }

    /// Walks a `/`-separated path from the root.
    ///
    /// Each segment is resolved with the same uppercase dispatch as
    /// [`get`](Self::get); segments landing inside a value index into
    /// mappings by key and sequences by number. A missing key anywhere
    /// along the way yields [`Resolved::Missing`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use layercfg::prelude::*;
    ///
    /// # fn main() -> layercfg::domain::Result<()> {
    /// let mut tree = ConfigTree::builder().search_root("conf").build();
    /// match tree.lookup("Db/hosts/0")? {
    ///     Resolved::Value(first_host) => println!("{first_host:?}"),
    ///     _ => println!("not configured"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup(&mut self, path: &str) -> Result<Resolved> {
        let mut current = Resolved::Section(self.root());
        for segment in path.split('/') {
            current = match current {
                Resolved::Section(id) => self.get(id, segment)?,
                Resolved::Value(value) => match index_value(&value, segment) {
                    Some(inner) => Resolved::Value(inner.clone()),
                    None => Resolved::Missing,
                },
                Resolved::Missing => Resolved::Missing,
            };
        }
        Ok(current)
    }

    /// Strict variant of [`lookup`](Self::lookup) used by `!map`: any
    /// unresolvable segment is an error naming that segment.
    pub(crate) fn walk_path(&mut self, expr: &str) -> Result<PathTarget> {
        let mut current = PathTarget::Section(self.root());
        for segment in expr.split('/') {
            current = match current {
                PathTarget::Section(id) => match self.get(id, segment)? {
                    Resolved::Section(child) => PathTarget::Section(child),
                    Resolved::Value(value) => PathTarget::Value(value),
                    Resolved::Missing => {
                        return Err(unresolved(expr, segment, "key not found"));
                    }
                },
                PathTarget::Value(Value::Mapping(map)) => match map.get(segment) {
                    Some(value) => PathTarget::Value(value.clone()),
                    None => return Err(unresolved(expr, segment, "key not found")),
                },
                PathTarget::Value(Value::Sequence(seq)) => {
                    let index: usize = segment
                        .parse()
                        .map_err(|_| unresolved(expr, segment, "expected a numeric index"))?;
                    match seq.into_iter().nth(index) {
                        Some(value) => PathTarget::Value(value),
                        None => return Err(unresolved(expr, segment, "index out of bounds")),
                    }
                }
                PathTarget::Value(_) => {
                    return Err(unresolved(expr, segment, "value is not indexable"));
                }
            };
        }
        Ok(current)
    }

    pub(crate) fn env_var(&self, name: &str) -> Option<String> {
        self.env.var(name)
    }

    /// Returns the memoized child, creating and loading it on first access.
    fn materialize_child(&mut self, parent: SectionId, name: &str) -> Result<SectionId> {
        if let Some(&child) = self.arena[parent.0].children.get(name) {
            self.ensure_loaded(child)?;
            return Ok(child);
        }

        let roots: Vec<PathBuf> = self.arena[parent.0]
            .search_roots
            .iter()
            .map(|root| root.join(name))
            .collect();
        let child = SectionId(self.arena.len());
        self.arena
            .push(Section::new(name.to_string(), Some(parent), roots));
        self.arena[parent.0].children.insert(name.to_string(), child);

        if let Err(e) = self.ensure_loaded(child) {
            // No partially built section is cached; the next access
            // starts over with a fresh node.
            self.arena[parent.0].children.remove(name);
            return Err(e);
        }
        Ok(child)
    }

    fn ensure_loaded(&mut self, id: SectionId) -> Result<()> {
        match self.arena[id.0].state {
            LoadState::Loaded => Ok(()),
            LoadState::Loading => Err(ConfigError::SectionCycle {
                path: self.section_path(id),
            }),
            LoadState::Pending => {
                self.arena[id.0].state = LoadState::Loading;
                match self.load_data(id) {
                    Ok(data) => {
                        let section = &mut self.arena[id.0];
                        section.data = data;
                        section.state = LoadState::Loaded;
                        Ok(())
                    }
                    Err(e) => {
                        self.arena[id.0].state = LoadState::Pending;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Discovers, parses, and shallow-merges this section's data files.
    fn load_data(&mut self, id: SectionId) -> Result<Mapping> {
        let roots = self.arena[id.0].search_roots.clone();
        let files = discovery::data_files(&roots, &self.environment);
        tracing::debug!(
            section = %self.section_path(id),
            files = files.len(),
            "materializing section"
        );

        let mut data = Mapping::new();
        for file in files {
            // Recorded before parsing: a file that fails to parse is
            // still part of the provenance record.
            self.provenance.record(&file);
            let document = yaml::read_document(&file)?;
            let document = tags::resolve_document(self, &file, document)?;
            match document {
                Value::Mapping(map) => {
                    tracing::debug!(file = %file.display(), keys = map.len(), "merging file");
                    for (key, value) in map {
                        data.insert(key, value);
                    }
                }
                Value::Null => {}
                other => {
                    tracing::warn!(
                        file = %file.display(),
                        "ignoring non-mapping document ({})",
                        value_kind(&other)
                    );
                }
            }
        }
        Ok(data)
    }
}

fn index_value<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Mapping(map) => map.get(segment),
        Value::Sequence(seq) => segment.parse::<usize>().ok().and_then(|i| seq.get(i)),
        _ => None,
    }
}

fn unresolved(path: &str, segment: &str, reason: &str) -> ConfigError {
    ConfigError::UnresolvedMapPath {
        path: path.to_string(),
        segment: segment.to_string(),
        reason: reason.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

/// Builder for a [`ConfigTree`].
///
/// # Examples
///
/// ```
/// use layercfg::prelude::*;
///
/// let tree = ConfigTree::builder()
///     .environment("staging")
///     .search_root("conf")
///     .without_provenance()
///     .build();
/// assert_eq!(tree.environment(), "staging");
/// ```
#[derive(Debug)]
pub struct ConfigTreeBuilder {
    environment: String,
    search_roots: Vec<PathBuf>,
    project_root: Option<PathBuf>,
    env: Box<dyn EnvProvider>,
    provenance: Box<dyn ProvenanceSink>,
}

impl ConfigTreeBuilder {
    /// Creates a builder with the `development` environment, no search
    /// roots, the process environment, and a recording provenance log.
    pub fn new() -> Self {
        Self {
            environment: "development".to_string(),
            search_roots: Vec::new(),
            project_root: None,
            env: Box::new(ProcessEnv),
            provenance: Box::new(ProvenanceLog::new()),
        }
    }

    /// Sets the environment name that selects override files.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Appends an overlay root. Roots are searched in the order given;
    /// files from later roots override files from earlier ones.
    pub fn search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_roots.push(root.into());
        self
    }

    /// Sets the base directory for `!path`. Defaults to the process
    /// working directory at first use.
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Replaces the environment variable source consulted by `!env`.
    pub fn env_provider(mut self, provider: impl EnvProvider + 'static) -> Self {
        self.env = Box::new(provider);
        self
    }

    /// Replaces the provenance sink.
    pub fn provenance(mut self, sink: impl ProvenanceSink + 'static) -> Self {
        self.provenance = Box::new(sink);
        self
    }

    /// Disables provenance tracking entirely.
    pub fn without_provenance(mut self) -> Self {
        self.provenance = Box::new(NullSink);
        self
    }

    /// Builds the tree. No I/O happens until a section is accessed.
    pub fn build(self) -> ConfigTree {
        let root = Section::new(String::new(), None, self.search_roots);
        ConfigTree {
            arena: vec![root],
            environment: self.environment,
            project_root: self
                .project_root
                .unwrap_or_else(|| DEFAULT_PROJECT_ROOT.clone()),
            env: self.env,
            provenance: self.provenance,
        }
    }
}

impl Default for ConfigTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn tree_over(dir: &TempDir) -> ConfigTree {
        ConfigTree::builder()
            .environment("production")
            .search_root(dir.path())
            .build()
    }

    #[test]
    fn test_child_access_is_memoized() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Db/default.yaml", "host: localhost\n");
        let mut tree = tree_over(&dir);
        let root = tree.root();

        let first = tree.get(root, "Db").unwrap().section().unwrap();
        let second = tree.get(root, "Db").unwrap().section().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_is_visible_through_other_handle() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Db/default.yaml", "host: localhost\n");
        let mut tree = tree_over(&dir);
        let root = tree.root();

        let a = tree.get(root, "Db").unwrap().section().unwrap();
        let b = tree.get(root, "Db").unwrap().section().unwrap();
        tree.set(a, "host", "db01").unwrap();
        assert_eq!(
            tree.get(b, "host").unwrap(),
            Resolved::Value(Value::from("db01"))
        );
    }

    #[test]
    fn test_missing_data_key_is_missing_not_error() {
        let dir = TempDir::new().unwrap();
        let mut tree = tree_over(&dir);
        let root = tree.root();
        assert_eq!(tree.get(root, "nothing").unwrap(), Resolved::Missing);
    }

    #[test]
    fn test_empty_section_exists_false_and_empty_data() {
        let dir = TempDir::new().unwrap();
        let mut tree = tree_over(&dir);
        let root = tree.root();
        let ghost = tree.get(root, "Ghost").unwrap().section().unwrap();
        assert!(!tree.exists(ghost).unwrap());
        assert!(tree.data(ghost).unwrap().is_empty());
    }

    #[test]
    fn test_environment_propagates_unchanged() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "A/B/default.yaml", "k: v\n");
        let mut tree = tree_over(&dir);
        assert_eq!(tree.environment(), "production");
        let root = tree.root();
        let a = tree.get(root, "A").unwrap().section().unwrap();
        let b = tree.get(a, "B").unwrap().section().unwrap();
        assert_eq!(tree.section_path(b), "A/B");
        assert_eq!(tree.environment(), "production");
    }

    #[test]
    fn test_search_roots_extend_per_level() {
        let dir = TempDir::new().unwrap();
        let mut tree = ConfigTree::builder()
            .search_root(dir.path().join("conf"))
            .search_root(dir.path().join("vendor"))
            .build();
        let root = tree.root();
        let db = tree.get(root, "Db").unwrap().section().unwrap();
        assert_eq!(
            tree.search_roots(db),
            &[dir.path().join("conf/Db"), dir.path().join("vendor/Db")]
        );
        assert_eq!(tree.parent(db), Some(root));
        assert_eq!(tree.name(db), "Db");
    }

    #[test]
    fn test_failed_section_is_not_cached() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Db/default.yaml", "a: b: c\n");
        let mut tree = tree_over(&dir);
        let root = tree.root();

        assert!(tree.get(root, "Db").is_err());
        // Fixing the file and retrying succeeds with fresh data.
        write(dir.path(), "Db/default.yaml", "host: localhost\n");
        let db = tree.get(root, "Db").unwrap().section().unwrap();
        assert!(tree.exists(db).unwrap());
    }

    #[test]
    fn test_lookup_missing_propagates_as_missing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Db/default.yaml", "host: localhost\n");
        let mut tree = tree_over(&dir);
        assert_eq!(tree.lookup("Db/nope/deeper").unwrap(), Resolved::Missing);
        assert_eq!(
            tree.lookup("Db/host").unwrap(),
            Resolved::Value(Value::from("localhost"))
        );
    }

    #[test]
    fn test_lookup_indexes_into_sequences() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Db/default.yaml", "hosts: [a, b, c]\n");
        let mut tree = tree_over(&dir);
        assert_eq!(
            tree.lookup("Db/hosts/1").unwrap(),
            Resolved::Value(Value::from("b"))
        );
        assert_eq!(tree.lookup("Db/hosts/9").unwrap(), Resolved::Missing);
    }

    #[test]
    fn test_builder_defaults() {
        let tree = ConfigTree::builder().build();
        assert_eq!(tree.environment(), "development");
        assert!(tree.loaded_files().is_empty());
        assert!(tree.search_roots(tree.root()).is_empty());
    }
}
