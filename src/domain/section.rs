// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section tree node types.
//!
//! A section is one node of the configuration tree, corresponding to one
//! directory level under each overlay root. Nodes live in an arena owned by
//! [`ConfigTree`](crate::service::tree::ConfigTree) and reference each other
//! by index, so parent back-references never form an ownership cycle.

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A non-owning handle to a section in the tree arena.
///
/// Handles are cheap to copy and remain valid for the lifetime of the tree
/// that produced them. Two accesses of the same child name on the same
/// parent yield the same handle, so mutations through one handle are
/// visible through the other.
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
///     .build();
/// let root = tree.root();
/// let db = tree.get(root, "Db")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectionId(pub(crate) usize);

/// The result of looking a name up on a section.
///
/// The first character of the name decides which namespace is consulted,
/// unconditionally: an ASCII-uppercase letter always refers to a child
/// section, anything else always refers to a data key. A missing data key
/// is reported as [`Resolved::Missing`] rather than an error; callers that
/// need strict existence must check explicitly.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    /// The name referred to a child section.
    Section(SectionId),
    /// The name referred to a data key holding this value.
    Value(Value),
    /// The name referred to a data key that is not present.
    Missing,
}

impl Resolved {
    /// Returns the contained value, if this is a `Value`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolved::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the contained section handle, if this is a `Section`.
    pub fn section(&self) -> Option<SectionId> {
        match self {
            Resolved::Section(id) => Some(*id),
            _ => None,
        }
    }
}

/// Whether a name refers to the subsection namespace.
///
/// Names starting with an ASCII-uppercase letter are always subsection
/// references; all other names are data keys. A name is never resolved as
/// both in the same lookup.
///
/// # Examples
///
/// ```
/// use layercfg::domain::section::is_section_name;
///
/// assert!(is_section_name("Db"));
/// assert!(!is_section_name("hosts"));
/// assert!(!is_section_name("_Db"));
/// assert!(!is_section_name(""));
/// ```
pub fn is_section_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// How far a section has progressed through lazy materialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoadState {
    /// Created but no files discovered or parsed yet.
    Pending,
    /// Materialization in progress; re-entry means a macro cycle.
    Loading,
    /// Data discovered, parsed, and merged.
    Loaded,
}

/// One arena entry of the configuration tree.
#[derive(Debug)]
pub(crate) struct Section {
    /// Identifier, unique among siblings. Empty for the root.
    pub(crate) name: String,
    /// Back-reference to the owning section. `None` for the root.
    pub(crate) parent: Option<SectionId>,
    /// This node's search directory per overlay root, in overlay order.
    pub(crate) search_roots: Vec<PathBuf>,
    /// Resolved key/value data, shallow-merged in file discovery order.
    pub(crate) data: Mapping,
    /// Memoized child sections by name.
    pub(crate) children: BTreeMap<String, SectionId>,
    pub(crate) state: LoadState,
}

impl Section {
    pub(crate) fn new(name: String, parent: Option<SectionId>, search_roots: Vec<PathBuf>) -> Self {
        Section {
            name,
            parent,
            search_roots,
            data: Mapping::new(),
            children: BTreeMap::new(),
            state: LoadState::Pending,
        }
    }
}
