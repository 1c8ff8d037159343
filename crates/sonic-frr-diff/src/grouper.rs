//! Indentation-based grouping of FRR configuration text.
//!
//! FRR renders its configuration as top-level statements followed by
//! deeper-indented sub-statements:
//!
//! ```text
//! route-map RM-CLOS-IN permit 10
//!  match ip address prefix-list PF-A
//!  set local-preference 200
//! !
//! ip prefix-list PF-DEFAULT seq 10 permit 0.0.0.0/0
//! ```
//!
//! Each top-level statement becomes a [`ConfigObject`] owning the set of
//! statements indented beneath it.

use std::collections::{BTreeSet, HashMap};

/// Line that separates blocks and carries no statement.
pub const SEPARATOR: &str = "!";

/// A top-level statement and the statements nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigObject {
    /// Top-level statement text, e.g. `route-map FOO permit 10`.
    pub statement: String,
    /// Child statements, compared as an unordered set.
    pub children: BTreeSet<String>,
}

impl ConfigObject {
    fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            children: BTreeSet::new(),
        }
    }

    /// Returns true if no statement was nested under this object.
    pub fn is_bare(&self) -> bool {
        self.children.is_empty()
    }
}

/// Configuration objects in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedConfig {
    objects: Vec<ConfigObject>,
    index: HashMap<String, usize>,
}

impl GroupedConfig {
    /// Number of distinct top-level statements.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the text held no line besides separators.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Looks up an object by its top-level statement.
    pub fn get(&self, statement: &str) -> Option<&ConfigObject> {
        self.index.get(statement).map(|&i| &self.objects[i])
    }

    /// Iterates objects in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigObject> {
        self.objects.iter()
    }

    /// Opens (or re-opens) the object keyed by `statement`.
    ///
    /// A statement seen twice keeps its first position but starts over with
    /// an empty child set, so only its last occurrence counts.
    fn open(&mut self, statement: &str) -> usize {
        if let Some(&i) = self.index.get(statement) {
            self.objects[i].children.clear();
            return i;
        }
        let i = self.objects.len();
        self.objects.push(ConfigObject::new(statement));
        self.index.insert(statement.to_string(), i);
        i
    }
}

impl<'a> IntoIterator for &'a GroupedConfig {
    type Item = &'a ConfigObject;
    type IntoIter = std::slice::Iter<'a, ConfigObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// Number of leading whitespace bytes of a line.
fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Groups configuration lines per top-level statement.
///
/// A line indented strictly deeper than the current top-level statement
/// is a child of it; anything else opens a new top-level statement and
/// becomes the reference indentation. Separator lines are skipped without
/// closing the current object. A blank line is an empty top-level statement:
/// it closes the current object and no supported object type matches it.
/// An indented first line has no parent and is taken as top-level.
pub fn group(config: &str) -> GroupedConfig {
    let mut grouped = GroupedConfig::default();
    // (object index, indentation) of the statement currently open
    let mut current: Option<(usize, usize)> = None;

    for line in config.lines() {
        let statement = line.trim();
        if statement == SEPARATOR {
            continue;
        }

        let depth = indentation(line);
        match current {
            Some((i, parent_depth)) if depth > parent_depth => {
                grouped.objects[i].children.insert(statement.to_string());
            }
            _ => {
                let i = grouped.open(statement);
                current = Some((i, depth));
            }
        }
    }

    grouped
}
