//! Detection of routing-policy objects a candidate would change.
//!
//! The comparison answers "would pushing the candidate change anything?",
//! so only objects present in the candidate are inspected. An object
//! removed from the candidate is not reported: FRR does not delete
//! objects that a merged patch omits.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::classifier::{self, ObjectType};

/// Names of changed objects per type.
///
/// Only types with at least one changed name are present, so an empty
/// report means no supported object differs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiffReport {
    changed: BTreeMap<ObjectType, Vec<String>>,
}

impl DiffReport {
    /// Returns true if no supported object differs.
    pub fn is_empty(&self) -> bool {
        self.changed.values().all(Vec::is_empty)
    }

    /// Changed names of type `ty`.
    pub fn changed(&self, ty: ObjectType) -> &[String] {
        self.changed.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of changed objects.
    pub fn len(&self) -> usize {
        self.changed.values().map(Vec::len).sum()
    }

    /// Iterates types with changes.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectType, &[String])> {
        self.changed
            .iter()
            .map(|(ty, names)| (*ty, names.as_slice()))
    }

    fn record(&mut self, ty: ObjectType, name: &str) {
        self.changed.entry(ty).or_default().push(name.to_string());
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no routing-policy object changed");
        }
        let mut first = true;
        for (ty, names) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", ty, names.join(", "))?;
            first = false;
        }
        Ok(())
    }
}

/// Lists candidate objects that differ from the reference configuration.
///
/// An object absent from the reference counts as changed.
pub fn list_changed_objects(reference_config: &str, candidate_config: &str) -> DiffReport {
    let reference = classifier::objects(reference_config);
    let candidate = classifier::objects(candidate_config);

    let mut report = DiffReport::default();
    for (ty, objects) in candidate.iter() {
        for (name, entries) in objects {
            if reference.get(ty, name) != Some(entries.as_slice()) {
                report.record(ty, name);
            }
        }
    }

    tracing::debug!(changed = report.len(), "Compared routing-policy objects");
    report
}

/// Returns true if pushing the candidate would change a supported object.
pub fn is_different(reference_config: &str, candidate_config: &str) -> bool {
    !list_changed_objects(reference_config, candidate_config).is_empty()
}
