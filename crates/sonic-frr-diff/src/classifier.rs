//! Classification of grouped configuration into supported FRR objects.
//!
//! Only routing-policy objects are recognised: route-maps, IPv4 and IPv6
//! prefix-lists and BGP community-lists. Anything else is dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::grouper::{self, GroupedConfig};

/// Kind of routing-policy object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    RouteMaps,
    Ipv4PrefixLists,
    Ipv6PrefixLists,
    CommunityLists,
}

static ROUTE_MAP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^route-map (\S+)").expect("Invalid regex pattern"));
static IPV4_PREFIX_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ip prefix-list (\S+)").expect("Invalid regex pattern"));
static IPV6_PREFIX_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ipv6 prefix-list (\S+)").expect("Invalid regex pattern"));
static COMMUNITY_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^bgp community-list \S+ (\S+)").expect("Invalid regex pattern"));

impl ObjectType {
    /// All supported types, in matching order.
    pub const ALL: [ObjectType; 4] = [
        ObjectType::RouteMaps,
        ObjectType::Ipv4PrefixLists,
        ObjectType::Ipv6PrefixLists,
        ObjectType::CommunityLists,
    ];

    /// Key used in diff reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::RouteMaps => "route_maps",
            ObjectType::Ipv4PrefixLists => "ipv4_prefix_lists",
            ObjectType::Ipv6PrefixLists => "ipv6_prefix_lists",
            ObjectType::CommunityLists => "community_lists",
        }
    }

    /// Pattern matching a top-level statement of this type.
    ///
    /// The single capture group is the object name.
    pub fn pattern(&self) -> &'static Regex {
        match self {
            ObjectType::RouteMaps => &*ROUTE_MAP_RE,
            ObjectType::Ipv4PrefixLists => &*IPV4_PREFIX_LIST_RE,
            ObjectType::Ipv6PrefixLists => &*IPV6_PREFIX_LIST_RE,
            ObjectType::CommunityLists => &*COMMUNITY_LIST_RE,
        }
    }

    /// Matches `statement` against every pattern, returning type and name.
    pub fn match_statement(statement: &str) -> Option<(ObjectType, &str)> {
        Self::ALL.iter().find_map(|ty| {
            ty.pattern()
                .captures(statement)
                .and_then(|caps| caps.get(1))
                .map(|name| (*ty, name.as_str()))
        })
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One top-level statement contributing to a named object.
///
/// A prefix-list is a run of bare statements sharing a name, so a bare
/// entry is identified by its own text. An entry with a body is
/// identified by its child statements only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectEntry {
    /// Statement with nested children.
    Body(BTreeSet<String>),
    /// Statement without children.
    Bare(String),
}

/// Objects of one type keyed by name, entries in order of appearance.
pub type NamedObjects = BTreeMap<String, Vec<ObjectEntry>>;

/// Supported objects bucketed by type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedObjects {
    buckets: BTreeMap<ObjectType, NamedObjects>,
}

impl ClassifiedObjects {
    /// Entries recorded for `name` of type `ty`.
    pub fn get(&self, ty: ObjectType, name: &str) -> Option<&[ObjectEntry]> {
        self.buckets
            .get(&ty)
            .and_then(|objects| objects.get(name))
            .map(Vec::as_slice)
    }

    /// All objects of type `ty`.
    pub fn objects(&self, ty: ObjectType) -> Option<&NamedObjects> {
        self.buckets.get(&ty)
    }

    /// Names recorded for `ty`, sorted.
    pub fn names(&self, ty: ObjectType) -> Vec<&str> {
        self.buckets
            .get(&ty)
            .map(|objects| objects.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Iterates types that hold at least one object.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectType, &NamedObjects)> {
        self.buckets.iter().map(|(ty, objects)| (*ty, objects))
    }

    /// Returns true if no supported object was found.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn push(&mut self, ty: ObjectType, name: &str, entry: ObjectEntry) {
        self.buckets
            .entry(ty)
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(entry);
    }
}

/// Buckets grouped statements by object type and name.
pub fn classify(grouped: &GroupedConfig) -> ClassifiedObjects {
    let mut classified = ClassifiedObjects::default();

    for object in grouped {
        let Some((ty, name)) = ObjectType::match_statement(&object.statement) else {
            continue;
        };

        let entry = if object.is_bare() {
            ObjectEntry::Bare(object.statement.clone())
        } else {
            ObjectEntry::Body(object.children.clone())
        };
        classified.push(ty, name, entry);
    }

    classified
}

/// Groups then classifies configuration text.
pub fn objects(config: &str) -> ClassifiedObjects {
    classify(&grouper::group(config))
}
