//! # sonic-frr-diff - FRR routing-policy change detection
//!
//! Detects whether a candidate FRR configuration would change routing
//! policy objects already present in a reference (usually running)
//! configuration. It does not expose the change nor produce the commands
//! to converge; it only answers which objects differ.
//!
//! ## Pipeline
//! 1. [`grouper`]: indentation-structured text → top-level statements
//!    with their nested statements
//! 2. [`classifier`]: top-level statements → typed, named objects
//! 3. [`diff`]: candidate objects compared with reference objects
//!
//! ## Supported objects
//! - `route-map NAME ...`
//! - `ip prefix-list NAME ...`
//! - `ipv6 prefix-list NAME ...`
//! - `bgp community-list TYPE NAME ...`
//!
//! Other statements are ignored, never reported.

pub mod classifier;
pub mod diff;
pub mod grouper;

pub use classifier::{classify, ClassifiedObjects, ObjectEntry, ObjectType};
pub use diff::{is_different, list_changed_objects, DiffReport};
pub use grouper::{group, ConfigObject, GroupedConfig};
