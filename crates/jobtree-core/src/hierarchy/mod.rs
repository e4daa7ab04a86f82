//! Task hierarchy views.
//!
//! # Module Structure
//!
//! - `index`: `HierarchyIndex`, built from a flat task snapshot
//! - `expansion`: `ExpansionState`, the UI-owned set of expanded nodes

mod expansion;
mod index;

pub use expansion::ExpansionState;
pub use index::{FlatEntry, HierarchyIndex, HierarchyNode};
