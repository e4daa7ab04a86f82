//! Application layer for jobtree.
//!
//! Use cases that coordinate the positioning engine in `jobtree-core` with a
//! task store from `jobtree-infrastructure`.

pub mod hierarchy_service;

pub use hierarchy_service::{DropResult, HierarchyService, MoveReport, VisibleRow};
