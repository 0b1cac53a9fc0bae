//! Audit-change records.
//!
//! The types here describe what changed on a tracked object, anchored to the
//! object's [`ids::GlobalId`] and, once recorded, to the [`commit::CommitMetadata`]
//! of the commit that persisted it. Diffing and persistence are left to the
//! embedding application.

pub mod change;
pub mod commit;
pub mod ids;
pub mod printer;
pub mod snapshot;
pub mod utils;

pub extern crate chrono;
