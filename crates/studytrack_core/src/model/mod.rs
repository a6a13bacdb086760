//! Domain model for subjects and their lab tasks.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Own validation and normalization rules for user-entered text.
//!
//! # Invariants
//! - Identifiers are assigned by storage and never reused.
//! - A lab always references exactly one subject.

pub mod lab;
pub mod subject;
