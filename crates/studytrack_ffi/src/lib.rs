//! Flutter-facing bindings for the StudyTrack core.

pub mod api;
