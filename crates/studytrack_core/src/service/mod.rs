//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the lab screen use-cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod lab_service;
pub mod labs_view;
