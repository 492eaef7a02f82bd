//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository loads, engine calls and repository writes.
//! - Give presentation layers (CLI, HTTP, GUI) one entry point per use-case.

pub mod directory_service;
pub mod vacation_service;
