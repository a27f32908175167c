//! Shared model types for the metaport export/import engine.
//!
//! Pure data types: the entity model (connectors, links, jobs, submissions),
//! the typed config value representation, the versioned document envelope,
//! and config validation violations. Kept free of behavior so the repo and
//! engine crates can share them without circular dependencies.

#![warn(clippy::pedantic)]

pub mod config;
pub mod document;
pub mod entity;
pub mod violation;
