//! Repository metadata persistence for the metaport engine.
//!
//! Provides the [`MetadataStore`] trait and a [`SqliteMetadataStore`]
//! implementation for link, job, and submission storage with
//! name-to-local-id resolution.

#![warn(clippy::pedantic)]

pub mod error;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use sqlite::SqliteMetadataStore;
pub use store::{LocalId, MetadataStore};
