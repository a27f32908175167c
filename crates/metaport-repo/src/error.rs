//! Metadata store error types.

/// Errors produced by [`MetadataStore`](crate::MetadataStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying `SQLite` failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// File-system I/O failure (e.g. creating the database directory).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored config payload no longer parses.
    #[error("corrupt config payload: {0}")]
    CorruptPayload(#[from] serde_json::Error),

    /// Unique-name constraint rejected a write. Surfaced instead of
    /// overwriting when another actor created a same-named entity.
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    /// Internal mutex was poisoned by a panicked thread.
    #[error("metadata store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Whether this error is a per-entity name collision rather than an
    /// infrastructure failure.
    #[must_use]
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, StoreError>;
