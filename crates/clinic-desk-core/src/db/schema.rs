//! SQLite schema definition.

/// Complete database schema for the desk's durable state.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-value slots (invoice counter and other small serialized state)
-- ============================================================================

CREATE TABLE IF NOT EXISTS key_value (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
