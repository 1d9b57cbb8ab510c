//! SQL schema for the Paracount SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Display names as last reported by the access-control layer.
CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    display_name TEXT NOT NULL
);

-- Paragraphs are never updated. AUTOINCREMENT keeps ids from being reused
-- after retention pruning.
CREATE TABLE IF NOT EXISTS paragraphs (
    paragraph_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      TEXT NOT NULL REFERENCES users(user_id),
    raw_text     TEXT NOT NULL,
    created_at   TEXT NOT NULL   -- RFC 3339 UTC, fixed width
);

-- Written once per (paragraph, word); never updated.
CREATE TABLE IF NOT EXISTS word_occurrences (
    paragraph_id INTEGER NOT NULL
                 REFERENCES paragraphs(paragraph_id) ON DELETE CASCADE,
    word         TEXT    NOT NULL,
    count        INTEGER NOT NULL,
    UNIQUE (paragraph_id, word),
    CHECK  (count > 0),
    CHECK  (length(word) >= 2)
);

CREATE INDEX IF NOT EXISTS paragraphs_created_idx ON paragraphs(created_at);
CREATE INDEX IF NOT EXISTS occurrences_word_idx   ON word_occurrences(word, count DESC);

PRAGMA user_version = 1;
";
