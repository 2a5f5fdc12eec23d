//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,                 -- case-sensitive
    email         TEXT NOT NULL COLLATE NOCASE UNIQUE,  -- case-insensitive
    first_name    TEXT NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL,                        -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- Only the SHA-256 digest of a session token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- Every read and write filters on owner_id.
-- The implicit rowid is the tie-break for equal created_at values.
CREATE TABLE IF NOT EXISTS contacts (
    contact_id  TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    phone       TEXT NOT NULL,
    email       TEXT,
    address     TEXT,
    category    TEXT NOT NULL DEFAULT 'Other',
    is_favorite INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL   -- RFC 3339 UTC, fixed microsecond width
);

CREATE INDEX IF NOT EXISTS contacts_owner_created_idx ON contacts(owner_id, created_at);
CREATE INDEX IF NOT EXISTS sessions_user_idx          ON sessions(user_id);
CREATE INDEX IF NOT EXISTS sessions_expires_idx       ON sessions(expires_at);

PRAGMA user_version = 1;
";
