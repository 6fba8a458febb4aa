//! SQL schema for the Reset Routine SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- trimmed, lowercase
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- Only the SHA-256 digest of a bearer token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

-- Addictions are never updated or deleted.
CREATE TABLE IF NOT EXISTS addictions (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    color       TEXT NOT NULL,            -- '#rrggbb' palette entry
    start_date  TEXT NOT NULL             -- ISO 8601 UTC; store-assigned
);

-- One row per (addiction, day); rewrites go through ON CONFLICT.
CREATE TABLE IF NOT EXISTS check_ins (
    id            TEXT PRIMARY KEY,
    addiction_id  TEXT NOT NULL REFERENCES addictions(id),
    user_id       TEXT NOT NULL REFERENCES users(user_id),
    check_in_date TEXT NOT NULL,          -- YYYY-MM-DD
    is_clean      INTEGER NOT NULL,
    notes         TEXT,
    UNIQUE (addiction_id, check_in_date)
);

CREATE INDEX IF NOT EXISTS sessions_user_idx    ON sessions(user_id);
CREATE INDEX IF NOT EXISTS addictions_user_idx  ON addictions(user_id);
CREATE INDEX IF NOT EXISTS check_ins_user_idx   ON check_ins(user_id);

PRAGMA user_version = 1;
";
