//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One identity per address. Names are not unique.
CREATE TABLE IF NOT EXISTS identities (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    address     TEXT    NOT NULL,
    vip         INTEGER NOT NULL DEFAULT 0,
    staff       INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT    NOT NULL,   -- ISO 8601 UTC
    UNIQUE (address)
);

-- The display name pool.
CREATE TABLE IF NOT EXISTS names (
    name TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS posts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    address     TEXT    NOT NULL,             -- author
    title       TEXT    NOT NULL,
    text        TEXT    NOT NULL,
    images      TEXT    NOT NULL DEFAULT '',  -- comma-separated
    verified    INTEGER NOT NULL DEFAULT 0,
    public      INTEGER NOT NULL DEFAULT 1,
    views       INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id     INTEGER NOT NULL,
    address     TEXT    NOT NULL,
    text        TEXT    NOT NULL,
    created_at  TEXT    NOT NULL
);

-- The vote ledger. No row means no vote; a row is always a directed vote.
CREATE TABLE IF NOT EXISTS votes (
    post_id     INTEGER NOT NULL,
    address     TEXT    NOT NULL,
    action      INTEGER NOT NULL CHECK (action IN (-1, 1)),
    PRIMARY KEY (post_id, address)
);

CREATE INDEX IF NOT EXISTS comments_post_idx    ON comments(post_id);
CREATE INDEX IF NOT EXISTS comments_address_idx ON comments(address);
CREATE INDEX IF NOT EXISTS posts_public_idx     ON posts(public, id);

PRAGMA user_version = 1;
";
