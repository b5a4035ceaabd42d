//! SQL schema for the Shelf SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS books (
    book_id     TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    author      TEXT NOT NULL DEFAULT '',
    genre       TEXT NOT NULL,
    pages       INTEGER NOT NULL,
    created_on  TEXT NOT NULL        -- RFC 3339 UTC; server-assigned
);

-- No foreign key on book_id: reviews are kept when their book is deleted.
CREATE TABLE IF NOT EXISTS reviews (
    review_id  TEXT PRIMARY KEY,
    book_id    TEXT NOT NULL,
    user_id    TEXT NOT NULL,
    text       TEXT NOT NULL,
    rating     REAL NOT NULL,
    created_on TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    username      TEXT NOT NULL UNIQUE,  -- normalised: trimmed, lower-case
    email         TEXT NOT NULL UNIQUE,  -- normalised: trimmed, lower-case
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'default',
    interests     TEXT NOT NULL DEFAULT '{}',  -- JSON object: book_id -> status
    created_on    TEXT NOT NULL
);

-- Directed edges: from_user follows to_user.
CREATE TABLE IF NOT EXISTS follows (
    follow_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    from_user  TEXT NOT NULL,
    to_user    TEXT NOT NULL,
    created_on TEXT NOT NULL,
    UNIQUE (from_user, to_user)
);

CREATE INDEX IF NOT EXISTS books_created_idx   ON books(created_on);
CREATE INDEX IF NOT EXISTS reviews_book_idx    ON reviews(book_id);
CREATE INDEX IF NOT EXISTS users_created_idx   ON users(created_on);
CREATE INDEX IF NOT EXISTS follows_to_idx      ON follows(to_user);

PRAGMA user_version = 1;
";
