//! SQL schema for the creatorlink SQLite store.
//!
//! Executed once at connection startup. The version is recorded in
//! `PRAGMA user_version` so future migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Identity provider ──────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    email      TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

-- One-time sign-in codes. Only the SHA-256 hash of a code is stored.
CREATE TABLE IF NOT EXISTS auth_codes (
    code_hash  TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL,
    used_at    TEXT
);

-- Opaque session tokens, stored hashed.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- ── Marketplace ────────────────────────────────────────────────────────────

-- Keyed by the identity provider's user id.
CREATE TABLE IF NOT EXISTS profiles (
    id                TEXT PRIMARY KEY,
    username          TEXT NOT NULL UNIQUE,
    first_name        TEXT NOT NULL,
    last_name         TEXT NOT NULL,
    email             TEXT NOT NULL,
    phone_number      TEXT NOT NULL DEFAULT '',
    profile_photo_url TEXT,
    city              TEXT NOT NULL,
    country           TEXT NOT NULL,
    user_type         TEXT NOT NULL CHECK (user_type IN ('creator', 'business')),
    instagram_url     TEXT,
    tiktok_url        TEXT,
    youtube_url       TEXT,
    is_public         INTEGER NOT NULL DEFAULT 0,
    is_collaborated   INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS job_postings (
    id            TEXT PRIMARY KEY,
    profile_id    TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL,
    has_deadline  INTEGER NOT NULL DEFAULT 0,
    deadline_date TEXT,              -- YYYY-MM-DD
    deadline_time TEXT,              -- HH:MM:SS, only with a date
    created_at    TEXT NOT NULL,
    slug          TEXT NOT NULL UNIQUE,
    CHECK (deadline_time IS NULL OR deadline_date IS NOT NULL)
);

CREATE TABLE IF NOT EXISTS saved_jobs (
    profile_id     TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    job_posting_id TEXT NOT NULL REFERENCES job_postings(id) ON DELETE CASCADE,
    created_at     TEXT NOT NULL,
    PRIMARY KEY (profile_id, job_posting_id)
);

CREATE TABLE IF NOT EXISTS job_applications (
    id             TEXT PRIMARY KEY,
    profile_id     TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    job_posting_id TEXT NOT NULL REFERENCES job_postings(id) ON DELETE CASCADE,
    created_at     TEXT NOT NULL,
    UNIQUE (profile_id, job_posting_id)
);

CREATE INDEX IF NOT EXISTS job_postings_created_idx ON job_postings(created_at);
CREATE INDEX IF NOT EXISTS job_postings_owner_idx   ON job_postings(profile_id);
CREATE INDEX IF NOT EXISTS applications_posting_idx ON job_applications(job_posting_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx        ON sessions(user_id);

PRAGMA user_version = 1;
";
