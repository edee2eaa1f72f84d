//! SQL schema for the ringpage SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS credentials (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL UNIQUE,
    secret_value  TEXT NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assistants (
    id                    TEXT PRIMARY KEY,
    name                  TEXT NOT NULL,
    provider_assistant_id TEXT NOT NULL UNIQUE,
    is_active             INTEGER NOT NULL DEFAULT 1,
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS phone_numbers (
    id                       TEXT PRIMARY KEY,
    name                     TEXT NOT NULL,
    provider_phone_number_id TEXT NOT NULL UNIQUE,
    display_number           TEXT,
    is_active                INTEGER NOT NULL DEFAULT 1,
    created_at               TEXT NOT NULL,
    updated_at               TEXT NOT NULL
);

-- References are plain ids: deleting a credential, assistant or phone
-- number leaves pages pointing at it, and dispatch fails at call time.
CREATE TABLE IF NOT EXISTS demo_pages (
    id                   TEXT PRIMARY KEY,
    slug                 TEXT NOT NULL UNIQUE,
    title                TEXT,
    credential_id        TEXT NOT NULL,
    assistant_id         TEXT NOT NULL,
    phone_number_id      TEXT NOT NULL,
    fields_json          TEXT NOT NULL DEFAULT '[]',
    call_to_field_key    TEXT NOT NULL,
    variables_json       TEXT NOT NULL DEFAULT '[]',
    -- Legacy provider-variable -> field-key map. Read, never written.
    variable_values_json TEXT NOT NULL DEFAULT '{}',
    password_required    INTEGER NOT NULL DEFAULT 0,
    password_hash        TEXT,
    max_calls            INTEGER,          -- NULL = unlimited
    calls_made           INTEGER NOT NULL DEFAULT 0,
    is_active            INTEGER NOT NULL DEFAULT 1,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS demo_pages_active_slug_idx ON demo_pages(slug, is_active);

PRAGMA user_version = 1;
";
