//! SQL schema for the billwatch SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS congresses (
    congress_id TEXT PRIMARY KEY,
    number      INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS committees (
    committee_id TEXT PRIMARY KEY,
    bioguide_id  TEXT NOT NULL UNIQUE,
    name         TEXT
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id TEXT PRIMARY KEY,
    name   TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS members (
    member_id   TEXT PRIMARY KEY,
    bioguide_id TEXT NOT NULL UNIQUE,
    name        TEXT,
    party       TEXT
);

CREATE TABLE IF NOT EXISTS bills (
    bill_id          TEXT PRIMARY KEY,
    congress_id      TEXT NOT NULL REFERENCES congresses(congress_id),
    number           TEXT NOT NULL,   -- canonical: periods stripped
    title            TEXT NOT NULL,
    summary          TEXT,
    full_text_url    TEXT,
    introduced_on    TEXT,            -- ISO 8601 dates
    house_voted_on   TEXT,
    senate_voted_on  TEXT,
    enacted_on       TEXT,
    vetoed_on        TEXT,
    house_result     TEXT,
    senate_result    TEXT,
    deep_scraped_on  TEXT,            -- RFC 3339 UTC; NULL until enriched
    feature_state    TEXT NOT NULL DEFAULT 'unfeatured',
    feature_position INTEGER,
    is_visible       INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS bills_number_idx
    ON bills(congress_id, number COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS bills_introduced_idx ON bills(introduced_on);

-- At most one 'primary' row per bill; all others are cosponsorships.
CREATE TABLE IF NOT EXISTS sponsorships (
    sponsorship_id TEXT PRIMARY KEY,
    bill_id        TEXT NOT NULL REFERENCES bills(bill_id) ON DELETE CASCADE,
    member_id      TEXT NOT NULL REFERENCES members(member_id),
    kind           TEXT NOT NULL    -- 'primary' | 'cosponsor'
);

CREATE UNIQUE INDEX IF NOT EXISTS sponsorships_primary_idx
    ON sponsorships(bill_id) WHERE kind = 'primary';
CREATE INDEX IF NOT EXISTS sponsorships_bill_idx ON sponsorships(bill_id);

-- Join tables keep rowid so association order is recoverable.
CREATE TABLE IF NOT EXISTS bills_committees (
    bill_id      TEXT NOT NULL REFERENCES bills(bill_id) ON DELETE CASCADE,
    committee_id TEXT NOT NULL REFERENCES committees(committee_id),
    PRIMARY KEY (bill_id, committee_id)
);

CREATE TABLE IF NOT EXISTS bills_tags (
    bill_id TEXT NOT NULL REFERENCES bills(bill_id) ON DELETE CASCADE,
    tag_id  TEXT NOT NULL REFERENCES tags(tag_id),
    PRIMARY KEY (bill_id, tag_id)
);

CREATE TABLE IF NOT EXISTS votes (
    vote_id    TEXT PRIMARY KEY,
    bill_id    TEXT NOT NULL REFERENCES bills(bill_id) ON DELETE CASCADE,
    member_id  TEXT NOT NULL REFERENCES members(member_id),
    chamber_id INTEGER NOT NULL,    -- 1 = house, 2 = senate
    position   TEXT NOT NULL,
    cast_on    TEXT
);

CREATE INDEX IF NOT EXISTS votes_bill_idx ON votes(bill_id, chamber_id, position);

CREATE TABLE IF NOT EXISTS positions (
    position_id TEXT PRIMARY KEY,
    bill_id     TEXT NOT NULL REFERENCES bills(bill_id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL,
    position    INTEGER NOT NULL,   -- > 0 support, < 0 oppose
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS positions_bill_idx ON positions(bill_id);

CREATE TABLE IF NOT EXISTS favorites (
    favorite_id TEXT PRIMARY KEY,
    bill_id     TEXT NOT NULL REFERENCES bills(bill_id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (bill_id, user_id)
);

-- Outbox of delayed notifications. Rows are only ever inserted here;
-- delivery workers live outside this store.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    kind            TEXT NOT NULL,
    entity_type     TEXT NOT NULL,
    entity_id       TEXT NOT NULL,
    enqueued_at     TEXT NOT NULL,
    deliver_after   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS notifications_due_idx ON notifications(deliver_after);

-- An unfinished run holds the lock for its kind.
CREATE TABLE IF NOT EXISTS sync_runs (
    run_id         TEXT PRIMARY KEY,
    kind           TEXT NOT NULL,
    started_at     TEXT NOT NULL,
    finished_at    TEXT,
    status         TEXT NOT NULL,   -- 'running' | 'completed' | 'failed'
    error          TEXT,
    records_seen   INTEGER NOT NULL DEFAULT 0,
    records_synced INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX IF NOT EXISTS sync_runs_open_idx
    ON sync_runs(kind) WHERE finished_at IS NULL;

PRAGMA user_version = 1;
";
