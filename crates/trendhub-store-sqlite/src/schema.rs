//! SQL schema for the trend store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per natural key; re-ingestion overwrites value and source_file.
CREATE TABLE IF NOT EXISTS fact_trend (
    biz_date    TEXT NOT NULL,   -- YYYY-MM-DD
    scope       TEXT NOT NULL,   -- 'PHY' | 'ADJ'
    branch      TEXT NOT NULL,
    metric      TEXT NOT NULL,
    value       REAL,
    source_file TEXT NOT NULL,
    PRIMARY KEY (biz_date, scope, branch, metric)
);

CREATE INDEX IF NOT EXISTS fact_trend_scope_date_idx   ON fact_trend(scope, biz_date);
CREATE INDEX IF NOT EXISTS fact_trend_scope_metric_idx ON fact_trend(scope, metric, biz_date);
CREATE INDEX IF NOT EXISTS fact_trend_scope_branch_idx ON fact_trend(scope, branch, biz_date);

CREATE TABLE IF NOT EXISTS metric_def (
    metric      TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    unit        TEXT NOT NULL,
    kind        TEXT NOT NULL,   -- 'raw' | 'delta' | 'ratio'
    base_metric TEXT
);

PRAGMA user_version = 1;
";

/// Seeds `metric_def` without clobbering operator edits.
pub const SEED_METRIC: &str = "
INSERT OR IGNORE INTO metric_def (metric, name, unit, kind, base_metric)
VALUES (?1, ?2, ?3, ?4, ?5)
";

pub const UPSERT_FACT: &str = "
INSERT INTO fact_trend (biz_date, scope, branch, metric, value, source_file)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT (biz_date, scope, branch, metric)
DO UPDATE SET value = excluded.value, source_file = excluded.source_file
";

pub const FACT_COLUMNS: &str = "biz_date, scope, branch, metric, value, source_file";
