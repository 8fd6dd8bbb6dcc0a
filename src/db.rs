use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const KV_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Opens (or creates) the database file and ensures the `kv` table exists.
pub fn open_connection(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure_for_speed(&conn)?;
    conn.execute_batch(KV_SCHEMA)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection) -> Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::UNIX_EPOCH.to_string())
}

pub fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO kv (key, value, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET
    value = excluded.value,
    updated_at = excluded.updated_at
"#,
        params![key, value, now_utc_rfc3339()],
    )?;
    Ok(())
}
