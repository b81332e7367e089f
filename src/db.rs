use std::path::Path;

use rusqlite::Connection;

use crate::error::LoadError;

/// Table definitions. Each statement is individually idempotent, so the
/// whole script is applied unconditionally on every startup.
///
/// `students.room_id` references `rooms.id` advisorily only: no FOREIGN KEY
/// clause, a student may point at a missing room without error. The GLOB
/// check on `birthday` makes the store reject values that are not plain
/// `YYYY-MM-DD` dates (SQLite's TEXT affinity would otherwise accept any
/// string).
pub const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS rooms(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS students(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        birthday TEXT NOT NULL
            CHECK (birthday GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]'),
        sex TEXT NOT NULL,
        room_id INTEGER NOT NULL
    );
";

/// Secondary indexes backing the report queries.
pub const INDEX_SQL: &str = "
    CREATE INDEX IF NOT EXISTS idx_students_room ON students(room_id);
    CREATE INDEX IF NOT EXISTS idx_students_sex ON students(sex);
    CREATE INDEX IF NOT EXISTS idx_students_birthday ON students(birthday);
";

const EXPECTED_INDEXES: [&str; 3] = [
    "idx_students_room",
    "idx_students_sex",
    "idx_students_birthday",
];

pub fn open(path: &Path) -> Result<Connection, LoadError> {
    Ok(Connection::open(path)?)
}

/// Apply the table script unconditionally, then the index script only when
/// the catalog reports the expected index set incomplete.
pub fn initialize(conn: &Connection, schema_sql: &str, index_sql: &str) -> Result<(), LoadError> {
    run_script(conn, schema_sql)?;
    if !has_expected_indexes(conn)? {
        run_script(conn, index_sql)?;
    }
    Ok(())
}

/// Execute a multi-statement script one statement at a time, splitting on
/// `;`. Execution is sequential: the first failing statement aborts the
/// rest and already-applied statements stay applied.
pub fn run_script(conn: &Connection, sql: &str) -> Result<(), LoadError> {
    for command in sql.split(';') {
        let command = command.trim();
        if command.is_empty() {
            continue;
        }
        conn.execute(command, [])?;
    }
    Ok(())
}

/// Catalog probe, not a local flag: counts how many of the expected indexes
/// exist in `sqlite_master`.
fn has_expected_indexes(conn: &Connection) -> Result<bool, LoadError> {
    let mut stmt = conn.prepare(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name IN (?1, ?2, ?3)",
    )?;
    let found: i64 = stmt.query_row(EXPECTED_INDEXES, |row| row.get(0))?;
    Ok(found as usize == EXPECTED_INDEXES.len())
}
