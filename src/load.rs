use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;

use crate::error::LoadError;
use crate::model::{classify, Shape};
use crate::reader::Record;

const STUDENT_UPSERT: &str = "
    INSERT INTO students (id, name, birthday, sex, room_id)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        birthday = excluded.birthday,
        sex = excluded.sex,
        room_id = excluded.room_id";

const ROOM_UPSERT: &str = "
    INSERT INTO rooms (id, name)
    VALUES (?1, ?2)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name";

/// Classify a batch and build its upsert: one statement template plus one
/// bound-parameter row per input record, input order preserved.
///
/// Field values pass through untyped. A missing field binds NULL and is
/// rejected by the store's NOT NULL constraints, not here.
pub fn build_upsert(batch: &[Record]) -> Result<(&'static str, Vec<Vec<SqlValue>>), LoadError> {
    match classify(batch)? {
        Shape::Student => {
            let rows = batch
                .iter()
                .map(|rec| {
                    vec![
                        bind(rec.get("id")),
                        bind(rec.get("name")),
                        bind_birthday(rec.get("birthday")),
                        bind(rec.get("sex")),
                        bind(rec.get("room")),
                    ]
                })
                .collect();
            Ok((STUDENT_UPSERT, rows))
        }
        Shape::Room => {
            let rows = batch
                .iter()
                .map(|rec| vec![bind(rec.get("id")), bind(rec.get("name"))])
                .collect();
            Ok((ROOM_UPSERT, rows))
        }
    }
}

/// Load one rooms batch, then one students batch.
///
/// An empty batch never touches the store. Each non-empty batch is executed
/// row by row against one prepared statement inside its own transaction and
/// committed on its own, so a failing students batch leaves an already
/// committed rooms batch in place. Rooms-before-students ordering is the
/// caller's responsibility.
pub fn load(conn: &mut Connection, rooms: &[Record], students: &[Record]) -> Result<(), LoadError> {
    upsert_batch(conn, rooms)?;
    upsert_batch(conn, students)?;
    Ok(())
}

fn upsert_batch(conn: &mut Connection, batch: &[Record]) -> Result<(), LoadError> {
    if batch.is_empty() {
        return Ok(());
    }

    let (sql, rows) = build_upsert(batch)?;
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(sql)?;
        for row in &rows {
            stmt.execute(params_from_iter(row.iter()))?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn bind(value: Option<&Value>) -> SqlValue {
    match value {
        None | Some(Value::Null) => SqlValue::Null,
        Some(Value::Bool(b)) => SqlValue::Integer(i64::from(*b)),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(SqlValue::Integer)
            .unwrap_or_else(|| SqlValue::Real(n.as_f64().unwrap_or(f64::NAN))),
        Some(Value::String(s)) => SqlValue::Text(s.clone()),
        // Nested values have no scalar column form; carried as JSON text and
        // left to the store's constraints.
        Some(other) => SqlValue::Text(other.to_string()),
    }
}

/// Birthdays arrive as ISO-8601 strings, possibly with time-of-day and
/// timezone. Keep the first 10 bytes (`YYYY-MM-DD`); anything shorter or
/// oddly shaped passes through and fails the store's date CHECK instead.
fn bind_birthday(value: Option<&Value>) -> SqlValue {
    match value {
        Some(Value::String(s)) => SqlValue::Text(s.get(..10).unwrap_or(s).to_string()),
        other => bind(other),
    }
}
