use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::error::LoadError;

/// Age in whole years at `?1`: the year difference, minus one when the
/// `?1` month-day falls before the birthday's month-day. SQLite comparisons
/// evaluate to 0/1, so the adjustment is a plain subtraction.
const AGE_EXPR: &str = "CAST(strftime('%Y', ?1) AS INTEGER)
        - CAST(strftime('%Y', s.birthday) AS INTEGER)
        - (strftime('%m-%d', ?1) < strftime('%m-%d', s.birthday))";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomStudentCount {
    pub id: i64,
    pub name: String,
    pub student_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomAvgAge {
    pub id: i64,
    pub name: String,
    pub avg_age: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomAgeSpread {
    pub id: i64,
    pub name: String,
    pub age_spread: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixedSexRoom {
    pub id: i64,
    pub name: String,
}

/// Every room with its student count, zero-student rooms included, ordered
/// by room id.
pub fn rooms_with_student_count(conn: &Connection) -> Result<Vec<RoomStudentCount>, LoadError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.name, COUNT(s.id) AS student_count
         FROM rooms r
         LEFT JOIN students s ON s.room_id = r.id
         GROUP BY r.id, r.name
         ORDER BY r.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RoomStudentCount {
                id: row.get(0)?,
                name: row.get(1)?,
                student_count: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The five rooms with the smallest average student age at `as_of`.
/// Rooms without students are excluded by the inner join.
pub fn top5_smallest_avg_age(
    conn: &Connection,
    as_of: NaiveDate,
) -> Result<Vec<RoomAvgAge>, LoadError> {
    let sql = format!(
        "SELECT r.id, r.name, AVG({AGE_EXPR}) AS avg_age
         FROM rooms r
         JOIN students s ON s.room_id = r.id
         GROUP BY r.id, r.name
         ORDER BY avg_age ASC
         LIMIT 5"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([date_param(as_of)], |row| {
            Ok(RoomAvgAge {
                id: row.get(0)?,
                name: row.get(1)?,
                avg_age: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The five rooms with the largest gap between their oldest and youngest
/// student, in whole years at `as_of`.
pub fn top5_largest_age_spread(
    conn: &Connection,
    as_of: NaiveDate,
) -> Result<Vec<RoomAgeSpread>, LoadError> {
    let sql = format!(
        "SELECT r.id, r.name, MAX({AGE_EXPR}) - MIN({AGE_EXPR}) AS age_spread
         FROM rooms r
         JOIN students s ON s.room_id = r.id
         GROUP BY r.id, r.name
         ORDER BY age_spread DESC
         LIMIT 5"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([date_param(as_of)], |row| {
            Ok(RoomAgeSpread {
                id: row.get(0)?,
                name: row.get(1)?,
                age_spread: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Rooms housing more than one distinct sex value.
pub fn rooms_with_mixed_sex(conn: &Connection) -> Result<Vec<MixedSexRoom>, LoadError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.name
         FROM rooms r
         JOIN students s ON s.room_id = r.id
         GROUP BY r.id, r.name
         HAVING COUNT(DISTINCT s.sex) > 1
         ORDER BY r.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MixedSexRoom {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn date_param(as_of: NaiveDate) -> String {
    as_of.format("%Y-%m-%d").to_string()
}
