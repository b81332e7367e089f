use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::reader::Record;

/// A room, identified by an externally assigned id. Names are display
/// labels and are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
}

/// A student. `birthday` arrives as an ISO-8601 string and is stored as its
/// `YYYY-MM-DD` date prefix; `room` references `Room::id` advisorily only —
/// the store does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub birthday: String,
    pub sex: String,
    pub room: i64,
}

/// Which entity table a batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Room,
    Student,
}

/// Classify a non-empty batch by field presence on its first record only:
/// a `room` key means students, otherwise `name` plus `id` means rooms.
///
/// Later records are trusted to match; a mixed batch is silently routed by
/// its first element. Callers never pass an empty batch (the loader skips
/// those before classification).
pub fn classify(batch: &[Record]) -> Result<Shape, LoadError> {
    let first = &batch[0];
    if first.contains_key("room") {
        Ok(Shape::Student)
    } else if first.contains_key("name") && first.contains_key("id") {
        Ok(Shape::Room)
    } else {
        Err(LoadError::UnrecognizedShape)
    }
}
