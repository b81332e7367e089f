use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::LoadError;

/// One raw input record: a JSON object with its keys left untyped.
/// Shape classification happens later, against the whole batch.
pub type Record = Map<String, Value>;

/// Input formats plug in behind this trait; JSON is the only one today.
pub trait Reader {
    fn read(&self, path: &Path) -> Result<Vec<Record>, LoadError>;
}

pub struct JsonReader;

impl Reader for JsonReader {
    fn read(&self, path: &Path) -> Result<Vec<Record>, LoadError> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                LoadError::NotFound(path.to_path_buf())
            } else {
                LoadError::Io(e)
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}
