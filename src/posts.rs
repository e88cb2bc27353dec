use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::persist::write_json;

pub struct PostStore {
    path: PathBuf,
}

impl PostStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Posts saved by earlier runs. Absent or malformed files load as empty;
    /// any other read failure is returned so a later save cannot clobber it.
    pub fn load(&self) -> Result<Vec<Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                debug!(path = %self.path.display(), "ignoring post file that is not UTF-8");
                return Ok(vec![]);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            debug!(path = %self.path.display(), error = %err, "ignoring malformed post file");
            vec![]
        }))
    }

    pub fn save(&self, posts: &[Value]) -> Result<(), StoreError> {
        write_json(&self.path, posts)
    }
}
