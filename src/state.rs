use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::persist::write_json;

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Default, Clone)]
pub struct PaginationState {
    #[serde(default)]
    pub after_cursor: Option<String>,
    #[serde(default)]
    pub post_count: u64,
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or malformed file is a fresh start. Other read failures are
    /// returned, since restarting from the top would duplicate saved posts.
    pub fn load(&self) -> Result<PaginationState, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(PaginationState::default()),
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                debug!(path = %self.path.display(), "ignoring resume state that is not UTF-8");
                return Ok(PaginationState::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            debug!(path = %self.path.display(), error = %err, "ignoring malformed resume state");
            PaginationState::default()
        }))
    }

    pub fn save(&self, state: &PaginationState) -> Result<(), StoreError> {
        write_json(&self.path, state)
    }
}
