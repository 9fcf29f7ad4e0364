//! JSON file token store.
//!
//! # Invariants
//! - The file holds one JSON object with the single key [`TOKEN_KEY`].
//! - Writes go through a sibling temp file and a rename.
//! - Clearing removes the file; clearing a missing file succeeds.

use super::{PersistError, PersistResult, TokenStore, TOKEN_KEY};
use crate::model::credential::BearerToken;
use log::info;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> PersistResult<Option<BearerToken>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let value: Value =
            serde_json::from_str(&raw).map_err(|err| PersistError::Corrupt(err.to_string()))?;
        match value.get(TOKEN_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) => Ok(BearerToken::new(token.as_str())),
            Some(_) => Err(PersistError::Corrupt(format!(
                "`{TOKEN_KEY}` is not a string"
            ))),
        }
    }

    fn save(&self, token: &BearerToken) -> PersistResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut entry = Map::new();
        entry.insert(TOKEN_KEY.to_string(), Value::String(token.as_str().to_string()));
        let body = serde_json::to_string(&Value::Object(entry))
            .map_err(|err| PersistError::Corrupt(err.to_string()))?;

        let temp = self.temp_path();
        std::fs::write(&temp, body)?;
        std::fs::rename(&temp, &self.path)?;
        info!("event=token_save module=persist status=ok backend=file");
        Ok(())
    }

    fn clear(&self) -> PersistResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("event=token_clear module=persist status=ok backend=file");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
