//! File-backed session cache: the client-side key-value entry that carries
//! the identity and theme between invocations.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::application::session::{SessionError, SessionStore, StoredSession};

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SessionError::cache(err)),
        };
        serde_json::from_str(&raw).map(Some).map_err(SessionError::cache)
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(SessionError::cache)?;
        }
        let raw = serde_json::to_string_pretty(session).map_err(SessionError::cache)?;
        fs::write(&self.path, raw).map_err(SessionError::cache)
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionError::cache(err)),
        }
    }
}
