use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::User;
use crate::error::SessionError;

/// A signed-in user and the token the CMS issued for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub jwt: String,
    pub user: User,
}

/// Persistence for the current session across runs.
pub trait SessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&mut self, session: &Session) -> Result<(), SessionError>;
    fn clear(&mut self) -> Result<(), SessionError>;
}

/// Session persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&mut self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(session).map_err(|source| {
            SessionError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Session kept in memory for the lifetime of the store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Option<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session.clone())
    }

    fn save(&mut self, session: &Session) -> Result<(), SessionError> {
        self.session = Some(session.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.session = None;
        Ok(())
    }
}
