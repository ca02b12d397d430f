//! File-backed login flag.
//!
//! The flag only gates whether results are shown. It holds no identity or
//! credential: the file contains a fixed demo marker or does not exist.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DEMO_USER: &str = "demo_user";

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    user: String,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the login flag is set. A missing or unreadable file counts as
    /// logged out.
    pub async fn is_logged_in(&self) -> bool {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<SessionFile>(&bytes) {
                Ok(session) => !session.user.is_empty(),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                    false
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                false
            }
        }
    }

    pub async fn log_in(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec(&SessionFile {
            user: DEMO_USER.to_string(),
        })?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }

    pub async fn log_out(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
