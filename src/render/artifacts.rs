use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use uuid::Uuid;

use crate::error::{ExplorerError, Result};
use crate::render::Rendered;

/// Directory of one session's rendered artifacts, `<base>/<session-id>/`.
///
/// Rewriting an artifact name replaces the previous file, but only within
/// the session: two sessions sharing a base directory never touch each
/// other's files.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    session: Uuid,
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn create(base: impl AsRef<Path>) -> Result<Self> {
        let session = Uuid::new_v4();
        let dir = base.as_ref().join(session.to_string());
        fs::create_dir_all(&dir).map_err(|e| ExplorerError::io(&dir, e))?;
        Ok(ArtifactStore { session, dir })
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path(name);
        fs::write(&path, contents).map_err(|e| ExplorerError::io(&path, e))?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    /// Persists a rendered network under `<stem>.<html|svg>`.
    pub fn write_rendered(&self, stem: &str, rendered: &Rendered) -> Result<PathBuf> {
        self.write(&format!("{stem}.{}", rendered.extension()), rendered.contents())
    }
}
