//! [`FsPhotoStore`]: profile photos on the local filesystem.
//!
//! Objects are written flat into one directory and served by the HTTP
//! server under `{base_url}/photos/{name}`.

use std::path::{Path, PathBuf};

use creatorlink_core::store::PhotoStorage;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct FsPhotoStore {
  dir:      PathBuf,
  base_url: String,
}

impl FsPhotoStore {
  pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_owned();
    Self { dir: dir.into(), base_url }
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Resolve an object name to its file, rejecting anything that is not a
  /// single plain path component.
  pub fn path_for(&self, name: &str) -> Result<PathBuf> {
    let plain = !name.is_empty()
      && !name.starts_with('.')
      && name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !plain {
      return Err(Error::PhotoName(name.to_owned()));
    }
    Ok(self.dir.join(name))
  }
}

impl PhotoStorage for FsPhotoStore {
  type Error = Error;

  async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String> {
    let path = self.path_for(name)?;
    tokio::fs::create_dir_all(&self.dir).await?;
    tokio::fs::write(&path, bytes).await?;
    Ok(self.public_url(name))
  }

  fn public_url(&self, name: &str) -> String {
    format!("{}/photos/{name}", self.base_url)
  }
}
