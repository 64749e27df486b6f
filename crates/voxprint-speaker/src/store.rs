//! On-disk store for exported speaker profiles.
//!
//! Profiles are opaque blobs written verbatim to `<dir>/<label>.txt`.
//! Saves go through a temp file plus rename so a partial profile is never
//! visible. `load_all` returns profiles sorted lexicographically by label;
//! earlier revisions inherited filesystem enumeration order, which is not
//! stable across platforms.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::SpeakerProfile;

/// File extension used for stored profiles, kept from the original layout.
pub const PROFILE_EXT: &str = "txt";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid profile label: {0:?}")]
    InvalidLabel(String),

    #[error("Failed to write profile {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read profile {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", label, PROFILE_EXT))
    }

    /// Write the profile bytes verbatim under the given label, replacing
    /// any previous profile in one step. The bytes land in a temp file
    /// first and are renamed into place, so no partial profile is ever
    /// observable.
    pub fn save(&self, label: &str, profile: &SpeakerProfile) -> Result<PathBuf, StoreError> {
        validate_label(label)?;

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(label);
        let tmp = self.dir.join(format!(".{}.{}.tmp", label, PROFILE_EXT));

        fs::write(&tmp, profile.as_bytes()).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            "Saved speaker profile '{}' ({} bytes) to {}",
            label,
            profile.len(),
            path.display()
        );
        Ok(path)
    }

    /// Load every stored profile as `(label, profile)` pairs, sorted
    /// lexicographically by label. A missing directory is an empty store.
    pub fn load_all(&self) -> Result<Vec<(String, SpeakerProfile)>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut profiles = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Read {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXT) {
                continue;
            }
            let Some(label) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if label.starts_with('.') {
                continue;
            }
            let bytes = fs::read(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            profiles.push((label.to_string(), SpeakerProfile::from_bytes(bytes)));
        }

        profiles.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(profiles)
    }
}

/// Check a label before enrollment starts, so a bad name fails fast
/// instead of after minutes of speaking.
pub fn validate_label(label: &str) -> Result<(), StoreError> {
    let ok = !label.is_empty()
        && !label.starts_with('.')
        && !label.chars().any(|c| std::path::is_separator(c) || c == '\0');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidLabel(label.to_string()))
    }
}
