use std::path::{Path, PathBuf};

use crate::Result;

/// Durable on-device copy of captured media
pub trait MediaLibrary: Send + Sync {
    /// Copy `path` into the library, returning the stored location
    fn save(&self, path: &Path) -> Result<PathBuf>;
}

/// Library backed by a plain directory
pub struct LocalMediaLibrary {
    dir: PathBuf,
}

impl LocalMediaLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn destination_for(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".to_string());
        let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

        let name_for = |n: u32| {
            let base = if n == 0 {
                stem.clone()
            } else {
                format!("{}_{}", stem, n)
            };
            match &ext {
                Some(ext) => format!("{}.{}", base, ext),
                None => base,
            }
        };

        let mut n = 0;
        loop {
            let candidate = self.dir.join(name_for(n));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

impl MediaLibrary for LocalMediaLibrary {
    fn save(&self, path: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let destination = self.destination_for(path);
        std::fs::copy(path, &destination)?;
        tracing::debug!("Saved {} to library", destination.display());
        Ok(destination)
    }
}
