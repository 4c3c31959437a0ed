//! Flat-file persistence for built artifacts.
//!
//! Writes each artifact in both encodings under the output root:
//!
//! ```text
//! <output_root>/
//! ├── <raw_dir>/<name>.txt      (raw text)
//! ├── <encoded_dir>/<name>.b64  (Base64)
//! └── <index_file>              (Markdown index)
//! ```
//!
//! Writes go to a temp file first and are renamed into place, so a
//! crashed run never leaves a half-written artifact at its final path.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use linkmill_shared::{Artifact, ArtifactMeta, LinkmillError, Result, RunOptions};

/// Filesystem layout for one run's outputs.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    raw_dir: String,
    encoded_dir: String,
    index_file: String,
}

impl OutputLayout {
    /// Create the output directories, failing fast if the root is not
    /// writable (a setup failure, before any job runs).
    pub fn prepare(opts: &RunOptions) -> Result<Self> {
        let layout = Self {
            root: opts.output_root.clone(),
            raw_dir: opts.raw_dir.clone(),
            encoded_dir: opts.encoded_dir.clone(),
            index_file: opts.index_file.clone(),
        };

        for dir in [layout.raw_root(), layout.encoded_root()] {
            std::fs::create_dir_all(&dir).map_err(|e| LinkmillError::io(&dir, e))?;
        }

        debug!(root = %layout.root.display(), "output directories ready");
        Ok(layout)
    }

    fn raw_root(&self) -> PathBuf {
        self.root.join(&self.raw_dir)
    }

    fn encoded_root(&self) -> PathBuf {
        self.root.join(&self.encoded_dir)
    }

    /// Relative locator of the raw encoding, as used in the index.
    pub fn raw_rel(&self, name: &str) -> String {
        format!("{}/{name}.txt", self.raw_dir)
    }

    /// Relative locator of the Base64 encoding, as used in the index.
    pub fn encoded_rel(&self, name: &str) -> String {
        format!("{}/{name}.b64", self.encoded_dir)
    }

    /// Persist one artifact in both encodings and return its metadata.
    pub fn write_artifact(&self, artifact: &Artifact, source_count: usize) -> Result<ArtifactMeta> {
        let raw_path = self.raw_root().join(format!("{}.txt", artifact.name));
        let encoded_path = self.encoded_root().join(format!("{}.b64", artifact.name));

        write_atomic(&raw_path, artifact.raw_text.as_bytes())?;
        write_atomic(&encoded_path, artifact.base64_text.as_bytes())?;

        let mut hasher = Sha256::new();
        hasher.update(artifact.raw_text.as_bytes());
        let sha256 = format!("{:x}", hasher.finalize());

        debug!(
            name = %artifact.name,
            raw = %raw_path.display(),
            encoded = %encoded_path.display(),
            "artifact persisted"
        );

        Ok(ArtifactMeta {
            name: artifact.name.clone(),
            raw_path: self.raw_rel(&artifact.name),
            encoded_path: self.encoded_rel(&artifact.name),
            sha256,
            size_bytes: artifact.raw_text.len(),
            source_count,
            line_count: artifact.raw_text.lines().count(),
        })
    }

    /// Write the index document at the output root.
    pub fn write_index(&self, content: &str) -> Result<PathBuf> {
        let path = self.root.join(&self.index_file);
        write_atomic(&path, content.as_bytes())?;
        Ok(path)
    }
}

/// Write to a dot-prefixed temp file, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LinkmillError::validation(format!("bad output path: {}", path.display())))?;

    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, bytes).map_err(|e| LinkmillError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| LinkmillError::io(path, e))?;

    Ok(())
}
