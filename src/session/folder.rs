use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A user-selected directory that receives clips and the session log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFolder {
    root: PathBuf,
}

impl OutputFolder {
    /// Open an existing directory as the output folder.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let root = path.into();
        let metadata = tokio::fs::metadata(&root)
            .await
            .with_context(|| format!("Failed to access output folder: {:?}", root))?;

        if !metadata.is_dir() {
            return Err(anyhow::anyhow!("{:?} is not a directory", root));
        }

        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read a text file, creating it empty when it does not exist yet.
    pub async fn read_text_or_create(&self, name: &str) -> Result<String> {
        let path = self.file_path(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::write(&path, "")
                    .await
                    .with_context(|| format!("Failed to create {:?}", path))?;
                Ok(String::new())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", path)),
        }
    }

    /// Replace the full contents of `name`.
    pub async fn write(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.file_path(name);
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        Ok(path)
    }

    /// Copy an existing file into the folder under `name`, never replacing
    /// an existing file. See [`copy_unique`].
    pub async fn copy_in(&self, name: &str, source: &Path) -> Result<PathBuf> {
        copy_unique(source, &self.root, name).await
    }
}

/// Copy `source` into `dir` as `name`, or as `<stem>-1.<ext>`, `<stem>-2.<ext>`...
/// when that name is taken. Returns the path actually written.
pub async fn copy_unique(source: &Path, dir: &Path, name: &str) -> Result<PathBuf> {
    let mut input = tokio::fs::File::open(source)
        .await
        .with_context(|| format!("Failed to open {:?}", source))?;

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = match (attempt, extension) {
            (0, _) => name.to_string(),
            (n, Some(ext)) => format!("{}-{}.{}", stem, n, ext),
            (n, None) => format!("{}-{}", stem, n),
        };
        let path = dir.join(&candidate);

        let mut output = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e).with_context(|| format!("Failed to create {:?}", path)),
        };

        let copied = async {
            tokio::io::copy(&mut input, &mut output).await?;
            output.flush().await
        }
        .await;

        if let Err(e) = copied {
            drop(output);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e).with_context(|| format!("Failed to copy {:?} to {:?}", source, path));
        }

        if attempt > 0 {
            tracing::info!("{:?} already exists, wrote {:?} instead", name, candidate);
        }
        return Ok(path);
    }

    Err(anyhow::anyhow!("No free file name for {} in {:?}", name, dir))
}
