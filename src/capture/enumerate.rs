use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// List video capture nodes (`video*`) under `/dev`
pub async fn enumerate_devices() -> Result<Vec<PathBuf>> {
    enumerate_devices_in(Path::new("/dev")).await
}

async fn enumerate_devices_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to list {:?}", dir))?;

    let mut devices = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_string_lossy().starts_with("video") {
            devices.push(entry.path());
        }
    }

    devices.sort();
    Ok(devices)
}
