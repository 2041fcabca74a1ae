/*!
 * Artifact delivery.
 *
 * A sink stands in for the browser's download action: `DirectorySink` writes the
 * file into a directory, `MemorySink` keeps artifacts for embedding code and tests.
 */

use async_trait::async_trait;
use log::info;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::errors::ExportFailed;

use super::ExportArtifact;

/// Destination for finished exports
#[async_trait]
pub trait ArtifactSink: Send + Sync + Debug {
    /// Hand an artifact over. The sink owns it afterwards.
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<(), ExportFailed>;
}

/// Writes artifacts into a directory under their file name
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Where an artifact ends up
    pub fn path_for(&self, artifact: &ExportArtifact) -> PathBuf {
        crate::file_utils::FileManager::generate_output_path(&self.dir, &artifact.file_name)
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<(), ExportFailed> {
        let path = self.path_for(artifact);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ExportFailed::Delivery(format!("{:?}: {}", self.dir, e)))?;
        tokio::fs::write(&path, &artifact.bytes)
            .await
            .map_err(|e| ExportFailed::Delivery(format!("{:?}: {}", path, e)))?;

        info!("Saved {} ({} bytes) to {:?}", artifact.mime_type, artifact.len(), path);
        Ok(())
    }
}

/// Keeps delivered artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<ExportArtifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far
    pub fn delivered(&self) -> Vec<ExportArtifact> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<(), ExportFailed> {
        self.delivered.lock().push(artifact.clone());
        Ok(())
    }
}
