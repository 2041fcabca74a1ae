/*!
 * Local SignWriting service.
 *
 * Font faces are either read from a font directory (`<family>.ttf|otf|woff2|woff`)
 * or provided by the built-in outline renderer when no directory is configured.
 * Normalization runs the FSW canonicalizer against a symbol metrics table.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app_config::FontConfig;
use crate::errors::ServiceError;
use crate::file_utils::{FileManager, FontFormat};
use crate::fsw::{SymbolMetrics, normalize_token};

use super::SignWritingService;

/// Where a loaded face came from
#[derive(Debug, Clone, PartialEq)]
pub enum FaceSource {
    /// Supplied by the crate's outline renderer
    Builtin,
    /// Read from a font file
    File(PathBuf),
}

/// A glyph font face that finished loading
#[derive(Debug, Clone)]
pub struct LoadedFace {
    pub family: String,
    pub source: FaceSource,
    pub format: Option<FontFormat>,
}

/// Service backed by local font files and the built-in canonicalizer
#[derive(Debug)]
pub struct LocalSignWritingService {
    families: [String; 2],
    font_dir: Option<PathBuf>,
    metrics: Arc<SymbolMetrics>,
    faces: RwLock<HashMap<String, LoadedFace>>,
    load_count: AtomicUsize,
}

impl LocalSignWritingService {
    /// Create a service from the font section of the configuration
    pub fn from_config(config: &FontConfig) -> Result<Self> {
        let metrics = match &config.metrics_path {
            Some(path) => SymbolMetrics::load(path)?,
            None => SymbolMetrics::embedded(),
        };

        Ok(Self::new(
            [config.line_family.clone(), config.fill_family.clone()],
            config.font_dir.clone(),
            metrics,
        ))
    }

    pub fn new(families: [String; 2], font_dir: Option<PathBuf>, metrics: SymbolMetrics) -> Self {
        Self {
            families,
            font_dir,
            metrics: Arc::new(metrics),
            faces: RwLock::new(HashMap::new()),
            load_count: AtomicUsize::new(0),
        }
    }

    /// Shared symbol metrics, also used by the glyph renderer
    pub fn metrics(&self) -> Arc<SymbolMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Number of face loads actually performed
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    /// A loaded face by family name
    pub fn face(&self, family: &str) -> Option<LoadedFace> {
        self.faces.read().get(family).cloned()
    }

    async fn load_face(&self, family: &str) -> Result<LoadedFace, ServiceError> {
        let Some(dir) = &self.font_dir else {
            return Ok(LoadedFace {
                family: family.to_string(),
                source: FaceSource::Builtin,
                format: None,
            });
        };

        let path = FileManager::find_font_file(dir, family).ok_or_else(|| ServiceError::FontLoad {
            family: family.to_string(),
            message: format!("no font file found in {:?}", dir),
        })?;

        let data = tokio::fs::read(&path).await.map_err(|e| ServiceError::FontLoad {
            family: family.to_string(),
            message: format!("{:?}: {}", path, e),
        })?;

        let format = FileManager::detect_font_format(&data);
        if format == FontFormat::Unknown {
            return Err(ServiceError::FontLoad {
                family: family.to_string(),
                message: format!("{:?} is not a font file", path),
            });
        }

        debug!("Loaded {} ({:?}, {} bytes) from {:?}", family, format, data.len(), path);
        Ok(LoadedFace {
            family: family.to_string(),
            source: FaceSource::File(path),
            format: Some(format),
        })
    }
}

#[async_trait]
impl SignWritingService for LocalSignWritingService {
    async fn load_fonts(&self) -> Result<(), ServiceError> {
        for family in &self.families {
            let already_loaded = self.faces.read().contains_key(family);
            if already_loaded {
                continue;
            }

            let face = self.load_face(family).await?;
            self.load_count.fetch_add(1, Ordering::SeqCst);
            self.faces.write().insert(family.clone(), face);
        }

        info!("SignWriting fonts ready: {}", self.families.join(", "));
        Ok(())
    }

    fn fonts_loaded(&self) -> bool {
        let faces = self.faces.read();
        self.families.iter().all(|family| faces.contains_key(family))
    }

    async fn normalize_fsw(&self, token: &str) -> Result<Option<String>, ServiceError> {
        normalize_token(token, &self.metrics).map_err(|e| ServiceError::Normalization {
            token: token.to_string(),
            message: e.to_string(),
        })
    }
}
