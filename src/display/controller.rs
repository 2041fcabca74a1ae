/*!
 * Display state controller.
 *
 * Owns one mount of the SignWriting display: the font gate, the token normalizer,
 * the current token sequences and the rendered glyph tree. The visible state is
 * never stored; it is derived from font readiness, the normalized token count
 * and the exporting flag.
 */

use anyhow::Result;
use chrono::Local;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, Direction};
use crate::errors::{ExportFailed, FontLoadFailed};
use crate::export::text::text_artifact;
use crate::export::{
    ArtifactSink, DirectorySink, ExportArtifact, ExportRasterizer, GlyphRenderer, OutlineGlyphRenderer,
};
use crate::services::SignWritingService;
use crate::services::local::LocalSignWritingService;

use super::font_gate::{FontGate, FontReadiness};
use super::normalizer::{Generation, NormalizationStats, TokenNormalizer};
use super::renderer::{GlyphStyle, GlyphTree, render};

/// What the display is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Fonts are still loading
    Loading,
    /// Fonts failed to load; terminal for this mount
    FontLoadFailed,
    /// Fonts are ready and there is nothing to show
    Empty,
    /// Signs are shown, possibly while an export snapshot is taken
    Ready { exporting: bool },
}

impl DisplayState {
    /// Derive the state from its inputs
    pub fn derive(readiness: FontReadiness, token_count: usize, exporting: bool) -> Self {
        match readiness {
            FontReadiness::Unknown => Self::Loading,
            FontReadiness::Failed => Self::FontLoadFailed,
            FontReadiness::Ready if token_count == 0 => Self::Empty,
            FontReadiness::Ready => Self::Ready { exporting },
        }
    }

    /// Short badge text
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::FontLoadFailed => "Font Loading Failed",
            Self::Empty => "Empty",
            Self::Ready { exporting: false } => "Ready",
            Self::Ready { exporting: true } => "Exporting",
        }
    }

    /// Message shown in place of the signs, if any
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some("Loading SignWriting fonts..."),
            Self::FontLoadFailed => Some("Font Loading Failed. Please refresh the page to try again."),
            Self::Empty => Some("No Signs to Display. Enter text and translate to see SignWriting."),
            Self::Ready { .. } => None,
        }
    }
}

/// Result of handing a new token sequence to the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// The sequence was normalized and is now displayed
    Applied {
        count: usize,
        stats: NormalizationStats,
    },
    /// The sequence equals the one already displayed
    Unchanged,
    /// A newer sequence arrived first; this result was discarded
    Superseded,
}

#[derive(Debug)]
struct DisplayData {
    raw: Vec<String>,
    normalized: Vec<String>,
    tree: GlyphTree,
    committed: Option<(Generation, Vec<String>)>,
    notice: Option<String>,
}

/// One mounted SignWriting display
#[derive(Debug)]
pub struct DisplayController {
    gate: Arc<FontGate>,
    normalizer: TokenNormalizer,
    exporter: ExportRasterizer,
    direction: Direction,
    style: GlyphStyle,
    data: RwLock<DisplayData>,
}

impl DisplayController {
    /// Create a display from a configuration and its collaborators
    pub fn new(
        config: &Config,
        service: Arc<dyn SignWritingService>,
        renderer: Arc<dyn GlyphRenderer>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Result<Self> {
        let gate = Arc::new(FontGate::new(
            Arc::clone(&service),
            config.fonts.load_timeout_ms.map(Duration::from_millis),
        ));
        let normalizer = TokenNormalizer::new(
            service,
            config.normalization.token_timeout_ms.map(Duration::from_millis),
        );
        let exporter = ExportRasterizer::from_config(config, Arc::clone(&gate), renderer, sink);

        let style = GlyphStyle {
            color: config.display.ink()?,
            size: config.display.sign_size,
            font_family: config.fonts.line_family.clone(),
        };

        Ok(Self {
            gate,
            normalizer,
            exporter,
            direction: config.display.direction,
            style,
            data: RwLock::new(DisplayData {
                raw: Vec::new(),
                normalized: Vec::new(),
                tree: GlyphTree::Empty,
                committed: None,
                notice: None,
            }),
        })
    }

    /// Create a display backed by local fonts, the outline renderer and the
    /// configured output directory
    pub fn from_config(config: &Config) -> Result<Self> {
        let service = LocalSignWritingService::from_config(&config.fonts)?;
        let renderer =
            OutlineGlyphRenderer::new(service.metrics()).with_families(config.fonts.families());
        let sink = DirectorySink::new(config.export.resolve_output_dir());

        Self::new(config, Arc::new(service), Arc::new(renderer), Arc::new(sink))
    }

    /// Load the fonts for this mount and report the resulting state
    pub async fn mount(&self) -> DisplayState {
        if let Err(e) = self.gate.ensure_ready().await {
            warn!("{}", e);
        }
        self.state()
    }

    /// Display a new token sequence.
    ///
    /// Waits for the fonts, then normalizes every token. If another sequence is
    /// set before this one finishes, this result is discarded.
    pub async fn set_tokens(&self, raw: Vec<String>) -> Result<NormalizeOutcome, FontLoadFailed> {
        {
            let data = self.data.read();
            if let Some((generation, input)) = &data.committed {
                if *input == raw && self.normalizer.is_current(*generation) {
                    return Ok(NormalizeOutcome::Unchanged);
                }
            }
        }

        let generation = self.normalizer.begin();
        self.data.write().raw = raw.clone();

        self.gate.ensure_ready().await?;

        let normalization = self.normalizer.normalize(generation, &raw).await;

        let mut data = self.data.write();
        if !self.normalizer.is_current(generation) {
            debug!("Discarding normalization of {} superseded token(s)", raw.len());
            return Ok(NormalizeOutcome::Superseded);
        }

        let count = normalization.tokens.len();
        data.tree = render(&normalization.tokens, self.direction, &self.style);
        data.normalized = normalization.tokens;
        data.committed = Some((generation, raw));
        info!("Displaying {} sign(s)", count);

        Ok(NormalizeOutcome::Applied {
            count,
            stats: normalization.stats,
        })
    }

    /// The current state
    pub fn state(&self) -> DisplayState {
        let count = self.data.read().normalized.len();
        DisplayState::derive(self.gate.readiness(), count, self.exporter.is_exporting())
    }

    /// Badge text of the embedding section, e.g. `3 signs · Ready`
    pub fn status_line(&self) -> String {
        let state = self.state();
        let count = self.data.read().normalized.len();
        match state {
            DisplayState::Loading => "Processing... · Loading".to_string(),
            _ => format!(
                "{} sign{} · {}",
                count,
                if count == 1 { "" } else { "s" },
                state.badge()
            ),
        }
    }

    pub fn glyph_tree(&self) -> GlyphTree {
        self.data.read().tree.clone()
    }

    pub fn normalized_tokens(&self) -> Vec<String> {
        self.data.read().normalized.clone()
    }

    pub fn raw_tokens(&self) -> Vec<String> {
        self.data.read().raw.clone()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_exporting()
    }

    /// The notice left by the last failed export
    pub fn failure_notice(&self) -> Option<String> {
        self.data.read().notice.clone()
    }

    /// Export the displayed signs as an image.
    ///
    /// Works on a copy of the glyph tree taken now, so token updates during the
    /// export do not affect the snapshot.
    pub async fn export_image(&self) -> Result<ExportArtifact, ExportFailed> {
        let result = match self.state() {
            DisplayState::Ready { exporting: true } => Err(ExportFailed::AlreadyInProgress),
            DisplayState::Ready { exporting: false } => {
                self.exporter.export_image(self.glyph_tree()).await
            }
            DisplayState::Loading | DisplayState::FontLoadFailed => {
                Err(ExportFailed::FontsUnavailable)
            }
            DisplayState::Empty => Err(ExportFailed::NothingToExport),
        };

        self.data.write().notice = result.as_ref().err().map(|e| e.user_notice());
        result
    }

    /// Export the displayed tokens as a text file
    pub async fn export_text(&self) -> Result<ExportArtifact, ExportFailed> {
        if self.state() == DisplayState::Empty {
            return Err(ExportFailed::NothingToExport);
        }
        let tokens = self.normalized_tokens();
        if tokens.is_empty() {
            return Err(ExportFailed::NothingToExport);
        }

        let artifact = text_artifact(self.exporter.product(), &tokens, Local::now());
        self.exporter.sink().deliver(&artifact).await?;
        Ok(artifact)
    }
}
