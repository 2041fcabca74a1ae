use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Display settings for the glyph tree
    #[serde(default)]
    pub display: DisplayConfig,

    /// Glyph font settings
    #[serde(default)]
    pub fonts: FontConfig,

    /// Token normalization settings
    #[serde(default)]
    pub normalization: NormalizationConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Layout direction of the sign sequence
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    // @layout: Signs side by side
    Row,
    // @layout: Signs stacked vertically
    #[default]
    #[serde(rename = "col", alias = "column")]
    Column,
}

impl Direction {
    // @returns: Short identifier used in configs and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "col",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "row" => Ok(Self::Row),
            "col" | "column" => Ok(Self::Column),
            _ => Err(anyhow!("Invalid direction: {}", s)),
        }
    }
}

/// Light or dark background used when exporting
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    // @returns: Background color as RGBA
    pub fn background(&self) -> [u8; 4] {
        match self {
            Self::Light => [0xff, 0xff, 0xff, 0xff],
            Self::Dark => [0x11, 0x18, 0x27, 0xff],
        }
    }

    // @returns: Default glyph ink color as RGBA
    pub fn foreground(&self) -> [u8; 4] {
        match self {
            Self::Light => [0x00, 0x00, 0x00, 0xff],
            Self::Dark => [0xf9, 0xfa, 0xfb, 0xff],
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(anyhow!("Invalid theme: {}", s)),
        }
    }
}

/// Glyph tree display settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Layout direction
    #[serde(default)]
    pub direction: Direction,

    /// Glyph size in pixels
    #[serde(default = "default_sign_size")]
    pub sign_size: u32,

    /// Active theme
    #[serde(default)]
    pub theme: Theme,

    /// Ink color override as a `#rrggbb` string
    #[serde(default)]
    pub color: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            sign_size: default_sign_size(),
            theme: Theme::default(),
            color: None,
        }
    }
}

impl DisplayConfig {
    /// Resolve the ink color, honoring the override when it parses
    pub fn ink(&self) -> Result<[u8; 4]> {
        match &self.color {
            Some(hex) => parse_hex_color(hex),
            None => Ok(self.theme.foreground()),
        }
    }
}

/// Glyph font settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FontConfig {
    /// Family name of the line face
    #[serde(default = "default_line_family")]
    pub line_family: String,

    /// Family name of the fill face
    #[serde(default = "default_fill_family")]
    pub fill_family: String,

    /// Directory holding `<family>.ttf` files; built-in faces when unset
    #[serde(default)]
    pub font_dir: Option<PathBuf>,

    /// JSON table of symbol sizes; the embedded table is used when unset
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,

    /// Upper bound on the font load, in milliseconds
    #[serde(default)]
    pub load_timeout_ms: Option<u64>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            line_family: default_line_family(),
            fill_family: default_fill_family(),
            font_dir: None,
            metrics_path: None,
            load_timeout_ms: None,
        }
    }
}

impl FontConfig {
    /// Both font families, line face first
    pub fn families(&self) -> [&str; 2] {
        [self.line_family.as_str(), self.fill_family.as_str()]
    }
}

/// Token normalization settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct NormalizationConfig {
    /// Upper bound on a single token normalization, in milliseconds
    #[serde(default)]
    pub token_timeout_ms: Option<u64>,
}

/// Export settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExportConfig {
    /// Settling delay before rasterizing, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Supersampling scale for image exports
    #[serde(default = "default_scale")]
    pub scale: u32,

    /// Product name used in export file names
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Where exported files are written
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            scale: default_scale(),
            product_name: default_product_name(),
            output_dir: None,
        }
    }
}

impl ExportConfig {
    /// Output directory, falling back to the user's download directory
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Largest glyph size accepted by `validate`
pub const MAX_SIGN_SIZE: u32 = 1024;

fn default_sign_size() -> u32 {
    48
}

fn default_line_family() -> String {
    "SuttonSignWritingLine".to_string()
}

fn default_fill_family() -> String {
    "SuttonSignWritingFill".to_string()
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_scale() -> u32 {
    2
}

fn default_product_name() -> String {
    "signcast".to_string()
}

/// Parse a `#rrggbb` or `#rrggbbaa` color
pub fn parse_hex_color(hex: &str) -> Result<[u8; 4]> {
    let digits = hex.trim().trim_start_matches('#');
    if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
        return Err(anyhow!("Invalid color: {}", hex));
    }

    let channel = |i: usize| -> Result<u8> {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| anyhow!("Invalid color: {}", hex))
    };

    let alpha = if digits.len() == 8 { channel(6)? } else { 0xff };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SIGN_SIZE).contains(&self.display.sign_size) {
            return Err(anyhow!(
                "Sign size must be between 1 and {} pixels, got {}",
                MAX_SIGN_SIZE,
                self.display.sign_size
            ));
        }

        self.display.ink().context("Invalid display color")?;

        if self.fonts.line_family.trim().is_empty() || self.fonts.fill_family.trim().is_empty() {
            return Err(anyhow!("Both SignWriting font families must be named"));
        }

        if !(1..=8).contains(&self.export.scale) {
            return Err(anyhow!("Export scale must be between 1 and 8, got {}", self.export.scale));
        }

        if self.export.product_name.trim().is_empty() {
            return Err(anyhow!("Export product name cannot be empty"));
        }

        Ok(())
    }

    /// Load a configuration file, or write the default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        log::warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        crate::file_utils::FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            display: DisplayConfig::default(),
            fonts: FontConfig::default(),
            normalization: NormalizationConfig::default(),
            export: ExportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
