use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Export file name, e.g. `signcast-translation-1700000000000.png`
    pub fn export_file_name(product: &str, timestamp_ms: i64, extension: &str) -> String {
        format!("{}-translation-{}.{}", product, timestamp_ms, extension.trim_start_matches('.'))
    }

    // @generates: Output path inside a directory
    pub fn generate_output_path<P: AsRef<Path>>(output_dir: P, file_name: &str) -> PathBuf {
        output_dir.as_ref().join(file_name)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read whitespace separated FSW tokens from a file
    pub fn read_tokens<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let content = Self::read_to_string(path)?;
        Ok(content.split_whitespace().map(str::to_string).collect())
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        Self::write_bytes(path, content.as_bytes())
    }

    /// Write bytes to a file, creating the parent directory first
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Detect the format of a font file from its leading bytes
    pub fn detect_font_format(bytes: &[u8]) -> FontFormat {
        match bytes.get(..4) {
            Some([0x00, 0x01, 0x00, 0x00]) | Some(b"true") => FontFormat::TrueType,
            Some(b"OTTO") => FontFormat::OpenType,
            Some(b"wOFF") => FontFormat::Woff,
            Some(b"wOF2") => FontFormat::Woff2,
            _ => FontFormat::Unknown,
        }
    }

    /// Find a font file for a family in a directory, trying the known extensions
    pub fn find_font_file<P: AsRef<Path>>(dir: P, family: &str) -> Option<PathBuf> {
        ["ttf", "otf", "woff2", "woff"]
            .iter()
            .map(|ext| dir.as_ref().join(format!("{}.{}", family, ext)))
            .find(|candidate| Self::file_exists(candidate))
    }
}

/// Enum representing the font container formats we accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    /// TrueType outlines
    TrueType,
    /// CFF based OpenType
    OpenType,
    /// WOFF 1.0 container
    Woff,
    /// WOFF 2.0 container
    Woff2,
    /// Anything else
    Unknown,
}
