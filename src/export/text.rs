/*!
 * Plain-text export of the displayed signs.
 *
 * Offered when a raster snapshot is unavailable or declined.
 */

use bytes::Bytes;
use chrono::{DateTime, Local};

use super::{ExportArtifact, TEXT_MIME};

/// File name of text exports
pub fn text_file_name(product: &str) -> String {
    format!("{}-signwriting.txt", product)
}

/// Build the report: banner, timestamp, count, numbered tokens, raw FSW line
pub fn text_report(product: &str, tokens: &[String], generated: DateTime<Local>) -> String {
    let title = format!("{} - Sign Writing Export", display_name(product));
    let mut lines = vec![
        title.clone(),
        "=".repeat(title.chars().count()),
        format!("Generated: {}", generated.format("%Y-%m-%d %H:%M:%S")),
        format!("Number of signs: {}", tokens.len()),
        String::new(),
        "FSW Tokens:".to_string(),
    ];
    lines.extend(tokens.iter().enumerate().map(|(i, token)| format!("{}. {}", i + 1, token)));
    lines.push(String::new());
    lines.push("Raw FSW String:".to_string());
    lines.push(tokens.join(" "));
    lines.join("\n")
}

/// Wrap a report into an artifact
pub fn text_artifact(product: &str, tokens: &[String], generated: DateTime<Local>) -> ExportArtifact {
    ExportArtifact {
        file_name: text_file_name(product),
        mime_type: TEXT_MIME,
        bytes: Bytes::from(text_report(product, tokens, generated)),
        created_at_ms: generated.timestamp_millis(),
    }
}

fn display_name(product: &str) -> String {
    if product.eq_ignore_ascii_case("signcast") {
        return "SignCast".to_string();
    }
    let mut chars = product.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
