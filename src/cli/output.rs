//! Output formatting for CLI

use crate::models::{ErrorItem, Media};
use chrono::DateTime;

/// Maximum number of per-entry errors echoed in text mode
const MAX_ERRORS_SHOWN: usize = 5;

/// Render a capture timestamp; zero means the file carried none.
#[must_use]
pub fn format_captured_at(captured_at: i64) -> String {
    if captured_at == 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp(captured_at, 0)
        .map_or_else(|| captured_at.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn dimensions(media: &Media) -> String {
    media
        .original()
        .or_else(|| media.sizes.first())
        .map_or_else(|| "-".to_string(), |size| format!("{}x{}", size.width, size.height))
}

fn file_size(media: &Media) -> u64 {
    media
        .original()
        .or_else(|| media.sizes.first())
        .map_or(0, |size| size.file_size)
}

/// Print media as a human-readable table
pub fn format_text(root: &str, medias: &[Media], errors: &[ErrorItem]) {
    if medias.is_empty() {
        println!("No medias found.");
    } else {
        println!("{root} ({} medias)", medias.len());
        println!();
        println!(
            "{:<40} {:>11} {:>12} {:<19} {:<6}",
            "File", "Dimensions", "Bytes", "Captured", "State"
        );
        println!("{}", "-".repeat(92));

        for media in medias {
            println!(
                "{:<40} {:>11} {:>12} {:<19} {:<6}",
                media.filename,
                dimensions(media),
                file_size(media),
                format_captured_at(media.captured_at),
                media.state().as_str()
            );
        }
    }

    if !errors.is_empty() {
        println!();
        println!("Errors encountered: {}", errors.len());
        for error in errors.iter().take(MAX_ERRORS_SHOWN) {
            eprintln!("  {}: {}", error.path, error.message);
        }
        if errors.len() > MAX_ERRORS_SHOWN {
            eprintln!("  ... and {} more", errors.len() - MAX_ERRORS_SHOWN);
        }
    }
}

/// Format media as JSON
pub fn format_json(root: &str, medias: &[Media], errors: &[ErrorItem]) -> String {
    let output = serde_json::json!({
        "root": root,
        "medias": medias,
        "media_count": medias.len(),
        "error_count": errors.len(),
        "errors": if errors.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::json!(errors)
        }
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
