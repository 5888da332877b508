use anyhow::Result;
use regex::Regex;
use std::path::Path;

/// Document types the backend can translate
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "docx", "doc"];

fn is_safe_filename(filename: &str) -> bool {
    if filename.is_empty() || filename.len() > 255 {
        return false;
    }

    // Must be a bare file name, no path components
    if Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename) {
        return false;
    }

    let pattern = Regex::new(r#"^[^/\\:*?"<>|\x00]+$"#).unwrap();
    pattern.is_match(filename)
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check an uploaded document before anything is sent to the backend.
pub fn validate_upload(filename: &str, size_bytes: u64, max_bytes: u64) -> Result<()> {
    if !is_safe_filename(filename) {
        return Err(anyhow::anyhow!("Invalid file name: {}", filename));
    }

    let ext = extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension"))?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(anyhow::anyhow!(
            "Unsupported file type: .{} (allowed: .txt, .pdf, .docx, .doc)",
            ext
        ));
    }

    if size_bytes > max_bytes {
        return Err(anyhow::anyhow!(
            "File too large (max {} MB)",
            max_bytes / (1024 * 1024)
        ));
    }

    Ok(())
}

/// Download name for a translated document: `{stem}_{source}_{target}{ext}`
pub fn translated_file_name(filename: &str, source_lang: &str, target_lang: &str) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    match extension(filename) {
        Some(ext) => format!("{}_{}_{}.{}", stem, source_lang, target_lang, ext),
        None => format!("{}_{}_{}", stem, source_lang, target_lang),
    }
}
