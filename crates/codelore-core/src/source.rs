//! Source file reading with a soft line cap.
//!
//! Very large files are cut after a configured number of lines with a
//! visible marker, so a pathological input can't blow up prompt
//! composition. Invalid UTF-8 is replaced, not rejected.

use std::path::Path;

use tracing::debug;

/// Errors from reading the analyzed file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("could not read file: {0}")]
    Read(#[from] std::io::Error),
}

/// Read a file as text, keeping at most `max_lines` lines.
pub async fn read_capped(path: &Path, max_lines: usize) -> Result<String, SourceError> {
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes);

    let mut out = String::with_capacity(text.len().min(1 << 20));
    for (i, line) in text.split_inclusive('\n').enumerate() {
        if i >= max_lines {
            debug!(path = %path.display(), max_lines, "file truncated while reading");
            out.push_str(&format!("\n... [file truncated after {max_lines} lines] ..."));
            break;
        }
        out.push_str(line);
    }
    Ok(out)
}
