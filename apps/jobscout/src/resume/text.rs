use std::path::Path;

use tokio::fs;
use tracing::info;

use crate::errors::AppError;

/// Reads the resume at `path` as plain text.
///
/// `.pdf` goes through `pdf-extract`; `.txt` and `.md` are read as UTF-8.
/// A missing, unreadable or blank document is an `Extraction` error.
pub async fn extract_text(path: &Path) -> Result<String, AppError> {
    info!("Extracting text from resume {}", path.display());

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => {
            let bytes = fs::read(path).await.map_err(|e| {
                AppError::Extraction(format!("cannot open {}: {e}", path.display()))
            })?;
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
                AppError::Extraction(format!("cannot read PDF {}: {e}", path.display()))
            })?
        }
        "txt" | "md" | "text" => fs::read_to_string(path).await.map_err(|e| {
            AppError::Extraction(format!("cannot open {}: {e}", path.display()))
        })?,
        other => {
            return Err(AppError::Extraction(format!(
                "unsupported resume format '{other}' for {}; expected pdf, txt or md",
                path.display()
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::Extraction(format!(
            "{} contains no text",
            path.display()
        )));
    }

    info!("Extracted {} characters from resume", text.len());
    Ok(text)
}
