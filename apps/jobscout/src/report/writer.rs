use std::path::Path;

use tracing::info;

use crate::errors::AppError;
use crate::report::Report;

/// Serializes the report as pretty JSON at `path`, overwriting any previous run.
pub async fn write_report(path: &Path, report: &Report) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| AppError::Persistence(format!("cannot serialize report: {e}")))?;
    tokio::fs::write(path, json).await.map_err(|e| {
        AppError::Persistence(format!("cannot write {}: {e}", path.display()))
    })?;
    info!("Report saved to {}", path.display());
    Ok(())
}

pub async fn load_report(path: &Path) -> Result<Report, AppError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&json)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("{} is not a report: {e}", path.display())))
}
