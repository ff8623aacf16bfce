/// Report file download
///
/// Report files are not hosted anywhere yet, so a download writes a short
/// placeholder document under the report's filename.
use std::path::{Path, PathBuf};

use rfd::FileDialog;
use tracing::info;

use crate::error::Result;

const PLACEHOLDER_CONTENT: &str =
    "This is a dummy medical report file for demonstration purposes.\n";

/// Ask where to save `file_name`. Returns `None` if the dialog was cancelled.
pub fn pick_destination(file_name: &str) -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Save Report")
        .set_file_name(file_name)
        .save_file()
}

/// Write the placeholder document to `destination`
pub async fn save_report(destination: PathBuf) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || write_placeholder(&destination).map(|_| destination))
        .await
        .map_err(|e| std::io::Error::other(format!("Task join error: {e}")))?
}

fn write_placeholder(destination: &Path) -> Result<()> {
    std::fs::write(destination, PLACEHOLDER_CONTENT)?;
    info!(path = %destination.display(), "report saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_placeholder() {
        let path = std::env::temp_dir().join(format!("medisetu_download_{}.txt", std::process::id()));
        write_placeholder(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PLACEHOLDER_CONTENT);
        std::fs::remove_file(&path).unwrap();
    }
}
