//! Profile documents from user-configured directories.

use std::fs;
use std::path::{Path, PathBuf};

use super::Document;
use crate::error::Result;

/// Read every `.yml`/`.yaml` file under the given directories (recursively).
///
/// Directories that don't exist are skipped with a warning.
pub fn profile_documents(dirs: &[PathBuf]) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for dir in dirs {
        if !dir.exists() {
            tracing::warn!(
                "Configured profile directory {} does not exist, skipping",
                dir.display()
            );
            continue;
        }
        load_recursive(dir, &mut documents)?;
    }
    Ok(documents)
}

fn load_recursive(dir: &Path, documents: &mut Vec<Document>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            load_recursive(&path, documents)?;
        } else if path
            .extension()
            .map(|e| e == "yml" || e == "yaml")
            .unwrap_or(false)
        {
            let content = fs::read_to_string(&path)?;
            documents.push(Document {
                origin: path.display().to_string(),
                content,
                category_dir: None,
            });
        }
    }

    Ok(())
}
