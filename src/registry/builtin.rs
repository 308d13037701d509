//! Built-in profiles embedded at compile time.

use include_dir::{include_dir, Dir};

use super::Document;
use crate::error::{DevplanError, Result};

/// Embedded profiles directory.
static PROFILES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/profiles");

/// Path of the manifest index inside the embedded directory.
pub const MANIFEST_FILE: &str = "manifest.yml";

/// Load the embedded manifest index document.
pub fn manifest_document() -> Result<Document> {
    let file = PROFILES_DIR
        .get_file(MANIFEST_FILE)
        .ok_or_else(|| DevplanError::ConfigNotFound {
            path: format!("profiles/{}", MANIFEST_FILE).into(),
        })?;

    let content = file
        .contents_utf8()
        .ok_or_else(|| DevplanError::ConfigParseError {
            path: format!("profiles/{}", MANIFEST_FILE).into(),
            message: "Invalid UTF-8".to_string(),
        })?;

    Ok(Document {
        origin: format!("profiles/{}", MANIFEST_FILE),
        content: content.to_string(),
        category_dir: None,
    })
}

/// Load every embedded profile document.
///
/// Each subdirectory is a category (web, ml, ...) holding one file per
/// profile. Files are returned sorted by path.
pub fn profile_documents() -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    for category in PROFILES_DIR.dirs() {
        let category_name = category
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        for file in category.files() {
            let is_yaml = file
                .path()
                .extension()
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);
            if !is_yaml {
                continue;
            }

            let origin = format!("profiles/{}", file.path().display());
            let content = file
                .contents_utf8()
                .ok_or_else(|| DevplanError::ConfigParseError {
                    path: origin.clone().into(),
                    message: "Invalid UTF-8".to_string(),
                })?;

            documents.push(Document {
                origin,
                content: content.to_string(),
                category_dir: category_name.clone(),
            });
        }
    }

    documents.sort_by(|a, b| a.origin.cmp(&b.origin));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_is_embedded() {
        let doc = manifest_document().unwrap();
        assert_eq!(doc.origin, "profiles/manifest.yml");
        assert!(doc.content.contains("version"));
    }

    #[test]
    fn profile_documents_live_in_category_dirs() {
        let docs = profile_documents().unwrap();
        assert!(!docs.is_empty());
        assert!(docs.iter().all(|d| d.category_dir.is_some()));
        assert!(docs
            .iter()
            .any(|d| d.origin == "profiles/web/web-nextjs.yml"));
    }

    #[test]
    fn profile_documents_are_sorted() {
        let docs = profile_documents().unwrap();
        let origins: Vec<_> = docs.iter().map(|d| d.origin.clone()).collect();
        let mut sorted = origins.clone();
        sorted.sort();
        assert_eq!(origins, sorted);
    }
}
