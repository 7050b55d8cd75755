// Document ingestion from the filesystem
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::Result;

/// A loaded source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier used in citations
    pub source: String,
    pub text: String,
    pub path: PathBuf,
}

/// Load one UTF-8 text file
pub fn load_document(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path)?;
    Ok(Document {
        source: file_name_of(path),
        text,
        path: path.to_path_buf(),
    })
}

/// Load every readable document in `paths`.
///
/// Unreadable or non-UTF-8 files are skipped with a warning. A file name
/// seen twice is cited by its full path, and a full path seen twice gets a
/// `#2`, `#3`, ... suffix, so chunk ids stay unique.
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> Vec<Document> {
    let mut documents = Vec::with_capacity(paths.len());
    let mut seen = HashSet::new();

    for path in paths {
        let path = path.as_ref();
        match load_document(path) {
            Ok(mut doc) => {
                if seen.contains(&doc.source) {
                    let unique = unique_source(&seen, path.display().to_string());
                    warn!(
                        source = %doc.source,
                        cited_as = %unique,
                        "Duplicate document name"
                    );
                    doc.source = unique;
                }
                seen.insert(doc.source.clone());
                debug!(source = %doc.source, bytes = doc.text.len(), "Loaded document");
                documents.push(doc);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping document");
            }
        }
    }

    documents
}

/// First of `base`, `base#2`, `base#3`, ... not yet in `seen`
fn unique_source(seen: &HashSet<String>, base: String) -> String {
    if !seen.contains(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}#{}", base, n);
        if !seen.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
