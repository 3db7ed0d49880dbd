//! Character documents on disk

use std::path::Path;

use sheetforge_domain::CharacterDocument;

use crate::error::EngineError;

/// Reads and version-checks a JSON document.
pub fn load_document(path: &Path) -> Result<CharacterDocument, EngineError> {
    let json = std::fs::read_to_string(path)?;
    let document = CharacterDocument::from_json(&json)?;
    tracing::debug!(path = %path.display(), version = document.version, "Loaded document");
    Ok(document)
}

pub fn save_document(path: &Path, document: &CharacterDocument) -> Result<(), EngineError> {
    std::fs::write(path, document.to_json()?)?;
    tracing::debug!(path = %path.display(), "Saved document");
    Ok(())
}
