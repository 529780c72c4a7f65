//! Map document store
//!
//! Locates map documents by name inside a single maps directory.
//! Each map `name` lives in `<maps_dir>/<name>.ron`. All operations are
//! synchronous and complete immediately.

use std::path::{Path, PathBuf};
use tracing::debug;
use crate::error::{MapEditorError, Result};
use super::io::{parse_schematic, serialize_schematic};
use super::Schematic;

/// File extension of map documents
pub const MAP_EXTENSION: &str = "ron";

/// Filesystem store for map documents
#[derive(Debug, Clone)]
pub struct MapStore {
    /// Directory holding every map document
    maps_dir: PathBuf,
    /// Whether external edits to documents should trigger a reload
    file_watcher_enabled: bool,
    /// Write brotli-compressed documents instead of plain RON
    compress: bool,
}

impl MapStore {
    /// Create a store rooted at `maps_dir`
    pub fn new(maps_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
            file_watcher_enabled: true,
            compress: false,
        }
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_file_watcher(mut self, enabled: bool) -> Self {
        self.file_watcher_enabled = enabled;
        self
    }

    pub fn maps_dir(&self) -> &Path {
        &self.maps_dir
    }

    pub fn file_watcher_enabled(&self) -> bool {
        self.file_watcher_enabled
    }

    pub fn set_file_watcher_enabled(&mut self, enabled: bool) {
        self.file_watcher_enabled = enabled;
    }

    /// Path of the document for a map name
    ///
    /// Names become file names, so empty names and anything that could
    /// escape the maps directory are rejected.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let invalid = name.trim().is_empty()
            || name.contains(['/', '\\'])
            || name == "."
            || name == ".."
            || name.chars().any(char::is_control);
        if invalid {
            return Err(MapEditorError::InvalidMapName(name.to_string()));
        }
        Ok(self.maps_dir.join(format!("{}.{}", name, MAP_EXTENSION)))
    }

    /// Whether a document exists for the map name
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    /// Read and decode the document for a map name
    ///
    /// Returns `Ok(None)` when no document exists.
    pub fn get_by_name(&self, name: &str) -> Result<Option<Schematic>> {
        let path = self.path_for(name)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "map document not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let mut map = parse_schematic(&bytes)?;
        // The file name is authoritative
        map.name = name.to_string();
        Ok(Some(map))
    }

    /// Like `get_by_name`, but a missing document is an error
    pub fn require(&self, name: &str) -> Result<Schematic> {
        self.get_by_name(name)?
            .ok_or_else(|| MapEditorError::DocumentNotFound(name.to_string()))
    }

    /// Encode and write a schematic to its document, creating the maps
    /// directory if needed
    pub fn write(&self, map: &Schematic) -> Result<PathBuf> {
        let path = self.path_for(&map.name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serialize_schematic(map, self.compress)?;
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), objects = map.len(), "wrote map document");
        Ok(path)
    }

    /// Delete a map document. Deleting a missing document is not an error.
    pub fn delete(&self, name: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(name)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of every map document in the maps directory, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.maps_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().map(|ext| ext == MAP_EXTENSION).unwrap_or(false))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }
}
