//! File-backed parameter store.
//!
//! A `ParameterStore` owns a fixed `subsystem -> document path` mapping and
//! mediates every read and write of those documents. Reads flatten each
//! block into [`ParameterKey`]s; writes are read-modify-write per subsystem
//! and never create parameters that are not already in the document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::codec::{self, Document, ParamValue, ParameterBlock};
use crate::error::{Result, SettingsError};
use crate::key::ParameterKey;

/// Subsystem name to document location. Fixed once a store is built.
pub type DocumentMap = BTreeMap<String, PathBuf>;


#[derive(Debug, Clone)]
pub struct ParameterStore {
    documents: DocumentMap,
}

impl ParameterStore {
    pub fn new(documents: DocumentMap) -> Self {
        ParameterStore { documents }
    }

    /// Registered subsystem names, in order.
    pub fn subsystems(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn document_path(&self, subsystem: &str) -> Option<&Path> {
        self.documents.get(subsystem).map(PathBuf::as_path)
    }

    pub fn documents(&self) -> &DocumentMap {
        &self.documents
    }

    /// Read one subsystem's parameter block from disk.
    pub fn read_block(&self, subsystem: &str) -> Result<ParameterBlock> {
        let path = self.path_for(subsystem)?;
        let doc = load_document(subsystem, path)?;
        doc.block(subsystem).map_err(|e| e.at(path))
    }

    /// Read every registered document into one flat mapping.
    ///
    /// The first missing or unreadable document aborts the whole read;
    /// callers never see a mapping with a subsystem silently left out.
    pub fn read_all(&self) -> Result<BTreeMap<ParameterKey, ParamValue>> {
        let mut out = BTreeMap::new();
        for subsystem in self.documents.keys() {
            for (name, value) in self.read_block(subsystem)? {
                out.insert(ParameterKey::new(subsystem.as_str(), name), value);
            }
        }
        Ok(out)
    }

    /// Apply `updates` to the documents that hold them.
    ///
    /// Every key must name a registered subsystem; this is checked before
    /// any file is touched. Each affected document is then rewritten in
    /// subsystem order, and only after all of its targeted parameters are
    /// confirmed to exist. There is no rollback across subsystems: if a
    /// later subsystem fails, earlier ones stay written.
    pub fn write(&self, updates: &BTreeMap<ParameterKey, ParamValue>) -> Result<()> {
        let mut by_subsystem: BTreeMap<&str, Vec<(&str, &ParamValue)>> = BTreeMap::new();
        for (key, value) in updates {
            if !self.documents.contains_key(&key.subsystem) {
                return Err(SettingsError::UnknownSubsystem(key.subsystem.clone()));
            }
            by_subsystem
                .entry(key.subsystem.as_str())
                .or_default()
                .push((key.parameter.as_str(), value));
        }

        for (subsystem, params) in by_subsystem {
            let path = self.path_for(subsystem)?;
            let mut doc = load_document(subsystem, path)?;
            let block = doc.block_mut(subsystem).map_err(|e| e.at(path))?;

            if let Some((unknown, _)) = params.iter().find(|(name, _)| !block.contains_key(*name)) {
                return Err(SettingsError::UnknownParameter {
                    subsystem: subsystem.to_string(),
                    parameter: unknown.to_string(),
                });
            }
            for (name, value) in &params {
                block.insert(ParamValue::from(*name), (*value).clone());
            }

            let text = doc.to_yaml().map_err(|e| e.at(path))?;
            write_atomic(path, &text)?;
            info!(
                "updated {} parameter(s) of {} in {}",
                params.len(),
                subsystem,
                path.display()
            );
        }
        Ok(())
    }

    /// Overwrite `subsystem`'s document with exactly `block`.
    ///
    /// No per-parameter validation: the block replaces whatever was there.
    /// The document must already exist.
    pub fn replace_block(&self, subsystem: &str, block: &ParameterBlock) -> Result<()> {
        let path = self.path_for(subsystem)?;
        if !path.exists() {
            return Err(not_found(subsystem, path));
        }
        let text = codec::encode(subsystem, block).map_err(|e| e.at(path))?;
        write_atomic(path, &text)?;
        info!("replaced {} block in {}", subsystem, path.display());
        Ok(())
    }

    fn path_for(&self, subsystem: &str) -> Result<&Path> {
        self.document_path(subsystem)
            .ok_or_else(|| SettingsError::UnknownSubsystem(subsystem.to_string()))
    }
}


fn not_found(subsystem: &str, path: &Path) -> SettingsError {
    SettingsError::DocumentNotFound {
        subsystem: subsystem.to_string(),
        path: path.to_path_buf(),
    }
}


fn load_document(subsystem: &str, path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(not_found(subsystem, path));
    }
    debug!("reading {} from {}", subsystem, path.display());
    let text = fs::read_to_string(path).map_err(|e| SettingsError::io(path, e))?;
    Document::parse(&text).map_err(|e| e.at(path))
}


/// Write `content` to `path` through a sibling temp file and a rename, so
/// a crash mid-write never leaves a truncated document behind.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| SettingsError::Config(format!("not a file path: {}", path.display())))?;
    let tmp_path = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    fs::write(&tmp_path, content).map_err(|e| SettingsError::io(&tmp_path, e))?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(SettingsError::io(path, e));
    }
    debug!("wrote {}", path.display());
    Ok(())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
