//! Shared JSON document holding every variable's extrema.
//!
//! The document is read, one top-level key is replaced, and the whole document
//! is written back. Writes go through a temporary file in the same directory
//! and a rename, so readers never observe a half-written file. The
//! load-modify-write cycle is not locked: two processes updating the same file
//! at once can still lose one update, so run a single writer per file.

use crate::error::Result;
use crate::models::VariableExtrema;
use crate::utils::constants::METADATA_INDENT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Top-level JSON object keyed by variable display name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataDocument {
    entries: Map<String, Value>,
}

impl MetadataDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Replace (or add) one variable's entry, leaving the others untouched
    pub fn set_variable(&mut self, name: &str, extrema: &VariableExtrema) -> Result<()> {
        self.entries
            .insert(name.to_string(), serde_json::to_value(extrema)?);
        Ok(())
    }

    /// Decode one variable's entry, `None` if the key is absent
    pub fn variable(&self, name: &str) -> Result<Option<VariableExtrema>> {
        match self.entries.get(name) {
            Some(value) => Ok(Some(VariableExtrema::deserialize(value)?)),
            None => Ok(None),
        }
    }

    /// Four-space indented JSON with a trailing newline
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(METADATA_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries.serialize(&mut serializer)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Where a loaded document came from
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    Existing,
    Missing,
    /// The file was empty, not JSON, or not a JSON object; it will be overwritten
    Recovered { reason: String },
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: MetadataDocument,
    pub source: DocumentSource,
}

impl LoadedDocument {
    pub fn is_recovered(&self) -> bool {
        matches!(self.source, DocumentSource::Recovered { .. })
    }
}

pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, falling back to an empty one if the file is missing
    /// or cannot be decoded. Other I/O failures are returned.
    pub fn load_or_default(&self) -> Result<LoadedDocument> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(
                    "Metadata file not found, starting with an empty document: {}",
                    self.path.display()
                );
                return Ok(LoadedDocument {
                    document: MetadataDocument::new(),
                    source: DocumentSource::Missing,
                });
            }
            Err(e) => return Err(e.into()),
        };

        match parse_document(&contents) {
            Ok(document) => Ok(LoadedDocument {
                document,
                source: DocumentSource::Existing,
            }),
            Err(reason) => {
                warn!(
                    "Ignoring unreadable metadata file {}: {}",
                    self.path.display(),
                    reason
                );
                Ok(LoadedDocument {
                    document: MetadataDocument::new(),
                    source: DocumentSource::Recovered { reason },
                })
            }
        }
    }

    /// Set one variable in `document` and persist the whole document
    pub fn write_variable(
        &self,
        document: &mut MetadataDocument,
        name: &str,
        extrema: &VariableExtrema,
    ) -> Result<()> {
        document.set_variable(name, extrema)?;
        self.persist(document)
    }

    /// Load, replace one variable, write back.
    ///
    /// The returned document is what was written; its source records how the
    /// file was found before the write.
    pub fn update(&self, name: &str, extrema: &VariableExtrema) -> Result<LoadedDocument> {
        let mut loaded = self.load_or_default()?;
        self.write_variable(&mut loaded.document, name, extrema)?;
        Ok(loaded)
    }

    /// Write to a temporary sibling file, then rename over the target
    pub fn persist(&self, document: &MetadataDocument) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let bytes = document.to_pretty_json()?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        info!(
            "Wrote {} variable(s) to {}",
            document.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn parse_document(contents: &[u8]) -> std::result::Result<MetadataDocument, String> {
    if contents.iter().all(u8::is_ascii_whitespace) {
        return Err("file is empty".to_string());
    }

    match serde_json::from_slice::<Value>(contents) {
        Ok(Value::Object(entries)) => Ok(MetadataDocument { entries }),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn extrema(lo: f64, hi: f64) -> VariableExtrema {
        VariableExtrema {
            min_global: Some(lo),
            max_global: Some(hi),
            min_local: vec![("2011-9-13-0".to_string(), vec![lo, lo])],
            max_local: vec![("2011-9-13-0".to_string(), vec![hi, hi])],
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("metadata.json"));

        let loaded = store.load_or_default().unwrap();
        assert_eq!(loaded.source, DocumentSource::Missing);
        assert!(loaded.document.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_recovered() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");

        let cases: [&[u8]; 6] = [
            b"",
            b"   \n",
            b"{\"SALT\": ",
            b"[1, 2, 3]",
            b"\xff\xfe{bad",
            b"\x00\x00",
        ];
        for contents in cases {
            fs::write(&path, contents).unwrap();
            let loaded = MetadataStore::new(&path).load_or_default().unwrap();
            assert!(loaded.is_recovered(), "{:?} should be recovered", contents);
            assert!(loaded.document.is_empty());
        }
    }

    #[test]
    fn test_write_is_non_destructive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, r#"{"THETA": {"note": "kept as is"}}"#).unwrap();

        let store = MetadataStore::new(&path);
        store.update("SALT", &extrema(1.0, 2.0)).unwrap();

        let loaded = store.load_or_default().unwrap();
        assert_eq!(loaded.source, DocumentSource::Existing);
        assert_eq!(loaded.document.keys().collect::<Vec<_>>(), vec!["THETA", "SALT"]);
        assert_eq!(loaded.document.get("THETA"), Some(&json!({"note": "kept as is"})));
        assert_eq!(loaded.document.variable("SALT").unwrap(), Some(extrema(1.0, 2.0)));
    }

    #[test]
    fn test_update_reports_prior_source() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("metadata.json"));

        let first = store.update("SALT", &extrema(1.0, 2.0)).unwrap();
        assert_eq!(first.source, DocumentSource::Missing);
        assert_eq!(first.document.keys().collect::<Vec<_>>(), vec!["SALT"]);

        let second = store.update("THETA", &extrema(0.0, 1.0)).unwrap();
        assert_eq!(second.source, DocumentSource::Existing);
        assert_eq!(second.document.len(), 2);
    }

    #[test]
    fn test_rewrite_replaces_only_that_variable() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("metadata.json"));

        store.update("SALT", &extrema(1.0, 2.0)).unwrap();
        store.update("VORT", &extrema(-0.5, 0.5)).unwrap();
        store.update("SALT", &extrema(3.0, 4.0)).unwrap();

        let document = store.load_or_default().unwrap().document;
        assert_eq!(document.len(), 2);
        assert_eq!(document.variable("SALT").unwrap(), Some(extrema(3.0, 4.0)));
        assert_eq!(document.variable("VORT").unwrap(), Some(extrema(-0.5, 0.5)));
    }

    #[test]
    fn test_four_space_indent() {
        let mut document = MetadataDocument::new();
        document.set_variable("SALT", &extrema(1.0, 2.0)).unwrap();

        let text = String::from_utf8(document.to_pretty_json().unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"SALT\": {\n        \"min_global\": 1.0"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out").join("metadata.json");

        MetadataStore::new(&path).update("THETA", &extrema(0.0, 1.0)).unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }
}
