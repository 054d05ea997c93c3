use crate::error::Result;
use crate::models::Variable;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Snapshot of the filenames in a data directory
pub struct FileInventory {
    dir: PathBuf,
    files: Vec<String>,
    index: HashSet<String>,
}

impl FileInventory {
    /// List every regular file in `dir`
    pub fn scan(dir: &Path) -> Result<Self> {
        let files = list_files(dir)?;
        Ok(Self::from_names(dir, files))
    }

    pub fn from_names(dir: &Path, mut files: Vec<String>) -> Self {
        files.sort();
        let index = files.iter().cloned().collect();
        Self {
            dir: dir.to_path_buf(),
            files,
            index,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.index.contains(file_name)
    }

    pub fn filter_by_variable(&self, variable: Variable) -> Vec<&str> {
        filter_by_variable(&self.files, variable)
    }
}

/// Names of the regular files in `dir`, unfiltered
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => files.push(name),
            Err(name) => debug!("Skipping non UTF-8 filename {:?}", name),
        }
    }

    Ok(files)
}

/// Keep filenames containing the variable's file token anywhere
pub fn filter_by_variable<S: AsRef<str>>(files: &[S], variable: Variable) -> Vec<&str> {
    let token = variable.file_token();
    files
        .iter()
        .map(|f| f.as_ref())
        .filter(|f| f.contains(token))
        .collect()
}
