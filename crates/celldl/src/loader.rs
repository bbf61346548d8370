//! Filesystem stylesheet loading.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;

use celldl_parser::StylesheetLoader;

/// Resolves `<style href="...">` references against a base directory.
///
/// Relative references are joined to the base directory, which is the
/// directory of the document being parsed. URL references are rejected.
#[derive(Debug, Clone)]
pub struct FileLoader {
    base: PathBuf,
}

impl FileLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, reference: &str) -> io::Result<PathBuf> {
        if reference.contains("://") {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("remote stylesheet `{reference}` is not supported"),
            ));
        }
        Ok(self.base.join(reference))
    }
}

impl StylesheetLoader for FileLoader {
    fn load(&self, reference: &str) -> io::Result<String> {
        let path = self.resolve(reference.trim())?;
        debug!(path:? = path; "Loading external stylesheet");
        fs::read_to_string(&path)
            .map_err(|err| io::Error::new(err.kind(), format!("{}: {err}", path.display())))
    }
}
