//! Filesystem-backed source loader.

use std::fs;

use anyhow::{Context, anyhow};

use reweave_lsp::SourceLoader;
use reweave_lsp::uri::file_uri_to_path;

/// Reads `file:` URIs from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSourceLoader;

impl SourceLoader for FsSourceLoader {
    fn load(&self, uri: &str) -> anyhow::Result<String> {
        let path = file_uri_to_path(uri).ok_or_else(|| anyhow!("{uri} is not a file URI"))?;
        tracing::debug!(path = %path.display(), "loading source from disk");
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }
}
