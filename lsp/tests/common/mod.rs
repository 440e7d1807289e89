//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use reweave_lsp::protocol::document_edits_for;
use reweave_lsp::uri::path_to_file_uri;
use reweave_lsp::{
    DocumentRegistry, DocumentSnapshot, FileRewrite, RewriteEngine, RewriteRequest, SourceLoader,
    WorkspaceEditAssembler,
};
use reweave_text::{DiffSpan, LineDiffer, LineIndex, SimilarDiffer};
use reweave_types::{PositionEncoding, WorkspaceEditSet};

/// `file:` URI for `name` under a fixed absolute workspace root.
pub fn file_uri(name: &str) -> String {
    let path = std::env::temp_dir().join("reweave-workspace").join(name);
    path_to_file_uri(&path).expect("temp dir is absolute").to_string()
}

pub fn assembler_with(registry: Arc<DocumentRegistry>) -> WorkspaceEditAssembler {
    WorkspaceEditAssembler::new(registry)
}

pub fn assembler() -> WorkspaceEditAssembler {
    assembler_with(Arc::new(DocumentRegistry::new()))
}

/// Apply the edits `set` carries for `uri` to `content`.
pub fn apply_to(
    set: &WorkspaceEditSet,
    uri: &str,
    content: &str,
    encoding: PositionEncoding,
) -> String {
    let snapshot = DocumentSnapshot::unversioned(uri, content);
    document_edits_for(set, snapshot, encoding)
        .expect("edits address the snapshot")
        .apply()
        .expect("edits are disjoint")
}

/// Source loader that serves fixed content and fails for one uri.
pub struct MapLoader {
    pub files: Vec<(String, String)>,
    pub calls: AtomicUsize,
}

impl MapLoader {
    pub fn new(files: Vec<(String, String)>) -> Self {
        Self {
            files,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SourceLoader for MapLoader {
    fn load(&self, uri: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.files.iter().find(|(known, _)| known == uri) {
            Some((_, content)) => Ok(content.clone()),
            None => bail!("permission denied reading {uri}"),
        }
    }
}

/// Differ that delegates to `similar` except for two markers: texts containing
/// `BROKEN` get two overlapping spans, texts containing `OVERREACH` get an
/// extra span starting past the last line.
pub struct SabotagedDiffer;

impl LineDiffer for SabotagedDiffer {
    fn diff(&self, old: &LineIndex<'_>, new: &LineIndex<'_>) -> Vec<DiffSpan> {
        if old.text().contains("BROKEN") {
            return vec![DiffSpan::new(0..2, 0..1), DiffSpan::new(1..2, 1..1)];
        }
        let mut spans = SimilarDiffer::default().diff(old, new);
        if old.text().contains("OVERREACH") {
            let past_end = old.line_count() + 10;
            spans.push(DiffSpan::new(past_end..past_end + 1, past_end..past_end + 1));
        }
        spans
    }
}

/// Rewrite engine returning canned results.
pub struct CannedEngine {
    pub results: Vec<FileRewrite>,
}

impl RewriteEngine for CannedEngine {
    fn rewrite(&self, request: &RewriteRequest) -> anyhow::Result<Vec<FileRewrite>> {
        if request.recipe_id == "unknown" {
            bail!("no recipe named {}", request.recipe_id);
        }
        Ok(self.results.clone())
    }
}
