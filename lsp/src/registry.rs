//! Live document snapshots.
//!
//! The registry is the authority on what an editor currently shows. The
//! assembler consults it before any caller-supplied "before" text, so edits are
//! addressed to the buffer the client will actually apply them to.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use reweave_text::LineIndex;
use reweave_types::DocumentIdentity;

use crate::document_edits::DocumentEdits;
use crate::types::EditError;

/// One version of one document's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    identity: DocumentIdentity,
    content: Arc<str>,
}

impl DocumentSnapshot {
    #[must_use]
    pub fn new(uri: impl Into<String>, version: Option<i32>, content: impl Into<Arc<str>>) -> Self {
        Self {
            identity: DocumentIdentity::new(uri, version),
            content: content.into(),
        }
    }

    /// Snapshot of content no editor owns.
    #[must_use]
    pub fn unversioned(uri: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self::new(uri, None, content)
    }

    #[must_use]
    pub fn identity(&self) -> &DocumentIdentity {
        &self.identity
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.identity.uri
    }

    #[must_use]
    pub fn version(&self) -> Option<i32> {
        self.identity.version
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.identity.is_open()
    }

    #[must_use]
    pub fn line_index(&self) -> LineIndex<'_> {
        LineIndex::new(&self.content)
    }
}

/// Map from document uri to its latest snapshot.
pub trait SnapshotRegistry: Send + Sync {
    fn lookup(&self, uri: &str) -> Option<DocumentSnapshot>;

    /// Insert or replace the snapshot for `uri`, returning what is now stored.
    fn upsert(&self, uri: &str, content: String, version: Option<i32>) -> DocumentSnapshot;

    fn remove(&self, uri: &str) -> Option<DocumentSnapshot>;
}

/// In-memory [`SnapshotRegistry`] with one lock per document.
///
/// The map lock is only held to find or insert an entry; reads and updates of a
/// document go through that document's own mutex.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: RwLock<HashMap<String, Arc<Mutex<DocumentSnapshot>>>>,
}

fn lock(entry: &Mutex<DocumentSnapshot>) -> MutexGuard<'_, DocumentSnapshot> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DocumentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, uri: &str) -> Option<Arc<Mutex<DocumentSnapshot>>> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered uris, sorted.
    #[must_use]
    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        uris.sort();
        uris
    }

    /// Apply accumulated edits to the open buffer they were computed against.
    ///
    /// The stored version is bumped by one. Fails with `StaleSnapshot` when the
    /// buffer moved on since `edits` took its snapshot.
    pub fn apply_edits(&self, edits: &DocumentEdits) -> Result<DocumentSnapshot, EditError> {
        let base = edits.document();
        let entry = self.entry(base.uri()).ok_or_else(|| EditError::NotOpen {
            uri: base.uri().to_string(),
        })?;

        let mut current = lock(&entry);
        if current.version() != base.version() || current.content() != base.content() {
            return Err(EditError::StaleSnapshot {
                uri: base.uri().to_string(),
                expected: base.version(),
                actual: current.version(),
            });
        }

        let text = edits.apply()?;
        let version = current.version().map_or(1, |v| v.saturating_add(1));
        *current = DocumentSnapshot::new(base.uri(), Some(version), text);
        tracing::debug!(
            uri = base.uri(),
            version,
            edits = edits.len(),
            "applied edits to open document"
        );
        Ok(current.clone())
    }
}

impl SnapshotRegistry for DocumentRegistry {
    fn lookup(&self, uri: &str) -> Option<DocumentSnapshot> {
        self.entry(uri).map(|entry| lock(&entry).clone())
    }

    fn upsert(&self, uri: &str, content: String, version: Option<i32>) -> DocumentSnapshot {
        let snapshot = DocumentSnapshot::new(uri, version, content);
        if let Some(entry) = self.entry(uri) {
            *lock(&entry) = snapshot.clone();
            return snapshot;
        }

        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = documents
            .entry(uri.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(snapshot.clone())));
        *lock(entry) = snapshot.clone();
        snapshot
    }

    fn remove(&self, uri: &str) -> Option<DocumentSnapshot> {
        let entry = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri)?;
        let snapshot = lock(&entry).clone();
        Some(snapshot)
    }
}
