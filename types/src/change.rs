//! Multi-file change sets.
//!
//! [`FileChange`] is the domain view; on the wire it becomes one entry of the
//! LSP `documentChanges` array (a resource operation or a `TextDocumentEdit`).
//! The translation lives in the private `wire` module so callers never see the
//! untagged protocol shape.

use std::collections::BTreeMap;
use std::slice;

use serde::{Deserialize, Serialize};

use crate::{DocumentIdentity, TextEdit};

/// One operation inside a [`WorkspaceEditSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "wire::DocumentChange", from = "wire::DocumentChange")]
pub enum FileChange {
    /// Create an empty file.
    Create { uri: String },
    /// Delete a file.
    Delete { uri: String },
    /// Move a file; later changes address `new_uri`.
    Rename { old_uri: String, new_uri: String },
    /// Edit the content of one document. All ranges address the document as
    /// identified by `document` and are mutually disjoint.
    Update {
        document: DocumentIdentity,
        edits: Vec<TextEdit>,
    },
}

impl FileChange {
    /// The uri this change leaves behind (the target for renames).
    #[must_use]
    pub fn uri(&self) -> &str {
        match self {
            Self::Create { uri } | Self::Delete { uri } => uri,
            Self::Rename { new_uri, .. } => new_uri,
            Self::Update { document, .. } => &document.uri,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Delete { .. } => "delete",
            Self::Rename { .. } => "rename",
            Self::Update { .. } => "update",
        }
    }

    #[must_use]
    pub fn edits(&self) -> &[TextEdit] {
        match self {
            Self::Update { edits, .. } => edits,
            _ => &[],
        }
    }
}

/// Metadata a client may show next to annotated edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAnnotation {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_confirmation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ChangeAnnotation {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            needs_confirmation: None,
            description: None,
        }
    }
}

/// An atomic, possibly multi-file change.
///
/// Order is kept for readability only; each uri appears in at most one
/// `Update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceEditSet {
    #[serde(rename = "documentChanges", default)]
    changes: Vec<FileChange>,
    #[serde(
        rename = "changeAnnotations",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    annotations: BTreeMap<String, ChangeAnnotation>,
}

impl WorkspaceEditSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: FileChange) {
        self.changes.push(change);
    }

    pub fn annotate(&mut self, id: impl Into<String>, annotation: ChangeAnnotation) {
        self.annotations.insert(id.into(), annotation);
    }

    #[must_use]
    pub fn changes(&self) -> &[FileChange] {
        &self.changes
    }

    #[must_use]
    pub fn annotations(&self) -> &BTreeMap<String, ChangeAnnotation> {
        &self.annotations
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> slice::Iter<'_, FileChange> {
        self.changes.iter()
    }

    /// The `Update` for `uri`, if the set carries one.
    #[must_use]
    pub fn update_for(&self, uri: &str) -> Option<&FileChange> {
        self.changes
            .iter()
            .find(|change| matches!(change, FileChange::Update { document, .. } if document.uri == uri))
    }

    #[must_use]
    pub fn into_changes(self) -> Vec<FileChange> {
        self.changes
    }
}

impl Extend<FileChange> for WorkspaceEditSet {
    fn extend<T: IntoIterator<Item = FileChange>>(&mut self, iter: T) {
        self.changes.extend(iter);
    }
}

impl<'a> IntoIterator for &'a WorkspaceEditSet {
    type Item = &'a FileChange;
    type IntoIter = slice::Iter<'a, FileChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

mod wire {
    use serde::{Deserialize, Serialize};

    use super::FileChange;
    use crate::{DocumentIdentity, TextEdit};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    pub(super) enum DocumentChange {
        Resource(ResourceOperation),
        Edit(TextDocumentEdit),
    }

    #[derive(Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "lowercase")]
    pub(super) enum ResourceOperation {
        Create {
            uri: String,
        },
        Rename {
            #[serde(rename = "oldUri")]
            old_uri: String,
            #[serde(rename = "newUri")]
            new_uri: String,
        },
        Delete {
            uri: String,
        },
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct TextDocumentEdit {
        text_document: DocumentIdentity,
        edits: Vec<TextEdit>,
    }

    impl From<FileChange> for DocumentChange {
        fn from(change: FileChange) -> Self {
            match change {
                FileChange::Create { uri } => Self::Resource(ResourceOperation::Create { uri }),
                FileChange::Delete { uri } => Self::Resource(ResourceOperation::Delete { uri }),
                FileChange::Rename { old_uri, new_uri } => {
                    Self::Resource(ResourceOperation::Rename { old_uri, new_uri })
                }
                FileChange::Update { document, edits } => Self::Edit(TextDocumentEdit {
                    text_document: document,
                    edits,
                }),
            }
        }
    }

    impl From<DocumentChange> for FileChange {
        fn from(change: DocumentChange) -> Self {
            match change {
                DocumentChange::Resource(ResourceOperation::Create { uri }) => Self::Create { uri },
                DocumentChange::Resource(ResourceOperation::Delete { uri }) => Self::Delete { uri },
                DocumentChange::Resource(ResourceOperation::Rename { old_uri, new_uri }) => {
                    Self::Rename { old_uri, new_uri }
                }
                DocumentChange::Edit(edit) => Self::Update {
                    document: edit.text_document,
                    edits: edit.edits,
                },
            }
        }
    }
}
