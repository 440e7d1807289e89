//! LSP message shapes at the client boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use reweave_types::{
    ChangeAnnotation, DocumentIdentity, FileChange, PositionEncoding, TextEdit, WorkspaceEditSet,
};

use crate::document_edits::DocumentEdits;
use crate::registry::DocumentSnapshot;
use crate::types::EditError;

pub const APPLY_EDIT_METHOD: &str = "workspace/applyEdit";

/// A server-to-client JSON-RPC request.
#[derive(Debug, Serialize)]
pub struct Request {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    #[must_use]
    pub fn new(id: u64, method: &'static str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// LSP `WorkspaceEdit` for `set`.
pub fn workspace_edit_value(set: &WorkspaceEditSet) -> Result<Value, serde_json::Error> {
    serde_json::to_value(set)
}

/// `ApplyWorkspaceEditParams` carrying `set`.
pub fn apply_edit_params(
    label: Option<&str>,
    set: &WorkspaceEditSet,
) -> Result<Value, serde_json::Error> {
    let mut params = serde_json::json!({ "edit": workspace_edit_value(set)? });
    if let Some(label) = label {
        params["label"] = Value::from(label);
    }
    Ok(params)
}

/// Full `workspace/applyEdit` request.
pub fn apply_edit_request(
    id: u64,
    label: Option<&str>,
    set: &WorkspaceEditSet,
) -> Result<Request, serde_json::Error> {
    Ok(Request::new(
        id,
        APPLY_EDIT_METHOD,
        Some(apply_edit_params(label, set)?),
    ))
}

/// Parse a `WorkspaceEdit`.
///
/// `documentChanges` wins when present; otherwise the legacy `changes` map
/// (uri to edits) becomes one unversioned `Update` per uri.
pub fn parse_workspace_edit(value: &Value) -> Result<WorkspaceEditSet, serde_json::Error> {
    if value.get("documentChanges").is_some() {
        return WorkspaceEditSet::deserialize(value);
    }

    let mut set = WorkspaceEditSet::new();
    if let Some(changes) = value.get("changes").and_then(Value::as_object) {
        for (uri, edits) in changes {
            let edits: Vec<TextEdit> = serde_json::from_value(edits.clone())?;
            set.push(FileChange::Update {
                document: DocumentIdentity::unversioned(uri.clone()),
                edits,
            });
        }
    }
    if let Some(annotations) = value.get("changeAnnotations").and_then(Value::as_object) {
        for (id, annotation) in annotations {
            let annotation: ChangeAnnotation = serde_json::from_value(annotation.clone())?;
            set.annotate(id.clone(), annotation);
        }
    }
    Ok(set)
}

/// All text edits `set` addresses to `uri`, in set order.
#[must_use]
pub fn text_edits_for_uri(set: &WorkspaceEditSet, uri: &str) -> Vec<TextEdit> {
    set.iter()
        .filter(|change| matches!(change, FileChange::Update { document, .. } if document.uri == uri))
        .flat_map(|change| change.edits().iter().cloned())
        .collect()
}

/// The edits `set` carries for `snapshot`, as an accumulator over it.
pub fn document_edits_for(
    set: &WorkspaceEditSet,
    snapshot: DocumentSnapshot,
    encoding: PositionEncoding,
) -> Result<DocumentEdits, EditError> {
    let edits = text_edits_for_uri(set, snapshot.uri());
    DocumentEdits::from_text_edits(snapshot, &edits, encoding)
}
