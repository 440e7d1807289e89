//! Multi-file assembly: resource operations, live snapshots, partial failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reweave_lsp::protocol::{document_edits_for, workspace_edit_value};
use reweave_lsp::{
    ContentSource, DocumentRegistry, EditError, FileRewrite, RewriteRequest, SnapshotRegistry,
    SourceLoader, SourceText,
};
use reweave_types::{
    ChangeAnnotation, DocumentIdentity, FileChange, Position, PositionEncoding, TextEdit,
};
use serde_json::json;

use crate::common::{
    CannedEngine, MapLoader, SabotagedDiffer, apply_to, assembler, assembler_with, file_uri,
};

// ── resource operations ───────────────────────────────────────────────

#[test]
fn creation_is_create_then_insert_at_origin() {
    let uri = file_uri("New.java");
    let result = assembler().assemble([FileRewrite::created(&uri, "class New {}\n")]);

    assert_eq!(
        result.edit.changes(),
        &[
            FileChange::Create { uri: uri.clone() },
            FileChange::Update {
                document: DocumentIdentity::unversioned(&uri),
                edits: vec![TextEdit::insert(Position::origin(), "class New {}\n")],
            },
        ]
    );
    assert_eq!(result.reports[0].source, ContentSource::Created);
}

#[test]
fn deletion_carries_no_text_edit() {
    let uri = file_uri("Gone.java");
    let result = assembler().assemble([FileRewrite::deleted(&uri, "class Gone {}\n")]);
    assert_eq!(result.edit.changes(), &[FileChange::Delete { uri }]);
}

#[test]
fn rename_precedes_update_of_new_uri() {
    let old_uri = file_uri("Old.java");
    let new_uri = file_uri("Renamed.java");
    let result = assembler().assemble([FileRewrite::renamed(
        &old_uri,
        &new_uri,
        "class Old {}\n",
        "class Renamed {}\n",
    )]);

    let changes = result.edit.changes();
    assert_eq!(
        changes[0],
        FileChange::Rename {
            old_uri: old_uri.clone(),
            new_uri: new_uri.clone(),
        }
    );
    assert_eq!(changes[1].uri(), new_uri);
    assert_eq!(
        apply_to(&result.edit, &new_uri, "class Old {}\n", PositionEncoding::Utf32),
        "class Renamed {}\n"
    );
}

#[test]
fn rename_without_content_change_is_rename_only() {
    let old_uri = file_uri("Same.java");
    let new_uri = file_uri("Moved.java");
    let result =
        assembler().assemble([FileRewrite::renamed(&old_uri, &new_uri, "x\n", "x\n")]);
    assert_eq!(result.edit.len(), 1);
    assert_eq!(result.edit.changes()[0].label(), "rename");
}

// ── live snapshots ────────────────────────────────────────────────────

#[test]
fn open_snapshot_wins_over_supplied_before() {
    let uri = file_uri("Live.java");
    let registry = Arc::new(DocumentRegistry::new());
    let live = "class Live {\n  // unsaved\n}\n";
    registry.upsert(&uri, live.to_string(), Some(7));

    let after = "class Live {\n  // unsaved\n  int y;\n}\n";
    let result = assembler_with(Arc::clone(&registry)).assemble([FileRewrite::updated(
        &uri,
        "class Live {\n}\n",
        after,
    )]);

    let Some(FileChange::Update { document, .. }) = result.edit.update_for(&uri) else {
        panic!("expected an update for {uri}");
    };
    assert_eq!(document.version, Some(7));
    assert_eq!(result.reports[0].source, ContentSource::LiveSnapshot { version: 7 });

    let snapshot = registry.lookup(&uri).unwrap();
    let edits = document_edits_for(&result.edit, snapshot, PositionEncoding::Utf32).unwrap();
    let updated = registry.apply_edits(&edits).unwrap();
    assert_eq!(updated.content(), after);
    assert_eq!(updated.version(), Some(8));
}

#[test]
fn deferred_before_is_loaded_when_not_open() {
    let uri = file_uri("Disk.java");
    let loader = Arc::new(MapLoader::new(vec![(uri.clone(), "on disk\n".to_string())]));
    let result = assembler()
        .with_loader(Arc::clone(&loader) as Arc<dyn SourceLoader>)
        .assemble([FileRewrite::updated(&uri, SourceText::Deferred, "rewritten\n")]);

    assert_eq!(result.reports[0].source, ContentSource::Loaded);
    assert_eq!(
        apply_to(&result.edit, &uri, "on disk\n", PositionEncoding::Utf32),
        "rewritten\n"
    );
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}

// ── partial failure ───────────────────────────────────────────────────

#[test]
fn failing_files_do_not_block_the_rest() {
    let good_a = file_uri("A.java");
    let unreadable = file_uri("Locked.java");
    let broken = file_uri("Broken.java");
    let good_b = file_uri("B.java");

    let result = assembler()
        .with_differ(Arc::new(SabotagedDiffer))
        .with_loader(Arc::new(MapLoader::new(Vec::new())))
        .assemble([
            FileRewrite::updated(&good_a, "a\n", "A\n"),
            FileRewrite::updated(&unreadable, SourceText::Deferred, "x\n"),
            FileRewrite::updated(&broken, "BROKEN\nline\n", "fixed\n"),
            FileRewrite::updated(&good_b, "b\n", "B\n"),
        ]);

    assert!(result.is_partial());
    let uris: Vec<&str> = result.edit.iter().map(FileChange::uri).collect();
    assert_eq!(uris, vec![good_a.as_str(), good_b.as_str()]);

    assert_eq!(result.problems.len(), 2);
    assert_eq!(result.problems[0].uri, unreadable);
    assert!(matches!(
        &result.problems[0].error,
        EditError::SourceUnavailable { reason, .. } if reason.contains("permission denied")
    ));
    assert_eq!(result.problems[1].uri, broken);
    assert!(matches!(
        result.problems[1].error,
        EditError::OverlappingEdits { .. }
    ));
}

#[test]
fn out_of_range_span_is_dropped_without_affecting_other_files() {
    let overreaching = file_uri("Overreach.java");
    let clean = file_uri("Clean.java");
    let before_a = "// OVERREACH\nint a;\n";
    let after_a = "// OVERREACH\nint a = 1;\n";

    let result = assembler()
        .with_differ(Arc::new(SabotagedDiffer))
        .assemble([
            FileRewrite::updated(&overreaching, before_a, after_a),
            FileRewrite::updated(&clean, "class B {\n}\n", "class B {\n  int b;\n}\n"),
        ]);

    assert!(!result.is_partial(), "{:?}", result.problems);
    assert_eq!(result.dropped_spans(), 1);
    assert_eq!(result.reports[0].uri, overreaching);
    assert_eq!(result.reports[0].dropped_spans, 1);
    assert_eq!(result.reports[1].dropped_spans, 0);

    assert_eq!(
        apply_to(&result.edit, &overreaching, before_a, PositionEncoding::Utf32),
        after_a
    );
    assert_eq!(
        apply_to(&result.edit, &clean, "class B {\n}\n", PositionEncoding::Utf32),
        "class B {\n  int b;\n}\n"
    );
}

#[test]
fn empty_batch_is_a_valid_result() {
    let result = assembler().assemble(Vec::new());
    assert!(result.edit.is_empty());
    assert!(!result.is_partial());
    assert_eq!(
        workspace_edit_value(&result.edit).unwrap(),
        json!({ "documentChanges": [] })
    );
}

// ── protocol output ───────────────────────────────────────────────────

#[test]
fn class_scenario_wire_format() {
    let uri = "file:///workspace/A.java";
    let result = assembler()
        .with_annotation("rewrite", ChangeAnnotation::new("Add field"))
        .assemble([FileRewrite::updated(
            uri,
            "class A {\n}\n",
            "class A {\n  int x;\n}\n",
        )]);

    assert_eq!(
        workspace_edit_value(&result.edit).unwrap(),
        json!({
            "documentChanges": [{
                "textDocument": { "uri": uri, "version": null },
                "edits": [{
                    "range": {
                        "start": { "line": 1, "character": 0 },
                        "end": { "line": 1, "character": 0 }
                    },
                    "newText": "  int x;\n",
                    "annotationId": "rewrite"
                }]
            }],
            "changeAnnotations": {
                "rewrite": { "label": "Add field" }
            }
        })
    );
}

// ── recipes and cancellation ──────────────────────────────────────────

#[test]
fn recipe_results_are_assembled() {
    let uri = file_uri("Recipe.java");
    let engine = CannedEngine {
        results: vec![FileRewrite::updated(&uri, "old\n", "new\n")],
    };
    let result = assembler()
        .run_recipe(&engine, &RewriteRequest::new("java.Rename"))
        .unwrap();
    assert_eq!(result.edit.len(), 1);

    let err = assembler()
        .run_recipe(&engine, &RewriteRequest::new("unknown"))
        .unwrap_err();
    assert!(matches!(err, EditError::Rewrite { ref recipe, .. } if recipe == "unknown"));
}

#[test]
fn cancellation_stops_before_next_file() {
    let first = file_uri("First.java");
    let second = file_uri("Second.java");
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let loader = move |_: &str| -> anyhow::Result<String> {
        flag.store(true, Ordering::SeqCst);
        Ok("loaded\n".to_string())
    };

    let err = assembler()
        .with_loader(Arc::new(loader))
        .assemble_cancellable(
            [
                FileRewrite::updated(&first, SourceText::Deferred, "changed\n"),
                FileRewrite::updated(&second, "s\n", "S\n"),
            ],
            &cancel,
        )
        .unwrap_err();
    assert_eq!(err, EditError::Cancelled);

    let done = assembler()
        .assemble_cancellable(
            [FileRewrite::updated(&second, "s\n", "S\n")],
            &AtomicBool::new(false),
        )
        .unwrap();
    assert_eq!(done.edit.len(), 1);
}
