//! Concurrent assembly and shared registry access.

use std::sync::Arc;

use reweave_lsp::{DocumentRegistry, FileRewrite, SnapshotRegistry, SourceText};
use reweave_types::FileChange;

use crate::common::{MapLoader, assembler, assembler_with, file_uri};

fn batch() -> Vec<FileRewrite> {
    let mut rewrites: Vec<FileRewrite> = (0..16)
        .map(|i| {
            let uri = file_uri(&format!("Gen{i}.java"));
            let before = format!("class Gen{i} {{\n}}\n");
            let after = format!("class Gen{i} {{\n  int f{i};\n}}\n");
            FileRewrite::updated(uri, before, after)
        })
        .collect();
    rewrites.insert(
        3,
        FileRewrite::updated(file_uri("Missing.java"), SourceText::Deferred, "x\n"),
    );
    rewrites.insert(9, FileRewrite::created(file_uri("Fresh.java"), "class Fresh {}\n"));
    rewrites
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_assembly_matches_sequential() {
    let assembler = assembler().with_loader(Arc::new(MapLoader::new(Vec::new())));

    let sequential = assembler.assemble(batch());
    let concurrent = assembler.assemble_concurrent(batch()).await;

    assert_eq!(concurrent.edit, sequential.edit);
    assert_eq!(concurrent.problems, sequential.problems);
    assert_eq!(concurrent.reports, sequential.reports);
    assert_eq!(concurrent.problems.len(), 1);
    assert_eq!(concurrent.problems[0].uri, file_uri("Missing.java"));
}

#[tokio::test]
async fn concurrent_assembly_of_nothing() {
    let result = assembler().assemble_concurrent(Vec::new()).await;
    assert!(result.edit.is_empty());
    assert!(result.reports.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn registry_updates_during_assembly_are_isolated_per_document() {
    let registry = Arc::new(DocumentRegistry::new());
    let uris: Vec<String> = (0..8).map(|i| file_uri(&format!("Open{i}.java"))).collect();
    for uri in &uris {
        registry.upsert(uri, "v1\n".to_string(), Some(1));
    }

    let writer = {
        let registry = Arc::clone(&registry);
        let uris = uris.clone();
        tokio::task::spawn_blocking(move || {
            for uri in &uris {
                registry.upsert(uri, "v2\n".to_string(), Some(2));
            }
        })
    };

    let rewrites = uris
        .iter()
        .map(|uri| FileRewrite::updated(uri, "ignored\n", "final\n"))
        .collect();
    let result = assembler_with(Arc::clone(&registry))
        .assemble_concurrent(rewrites)
        .await;
    writer.await.unwrap();

    assert!(!result.is_partial());
    for (uri, change) in uris.iter().zip(result.edit.iter()) {
        let FileChange::Update { document, edits } = change else {
            panic!("expected update for {uri}");
        };
        assert_eq!(&document.uri, uri);
        let version = document.version.unwrap();
        assert!(version == 1 || version == 2);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "final\n");
    }
}
