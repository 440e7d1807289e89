//! Applying an assembled update to its base text reproduces the rewrite's
//! "after" text, in every position encoding.

use reweave_lsp::{AssembleOptions, EditMode, FileRewrite};
use reweave_types::{FileChange, PositionEncoding};

use crate::common::{apply_to, assembler, file_uri};

const CASES: &[(&str, &str)] = &[
    ("", "package a;\n"),
    ("package a;\n", ""),
    ("class A {\n}\n", "class A {\n  int x;\n}\n"),
    ("a\nb\nc\nd\n", "a\nd\n"),
    ("a\nb\nc\n", "a\nB\nc\nD\n"),
    ("no newline", "no newline\n"),
    ("trailing\n", "trailing"),
    ("x\r\ny\r\nz\r\n", "x\r\nY\r\nz\r\nw\r\n"),
    ("one\rtwo\rthree", "one\rthree"),
    ("mixed\r\nends\nhere\r", "mixed\nends\r\nhere\r"),
    ("String s = \"é\";\nint n;\n", "String s = \"😀é\";\nint n;\nint m;\n"),
    (
        "import a.B;\nimport a.C;\n\nclass X {\n  B b;\n  C c;\n}\n",
        "import a.C;\n\nclass X {\n  C c;\n  X(C c) { this.c = c; }\n}\n",
    ),
    ("import a.B;\n}\n", "}\nclass C {\n}\n"),
    ("a\n\n", "\n\r\n\n\n\r\n\r\naaé😀"),
    ("}\n}\nx\n", "y\n}\n}\n}\n"),
];

const ENCODINGS: [PositionEncoding; 3] = [
    PositionEncoding::Utf8,
    PositionEncoding::Utf16,
    PositionEncoding::Utf32,
];

fn options(encoding: PositionEncoding, mode: EditMode) -> AssembleOptions {
    AssembleOptions {
        encoding,
        mode,
        ..AssembleOptions::default()
    }
}

#[test]
fn applying_update_reproduces_after() {
    let uri = file_uri("Sample.java");
    for mode in [EditMode::Diff, EditMode::WholeDocument] {
        for encoding in ENCODINGS {
            let assembler = assembler().with_options(options(encoding, mode));
            for (before, after) in CASES {
                let result = assembler.assemble([FileRewrite::updated(&uri, *before, *after)]);
                assert!(!result.is_partial(), "{:?}", result.problems);
                assert_eq!(
                    apply_to(&result.edit, &uri, before, encoding),
                    *after,
                    "{mode:?} {encoding:?}: {before:?} -> {after:?}"
                );
            }
        }
    }
}

#[test]
fn identical_texts_produce_no_update() {
    let uri = file_uri("Same.java");
    for (before, _) in CASES {
        let result = assembler().assemble([FileRewrite::updated(&uri, *before, *before)]);
        assert!(result.edit.is_empty(), "{before:?}");
        assert!(result.reports[0].stats.is_empty());
    }
}

#[test]
fn diff_edits_never_split_a_line() {
    let uri = file_uri("Lines.java");
    for (before, after) in CASES {
        let result = assembler().assemble([FileRewrite::updated(&uri, *before, *after)]);
        let Some(FileChange::Update { edits, .. }) = result.edit.update_for(&uri) else {
            continue;
        };
        let last_line = before.lines().count() as u32;
        for edit in edits {
            for position in [edit.range.start, edit.range.end] {
                assert!(
                    position.character == 0 || position.line + 1 >= last_line,
                    "{before:?} -> {after:?}: edit boundary {position} inside a line"
                );
            }
        }
    }
}

#[test]
fn edits_within_an_update_ascend_without_overlap() {
    let uri = file_uri("Order.java");
    let before = "1\n2\n3\n4\n5\n6\n7\n";
    let after = "0\n1\n3\n4\nfive\n6\n7\n8\n";
    let result = assembler().assemble([FileRewrite::updated(&uri, before, after)]);
    let edits = result.edit.update_for(&uri).unwrap().edits();
    assert!(edits.len() >= 3);
    for pair in edits.windows(2) {
        assert!(pair[0].range.end <= pair[1].range.start);
    }
}
