//! Generated before/after pairs: the assembled update always reproduces
//! "after", for every algorithm, encoding and mode.

use proptest::prelude::*;

use reweave_lsp::{AssembleOptions, EditMode, FileRewrite};
use reweave_text::DiffAlgorithm;
use reweave_types::PositionEncoding;

use crate::common::{apply_to, assembler, file_uri};

const ALGORITHMS: [DiffAlgorithm; 3] = [
    DiffAlgorithm::Myers,
    DiffAlgorithm::Patience,
    DiffAlgorithm::Lcs,
];

const ENCODINGS: [PositionEncoding; 3] = [
    PositionEncoding::Utf8,
    PositionEncoding::Utf16,
    PositionEncoding::Utf32,
];

const MODES: [EditMode; 2] = [EditMode::Diff, EditMode::WholeDocument];

/// Short texts drawn from few distinct lines, so repeats are common.
fn arb_text() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        Just(String::new()),
        Just("}".to_string()),
        Just("import a.B;".to_string()),
        "[ab{} é😀]{1,4}",
    ];
    let ending = prop_oneof![Just("\n"), Just("\r\n"), Just("\r"), Just("")];
    prop::collection::vec((line, ending), 0..8)
        .prop_map(|lines| lines.into_iter().map(|(line, ending)| line + ending).collect())
}

proptest! {
    #[test]
    fn prop_assembled_update_reproduces_after(before in arb_text(), after in arb_text()) {
        let uri = file_uri("Generated.java");
        for algorithm in ALGORITHMS {
            for encoding in ENCODINGS {
                for mode in MODES {
                    let options = AssembleOptions {
                        algorithm,
                        encoding,
                        mode,
                        ..AssembleOptions::default()
                    };
                    let result = assembler()
                        .with_options(options)
                        .assemble([FileRewrite::updated(&uri, before.as_str(), after.as_str())]);

                    prop_assert!(result.problems.is_empty(), "{:?}", result.problems);
                    prop_assert_eq!(result.dropped_spans(), 0);
                    prop_assert_eq!(
                        apply_to(&result.edit, &uri, &before, encoding),
                        after.clone(),
                        "{:?} {:?} {:?}", algorithm, encoding, mode
                    );
                }
            }
        }
    }
}
