//! Assembly of per-file rewrites into one workspace edit.
//!
//! For every [`FileRewrite`] the assembler decides which resource operations
//! to emit and, for updates, which text the edits must be addressed to: an open
//! editor buffer from the snapshot registry wins over anything the rewrite
//! engine supplied. A file that fails is recorded as a [`FileProblem`] and the
//! rest of the batch still goes out.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task;

use reweave_text::{DiffStats, LineDiffer, LineIndex, SimilarDiffer, diff_stats};
use reweave_types::{
    ChangeAnnotation, DocumentIdentity, FileChange, Position, Range, TextEdit, WorkspaceEditSet,
};

use crate::document_edits::DocumentEdits;
use crate::projector::EditProjector;
use crate::registry::{DocumentSnapshot, SnapshotRegistry};
use crate::rewrite::{FileRewrite, RewriteEngine, RewriteRequest, SourceLoader, SourceText};
use crate::types::{
    AssembleOptions, AssembledEdit, ContentSource, EditError, EditMode, FileProblem, FileReport,
};
use crate::uri::file_uri_to_path;

/// Builds [`WorkspaceEditSet`]s from rewrite results.
#[derive(Clone)]
pub struct WorkspaceEditAssembler {
    registry: Arc<dyn SnapshotRegistry>,
    loader: Option<Arc<dyn SourceLoader>>,
    differ: Arc<dyn LineDiffer>,
    options: AssembleOptions,
}

impl fmt::Debug for WorkspaceEditAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceEditAssembler")
            .field("has_loader", &self.loader.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Edits computed for one document.
struct FileEdits {
    edits: Vec<TextEdit>,
    spans: usize,
    dropped_spans: usize,
    stats: DiffStats,
}

/// Everything one file contributes to the batch.
struct FileOutcome {
    changes: Vec<FileChange>,
    report: Option<FileReport>,
}

impl WorkspaceEditAssembler {
    #[must_use]
    pub fn new(registry: Arc<dyn SnapshotRegistry>) -> Self {
        let options = AssembleOptions::default();
        Self {
            registry,
            loader: None,
            differ: Arc::new(SimilarDiffer::new(options.algorithm)),
            options,
        }
    }

    /// Replace the options. The differ is reset to `similar` with the
    /// configured algorithm.
    pub fn with_options(mut self, options: AssembleOptions) -> Self {
        self.differ = Arc::new(SimilarDiffer::new(options.algorithm));
        self.options = options;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn SourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_differ(mut self, differ: Arc<dyn LineDiffer>) -> Self {
        self.differ = differ;
        self
    }

    /// Tag every emitted edit with `id` and record `annotation` in the set.
    pub fn with_annotation(mut self, id: impl Into<String>, annotation: ChangeAnnotation) -> Self {
        self.options.annotation = Some((id.into(), annotation));
        self
    }

    #[must_use]
    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Assemble one batch on the calling thread.
    pub fn assemble(&self, rewrites: impl IntoIterator<Item = FileRewrite>) -> AssembledEdit {
        let mut batch = Batch::default();
        for rewrite in rewrites {
            let uri = rewrite.uri.clone();
            batch.record(uri, self.compute_file(rewrite));
        }
        batch.finish(&self.options)
    }

    /// Like [`Self::assemble`], checking `cancel` before each file.
    pub fn assemble_cancellable(
        &self,
        rewrites: impl IntoIterator<Item = FileRewrite>,
        cancel: &AtomicBool,
    ) -> Result<AssembledEdit, EditError> {
        let mut batch = Batch::default();
        for rewrite in rewrites {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!(
                    completed = batch.reports.len() + batch.problems.len(),
                    "workspace edit assembly cancelled"
                );
                return Err(EditError::Cancelled);
            }
            let uri = rewrite.uri.clone();
            batch.record(uri, self.compute_file(rewrite));
        }
        Ok(batch.finish(&self.options))
    }

    /// Compute files on the blocking pool; results merge in input order.
    pub async fn assemble_concurrent(&self, rewrites: Vec<FileRewrite>) -> AssembledEdit {
        let handles: Vec<_> = rewrites
            .into_iter()
            .map(|rewrite| {
                let uri = rewrite.uri.clone();
                let assembler = self.clone();
                let handle = task::spawn_blocking(move || assembler.compute_file(rewrite));
                (uri, handle)
            })
            .collect();

        let mut batch = Batch::default();
        for (uri, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(EditError::Worker {
                    uri: uri.clone(),
                    message: err.to_string(),
                }),
            };
            batch.record(uri, result);
        }
        batch.finish(&self.options)
    }

    /// Run `request` through `engine` and assemble what it produced.
    ///
    /// A failing engine fails the whole batch; failing files do not.
    pub fn run_recipe(
        &self,
        engine: &dyn RewriteEngine,
        request: &RewriteRequest,
    ) -> Result<AssembledEdit, EditError> {
        let rewrites = engine.rewrite(request).map_err(|err| EditError::Rewrite {
            recipe: request.recipe_id.clone(),
            message: format!("{err:#}"),
        })?;
        tracing::info!(
            recipe = %request.recipe_id,
            files = rewrites.len(),
            "rewrite recipe produced results"
        );
        Ok(self.assemble(rewrites))
    }

    /// `Update` turning `old` into `new` for `uri`, without consulting the
    /// registry. `None` when the texts do not differ.
    pub fn single_file(
        &self,
        uri: &str,
        old: &str,
        new: &str,
    ) -> Result<Option<FileChange>, EditError> {
        let snapshot = DocumentSnapshot::unversioned(uri, old);
        let computed = self.compute_edits(&snapshot, new)?;
        Ok((!computed.edits.is_empty()).then(|| FileChange::Update {
            document: snapshot.identity().clone(),
            edits: computed.edits,
        }))
    }

    fn compute_file(&self, rewrite: FileRewrite) -> Result<FileOutcome, EditError> {
        let renamed = rewrite.is_rename();
        let FileRewrite {
            uri,
            previous_uri,
            before,
            after,
        } = rewrite;

        match (before, after) {
            (None, None) => {
                tracing::debug!(uri = %uri, "rewrite has neither before nor after text");
                Ok(FileOutcome {
                    changes: Vec::new(),
                    report: None,
                })
            }
            (None, Some(after)) => {
                require_file_path(&uri)?;
                let edit = TextEdit::insert(Position::origin(), after)
                    .with_annotation(self.options.annotation_id().map(str::to_string));
                tracing::debug!(uri = %uri, "creating file");
                Ok(FileOutcome {
                    changes: vec![
                        FileChange::Create { uri: uri.clone() },
                        FileChange::Update {
                            document: DocumentIdentity::unversioned(uri.clone()),
                            edits: vec![edit],
                        },
                    ],
                    report: Some(resource_report(uri, ContentSource::Created)),
                })
            }
            (Some(_), None) => {
                let target = previous_uri.unwrap_or_else(|| uri.clone());
                require_file_path(&target)?;
                tracing::debug!(uri = %target, "deleting file");
                Ok(FileOutcome {
                    changes: vec![FileChange::Delete { uri: target }],
                    report: Some(resource_report(uri, ContentSource::Deleted)),
                })
            }
            (Some(before), Some(after)) => {
                let source_uri = previous_uri.unwrap_or_else(|| uri.clone());
                let mut changes = Vec::new();
                if renamed {
                    require_file_path(&source_uri)?;
                    require_file_path(&uri)?;
                    changes.push(FileChange::Rename {
                        old_uri: source_uri.clone(),
                        new_uri: uri.clone(),
                    });
                }

                let (snapshot, source) = self.resolve(&source_uri, before)?;
                let computed = self.compute_edits(&snapshot, &after)?;
                tracing::debug!(
                    uri = %uri,
                    source = ?source,
                    edits = computed.edits.len(),
                    additions = computed.stats.additions,
                    deletions = computed.stats.deletions,
                    "computed document edits"
                );

                let report = FileReport {
                    uri: uri.clone(),
                    source,
                    spans: computed.spans,
                    dropped_spans: computed.dropped_spans,
                    stats: computed.stats,
                };
                if !computed.edits.is_empty() {
                    let document = if renamed {
                        DocumentIdentity::unversioned(uri)
                    } else {
                        snapshot.identity().clone()
                    };
                    changes.push(FileChange::Update {
                        document,
                        edits: computed.edits,
                    });
                }
                Ok(FileOutcome {
                    changes,
                    report: Some(report),
                })
            }
        }
    }

    /// The text edits must address: the open buffer if there is one.
    fn resolve(
        &self,
        uri: &str,
        before: SourceText,
    ) -> Result<(DocumentSnapshot, ContentSource), EditError> {
        if let Some(live) = self.registry.lookup(uri).filter(DocumentSnapshot::is_open) {
            let version = live.version().unwrap_or_default();
            return Ok((live, ContentSource::LiveSnapshot { version }));
        }

        match before {
            SourceText::Inline(text) => Ok((
                DocumentSnapshot::unversioned(uri, text),
                ContentSource::Supplied,
            )),
            SourceText::Deferred => {
                let loader = self
                    .loader
                    .as_ref()
                    .ok_or_else(|| EditError::SourceUnavailable {
                        uri: uri.to_string(),
                        reason: "no source loader configured".to_string(),
                    })?;
                let text = loader.load(uri).map_err(|err| EditError::SourceUnavailable {
                    uri: uri.to_string(),
                    reason: format!("{err:#}"),
                })?;
                Ok((DocumentSnapshot::unversioned(uri, text), ContentSource::Loaded))
            }
        }
    }

    fn compute_edits(&self, snapshot: &DocumentSnapshot, after: &str) -> Result<FileEdits, EditError> {
        let old = snapshot.line_index();
        let new = LineIndex::new(after);
        let spans = self.differ.diff(&old, &new);
        let stats = diff_stats(&spans);
        let annotation_id = self.options.annotation_id().map(str::to_string);

        if spans.is_empty() {
            return Ok(FileEdits {
                edits: Vec::new(),
                spans: 0,
                dropped_spans: 0,
                stats,
            });
        }

        if self.options.mode == EditMode::WholeDocument {
            let range = Range::new(Position::origin(), old.end_position(self.options.encoding));
            return Ok(FileEdits {
                edits: vec![TextEdit::new(range, after).with_annotation(annotation_id)],
                spans: spans.len(),
                dropped_spans: 0,
                stats,
            });
        }

        let projection = EditProjector::new(&old, &new).project_all(&spans);
        for dropped in &projection.dropped {
            tracing::warn!(
                uri = snapshot.uri(),
                old = ?dropped.span.old,
                new = ?dropped.span.new,
                error = %dropped.error,
                "diff span dropped from document edits"
            );
        }

        let mut accumulator = DocumentEdits::new(snapshot.clone(), false);
        for edit in projection.edits {
            accumulator.push(edit)?;
        }
        let edits =
            accumulator.to_text_edits(self.options.encoding, annotation_id.as_deref())?;
        Ok(FileEdits {
            edits,
            spans: spans.len(),
            dropped_spans: projection.dropped.len(),
            stats,
        })
    }
}

fn require_file_path(uri: &str) -> Result<(), EditError> {
    file_uri_to_path(uri)
        .map(|_| ())
        .ok_or_else(|| EditError::IdentityMismatch {
            uri: uri.to_string(),
        })
}

fn resource_report(uri: String, source: ContentSource) -> FileReport {
    FileReport {
        uri,
        source,
        spans: 0,
        dropped_spans: 0,
        stats: DiffStats::default(),
    }
}

/// Results collected in input order.
#[derive(Default)]
struct Batch {
    set: WorkspaceEditSet,
    problems: Vec<FileProblem>,
    reports: Vec<FileReport>,
}

impl Batch {
    fn record(&mut self, uri: String, result: Result<FileOutcome, EditError>) {
        match result {
            Ok(outcome) => {
                self.set.extend(outcome.changes);
                self.reports.extend(outcome.report);
            }
            Err(error) => {
                tracing::warn!(uri = %uri, %error, "abandoning change to file");
                self.problems.push(FileProblem { uri, error });
            }
        }
    }

    fn finish(mut self, options: &AssembleOptions) -> AssembledEdit {
        if let Some((id, annotation)) = &options.annotation
            && !self.set.is_empty()
        {
            self.set.annotate(id.clone(), annotation.clone());
        }
        tracing::info!(
            files = self.reports.len() + self.problems.len(),
            changes = self.set.len(),
            problems = self.problems.len(),
            "workspace edit assembled"
        );
        AssembledEdit {
            edit: self.set,
            problems: self.problems,
            reports: self.reports,
        }
    }
}
