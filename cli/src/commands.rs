//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf, absolute};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Deserialize;

use reweave_lsp::protocol::{
    apply_edit_params, document_edits_for, parse_workspace_edit, workspace_edit_value,
};
use reweave_lsp::uri::path_to_file_uri;
use reweave_lsp::{
    AssembleOptions, DocumentRegistry, DocumentSnapshot, EditMode, FileRewrite, SourceText,
    WorkspaceEditAssembler,
};
use reweave_types::WorkspaceEditSet;

use crate::loader::FsSourceLoader;

#[derive(Args)]
pub struct DiffArgs {
    /// Document URI to address. Defaults to the file URI of BEFORE.
    #[arg(long)]
    uri: Option<String>,
    /// Emit a single edit replacing the whole document
    #[arg(long)]
    whole_document: bool,
    before: PathBuf,
    after: PathBuf,
}

#[derive(Args)]
pub struct BatchArgs {
    /// JSON manifest listing the rewritten files
    manifest: PathBuf,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// File holding the document text
    document: PathBuf,
    /// File holding a WorkspaceEdit JSON
    edit: PathBuf,
    /// Document URI the edits address. Defaults to the file URI of DOCUMENT.
    #[arg(long)]
    uri: Option<String>,
}

/// Rewrites to assemble, as written by the rewrite engine.
#[derive(Debug, Deserialize)]
struct Manifest {
    /// `workspace/applyEdit` label; when set the output is the request params.
    label: Option<String>,
    files: Vec<ManifestEntry>,
}

/// One rewritten file. Relative paths resolve against the manifest directory.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    /// Document URI; derived from `path` when absent.
    uri: Option<String>,
    /// Location of the document the rewrite targets.
    path: Option<PathBuf>,
    /// File holding the text before the rewrite.
    before: Option<PathBuf>,
    /// Read the "before" text from the document itself.
    #[serde(default)]
    before_on_disk: bool,
    /// File holding the text after the rewrite. Absent for deletions.
    after: Option<PathBuf>,
    previous_uri: Option<String>,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn file_uri(path: &Path) -> Result<String> {
    let absolute = absolute(path)
        .with_context(|| format!("resolving {}", path.display()))?;
    Ok(path_to_file_uri(&absolute)?.to_string())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn assembler(options: AssembleOptions) -> WorkspaceEditAssembler {
    WorkspaceEditAssembler::new(Arc::new(DocumentRegistry::new()))
        .with_options(options)
        .with_loader(Arc::new(FsSourceLoader))
}

pub fn diff(args: DiffArgs, mut options: AssembleOptions) -> Result<ExitCode> {
    let before = read(&args.before)?;
    let after = read(&args.after)?;
    let uri = match args.uri {
        Some(uri) => uri,
        None => file_uri(&args.before)?,
    };
    if args.whole_document {
        options.mode = EditMode::WholeDocument;
    }

    let annotation = options.annotation.clone();
    let mut set = WorkspaceEditSet::new();
    if let Some(change) = assembler(options).single_file(&uri, &before, &after)? {
        set.push(change);
    }
    if let Some((id, annotation)) = annotation
        && !set.is_empty()
    {
        set.annotate(id, annotation);
    }

    tracing::info!(uri = %uri, changes = set.len(), "diff computed");
    print_json(&workspace_edit_value(&set)?)?;
    Ok(ExitCode::SUCCESS)
}

impl ManifestEntry {
    fn into_rewrite(self, base: &Path) -> Result<FileRewrite> {
        let resolve = |path: &Path| base.join(path);
        let uri = match (self.uri, &self.path) {
            (Some(uri), _) => uri,
            (None, Some(path)) => file_uri(&resolve(path))?,
            (None, None) => bail!("manifest entry needs a uri or a path"),
        };

        let before = match (self.before_on_disk, &self.before) {
            (true, Some(_)) => bail!("{uri}: before and before_on_disk are exclusive"),
            (true, None) => Some(SourceText::Deferred),
            (false, Some(path)) => Some(SourceText::Inline(read(&resolve(path))?)),
            (false, None) => None,
        };
        let after = self.after.map(|path| read(&resolve(&path))).transpose()?;

        Ok(FileRewrite {
            uri,
            previous_uri: self.previous_uri,
            before,
            after,
        })
    }
}

fn read_manifest(path: &Path) -> Result<(Option<String>, Vec<FileRewrite>)> {
    let manifest: Manifest = serde_json::from_str(&read(path)?)
        .with_context(|| format!("parsing manifest {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let rewrites = manifest
        .files
        .into_iter()
        .map(|entry| entry.into_rewrite(base))
        .collect::<Result<Vec<_>>>()?;
    Ok((manifest.label, rewrites))
}

pub async fn batch(args: BatchArgs, options: AssembleOptions) -> Result<ExitCode> {
    let (label, rewrites) = read_manifest(&args.manifest)?;
    let result = assembler(options).assemble_concurrent(rewrites).await;

    for report in &result.reports {
        tracing::info!(
            uri = %report.uri,
            source = ?report.source,
            additions = report.stats.additions,
            deletions = report.stats.deletions,
            dropped_spans = report.dropped_spans,
            "file assembled"
        );
    }
    for problem in &result.problems {
        tracing::error!(uri = %problem.uri, error = %problem.error, "file skipped");
    }

    let output = match label {
        Some(label) => apply_edit_params(Some(&label), &result.edit)?,
        None => workspace_edit_value(&result.edit)?,
    };
    print_json(&output)?;

    Ok(if result.is_partial() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

pub fn apply(args: ApplyArgs, options: AssembleOptions) -> Result<ExitCode> {
    let content = read(&args.document)?;
    let value: serde_json::Value = serde_json::from_str(&read(&args.edit)?)
        .with_context(|| format!("parsing {}", args.edit.display()))?;
    let set = parse_workspace_edit(&value).context("not a WorkspaceEdit")?;
    let uri = match args.uri {
        Some(uri) => uri,
        None => file_uri(&args.document)?,
    };

    let snapshot = DocumentSnapshot::unversioned(uri.clone(), content);
    let edits = document_edits_for(&set, snapshot, options.encoding)?;
    if edits.is_empty() {
        tracing::warn!(uri = %uri, "workspace edit has no edits for this document");
    }
    print!("{}", edits.apply()?);
    Ok(ExitCode::SUCCESS)
}
