//! Seams to the rewrite engine and to file I/O.
//!
//! Neither is implemented here: the rewrite engine produces whole-file
//! before/after texts, and the source loader reads files the engine did not
//! hand over inline.

use serde::{Deserialize, Serialize};

/// Where the "before" text of a rewrite comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceText {
    /// Handed over by the rewrite engine.
    Inline(String),
    /// Read through the configured [`SourceLoader`].
    Deferred,
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self::Inline(text)
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::Inline(text.to_string())
    }
}

/// One file touched by a rewrite.
///
/// A missing `before` is a creation, a missing `after` a deletion. When
/// `previous_uri` is set and differs from `uri` the file was moved; `before`
/// then describes the file at `previous_uri`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
    pub uri: String,
    pub previous_uri: Option<String>,
    pub before: Option<SourceText>,
    pub after: Option<String>,
}

impl FileRewrite {
    #[must_use]
    pub fn updated(
        uri: impl Into<String>,
        before: impl Into<SourceText>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            previous_uri: None,
            before: Some(before.into()),
            after: Some(after.into()),
        }
    }

    #[must_use]
    pub fn created(uri: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            previous_uri: None,
            before: None,
            after: Some(after.into()),
        }
    }

    #[must_use]
    pub fn deleted(uri: impl Into<String>, before: impl Into<SourceText>) -> Self {
        Self {
            uri: uri.into(),
            previous_uri: None,
            before: Some(before.into()),
            after: None,
        }
    }

    #[must_use]
    pub fn renamed(
        previous_uri: impl Into<String>,
        uri: impl Into<String>,
        before: impl Into<SourceText>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            previous_uri: Some(previous_uri.into()),
            before: Some(before.into()),
            after: Some(after.into()),
        }
    }

    /// The uri the "before" text lives at.
    #[must_use]
    pub fn source_uri(&self) -> &str {
        self.previous_uri.as_deref().unwrap_or(&self.uri)
    }

    #[must_use]
    pub fn is_rename(&self) -> bool {
        self.previous_uri
            .as_deref()
            .is_some_and(|previous| previous != self.uri)
    }
}

/// Arguments of one recipe run, as received from the client command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub recipe_id: String,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl RewriteRequest {
    #[must_use]
    pub fn new(recipe_id: impl Into<String>) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            ..Self::default()
        }
    }
}

/// Runs a named rewrite recipe and reports every file it touched.
pub trait RewriteEngine: Send + Sync {
    fn rewrite(&self, request: &RewriteRequest) -> anyhow::Result<Vec<FileRewrite>>;
}

/// Reads the current content of a document by uri.
pub trait SourceLoader: Send + Sync {
    fn load(&self, uri: &str) -> anyhow::Result<String>;
}

impl<F> SourceLoader for F
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn load(&self, uri: &str) -> anyhow::Result<String> {
        self(uri)
    }
}
