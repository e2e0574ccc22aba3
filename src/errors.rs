//! fitrun Error Handling
//!
//! One error enum per boundary. Resolution and seeding failures are fatal to a
//! run and surface as [`RunError`]; persistence failures of individual results
//! are reported per item and never abort the remaining documents.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// REPOSITORY ERRORS - Resolving names to documents
// ============================================================================

/// Failures raised while resolving a document or suite from the page tree.
#[derive(Error, Diagnostic, Debug)]
pub enum RepositoryError {
    #[error("page '{name}' not found")]
    #[diagnostic(
        code(fitrun::resolve::not_found),
        help("page names are dotted paths relative to the page root, e.g. SuiteA.CaseB")
    )]
    NotFound { name: String },

    #[error("page '{name}' is not a suite")]
    #[diagnostic(
        code(fitrun::resolve::not_a_suite),
        help("mark the page with `suite: true` in its properties.yaml, or run it as a single test")
    )]
    NotASuite { name: String },

    #[error("malformed content while rendering '{name}': {message}")]
    #[diagnostic(code(fitrun::resolve::content_format))]
    ContentFormat { name: String, message: String },

    #[error("invalid page definition at '{}': {message}", path.display())]
    #[diagnostic(code(fitrun::resolve::config))]
    Config { path: PathBuf, message: String },

    #[error("cannot read '{}'", path.display())]
    #[diagnostic(code(fitrun::resolve::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RepositoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// SINK ERRORS - Persisting results and assets
// ============================================================================

/// Failures raised while writing results or assets to the output location.
#[derive(Error, Diagnostic, Debug)]
pub enum SinkError {
    #[error("cannot write '{}'", path.display())]
    #[diagnostic(code(fitrun::sink::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize run summary to '{}'", path.display())]
    #[diagnostic(code(fitrun::sink::serialize))]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SinkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// RUN ERRORS - Fatal to a whole run
// ============================================================================

/// Errors that abort a run before any document executes.
#[derive(Error, Diagnostic, Debug)]
pub enum RunError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] RepositoryError),

    #[error("cannot seed report assets")]
    #[diagnostic(
        code(fitrun::run::seed),
        help("the page root must contain files/css, files/javascript and files/images")
    )]
    Seed(#[source] SinkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ============================================================================
// CONFIG ERRORS - Loading a run configuration
// ============================================================================

/// Failures raised while loading a [`crate::config::RunConfig`].
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("cannot read config file '{}'", path.display())]
    #[diagnostic(code(fitrun::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file '{}'", path.display())]
    #[diagnostic(code(fitrun::config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing required setting '{setting}'")]
    #[diagnostic(
        code(fitrun::config::missing),
        help("pass it on the command line or set it in the config file")
    )]
    Missing { setting: &'static str },
}

// ============================================================================
// TABLE ERRORS - Markup that cannot be split into tables
// ============================================================================

/// Structural problems found while parsing fixture tables.
///
/// These never leave the execution engine: they are converted into a result
/// carrying one exception.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("unterminated <{tag}> starting at byte {offset}")]
    Unterminated { tag: &'static str, offset: usize },

    #[error("can't find tag: {tag}")]
    Missing { tag: &'static str },
}

/// An error raised by fixture code while interpreting a table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FixtureError {
    pub message: String,
}

impl FixtureError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
