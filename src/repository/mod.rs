//! Document repositories: resolving page names into executable documents.
//!
//! The suite-resolution algorithm lives here. A suite expands to every page
//! below it that is marked as a test, plus any page named like a suite
//! setup/teardown, in hierarchy order. Every collected page is rendered the
//! same way a single test is: nearest inherited `SetUp` before the body,
//! nearest inherited `TearDown` after it.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use crate::document::Document;
use crate::errors::{RepositoryError, SinkError};
use crate::sink::ResultSink;

pub mod filesystem;
pub mod render;
pub mod tree;

pub use tree::{PageAttributes, PageId, PageTree};

/// Spliced before every test body.
pub const SETUP_NAME: &str = "SetUp";
/// Spliced after every test body.
pub const TEARDOWN_NAME: &str = "TearDown";
/// Runs once before a suite; spliced before a single test run.
pub const SUITE_SETUP_NAME: &str = "SuiteSetUp";
/// Runs once after a suite; spliced after a single test run.
pub const SUITE_TEARDOWN_NAME: &str = "SuiteTearDown";

/// Static report assets: location under the backing store's `files/`
/// directory, and the relative name they get in the sink.
pub const REPORT_ASSETS: [(&str, &str); 4] = [
    ("css/fitnesse_base.css", "fitnesse.css"),
    ("javascript/fitnesse.js", "fitnesse.js"),
    ("images/collapsableOpen.gif", "images/collapsableOpen.gif"),
    ("images/collapsableClosed.gif", "images/collapsableClosed.gif"),
];

/// Resolves names into documents and seeds the sink with report assets.
pub trait DocumentRepository {
    /// Resolves one test page, with inherited suite and per-test
    /// setup/teardown spliced around its content.
    fn resolve_one(&self, name: &str) -> Result<Document, RepositoryError>;

    /// Expands a suite into its documents, in hierarchy order.
    fn resolve_suite(&self, name: &str) -> Result<Vec<Document>, RepositoryError>;

    /// Copies the static assets the rendered pages link to into `sink`.
    fn seed_assets(&self, sink: &dyn ResultSink) -> Result<(), SinkError>;
}

/// Where a [`TreeRepository`] reads its static assets from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// A `files/` directory holding every entry of [`REPORT_ASSETS`].
    Directory(PathBuf),
    /// Assets registered in memory, keyed by their relative sink name.
    Memory(BTreeMap<String, Vec<u8>>),
}

/// A repository backed by a [`PageTree`].
#[derive(Debug, Clone)]
pub struct TreeRepository {
    tree: PageTree,
    assets: AssetSource,
}

impl TreeRepository {
    /// Wraps a tree built in memory. It starts without assets.
    pub fn in_memory(tree: PageTree) -> Self {
        Self {
            tree,
            assets: AssetSource::Memory(BTreeMap::new()),
        }
    }

    pub fn with_assets(tree: PageTree, assets: AssetSource) -> Self {
        Self { tree, assets }
    }

    /// Registers an in-memory asset under its sink name (the second column
    /// of [`REPORT_ASSETS`]). Has no effect on directory-backed repositories.
    pub fn add_asset(&mut self, relative_name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        if let AssetSource::Memory(assets) = &mut self.assets {
            assets.insert(relative_name.into(), bytes.into());
        }
    }

    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    fn lookup(&self, name: &str) -> Result<PageId, RepositoryError> {
        self.tree
            .resolve(name)
            .ok_or_else(|| RepositoryError::NotFound {
                name: name.to_string(),
            })
    }

    fn is_reserved(&self, id: PageId) -> bool {
        let name = self.tree.name(id);
        [SETUP_NAME, TEARDOWN_NAME, SUITE_SETUP_NAME, SUITE_TEARDOWN_NAME].contains(&name)
    }

    /// Suite setup/teardown pages are collected into suites even when they
    /// are not marked as tests. Matches the bare name or a dotted suffix of
    /// the full name, so a page with a reserved name anywhere below the suite
    /// is pulled in.
    fn is_suite_setup_or_teardown(&self, id: PageId) -> bool {
        let simple = self.tree.name(id);
        let full = self.tree.full_name(id);
        [SUITE_SETUP_NAME, SUITE_TEARDOWN_NAME].iter().any(|reserved| {
            simple == *reserved || full.ends_with(&format!(".{reserved}"))
        })
    }

    /// The nearest page called `reserved` visible from `id`, never `id`
    /// itself.
    fn inherited(&self, id: PageId, reserved: &str) -> Option<PageId> {
        self.tree
            .find_inherited(id, reserved)
            .filter(|&found| found != id)
    }

    fn included_content(&self, owner: &str, page: PageId) -> Result<&str, RepositoryError> {
        let content = self.tree.content(page);
        render::check_balanced_tables(owner, &self.tree.full_name(page), content)?;
        Ok(content)
    }

    /// Page content with the nearest per-test setup and teardown around it.
    /// Reserved pages are taken as they are.
    fn body_with_setup(&self, name: &str, id: PageId) -> Result<String, RepositoryError> {
        let mut body = String::new();
        let reserved = self.is_reserved(id);
        if !reserved {
            if let Some(setup) = self.inherited(id, SETUP_NAME) {
                body.push_str(self.included_content(name, setup)?);
            }
        }
        body.push_str(self.tree.content(id));
        if !reserved {
            if let Some(teardown) = self.inherited(id, TEARDOWN_NAME) {
                body.push_str(self.included_content(name, teardown)?);
            }
        }
        Ok(body)
    }

    fn render(
        &self,
        id: PageId,
        suite_setup: Option<PageId>,
        suite_teardown: Option<PageId>,
    ) -> Result<Document, RepositoryError> {
        let name = self.tree.full_name(id);
        let mut content = String::new();
        if let Some(setup) = suite_setup {
            content.push_str(self.included_content(&name, setup)?);
        }
        content.push_str(&self.body_with_setup(&name, id)?);
        if let Some(teardown) = suite_teardown {
            content.push_str(self.included_content(&name, teardown)?);
        }
        let html = render::render_page(&name, &content);
        Ok(Document::new(name, html))
    }
}

impl DocumentRepository for TreeRepository {
    fn resolve_one(&self, name: &str) -> Result<Document, RepositoryError> {
        let id = self.lookup(name)?;
        let suite_setup = self.inherited(id, SUITE_SETUP_NAME);
        let suite_teardown = self.inherited(id, SUITE_TEARDOWN_NAME);
        debug!(
            test = name,
            suite_setup = suite_setup.is_some(),
            suite_teardown = suite_teardown.is_some(),
            "resolving test"
        );
        self.render(id, suite_setup, suite_teardown)
    }

    fn resolve_suite(&self, name: &str) -> Result<Vec<Document>, RepositoryError> {
        let root = self.lookup(name)?;
        if !self.tree.attributes(root).suite {
            return Err(RepositoryError::NotASuite {
                name: name.to_string(),
            });
        }
        let mut documents = Vec::new();
        for id in self.tree.walk(root) {
            let is_test = self.tree.attributes(id).test;
            if !is_test && !self.is_suite_setup_or_teardown(id) {
                continue;
            }
            if !is_test {
                debug!(page = %self.tree.full_name(id), "including suite fixture page by name");
            }
            documents.push(self.render(id, None, None)?);
        }
        debug!(suite = name, documents = documents.len(), "resolved suite");
        Ok(documents)
    }

    fn seed_assets(&self, sink: &dyn ResultSink) -> Result<(), SinkError> {
        match &self.assets {
            AssetSource::Directory(files) => {
                for (source, target) in REPORT_ASSETS {
                    let path = files.join(source);
                    let bytes = std::fs::read(&path).map_err(|e| SinkError::io(&path, e))?;
                    sink.add_asset(&bytes, target)?;
                }
            }
            AssetSource::Memory(assets) => {
                for (_, target) in REPORT_ASSETS {
                    let bytes = assets.get(target).ok_or_else(|| {
                        SinkError::io(
                            target,
                            io::Error::new(io::ErrorKind::NotFound, "report asset not registered"),
                        )
                    })?;
                    sink.add_asset(bytes, target)?;
                }
            }
        }
        Ok(())
    }
}
