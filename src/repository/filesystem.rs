//! Loading a page tree from a directory hierarchy.
//!
//! ```text
//! <root>/pages/SuiteA/properties.yaml     suite: true
//! <root>/pages/SuiteA/CaseB/content.txt   the test markup
//! <root>/files/css/fitnesse_base.css      report assets
//! ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use super::tree::{PageAttributes, PageId, PageTree};
use super::{AssetSource, TreeRepository, SUITE_SETUP_NAME, SUITE_TEARDOWN_NAME};
use crate::errors::RepositoryError;

pub const PAGES_DIR: &str = "pages";
pub const FILES_DIR: &str = "files";
pub const CONTENT_FILE: &str = "content.txt";
pub const PROPERTIES_FILE: &str = "properties.yaml";

/// Contents of a page's `properties.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PageProperties {
    suite: bool,
    test: bool,
    /// Children listed here come first, in this order.
    order: Vec<String>,
}

#[derive(Debug, Default)]
struct PageDir {
    properties: PageProperties,
    content: String,
    children: Vec<PathBuf>,
}

impl TreeRepository {
    /// Opens a repository rooted at `root`, loading every page under
    /// `root/pages`. Assets are read from `root/files` when seeding.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let root = root.as_ref();
        let pages = root.join(PAGES_DIR);
        if !pages.is_dir() {
            return Err(RepositoryError::Config {
                path: root.to_path_buf(),
                message: format!("not a test repository root: missing '{PAGES_DIR}' directory"),
            });
        }
        let tree = load_tree(&pages)?;
        debug!(root = %root.display(), pages = tree.len() - 1, "loaded page tree");
        Ok(Self::with_assets(
            tree,
            AssetSource::Directory(root.join(FILES_DIR)),
        ))
    }
}

fn load_tree(pages: &Path) -> Result<PageTree, RepositoryError> {
    let mut dirs: BTreeMap<PathBuf, PageDir> = BTreeMap::new();
    let walker = WalkDir::new(pages)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e.file_name()));
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| pages.to_path_buf());
            RepositoryError::io(path, e.into())
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path().to_path_buf();
        if entry.depth() > 0 {
            check_page_name(&path)?;
        }
        let page = read_page_dir(&path)?;
        if let Some(parent) = path.parent() {
            if let Some(parent_dir) = dirs.get_mut(parent) {
                parent_dir.children.push(path.clone());
            }
        }
        dirs.insert(path, page);
    }

    let mut tree = PageTree::new();
    let root = tree.root();
    let mut pending = vec![(pages.to_path_buf(), root)];
    while let Some((path, id)) = pending.pop() {
        let Some(dir) = dirs.remove(&path) else {
            continue;
        };
        for child_path in ordered_children(&dir) {
            let Some(child) = dirs.get(&child_path) else {
                continue;
            };
            let name = file_name(&child_path);
            let attributes = PageAttributes {
                suite: child.properties.suite,
                test: child.properties.test,
            };
            let child_id: PageId = tree.add_page(id, name, child.content.clone(), attributes);
            pending.push((child_path, child_id));
        }
    }
    Ok(tree)
}

/// Listed children first, then `SuiteSetUp`, the rest by name, and
/// `SuiteTearDown` last.
fn ordered_children(dir: &PageDir) -> Vec<PathBuf> {
    let mut remaining = dir.children.clone();
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut take = |name: &str, remaining: &mut Vec<PathBuf>| {
        if let Some(pos) = remaining.iter().position(|p| file_name(p) == name) {
            ordered.push(remaining.remove(pos));
        }
    };
    for name in &dir.properties.order {
        take(name, &mut remaining);
    }
    take(SUITE_SETUP_NAME, &mut remaining);
    let teardown = remaining
        .iter()
        .position(|p| file_name(p) == SUITE_TEARDOWN_NAME)
        .map(|pos| remaining.remove(pos));
    ordered.extend(remaining);
    ordered.extend(teardown);
    ordered
}

fn read_page_dir(path: &Path) -> Result<PageDir, RepositoryError> {
    let content_path = path.join(CONTENT_FILE);
    let content = match std::fs::read_to_string(&content_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(RepositoryError::ContentFormat {
                name: content_path.display().to_string(),
                message: "content is not valid UTF-8".to_string(),
            })
        }
        Err(e) => return Err(RepositoryError::io(content_path, e)),
    };

    let properties_path = path.join(PROPERTIES_FILE);
    let properties = match std::fs::read_to_string(&properties_path) {
        Ok(text) if text.trim().is_empty() => PageProperties::default(),
        Ok(text) => serde_yaml::from_str(&text).map_err(|e| RepositoryError::Config {
            path: properties_path.clone(),
            message: e.to_string(),
        })?,
        Err(e) if e.kind() == ErrorKind::NotFound => PageProperties::default(),
        Err(e) => return Err(RepositoryError::io(properties_path, e)),
    };

    Ok(PageDir {
        properties,
        content,
        children: Vec::new(),
    })
}

fn check_page_name(path: &Path) -> Result<(), RepositoryError> {
    let name = file_name(path);
    if name.is_empty() || name.contains('.') {
        return Err(RepositoryError::Config {
            path: path.to_path_buf(),
            message: "page directory names must be non-empty and contain no '.'".to_string(),
        });
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
