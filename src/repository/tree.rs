//! Arena-indexed page hierarchy.
//!
//! Pages refer to their parent and children by [`PageId`] index rather than by
//! owning references, so upward walks (setup/teardown inheritance) never need
//! shared ownership.

use serde::Deserialize;

/// Index of a page inside a [`PageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(usize);

/// Boolean-like markers carried by a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageAttributes {
    pub suite: bool,
    pub test: bool,
}

impl PageAttributes {
    pub fn suite() -> Self {
        Self {
            suite: true,
            test: false,
        }
    }

    pub fn test() -> Self {
        Self {
            suite: false,
            test: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Page {
    name: String,
    content: String,
    attributes: PageAttributes,
    parent: Option<PageId>,
    children: Vec<PageId>,
}

/// An ordered tree of pages rooted at an unnamed root page.
#[derive(Debug, Clone)]
pub struct PageTree {
    pages: Vec<Page>,
}

impl Default for PageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTree {
    /// Creates a tree holding only the root page.
    pub fn new() -> Self {
        Self {
            pages: vec![Page {
                name: String::new(),
                content: String::new(),
                attributes: PageAttributes::default(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> PageId {
        PageId(0)
    }

    /// Appends a child page. Children keep insertion order, which is the
    /// traversal order used for suites.
    pub fn add_page(
        &mut self,
        parent: PageId,
        name: impl Into<String>,
        content: impl Into<String>,
        attributes: PageAttributes,
    ) -> PageId {
        let id = PageId(self.pages.len());
        self.pages.push(Page {
            name: name.into(),
            content: content.into(),
            attributes,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.pages[parent.0].children.push(id);
        id
    }

    pub fn name(&self, id: PageId) -> &str {
        &self.pages[id.0].name
    }

    pub fn content(&self, id: PageId) -> &str {
        &self.pages[id.0].content
    }

    pub fn attributes(&self, id: PageId) -> PageAttributes {
        self.pages[id.0].attributes
    }

    pub fn parent(&self, id: PageId) -> Option<PageId> {
        self.pages[id.0].parent
    }

    pub fn children(&self, id: PageId) -> &[PageId] {
        &self.pages[id.0].children
    }

    pub fn child(&self, id: PageId, name: &str) -> Option<PageId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.name(child) == name)
    }

    /// Resolves a dotted path such as `SuiteA.CaseB`. An empty path or `.`
    /// names the root.
    pub fn resolve(&self, path: &str) -> Option<PageId> {
        let path = path.trim();
        if path.is_empty() || path == "." {
            return Some(self.root());
        }
        path.split('.')
            .try_fold(self.root(), |current, segment| self.child(current, segment))
    }

    /// The dotted path from the root to `id`.
    pub fn full_name(&self, id: PageId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(page) = current {
            if page != self.root() {
                segments.push(self.name(page));
            }
            current = self.parent(page);
        }
        segments.reverse();
        segments.join(".")
    }

    /// Pre-order traversal of the subtree rooted at `id`, `id` included.
    pub fn walk(&self, id: PageId) -> Vec<PageId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(page) = stack.pop() {
            order.push(page);
            stack.extend(self.children(page).iter().rev());
        }
        order
    }

    /// Finds the nearest page called `name` visible from `id`: first among
    /// the children of `id`, then among the children of each ancestor up to
    /// the root.
    pub fn find_inherited(&self, id: PageId, name: &str) -> Option<PageId> {
        let mut level = Some(id);
        while let Some(current) = level {
            if let Some(found) = self.child(current, name) {
                return Some(found);
            }
            level = self.parent(current);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.len() == 1
    }
}
