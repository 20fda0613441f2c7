//! Parent path to children lookup built from a flat page list.

use std::collections::HashMap;

use nav_tree::Page;

/// Children of each page, keyed by the parent's materialized path.
///
/// Built in one pass over pages in tree order, so each child list keeps
/// tree order too.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageChildrenIndex {
    children: HashMap<String, Vec<Page>>,
}

impl PageChildrenIndex {
    /// Group `pages` by parent path.
    #[must_use]
    pub fn build(pages: &[Page]) -> Self {
        let mut children: HashMap<String, Vec<Page>> = HashMap::new();
        for page in pages {
            children
                .entry(page.parent_key().to_owned())
                .or_default()
                .push(page.clone());
        }
        Self { children }
    }

    /// Children of the page at `path`, empty if it has none.
    #[must_use]
    pub fn children(&self, path: &str) -> &[Page] {
        self.children.get(path).map_or(&[], Vec::as_slice)
    }

    /// True if the page at `path` has at least one child in the index.
    #[must_use]
    pub fn has_children(&self, path: &str) -> bool {
        self.children.contains_key(path)
    }

    /// Number of parents with children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
