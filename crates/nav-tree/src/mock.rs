//! Mock page tree implementation for testing.
//!
//! Provides [`MockPageTree`] for unit testing without a database.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::filter::PageQuery;
use crate::page::{Page, PageId, SpecificFields};
use crate::path::{child_path, depth_of};
use crate::tree::{PageTree, TreeError, TreeErrorKind};

/// Depth of site home pages. Their descendants get URLs from their slugs.
const SITE_HOME_DEPTH: u32 = 2;

/// Attributes for a page added to a [`MockPageTree`].
#[derive(Clone, Debug)]
pub struct NewPage {
    title: String,
    slug: String,
    content_type: String,
    live: bool,
    expired: bool,
    show_in_menus: bool,
    specific: SpecificFields,
}

impl NewPage {
    /// A live, unexpired page shown in menus, slug derived from the title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let slug = title
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        Self {
            title,
            slug,
            content_type: "Page".to_owned(),
            live: true,
            expired: false,
            show_in_menus: true,
            specific: SpecificFields::default(),
        }
    }

    /// Override the slug.
    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Set the concrete page type name.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Mark as unpublished.
    #[must_use]
    pub fn draft(mut self) -> Self {
        self.live = false;
        self
    }

    /// Mark as expired.
    #[must_use]
    pub fn expired(mut self) -> Self {
        self.expired = true;
        self
    }

    /// Hide from menus.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.show_in_menus = false;
        self
    }

    /// Repeat this page in its own sub menu, optionally with custom text.
    #[must_use]
    pub fn repeat_in_subnav(mut self, text: Option<&str>) -> Self {
        self.specific = SpecificFields {
            repeat_in_subnav: true,
            repeated_item_text: text.map(str::to_owned),
        };
        self
    }
}

/// Mock page tree for testing.
///
/// Stores fully resolved pages in memory and strips concrete-type fields
/// from query results unless specific rows are requested. Every call that
/// would hit a database increments [`MockPageTree::query_count`].
///
/// # Example
///
/// ```ignore
/// use nav_tree::{MockPageTree, NewPage, PageFilter, PageQuery, PageTree};
///
/// let tree = MockPageTree::new();
/// let root = tree.add_root(NewPage::new("Root"));
/// let home = tree.add_child(root, NewPage::new("Home"));
/// tree.add_child(home, NewPage::new("About"));
///
/// let pages = tree.query(&PageQuery::new(PageFilter::base())).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockPageTree {
    pages: RwLock<Vec<Page>>,
    next_id: AtomicU64,
    queries: AtomicUsize,
}

impl MockPageTree {
    /// Create a new empty mock tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned or the tree is full.
    pub fn add_root(&self, page: NewPage) -> PageId {
        let mut pages = self.pages.write().unwrap();
        let position = pages.iter().filter(|p| p.depth == 1).count() + 1;
        let path = child_path("", segment_number(position)).unwrap();
        self.insert(&mut pages, page, path, None)
    }

    /// Add a page as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist or the internal lock is poisoned.
    pub fn add_child(&self, parent: PageId, page: NewPage) -> PageId {
        let mut pages = self.pages.write().unwrap();
        let parent_page = pages
            .iter()
            .find(|p| p.id == parent)
            .cloned()
            .unwrap_or_else(|| panic!("parent page {parent} does not exist"));
        let position = pages
            .iter()
            .filter(|p| p.parent_key() == parent_page.path)
            .count()
            + 1;
        let path = child_path(&parent_page.path, segment_number(position)).unwrap();
        self.insert(&mut pages, page, path, Some(&parent_page))
    }

    /// Modify a stored page in place.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn update(&self, id: PageId, f: impl FnOnce(&mut Page)) {
        if let Some(page) = self.pages.write().unwrap().iter_mut().find(|p| p.id == id) {
            f(page);
        }
    }

    /// Base-type row for a page, without counting a query.
    ///
    /// # Panics
    ///
    /// Panics if the page does not exist or the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, id: PageId) -> Page {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(Page::into_base)
            .unwrap_or_else(|| panic!("page {id} does not exist"))
    }

    /// Id of the first page with the given title.
    ///
    /// # Panics
    ///
    /// Panics if no page has that title or the internal lock is poisoned.
    #[must_use]
    pub fn id_of(&self, title: &str) -> PageId {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.title == title)
            .map(|p| p.id)
            .unwrap_or_else(|| panic!("no page titled {title:?}"))
    }

    /// Number of backend calls made so far.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Reset the backend call counter.
    pub fn reset_query_count(&self) {
        self.queries.store(0, Ordering::SeqCst);
    }

    fn insert(
        &self,
        pages: &mut Vec<Page>,
        new: NewPage,
        path: String,
        parent: Option<&Page>,
    ) -> PageId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let depth = depth_of(&path).unwrap();
        let url_path = match parent {
            Some(parent) if depth > SITE_HOME_DEPTH => format!("{}{}/", parent.url_path, new.slug),
            _ => "/".to_owned(),
        };
        pages.push(Page {
            id,
            title: new.title,
            slug: new.slug,
            content_type: new.content_type,
            path,
            depth,
            url_path,
            live: new.live,
            expired: new.expired,
            show_in_menus: new.show_in_menus,
            specific: Some(new.specific),
        });
        pages.sort_by(|a, b| a.path.cmp(&b.path));
        id
    }

    fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

fn segment_number(position: usize) -> u32 {
    u32::try_from(position).unwrap_or(u32::MAX)
}

impl PageTree for MockPageTree {
    fn query(&self, query: &PageQuery) -> Result<Vec<Page>, TreeError> {
        self.record_query();
        if query.filter.is_nothing() {
            return Ok(Vec::new());
        }
        let pages = self.pages.read().unwrap();
        Ok(pages
            .iter()
            .filter(|p| query.filter.matches(p))
            .cloned()
            .map(|p| if query.specific { p } else { p.into_base() })
            .collect())
    }

    fn get(&self, id: PageId) -> Result<Option<Page>, TreeError> {
        self.record_query();
        let pages = self.pages.read().unwrap();
        Ok(pages
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(Page::into_base))
    }

    fn specific(&self, page: &Page) -> Result<Page, TreeError> {
        if page.is_specific() {
            return Ok(page.clone());
        }
        self.record_query();
        let pages = self.pages.read().unwrap();
        pages
            .iter()
            .find(|p| p.id == page.id)
            .cloned()
            .ok_or_else(|| {
                TreeError::new(TreeErrorKind::NotFound)
                    .with_page(page.id)
                    .with_backend("Mock")
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::filter::PageFilter;

    fn make_tree() -> MockPageTree {
        let tree = MockPageTree::new();
        let root = tree.add_root(NewPage::new("Root"));
        let home = tree.add_child(root, NewPage::new("Home"));
        let about = tree.add_child(home, NewPage::new("About Us"));
        tree.add_child(about, NewPage::new("Team").repeat_in_subnav(None));
        tree.add_child(home, NewPage::new("Drafts").draft());
        tree
    }

    #[test]
    fn test_paths_and_depths() {
        let tree = make_tree();

        let team = tree.page(tree.id_of("Team"));
        assert_eq!(team.path, "0001000100010001");
        assert_eq!(team.depth, 4);

        let drafts = tree.page(tree.id_of("Drafts"));
        assert_eq!(drafts.path, "000100010002");
    }

    #[test]
    fn test_url_paths_start_below_home() {
        let tree = make_tree();

        assert_eq!(tree.page(tree.id_of("Root")).url_path, "/");
        assert_eq!(tree.page(tree.id_of("Home")).url_path, "/");
        assert_eq!(tree.page(tree.id_of("About Us")).url_path, "/about-us/");
        assert_eq!(tree.page(tree.id_of("Team")).url_path, "/about-us/team/");
    }

    #[test]
    fn test_query_returns_base_rows_in_path_order() {
        let tree = make_tree();

        let pages = tree.query(&PageQuery::new(PageFilter::base())).unwrap();

        let titles: Vec<_> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Root", "Home", "About Us", "Team"]);
        assert!(pages.iter().all(|p| !p.is_specific()));
    }

    #[test]
    fn test_query_specific_rows() {
        let tree = make_tree();
        let query = PageQuery::new(PageFilter::IdIn([tree.id_of("Team")].into())).specific(true);

        let pages = tree.query(&query).unwrap();

        assert_eq!(pages.len(), 1);
        assert!(pages[0].repeat_in_subnav());
    }

    #[test]
    fn test_query_counting() {
        let tree = make_tree();
        assert_eq!(tree.query_count(), 0);

        tree.query(&PageQuery::new(PageFilter::All)).unwrap();
        tree.get(1).unwrap();
        assert_eq!(tree.query_count(), 2);

        tree.reset_query_count();
        assert_eq!(tree.query_count(), 0);
    }

    #[test]
    fn test_nothing_filter_skips_scan_but_counts() {
        let tree = make_tree();

        let pages = tree.query(&PageQuery::new(PageFilter::Nothing)).unwrap();

        assert!(pages.is_empty());
        assert_eq!(tree.query_count(), 1);
    }

    #[test]
    fn test_specific_resolves_base_row() {
        let tree = make_tree();
        let team = tree.page(tree.id_of("Team"));

        let resolved = tree.specific(&team).unwrap();

        assert!(resolved.is_specific());
        assert_eq!(tree.query_count(), 1);

        // Already specific: no backend call
        tree.specific(&resolved).unwrap();
        assert_eq!(tree.query_count(), 1);
    }

    #[test]
    fn test_specific_missing_page() {
        let tree = make_tree();
        let mut ghost = tree.page(1);
        ghost.id = 999;

        let err = tree.specific(&ghost).unwrap_err();

        assert_eq!(err.kind, TreeErrorKind::NotFound);
        assert_eq!(err.page_id, Some(999));
    }

    #[test]
    fn test_ancestors_default_impl() {
        let tree = make_tree();
        let team = tree.page(tree.id_of("Team"));

        let ancestors = tree.ancestors(&team).unwrap();

        let titles: Vec<_> = ancestors.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Root", "Home", "About Us"]);
    }

    #[test]
    fn test_update_modifies_page() {
        let tree = make_tree();
        let id = tree.id_of("About Us");

        tree.update(id, |page| page.show_in_menus = false);

        assert!(!tree.page(id).show_in_menus);
    }
}
