//! Request context for rendering.

use std::collections::BTreeSet;

use nav_tree::{Page, PageId, PageTree, Site};

use crate::error::{MenuError, ValidationErrors};

/// What the caller knows about the current request.
///
/// Anything left unset is derived from the page tree when a render needs it.
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    /// Site being served.
    pub site: Option<Site>,
    /// Page being served.
    pub current_page: Option<Page>,
    /// Request path, used to mark custom URL items active.
    pub current_path: Option<String>,
    /// Root of the section containing the current page.
    pub section_root: Option<Page>,
    /// Ids of the current page's ancestors eligible for the ancestor class.
    pub ancestor_ids: Option<BTreeSet<PageId>>,
}

impl RenderContext {
    /// Context for a site with no current page.
    #[must_use]
    pub fn for_site(site: Site) -> Self {
        Self {
            site: Some(site),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn current_page(mut self, page: Page) -> Self {
        self.current_page = Some(page);
        self
    }

    #[must_use]
    pub fn current_path(mut self, path: impl Into<String>) -> Self {
        self.current_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn section_root(mut self, page: Page) -> Self {
        self.section_root = Some(page);
        self
    }

    #[must_use]
    pub fn ancestor_ids(mut self, ids: impl IntoIterator<Item = PageId>) -> Self {
        self.ancestor_ids = Some(ids.into_iter().collect());
        self
    }

    /// True if `page` is the page being served.
    #[must_use]
    pub fn is_current(&self, page: &Page) -> bool {
        self.current_page.as_ref().is_some_and(|p| p.id == page.id)
    }

    /// Ancestor ids, derived from the tree when not supplied.
    ///
    /// Only ancestors at or below `section_root_depth` are included, so the
    /// site root and home page are never highlighted.
    pub(crate) fn resolve_ancestor_ids(
        &self,
        tree: &dyn PageTree,
        section_root_depth: u32,
    ) -> Result<BTreeSet<PageId>, MenuError> {
        if let Some(ids) = &self.ancestor_ids {
            return Ok(ids.clone());
        }
        let Some(page) = &self.current_page else {
            return Ok(BTreeSet::new());
        };
        Ok(tree
            .ancestors(page)?
            .into_iter()
            .filter(|ancestor| ancestor.depth >= section_root_depth)
            .map(|ancestor| ancestor.id)
            .collect())
    }

    /// Section root, derived from the current page when not supplied.
    pub(crate) fn resolve_section_root(
        &self,
        tree: &dyn PageTree,
        section_root_depth: u32,
    ) -> Result<Page, MenuError> {
        if let Some(root) = &self.section_root {
            return Ok(root.clone());
        }
        let missing = || {
            MenuError::Validation(ValidationErrors::for_field(
                "section_root_page",
                "Could not identify a section root page for the current page",
            ))
        };
        let page = self.current_page.as_ref().ok_or_else(missing)?;
        if page.depth == section_root_depth {
            return Ok(page.clone());
        }
        if page.depth < section_root_depth {
            return Err(missing());
        }
        tree.ancestors(page)?
            .into_iter()
            .find(|ancestor| ancestor.depth == section_root_depth)
            .ok_or_else(missing)
    }

    /// Parent for a children menu: `explicit`, else the current page.
    pub(crate) fn resolve_parent_page(&self, explicit: Option<&Page>) -> Result<Page, MenuError> {
        explicit
            .or(self.current_page.as_ref())
            .cloned()
            .ok_or_else(|| {
                MenuError::Validation(ValidationErrors::for_field(
                    "parent_page",
                    "A parent page is required when the current page is unknown",
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use nav_tree::{MockPageTree, NewPage};
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_tree() -> (MockPageTree, PageId) {
        let tree = MockPageTree::new();
        let root = tree.add_root(NewPage::new("Root"));
        let home = tree.add_child(root, NewPage::new("Home"));
        let about = tree.add_child(home, NewPage::new("About"));
        let team = tree.add_child(about, NewPage::new("Team"));
        let leaders = tree.add_child(team, NewPage::new("Leadership"));
        (tree, leaders)
    }

    #[test]
    fn test_ancestor_ids_derived_below_section_root_depth() {
        let (tree, leaders) = make_tree();
        let ctx = RenderContext::default().current_page(tree.page(leaders));

        let ids = ctx.resolve_ancestor_ids(&tree, 3).unwrap();

        let expected = BTreeSet::from([tree.id_of("About"), tree.id_of("Team")]);
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_explicit_ancestor_ids_win() {
        let (tree, leaders) = make_tree();
        let ctx = RenderContext::default()
            .current_page(tree.page(leaders))
            .ancestor_ids([99]);
        tree.reset_query_count();

        let ids = ctx.resolve_ancestor_ids(&tree, 3).unwrap();

        assert_eq!(ids, BTreeSet::from([99]));
        assert_eq!(tree.query_count(), 0);
    }

    #[test]
    fn test_no_current_page_means_no_ancestors() {
        let (tree, _) = make_tree();

        let ids = RenderContext::default().resolve_ancestor_ids(&tree, 3).unwrap();

        assert!(ids.is_empty());
    }

    #[test]
    fn test_section_root_from_deep_page() {
        let (tree, leaders) = make_tree();
        let ctx = RenderContext::default().current_page(tree.page(leaders));

        let root = ctx.resolve_section_root(&tree, 3).unwrap();

        assert_eq!(root.title, "About");
    }

    #[test]
    fn test_section_root_is_page_at_that_depth() {
        let (tree, _) = make_tree();
        let about = tree.page(tree.id_of("About"));
        let ctx = RenderContext::default().current_page(about);

        assert_eq!(ctx.resolve_section_root(&tree, 3).unwrap().title, "About");
    }

    #[test]
    fn test_section_root_missing_above_depth() {
        let (tree, _) = make_tree();
        let home = tree.page(tree.id_of("Home"));
        let ctx = RenderContext::default().current_page(home);

        let err = ctx.resolve_section_root(&tree, 3).unwrap_err();

        let MenuError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.field_names().collect::<Vec<_>>(), vec!["section_root_page"]);
    }

    #[test]
    fn test_parent_page_falls_back_to_current_page() {
        let (tree, leaders) = make_tree();
        let ctx = RenderContext::default().current_page(tree.page(leaders));

        assert_eq!(ctx.resolve_parent_page(None).unwrap().id, leaders);
        assert!(RenderContext::default().resolve_parent_page(None).is_err());
    }
}
