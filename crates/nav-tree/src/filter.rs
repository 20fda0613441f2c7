//! Composable page filters.
//!
//! A [`PageFilter`] is a small boolean expression over page fields. Backends
//! translate it to their native query language; [`PageFilter::matches`] gives
//! the reference semantics and is what in-memory backends evaluate.

use std::collections::BTreeSet;

use crate::page::{Page, PageId};

/// Boolean expression over page fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageFilter {
    /// Every page.
    All,
    /// No page.
    Nothing,
    /// `live == true`.
    Live,
    /// `expired == false`.
    NotExpired,
    /// `show_in_menus == true`.
    ShownInMenus,
    /// Page id is in the set.
    IdIn(BTreeSet<PageId>),
    /// Page id is not in the set.
    IdNotIn(BTreeSet<PageId>),
    /// `depth > n`.
    DepthGreaterThan(u32),
    /// `depth < n`.
    DepthLessThan(u32),
    /// `depth <= n`.
    DepthAtMost(u32),
    /// Path starts with the prefix (the page itself included).
    PathStartsWith(String),
    /// Path equals one of the values.
    PathIn(BTreeSet<String>),
    /// Every sub-filter matches.
    And(Vec<PageFilter>),
    /// At least one sub-filter matches.
    Or(Vec<PageFilter>),
    /// The sub-filter does not match.
    Not(Box<PageFilter>),
}

impl PageFilter {
    /// Filter applied to every page that may appear in a menu: live, not
    /// expired and shown in menus.
    #[must_use]
    pub fn base() -> Self {
        Self::And(vec![Self::Live, Self::NotExpired, Self::ShownInMenus])
    }

    /// Descendants of `path` with `low < depth <= high`.
    #[must_use]
    pub fn branch(path: &str, low: u32, high: u32) -> Self {
        Self::And(vec![
            Self::DepthGreaterThan(low),
            Self::DepthAtMost(high),
            Self::PathStartsWith(path.to_owned()),
        ])
    }

    /// Intersection with another filter.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, f) | (f, Self::All) => f,
            (Self::Nothing, _) | (_, Self::Nothing) => Self::Nothing,
            (Self::And(mut lhs), Self::And(rhs)) => {
                lhs.extend(rhs);
                Self::And(lhs)
            }
            (Self::And(mut lhs), f) => {
                lhs.push(f);
                Self::And(lhs)
            }
            (lhs, rhs) => Self::And(vec![lhs, rhs]),
        }
    }

    /// Union with another filter.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Nothing, f) | (f, Self::Nothing) => f,
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::Or(mut lhs), Self::Or(rhs)) => {
                lhs.extend(rhs);
                Self::Or(lhs)
            }
            (Self::Or(mut lhs), f) => {
                lhs.push(f);
                Self::Or(lhs)
            }
            (lhs, rhs) => Self::Or(vec![lhs, rhs]),
        }
    }

    /// Negation.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::All => Self::Nothing,
            Self::Nothing => Self::All,
            Self::Not(inner) => *inner,
            f => Self::Not(Box::new(f)),
        }
    }

    /// True if the filter can never match, without evaluating it.
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        match self {
            Self::Nothing => true,
            Self::IdIn(ids) => ids.is_empty(),
            Self::PathIn(paths) => paths.is_empty(),
            Self::Or(parts) => parts.iter().all(Self::is_nothing),
            Self::And(parts) => parts.iter().any(Self::is_nothing),
            _ => false,
        }
    }

    /// Evaluate the filter against a page.
    #[must_use]
    pub fn matches(&self, page: &Page) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::Live => page.live,
            Self::NotExpired => !page.expired,
            Self::ShownInMenus => page.show_in_menus,
            Self::IdIn(ids) => ids.contains(&page.id),
            Self::IdNotIn(ids) => !ids.contains(&page.id),
            Self::DepthGreaterThan(n) => page.depth > *n,
            Self::DepthLessThan(n) => page.depth < *n,
            Self::DepthAtMost(n) => page.depth <= *n,
            Self::PathStartsWith(prefix) => page.path.starts_with(prefix.as_str()),
            Self::PathIn(paths) => paths.contains(&page.path),
            Self::And(parts) => parts.iter().all(|f| f.matches(page)),
            Self::Or(parts) => parts.iter().any(|f| f.matches(page)),
            Self::Not(inner) => !inner.matches(page),
        }
    }
}

/// A page query: a filter plus whether rows should be resolved to their
/// concrete type.
///
/// Results are always ordered by path (tree order).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageQuery {
    /// Row filter.
    pub filter: PageFilter,
    /// Bulk-resolve rows to their concrete type.
    pub specific: bool,
}

impl PageQuery {
    /// Query for base-type rows.
    #[must_use]
    pub fn new(filter: PageFilter) -> Self {
        Self {
            filter,
            specific: false,
        }
    }

    /// Request concrete-type rows.
    #[must_use]
    pub fn specific(mut self, specific: bool) -> Self {
        self.specific = specific;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_page(id: PageId, path: &str) -> Page {
        Page {
            id,
            title: format!("Page {id}"),
            slug: format!("page-{id}"),
            content_type: "Page".to_owned(),
            path: path.to_owned(),
            depth: u32::try_from(path.len() / 4).unwrap(),
            url_path: format!("/page-{id}/"),
            live: true,
            expired: false,
            show_in_menus: true,
            specific: None,
        }
    }

    #[test]
    fn test_base_filter_requires_all_flags() {
        let base = PageFilter::base();
        let mut page = make_page(1, "00010001");
        assert!(base.matches(&page));

        page.live = false;
        assert!(!base.matches(&page));

        page.live = true;
        page.expired = true;
        assert!(!base.matches(&page));

        page.expired = false;
        page.show_in_menus = false;
        assert!(!base.matches(&page));
    }

    #[test]
    fn test_branch_excludes_root_and_deep_pages() {
        let branch = PageFilter::branch("00010001", 2, 3);

        assert!(!branch.matches(&make_page(1, "00010001")));
        assert!(branch.matches(&make_page(2, "000100010001")));
        assert!(!branch.matches(&make_page(3, "0001000100010001")));
        assert!(!branch.matches(&make_page(4, "000100020001")));
    }

    #[test]
    fn test_and_with_all_is_identity() {
        assert_eq!(PageFilter::All.and(PageFilter::Live), PageFilter::Live);
        assert_eq!(PageFilter::Live.and(PageFilter::All), PageFilter::Live);
    }

    #[test]
    fn test_and_flattens_conjunctions() {
        let filter = PageFilter::base().and(PageFilter::DepthGreaterThan(1));

        let PageFilter::And(parts) = filter else {
            panic!("expected conjunction");
        };
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn test_or_with_nothing_is_identity() {
        assert_eq!(PageFilter::Nothing.or(PageFilter::Live), PageFilter::Live);
        assert_eq!(
            PageFilter::Nothing.or(PageFilter::Nothing),
            PageFilter::Nothing
        );
    }

    #[test]
    fn test_negate_round_trips() {
        assert_eq!(PageFilter::Live.negate().negate(), PageFilter::Live);
        assert_eq!(PageFilter::All.negate(), PageFilter::Nothing);
    }

    #[test]
    fn test_is_nothing() {
        assert!(PageFilter::Nothing.is_nothing());
        assert!(PageFilter::IdIn(BTreeSet::new()).is_nothing());
        assert!(PageFilter::base().and(PageFilter::Nothing).is_nothing());
        assert!(!PageFilter::base().is_nothing());
    }

    #[test]
    fn test_id_filters() {
        let page = make_page(7, "0001");
        let ids: BTreeSet<PageId> = [7].into_iter().collect();

        assert!(PageFilter::IdIn(ids.clone()).matches(&page));
        assert!(!PageFilter::IdNotIn(ids).matches(&page));
    }

    #[test]
    fn test_query_defaults_to_base_rows() {
        let query = PageQuery::new(PageFilter::All);
        assert!(!query.specific);
        assert!(query.specific(true).specific);
    }
}
