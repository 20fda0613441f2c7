//! Per-menu memoization of resolved collections.
//!
//! A [`Menu`](crate::Menu) resolves its top-level items, the pages needed for
//! sub menus, and the children index at most once. Changing options
//! invalidates only what the new options make stale, and only when they ask
//! for more specific pages than what is cached.

use std::sync::Arc;

use nav_config::UseSpecific;
use nav_tree::Page;

use crate::children_index::PageChildrenIndex;
use crate::menu::TopLevelItem;

/// How far resolution has progressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing resolved yet.
    Uninitialized,
    /// Top-level items resolved.
    TopLevelResolved,
    /// Pages for display resolved.
    PagesResolved,
}

/// A cached collection and whether it holds specific pages.
#[derive(Debug)]
pub(crate) struct Cached<T> {
    pub(crate) value: Arc<T>,
    pub(crate) specific: bool,
}

impl<T> Cached<T> {
    pub(crate) fn new(value: T, specific: bool) -> Self {
        Self {
            value: Arc::new(value),
            specific,
        }
    }
}

/// What an option change dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Invalidation {
    /// Top-level items were dropped.
    pub top_level: bool,
    /// Pages for display and the children index were dropped.
    pub pages: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MenuCache {
    top_level: Option<Cached<Vec<TopLevelItem>>>,
    pages: Option<Cached<Vec<Page>>>,
    index: Option<Arc<PageChildrenIndex>>,
}

impl MenuCache {
    pub(crate) fn state(&self) -> CacheState {
        if self.pages.is_some() {
            CacheState::PagesResolved
        } else if self.top_level.is_some() {
            CacheState::TopLevelResolved
        } else {
            CacheState::Uninitialized
        }
    }

    pub(crate) fn top_level(&self) -> Option<Arc<Vec<TopLevelItem>>> {
        self.top_level.as_ref().map(|c| Arc::clone(&c.value))
    }

    pub(crate) fn store_top_level(&mut self, items: Vec<TopLevelItem>, specific: bool) -> Arc<Vec<TopLevelItem>> {
        let cached = Cached::new(items, specific);
        let value = Arc::clone(&cached.value);
        self.top_level = Some(cached);
        value
    }

    pub(crate) fn pages(&self) -> Option<Arc<Vec<Page>>> {
        self.pages.as_ref().map(|c| Arc::clone(&c.value))
    }

    pub(crate) fn store_pages(&mut self, pages: Vec<Page>, specific: bool) -> Arc<Vec<Page>> {
        let cached = Cached::new(pages, specific);
        let value = Arc::clone(&cached.value);
        self.pages = Some(cached);
        value
    }

    pub(crate) fn index(&self) -> Option<Arc<PageChildrenIndex>> {
        self.index.as_ref().map(Arc::clone)
    }

    pub(crate) fn store_index(&mut self, index: PageChildrenIndex) -> Arc<PageChildrenIndex> {
        let index = Arc::new(index);
        self.index = Some(Arc::clone(&index));
        index
    }

    /// Drop everything, e.g. after the persisted item list changed.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    fn clear_pages(&mut self) -> bool {
        let had = self.pages.is_some() || self.index.is_some();
        self.pages = None;
        self.index = None;
        had
    }

    /// Pages depend on depth, top-level items do not.
    pub(crate) fn on_max_levels_changed(&mut self) -> Invalidation {
        let invalidation = Invalidation {
            top_level: false,
            pages: self.clear_pages(),
        };
        tracing::debug!(pages = invalidation.pages, "Max levels changed");
        invalidation
    }

    /// Drop collections that are less specific than `new` requires.
    ///
    /// Lowering the mode never drops anything: specific rows satisfy any
    /// lower mode.
    pub(crate) fn on_use_specific_changed(&mut self, new: UseSpecific) -> Invalidation {
        let mut invalidation = Invalidation::default();

        let stale_top_level = self.top_level.as_ref().is_some_and(|c| !c.specific);
        if new.requires_specific_top_level() && stale_top_level {
            self.top_level = None;
            invalidation.top_level = true;
            // Sub menu pages are derived from the top-level items
            invalidation.pages = self.clear_pages();
        }

        let stale_pages = self.pages.as_ref().is_some_and(|c| !c.specific);
        if new.requires_specific_pages() && stale_pages {
            invalidation.pages = self.clear_pages();
        }

        tracing::debug!(
            use_specific = %new,
            top_level = invalidation.top_level,
            pages = invalidation.pages,
            "Specific page mode changed"
        );
        invalidation
    }
}
