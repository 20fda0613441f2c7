//! Extension points run while menus are resolved and rendered.
//!
//! Three hook kinds are supported:
//! - [`ModifyBasePageFilter`]: narrow or widen the page filter every query starts from
//! - [`ModifyMenuItemList`]: filter persisted items before top-level resolution
//! - [`ModifyRenderedItems`]: rewrite each rendered level
//!
//! Closures with the matching signature implement each trait, so most callers
//! register plain functions:
//!
//! ```ignore
//! let mut hooks = Hooks::new();
//! hooks.modify_base_page_filter(|filter, _ctx| {
//!     filter.and(PageFilter::IdNotIn([13].into()))
//! });
//! ```

use nav_config::{MaxLevels, UseSpecific};
use nav_tree::{Page, PageFilter};

use crate::decorate::RenderedItem;
use crate::item::MenuItem;

/// Menu state passed to resolution hooks.
#[derive(Clone, Copy, Debug)]
pub struct HookContext<'a> {
    /// Menu type (e.g. "`main_menu`").
    pub menu_type: &'static str,
    /// Current level count.
    pub max_levels: MaxLevels,
    /// Current specific page mode.
    pub use_specific: UseSpecific,
    /// Root page for section and children menus.
    pub root_page: Option<&'a Page>,
}

/// Menu state passed to [`ModifyRenderedItems`] hooks.
#[derive(Clone, Copy, Debug)]
pub struct RenderHookContext<'a> {
    /// Menu type (e.g. "`flat_menu`").
    pub menu_type: &'static str,
    /// Level being rendered, 1 for top-level items.
    pub current_level: u32,
    /// Level count of the menu.
    pub max_levels: MaxLevels,
    /// Page whose children make up this level, if any.
    pub parent_page: Option<&'a Page>,
}

/// Rewrites the base page filter.
pub trait ModifyBasePageFilter: Send + Sync {
    /// Return the filter to use in place of `filter`.
    fn modify(&self, filter: PageFilter, ctx: &HookContext<'_>) -> PageFilter;
}

impl<F> ModifyBasePageFilter for F
where
    F: Fn(PageFilter, &HookContext<'_>) -> PageFilter + Send + Sync,
{
    fn modify(&self, filter: PageFilter, ctx: &HookContext<'_>) -> PageFilter {
        self(filter, ctx)
    }
}

/// Rewrites the persisted item list of main and flat menus.
pub trait ModifyMenuItemList: Send + Sync {
    /// Return the items to resolve in place of `items`.
    fn modify(&self, items: Vec<MenuItem>, ctx: &HookContext<'_>) -> Vec<MenuItem>;
}

impl<F> ModifyMenuItemList for F
where
    F: Fn(Vec<MenuItem>, &HookContext<'_>) -> Vec<MenuItem> + Send + Sync,
{
    fn modify(&self, items: Vec<MenuItem>, ctx: &HookContext<'_>) -> Vec<MenuItem> {
        self(items, ctx)
    }
}

/// Rewrites one rendered level.
pub trait ModifyRenderedItems: Send + Sync {
    /// Return the items to render in place of `items`.
    fn modify(&self, items: Vec<RenderedItem>, ctx: &RenderHookContext<'_>) -> Vec<RenderedItem>;
}

impl<F> ModifyRenderedItems for F
where
    F: Fn(Vec<RenderedItem>, &RenderHookContext<'_>) -> Vec<RenderedItem> + Send + Sync,
{
    fn modify(&self, items: Vec<RenderedItem>, ctx: &RenderHookContext<'_>) -> Vec<RenderedItem> {
        self(items, ctx)
    }
}

/// Registered hooks, run in registration order.
#[derive(Default)]
pub struct Hooks {
    base_page_filter: Vec<Box<dyn ModifyBasePageFilter>>,
    menu_item_list: Vec<Box<dyn ModifyMenuItemList>>,
    rendered_items: Vec<Box<dyn ModifyRenderedItems>>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("base_page_filter", &self.base_page_filter.len())
            .field("menu_item_list", &self.menu_item_list.len())
            .field("rendered_items", &self.rendered_items.len())
            .finish()
    }
}

impl Hooks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure rewriting the base page filter.
    pub fn modify_base_page_filter<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(PageFilter, &HookContext<'_>) -> PageFilter + Send + Sync + 'static,
    {
        self.register_base_page_filter(hook)
    }

    /// Register a closure rewriting the persisted item list.
    pub fn modify_menu_item_list<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Vec<MenuItem>, &HookContext<'_>) -> Vec<MenuItem> + Send + Sync + 'static,
    {
        self.register_menu_item_list(hook)
    }

    /// Register a closure rewriting rendered levels.
    pub fn modify_rendered_items<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Vec<RenderedItem>, &RenderHookContext<'_>) -> Vec<RenderedItem> + Send + Sync + 'static,
    {
        self.register_rendered_items(hook)
    }

    /// Register a [`ModifyBasePageFilter`] implementation.
    pub fn register_base_page_filter(&mut self, hook: impl ModifyBasePageFilter + 'static) -> &mut Self {
        self.base_page_filter.push(Box::new(hook));
        self
    }

    /// Register a [`ModifyMenuItemList`] implementation.
    pub fn register_menu_item_list(&mut self, hook: impl ModifyMenuItemList + 'static) -> &mut Self {
        self.menu_item_list.push(Box::new(hook));
        self
    }

    /// Register a [`ModifyRenderedItems`] implementation.
    pub fn register_rendered_items(&mut self, hook: impl ModifyRenderedItems + 'static) -> &mut Self {
        self.rendered_items.push(Box::new(hook));
        self
    }

    pub(crate) fn apply_base_page_filter(&self, mut filter: PageFilter, ctx: &HookContext<'_>) -> PageFilter {
        for hook in &self.base_page_filter {
            filter = hook.modify(filter, ctx);
        }
        if filter.is_nothing() {
            tracing::warn!(menu_type = ctx.menu_type, "Base page filter can never match");
        }
        filter
    }

    pub(crate) fn apply_menu_item_list(&self, mut items: Vec<MenuItem>, ctx: &HookContext<'_>) -> Vec<MenuItem> {
        for hook in &self.menu_item_list {
            items = hook.modify(items, ctx);
        }
        items
    }

    pub(crate) fn apply_rendered_items(
        &self,
        mut items: Vec<RenderedItem>,
        ctx: &RenderHookContext<'_>,
    ) -> Vec<RenderedItem> {
        for hook in &self.rendered_items {
            items = hook.modify(items, ctx);
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::item::MenuItemDraft;

    fn make_ctx() -> HookContext<'static> {
        HookContext {
            menu_type: "main_menu",
            max_levels: MaxLevels::MIN,
            use_specific: UseSpecific::Auto,
            root_page: None,
        }
    }

    #[test]
    fn test_no_hooks_returns_filter_unchanged() {
        let hooks = Hooks::new();

        let filter = hooks.apply_base_page_filter(PageFilter::base(), &make_ctx());

        assert_eq!(filter, PageFilter::base());
    }

    #[test]
    fn test_base_page_filter_hooks_run_in_order() {
        let mut hooks = Hooks::new();
        hooks
            .modify_base_page_filter(|filter, _ctx| filter.and(PageFilter::IdNotIn(BTreeSet::from([1]))))
            .modify_base_page_filter(|filter, ctx| {
                assert_eq!(ctx.menu_type, "main_menu");
                filter.and(PageFilter::DepthLessThan(5))
            });

        let filter = hooks.apply_base_page_filter(PageFilter::All, &make_ctx());

        assert_eq!(
            filter,
            PageFilter::And(vec![
                PageFilter::IdNotIn(BTreeSet::from([1])),
                PageFilter::DepthLessThan(5),
            ])
        );
    }

    #[test]
    fn test_menu_item_list_hook_filters_items() {
        let mut hooks = Hooks::new();
        hooks.modify_menu_item_list(|items, _ctx| {
            items.into_iter().filter(|item| item.link_page_id().is_some()).collect()
        });
        let items = vec![
            MenuItemDraft::page(3).into_item(1, 0).unwrap(),
            MenuItemDraft::url("/x/", "X").into_item(2, 1).unwrap(),
        ];

        let items = hooks.apply_menu_item_list(items, &make_ctx());

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 1);
    }

    #[test]
    fn test_rendered_items_hook_appends() {
        let mut hooks = Hooks::new();
        hooks.modify_rendered_items(|mut items, ctx| {
            if ctx.current_level == 1 {
                items.push(RenderedItem::custom("Search", "/search/"));
            }
            items
        });
        let ctx = RenderHookContext {
            menu_type: "main_menu",
            current_level: 1,
            max_levels: MaxLevels::MIN,
            parent_page: None,
        };

        let items = hooks.apply_rendered_items(Vec::new(), &ctx);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].href, "/search/");
    }

    #[test]
    fn test_hooks_are_send_sync() {
        static_assertions::assert_impl_all!(Hooks: Send, Sync);
    }
}
