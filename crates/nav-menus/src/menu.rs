//! Menu resolution.
//!
//! A [`Menu`] turns persisted menu items (main and flat menus) or a root page
//! (section and children menus) into the pages needed to render every level.
//! Results are memoized per instance, see [`crate::cache`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use nav_config::{MaxLevels, MenuKindSettings, MenuSettings, UseSpecific};
use nav_tree::{Page, PageFilter, PageId, PageQuery, PageTree};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheState, Invalidation, MenuCache};
use crate::children_index::PageChildrenIndex;
use crate::error::MenuError;
use crate::hooks::{HookContext, Hooks};
use crate::item::{MenuItem, MenuItemDraft};
use crate::store::{FlatMenuRecord, MainMenuRecord, MenuKey, MenuStore};

/// The four menu variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    /// Site-wide main menu.
    Main,
    /// Flat menu referenced by handle.
    Flat,
    /// Descendants of the current section root.
    Section,
    /// Children of a page.
    Children,
}

impl MenuKind {
    /// Type name passed to hooks (e.g. "`main_menu`").
    #[must_use]
    pub fn menu_type(self) -> &'static str {
        match self {
            Self::Main => "main_menu",
            Self::Flat => "flat_menu",
            Self::Section => "section_menu",
            Self::Children => "children_menu",
        }
    }

    /// Short name used in template paths (e.g. "main").
    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Flat => "flat",
            Self::Section => "section",
            Self::Children => "children",
        }
    }

    /// Name used in error messages (e.g. "`MainMenu`").
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Main => "MainMenu",
            Self::Flat => "FlatMenu",
            Self::Section => "SectionMenu",
            Self::Children => "ChildrenMenu",
        }
    }

    /// Settings table holding this kind's defaults.
    #[must_use]
    pub fn settings_kind(self) -> MenuKindSettings {
        match self {
            Self::Main => MenuKindSettings::Main,
            Self::Flat => MenuKindSettings::Flat,
            Self::Section => MenuKindSettings::Section,
            Self::Children => MenuKindSettings::Children,
        }
    }

    /// Setting naming the item relation, with its configured value.
    fn item_relation(self, settings: &MenuSettings) -> Option<(&'static str, &str)> {
        match self {
            Self::Main => Some(("main_menu_items_relation", &settings.main_menu_items_relation)),
            Self::Flat => Some(("flat_menu_items_relation", &settings.flat_menu_items_relation)),
            Self::Section | Self::Children => None,
        }
    }
}

/// Where a menu's top level comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuSource {
    /// Persisted main menu.
    Main(MainMenuRecord),
    /// Persisted flat menu.
    Flat(FlatMenuRecord),
    /// Section menu rooted at a section root page.
    Section(Page),
    /// Children menu rooted at a parent page.
    Children(Page),
}

impl MenuSource {
    /// Menu variant.
    #[must_use]
    pub fn kind(&self) -> MenuKind {
        match self {
            Self::Main(_) => MenuKind::Main,
            Self::Flat(_) => MenuKind::Flat,
            Self::Section(_) => MenuKind::Section,
            Self::Children(_) => MenuKind::Children,
        }
    }

    /// Root page of section and children menus.
    #[must_use]
    pub fn root_page(&self) -> Option<&Page> {
        match self {
            Self::Section(page) | Self::Children(page) => Some(page),
            Self::Main(_) | Self::Flat(_) => None,
        }
    }

    fn items_key(&self) -> Option<MenuKey> {
        match self {
            Self::Main(record) => Some(record.key()),
            Self::Flat(record) => Some(record.key()),
            Self::Section(_) | Self::Children(_) => None,
        }
    }
}

/// A persisted item with its linked page, if it links to one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopLevelItem {
    /// The persisted item.
    pub item: MenuItem,
    /// Linked page as fetched through the base page filter.
    pub page: Option<Page>,
}

/// Shared collaborators of every menu built by one [`Menus`](crate::Menus).
pub(crate) struct MenuEnv {
    pub(crate) tree: Arc<dyn PageTree>,
    pub(crate) store: Arc<dyn MenuStore>,
    pub(crate) hooks: Arc<Hooks>,
    pub(crate) settings: Arc<MenuSettings>,
}

impl Clone for MenuEnv {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            store: Arc::clone(&self.store),
            hooks: Arc::clone(&self.hooks),
            settings: Arc::clone(&self.settings),
        }
    }
}

/// A menu being resolved for one request.
///
/// Methods take `&mut self` because results are memoized. Each collection
/// is fetched at most once until an option change makes it stale.
pub struct Menu {
    source: MenuSource,
    max_levels: MaxLevels,
    use_specific: UseSpecific,
    env: MenuEnv,
    cache: MenuCache,
}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("source", &self.source)
            .field("max_levels", &self.max_levels)
            .field("use_specific", &self.use_specific)
            .field("cache", &self.cache.state())
            .finish_non_exhaustive()
    }
}

impl Menu {
    pub(crate) fn new(
        source: MenuSource,
        max_levels: MaxLevels,
        use_specific: UseSpecific,
        env: MenuEnv,
    ) -> Self {
        Self {
            source,
            max_levels,
            use_specific,
            env,
            cache: MenuCache::default(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> MenuKind {
        self.source.kind()
    }

    #[must_use]
    pub fn menu_type(&self) -> &'static str {
        self.kind().menu_type()
    }

    #[must_use]
    pub fn source(&self) -> &MenuSource {
        &self.source
    }

    #[must_use]
    pub fn max_levels(&self) -> MaxLevels {
        self.max_levels
    }

    #[must_use]
    pub fn use_specific(&self) -> UseSpecific {
        self.use_specific
    }

    #[must_use]
    pub fn root_page(&self) -> Option<&Page> {
        self.source.root_page()
    }

    #[must_use]
    pub fn cache_state(&self) -> CacheState {
        self.cache.state()
    }

    pub(crate) fn tree(&self) -> &dyn PageTree {
        self.env.tree.as_ref()
    }

    pub(crate) fn hooks(&self) -> &Hooks {
        &self.env.hooks
    }

    pub(crate) fn settings(&self) -> &MenuSettings {
        &self.env.settings
    }

    fn hook_context(&self) -> HookContext<'_> {
        HookContext {
            menu_type: self.menu_type(),
            max_levels: self.max_levels,
            use_specific: self.use_specific,
            root_page: self.root_page(),
        }
    }

    /// Filter every page query starts from: live, not expired, shown in
    /// menus, then rewritten by registered hooks.
    #[must_use]
    pub fn base_page_filter(&self) -> PageFilter {
        self.env
            .hooks
            .apply_base_page_filter(PageFilter::base(), &self.hook_context())
    }

    fn items_key(&self) -> Result<MenuKey, MenuError> {
        let kind = self.kind();
        let key = self.source.items_key().ok_or(MenuError::NoMenuItems {
            menu_type: kind.menu_type(),
        })?;
        if let Some((setting, relation)) = kind.item_relation(&self.env.settings)
            && !self.env.store.has_item_relation(kind, relation)
        {
            return Err(MenuError::ImproperlyConfigured {
                setting,
                value: relation.to_owned(),
                menu_class: kind.class_name(),
            });
        }
        Ok(key)
    }

    fn run_query(&self, filter: PageFilter, specific: bool) -> Result<Vec<Page>, MenuError> {
        if filter.is_nothing() {
            tracing::debug!(menu_type = self.menu_type(), "Skipping query for empty filter");
            return Ok(Vec::new());
        }
        Ok(self.env.tree.query(&PageQuery::new(filter).specific(specific))?)
    }

    /// Persisted items in display order with their linked pages attached.
    ///
    /// Items linking to a page the base page filter excludes are dropped.
    /// Section and children menus have no persisted items and return an
    /// empty list.
    pub fn top_level_items(&mut self) -> Result<Arc<Vec<TopLevelItem>>, MenuError> {
        if let Some(items) = self.cache.top_level() {
            tracing::debug!(menu_type = self.menu_type(), "Top-level items cache hit");
            return Ok(items);
        }
        if self.root_page().is_some() {
            return Ok(self.cache.store_top_level(Vec::new(), true));
        }

        let key = self.items_key()?;
        let specific = self.use_specific.requires_specific_top_level();
        let items = self.env.store.menu_items(&key)?;
        let items = self
            .env
            .hooks
            .apply_menu_item_list(items, &self.hook_context());

        let ids: BTreeSet<PageId> = items.iter().filter_map(MenuItem::link_page_id).collect();
        let pages: HashMap<PageId, Page> = if ids.is_empty() {
            HashMap::new()
        } else {
            let filter = self.base_page_filter().and(PageFilter::IdIn(ids));
            self.run_query(filter, specific)?
                .into_iter()
                .map(|page| (page.id, page))
                .collect()
        };

        let total = items.len();
        let resolved: Vec<TopLevelItem> = items
            .into_iter()
            .filter_map(|item| match item.link_page_id() {
                None => Some(TopLevelItem { item, page: None }),
                Some(id) => pages.get(&id).map(|page| TopLevelItem {
                    page: Some(page.clone()),
                    item,
                }),
            })
            .collect();

        tracing::debug!(
            menu_type = self.menu_type(),
            items = resolved.len(),
            dropped = total - resolved.len(),
            specific,
            "Resolved top-level items"
        );
        Ok(self.cache.store_top_level(resolved, specific))
    }

    /// Filter selecting every page below the top level.
    fn sub_menu_filter(&mut self) -> Result<PageFilter, MenuError> {
        let levels = self.max_levels.get();
        if let Some(root) = self.root_page() {
            return Ok(PageFilter::branch(&root.path, root.depth, root.depth + levels));
        }
        if self.max_levels.is_single_level() {
            return Ok(PageFilter::Nothing);
        }

        let section_root_depth = self.env.settings.section_root_depth;
        let top_level = self.top_level_items()?;
        Ok(top_level
            .iter()
            .filter(|top| top.item.allow_subnav)
            .filter_map(|top| top.page.as_ref())
            .filter(|page| page.depth >= section_root_depth)
            .fold(PageFilter::Nothing, |union, page| {
                union.or(PageFilter::branch(&page.path, page.depth, page.depth + levels - 1))
            }))
    }

    /// Every page needed to render levels below the top, in tree order.
    ///
    /// For section and children menus this includes the root's children.
    pub fn pages_for_display(&mut self) -> Result<Arc<Vec<Page>>, MenuError> {
        if let Some(pages) = self.cache.pages() {
            tracing::debug!(menu_type = self.menu_type(), "Pages cache hit");
            return Ok(pages);
        }

        let specific = self.use_specific.requires_specific_pages();
        // The union is intersected with the base filter so hook exclusions
        // apply to every branch.
        let filter = self.sub_menu_filter()?.and(self.base_page_filter());
        let pages = self.run_query(filter, specific)?;

        tracing::debug!(
            menu_type = self.menu_type(),
            max_levels = %self.max_levels,
            count = pages.len(),
            specific,
            "Resolved pages for display"
        );
        Ok(self.cache.store_pages(pages, specific))
    }

    /// Children of every page in [`Menu::pages_for_display`].
    pub fn page_children_dict(&mut self) -> Result<Arc<PageChildrenIndex>, MenuError> {
        if let Some(index) = self.cache.index() {
            return Ok(index);
        }
        let pages = self.pages_for_display()?;
        let index = PageChildrenIndex::build(&pages);
        tracing::debug!(menu_type = self.menu_type(), parents = index.len(), "Built children index");
        Ok(self.cache.store_index(index))
    }

    /// Children of `page` to render in its sub menu.
    ///
    /// Single-level section and children menus return every page for
    /// display without consulting the index.
    pub fn get_children_for_page(&mut self, page: &Page) -> Result<Vec<Page>, MenuError> {
        if self.root_page().is_some() && self.max_levels.is_single_level() {
            return Ok(self.pages_for_display()?.as_ref().clone());
        }
        Ok(self.page_children_dict()?.children(&page.path).to_vec())
    }

    /// True if `page` has children to render.
    pub fn page_has_children(&mut self, page: &Page) -> Result<bool, MenuError> {
        Ok(self.page_children_dict()?.has_children(&page.path))
    }

    /// Change the level count, dropping cached pages if it differs.
    pub fn set_max_levels(&mut self, max_levels: MaxLevels) -> Invalidation {
        if self.max_levels == max_levels {
            return Invalidation::default();
        }
        self.max_levels = max_levels;
        self.cache.on_max_levels_changed()
    }

    /// Change the specific page mode.
    ///
    /// Cached collections are dropped only when `use_specific` asks for
    /// more specific rows than they hold.
    pub fn set_use_specific(&mut self, use_specific: UseSpecific) -> Invalidation {
        if self.use_specific == use_specific {
            return Invalidation::default();
        }
        let invalidation = self.cache.on_use_specific_changed(use_specific);
        self.use_specific = use_specific;
        invalidation
    }

    /// Append one item per page, in order, after the existing items.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::NoMenuItems`] for section and children menus.
    pub fn add_menu_items_for_pages(
        &mut self,
        pages: &[Page],
        allow_subnav: bool,
    ) -> Result<Vec<MenuItem>, MenuError> {
        let key = self.items_key()?;
        let start = self.env.store.item_count(&key)?;
        let drafts = pages
            .iter()
            .enumerate()
            .map(|(offset, page)| MenuItemDraft {
                sort_order: Some(u32::try_from(start + offset).unwrap_or(u32::MAX)),
                ..MenuItemDraft::page(page.id).allow_subnav(allow_subnav)
            })
            .collect();
        let created = self.env.store.bulk_create_items(&key, drafts)?;
        self.cache.clear();
        Ok(created)
    }
}
