//! Rendering resolved menus into decorated item trees.
//!
//! Menu items, pages and hook-supplied entries are all rendered as
//! [`RenderedItem`], whose [`ItemSource`] records what the entry was built
//! from.

use std::collections::{BTreeMap, BTreeSet};

use nav_config::{MaxLevels, UseSpecific};
use nav_tree::{Page, PageId, SiteId};
use serde_json::{Map, Value, json};

use crate::context::RenderContext;
use crate::error::MenuError;
use crate::hooks::RenderHookContext;
use crate::item::MenuItem;
use crate::menu::{Menu, MenuKind, TopLevelItem};
use crate::options::ResolvedOptions;
use crate::schema::PageSchemaRegistry;

/// What a rendered entry was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemSource {
    /// A persisted menu item and its linked page.
    MenuItem {
        /// The persisted item.
        item: MenuItem,
        /// Linked page, `None` for custom URLs.
        page: Option<Page>,
    },
    /// A page from the tree.
    Page(Page),
    /// An entry added by a hook.
    Custom,
}

impl ItemSource {
    /// Page the entry links to, if any.
    #[must_use]
    pub fn linked_page(&self) -> Option<&Page> {
        match self {
            Self::MenuItem { page, .. } => page.as_ref(),
            Self::Page(page) => Some(page),
            Self::Custom => None,
        }
    }
}

/// A menu entry ready for a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedItem {
    /// Link text.
    pub text: String,
    /// Link target.
    pub href: String,
    /// CSS class, empty when inactive.
    pub active_class: String,
    /// A sub menu is rendered below this entry.
    pub has_children_in_menu: bool,
    /// Entry is a copy of its parent page at the top of a sub menu.
    pub is_repeated_item: bool,
    /// What the entry was built from.
    pub source: ItemSource,
    /// Sub menu entries.
    pub children: Vec<RenderedItem>,
}

impl RenderedItem {
    /// An entry not backed by a page or menu item.
    #[must_use]
    pub fn custom(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
            active_class: String::new(),
            has_children_in_menu: false,
            is_repeated_item: false,
            source: ItemSource::Custom,
            children: Vec::new(),
        }
    }

    /// Page the entry links to, if any.
    #[must_use]
    pub fn linked_page(&self) -> Option<&Page> {
        self.source.linked_page()
    }

    /// Handle of the persisted item, if the entry is one.
    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        match &self.source {
            ItemSource::MenuItem { item, .. } if !item.handle.is_empty() => Some(&item.handle),
            _ => None,
        }
    }

    fn to_json(&self, schemas: &PageSchemaRegistry) -> Value {
        let mut obj = Map::new();
        obj.insert("text".to_owned(), json!(self.text));
        obj.insert("href".to_owned(), json!(self.href));
        obj.insert("active_class".to_owned(), json!(self.active_class));
        if let Some(handle) = self.handle() {
            obj.insert("handle".to_owned(), json!(handle));
        }
        if self.is_repeated_item {
            obj.insert("is_repeated_item".to_owned(), Value::Bool(true));
        }
        let page = self
            .linked_page()
            .map_or(Value::Null, |page| schemas.schema_for(&page.content_type).render(page));
        obj.insert("page".to_owned(), page);
        obj.insert(
            "children".to_owned(),
            Value::Array(self.children.iter().map(|c| c.to_json(schemas)).collect()),
        );
        Value::Object(obj)
    }
}

/// A fully rendered menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMenu {
    /// Menu variant.
    pub kind: MenuKind,
    /// Site the menu belongs to, for main and flat menus.
    pub site_id: Option<SiteId>,
    /// Flat menu handle.
    pub handle: Option<String>,
    /// Flat menu title.
    pub title: Option<String>,
    /// Flat menu heading.
    pub heading: Option<String>,
    /// Section menu root, decorated like an item.
    pub section_root: Option<RenderedItem>,
    /// Children menu parent.
    pub parent_page: Option<Page>,
    /// Levels rendered.
    pub max_levels: MaxLevels,
    /// Candidate templates for the menu, most specific first.
    pub template_names: Vec<String>,
    /// Candidate templates for each sub menu level.
    pub sub_menu_template_names: BTreeMap<u32, Vec<String>>,
    /// Top-level entries.
    pub items: Vec<RenderedItem>,
}

impl RenderedMenu {
    /// Menu type name (e.g. "`section_menu`").
    #[must_use]
    pub fn menu_type(&self) -> &'static str {
        self.kind.menu_type()
    }

    /// JSON representation with pages rendered through `schemas`.
    #[must_use]
    pub fn to_json(&self, schemas: &PageSchemaRegistry) -> Value {
        let mut obj = Map::new();
        obj.insert("menu_type".to_owned(), json!(self.menu_type()));
        if let Some(site_id) = self.site_id {
            obj.insert("site".to_owned(), json!(site_id));
        }
        for (key, value) in [
            ("handle", &self.handle),
            ("title", &self.title),
            ("heading", &self.heading),
        ] {
            if let Some(value) = value {
                obj.insert(key.to_owned(), json!(value));
            }
        }
        if let Some(root) = &self.section_root {
            obj.insert("section_root".to_owned(), root.to_json(schemas));
        }
        if let Some(parent) = &self.parent_page {
            obj.insert(
                "parent_page".to_owned(),
                schemas.schema_for(&parent.content_type).render(parent),
            );
        }
        obj.insert(
            "items".to_owned(),
            Value::Array(self.items.iter().map(|i| i.to_json(schemas)).collect()),
        );
        Value::Object(obj)
    }
}

enum Entry {
    Item(TopLevelItem),
    Page(Page),
}

/// Walks a resolved menu, attaching hrefs, active classes and sub menus.
pub(crate) struct Decorator<'a> {
    options: &'a ResolvedOptions,
    context: &'a RenderContext,
    ancestor_ids: BTreeSet<PageId>,
}

impl<'a> Decorator<'a> {
    pub(crate) fn new(
        options: &'a ResolvedOptions,
        context: &'a RenderContext,
        ancestor_ids: BTreeSet<PageId>,
    ) -> Self {
        Self {
            options,
            context,
            ancestor_ids,
        }
    }

    /// Render level one and everything below it.
    pub(crate) fn render(&self, menu: &mut Menu) -> Result<Vec<RenderedItem>, MenuError> {
        let (entries, parent): (Vec<Entry>, Option<Page>) = match menu.root_page().cloned() {
            Some(root) => {
                let pages = menu.get_children_for_page(&root)?;
                (pages.into_iter().map(Entry::Page).collect(), Some(root))
            }
            None => {
                let items = menu.top_level_items()?;
                (items.iter().cloned().map(Entry::Item).collect(), None)
            }
        };
        self.render_level(menu, entries, 1, parent.as_ref(), None)
    }

    /// Decorate a section root page.
    pub(crate) fn render_section_root(&self, menu: &Menu, root: &Page) -> RenderedItem {
        let mut item = RenderedItem::custom(root.title.clone(), self.page_href(root));
        item.active_class = self.page_active_class(menu, root).to_owned();
        item.source = ItemSource::Page(root.clone());
        item
    }

    fn render_level(
        &self,
        menu: &mut Menu,
        entries: Vec<Entry>,
        level: u32,
        parent: Option<&Page>,
        repeated: Option<RenderedItem>,
    ) -> Result<Vec<RenderedItem>, MenuError> {
        let mut items = Vec::with_capacity(entries.len() + 1);
        for entry in entries {
            items.push(self.render_entry(menu, entry, level)?);
        }
        if let Some(repeated) = repeated
            && !items.is_empty()
        {
            items.insert(0, repeated);
        }

        let ctx = RenderHookContext {
            menu_type: menu.menu_type(),
            current_level: level,
            max_levels: menu.max_levels(),
            parent_page: parent,
        };
        Ok(menu.hooks().apply_rendered_items(items, &ctx))
    }

    fn render_entry(&self, menu: &mut Menu, entry: Entry, level: u32) -> Result<RenderedItem, MenuError> {
        let (text, href, allow_subnav, source) = match entry {
            Entry::Item(TopLevelItem { item, page }) => {
                let text = item.menu_text(page.as_ref()).to_owned();
                let base = match (&page, item.link_url()) {
                    (Some(page), _) => self.page_href(page),
                    (None, url) => url.unwrap_or_default().to_owned(),
                };
                let href = format!("{base}{}", item.url_append);
                let allow_subnav = item.allow_subnav;
                (text, href, allow_subnav, ItemSource::MenuItem { item, page })
            }
            Entry::Page(page) => {
                let href = self.page_href(&page);
                (page.title.clone(), href, true, ItemSource::Page(page))
            }
        };

        let mut rendered = RenderedItem {
            text,
            href,
            active_class: String::new(),
            has_children_in_menu: false,
            is_repeated_item: false,
            source,
            children: Vec::new(),
        };

        let Some(page) = rendered.linked_page().cloned() else {
            if self.is_current_url(&rendered.source) {
                rendered.active_class.clone_from(&menu.settings().active_class);
            }
            return Ok(rendered);
        };
        rendered.active_class = self.page_active_class(menu, &page).to_owned();

        let expand = allow_subnav && level < menu.max_levels().get() && menu.page_has_children(&page)?;
        if !expand {
            return Ok(rendered);
        }
        rendered.has_children_in_menu = true;

        let page = self.resolve_for_sub_menu(menu, page)?;
        let repeated = (self.options.allow_repeating_parents && page.repeat_in_subnav())
            .then(|| self.repeated_item(menu, &page));
        let children = menu
            .get_children_for_page(&page)?
            .into_iter()
            .map(Entry::Page)
            .collect();
        rendered.children = self.render_level(menu, children, level + 1, Some(&page), repeated)?;

        if rendered.children.iter().any(|c| c.is_repeated_item) && self.is_active(&page) {
            rendered
                .active_class
                .clone_from(&menu.settings().active_ancestor_class);
        }
        match &mut rendered.source {
            ItemSource::MenuItem { page: Some(linked), .. } => *linked = page,
            ItemSource::Page(linked) => *linked = page,
            _ => {}
        }
        Ok(rendered)
    }

    /// Under AUTO, fetch the specific page so its sub menu settings are known.
    fn resolve_for_sub_menu(&self, menu: &Menu, page: Page) -> Result<Page, MenuError> {
        if page.is_specific() || menu.use_specific() != UseSpecific::Auto {
            return Ok(page);
        }
        Ok(menu.tree().specific(&page)?)
    }

    fn repeated_item(&self, menu: &Menu, page: &Page) -> RenderedItem {
        let mut item = RenderedItem::custom(page.repeated_item_text(), self.page_href(page));
        if self.is_active(page) {
            item.active_class.clone_from(&menu.settings().active_class);
        }
        item.is_repeated_item = true;
        item.source = ItemSource::Page(page.clone());
        item
    }

    fn page_href(&self, page: &Page) -> String {
        match &self.context.site {
            Some(site) if self.options.use_absolute_page_urls => {
                format!("{}{}", site.root_url(), page.url_path)
            }
            _ => page.url_path.clone(),
        }
    }

    fn is_active(&self, page: &Page) -> bool {
        self.options.apply_active_classes && self.context.is_current(page)
    }

    fn is_current_url(&self, source: &ItemSource) -> bool {
        let ItemSource::MenuItem { item, .. } = source else {
            return false;
        };
        self.options.apply_active_classes
            && item.link_url().is_some()
            && item.link_url() == self.context.current_path.as_deref()
    }

    fn page_active_class<'m>(&self, menu: &'m Menu, page: &Page) -> &'m str {
        if !self.options.apply_active_classes {
            return "";
        }
        let settings = menu.settings();
        if self.context.is_current(page) {
            &settings.active_class
        } else if page.depth >= settings.section_root_depth && self.ancestor_ids.contains(&page.id) {
            &settings.active_ancestor_class
        } else {
            ""
        }
    }
}
