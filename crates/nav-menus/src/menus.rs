//! Entry point tying the page tree, menu store, settings and hooks together.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use nav_config::{MaxLevels, MenuSettings, UseSpecific};
use nav_tree::{Page, PageTree, Site, SiteId};

use crate::context::RenderContext;
use crate::decorate::{Decorator, RenderedMenu};
use crate::error::{MenuError, ValidationErrors};
use crate::hooks::Hooks;
use crate::menu::{Menu, MenuEnv, MenuKind, MenuSource};
use crate::options::{ModelOptions, OptionOverrides, ResolvedOptions};
use crate::schema::PageSchemaRegistry;
use crate::store::{FlatMenuRecord, MenuStore};
use crate::templates::{SubMenuTemplates, TemplateNames, sub_menu_template_for_level};

/// Builds and renders menus.
///
/// One instance is shared by every request. Each render builds a fresh
/// [`Menu`], so memoized results never outlive the request.
///
/// # Example
///
/// ```ignore
/// let menus = Menus::new(tree, store, MenuSettings::load(None, None)?);
/// let ctx = RenderContext::for_site(site).current_page(page);
/// let rendered = menus.render_main_menu(&ctx, &OptionOverrides::new())?;
/// let json = rendered.to_json(menus.page_schemas());
/// ```
pub struct Menus {
    tree: Arc<dyn PageTree>,
    store: Arc<dyn MenuStore>,
    settings: Arc<MenuSettings>,
    hooks: Arc<Hooks>,
    sub_menu_templates: HashMap<MenuKind, SubMenuTemplates>,
    page_schemas: PageSchemaRegistry,
}

impl std::fmt::Debug for Menus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menus")
            .field("settings", &self.settings)
            .field("hooks", &self.hooks)
            .field("sub_menu_templates", &self.sub_menu_templates)
            .finish_non_exhaustive()
    }
}

impl Menus {
    #[must_use]
    pub fn new(tree: Arc<dyn PageTree>, store: Arc<dyn MenuStore>, settings: MenuSettings) -> Self {
        Self {
            tree,
            store,
            settings: Arc::new(settings),
            hooks: Arc::new(Hooks::new()),
            sub_menu_templates: HashMap::new(),
            page_schemas: PageSchemaRegistry::new(),
        }
    }

    /// Replace the registered hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Sub menu templates used by every menu of `kind`.
    #[must_use]
    pub fn with_sub_menu_templates(mut self, kind: MenuKind, templates: SubMenuTemplates) -> Self {
        self.sub_menu_templates.insert(kind, templates);
        self
    }

    #[must_use]
    pub fn with_page_schemas(mut self, schemas: PageSchemaRegistry) -> Self {
        self.page_schemas = schemas;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    #[must_use]
    pub fn store(&self) -> &dyn MenuStore {
        self.store.as_ref()
    }

    /// Schemas for [`RenderedMenu::to_json`].
    #[must_use]
    pub fn page_schemas(&self) -> &PageSchemaRegistry {
        &self.page_schemas
    }

    fn env(&self) -> MenuEnv {
        MenuEnv {
            tree: Arc::clone(&self.tree),
            store: Arc::clone(&self.store),
            hooks: Arc::clone(&self.hooks),
            settings: Arc::clone(&self.settings),
        }
    }

    /// Main menu for `site_id`, created with default options if missing.
    pub fn main_menu(&self, site_id: SiteId) -> Result<Menu, MenuError> {
        let record = self.store.main_menu_for_site(site_id)?;
        let (max_levels, use_specific) = (record.max_levels, record.use_specific);
        Ok(Menu::new(MenuSource::Main(record), max_levels, use_specific, self.env()))
    }

    fn find_flat_menu(
        &self,
        site: &Site,
        handle: &str,
        fall_back: bool,
    ) -> Result<Option<FlatMenuRecord>, MenuError> {
        if let Some(record) = self.store.flat_menu(site.id, handle)? {
            return Ok(Some(record));
        }
        if fall_back && !site.is_default_site {
            tracing::debug!(site_id = site.id, handle, "Falling back to default site flat menu");
            return self.store.default_site_flat_menu(handle);
        }
        Ok(None)
    }

    /// Flat menu with `handle` on `site`.
    ///
    /// With `fall_back`, a non-default site without a matching menu uses the
    /// default site's. Returns `Ok(None)` when nothing matches.
    pub fn flat_menu(&self, site: &Site, handle: &str, fall_back: bool) -> Result<Option<Menu>, MenuError> {
        Ok(self.find_flat_menu(site, handle, fall_back)?.map(|record| {
            let (max_levels, use_specific) = (record.max_levels, record.use_specific);
            Menu::new(MenuSource::Flat(record), max_levels, use_specific, self.env())
        }))
    }

    /// Menu of the descendants of `root`.
    #[must_use]
    pub fn section_menu(&self, root: Page, max_levels: MaxLevels, use_specific: UseSpecific) -> Menu {
        Menu::new(MenuSource::Section(root), max_levels, use_specific, self.env())
    }

    /// Menu of the descendants of `parent`.
    #[must_use]
    pub fn children_menu(&self, parent: Page, max_levels: MaxLevels, use_specific: UseSpecific) -> Menu {
        Menu::new(MenuSource::Children(parent), max_levels, use_specific, self.env())
    }

    fn require_site(ctx: &RenderContext) -> Result<&Site, MenuError> {
        ctx.site.as_ref().ok_or_else(|| {
            MenuError::Validation(ValidationErrors::for_field(
                "site",
                "The current site is required to render this menu",
            ))
        })
    }

    fn resolve_options(
        &self,
        kind: MenuKind,
        overrides: &OptionOverrides,
        model: ModelOptions,
    ) -> Result<ResolvedOptions, MenuError> {
        let defaults = self.settings.defaults_for(kind.settings_kind());
        Ok(overrides.resolve(model, defaults)?)
    }

    /// Render the current site's main menu.
    pub fn render_main_menu(
        &self,
        ctx: &RenderContext,
        overrides: &OptionOverrides,
    ) -> Result<RenderedMenu, MenuError> {
        let site = Self::require_site(ctx)?;
        let menu = self.main_menu(site.id)?;
        let model = ModelOptions {
            max_levels: Some(menu.max_levels()),
            use_specific: Some(menu.use_specific()),
        };
        let options = self.resolve_options(MenuKind::Main, overrides, model)?;
        let mut rendered = self.render(menu, &options, ctx)?;
        rendered.site_id = Some(site.id);
        Ok(rendered)
    }

    /// Render the flat menu with `handle` for the current site.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::NotFound`] when no menu matches, after the
    /// default site fallback if enabled.
    pub fn render_flat_menu(
        &self,
        ctx: &RenderContext,
        handle: &str,
        overrides: &OptionOverrides,
    ) -> Result<RenderedMenu, MenuError> {
        let site = Self::require_site(ctx)?;
        let lookup = self.resolve_options(MenuKind::Flat, overrides, ModelOptions::default())?;
        let record = self
            .find_flat_menu(site, handle, lookup.fall_back_to_default_site_menus)?
            .ok_or_else(|| MenuError::NotFound {
                menu_class: MenuKind::Flat.class_name(),
                handle: handle.to_owned(),
                site_id: site.id,
            })?;

        let model = ModelOptions {
            max_levels: Some(record.max_levels),
            use_specific: Some(record.use_specific),
        };
        let options = self.resolve_options(MenuKind::Flat, overrides, model)?;
        let (site_id, title, heading) = (record.site_id, record.title.clone(), record.heading.clone());
        let menu = Menu::new(MenuSource::Flat(record), options.max_levels, options.use_specific, self.env());

        let mut rendered = self.render(menu, &options, ctx)?;
        rendered.site_id = Some(site_id);
        rendered.handle = Some(handle.to_owned());
        rendered.title = Some(title);
        rendered.heading = Some(heading).filter(|h| !h.is_empty());
        Ok(rendered)
    }

    /// Render the section menu for the current page.
    ///
    /// The section root comes from the context, else from the current
    /// page's ancestor at the section root depth.
    pub fn render_section_menu(
        &self,
        ctx: &RenderContext,
        overrides: &OptionOverrides,
    ) -> Result<RenderedMenu, MenuError> {
        let root = ctx.resolve_section_root(self.tree.as_ref(), self.settings.section_root_depth)?;
        let options = self.resolve_options(MenuKind::Section, overrides, ModelOptions::default())?;
        let menu = self.section_menu(root, options.max_levels, options.use_specific);
        self.render(menu, &options, ctx)
    }

    /// Render the children of `parent`, or of the current page.
    pub fn render_children_menu(
        &self,
        ctx: &RenderContext,
        parent: Option<&Page>,
        overrides: &OptionOverrides,
    ) -> Result<RenderedMenu, MenuError> {
        let parent = ctx.resolve_parent_page(parent)?;
        let options = self.resolve_options(MenuKind::Children, overrides, ModelOptions::default())?;
        let menu = self.children_menu(parent, options.max_levels, options.use_specific);
        self.render(menu, &options, ctx)
    }

    fn render(
        &self,
        mut menu: Menu,
        options: &ResolvedOptions,
        ctx: &RenderContext,
    ) -> Result<RenderedMenu, MenuError> {
        menu.set_max_levels(options.max_levels);
        menu.set_use_specific(options.use_specific);

        let ancestor_ids = if options.apply_active_classes {
            ctx.resolve_ancestor_ids(self.tree.as_ref(), self.settings.section_root_depth)?
        } else {
            BTreeSet::new()
        };
        let decorator = Decorator::new(options, ctx, ancestor_ids);
        let items = decorator.render(&mut menu)?;

        let kind = menu.kind();
        let (section_root, parent_page) = match menu.source() {
            MenuSource::Section(root) => (Some(decorator.render_section_root(&menu, root)), None),
            MenuSource::Children(parent) => (None, Some(parent.clone())),
            MenuSource::Main(_) | MenuSource::Flat(_) => (None, None),
        };
        let handle = match menu.source() {
            MenuSource::Flat(record) => Some(record.handle.as_str()),
            _ => None,
        };
        let (template_names, sub_menu_template_names) =
            self.template_names(kind, handle, options, ctx.site.as_ref());

        tracing::debug!(
            menu_type = kind.menu_type(),
            max_levels = %options.max_levels,
            use_specific = %options.use_specific,
            items = items.len(),
            "Rendered menu"
        );

        Ok(RenderedMenu {
            kind,
            site_id: ctx.site.as_ref().map(|site| site.id),
            handle: None,
            title: None,
            heading: None,
            section_root,
            parent_page,
            max_levels: options.max_levels,
            template_names,
            sub_menu_template_names,
            items,
        })
    }

    fn template_names(
        &self,
        kind: MenuKind,
        handle: Option<&str>,
        options: &ResolvedOptions,
        site: Option<&Site>,
    ) -> (Vec<String>, BTreeMap<u32, Vec<String>>) {
        let names = TemplateNames::new(&self.settings, site);
        let menu = match &options.template_name {
            Some(name) => vec![name.clone()],
            None => names.menu(kind, handle),
        };

        let no_templates = SubMenuTemplates::default();
        let class = self.sub_menu_templates.get(&kind).unwrap_or(&no_templates);
        let settings_levels = names.settings_sub_menus(kind);
        let sub_menus = (2..=options.max_levels.get())
            .map(|level| {
                let candidates = match sub_menu_template_for_level(level, options, class, settings_levels) {
                    Some(name) => vec![name],
                    None => names.sub_menu(kind, handle),
                };
                (level, candidates)
            })
            .collect();
        (menu, sub_menus)
    }
}
