//! Persisted menus and their items.
//!
//! Provides the [`MenuStore`] trait for reading and writing main menus,
//! flat menus and menu items, along with [`InMemoryMenuStore`].

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use nav_config::{MaxLevels, MenuSettings, UseSpecific};
use nav_tree::{Site, SiteId};
use serde::{Deserialize, Serialize};

use crate::error::{MenuError, ValidationErrors};
use crate::item::{MenuItem, MenuItemDraft, MenuItemId};
use crate::menu::MenuKind;

/// Identifies the persisted menu owning a list of items.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MenuKey {
    /// The main menu of a site.
    Main(SiteId),
    /// A flat menu, unique per site and handle.
    Flat {
        /// Owning site.
        site_id: SiteId,
        /// Menu handle.
        handle: String,
    },
}

/// Persisted main menu settings. One per site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainMenuRecord {
    /// Owning site.
    pub site_id: SiteId,
    /// Levels to display.
    pub max_levels: MaxLevels,
    /// Specific page resolution mode.
    pub use_specific: UseSpecific,
}

impl MainMenuRecord {
    /// Key of the item list.
    #[must_use]
    pub fn key(&self) -> MenuKey {
        MenuKey::Main(self.site_id)
    }
}

/// Persisted flat menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatMenuRecord {
    /// Owning site.
    pub site_id: SiteId,
    /// Handle used to reference the menu.
    pub handle: String,
    /// Internal title.
    pub title: String,
    /// Optional heading displayed above the menu.
    pub heading: String,
    /// Levels to display.
    pub max_levels: MaxLevels,
    /// Specific page resolution mode.
    pub use_specific: UseSpecific,
}

impl FlatMenuRecord {
    /// Key of the item list.
    #[must_use]
    pub fn key(&self) -> MenuKey {
        MenuKey::Flat {
            site_id: self.site_id,
            handle: self.handle.clone(),
        }
    }
}

/// Values for creating a flat menu. Unset options take the settings defaults.
#[derive(Clone, Debug, Default)]
pub struct NewFlatMenu {
    /// Owning site.
    pub site_id: SiteId,
    /// Handle used to reference the menu.
    pub handle: String,
    /// Internal title.
    pub title: String,
    /// Optional heading.
    pub heading: String,
    /// Levels to display.
    pub max_levels: Option<MaxLevels>,
    /// Specific page resolution mode.
    pub use_specific: Option<UseSpecific>,
}

/// Storage for persisted menus.
///
/// Implementations may block. All methods are read-only except the
/// `create_*` methods, which must be all-or-nothing.
pub trait MenuStore: Send + Sync {
    /// Main menu for a site, created with default options if missing.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError`] if the backend fails.
    fn main_menu_for_site(&self, site_id: SiteId) -> Result<MainMenuRecord, MenuError>;

    /// Flat menu with the given handle on a site.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError`] if the backend fails. A missing menu is
    /// `Ok(None)`.
    fn flat_menu(&self, site_id: SiteId, handle: &str) -> Result<Option<FlatMenuRecord>, MenuError>;

    /// Flat menu with the given handle on the default site.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError`] if the backend fails.
    fn default_site_flat_menu(&self, handle: &str) -> Result<Option<FlatMenuRecord>, MenuError>;

    /// Create a flat menu.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Validation`] with errors on `site` and `handle`
    /// if the combination already exists.
    fn create_flat_menu(&self, menu: NewFlatMenu) -> Result<FlatMenuRecord, MenuError>;

    /// True if `name` is a relation holding items for menus of `kind`.
    fn has_item_relation(&self, kind: MenuKind, name: &str) -> bool;

    /// Items of a menu ordered by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError`] if the backend fails.
    fn menu_items(&self, key: &MenuKey) -> Result<Vec<MenuItem>, MenuError>;

    /// Number of items in a menu.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError`] if the backend fails.
    fn item_count(&self, key: &MenuKey) -> Result<usize, MenuError>;

    /// Insert items in one batch. Either every item is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Validation`] if any draft is invalid.
    fn bulk_create_items(
        &self,
        key: &MenuKey,
        drafts: Vec<MenuItemDraft>,
    ) -> Result<Vec<MenuItem>, MenuError>;
}

#[derive(Debug, Default)]
struct StoreState {
    sites: Vec<Site>,
    main_menus: HashMap<SiteId, MainMenuRecord>,
    flat_menus: Vec<FlatMenuRecord>,
    items: HashMap<MenuKey, Vec<MenuItem>>,
    next_item_id: MenuItemId,
}

/// In-memory menu store.
///
/// Suitable for tests and for sites whose menus are loaded from files at
/// startup.
///
/// # Example
///
/// ```ignore
/// use nav_menus::{InMemoryMenuStore, MenuItemDraft, MenuKey, MenuStore};
///
/// let store = InMemoryMenuStore::new(&settings).with_site(site);
/// store.bulk_create_items(&MenuKey::Main(1), vec![MenuItemDraft::page(3)])?;
/// ```
#[derive(Debug)]
pub struct InMemoryMenuStore {
    state: RwLock<StoreState>,
    relations: HashMap<MenuKind, BTreeSet<String>>,
    main_defaults: (MaxLevels, UseSpecific),
    flat_defaults: (MaxLevels, UseSpecific),
}

impl InMemoryMenuStore {
    /// Create an empty store whose new menus take defaults from `settings`.
    ///
    /// Items are exposed under the `menu_items` relation for both main and
    /// flat menus.
    #[must_use]
    pub fn new(settings: &MenuSettings) -> Self {
        let relations = [MenuKind::Main, MenuKind::Flat]
            .into_iter()
            .map(|kind| (kind, BTreeSet::from(["menu_items".to_owned()])))
            .collect();
        Self {
            state: RwLock::new(StoreState::default()),
            relations,
            main_defaults: (settings.main_menu.max_levels, settings.main_menu.use_specific),
            flat_defaults: (settings.flat_menu.max_levels, settings.flat_menu.use_specific),
        }
    }

    /// Register a site.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_site(self, site: Site) -> Self {
        self.state.write().unwrap().sites.push(site);
        self
    }

    /// Expose items of `kind` menus under an additional relation name.
    #[must_use]
    pub fn with_item_relation(mut self, kind: MenuKind, name: &str) -> Self {
        self.relations
            .entry(kind)
            .or_default()
            .insert(name.to_owned());
        self
    }

    /// Replace a main menu record.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn save_main_menu(&self, record: MainMenuRecord) {
        self.state
            .write()
            .unwrap()
            .main_menus
            .insert(record.site_id, record);
    }

    fn default_site_id(state: &StoreState) -> Option<SiteId> {
        state
            .sites
            .iter()
            .find(|site| site.is_default_site)
            .map(|site| site.id)
    }
}

impl MenuStore for InMemoryMenuStore {
    fn main_menu_for_site(&self, site_id: SiteId) -> Result<MainMenuRecord, MenuError> {
        let mut state = self.state.write().unwrap();
        let (max_levels, use_specific) = self.main_defaults;
        let record = state
            .main_menus
            .entry(site_id)
            .or_insert_with(|| {
                tracing::debug!(site_id, "Creating main menu");
                MainMenuRecord {
                    site_id,
                    max_levels,
                    use_specific,
                }
            })
            .clone();
        Ok(record)
    }

    fn flat_menu(&self, site_id: SiteId, handle: &str) -> Result<Option<FlatMenuRecord>, MenuError> {
        let state = self.state.read().unwrap();
        Ok(state
            .flat_menus
            .iter()
            .find(|menu| menu.site_id == site_id && menu.handle == handle)
            .cloned())
    }

    fn default_site_flat_menu(&self, handle: &str) -> Result<Option<FlatMenuRecord>, MenuError> {
        let state = self.state.read().unwrap();
        let Some(default_site) = Self::default_site_id(&state) else {
            return Ok(None);
        };
        Ok(state
            .flat_menus
            .iter()
            .find(|menu| menu.site_id == default_site && menu.handle == handle)
            .cloned())
    }

    fn create_flat_menu(&self, menu: NewFlatMenu) -> Result<FlatMenuRecord, MenuError> {
        let mut state = self.state.write().unwrap();

        let mut errors = ValidationErrors::new();
        if menu.handle.trim().is_empty() {
            errors.add("handle", "This field is required");
        }
        if menu.title.trim().is_empty() {
            errors.add("title", "This field is required");
        }
        let clash = state
            .flat_menus
            .iter()
            .any(|m| m.site_id == menu.site_id && m.handle == menu.handle);
        if clash {
            let msg = "Site and handle must create a unique combination. A menu already exists with these same two values.";
            errors.add("site", msg);
            errors.add("handle", msg);
        }
        errors.into_result()?;

        let (max_levels, use_specific) = self.flat_defaults;
        let record = FlatMenuRecord {
            site_id: menu.site_id,
            handle: menu.handle,
            title: menu.title,
            heading: menu.heading,
            max_levels: menu.max_levels.unwrap_or(max_levels),
            use_specific: menu.use_specific.unwrap_or(use_specific),
        };
        state.flat_menus.push(record.clone());
        Ok(record)
    }

    fn has_item_relation(&self, kind: MenuKind, name: &str) -> bool {
        self.relations
            .get(&kind)
            .is_some_and(|names| names.contains(name))
    }

    fn menu_items(&self, key: &MenuKey) -> Result<Vec<MenuItem>, MenuError> {
        let state = self.state.read().unwrap();
        Ok(state.items.get(key).cloned().unwrap_or_default())
    }

    fn item_count(&self, key: &MenuKey) -> Result<usize, MenuError> {
        let state = self.state.read().unwrap();
        Ok(state.items.get(key).map_or(0, Vec::len))
    }

    fn bulk_create_items(
        &self,
        key: &MenuKey,
        drafts: Vec<MenuItemDraft>,
    ) -> Result<Vec<MenuItem>, MenuError> {
        let mut state = self.state.write().unwrap();
        let existing = state.items.get(key).map_or(0, Vec::len);

        // Validate everything before touching state
        let mut errors = ValidationErrors::new();
        let mut created = Vec::with_capacity(drafts.len());
        let mut next_id = state.next_item_id;
        for (offset, draft) in drafts.into_iter().enumerate() {
            next_id += 1;
            let position = u32::try_from(existing + offset).unwrap_or(u32::MAX);
            match draft.into_item(next_id, position) {
                Ok(item) => created.push(item),
                Err(e) => errors.extend(e),
            }
        }
        errors.into_result()?;

        state.next_item_id = next_id;
        let items = state.items.entry(key.clone()).or_default();
        items.extend(created.iter().cloned());
        items.sort_by_key(|item| item.sort_order);

        tracing::debug!(?key, count = created.len(), "Created menu items");
        Ok(created)
    }
}
