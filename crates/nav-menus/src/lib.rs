//! Navigation menu resolution and rendering.
//!
//! This crate provides:
//! - [`Menus`]: builds and renders main, flat, section and children menus
//! - [`Menu`]: memoized resolution of top-level items and sub menu pages
//! - [`MenuStore`]: persisted main and flat menus and their items
//! - [`Hooks`]: extension points for filters, item lists and rendered levels
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use nav_config::MenuSettings;
//! use nav_menus::{InMemoryMenuStore, Menus, OptionOverrides, RenderContext};
//! # use nav_tree::PageTree;
//! # fn tree() -> Arc<dyn PageTree> { unimplemented!() }
//! # fn site() -> nav_tree::Site { unimplemented!() }
//!
//! let settings = MenuSettings::load(None, None)?;
//! let store = Arc::new(InMemoryMenuStore::new(&settings));
//! let menus = Menus::new(tree(), store, settings);
//!
//! let ctx = RenderContext::for_site(site());
//! let menu = menus.render_main_menu(&ctx, &OptionOverrides::new().max_levels(3))?;
//! let json = menu.to_json(menus.page_schemas());
//! # Ok(())
//! # }
//! ```

mod cache;
mod children_index;
mod context;
mod decorate;
mod error;
mod hooks;
mod item;
mod menu;
mod menus;
mod options;
mod schema;
mod store;
mod templates;

pub use cache::{CacheState, Invalidation};
pub use children_index::PageChildrenIndex;
pub use context::RenderContext;
pub use decorate::{ItemSource, RenderedItem, RenderedMenu};
pub use error::{MenuError, ValidationErrors};
pub use hooks::{
    HookContext, Hooks, ModifyBasePageFilter, ModifyMenuItemList, ModifyRenderedItems,
    RenderHookContext,
};
pub use item::{ItemLink, MenuItem, MenuItemDraft, MenuItemId};
pub use menu::{Menu, MenuKind, MenuSource, TopLevelItem};
pub use menus::Menus;
pub use options::{ModelOptions, OptionOverrides, ResolvedOptions};
pub use schema::{PageField, PageSchema, PageSchemaRegistry};
pub use store::{
    FlatMenuRecord, InMemoryMenuStore, MainMenuRecord, MenuKey, MenuStore, NewFlatMenu,
};
pub use templates::{SubMenuTemplates, TemplateNames, sub_menu_template_for_level};
