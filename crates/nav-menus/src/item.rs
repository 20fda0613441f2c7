//! Persisted menu items.
//!
//! A [`MenuItemDraft`] is what an editor submits; validation turns it into a
//! [`MenuItem`] that links to exactly one target.

use nav_tree::{Page, PageId};
use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

/// Menu item identifier.
pub type MenuItemId = u64;

/// Link target of a menu item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLink {
    /// Internal page.
    Page(PageId),
    /// Custom URL.
    Url(String),
}

/// Unvalidated menu item as submitted by an editor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItemDraft {
    /// Internal page to link to.
    pub link_page: Option<PageId>,
    /// Custom URL to link to.
    pub link_url: Option<String>,
    /// Link text. Required for custom URLs, optional for pages.
    pub link_text: String,
    /// Appended to the resolved URL (e.g. `#anchor` or `?q=1`).
    pub url_append: String,
    /// Free-form identifier for templates.
    pub handle: String,
    /// Expand the linked page's descendants into sub menus.
    pub allow_subnav: bool,
    /// Position in the menu. Assigned on insert when absent.
    pub sort_order: Option<u32>,
}

impl Default for MenuItemDraft {
    fn default() -> Self {
        Self {
            link_page: None,
            link_url: None,
            link_text: String::new(),
            url_append: String::new(),
            handle: String::new(),
            allow_subnav: true,
            sort_order: None,
        }
    }
}

impl MenuItemDraft {
    /// Draft linking to a page.
    #[must_use]
    pub fn page(id: PageId) -> Self {
        Self {
            link_page: Some(id),
            ..Self::default()
        }
    }

    /// Draft linking to a custom URL.
    #[must_use]
    pub fn url(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            link_url: Some(url.into()),
            link_text: text.into(),
            ..Self::default()
        }
    }

    /// Set whether the item expands into a sub menu.
    #[must_use]
    pub fn allow_subnav(mut self, allow: bool) -> Self {
        self.allow_subnav = allow;
        self
    }

    /// Set the URL suffix.
    #[must_use]
    pub fn url_append(mut self, suffix: impl Into<String>) -> Self {
        self.url_append = suffix.into();
        self
    }

    /// Set the link text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.link_text = text.into();
        self
    }

    /// Check the draft without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] if the draft links to both or neither of
    /// a page and a URL, or links to a URL without link text.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.resolve_link().map(|_| ())
    }

    /// Validate and assign an id.
    ///
    /// # Errors
    ///
    /// See [`MenuItemDraft::validate`].
    pub fn into_item(self, id: MenuItemId, sort_order: u32) -> Result<MenuItem, ValidationErrors> {
        let link = self.resolve_link()?;
        Ok(MenuItem {
            id,
            link,
            link_text: self.link_text,
            url_append: self.url_append,
            handle: self.handle,
            allow_subnav: self.allow_subnav,
            sort_order: self.sort_order.unwrap_or(sort_order),
        })
    }

    fn resolve_link(&self) -> Result<ItemLink, ValidationErrors> {
        let url = self.link_url.as_deref().filter(|u| !u.trim().is_empty());

        match (self.link_page, url) {
            (Some(_), Some(_)) => {
                let mut errors = ValidationErrors::new();
                errors.add_non_field("Linking to both a page and custom URL is not permitted");
                Err(errors)
            }
            (None, None) => Err(ValidationErrors::for_field(
                "link_url",
                "Please choose an internal page or provide a custom URL",
            )),
            (None, Some(_)) if self.link_text.trim().is_empty() => Err(ValidationErrors::for_field(
                "link_text",
                "This field is required when linking to a custom URL",
            )),
            (Some(page), None) => Ok(ItemLink::Page(page)),
            (None, Some(url)) => Ok(ItemLink::Url(url.to_owned())),
        }
    }
}

/// A validated, persisted menu item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Item id.
    pub id: MenuItemId,
    /// Link target.
    pub link: ItemLink,
    /// Link text, possibly empty for page links.
    pub link_text: String,
    /// URL suffix.
    pub url_append: String,
    /// Free-form identifier for templates.
    pub handle: String,
    /// Expand the linked page's descendants into sub menus.
    pub allow_subnav: bool,
    /// Position in the menu.
    pub sort_order: u32,
}

impl MenuItem {
    /// Linked page id, if the item links to a page.
    #[must_use]
    pub fn link_page_id(&self) -> Option<PageId> {
        match self.link {
            ItemLink::Page(id) => Some(id),
            ItemLink::Url(_) => None,
        }
    }

    /// Custom URL, if the item links to one.
    #[must_use]
    pub fn link_url(&self) -> Option<&str> {
        match &self.link {
            ItemLink::Url(url) => Some(url),
            ItemLink::Page(_) => None,
        }
    }

    /// Display text: the link text, else the linked page's title.
    #[must_use]
    pub fn menu_text<'a>(&'a self, page: Option<&'a Page>) -> &'a str {
        match page {
            Some(page) if self.link_text.is_empty() => &page.title,
            _ => &self.link_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_page_draft_is_valid() {
        assert!(MenuItemDraft::page(4).validate().is_ok());
    }

    #[test]
    fn test_url_draft_is_valid() {
        assert!(
            MenuItemDraft::url("https://example.com", "Example")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_both_page_and_url_rejected() {
        let draft = MenuItemDraft {
            link_page: Some(4),
            link_url: Some("https://example.com".to_owned()),
            ..MenuItemDraft::default()
        };

        let errors = draft.validate().unwrap_err();

        assert_eq!(
            errors.non_field(),
            ["Linking to both a page and custom URL is not permitted"]
        );
    }

    #[test]
    fn test_neither_page_nor_url_rejected() {
        let errors = MenuItemDraft::default().validate().unwrap_err();

        assert_eq!(
            errors.field("link_url"),
            ["Please choose an internal page or provide a custom URL"]
        );
    }

    #[test]
    fn test_blank_url_counts_as_missing() {
        let draft = MenuItemDraft::url("  ", "Text");

        let errors = draft.validate().unwrap_err();

        assert!(!errors.field("link_url").is_empty());
    }

    #[test]
    fn test_url_without_text_rejected() {
        let errors = MenuItemDraft::url("https://example.com", "")
            .validate()
            .unwrap_err();

        assert_eq!(
            errors.field("link_text"),
            ["This field is required when linking to a custom URL"]
        );
    }

    #[test]
    fn test_into_item_assigns_sort_order() {
        let item = MenuItemDraft::page(4).into_item(10, 3).unwrap();

        assert_eq!(item.id, 10);
        assert_eq!(item.link, ItemLink::Page(4));
        assert_eq!(item.sort_order, 3);
        assert!(item.allow_subnav);
    }

    #[test]
    fn test_into_item_keeps_explicit_sort_order() {
        let draft = MenuItemDraft {
            sort_order: Some(7),
            ..MenuItemDraft::page(4)
        };

        assert_eq!(draft.into_item(1, 0).unwrap().sort_order, 7);
    }

    #[test]
    fn test_menu_text_falls_back_to_page_title() {
        let item = MenuItemDraft::page(4).into_item(1, 0).unwrap();
        let page = Page {
            id: 4,
            title: "About".to_owned(),
            slug: "about".to_owned(),
            content_type: "Page".to_owned(),
            path: "000100010001".to_owned(),
            depth: 3,
            url_path: "/about/".to_owned(),
            live: true,
            expired: false,
            show_in_menus: true,
            specific: None,
        };

        assert_eq!(item.menu_text(Some(&page)), "About");

        let item = MenuItemDraft::page(4).text("Who we are").into_item(1, 0).unwrap();
        assert_eq!(item.menu_text(Some(&page)), "Who we are");
    }

    #[test]
    fn test_link_accessors() {
        let item = MenuItemDraft::url("/shop/", "Shop").into_item(1, 0).unwrap();

        assert_eq!(item.link_url(), Some("/shop/"));
        assert_eq!(item.link_page_id(), None);
    }
}
