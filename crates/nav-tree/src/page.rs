//! Page and site records.
//!
//! These mirror what the content platform stores. Menus only ever read them.

use serde::{Deserialize, Serialize};

use crate::path::STEPLEN;

/// Numeric page identifier.
pub type PageId = u64;

/// Numeric site identifier.
pub type SiteId = u64;

/// Fields only available once a page has been resolved to its concrete type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificFields {
    /// Repeat a link to this page alongside its children in sub menus.
    pub repeat_in_subnav: bool,
    /// Link text for the repeated item. Falls back to the page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeated_item_text: Option<String>,
}

/// A page row from the tree.
///
/// A row fetched without specific resolution has `specific == None`
/// (the "base" type). Resolution fills in [`SpecificFields`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page id.
    pub id: PageId,
    /// Page title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Name of the concrete page type (e.g. "ContactPage").
    pub content_type: String,
    /// Materialized path.
    pub path: String,
    /// Tree depth (`path.len() / STEPLEN`).
    pub depth: u32,
    /// Site-relative URL with leading and trailing slash (e.g. "/about/").
    pub url_path: String,
    /// Page is published.
    pub live: bool,
    /// Page has passed its expiry date.
    pub expired: bool,
    /// Page opts in to menus.
    pub show_in_menus: bool,
    /// Concrete-type fields, present once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific: Option<SpecificFields>,
}

impl Page {
    /// True if this row has been resolved to its concrete type.
    #[must_use]
    pub fn is_specific(&self) -> bool {
        self.specific.is_some()
    }

    /// Width of a path segment. Always [`STEPLEN`].
    #[must_use]
    pub fn steplen(&self) -> usize {
        STEPLEN
    }

    /// Path of the parent page, or an empty string for a root page.
    #[must_use]
    pub fn parent_key(&self) -> &str {
        crate::path::sibling_key(&self.path)
    }

    /// Repeat-in-subnav flag, `false` for base-type rows.
    #[must_use]
    pub fn repeat_in_subnav(&self) -> bool {
        self.specific.as_ref().is_some_and(|s| s.repeat_in_subnav)
    }

    /// Text for a repeated item: the configured text, else the title.
    #[must_use]
    pub fn repeated_item_text(&self) -> &str {
        self.specific
            .as_ref()
            .and_then(|s| s.repeated_item_text.as_deref())
            .filter(|text| !text.is_empty())
            .unwrap_or(&self.title)
    }

    /// Drop concrete-type fields, producing the base-type row.
    #[must_use]
    pub fn into_base(mut self) -> Self {
        self.specific = None;
        self
    }
}

/// A site served by the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Site id.
    pub id: SiteId,
    /// Hostname (e.g. "www.example.com").
    pub hostname: String,
    /// Port the site is served on.
    pub port: u16,
    /// Human readable name.
    #[serde(default)]
    pub site_name: String,
    /// Id of the site's home page.
    pub root_page_id: PageId,
    /// The fallback site.
    #[serde(default)]
    pub is_default_site: bool,
}

impl Site {
    /// Root URL without trailing slash.
    ///
    /// Port 443 implies `https`, any other port `http`. Default ports are
    /// omitted.
    #[must_use]
    pub fn root_url(&self) -> String {
        match self.port {
            443 => format!("https://{}", self.hostname),
            80 => format!("http://{}", self.hostname),
            port => format!("http://{}:{port}", self.hostname),
        }
    }

    /// Display name: the site name, else the hostname.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.site_name.is_empty() {
            &self.hostname
        } else {
            &self.site_name
        }
    }
}
