//! Error types for menu resolution.

use std::collections::BTreeMap;
use std::fmt;

use nav_config::ConfigError;
use nav_tree::{SiteId, TreeError};
use serde::Serialize;

/// Error returned by menu operations.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// Page tree backend failed.
    #[error("Page tree error: {0}")]
    Tree(#[from] TreeError),
    /// No persisted menu matches the lookup.
    #[error("No {menu_class} object could be found matching the supplied values (site: {site_id}, handle: {handle:?})")]
    NotFound {
        /// Menu class name (e.g., "`FlatMenu`").
        menu_class: &'static str,
        /// Requested handle.
        handle: String,
        /// Requested site.
        site_id: SiteId,
    },
    /// Settings refer to something that does not exist.
    #[error(
        "'{value}' isn't a valid relationship name for accessing menu items from {menu_class}. \
         Check that your `{setting}` setting matches the relation used by your menu item store"
    )]
    ImproperlyConfigured {
        /// Setting name (e.g., "`main_menu_items_relation`").
        setting: &'static str,
        /// Configured value.
        value: String,
        /// Menu class name.
        menu_class: &'static str,
    },
    /// Operation needs persisted menu items but the menu is built from a page.
    #[error("{menu_type} menus have no persisted items")]
    NoMenuItems {
        /// Menu type (e.g., "`section_menu`").
        menu_type: &'static str,
    },
    /// User supplied values failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Field-level validation failures.
///
/// Serializes as `{"field": ["message", ...], "non_field_errors": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    #[serde(flatten)]
    fields: BTreeMap<String, Vec<String>>,
    #[serde(rename = "non_field_errors", skip_serializing_if = "Vec::is_empty")]
    non_field: Vec<String>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single field error.
    #[must_use]
    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record an error against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Record an error not tied to a single field.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// Record an invalid choice against its field.
    pub fn add_config(&mut self, err: &ConfigError) {
        match err {
            ConfigError::InvalidChoice { field, .. } => self.add(field, err.to_string()),
            _ => self.add_non_field(err.to_string()),
        }
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: Self) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
        self.non_field.extend(other.non_field);
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// Messages for one field.
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    /// Messages not tied to a field.
    #[must_use]
    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    /// Names of fields with errors, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `Ok(())` if empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        for message in &self.non_field {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
