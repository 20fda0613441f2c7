//! Per-render option resolution.
//!
//! Each option is taken from the first layer that sets it: the caller's
//! [`OptionOverrides`], then the persisted menu ([`ModelOptions`]), then the
//! settings defaults for the menu kind.

use nav_config::{MaxLevels, MenuDefaults, UseSpecific};
use serde::Deserialize;

use crate::error::ValidationErrors;

/// Options supplied by the caller for a single render.
///
/// Numeric options are raw so that out-of-range values surface as
/// validation errors instead of being clamped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OptionOverrides {
    pub max_levels: Option<i64>,
    pub use_specific: Option<i64>,
    pub apply_active_classes: Option<bool>,
    pub allow_repeating_parents: Option<bool>,
    pub use_absolute_page_urls: Option<bool>,
    pub fall_back_to_default_site_menus: Option<bool>,
    pub template_name: Option<String>,
    pub sub_menu_template_name: Option<String>,
    pub sub_menu_template_names: Vec<String>,
}

/// Options stored on a persisted main or flat menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModelOptions {
    pub max_levels: Option<MaxLevels>,
    pub use_specific: Option<UseSpecific>,
}

/// Fully resolved options for one render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub max_levels: MaxLevels,
    pub use_specific: UseSpecific,
    pub apply_active_classes: bool,
    pub allow_repeating_parents: bool,
    pub use_absolute_page_urls: bool,
    pub fall_back_to_default_site_menus: bool,
    pub template_name: Option<String>,
    pub sub_menu_template_name: Option<String>,
    pub sub_menu_template_names: Vec<String>,
}

impl OptionOverrides {
    /// Create an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_levels(mut self, levels: i64) -> Self {
        self.max_levels = Some(levels);
        self
    }

    #[must_use]
    pub fn use_specific(mut self, mode: i64) -> Self {
        self.use_specific = Some(mode);
        self
    }

    #[must_use]
    pub fn apply_active_classes(mut self, apply: bool) -> Self {
        self.apply_active_classes = Some(apply);
        self
    }

    #[must_use]
    pub fn allow_repeating_parents(mut self, allow: bool) -> Self {
        self.allow_repeating_parents = Some(allow);
        self
    }

    #[must_use]
    pub fn use_absolute_page_urls(mut self, absolute: bool) -> Self {
        self.use_absolute_page_urls = Some(absolute);
        self
    }

    #[must_use]
    pub fn fall_back_to_default_site_menus(mut self, fall_back: bool) -> Self {
        self.fall_back_to_default_site_menus = Some(fall_back);
        self
    }

    #[must_use]
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn sub_menu_template_name(mut self, name: impl Into<String>) -> Self {
        self.sub_menu_template_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn sub_menu_template_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_menu_template_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Merge with the persisted menu and settings defaults.
    ///
    /// Every invalid option is reported, not just the first.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] keyed by `max_levels` / `use_specific`
    /// listing the accepted values.
    pub fn resolve(
        &self,
        model: ModelOptions,
        defaults: &MenuDefaults,
    ) -> Result<ResolvedOptions, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let max_levels = match self.max_levels.map(MaxLevels::new).transpose() {
            Ok(levels) => levels.or(model.max_levels).unwrap_or(defaults.max_levels),
            Err(e) => {
                errors.add_config(&e);
                defaults.max_levels
            }
        };
        let use_specific = match self.use_specific.map(UseSpecific::try_from).transpose() {
            Ok(mode) => mode.or(model.use_specific).unwrap_or(defaults.use_specific),
            Err(e) => {
                errors.add_config(&e);
                defaults.use_specific
            }
        };
        errors.into_result()?;

        Ok(ResolvedOptions {
            max_levels,
            use_specific,
            apply_active_classes: self
                .apply_active_classes
                .unwrap_or(defaults.apply_active_classes),
            allow_repeating_parents: self
                .allow_repeating_parents
                .unwrap_or(defaults.allow_repeating_parents),
            use_absolute_page_urls: self
                .use_absolute_page_urls
                .unwrap_or(defaults.use_absolute_page_urls),
            fall_back_to_default_site_menus: self
                .fall_back_to_default_site_menus
                .unwrap_or(defaults.fall_back_to_default_site_menus),
            template_name: non_blank(self.template_name.as_deref()),
            sub_menu_template_name: non_blank(self.sub_menu_template_name.as_deref()),
            sub_menu_template_names: self
                .sub_menu_template_names
                .iter()
                .filter(|name| !name.trim().is_empty())
                .cloned()
                .collect(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_owned)
}
