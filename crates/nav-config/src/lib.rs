//! Settings for navigation menus.
//!
//! Parses `menus.toml` settings files with serde and provides
//! auto-discovery of the settings file in parent directories.
//!
//! Every value has a default, so an empty file (or no file at all) yields a
//! working configuration. Programmatic overrides can be applied during load
//! via [`SettingsOverrides`].
//!
//! ```toml
//! active_class = "is-active"
//! section_root_depth = 3
//!
//! [templates]
//! main_sub_menus = ["menus/main/level_2.html", "menus/main/level_3.html"]
//!
//! [flat_menu]
//! fall_back_to_default_site_menus = true
//!
//! [children_menu]
//! max_levels = 2
//! use_specific = 0
//! ```

mod choices;

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use choices::{MaxLevels, UseSpecific};

/// Settings filename to search for.
const CONFIG_FILENAME: &str = "menus.toml";

/// Values that override settings file values.
///
/// All fields are optional. Only non-None values override the loaded settings.
#[derive(Debug, Default)]
pub struct SettingsOverrides {
    /// Override the active item class.
    pub active_class: Option<String>,
    /// Override the ancestor item class.
    pub active_ancestor_class: Option<String>,
    /// Override the section root depth.
    pub section_root_depth: Option<u32>,
    /// Override host-specific template lookup.
    pub site_specific_template_dirs: Option<bool>,
}

/// Menu settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuSettings {
    /// Class for the item linking to the current page.
    pub active_class: String,
    /// Class for items linking to an ancestor of the current page.
    pub active_ancestor_class: String,
    /// Depth of section root pages. Menu items linking to shallower pages
    /// never expand into sub menus.
    pub section_root_depth: u32,
    /// Look up templates in per-hostname directories first.
    pub site_specific_template_dirs: bool,
    /// Name of the relation holding main menu items.
    pub main_menu_items_relation: String,
    /// Name of the relation holding flat menu items.
    pub flat_menu_items_relation: String,
    /// Default template names.
    pub templates: TemplateSettings,
    /// Defaults for main menus.
    pub main_menu: MenuDefaults,
    /// Defaults for flat menus.
    pub flat_menu: MenuDefaults,
    /// Defaults for section menus.
    pub section_menu: MenuDefaults,
    /// Defaults for children menus.
    pub children_menu: MenuDefaults,
    /// Path to the settings file (set after loading).
    pub config_path: Option<PathBuf>,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self::from_file(SettingsFile::default())
    }
}

/// Default template names.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Main menu template.
    pub main: String,
    /// Flat menu template.
    pub flat: String,
    /// Section menu template.
    pub section: String,
    /// Children menu template.
    pub children: String,
    /// Sub menu template used at every level unless overridden.
    pub sub_menu: String,
    /// Main menu sub menu templates, one per level starting at level 2.
    pub main_sub_menus: Vec<String>,
    /// Flat menu sub menu templates, one per level starting at level 2.
    pub flat_sub_menus: Vec<String>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            main: "menus/main_menu.html".to_owned(),
            flat: "menus/flat_menu.html".to_owned(),
            section: "menus/section_menu.html".to_owned(),
            children: "menus/children_menu.html".to_owned(),
            sub_menu: "menus/sub_menu.html".to_owned(),
            main_sub_menus: Vec::new(),
            flat_sub_menus: Vec::new(),
        }
    }
}

/// Resolved defaults for one kind of menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuDefaults {
    /// Levels to display.
    pub max_levels: MaxLevels,
    /// Specific page resolution mode.
    pub use_specific: UseSpecific,
    /// Attach active and ancestor classes.
    pub apply_active_classes: bool,
    /// Repeat parent pages in their own sub menus.
    pub allow_repeating_parents: bool,
    /// Render absolute page URLs.
    pub use_absolute_page_urls: bool,
    /// Flat menus only: use the default site's menu when the current site
    /// has none with the requested handle.
    pub fall_back_to_default_site_menus: bool,
}

impl MenuDefaults {
    fn base(max_levels: MaxLevels) -> Self {
        Self {
            max_levels,
            use_specific: UseSpecific::Auto,
            apply_active_classes: true,
            allow_repeating_parents: true,
            use_absolute_page_urls: false,
            fall_back_to_default_site_menus: false,
        }
    }

    fn merge(self, raw: &MenuDefaultsRaw) -> Self {
        Self {
            max_levels: raw.max_levels.unwrap_or(self.max_levels),
            use_specific: raw.use_specific.unwrap_or(self.use_specific),
            apply_active_classes: raw.apply_active_classes.unwrap_or(self.apply_active_classes),
            allow_repeating_parents: raw
                .allow_repeating_parents
                .unwrap_or(self.allow_repeating_parents),
            use_absolute_page_urls: raw
                .use_absolute_page_urls
                .unwrap_or(self.use_absolute_page_urls),
            fall_back_to_default_site_menus: raw
                .fall_back_to_default_site_menus
                .unwrap_or(self.fall_back_to_default_site_menus),
        }
    }
}

/// Per-menu table as parsed from TOML. Missing keys keep the kind's baseline.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct MenuDefaultsRaw {
    max_levels: Option<MaxLevels>,
    use_specific: Option<UseSpecific>,
    apply_active_classes: Option<bool>,
    allow_repeating_parents: Option<bool>,
    use_absolute_page_urls: Option<bool>,
    fall_back_to_default_site_menus: Option<bool>,
}

/// Settings file as parsed from TOML.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct SettingsFile {
    active_class: String,
    active_ancestor_class: String,
    section_root_depth: u32,
    site_specific_template_dirs: bool,
    main_menu_items_relation: String,
    flat_menu_items_relation: String,
    templates: TemplateSettings,
    main_menu: MenuDefaultsRaw,
    flat_menu: MenuDefaultsRaw,
    section_menu: MenuDefaultsRaw,
    children_menu: MenuDefaultsRaw,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            active_class: "active".to_owned(),
            active_ancestor_class: "ancestor".to_owned(),
            section_root_depth: 3,
            site_specific_template_dirs: false,
            main_menu_items_relation: "menu_items".to_owned(),
            flat_menu_items_relation: "menu_items".to_owned(),
            templates: TemplateSettings::default(),
            main_menu: MenuDefaultsRaw::default(),
            flat_menu: MenuDefaultsRaw::default(),
            section_menu: MenuDefaultsRaw::default(),
            children_menu: MenuDefaultsRaw::default(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Settings error: {0}")]
    Validation(String),
    /// Value outside a closed set of choices.
    #[error("{value} is not valid. The value must be one of: {allowed}")]
    InvalidChoice {
        /// Option name (e.g., "`max_levels`").
        field: &'static str,
        /// The rejected value as supplied.
        value: String,
        /// Comma separated accepted values.
        allowed: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl MenuSettings {
    /// Load settings from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `menus.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// Overrides are applied after loading and take precedence over file
    /// values. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final settings are invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&SettingsOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut settings = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = overrides {
            settings.apply_overrides(overrides);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns error if parsing fails or the settings are invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(content)?;
        let settings = Self::from_file(file);
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults for the given menu kind.
    #[must_use]
    pub fn defaults_for(&self, kind: MenuKindSettings) -> &MenuDefaults {
        match kind {
            MenuKindSettings::Main => &self.main_menu,
            MenuKindSettings::Flat => &self.flat_menu,
            MenuKindSettings::Section => &self.section_menu,
            MenuKindSettings::Children => &self.children_menu,
        }
    }

    /// Apply overrides to the settings.
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(class) = &overrides.active_class {
            self.active_class.clone_from(class);
        }
        if let Some(class) = &overrides.active_ancestor_class {
            self.active_ancestor_class.clone_from(class);
        }
        if let Some(depth) = overrides.section_root_depth {
            self.section_root_depth = depth;
        }
        if let Some(enabled) = overrides.site_specific_template_dirs {
            self.site_specific_template_dirs = enabled;
        }
    }

    /// Search for settings file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load settings from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let file: SettingsFile = toml::from_str(&content)?;
        let mut settings = Self::from_file(file);
        settings.config_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Resolve per-kind tables against their baselines.
    fn from_file(file: SettingsFile) -> Self {
        let children_baseline = MenuDefaults {
            apply_active_classes: false,
            ..MenuDefaults::base(MaxLevels::MIN)
        };
        Self {
            main_menu: MenuDefaults::base(MaxLevels(2)).merge(&file.main_menu),
            flat_menu: MenuDefaults::base(MaxLevels::MIN).merge(&file.flat_menu),
            section_menu: MenuDefaults::base(MaxLevels(2)).merge(&file.section_menu),
            children_menu: children_baseline.merge(&file.children_menu),
            active_class: file.active_class,
            active_ancestor_class: file.active_ancestor_class,
            section_root_depth: file.section_root_depth,
            site_specific_template_dirs: file.site_specific_template_dirs,
            main_menu_items_relation: file.main_menu_items_relation,
            flat_menu_items_relation: file.flat_menu_items_relation,
            templates: file.templates,
            config_path: None,
        }
    }

    /// Validate settings values.
    ///
    /// Per-menu `max_levels` and `use_specific` are already checked against
    /// their closed sets while parsing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.active_class, "active_class")?;
        require_non_empty(&self.active_ancestor_class, "active_ancestor_class")?;
        require_non_empty(&self.main_menu_items_relation, "main_menu_items_relation")?;
        require_non_empty(&self.flat_menu_items_relation, "flat_menu_items_relation")?;

        if self.section_root_depth == 0 {
            return Err(ConfigError::Validation(
                "section_root_depth must be at least 1".to_owned(),
            ));
        }

        self.validate_templates()
    }

    /// Validate template names.
    fn validate_templates(&self) -> Result<(), ConfigError> {
        let t = &self.templates;
        require_non_empty(&t.main, "templates.main")?;
        require_non_empty(&t.flat, "templates.flat")?;
        require_non_empty(&t.section, "templates.section")?;
        require_non_empty(&t.children, "templates.children")?;
        require_non_empty(&t.sub_menu, "templates.sub_menu")?;
        for name in &t.main_sub_menus {
            require_non_empty(name, "templates.main_sub_menus")?;
        }
        for name in &t.flat_sub_menus {
            require_non_empty(name, "templates.flat_sub_menus")?;
        }
        Ok(())
    }
}

/// Menu kinds that carry their own defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuKindSettings {
    /// `[main_menu]`
    Main,
    /// `[flat_menu]`
    Flat,
    /// `[section_menu]`
    Section,
    /// `[children_menu]`
    Children,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = MenuSettings::default();

        assert_eq!(settings.active_class, "active");
        assert_eq!(settings.active_ancestor_class, "ancestor");
        assert_eq!(settings.section_root_depth, 3);
        assert!(!settings.site_specific_template_dirs);
        assert_eq!(settings.templates.main, "menus/main_menu.html");
        assert_eq!(settings.templates.sub_menu, "menus/sub_menu.html");
        assert!(settings.config_path.is_none());
    }

    #[test]
    fn test_default_per_kind() {
        let settings = MenuSettings::default();

        assert_eq!(settings.main_menu.max_levels.get(), 2);
        assert_eq!(settings.flat_menu.max_levels.get(), 1);
        assert_eq!(settings.section_menu.max_levels.get(), 2);
        assert_eq!(settings.children_menu.max_levels.get(), 1);
        assert_eq!(settings.main_menu.use_specific, UseSpecific::Auto);
        assert!(settings.main_menu.apply_active_classes);
        assert!(!settings.children_menu.apply_active_classes);
        assert!(!settings.flat_menu.fall_back_to_default_site_menus);
    }

    #[test]
    fn test_parse_minimal_settings() {
        let settings = MenuSettings::from_toml("").unwrap();

        assert_eq!(settings, MenuSettings::default());
    }

    #[test]
    fn test_parse_partial_menu_table_keeps_baseline() {
        let toml = r"
[children_menu]
max_levels = 3
";
        let settings = MenuSettings::from_toml(toml).unwrap();

        assert_eq!(settings.children_menu.max_levels.get(), 3);
        // Unset keys keep the children baseline, not the generic one
        assert!(!settings.children_menu.apply_active_classes);
    }

    #[test]
    fn test_parse_full_settings() {
        let toml = r#"
active_class = "is-active"
active_ancestor_class = "is-ancestor"
section_root_depth = 2
site_specific_template_dirs = true

[templates]
main_sub_menus = ["menus/main/level_2.html"]

[main_menu]
max_levels = 3
use_specific = 3

[flat_menu]
fall_back_to_default_site_menus = true
"#;
        let settings = MenuSettings::from_toml(toml).unwrap();

        assert_eq!(settings.active_class, "is-active");
        assert_eq!(settings.active_ancestor_class, "is-ancestor");
        assert_eq!(settings.section_root_depth, 2);
        assert!(settings.site_specific_template_dirs);
        assert_eq!(
            settings.templates.main_sub_menus,
            vec!["menus/main/level_2.html".to_owned()]
        );
        assert_eq!(settings.main_menu.max_levels.get(), 3);
        assert_eq!(settings.main_menu.use_specific, UseSpecific::Always);
        assert!(settings.flat_menu.fall_back_to_default_site_menus);
    }

    #[test]
    fn test_parse_invalid_use_specific() {
        let toml = r"
[main_menu]
use_specific = 7
";
        let err = MenuSettings::from_toml(toml).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("must be one of: 0,1,2,3"));
    }

    #[test]
    fn test_parse_invalid_max_levels() {
        let toml = r"
[section_menu]
max_levels = 0
";
        let err = MenuSettings::from_toml(toml).unwrap_err();

        assert!(err.to_string().contains("must be one of: 1,2,3,4,5"));
    }

    #[test]
    fn test_parse_unknown_menu_key_rejected() {
        let toml = r"
[main_menu]
levels = 2
";
        assert!(MenuSettings::from_toml(toml).is_err());
    }

    #[test]
    fn test_defaults_for() {
        let settings = MenuSettings::default();

        assert_eq!(
            settings.defaults_for(MenuKindSettings::Children),
            &settings.children_menu
        );
        assert_eq!(
            settings.defaults_for(MenuKindSettings::Flat),
            &settings.flat_menu
        );
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "active_class = \"current\"").unwrap();

        let settings = MenuSettings::load(Some(file.path()), None).unwrap();

        assert_eq!(settings.active_class, "current");
        assert_eq!(settings.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_load_missing_path() {
        let err = MenuSettings::load(Some(Path::new("/nonexistent/menus.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "section_root_depth = 4").unwrap();
        let overrides = SettingsOverrides {
            section_root_depth: Some(2),
            ..Default::default()
        };

        let settings = MenuSettings::load(Some(file.path()), Some(&overrides)).unwrap();

        assert_eq!(settings.section_root_depth, 2);
        assert_eq!(settings.active_class, "active"); // Unchanged
    }

    #[test]
    fn test_load_validates_after_overrides() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let overrides = SettingsOverrides {
            active_class: Some(String::new()),
            ..Default::default()
        };

        let err = MenuSettings::load(Some(file.path()), Some(&overrides)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("active_class"));
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(settings: &MenuSettings, expected_substrings: &[&str]) {
        let result = settings.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_settings_passes() {
        assert!(MenuSettings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_section_root_depth_zero() {
        let settings = MenuSettings {
            section_root_depth: 0,
            ..MenuSettings::default()
        };
        assert_validation_error(&settings, &["section_root_depth"]);
    }

    #[test]
    fn test_validate_blank_relation_name() {
        let settings = MenuSettings {
            flat_menu_items_relation: "  ".to_owned(),
            ..MenuSettings::default()
        };
        assert_validation_error(&settings, &["flat_menu_items_relation", "empty"]);
    }

    #[test]
    fn test_validate_blank_sub_menu_template() {
        let mut settings = MenuSettings::default();
        settings.templates.flat_sub_menus = vec![String::new()];
        assert_validation_error(&settings, &["templates.flat_sub_menus"]);
    }
}
