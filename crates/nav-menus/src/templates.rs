//! Template name candidates.
//!
//! Lists are ordered most specific first; a template loader should use the
//! first name that exists.

use nav_config::MenuSettings;
use nav_tree::Site;

use crate::menu::MenuKind;
use crate::options::ResolvedOptions;

/// Sub menu templates configured on a menu kind rather than per call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubMenuTemplates {
    /// Template for every sub menu level.
    pub template_name: Option<String>,
    /// Template per sub menu level, starting at level 2.
    pub template_names: Vec<String>,
}

/// Builds candidate lists for one render.
#[derive(Clone, Copy, Debug)]
pub struct TemplateNames<'a> {
    settings: &'a MenuSettings,
    hostname: Option<&'a str>,
}

impl<'a> TemplateNames<'a> {
    /// Host-specific names are included only when
    /// `site_specific_template_dirs` is on and a site is known.
    #[must_use]
    pub fn new(settings: &'a MenuSettings, site: Option<&'a Site>) -> Self {
        let hostname = site
            .filter(|_| settings.site_specific_template_dirs)
            .map(|site| site.hostname.as_str());
        Self { settings, hostname }
    }

    fn default_template(&self, kind: MenuKind) -> &'a str {
        let templates = &self.settings.templates;
        match kind {
            MenuKind::Main => &templates.main,
            MenuKind::Flat => &templates.flat,
            MenuKind::Section => &templates.section,
            MenuKind::Children => &templates.children,
        }
    }

    /// Candidates for the menu itself.
    ///
    /// `handle` is only used by flat menus.
    #[must_use]
    pub fn menu(&self, kind: MenuKind, handle: Option<&str>) -> Vec<String> {
        let mut names = Vec::new();
        match (kind, handle) {
            (MenuKind::Flat, Some(handle)) => {
                if let Some(host) = self.hostname {
                    names.extend([
                        format!("menus/{host}/flat/{handle}/menu.html"),
                        format!("menus/{host}/flat/{handle}.html"),
                        format!("menus/{host}/{handle}/menu.html"),
                        format!("menus/{host}/{handle}.html"),
                        format!("menus/{host}/flat/menu.html"),
                        format!("menus/{host}/flat/default.html"),
                        format!("menus/{host}/flat_menu.html"),
                    ]);
                }
                names.extend([
                    format!("menus/flat/{handle}/menu.html"),
                    format!("menus/flat/{handle}.html"),
                    format!("menus/{handle}/menu.html"),
                    format!("menus/{handle}.html"),
                    "menus/flat/default.html".to_owned(),
                    "menus/flat/menu.html".to_owned(),
                ]);
            }
            _ => {
                let menu = kind.short_name();
                if let Some(host) = self.hostname {
                    names.extend([
                        format!("menus/{host}/{menu}/menu.html"),
                        format!("menus/{host}/{menu}_menu.html"),
                    ]);
                }
                names.push(format!("menus/{menu}/menu.html"));
            }
        }
        names.push(self.default_template(kind).to_owned());
        names
    }

    /// Candidates for sub menus.
    #[must_use]
    pub fn sub_menu(&self, kind: MenuKind, handle: Option<&str>) -> Vec<String> {
        let mut names = Vec::new();
        match (kind, handle) {
            (MenuKind::Flat, Some(handle)) => {
                if let Some(host) = self.hostname {
                    names.extend([
                        format!("menus/{host}/flat/{handle}/sub_menu.html"),
                        format!("menus/{host}/flat/{handle}_sub_menu.html"),
                        format!("menus/{host}/{handle}/sub_menu.html"),
                        format!("menus/{host}/{handle}_sub_menu.html"),
                        format!("menus/{host}/flat/sub_menu.html"),
                        format!("menus/{host}/sub_menu.html"),
                    ]);
                }
                names.extend([
                    format!("menus/flat/{handle}/sub_menu.html"),
                    format!("menus/flat/{handle}_sub_menu.html"),
                    format!("menus/{handle}/sub_menu.html"),
                    format!("menus/{handle}_sub_menu.html"),
                    "menus/flat/sub_menu.html".to_owned(),
                ]);
            }
            _ => {
                let menu = kind.short_name();
                if let Some(host) = self.hostname {
                    names.extend([
                        format!("menus/{host}/{menu}/sub_menu.html"),
                        format!("menus/{host}/{menu}_sub_menu.html"),
                        format!("menus/{host}/sub_menu.html"),
                    ]);
                }
                names.extend([
                    format!("menus/{menu}/sub_menu.html"),
                    format!("menus/{menu}_sub_menu.html"),
                ]);
            }
        }
        names.push(self.settings.templates.sub_menu.clone());
        names
    }

    /// Per-level sub menu templates from settings.
    #[must_use]
    pub fn settings_sub_menus(&self, kind: MenuKind) -> &'a [String] {
        match kind {
            MenuKind::Main => &self.settings.templates.main_sub_menus,
            MenuKind::Flat => &self.settings.templates.flat_sub_menus,
            MenuKind::Section | MenuKind::Children => &[],
        }
    }
}

/// Entry for `level` in a per-level list (level 2 first), else the last entry.
fn pick_for_level(names: &[String], level: u32) -> Option<&String> {
    let index = usize::try_from(level.saturating_sub(2)).unwrap_or(usize::MAX);
    names.get(index).or_else(|| names.last())
}

/// Explicitly chosen sub menu template for `level`, if any.
///
/// Preference: the option's single template, the option's per-level list,
/// the kind's single template, the kind's per-level list, then the
/// settings' per-level list.
#[must_use]
pub fn sub_menu_template_for_level(
    level: u32,
    options: &ResolvedOptions,
    class: &SubMenuTemplates,
    settings_levels: &[String],
) -> Option<String> {
    options
        .sub_menu_template_name
        .as_ref()
        .or_else(|| pick_for_level(&options.sub_menu_template_names, level))
        .or(class.template_name.as_ref())
        .or_else(|| pick_for_level(&class.template_names, level))
        .or_else(|| pick_for_level(settings_levels, level))
        .cloned()
}

#[cfg(test)]
mod tests {
    use nav_config::{MenuKindSettings, UseSpecific};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::options::{ModelOptions, OptionOverrides};

    fn make_site() -> Site {
        Site {
            id: 1,
            hostname: "www.example.com".to_owned(),
            port: 80,
            site_name: String::new(),
            root_page_id: 2,
            is_default_site: true,
        }
    }

    fn site_specific_settings() -> MenuSettings {
        MenuSettings {
            site_specific_template_dirs: true,
            ..MenuSettings::default()
        }
    }

    fn make_options(overrides: &OptionOverrides) -> ResolvedOptions {
        let defaults = *MenuSettings::default().defaults_for(MenuKindSettings::Main);
        let options = overrides.resolve(ModelOptions::default(), &defaults).unwrap();
        assert_eq!(options.use_specific, UseSpecific::Auto);
        options
    }

    #[test]
    fn test_main_menu_names_without_site_dirs() {
        let settings = MenuSettings::default();
        let site = make_site();

        let names = TemplateNames::new(&settings, Some(&site)).menu(MenuKind::Main, None);

        assert_eq!(names, vec!["menus/main/menu.html", "menus/main_menu.html"]);
    }

    #[test]
    fn test_main_menu_names_with_site_dirs() {
        let settings = site_specific_settings();
        let site = make_site();

        let names = TemplateNames::new(&settings, Some(&site)).menu(MenuKind::Main, None);

        assert_eq!(
            names,
            vec![
                "menus/www.example.com/main/menu.html",
                "menus/www.example.com/main_menu.html",
                "menus/main/menu.html",
                "menus/main_menu.html",
            ]
        );
    }

    #[test]
    fn test_site_dirs_need_a_site() {
        let settings = site_specific_settings();

        let names = TemplateNames::new(&settings, None).sub_menu(MenuKind::Section, None);

        assert_eq!(
            names,
            vec![
                "menus/section/sub_menu.html",
                "menus/section_sub_menu.html",
                "menus/sub_menu.html",
            ]
        );
    }

    #[test]
    fn test_flat_menu_names() {
        let settings = site_specific_settings();
        let site = make_site();
        let names = TemplateNames::new(&settings, Some(&site));

        let menu = names.menu(MenuKind::Flat, Some("footer"));
        let sub_menu = names.sub_menu(MenuKind::Flat, Some("footer"));

        assert_eq!(menu.len(), 14);
        assert_eq!(menu[0], "menus/www.example.com/flat/footer/menu.html");
        assert_eq!(menu[7], "menus/flat/footer/menu.html");
        assert_eq!(menu[13], "menus/flat_menu.html");
        assert_eq!(sub_menu.len(), 12);
        assert_eq!(sub_menu[6], "menus/flat/footer/sub_menu.html");
        assert_eq!(sub_menu[11], "menus/sub_menu.html");
    }

    #[test]
    fn test_sub_menu_template_none_when_unspecified() {
        let options = make_options(&OptionOverrides::new());

        for level in 2..=4 {
            assert_eq!(
                sub_menu_template_for_level(level, &options, &SubMenuTemplates::default(), &[]),
                None
            );
        }
    }

    #[test]
    fn test_sub_menu_template_settings_per_level() {
        let options = make_options(&OptionOverrides::new());
        let levels = vec!["level2.html".to_owned(), "level3.html".to_owned()];
        let class = SubMenuTemplates::default();

        assert_eq!(
            sub_menu_template_for_level(2, &options, &class, &levels).as_deref(),
            Some("level2.html")
        );
        assert_eq!(
            sub_menu_template_for_level(3, &options, &class, &levels).as_deref(),
            Some("level3.html")
        );
        assert_eq!(
            sub_menu_template_for_level(5, &options, &class, &levels).as_deref(),
            Some("level3.html")
        );
    }

    #[test]
    fn test_sub_menu_template_preference_order() {
        let settings_levels = vec!["setting.html".to_owned()];
        let mut class = SubMenuTemplates {
            template_name: Some("single_as_attr.html".to_owned()),
            template_names: vec!["attr_one.html".to_owned(), "attr_two.html".to_owned()],
        };

        let options = make_options(
            &OptionOverrides::new()
                .sub_menu_template_name("single_as_option.html")
                .sub_menu_template_names(["option_one.html", "option_two.html"]),
        );
        assert_eq!(
            sub_menu_template_for_level(4, &options, &class, &settings_levels).as_deref(),
            Some("single_as_option.html")
        );

        let options = make_options(
            &OptionOverrides::new().sub_menu_template_names(["option_one.html", "option_two.html"]),
        );
        assert_eq!(
            sub_menu_template_for_level(4, &options, &class, &settings_levels).as_deref(),
            Some("option_two.html")
        );

        let options = make_options(&OptionOverrides::new());
        assert_eq!(
            sub_menu_template_for_level(4, &options, &class, &settings_levels).as_deref(),
            Some("single_as_attr.html")
        );

        class.template_name = None;
        assert_eq!(
            sub_menu_template_for_level(4, &options, &class, &settings_levels).as_deref(),
            Some("attr_two.html")
        );

        class.template_names.clear();
        assert_eq!(
            sub_menu_template_for_level(4, &options, &class, &settings_levels).as_deref(),
            Some("setting.html")
        );
    }
}
