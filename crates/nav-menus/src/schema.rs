//! JSON schemas for pages embedded in rendered menus.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use nav_tree::Page;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::ValidationErrors;

/// A page attribute that can appear in JSON output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageField {
    Id,
    Title,
    Slug,
    /// Concrete page type name.
    Type,
    Depth,
    /// Site-relative URL.
    Url,
}

impl PageField {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Title,
        Self::Slug,
        Self::Type,
        Self::Depth,
        Self::Url,
    ];

    /// Key used in JSON output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Slug => "slug",
            Self::Type => "type",
            Self::Depth => "depth",
            Self::Url => "url",
        }
    }

    fn value(self, page: &Page) -> Value {
        match self {
            Self::Id => json!(page.id),
            Self::Title => json!(page.title),
            Self::Slug => json!(page.slug),
            Self::Type => json!(page.content_type),
            Self::Depth => json!(page.depth),
            Self::Url => json!(page.url_path),
        }
    }
}

impl fmt::Display for PageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageField {
    type Err = ValidationErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s.trim())
            .ok_or_else(|| {
                let allowed = Self::ALL.map(Self::name).join(", ");
                ValidationErrors::for_field(
                    "fields",
                    format!("'{s}' is not a valid page field. Choose from: {allowed}"),
                )
            })
    }
}

/// Ordered list of fields rendered for a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSchema {
    fields: Vec<PageField>,
}

impl Default for PageSchema {
    fn default() -> Self {
        Self::new(vec![PageField::Id, PageField::Title, PageField::Slug])
    }
}

impl PageSchema {
    #[must_use]
    pub fn new(fields: Vec<PageField>) -> Self {
        Self { fields }
    }

    /// Parse field names, reporting every unknown one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] on the `fields` key.
    pub fn from_names<I, S>(names: I) -> Result<Self, ValidationErrors>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut errors = ValidationErrors::new();
        let mut fields = Vec::new();
        for name in names {
            match name.as_ref().parse::<PageField>() {
                Ok(field) if !fields.contains(&field) => fields.push(field),
                Ok(_) => {}
                Err(e) => errors.extend(e),
            }
        }
        errors.into_result()?;
        Ok(Self::new(fields))
    }

    #[must_use]
    pub fn fields(&self) -> &[PageField] {
        &self.fields
    }

    /// Render `page` as a JSON object.
    #[must_use]
    pub fn render(&self, page: &Page) -> Value {
        let obj: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name().to_owned(), field.value(page)))
            .collect();
        Value::Object(obj)
    }
}

/// Schemas by page type.
///
/// Lookup order: the override (if set), then the schema registered for the
/// page's content type, then the default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageSchemaRegistry {
    by_type: HashMap<String, PageSchema>,
    default: PageSchema,
    override_schema: Option<PageSchema>,
}

impl PageSchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fallback schema.
    #[must_use]
    pub fn with_default(mut self, schema: PageSchema) -> Self {
        self.default = schema;
        self
    }

    /// Use `schema` for every page regardless of type.
    #[must_use]
    pub fn with_override(mut self, schema: PageSchema) -> Self {
        self.override_schema = Some(schema);
        self
    }

    /// Use `schema` for pages of `content_type`.
    #[must_use]
    pub fn register(mut self, content_type: impl Into<String>, schema: PageSchema) -> Self {
        self.by_type.insert(content_type.into(), schema);
        self
    }

    #[must_use]
    pub fn schema_for(&self, content_type: &str) -> &PageSchema {
        self.override_schema
            .as_ref()
            .or_else(|| self.by_type.get(content_type))
            .unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_page() -> Page {
        Page {
            id: 7,
            title: "Contact us".to_owned(),
            slug: "contact".to_owned(),
            content_type: "ContactPage".to_owned(),
            path: "000100010003".to_owned(),
            depth: 3,
            url_path: "/contact/".to_owned(),
            live: true,
            expired: false,
            show_in_menus: true,
            specific: None,
        }
    }

    #[test]
    fn test_default_schema_renders_id_title_slug() {
        let json = PageSchema::default().render(&make_page());

        assert_eq!(json, json!({"id": 7, "title": "Contact us", "slug": "contact"}));
    }

    #[test]
    fn test_from_names_rejects_unknown_fields() {
        let errors = PageSchema::from_names(["id", "colour", "size"]).unwrap_err();

        assert_eq!(errors.field("fields").len(), 2);
        assert!(errors.field("fields")[0].starts_with("'colour' is not a valid page field"));
    }

    #[test]
    fn test_from_names_skips_duplicates() {
        let schema = PageSchema::from_names(["url", "type", "url"]).unwrap();

        assert_eq!(schema.fields(), [PageField::Url, PageField::Type]);
        assert_eq!(
            schema.render(&make_page()),
            json!({"url": "/contact/", "type": "ContactPage"})
        );
    }

    #[test]
    fn test_registry_lookup_order() {
        let by_type = PageSchema::new(vec![PageField::Title]);
        let forced = PageSchema::new(vec![PageField::Depth]);
        let registry = PageSchemaRegistry::new().register("ContactPage", by_type.clone());

        assert_eq!(registry.schema_for("ContactPage"), &by_type);
        assert_eq!(registry.schema_for("Page"), &PageSchema::default());

        let registry = registry.with_override(forced.clone());
        assert_eq!(registry.schema_for("ContactPage"), &forced);
    }

    #[test]
    fn test_page_field_serde_names() {
        assert_eq!(serde_json::to_value(PageField::Type).unwrap(), json!("type"));
        assert_eq!("depth".parse::<PageField>().unwrap(), PageField::Depth);
    }
}
