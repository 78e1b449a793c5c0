use crate::jsdoc::JsDocTag;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub type NameFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;
pub type JsDocTagFilter = Arc<dyn Fn(&[JsDocTag]) -> bool + Send + Sync>;
pub type SchemaNameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A caller-registered `@format` value, validated with a regular expression.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFormat {
  /// Regular expression source, without the surrounding slashes.
  pub regex: String,
  pub error_message: Option<String>,
}

/// Options controlling which declarations are generated and how.
#[derive(Clone)]
pub struct GenerateOptions {
  /// Keeps only root declarations whose name passes. Dependencies are still pulled in.
  pub name_filter: Option<NameFilter>,
  /// Keeps only root declarations whose parsed JSDoc tags pass.
  pub jsdoc_tag_filter: Option<JsDocTagFilter>,
  /// Maps a type name to its schema variable name.
  pub get_schema_name: SchemaNameFn,
  /// Re-emit JSDoc comments above statements and object entries.
  pub keep_comments: bool,
  /// Ignore JSDoc tags entirely.
  pub skip_parse_jsdoc: bool,
  pub custom_formats: BTreeMap<String, CustomFormat>,
  /// Host id of the source text, used to resolve relative imports.
  pub source_file: String,
}

impl Default for GenerateOptions {
  /// All declarations, `camelCase` + `Schema` variable names, comments dropped and JSDoc tags parsed.
  fn default() -> Self {
    Self {
      name_filter: None,
      jsdoc_tag_filter: None,
      get_schema_name: Arc::new(default_schema_name),
      keep_comments: false,
      skip_parse_jsdoc: false,
      custom_formats: BTreeMap::new(),
      source_file: "source.ts".to_string(),
    }
  }
}

impl GenerateOptions {
  pub fn with_name_filter(mut self, filter: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
    self.name_filter = Some(Arc::new(filter));
    self
  }

  pub fn with_jsdoc_tag_filter(
    mut self,
    filter: impl Fn(&[JsDocTag]) -> bool + Send + Sync + 'static,
  ) -> Self {
    self.jsdoc_tag_filter = Some(Arc::new(filter));
    self
  }

  pub fn with_schema_name(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
    self.get_schema_name = Arc::new(f);
    self
  }

  pub fn with_keep_comments(mut self, keep_comments: bool) -> Self {
    self.keep_comments = keep_comments;
    self
  }

  pub fn with_skip_parse_jsdoc(mut self, skip_parse_jsdoc: bool) -> Self {
    self.skip_parse_jsdoc = skip_parse_jsdoc;
    self
  }

  pub fn with_custom_format(mut self, name: impl Into<String>, format: CustomFormat) -> Self {
    self.custom_formats.insert(name.into(), format);
    self
  }

  pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
    self.source_file = source_file.into();
    self
  }

  pub(crate) fn schema_name(&self, type_name: &str) -> String {
    (self.get_schema_name)(type_name)
  }
}

impl fmt::Debug for GenerateOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GenerateOptions")
      .field("name_filter", &self.name_filter.is_some())
      .field("jsdoc_tag_filter", &self.jsdoc_tag_filter.is_some())
      .field("keep_comments", &self.keep_comments)
      .field("skip_parse_jsdoc", &self.skip_parse_jsdoc)
      .field("custom_formats", &self.custom_formats)
      .field("source_file", &self.source_file)
      .finish()
  }
}

/// `HeroContact` => `heroContactSchema`, `HTMLElement` => `htmlElementSchema`, `hero_id` => `heroIdSchema`.
pub fn default_schema_name(type_name: &str) -> String {
  format!("{}Schema", camel_case(type_name))
}

fn camel_case(name: &str) -> String {
  let chars: Vec<char> = name.chars().collect();
  let mut out = String::with_capacity(name.len());
  let mut upper_next = false;
  let mut leading = true;
  for (i, &c) in chars.iter().enumerate() {
    if c == '_' || c == '-' || c == ' ' {
      upper_next = !out.is_empty();
      leading = false;
      continue;
    };
    if leading && c.is_uppercase() {
      // Lowercase the leading run of capitals, except the last one when it begins a word (`HTMLElement`).
      let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
      if i > 0 && next_lower {
        out.push(c);
        leading = false;
      } else {
        out.extend(c.to_lowercase());
      }
      continue;
    };
    leading = false;
    if upper_next {
      out.extend(c.to_uppercase());
      upper_next = false;
    } else {
      out.push(c);
    };
  }
  out
}

#[cfg(test)]
mod tests {
  use super::default_schema_name;

  #[test]
  fn schema_names() {
    assert_eq!(default_schema_name("Hero"), "heroSchema");
    assert_eq!(default_schema_name("HeroContact"), "heroContactSchema");
    assert_eq!(default_schema_name("HTMLElement"), "htmlElementSchema");
    assert_eq!(default_schema_name("ID"), "idSchema");
    assert_eq!(default_schema_name("hero_id"), "heroIdSchema");
    assert_eq!(default_schema_name("MetropolisName"), "metropolisNameSchema");
  }
}
