use crate::options::CustomFormat;
use crate::schema::SchemaExpr;
use serde_json::Value;
use std::collections::BTreeMap;

/// A raw `@name value` pair from a JSDoc comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsDocTag {
  pub name: String,
  pub value: String,
}

/// Numeric argument of `@minimum`, `@maxLength` and friends, with an optional error message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bound {
  pub value: String,
  pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Format {
  pub name: String,
  pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
  Json(Value),
  // Not valid JSON, emitted as a string literal.
  Text(String),
}

/// Refinement-relevant tags of one declaration or property.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsDocTags {
  pub description: Option<String>,
  pub minimum: Option<Bound>,
  pub maximum: Option<Bound>,
  pub min_length: Option<Bound>,
  pub max_length: Option<Bound>,
  pub format: Option<Format>,
  pub pattern: Option<String>,
  pub default: Option<DefaultValue>,
  pub strict: bool,
  pub schema: Option<String>,
  pub discriminator: Option<String>,
  pub element: Option<Box<JsDocTags>>,
}

/// Modifiers accumulated while translating a type rather than read from tags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
  pub partial: bool,
  pub required: bool,
  pub optional: bool,
  pub nullable: bool,
}

/// Body lines of a `/** ... */` comment with the delimiters and leading `*` removed.
fn comment_lines(doc: &str) -> Vec<&str> {
  let body = doc.trim();
  let body = body.strip_prefix("/**").unwrap_or(body);
  let body = body.strip_suffix("*/").unwrap_or(body);
  body
    .lines()
    .map(|l| {
      let l = l.trim();
      let l = l.strip_prefix('*').unwrap_or(l);
      l.strip_prefix(' ').unwrap_or(l).trim_end()
    })
    .collect()
}

/// Splits a JSDoc comment into its tags. A tag starts at an `@` that begins the comment or follows
/// whitespace; its value runs until the next tag.
pub fn parse_tags(doc: &str) -> Vec<JsDocTag> {
  let text = comment_lines(doc).join("\n");
  let bytes = text.as_bytes();
  let mut starts = Vec::new();
  for (i, &b) in bytes.iter().enumerate() {
    let at_boundary = i == 0 || bytes[i - 1].is_ascii_whitespace();
    let next_alpha = bytes.get(i + 1).is_some_and(|c| c.is_ascii_alphabetic());
    if b == b'@' && at_boundary && next_alpha {
      starts.push(i);
    };
  }
  let mut tags = Vec::new();
  for (n, &start) in starts.iter().enumerate() {
    let end = starts.get(n + 1).copied().unwrap_or(text.len());
    let chunk = &text[start + 1..end];
    let name_end = chunk
      .find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '-')
      .unwrap_or(chunk.len());
    tags.push(JsDocTag {
      name: chunk[..name_end].to_string(),
      value: chunk[name_end..].trim().to_string(),
    });
  }
  tags
}

fn first_line(value: &str) -> &str {
  value.lines().next().unwrap_or("").trim()
}

fn split_message(value: &str) -> (&str, Option<String>) {
  let line = first_line(value);
  match line.split_once(char::is_whitespace) {
    Some((head, rest)) if !rest.trim().is_empty() => (head, Some(rest.trim().to_string())),
    _ => (line, None),
  }
}

fn parse_bound(value: &str) -> Option<Bound> {
  let (number, message) = split_message(value);
  number.parse::<f64>().ok()?;
  Some(Bound {
    value: number.to_string(),
    message,
  })
}

fn parse_format(value: &str) -> Option<Format> {
  let (name, message) = split_message(value);
  if name.is_empty() {
    return None;
  };
  Some(Format {
    name: name.to_string(),
    message,
  })
}

fn non_empty(value: &str) -> Option<String> {
  let v = first_line(value);
  (!v.is_empty()).then(|| v.to_string())
}

impl JsDocTags {
  pub fn parse(doc: &str) -> JsDocTags {
    JsDocTags::from_tags(&parse_tags(doc))
  }

  pub fn from_tags(tags: &[JsDocTag]) -> JsDocTags {
    let mut out = JsDocTags::default();
    let mut element = JsDocTags::default();
    for tag in tags {
      let v = tag.value.as_str();
      match tag.name.as_str() {
        "description" => out.description = Some(v.trim().to_string()).filter(|d| !d.is_empty()),
        "minimum" => out.minimum = parse_bound(v),
        "maximum" => out.maximum = parse_bound(v),
        "minLength" => out.min_length = parse_bound(v),
        "maxLength" => out.max_length = parse_bound(v),
        "format" => out.format = parse_format(v),
        "pattern" => out.pattern = non_empty(v),
        "default" => {
          let raw = v.trim();
          out.default = Some(match serde_json::from_str::<Value>(raw) {
            Ok(json) => DefaultValue::Json(json),
            Err(_) => DefaultValue::Text(raw.to_string()),
          });
        }
        "strict" => out.strict = true,
        "schema" => out.schema = non_empty(v),
        "discriminator" => out.discriminator = non_empty(v),
        "elementDescription" => {
          element.description = Some(v.trim().to_string()).filter(|d| !d.is_empty())
        }
        "elementMinimum" => element.minimum = parse_bound(v),
        "elementMaximum" => element.maximum = parse_bound(v),
        "elementMinLength" => element.min_length = parse_bound(v),
        "elementMaxLength" => element.max_length = parse_bound(v),
        "elementFormat" => element.format = parse_format(v),
        "elementPattern" => element.pattern = non_empty(v),
        _ => {}
      };
    }
    if element != JsDocTags::default() {
      out.element = Some(Box::new(element));
    };
    out
  }

  /// Tags scoped to the element of an array.
  pub fn element_tags(&self) -> JsDocTags {
    self.element.as_deref().cloned().unwrap_or_default()
  }

  /// Appends the refinement chain for these tags and `mods` to `expr`, in the order
  /// bounds, format, pattern, strict, partial, optional, nullable, required, description, default.
  pub fn apply(
    &self,
    expr: SchemaExpr,
    mods: Modifiers,
    custom_formats: &BTreeMap<String, CustomFormat>,
    warnings: &mut Vec<String>,
  ) -> SchemaExpr {
    let mut expr = match &self.schema {
      Some(replacement) if !replacement.starts_with('.') => SchemaExpr::Raw(replacement.clone()),
      _ => expr,
    };
    for (number, length, method) in [
      (&self.minimum, &self.min_length, "min"),
      (&self.maximum, &self.max_length, "max"),
    ] {
      if number.is_some() && length.is_some() {
        warnings.push(format!(
          "Both a value and a length bound produce .{method}(), only one of them can hold"
        ));
      };
    }
    for (bound, method) in [
      (&self.minimum, "min"),
      (&self.maximum, "max"),
      (&self.min_length, "min"),
      (&self.max_length, "max"),
    ] {
      if let Some(b) = bound {
        let mut args = vec![SchemaExpr::Raw(b.value.clone())];
        args.extend(b.message.as_deref().map(SchemaExpr::str));
        expr = expr.call(method, args);
      };
    }
    if let Some(format) = &self.format {
      expr = apply_format(expr, format, custom_formats, warnings);
    };
    if let Some(pattern) = &self.pattern {
      expr = expr.call("regex", vec![SchemaExpr::Regex(pattern.clone())]);
    };
    if let Some(suffix) = self.schema.as_ref().filter(|s| s.starts_with('.')) {
      expr = SchemaExpr::Suffix {
        object: Box::new(expr),
        text: suffix.clone(),
      };
    };
    if self.strict {
      expr = expr.call("strict", vec![]);
    };
    if mods.partial {
      expr = expr.call("partial", vec![]);
    };
    if mods.optional {
      expr = expr.call("optional", vec![]);
    };
    let default_null = matches!(self.default, Some(DefaultValue::Json(Value::Null)));
    if mods.nullable || default_null {
      expr = expr.call("nullable", vec![]);
    };
    if mods.required {
      expr = expr.call("required", vec![]);
    };
    if let Some(description) = &self.description {
      expr = expr.call("describe", vec![SchemaExpr::str(description)]);
    };
    if let Some(default) = &self.default {
      let value = match default {
        DefaultValue::Json(json) => SchemaExpr::json(json),
        DefaultValue::Text(text) => SchemaExpr::str(text),
      };
      expr = expr.call("default", vec![value]);
    };
    expr
  }
}

fn message_arg(message: &Option<String>) -> Vec<SchemaExpr> {
  message.as_deref().map(SchemaExpr::str).into_iter().collect()
}

fn options_arg(mut entries: Vec<(String, SchemaExpr)>, message: &Option<String>) -> Vec<SchemaExpr> {
  if let Some(m) = message {
    entries.push(("message".to_string(), SchemaExpr::str(m)));
  };
  if entries.is_empty() {
    vec![]
  } else {
    vec![SchemaExpr::InlineObject(entries)]
  }
}

fn apply_format(
  expr: SchemaExpr,
  format: &Format,
  custom_formats: &BTreeMap<String, CustomFormat>,
  warnings: &mut Vec<String>,
) -> SchemaExpr {
  let msg = &format.message;
  match format.name.as_str() {
    "date-time" => expr.call(
      "datetime",
      options_arg(vec![("offset".to_string(), SchemaExpr::raw("true"))], msg),
    ),
    "time" => expr.call("time", options_arg(vec![], msg)),
    "date" | "duration" | "email" | "uuid" | "cuid" | "cuid2" | "ulid" | "emoji" | "nanoid"
    | "base64" => expr.call(&format.name, message_arg(msg)),
    "url" | "uri" => expr.call("url", message_arg(msg)),
    "ip" => expr.call("ip", options_arg(vec![], msg)),
    "ipv4" | "ipv6" => {
      let version = if format.name == "ipv4" { "v4" } else { "v6" };
      expr.call(
        "ip",
        options_arg(vec![("version".to_string(), SchemaExpr::str(version))], msg),
      )
    }
    name => match custom_formats.get(name) {
      Some(custom) => {
        let mut args = vec![SchemaExpr::Regex(custom.regex.clone())];
        args.extend(
          msg
            .as_ref()
            .or(custom.error_message.as_ref())
            .map(|m| SchemaExpr::str(m)),
        );
        expr.call("regex", args)
      }
      None => {
        warnings.push(format!("Unknown format \"{name}\" ignored"));
        expr
      }
    },
  }
}
