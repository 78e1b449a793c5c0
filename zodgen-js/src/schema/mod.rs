use itertools::Itertools;
use serde_json::Value;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

pub mod translate;

/// A Zod construction expression.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaExpr {
  Ident(String),
  Str(String),
  // Numbers, booleans, `null` and other source text emitted verbatim.
  Raw(String),
  Call {
    callee: Box<SchemaExpr>,
    method: String,
    args: Vec<SchemaExpr>,
  },
  Member {
    object: Box<SchemaExpr>,
    property: String,
  },
  Index {
    object: Box<SchemaExpr>,
    index: String,
  },
  /// Object literal printed one entry per line, such as the shape passed to `z.object`.
  Object(Vec<ObjectEntry>),
  /// Object literal printed on one line, such as `{ version: "v4" }` or `{ name: true }`.
  InlineObject(Vec<(String, SchemaExpr)>),
  Array(Vec<SchemaExpr>),
  Regex(String),
  /// `() => body`
  Thunk(Box<SchemaExpr>),
  /// Source text appended verbatim, from `@schema .trim()`.
  Suffix {
    object: Box<SchemaExpr>,
    text: String,
  },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectEntry {
  pub key: String,
  pub value: SchemaExpr,
  pub comment: Option<String>,
}

impl SchemaExpr {
  /// `z.<method>(<args>)`
  pub fn z(method: &str, args: Vec<SchemaExpr>) -> SchemaExpr {
    SchemaExpr::Ident("z".to_string()).call(method, args)
  }

  pub fn call(self, method: &str, args: Vec<SchemaExpr>) -> SchemaExpr {
    SchemaExpr::Call {
      callee: Box::new(self),
      method: method.to_string(),
      args,
    }
  }

  pub fn member(self, property: &str) -> SchemaExpr {
    SchemaExpr::Member {
      object: Box::new(self),
      property: property.to_string(),
    }
  }

  pub fn index(self, index: &str) -> SchemaExpr {
    SchemaExpr::Index {
      object: Box::new(self),
      index: index.to_string(),
    }
  }

  pub fn str(value: &str) -> SchemaExpr {
    SchemaExpr::Str(value.to_string())
  }

  pub fn raw(text: &str) -> SchemaExpr {
    SchemaExpr::Raw(text.to_string())
  }

  /// `z.any()`, the fallback for anything that cannot be translated.
  pub fn any() -> SchemaExpr {
    SchemaExpr::z("any", vec![])
  }

  pub fn literal(value: SchemaExpr) -> SchemaExpr {
    SchemaExpr::z("literal", vec![value])
  }

  pub fn json(value: &Value) -> SchemaExpr {
    match value {
      Value::String(s) => SchemaExpr::Str(s.clone()),
      Value::Array(items) => SchemaExpr::Array(items.iter().map(SchemaExpr::json).collect()),
      Value::Object(map) => SchemaExpr::InlineObject(
        map
          .iter()
          .map(|(k, v)| (k.clone(), SchemaExpr::json(v)))
          .collect(),
      ),
      other => SchemaExpr::Raw(other.to_string()),
    }
  }

  fn print(&self, out: &mut String, indent: usize) {
    match self {
      SchemaExpr::Ident(name) => out.push_str(name),
      SchemaExpr::Str(value) => out.push_str(&quote(value)),
      SchemaExpr::Raw(text) => out.push_str(text),
      SchemaExpr::Call {
        callee,
        method,
        args,
      } => {
        callee.print(out, indent);
        out.push('.');
        out.push_str(method);
        out.push('(');
        for (i, arg) in args.iter().enumerate() {
          if i > 0 {
            out.push_str(", ");
          };
          arg.print(out, indent);
        }
        out.push(')');
      }
      SchemaExpr::Member { object, property } => {
        object.print(out, indent);
        if is_identifier(property) {
          out.push('.');
          out.push_str(property);
        } else {
          out.push('[');
          out.push_str(&quote(property));
          out.push(']');
        };
      }
      SchemaExpr::Index { object, index } => {
        object.print(out, indent);
        out.push('[');
        out.push_str(index);
        out.push(']');
      }
      SchemaExpr::Object(entries) => {
        if entries.is_empty() {
          out.push_str("{}");
          return;
        };
        let pad = " ".repeat(indent + 2);
        out.push_str("{\n");
        for entry in entries {
          if let Some(comment) = &entry.comment {
            out.push_str(&reindent_comment(comment, &pad));
            out.push('\n');
          };
          out.push_str(&pad);
          out.push_str(&property_key(&entry.key));
          out.push_str(": ");
          entry.value.print(out, indent + 2);
          out.push_str(",\n");
        }
        out.push_str(&" ".repeat(indent));
        out.push('}');
      }
      SchemaExpr::InlineObject(entries) => {
        if entries.is_empty() {
          out.push_str("{}");
          return;
        };
        out.push_str("{ ");
        for (i, (key, value)) in entries.iter().enumerate() {
          if i > 0 {
            out.push_str(", ");
          };
          out.push_str(&property_key(key));
          out.push_str(": ");
          value.print(out, indent);
        }
        out.push_str(" }");
      }
      SchemaExpr::Array(items) => {
        out.push('[');
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            out.push_str(", ");
          };
          item.print(out, indent);
        }
        out.push(']');
      }
      SchemaExpr::Regex(source) => {
        out.push('/');
        out.push_str(&escape_regex(source));
        out.push('/');
      }
      SchemaExpr::Thunk(body) => {
        out.push_str("() => ");
        body.print(out, indent);
      }
      SchemaExpr::Suffix { object, text } => {
        object.print(out, indent);
        out.push_str(text);
      }
    };
  }

  /// Renders at the given starting indentation.
  pub fn render(&self, indent: usize) -> String {
    let mut out = String::new();
    self.print(&mut out, indent);
    out
  }
}

impl Display for SchemaExpr {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(&self.render(0))
  }
}

pub fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  chars
    .next()
    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn property_key(key: &str) -> String {
  if is_identifier(key) {
    key.to_string()
  } else {
    quote(key)
  }
}

/// Double-quoted string literal.
pub fn quote(value: &str) -> String {
  // Serializing a str cannot fail.
  serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

// Escapes `/` not already escaped so the source fits in a regex literal.
fn escape_regex(source: &str) -> String {
  let mut out = String::with_capacity(source.len());
  let mut escaped = false;
  for c in source.chars() {
    if c == '/' && !escaped {
      out.push('\\');
    };
    escaped = c == '\\' && !escaped;
    out.push(c);
  }
  out
}

/// Re-indents a raw `/** ... */` comment so every line starts at `pad`.
pub fn reindent_comment(comment: &str, pad: &str) -> String {
  comment
    .lines()
    .enumerate()
    .map(|(i, line)| {
      let line = line.trim();
      if i == 0 {
        format!("{pad}{line}")
      } else {
        format!("{pad} {line}")
      }
    })
    .join("\n")
}

/// How the generated schema module refers to a declaration's original type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImportedAs {
  Named(String),
  Default,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeImport {
  /// Module specifier of the origin file relative to the source file; None for the source file itself.
  pub path: Option<String>,
  pub imported: ImportedAs,
  pub local: String,
}

/// One `const <var> = <schema>;` of the output.
#[derive(Clone, Debug)]
pub struct Statement {
  pub var_name: String,
  /// Declaration name in this run, after namespace flattening and import renaming.
  pub name: String,
  /// Type expression naming the original type, such as `Metropolis.Name`.
  pub type_name: String,
  pub initializer: Option<SchemaExpr>,
  /// Explicit binding type, set when the statement is wrapped in `z.lazy`.
  pub type_annotation: Option<String>,
  /// Schema variable names referenced by the initializer.
  pub dependencies: Vec<String>,
  pub requires_type_import: bool,
  pub is_exported: bool,
  /// Declared in the source file rather than a foreign file.
  pub is_root: bool,
  pub import: TypeImport,
  pub comment: Option<String>,
}

impl Statement {
  pub fn render(&self) -> String {
    let mut out = String::new();
    if let Some(comment) = &self.comment {
      out.push_str(&reindent_comment(comment, ""));
      out.push('\n');
    };
    if self.is_exported {
      out.push_str("export ");
    };
    out.push_str("const ");
    out.push_str(&self.var_name);
    if let Some(annotation) = &self.type_annotation {
      out.push_str(": ");
      out.push_str(annotation);
    };
    out.push_str(" = ");
    match &self.initializer {
      Some(init) => init.print(&mut out, 0),
      None => out.push_str("undefined"),
    };
    out.push(';');
    out
  }
}

#[cfg(test)]
mod tests {
  use super::ObjectEntry;
  use super::SchemaExpr;

  #[test]
  fn prints_nested_objects() {
    let inner = SchemaExpr::z(
      "object",
      vec![SchemaExpr::Object(vec![ObjectEntry {
        key: "city".into(),
        value: SchemaExpr::z("string", vec![]),
        comment: None,
      }])],
    );
    let expr = SchemaExpr::z(
      "object",
      vec![SchemaExpr::Object(vec![
        ObjectEntry {
          key: "name".into(),
          value: SchemaExpr::z("string", vec![]).call("optional", vec![]),
          comment: Some("/**\n   * The name\n   */".into()),
        },
        ObjectEntry {
          key: "home-town".into(),
          value: inner,
          comment: None,
        },
      ])],
    );
    assert_eq!(
      expr.to_string(),
      "z.object({\n  /**\n   * The name\n   */\n  name: z.string().optional(),\n  \"home-town\": z.object({\n    city: z.string(),\n  }),\n})"
    );
  }

  #[test]
  fn prints_accessors_and_literals() {
    let expr = SchemaExpr::Ident("heroSchema".into())
      .member("shape")
      .member("items")
      .member("element");
    assert_eq!(expr.to_string(), "heroSchema.shape.items.element");
    let expr = SchemaExpr::Ident("pairSchema".into())
      .member("items")
      .index("1");
    assert_eq!(expr.to_string(), "pairSchema.items[1]");
    assert_eq!(
      SchemaExpr::Ident("a".into()).member("two words").to_string(),
      "a[\"two words\"]"
    );
    assert_eq!(
      SchemaExpr::literal(SchemaExpr::str("a\"b")).to_string(),
      "z.literal(\"a\\\"b\")"
    );
    assert_eq!(SchemaExpr::Regex("a/b\\/c".into()).to_string(), "/a\\/b\\/c/");
  }

  #[test]
  fn prints_json_defaults() {
    let value = serde_json::json!({ "a": [1, "x"], "b c": null });
    assert_eq!(
      SchemaExpr::json(&value).to_string(),
      "{ a: [1, \"x\"], \"b c\": null }"
    );
  }
}
