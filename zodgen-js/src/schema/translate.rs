use super::ObjectEntry;
use super::SchemaExpr;
use crate::error::GenerateError;
use crate::error::GenerateResult;
use crate::jsdoc::JsDocTags;
use crate::jsdoc::Modifiers;
use crate::options::GenerateOptions;
use crate::registry::ConstValue;
use crate::registry::DeclDef;
use crate::registry::DeclKind;
use crate::registry::Declaration;
use crate::registry::Registry;
use ahash::HashMap;
use ahash::HashSet;
use ahash::HashSetExt;
use once_cell::sync::Lazy;
use parse_ts::ast::node::Node;
use parse_ts::ast::stmt::InterfaceDecl;
use parse_ts::ast::type_expr::TypeEntityName;
use parse_ts::ast::type_expr::TypeExpr;
use parse_ts::ast::type_expr::TypeFunctionParameter;
use parse_ts::ast::type_expr::TypeIndexSignature;
use parse_ts::ast::type_expr::TypeKeyword;
use parse_ts::ast::type_expr::TypeLiteral;
use parse_ts::ast::type_expr::TypeMember;
use parse_ts::ast::type_expr::TypeOperatorKind;
use parse_ts::ast::type_expr::TypeReference;
use parse_ts::ast::type_expr::TypeTuple;
use parse_ts::ast::type_expr::TypeUnion;

// Global generic types that translate to dedicated Zod constructs unless shadowed by a declaration.
static HELPERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    "Array",
    "Date",
    "Map",
    "Omit",
    "Partial",
    "Pick",
    "Promise",
    "Readonly",
    "ReadonlyArray",
    "ReadonlyMap",
    "ReadonlySet",
    "Record",
    "Required",
    "Set",
  ]
  .into_iter()
  .collect()
});

/// What a translation can see besides the declaration itself.
pub struct TranslateContext<'a> {
  pub options: &'a GenerateOptions,
  /// Registry of the file the declaration comes from.
  pub registry: &'a Registry,
  /// File-local names mapped to their generated names.
  pub names: &'a HashMap<String, String>,
  /// Generated name mapped to the type expression naming the original type, and its kind.
  pub run_types: &'a HashMap<String, (String, DeclKind)>,
}

#[derive(Debug)]
pub struct Translated {
  pub expr: SchemaExpr,
  /// Schema variable names referenced by `expr`, in first-use order.
  pub dependencies: Vec<String>,
}

// Navigation target for indexed access chains.
#[derive(Clone, Copy)]
enum Shape<'a> {
  Members(&'a [Node<TypeMember>]),
  Type(&'a TypeExpr),
}

struct Translator<'a, 'w> {
  cx: &'a TranslateContext<'a>,
  decl_name: &'a str,
  dependencies: Vec<String>,
  warnings: &'w mut Vec<String>,
}

fn no_tags() -> JsDocTags {
  JsDocTags::default()
}

impl<'a, 'w> Translator<'a, 'w> {
  fn tags(&self, doc: &Option<String>) -> JsDocTags {
    match doc {
      Some(doc) if !self.cx.options.skip_parse_jsdoc => JsDocTags::parse(doc),
      _ => no_tags(),
    }
  }

  fn comment(&self, doc: &Option<String>) -> Option<String> {
    doc.clone().filter(|_| self.cx.options.keep_comments)
  }

  fn unsupported(&mut self, what: &str) -> SchemaExpr {
    self.warnings.push(format!(
      "{}: {} is not supported, falling back to z.any()",
      self.decl_name, what
    ));
    SchemaExpr::any()
  }

  fn run_name(&self, local: &str) -> String {
    self
      .cx
      .names
      .get(local)
      .cloned()
      .unwrap_or_else(|| local.to_string())
  }

  fn is_declared(&self, local: &str) -> bool {
    self.cx.names.contains_key(local)
      || self.cx.registry.get(local).is_some()
      || self.cx.registry.import(local).is_some()
  }

  /// Identifier of the schema generated for `local`, recorded as a dependency.
  fn schema_ref(&mut self, local: &str) -> SchemaExpr {
    let var = self.cx.options.schema_name(&self.run_name(local));
    if !self.dependencies.contains(&var) {
      self.dependencies.push(var.clone());
    };
    SchemaExpr::Ident(var)
  }

  fn apply(&mut self, expr: SchemaExpr, tags: &JsDocTags, mods: Modifiers) -> SchemaExpr {
    tags.apply(expr, mods, &self.cx.options.custom_formats, self.warnings)
  }

  fn type_expr(
    &mut self,
    t: &'a Node<TypeExpr>,
    tags: &JsDocTags,
    mods: Modifiers,
  ) -> GenerateResult<SchemaExpr> {
    let mut mods = mods;
    let base = self.bare(&t.stx, tags, &mut mods)?;
    Ok(self.apply(base, tags, mods))
  }

  fn nested(&mut self, t: &'a Node<TypeExpr>) -> GenerateResult<SchemaExpr> {
    self.type_expr(t, &no_tags(), Modifiers::default())
  }

  // Translates without the refinement chain. Helper types and nullable unions record their effect in `mods`.
  fn bare(
    &mut self,
    t: &'a TypeExpr,
    tags: &JsDocTags,
    mods: &mut Modifiers,
  ) -> GenerateResult<SchemaExpr> {
    Ok(match t {
      TypeExpr::Keyword(k) => match k {
        TypeKeyword::Object => SchemaExpr::z("record", vec![SchemaExpr::any()]),
        TypeKeyword::This => self.unsupported("`this`"),
        k => SchemaExpr::z(k.as_str(), vec![]),
      },
      TypeExpr::Literal(l) => SchemaExpr::literal(match l {
        TypeLiteral::String(s) => SchemaExpr::str(s),
        TypeLiteral::Number(n) | TypeLiteral::BigInt(n) => SchemaExpr::raw(n),
        TypeLiteral::Boolean(b) => SchemaExpr::raw(if *b { "true" } else { "false" }),
      }),
      TypeExpr::Parenthesized(p) => self.bare(&p.stx.type_expr.stx, tags, mods)?,
      TypeExpr::Array(a) => {
        let element = self.type_expr(&a.stx.element_type, &tags.element_tags(), Modifiers::default())?;
        SchemaExpr::z("array", vec![element])
      }
      TypeExpr::Tuple(tu) => self.tuple(&tu.stx)?,
      TypeExpr::Union(u) => self.union(&u.stx, tags, mods)?,
      TypeExpr::Intersection(i) => {
        let mut types = i.stx.types.iter();
        let mut expr = match types.next() {
          Some(first) => self.nested(first)?,
          None => SchemaExpr::any(),
        };
        for t in types {
          let next = self.nested(t)?;
          expr = expr.call("and", vec![next]);
        }
        expr
      }
      TypeExpr::Function(f) => self.function(&f.stx.parameters, Some(&f.stx.return_type))?,
      TypeExpr::Reference(r) => self.reference(&r.stx, tags, mods)?,
      TypeExpr::Object(o) => {
        let (entries, index) = self.members(&o.stx.members)?;
        self.combine_index(entries, index)?
      }
      TypeExpr::IndexedAccess(_) => self.indexed_access(t)?,
      TypeExpr::Operator(op) => match op.stx.operator {
        TypeOperatorKind::Readonly => self.bare(&op.stx.type_expr.stx, tags, mods)?,
        TypeOperatorKind::KeyOf => self.unsupported("`keyof`"),
        TypeOperatorKind::Unique => self.unsupported("`unique symbol`"),
      },
      TypeExpr::TemplateLiteral(tl) if tl.stx.spans.is_empty() => {
        SchemaExpr::literal(SchemaExpr::str(&tl.stx.head))
      }
      TypeExpr::TemplateLiteral(_) => self.unsupported("template literal type"),
      TypeExpr::Constructor(_) => self.unsupported("constructor type"),
      TypeExpr::Query(q) => self.unsupported(&format!("`typeof {}`", q.stx.expr_name)),
      TypeExpr::Conditional(_) => self.unsupported("conditional type"),
      TypeExpr::Infer(_) => self.unsupported("`infer`"),
      TypeExpr::Mapped(_) => self.unsupported("mapped type"),
      TypeExpr::Predicate(_) => self.unsupported("type predicate"),
      TypeExpr::Import(_) => self.unsupported("import type"),
    })
  }

  fn tuple(&mut self, tuple: &'a TypeTuple) -> GenerateResult<SchemaExpr> {
    let mut items = Vec::new();
    let mut rest = None;
    let len = tuple.elements.len();
    for (i, el) in tuple.elements.iter().enumerate() {
      if el.stx.rest {
        if i + 1 != len {
          return Ok(self.unsupported("rest element before the end of a tuple"));
        };
        let element = match el.stx.type_expr.stx.unparenthesized() {
          TypeExpr::Array(a) => self.nested(&a.stx.element_type)?,
          TypeExpr::Reference(r)
            if r.stx.name.as_identifier() == Some("Array") && r.stx.type_arguments.len() == 1 =>
          {
            self.nested(&r.stx.type_arguments[0])?
          }
          _ => self.nested(&el.stx.type_expr)?,
        };
        rest = Some(element);
        continue;
      };
      let item = self.nested(&el.stx.type_expr)?;
      items.push(if el.stx.optional {
        item.call("optional", vec![])
      } else {
        item
      });
    }
    let mut expr = SchemaExpr::z("tuple", vec![SchemaExpr::Array(items)]);
    if let Some(rest) = rest {
      expr = expr.call("rest", vec![rest]);
    };
    Ok(expr)
  }

  fn discriminable(&self, member: &TypeExpr, field: &str) -> bool {
    match member.unparenthesized() {
      TypeExpr::Object(o) => o.stx.members.iter().any(|m| {
        matches!(m.stx.as_ref(), TypeMember::Property(p) if p.stx.key.static_name() == Some(field))
      }),
      TypeExpr::Reference(r) if r.stx.type_arguments.is_empty() => r
        .stx
        .name
        .as_identifier()
        .is_some_and(|n| self.has_property(n, field, 0)),
      _ => false,
    }
  }

  // Imported record types can't be inspected here, so they are taken on trust.
  fn has_property(&self, local: &str, field: &str, depth: usize) -> bool {
    if depth > 16 {
      return false;
    };
    let Some(decl) = self.cx.registry.get(local) else {
      return self.cx.registry.import(local).is_some();
    };
    if decl.has_property(field) {
      return true;
    };
    let bases: &[Node<TypeExpr>] = match &decl.def {
      DeclDef::Interface(i) => &i.stx.extends,
      DeclDef::TypeAlias(a) => std::slice::from_ref(&a.stx.type_expr),
      DeclDef::Enum(_) => &[],
    };
    bases.iter().any(|b| match b.stx.unparenthesized() {
      TypeExpr::Reference(r) if r.stx.type_arguments.is_empty() => r
        .stx
        .name
        .as_identifier()
        .is_some_and(|n| self.has_property(n, field, depth + 1)),
      _ => false,
    })
  }

  fn union(
    &mut self,
    union: &'a TypeUnion,
    tags: &JsDocTags,
    mods: &mut Modifiers,
  ) -> GenerateResult<SchemaExpr> {
    let non_null: Vec<&Node<TypeExpr>> = union
      .types
      .iter()
      .filter(|t| !matches!(t.stx.unparenthesized(), TypeExpr::Keyword(TypeKeyword::Null)))
      .collect();
    if non_null.is_empty() {
      return Ok(SchemaExpr::z("null", vec![]));
    };
    if non_null.len() == 1 {
      if non_null.len() < union.types.len() {
        mods.nullable = true;
      };
      return self.bare(&non_null[0].stx, tags, mods);
    };
    let mut members = Vec::new();
    for t in &union.types {
      members.push(self.nested(t)?);
    }
    if let Some(field) = &tags.discriminator {
      if union.types.iter().all(|t| self.discriminable(&t.stx, field)) {
        return Ok(SchemaExpr::z(
          "discriminatedUnion",
          vec![SchemaExpr::str(field), SchemaExpr::Array(members)],
        ));
      };
      self.warnings.push(format!(
        "{}: not every union member is an object with a \"{}\" property, using z.union()",
        self.decl_name, field
      ));
    };
    Ok(SchemaExpr::z("union", vec![SchemaExpr::Array(members)]))
  }

  fn function(
    &mut self,
    parameters: &'a [Node<TypeFunctionParameter>],
    return_type: Option<&'a Node<TypeExpr>>,
  ) -> GenerateResult<SchemaExpr> {
    let mut args = Vec::new();
    for p in parameters {
      if p.stx.name == "this" {
        continue;
      };
      let arg = match &p.stx.type_expr {
        Some(t) => self.nested(t)?,
        None => SchemaExpr::any(),
      };
      args.push(if p.stx.optional {
        arg.call("optional", vec![])
      } else {
        arg
      });
    }
    let returns = match return_type {
      Some(t) => self.nested(t)?,
      None => SchemaExpr::z("unknown", vec![]),
    };
    Ok(
      SchemaExpr::z("function", vec![])
        .call("args", args)
        .call("returns", vec![returns]),
    )
  }

  fn is_record_key(&self, key: &TypeExpr) -> bool {
    match key.unparenthesized() {
      TypeExpr::Keyword(TypeKeyword::String | TypeKeyword::Number) => true,
      TypeExpr::Literal(TypeLiteral::String(_) | TypeLiteral::Number(_)) => true,
      TypeExpr::Reference(_) => true,
      TypeExpr::Union(u) => u.stx.types.iter().all(|t| self.is_record_key(&t.stx)),
      _ => false,
    }
  }

  fn record(
    &mut self,
    key: &'a Node<TypeExpr>,
    value: &'a Node<TypeExpr>,
  ) -> GenerateResult<SchemaExpr> {
    if !self.is_record_key(&key.stx) {
      return Err(GenerateError::UnsupportedRecordKey {
        name: self.decl_name.to_string(),
      });
    };
    let value = self.nested(value)?;
    if matches!(key.stx.unparenthesized(), TypeExpr::Keyword(TypeKeyword::String)) {
      return Ok(SchemaExpr::z("record", vec![value]));
    };
    let key = self.nested(key)?;
    Ok(SchemaExpr::z("record", vec![key, value]))
  }

  // `{ a: true, b: true }` for Omit/Pick keys.
  fn key_mask(&self, keys: &TypeExpr) -> GenerateResult<SchemaExpr> {
    fn literal_key(t: &TypeExpr) -> Option<String> {
      match t.unparenthesized() {
        TypeExpr::Literal(TypeLiteral::String(s) | TypeLiteral::Number(s)) => Some(s.clone()),
        _ => None,
      }
    }
    let keys: Option<Vec<String>> = match keys.unparenthesized() {
      TypeExpr::Union(u) => u.stx.types.iter().map(|t| literal_key(&t.stx)).collect(),
      single => literal_key(single).map(|k| vec![k]),
    };
    let Some(keys) = keys else {
      return Err(GenerateError::UnsupportedOmitPickKeys {
        name: self.decl_name.to_string(),
      });
    };
    Ok(SchemaExpr::InlineObject(
      keys
        .into_iter()
        .map(|k| (k, SchemaExpr::raw("true")))
        .collect(),
    ))
  }

  fn reference(
    &mut self,
    r: &'a TypeReference,
    tags: &JsDocTags,
    mods: &mut Modifiers,
  ) -> GenerateResult<SchemaExpr> {
    let Some(ident) = r.name.as_identifier() else {
      return Ok(self.qualified_reference(&r.name));
    };
    let args = &r.type_arguments;
    if HELPERS.contains(ident) && !self.is_declared(ident) {
      return Ok(match (ident, args.len()) {
        ("Date", 0) => SchemaExpr::z("date", vec![]),
        ("Array" | "ReadonlyArray", 1) => {
          let element = self.type_expr(&args[0], &tags.element_tags(), Modifiers::default())?;
          SchemaExpr::z("array", vec![element])
        }
        ("Promise", 1) => SchemaExpr::z("promise", vec![self.nested(&args[0])?]),
        ("Set" | "ReadonlySet", 1) => SchemaExpr::z("set", vec![self.nested(&args[0])?]),
        ("Map" | "ReadonlyMap", 2) => {
          let key = self.nested(&args[0])?;
          let value = self.nested(&args[1])?;
          SchemaExpr::z("map", vec![key, value])
        }
        ("Partial", 1) => {
          mods.partial = true;
          self.bare(&args[0].stx, tags, mods)?
        }
        ("Required", 1) => {
          mods.required = true;
          self.bare(&args[0].stx, tags, mods)?
        }
        ("Readonly", 1) => self.bare(&args[0].stx, tags, mods)?,
        ("Record", 2) => self.record(&args[0], &args[1])?,
        ("Omit" | "Pick", 2) => {
          let base = self.nested(&args[0])?;
          let mask = self.key_mask(&args[1].stx)?;
          base.call(&ident.to_ascii_lowercase(), vec![mask])
        }
        (ident, n) => self.unsupported(&format!("`{ident}` with {n} type arguments")),
      });
    };
    Ok(self.schema_ref(ident))
  }

  // `Color.Red` where `Color` is an enum becomes `z.literal(Color.Red)`.
  fn qualified_reference(&mut self, name: &TypeEntityName) -> SchemaExpr {
    let segs = name.segments();
    let run = self.run_name(segs[0]);
    if let (Some((type_name, DeclKind::Enum)), 2) = (self.cx.run_types.get(&run), segs.len()) {
      let member = SchemaExpr::raw(&format!("{}.{}", type_name, segs[1]));
      self.schema_ref(segs[0]);
      return SchemaExpr::literal(member);
    };
    self.unsupported(&format!("qualified name `{name}`"))
  }

  fn members(
    &mut self,
    members: &'a [Node<TypeMember>],
  ) -> GenerateResult<(Vec<ObjectEntry>, Vec<&'a TypeIndexSignature>)> {
    let mut entries = Vec::new();
    let mut index = Vec::new();
    let mut seen = HashSet::new();
    for m in members {
      let (key, value, doc) = match m.stx.as_ref() {
        TypeMember::Property(p) => {
          let Some(key) = p.stx.key.static_name() else {
            self.unsupported("computed property key");
            continue;
          };
          let tags = self.tags(&p.stx.doc);
          let mods = Modifiers {
            optional: p.stx.optional,
            ..Modifiers::default()
          };
          let value = match &p.stx.type_annotation {
            Some(t) => self.type_expr(t, &tags, mods)?,
            None => self.apply(SchemaExpr::any(), &tags, mods),
          };
          (key, value, &p.stx.doc)
        }
        TypeMember::Method(method) => {
          let Some(key) = method.stx.key.static_name() else {
            self.unsupported("computed method key");
            continue;
          };
          let tags = self.tags(&method.stx.doc);
          let mods = Modifiers {
            optional: method.stx.optional,
            ..Modifiers::default()
          };
          let value = self.function(&method.stx.parameters, method.stx.return_type.as_ref())?;
          (key, self.apply(value, &tags, mods), &method.stx.doc)
        }
        TypeMember::IndexSignature(ix) => {
          index.push(ix.stx.as_ref());
          continue;
        }
        TypeMember::CallSignature(_) => {
          self.unsupported("call signature");
          continue;
        }
        TypeMember::ConstructSignature(_) => {
          self.unsupported("construct signature");
          continue;
        }
      };
      // Accessor pairs declare the same key twice.
      if !seen.insert(key) {
        continue;
      };
      entries.push(ObjectEntry {
        key: key.to_string(),
        value,
        comment: self.comment(doc),
      });
    }
    Ok((entries, index))
  }

  fn combine_index(
    &mut self,
    entries: Vec<ObjectEntry>,
    index: Vec<&'a TypeIndexSignature>,
  ) -> GenerateResult<SchemaExpr> {
    let mut records = Vec::new();
    for ix in index {
      records.push(self.record(&ix.parameter_type, &ix.type_annotation)?);
    }
    let mut records = records.into_iter();
    let mut expr = if entries.is_empty() {
      match records.next() {
        Some(first) => first,
        None => SchemaExpr::z("object", vec![SchemaExpr::Object(entries)]),
      }
    } else {
      SchemaExpr::z("object", vec![SchemaExpr::Object(entries)])
    };
    for record in records {
      expr = expr.call("and", vec![record]);
    }
    Ok(expr)
  }

  fn interface(&mut self, decl: &'a InterfaceDecl) -> GenerateResult<SchemaExpr> {
    if decl.extends_clauses > 1 {
      return Err(GenerateError::MultipleExtends {
        name: self.decl_name.to_string(),
      });
    };
    let (entries, index) = self.members(&decl.members)?;
    let mut bases = decl.extends.iter();
    let Some(first) = bases.next() else {
      return self.combine_index(entries, index);
    };
    if !index.is_empty() {
      return Err(GenerateError::IndexSignatureWithExtends {
        name: self.decl_name.to_string(),
      });
    };
    let mut expr = self.nested(first)?;
    for base in bases {
      let base = self.nested(base)?;
      expr = expr.call("extend", vec![base.member("shape")]);
    }
    if !entries.is_empty() {
      expr = expr.call("extend", vec![SchemaExpr::Object(entries)]);
    };
    Ok(expr)
  }

  fn const_values(&mut self, name: &TypeEntityName) -> SchemaExpr {
    let values = name
      .as_identifier()
      .and_then(|n| self.cx.registry.const_object(n))
      .and_then(|members| {
        members
          .iter()
          .map(|(_, v)| {
            v.as_ref().map(|v| match v {
              ConstValue::String(s) => SchemaExpr::literal(SchemaExpr::str(s)),
              ConstValue::Number(n) => SchemaExpr::literal(SchemaExpr::raw(n)),
              ConstValue::Bool(b) => SchemaExpr::literal(SchemaExpr::raw(if *b { "true" } else { "false" })),
              ConstValue::Null => SchemaExpr::z("null", vec![]),
            })
          })
          .collect::<Option<Vec<_>>>()
      });
    match values {
      Some(mut values) if values.len() == 1 => values.remove(0),
      Some(values) if !values.is_empty() => SchemaExpr::z("union", vec![SchemaExpr::Array(values)]),
      _ => self.unsupported(&format!(
        "`(typeof {name})[keyof typeof {name}]` without a literal-valued const object"
      )),
    }
  }

  fn start_shape(&self, name: &str) -> Option<Shape<'a>> {
    match &self.cx.registry.get(name)?.def {
      DeclDef::Interface(i) if i.stx.extends.is_empty() => Some(Shape::Members(&i.stx.members)),
      DeclDef::TypeAlias(a) => Some(Shape::Type(&a.stx.type_expr.stx)),
      _ => None,
    }
  }

  // Follows object literals and local references until reaching something that is not an alias.
  fn normalize_shape(&self, shape: Shape<'a>) -> Shape<'a> {
    let mut shape = shape;
    for _ in 0..16 {
      let Shape::Type(t) = shape else {
        return shape;
      };
      shape = match t.unparenthesized() {
        TypeExpr::Object(o) => Shape::Members(&o.stx.members),
        TypeExpr::Reference(r) if r.stx.type_arguments.is_empty() => {
          match r.stx.name.as_identifier().and_then(|n| self.start_shape(n)) {
            Some(next) => next,
            None => return shape,
          }
        }
        _ => return shape,
      };
    }
    shape
  }

  fn property_shape(&self, shape: Shape<'a>, key: &str) -> Option<Shape<'a>> {
    let Shape::Members(members) = self.normalize_shape(shape) else {
      return None;
    };
    members.iter().find_map(|m| match m.stx.as_ref() {
      TypeMember::Property(p) if p.stx.key.static_name() == Some(key) => {
        p.stx.type_annotation.as_ref().map(|t| Shape::Type(&t.stx))
      }
      _ => None,
    })
  }

  fn element_shape(&self, shape: Shape<'a>) -> Option<Shape<'a>> {
    let Shape::Type(t) = self.normalize_shape(shape) else {
      return None;
    };
    match t.unparenthesized() {
      TypeExpr::Array(a) => Some(Shape::Type(&a.stx.element_type.stx)),
      TypeExpr::Reference(r)
        if matches!(r.stx.name.as_identifier(), Some("Array" | "ReadonlyArray"))
          && r.stx.type_arguments.len() == 1 =>
      {
        Some(Shape::Type(&r.stx.type_arguments[0].stx))
      }
      _ => None,
    }
  }

  fn record_value_shape(&self, shape: Shape<'a>) -> Option<Shape<'a>> {
    match self.normalize_shape(shape) {
      Shape::Type(t) => match t.unparenthesized() {
        TypeExpr::Reference(r)
          if r.stx.name.as_identifier() == Some("Record") && r.stx.type_arguments.len() == 2 =>
        {
          Some(Shape::Type(&r.stx.type_arguments[1].stx))
        }
        _ => None,
      },
      Shape::Members(members) => match members {
        [only] => match only.stx.as_ref() {
          TypeMember::IndexSignature(ix) => Some(Shape::Type(&ix.stx.type_annotation.stx)),
          _ => None,
        },
        _ => None,
      },
    }
  }

  fn tuple_item_shape(&self, shape: Shape<'a>, n: usize) -> Option<Shape<'a>> {
    let Shape::Type(t) = self.normalize_shape(shape) else {
      return None;
    };
    match t.unparenthesized() {
      TypeExpr::Tuple(tu) => tu
        .stx
        .elements
        .get(n)
        .map(|el| Shape::Type(&el.stx.type_expr.stx)),
      _ => None,
    }
  }

  fn indexed_access(&mut self, t: &'a TypeExpr) -> GenerateResult<SchemaExpr> {
    let mut indices: Vec<&'a TypeExpr> = Vec::new();
    let mut object = t;
    while let TypeExpr::IndexedAccess(ia) = object.unparenthesized() {
      indices.push(&*ia.stx.index_type.stx);
      object = &*ia.stx.object_type.stx;
    }
    indices.reverse();
    // (typeof Const)[keyof typeof Const]
    if let (TypeExpr::Query(q), [index]) = (object.unparenthesized(), indices.as_slice()) {
      if let TypeExpr::Operator(op) = index.unparenthesized() {
        if let (TypeOperatorKind::KeyOf, TypeExpr::Query(q2)) =
          (op.stx.operator, op.stx.type_expr.stx.unparenthesized())
        {
          if q.stx.expr_name == q2.stx.expr_name {
            return Ok(self.const_values(&q.stx.expr_name));
          };
        };
      };
    };
    let base = match object.unparenthesized() {
      TypeExpr::Reference(r) if r.stx.type_arguments.is_empty() => r.stx.name.as_identifier(),
      _ => None,
    };
    let Some(base) = base else {
      return Ok(self.unsupported("indexed access on this type"));
    };
    let mut shape = self.start_shape(base);
    let mut expr = SchemaExpr::Ident(self.cx.options.schema_name(&self.run_name(base)));
    for index in indices {
      let step = match index.unparenthesized() {
        TypeExpr::Literal(TypeLiteral::String(key)) => {
          shape = shape.and_then(|s| self.property_shape(s, key));
          Some(expr.member("shape").member(key))
        }
        TypeExpr::Keyword(TypeKeyword::Number) => {
          shape = shape.and_then(|s| self.element_shape(s));
          Some(expr.member("element"))
        }
        TypeExpr::Literal(TypeLiteral::Number(n)) if n == "-1" => {
          let element = shape.and_then(|s| self.element_shape(s));
          let value = shape.and_then(|s| self.record_value_shape(s));
          match (element, value) {
            (Some(el), _) => {
              shape = Some(el);
              Some(expr.member("element"))
            }
            (None, Some(v)) => {
              shape = Some(v);
              Some(expr.member("valueSchema"))
            }
            (None, None) => None,
          }
        }
        TypeExpr::Literal(TypeLiteral::Number(n)) => match n.parse::<usize>() {
          Ok(i) => {
            shape = shape.and_then(|s| self.tuple_item_shape(s, i));
            Some(expr.member("items").index(n))
          }
          Err(_) => None,
        },
        _ => None,
      };
      let Some(next) = step else {
        return Ok(self.unsupported("this indexed access"));
      };
      expr = next;
    }
    self.schema_ref(base);
    Ok(expr)
  }
}

/// Translates one declaration into its schema expression.
pub fn translate(
  decl: &Declaration,
  type_name: &str,
  cx: &TranslateContext<'_>,
  warnings: &mut Vec<String>,
) -> GenerateResult<Translated> {
  let mut t = Translator {
    cx,
    decl_name: &decl.name,
    dependencies: Vec::new(),
    warnings,
  };
  let tags = t.tags(&decl.doc);
  let generic = match &decl.def {
    DeclDef::Interface(i) => !i.stx.type_parameters.is_empty(),
    DeclDef::TypeAlias(a) => !a.stx.type_parameters.is_empty(),
    DeclDef::Enum(_) => false,
  };
  if generic {
    return Err(GenerateError::GenericDeclaration {
      name: decl.name.clone(),
    });
  };
  let expr = match &decl.def {
    DeclDef::Interface(i) => {
      let expr = t.interface(&i.stx)?;
      t.apply(expr, &tags, Modifiers::default())
    }
    DeclDef::TypeAlias(a) => t.type_expr(&a.stx.type_expr, &tags, Modifiers::default())?,
    DeclDef::Enum(_) => {
      let expr = SchemaExpr::z("nativeEnum", vec![SchemaExpr::Ident(type_name.to_string())]);
      t.apply(expr, &tags, Modifiers::default())
    }
  };
  Ok(Translated {
    expr,
    dependencies: t.dependencies,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::flatten::flatten;
  use ahash::HashMapExt;

  struct Out {
    expr: String,
    dependencies: Vec<String>,
    warnings: Vec<String>,
  }

  fn translate_with(src: &str, name: &str, options: &GenerateOptions) -> GenerateResult<Out> {
    let registry = Registry::build("source.ts", &flatten(parse_ts::parse(src).unwrap()));
    let names = HashMap::new();
    let mut run_types = HashMap::new();
    for decl in registry.declarations() {
      run_types.insert(decl.name.clone(), (decl.name.clone(), decl.kind()));
    }
    let cx = TranslateContext {
      options,
      registry: &registry,
      names: &names,
      run_types: &run_types,
    };
    let decl = registry.get(name).unwrap();
    let mut warnings = Vec::new();
    let out = translate(decl, &decl.name, &cx, &mut warnings)?;
    Ok(Out {
      expr: out.expr.to_string(),
      dependencies: out.dependencies,
      warnings,
    })
  }

  fn schema(src: &str, name: &str) -> String {
    translate_with(src, name, &GenerateOptions::default())
      .unwrap()
      .expr
  }

  #[test]
  fn interface_properties() {
    let out = translate_with(
      "export interface Hero { name: string; age?: number; tags: string[]; nick: string | null; villain: Villain; born: Date }",
      "Hero",
      &GenerateOptions::default(),
    )
    .unwrap();
    assert_eq!(
      out.expr,
      "z.object({\n  name: z.string(),\n  age: z.number().optional(),\n  tags: z.array(z.string()),\n  nick: z.string().nullable(),\n  villain: villainSchema,\n  born: z.date(),\n})"
    );
    assert_eq!(out.dependencies, vec!["villainSchema"]);
    assert!(out.warnings.is_empty());
  }

  #[test]
  fn heritage_chains_extend() {
    let out = translate_with(
      "interface Base { id: string; name: string }\ninterface Extra { power: string }\nexport interface Hero extends Omit<Base, \"id\">, Extra { age: number }",
      "Hero",
      &GenerateOptions::default(),
    )
    .unwrap();
    assert_eq!(
      out.expr,
      "baseSchema.omit({ id: true }).extend(extraSchema.shape).extend({\n  age: z.number(),\n})"
    );
    assert_eq!(out.dependencies, vec!["baseSchema", "extraSchema"]);
  }

  #[test]
  fn fatal_shapes() {
    let opts = GenerateOptions::default();
    let src = "interface Base { a: string }\ninterface Gen<T> { a: T }\ntype Rec = Record<boolean, string>;\ntype Om = Omit<Base, string>;\ninterface Idx extends Base { [k: string]: string }\ninterface Twice extends Base extends Idx { b: string }";
    assert!(matches!(
      translate_with(src, "Gen", &opts),
      Err(GenerateError::GenericDeclaration { .. })
    ));
    assert!(matches!(
      translate_with(src, "Rec", &opts),
      Err(GenerateError::UnsupportedRecordKey { .. })
    ));
    assert!(matches!(
      translate_with(src, "Om", &opts),
      Err(GenerateError::UnsupportedOmitPickKeys { .. })
    ));
    assert!(matches!(
      translate_with(src, "Idx", &opts),
      Err(GenerateError::IndexSignatureWithExtends { .. })
    ));
    assert!(matches!(
      translate_with(src, "Twice", &opts),
      Err(GenerateError::MultipleExtends { ref name }) if name == "Twice"
    ));
  }

  #[test]
  fn literals_tuples_and_functions() {
    let src = r#"
type Pair = [string, number?, ...boolean[]];
type Kind = "a" | "b" | 1;
type Fn = (a: string, b?: number) => void;
type Nothing = null;
type Anything = object;
type Greeting = `hello`;
interface Api { get(id: string): Promise<Hero> }
"#;
    assert_eq!(
      schema(src, "Pair"),
      "z.tuple([z.string(), z.number().optional()]).rest(z.boolean())"
    );
    assert_eq!(
      schema(src, "Kind"),
      "z.union([z.literal(\"a\"), z.literal(\"b\"), z.literal(1)])"
    );
    assert_eq!(
      schema(src, "Fn"),
      "z.function().args(z.string(), z.number().optional()).returns(z.void())"
    );
    assert_eq!(schema(src, "Nothing"), "z.null()");
    assert_eq!(schema(src, "Anything"), "z.record(z.any())");
    assert_eq!(schema(src, "Greeting"), "z.literal(\"hello\")");
    assert_eq!(
      schema(src, "Api"),
      "z.object({\n  get: z.function().args(z.string()).returns(z.promise(heroSchema)),\n})"
    );
  }

  #[test]
  fn discriminated_unions() {
    let src = r#"
interface Cat { kind: "cat" }
interface Dog { kind: "dog" }
/** @discriminator kind */
type Pet = Cat | Dog;
/** @discriminator kind */
type Odd = Cat | string;
"#;
    assert_eq!(
      schema(src, "Pet"),
      "z.discriminatedUnion(\"kind\", [catSchema, dogSchema])"
    );

    let src = r#"
import { Cat } from "./cat";
interface Base { kind: "dog" }
interface Dog extends Base { bark: boolean }
type Puppy = Dog;
interface Fish { fins: number }
/** @discriminator kind */
type Pet = Puppy | Cat;
/** @discriminator kind */
type Wet = Fish | Cat;
"#;
    assert_eq!(
      schema(src, "Pet"),
      "z.discriminatedUnion(\"kind\", [puppySchema, catSchema])"
    );
    let wet = translate_with(src, "Wet", &GenerateOptions::default()).unwrap();
    assert_eq!(wet.expr, "z.union([fishSchema, catSchema])");
    assert_eq!(wet.warnings.len(), 1);
    let odd = translate_with(src, "Odd", &GenerateOptions::default()).unwrap();
    assert_eq!(odd.expr, "z.union([catSchema, z.string()])");
    assert_eq!(odd.warnings.len(), 1);
  }

  #[test]
  fn indexed_access_and_const_objects() {
    let src = r#"
export interface Hero { skills: string[]; pair: [string, number]; meta: { level: number } }
export type Skill = Hero["skills"][number];
export type Second = Hero["pair"][1];
export type Level = Hero["meta"]["level"];
export const Colors = { Red: "red", Blue: "blue" } as const;
export type Color = (typeof Colors)[keyof typeof Colors];
export interface Guild { members: Hero[]; ranks: Record<string, number> }
export type Member = Guild["members"][-1];
export type Rank = Guild["ranks"][-1];
"#;
    let skill = translate_with(src, "Skill", &GenerateOptions::default()).unwrap();
    assert_eq!(skill.expr, "heroSchema.shape.skills.element");
    assert_eq!(skill.dependencies, vec!["heroSchema"]);
    assert_eq!(schema(src, "Second"), "heroSchema.shape.pair.items[1]");
    assert_eq!(schema(src, "Level"), "heroSchema.shape.meta.shape.level");
    assert_eq!(
      schema(src, "Color"),
      "z.union([z.literal(\"red\"), z.literal(\"blue\")])"
    );
    assert_eq!(schema(src, "Member"), "guildSchema.shape.members.element");
    assert_eq!(schema(src, "Rank"), "guildSchema.shape.ranks.valueSchema");
  }

  #[test]
  fn enums_and_helpers() {
    let src = r#"
enum Color { Red = "red" }
type Red = Color.Red;
type Pets = Map<string, Promise<number>>;
type Loose = Partial<Hero>;
type Dict = Record<string, number>;
type ById = Record<"a" | "b", Hero>;
interface Bag { [key: string]: number }
interface Mixed { name: string; [key: string]: string }
type Ids = Set<string>;
type Full = Required<Hero>;
type Names = ReadonlyArray<string>;
"#;
    assert_eq!(schema(src, "Color"), "z.nativeEnum(Color)");
    let red = translate_with(src, "Red", &GenerateOptions::default()).unwrap();
    assert_eq!(red.expr, "z.literal(Color.Red)");
    assert_eq!(red.dependencies, vec!["colorSchema"]);
    assert_eq!(
      schema(src, "Pets"),
      "z.map(z.string(), z.promise(z.number()))"
    );
    assert_eq!(schema(src, "Loose"), "heroSchema.partial()");
    assert_eq!(schema(src, "Dict"), "z.record(z.number())");
    assert_eq!(
      schema(src, "ById"),
      "z.record(z.union([z.literal(\"a\"), z.literal(\"b\")]), heroSchema)"
    );
    assert_eq!(schema(src, "Bag"), "z.record(z.number())");
    assert_eq!(
      schema(src, "Mixed"),
      "z.object({\n  name: z.string(),\n}).and(z.record(z.string()))"
    );
    assert_eq!(schema(src, "Ids"), "z.set(z.string())");
    assert_eq!(schema(src, "Full"), "heroSchema.required()");
    assert_eq!(schema(src, "Names"), "z.array(z.string())");
  }

  #[test]
  fn property_tags_and_comments() {
    let src = r#"
export interface Hero {
  /**
   * The name
   * @minLength 2
   */
  name: string;
  /** @default 1 */
  level?: number;
  /** @elementFormat email */
  emails: string[];
  /** @elementMinimum 0 @minLength 1 */
  scores: number[];
  /** @elementPattern ^[A-Z]+$ */
  codes: Array<string>;
}
"#;
    assert_eq!(
      schema(src, "Hero"),
      "z.object({\n  name: z.string().min(2),\n  level: z.number().optional().default(1),\n  emails: z.array(z.string().email()),\n  scores: z.array(z.number().min(0)).min(1),\n  codes: z.array(z.string().regex(/^[A-Z]+$/)),\n})"
    );
    let kept = translate_with(src, "Hero", &GenerateOptions::default().with_keep_comments(true))
      .unwrap()
      .expr;
    assert!(kept.contains("The name"));
    let skipped =
      translate_with(src, "Hero", &GenerateOptions::default().with_skip_parse_jsdoc(true))
        .unwrap()
        .expr;
    assert!(skipped.contains("name: z.string(),"));
  }

  #[test]
  fn unsupported_types_warn() {
    let out = translate_with("type K = keyof Hero;", "K", &GenerateOptions::default()).unwrap();
    assert_eq!(out.expr, "z.any()");
    assert_eq!(
      out.warnings,
      vec!["K: `keyof` is not supported, falling back to z.any()".to_string()]
    );
  }
}
