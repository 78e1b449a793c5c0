use crate::flatten::Flattened;
use crate::resolve::path;
use ahash::HashMap;
use parse_ts::ast::expr::Expr;
use parse_ts::ast::node::Node;
use parse_ts::ast::stmt::EnumDecl;
use parse_ts::ast::stmt::InterfaceDecl;
use parse_ts::ast::stmt::Stmt;
use parse_ts::ast::stmt::TypeAliasDecl;
use parse_ts::ast::stmt::VarDeclKind;
use parse_ts::ast::type_expr::TypeExpr;
use parse_ts::ast::type_expr::TypeMember;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclKind {
  Interface,
  TypeAlias,
  Enum,
}

/// Definition node of a declaration.
#[derive(Clone, Debug)]
pub enum DeclDef {
  Interface(Node<InterfaceDecl>),
  TypeAlias(Node<TypeAliasDecl>),
  Enum(Node<EnumDecl>),
}

/// A named interface, type alias or enum of one file, after namespace flattening.
#[derive(Clone, Debug)]
pub struct Declaration {
  pub name: String,
  pub exported: bool,
  pub default_export: bool,
  pub def: DeclDef,
  pub origin: String,
  pub doc: Option<String>,
  /// Dotted source path of a declaration lifted out of a namespace.
  pub qualified_name: Option<String>,
}

impl Declaration {
  pub fn kind(&self) -> DeclKind {
    match self.def {
      DeclDef::Interface(_) => DeclKind::Interface,
      DeclDef::TypeAlias(_) => DeclKind::TypeAlias,
      DeclDef::Enum(_) => DeclKind::Enum,
    }
  }

  /// The same declaration bound under another name, e.g. an import alias.
  pub fn renamed(&self, name: &str) -> Declaration {
    Declaration {
      name: name.to_string(),
      ..self.clone()
    }
  }

  fn with_export(&self, exported: bool, default_export: bool) -> Declaration {
    Declaration {
      exported: self.exported || exported,
      default_export: self.default_export || default_export,
      ..self.clone()
    }
  }

  /// Whether this is a record type with a property named `field`.
  pub fn has_property(&self, field: &str) -> bool {
    let members = match &self.def {
      DeclDef::Interface(i) => &i.stx.members,
      DeclDef::TypeAlias(a) => match a.stx.type_expr.stx.unparenthesized() {
        TypeExpr::Object(o) => &o.stx.members,
        _ => return false,
      },
      DeclDef::Enum(_) => return false,
    };
    members.iter().any(|m| match m.stx.as_ref() {
      TypeMember::Property(p) => p.stx.key.static_name() == Some(field),
      _ => false,
    })
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportBinding {
  pub local_name: String,
  pub source_path: String,
  pub is_relative: bool,
  /// Name exported by the source module; `default` for default imports.
  pub outer_name: String,
  pub is_default: bool,
  /// Set once the binding is found to be needed by a generated declaration.
  pub required: bool,
}

/// Value of a literal-valued `const` object member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstValue {
  String(String),
  Number(String),
  Bool(bool),
  Null,
}

/// How a file exposes one of its names to importers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Export {
  Local(String),
  Reexport { imported: String, module: String },
}

/// Declarations and module-level bindings of one flattened file.
#[derive(Clone, Debug, Default)]
pub struct Registry {
  pub file: String,
  decls: Vec<Declaration>,
  by_name: HashMap<String, usize>,
  imports: Vec<ImportBinding>,
  import_by_local: HashMap<String, usize>,
  exports: HashMap<String, Export>,
  default_export: Option<String>,
  consts: HashMap<String, Vec<(String, Option<ConstValue>)>>,
}

fn const_value(expr: &Expr) -> Option<ConstValue> {
  match expr {
    Expr::String(s) => Some(ConstValue::String(s.clone())),
    Expr::Number(n) => Some(ConstValue::Number(n.clone())),
    Expr::Bool(b) => Some(ConstValue::Bool(*b)),
    Expr::Null => Some(ConstValue::Null),
    _ => None,
  }
}

impl Registry {
  /// Scans a flattened module.
  pub fn build(file: &str, flat: &Flattened) -> Registry {
    let mut reg = Registry {
      file: file.to_string(),
      ..Registry::default()
    };
    for stmt in &flat.module.stx.body {
      let (name, exported, default_export, doc, def) = match stmt.stx.as_ref() {
        // `export default interface X` is a default export only.
        Stmt::Interface(d) => (
          &d.stx.name,
          d.stx.export && !d.stx.export_default,
          d.stx.export_default,
          &d.stx.doc,
          DeclDef::Interface(d.clone()),
        ),
        Stmt::TypeAlias(d) => (
          &d.stx.name,
          d.stx.export,
          false,
          &d.stx.doc,
          DeclDef::TypeAlias(d.clone()),
        ),
        Stmt::Enum(d) => (
          &d.stx.name,
          d.stx.export && !d.stx.export_default,
          d.stx.export_default,
          &d.stx.doc,
          DeclDef::Enum(d.clone()),
        ),
        Stmt::Import(i) => {
          let mut push = |local: &str, outer: &str, is_default: bool| {
            reg.import_by_local.insert(local.to_string(), reg.imports.len());
            reg.imports.push(ImportBinding {
              local_name: local.to_string(),
              source_path: i.stx.module.clone(),
              is_relative: path::is_relative(&i.stx.module),
              outer_name: outer.to_string(),
              is_default,
              required: false,
            });
          };
          if let Some(default) = &i.stx.default {
            push(default, "default", true);
          };
          for n in &i.stx.names {
            push(&n.local, &n.imported, n.imported == "default");
          }
          continue;
        }
        Stmt::ExportList(e) => {
          for n in &e.stx.names {
            let export = match &e.stx.from {
              Some(module) => Export::Reexport {
                imported: n.local.clone(),
                module: module.clone(),
              },
              None => Export::Local(n.local.clone()),
            };
            if n.exported == "default" {
              if let Export::Local(local) = &export {
                reg.default_export = Some(local.clone());
              };
            };
            reg.exports.insert(n.exported.clone(), export);
          }
          continue;
        }
        Stmt::ExportDefault(d) => {
          reg.default_export = Some(d.stx.name.clone());
          continue;
        }
        Stmt::VarDecl(v) if v.stx.kind == VarDeclKind::Const => {
          for d in &v.stx.declarators {
            let Some(init) = &d.stx.initializer else {
              continue;
            };
            if let Expr::Object(o) = init.stx.as_ref() {
              let members = o
                .stx
                .members
                .iter()
                .map(|m| (m.stx.key.clone(), const_value(&m.stx.value.stx)))
                .collect();
              reg.consts.insert(d.stx.name.clone(), members);
            };
          }
          continue;
        }
        _ => continue,
      };
      if let Some(&existing) = reg.by_name.get(name) {
        // Interface declarations with the same name merge their members.
        if let (DeclDef::Interface(first), DeclDef::Interface(next)) =
          (&mut reg.decls[existing].def, &def)
        {
          first.stx.members.extend(next.stx.members.iter().cloned());
        };
        continue;
      };
      if default_export {
        reg.default_export = Some(name.clone());
      };
      reg.by_name.insert(name.clone(), reg.decls.len());
      reg.decls.push(Declaration {
        name: name.clone(),
        exported,
        default_export,
        def,
        origin: file.to_string(),
        doc: doc.clone(),
        qualified_name: flat.qualified.get(name).cloned(),
      });
    }
    // `export { A }` and `export default A` apply to declarations declared anywhere in the file.
    let mut decls = Vec::with_capacity(reg.decls.len());
    for decl in &reg.decls {
      let listed = reg
        .exports
        .iter()
        .any(|(exported, e)| exported == &decl.name && e == &Export::Local(decl.name.clone()));
      let default = reg.default_export.as_deref() == Some(decl.name.as_str());
      decls.push(decl.with_export(listed, default));
    }
    reg.decls = decls;
    reg
  }

  pub fn declarations(&self) -> &[Declaration] {
    &self.decls
  }

  pub fn get(&self, name: &str) -> Option<&Declaration> {
    self.by_name.get(name).map(|&i| &self.decls[i])
  }

  pub fn imports(&self) -> &[ImportBinding] {
    &self.imports
  }

  pub fn import(&self, local_name: &str) -> Option<&ImportBinding> {
    self.import_by_local.get(local_name).map(|&i| &self.imports[i])
  }

  pub fn require_import(&mut self, local_name: &str) {
    if let Some(&i) = self.import_by_local.get(local_name) {
      self.imports[i].required = true;
    };
  }

  /// What importers get when they import `name` from this file.
  pub fn export(&self, name: &str) -> Option<Export> {
    if let Some(decl) = self.get(name) {
      if decl.exported && decl.qualified_name.is_none() {
        return Some(Export::Local(name.to_string()));
      };
    };
    self.exports.get(name).cloned()
  }

  pub fn default_export(&self) -> Option<Export> {
    if let Some(name) = &self.default_export {
      return Some(Export::Local(name.clone()));
    };
    self.exports.get("default").cloned()
  }

  /// Members of a `const` object literal; values that are not literals are None.
  pub fn const_object(&self, name: &str) -> Option<&[(String, Option<ConstValue>)]> {
    self.consts.get(name).map(Vec::as_slice)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::flatten::flatten;

  fn registry(src: &str) -> Registry {
    Registry::build("hero.ts", &flatten(parse_ts::parse(src).unwrap()))
  }

  #[test]
  fn scans_declarations_and_bindings() {
    let reg = registry(
      r#"
import Power, { Villain as Bad, type Sidekick } from "./villain";
import { z } from "zod";
/** A hero */
export interface Hero { name: string; power: Power }
interface Hero { age: number }
type Secret = string;
enum Color { Red = "red" }
export { Color };
export default Secret;
export { Planet as World } from "./planet";
export const Levels = { Low: 1, High: "high", Other: compute() } as const;
"#,
    );
    let names: Vec<_> = reg.declarations().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Hero", "Secret", "Color"]);
    let hero = reg.get("Hero").unwrap();
    assert!(hero.exported);
    assert_eq!(hero.doc.as_deref(), Some("/** A hero */"));
    assert!(hero.has_property("age"));
    assert!(reg.get("Color").unwrap().exported);
    let secret = reg.get("Secret").unwrap();
    assert!(!secret.exported && secret.default_export);
    assert_eq!(reg.default_export(), Some(Export::Local("Secret".into())));

    let power = reg.import("Power").unwrap();
    assert!(power.is_default && power.is_relative);
    let bad = reg.import("Bad").unwrap();
    assert_eq!(bad.outer_name, "Villain");
    assert!(!reg.import("z").unwrap().is_relative);
    assert_eq!(reg.import("Sidekick").unwrap().outer_name, "Sidekick");

    assert_eq!(
      reg.export("World"),
      Some(Export::Reexport {
        imported: "Planet".into(),
        module: "./planet".into()
      })
    );
    assert_eq!(reg.export("Secret"), None);
    let levels = reg.const_object("Levels").unwrap();
    assert_eq!(levels[0], ("Low".into(), Some(ConstValue::Number("1".into()))));
    assert_eq!(levels[1], ("High".into(), Some(ConstValue::String("high".into()))));
    assert_eq!(levels[2], ("Other".into(), None));
  }

  #[test]
  fn default_exported_declarations() {
    let reg = registry("export default interface Lair { depth: number }");
    let lair = reg.get("Lair").unwrap();
    assert!(!lair.exported && lair.default_export);
    assert_eq!(reg.default_export(), Some(Export::Local("Lair".into())));
    assert_eq!(reg.export("Lair"), None);
  }

  #[test]
  fn renamed_declarations_are_new_values() {
    let reg = registry("export type Villain = { name: string };");
    let villain = reg.get("Villain").unwrap();
    let bad = villain.renamed("Bad");
    assert_eq!(bad.name, "Bad");
    assert_eq!(villain.name, "Villain");
    assert_eq!(bad.kind(), DeclKind::TypeAlias);
    assert!(bad.has_property("name"));
  }
}
