use ahash::HashMap;
use ahash::HashMapExt;
use derive_visitor::DriveMut;
use derive_visitor::VisitorMut;
use itertools::Itertools;
use parse_ts::ast::node::Node;
use parse_ts::ast::stmt::Stmt;
use parse_ts::ast::type_expr::TypeEntityName;
use parse_ts::ast::type_expr::TypeQuery;
use parse_ts::ast::type_expr::TypeReference;
use parse_ts::ast::Module;

type TypeReferenceNode = Node<TypeReference>;
type TypeQueryNode = Node<TypeQuery>;

/// A module with every namespace lifted to the top level.
pub struct Flattened {
  pub module: Node<Module>,
  /// Flat name of each lifted declaration mapped to its dotted source path, e.g. `MetropolisName` to
  /// `Metropolis.Name`.
  pub qualified: HashMap<String, String>,
}

// Rewrites references that name a lifted declaration, looked up from the innermost enclosing namespace
// outwards. A partially matching qualified name keeps its remaining segments (`Ns.Color.Red`).
#[derive(VisitorMut)]
#[visitor(TypeReferenceNode(enter), TypeQueryNode(enter))]
struct RenameLifted<'a> {
  scope: &'a [String],
  lifted: &'a HashMap<String, String>,
}

impl RenameLifted<'_> {
  fn rewrite(&self, name: &TypeEntityName) -> Option<TypeEntityName> {
    let segs = name.segments();
    for depth in (0..=self.scope.len()).rev() {
      for len in (1..=segs.len()).rev() {
        let key = self.scope[..depth]
          .iter()
          .map(String::as_str)
          .chain(segs[..len].iter().copied())
          .join(".");
        if let Some(flat) = self.lifted.get(&key) {
          let mut renamed = vec![flat.as_str()];
          renamed.extend_from_slice(&segs[len..]);
          return TypeEntityName::from_segments(&renamed);
        };
      }
    }
    None
  }

  fn enter_type_reference_node(&mut self, node: &mut TypeReferenceNode) {
    if let Some(renamed) = self.rewrite(&node.stx.name) {
      node.stx.name = renamed;
    };
  }

  fn enter_type_query_node(&mut self, node: &mut TypeQueryNode) {
    if let Some(renamed) = self.rewrite(&node.stx.expr_name) {
      node.stx.expr_name = renamed;
    };
  }
}

fn collect(body: &[Node<Stmt>], path: &[String], lifted: &mut HashMap<String, String>) {
  for stmt in body {
    let Stmt::Namespace(ns) = stmt.stx.as_ref() else {
      continue;
    };
    let mut inner = path.to_vec();
    inner.push(ns.stx.name.clone());
    let prefix = inner.concat();
    let dotted = inner.join(".");
    for member in &ns.stx.body {
      let names: Vec<&str> = match member.stx.as_ref() {
        Stmt::Interface(_) | Stmt::TypeAlias(_) | Stmt::Enum(_) => {
          member.stx.decl_name().into_iter().collect()
        }
        Stmt::VarDecl(v) => v.stx.declarators.iter().map(|d| d.stx.name.as_str()).collect(),
        _ => Vec::new(),
      };
      for name in names {
        lifted.insert(format!("{dotted}.{name}"), format!("{prefix}{name}"));
      }
    }
    collect(&ns.stx.body, &inner, lifted);
  }
}

struct Lifter<'a> {
  lifted: &'a HashMap<String, String>,
  qualified: HashMap<String, String>,
  out: Vec<Node<Stmt>>,
}

impl Lifter<'_> {
  fn lift(&mut self, stmt: Node<Stmt>, scope: &[String], visible: bool) {
    let prefix = scope.concat();
    let dotted = |name: &str| {
      let mut path = scope.to_vec();
      path.push(name.to_string());
      path.join(".")
    };
    let loc = stmt.loc;
    let mut stmt = match *stmt.stx {
      Stmt::Namespace(ns) => {
        let mut inner = scope.to_vec();
        inner.push(ns.stx.name.clone());
        let visible = visible && ns.stx.export;
        for member in ns.stx.body {
          self.lift(member, &inner, visible);
        }
        return;
      }
      other => Node::new(loc, other),
    };
    stmt.drive_mut(&mut RenameLifted {
      scope,
      lifted: self.lifted,
    });
    if scope.is_empty() {
      self.out.push(stmt);
      return;
    };
    match stmt.stx.as_mut() {
      Stmt::Interface(d) => {
        self.qualified.insert(format!("{prefix}{}", d.stx.name), dotted(&d.stx.name));
        d.stx.name = format!("{prefix}{}", d.stx.name);
        d.stx.export &= visible;
      }
      Stmt::TypeAlias(d) => {
        self.qualified.insert(format!("{prefix}{}", d.stx.name), dotted(&d.stx.name));
        d.stx.name = format!("{prefix}{}", d.stx.name);
        d.stx.export &= visible;
      }
      Stmt::Enum(d) => {
        self.qualified.insert(format!("{prefix}{}", d.stx.name), dotted(&d.stx.name));
        d.stx.name = format!("{prefix}{}", d.stx.name);
        d.stx.export &= visible;
      }
      Stmt::VarDecl(v) => {
        for d in v.stx.declarators.iter_mut() {
          d.stx.name = format!("{prefix}{}", d.stx.name);
        }
        v.stx.export &= visible;
      }
      // Imports, exports and other statements inside a namespace body are dropped.
      _ => return,
    };
    self.out.push(stmt);
  }
}

/// Lifts namespace-scoped declarations to the top level, renaming each to the concatenation of its
/// namespace path and name (`namespace A { namespace B { type C } }` declares `ABC`). References to
/// lifted declarations are rewritten wherever they resolve to them: unqualified inside their namespace,
/// qualified (`A.B.C`) anywhere.
pub fn flatten(module: Node<Module>) -> Flattened {
  let mut lifted = HashMap::new();
  collect(&module.stx.body, &[], &mut lifted);
  let loc = module.loc;
  let mut lifter = Lifter {
    lifted: &lifted,
    qualified: HashMap::new(),
    out: Vec::new(),
  };
  for stmt in module.stx.body {
    lifter.lift(stmt, &[], true);
  }
  Flattened {
    module: Node::new(loc, Module { body: lifter.out }),
    qualified: lifter.qualified,
  }
}

#[cfg(test)]
mod tests {
  use super::flatten;
  use parse_ts::ast::stmt::Stmt;
  use parse_ts::ast::type_expr::TypeExpr;
  use parse_ts::ast::type_expr::TypeMember;

  fn property_type_name(stmt: &Stmt, index: usize) -> String {
    let Stmt::Interface(i) = stmt else {
      panic!("expected interface, got {:?}", stmt);
    };
    let TypeMember::Property(p) = i.stx.members[index].stx.as_ref() else {
      panic!("expected property");
    };
    match p.stx.type_annotation.as_ref().unwrap().stx.as_ref() {
      TypeExpr::Reference(r) => r.stx.name.to_string(),
      other => panic!("expected reference, got {:?}", other),
    }
  }

  #[test]
  fn lifts_and_renames() {
    let module = parse_ts::parse(
      r#"
export namespace Metropolis {
  export type Name = "Metropolis";
  export interface City { name: Name; hero: Hero }
}
export interface Hero { city: Metropolis.City; name: Name }
type Name = string;
"#,
    )
    .unwrap();
    let flat = flatten(module);
    let body = &flat.module.stx.body;
    let names: Vec<_> = body.iter().filter_map(|s| s.stx.decl_name()).collect();
    assert_eq!(names, vec!["MetropolisName", "MetropolisCity", "Hero", "Name"]);
    // Inside the namespace, `Name` is the namespace's own declaration; `Hero` is untouched.
    assert_eq!(property_type_name(&body[1].stx, 0), "MetropolisName");
    assert_eq!(property_type_name(&body[1].stx, 1), "Hero");
    // Outside, only the qualified reference is rewritten.
    assert_eq!(property_type_name(&body[2].stx, 0), "MetropolisCity");
    assert_eq!(property_type_name(&body[2].stx, 1), "Name");
    assert_eq!(
      flat.qualified.get("MetropolisCity").map(String::as_str),
      Some("Metropolis.City")
    );
  }

  #[test]
  fn nested_and_shorthand_namespaces() {
    let module = parse_ts::parse(
      r#"
namespace A.B { export enum Color { Red = "red" } }
namespace A { export namespace C { export interface D { c: B.Color.Red } } }
"#,
    )
    .unwrap();
    let flat = flatten(module);
    let body = &flat.module.stx.body;
    assert_eq!(body[0].stx.decl_name(), Some("ABColor"));
    assert_eq!(body[1].stx.decl_name(), Some("ACD"));
    assert_eq!(property_type_name(&body[1].stx, 0), "ABColor.Red");
    // `namespace A` is not exported, so nothing lifted out of it is.
    assert!(matches!(body[0].stx.as_ref(), Stmt::Enum(e) if !e.stx.export));
  }
}
