use crate::registry::DeclDef;
use ahash::HashSet;
use ahash::HashSetExt;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use parse_ts::ast::node::Node;
use parse_ts::ast::type_expr::TypeMapped;
use parse_ts::ast::type_expr::TypeReference;

type TypeReferenceNode = Node<TypeReference>;
type TypeMappedNode = Node<TypeMapped>;

#[derive(Visitor)]
#[visitor(TypeReferenceNode(enter), TypeMappedNode)]
struct ReferenceCollector {
  // Type parameters of enclosing mapped types, which shadow declarations.
  bound: Vec<String>,
  seen: HashSet<String>,
  names: Vec<String>,
}

impl ReferenceCollector {
  fn enter_type_reference_node(&mut self, node: &TypeReferenceNode) {
    let root = node.stx.name.root();
    if self.bound.iter().any(|b| b == root) {
      return;
    };
    if self.seen.insert(root.to_string()) {
      self.names.push(root.to_string());
    };
  }

  fn enter_type_mapped_node(&mut self, node: &TypeMappedNode) {
    self.bound.push(node.stx.type_parameter.clone());
  }

  fn exit_type_mapped_node(&mut self, _node: &TypeMappedNode) {
    self.bound.pop();
  }
}

/// Names referenced by a declaration's definition, in first-use order. Qualified references yield their
/// leftmost identifier. Names that do not denote declarations (such as `Array` or `Record`) are included;
/// callers look each one up.
pub fn references(def: &DeclDef) -> Vec<String> {
  let mut collector = ReferenceCollector {
    bound: Vec::new(),
    seen: HashSet::new(),
    names: Vec::new(),
  };
  match def {
    DeclDef::Interface(d) => d.drive(&mut collector),
    DeclDef::TypeAlias(d) => d.drive(&mut collector),
    DeclDef::Enum(d) => d.drive(&mut collector),
  };
  collector.names
}

#[cfg(test)]
mod tests {
  use super::references;
  use crate::flatten::flatten;
  use crate::registry::Registry;

  fn refs_of(src: &str, name: &str) -> Vec<String> {
    let reg = Registry::build("a.ts", &flatten(parse_ts::parse(src).unwrap()));
    references(&reg.get(name).unwrap().def)
  }

  #[test]
  fn collects_in_first_use_order() {
    let refs = refs_of(
      "interface Hero extends Omit<Base, \"id\"> { friends: Array<Hero>; home: Planet.Earth; power?: Power | Power[] }",
      "Hero",
    );
    assert_eq!(refs, vec!["Omit", "Base", "Array", "Hero", "Planet", "Power"]);
  }

  #[test]
  fn skips_mapped_type_parameters() {
    let refs = refs_of("type Flags = { [K in Keys]: Value<K> };", "Flags");
    assert_eq!(refs, vec!["Keys", "Value"]);
  }
}
