use crate::error::GenerateError;
use crate::error::GenerateResult;
use crate::schema::SchemaExpr;
use crate::schema::Statement;
use crate::schema::TypeImport;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use tracing::debug;

pub const MISSING_DEPENDENCIES_MESSAGE: &str =
  "Some schemas can't be generated due to direct or indirect missing dependencies:";

/// Type imports of the schema module grouped by module specifier, in first-use order. The source
/// file's group has no specifier.
pub type ImportGroups = Vec<(Option<String>, Vec<TypeImport>)>;

pub struct Ordered {
  /// Dependencies before dependents; cyclic groups wrapped in `z.lazy`.
  pub statements: Vec<Statement>,
  /// Variable names of statements that could not be placed, in discovery order.
  pub missing: Vec<String>,
  pub has_circular: bool,
  pub imports: ImportGroups,
}

impl Ordered {
  /// The aggregated warning for `missing`, if any.
  pub fn missing_message(&self) -> Option<String> {
    if self.missing.is_empty() {
      return None;
    };
    Some(format!(
      "{}\n{}",
      MISSING_DEPENDENCIES_MESSAGE,
      self.missing.join("\n")
    ))
  }
}

/// Rewrites a statement into `z.lazy(() => ..)` form with an explicit `z.ZodSchema<T>` type.
pub fn wrap_lazy(statement: Statement) -> GenerateResult<Statement> {
  let Some(init) = statement.initializer else {
    return Err(GenerateError::LazyWithoutInitializer {
      var_name: statement.var_name,
    });
  };
  Ok(Statement {
    initializer: Some(SchemaExpr::z("lazy", vec![SchemaExpr::Thunk(Box::new(init))])),
    type_annotation: Some(format!("z.ZodSchema<{}>", statement.type_name)),
    requires_type_import: true,
    ..statement
  })
}

fn calculate_sccs(nodes: &[usize], edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
  fn strongconnect(
    v: usize,
    edges: &[Vec<usize>],
    index: &mut usize,
    stack: &mut Vec<usize>,
    on_stack: &mut HashSet<usize>,
    indices: &mut HashMap<usize, usize>,
    lowlink: &mut HashMap<usize, usize>,
    components: &mut Vec<Vec<usize>>,
  ) {
    indices.insert(v, *index);
    lowlink.insert(v, *index);
    *index += 1;
    stack.push(v);
    on_stack.insert(v);

    for &w in &edges[v] {
      if !indices.contains_key(&w) {
        strongconnect(
          w, edges, index, stack, on_stack, indices, lowlink, components,
        );
        let low_v = lowlink[&v];
        let low_w = lowlink[&w];
        lowlink.insert(v, low_v.min(low_w));
      } else if on_stack.contains(&w) {
        let low_v = lowlink[&v];
        let idx_w = indices[&w];
        lowlink.insert(v, low_v.min(idx_w));
      }
    }

    if indices[&v] == lowlink[&v] {
      let mut component = Vec::new();
      while let Some(w) = stack.pop() {
        on_stack.remove(&w);
        component.push(w);
        if w == v {
          break;
        }
      }
      // Members keep discovery order.
      component.sort_unstable();
      components.push(component);
    }
  }

  let mut index = 0;
  let mut stack = Vec::new();
  let mut on_stack = HashSet::new();
  let mut indices = HashMap::new();
  let mut lowlink = HashMap::new();
  let mut components = Vec::new();

  for &n in nodes {
    if !indices.contains_key(&n) {
      strongconnect(
        n,
        edges,
        &mut index,
        &mut stack,
        &mut on_stack,
        &mut indices,
        &mut lowlink,
        &mut components,
      );
    }
  }
  components
}

fn type_imports(statements: &[Statement]) -> ImportGroups {
  let mut groups: ImportGroups = Vec::new();
  for s in statements.iter().filter(|s| s.requires_type_import) {
    let group = match groups.iter().position(|(path, _)| path == &s.import.path) {
      Some(i) => i,
      None => {
        groups.push((s.import.path.clone(), Vec::new()));
        groups.len() - 1
      }
    };
    if !groups[group].1.contains(&s.import) {
      groups[group].1.push(s.import.clone());
    };
  }
  groups
}

/// Orders `statements` (given in discovery order) so every schema is defined after the schemas it
/// references. Statements depending, directly or not, on a schema that does not exist are dropped
/// and reported in [`Ordered::missing`].
pub fn order(statements: Vec<Statement>) -> GenerateResult<Ordered> {
  let n = statements.len();
  let mut by_var = HashMap::<String, usize>::new();
  for (i, s) in statements.iter().enumerate() {
    by_var.insert(s.var_name.clone(), i);
  }

  let mut missing = vec![false; n];
  let mut dependents = vec![Vec::new(); n];
  let mut edges = vec![Vec::new(); n];
  let mut work = Vec::new();
  for (i, s) in statements.iter().enumerate() {
    for dep in &s.dependencies {
      match by_var.get(dep) {
        Some(&j) => {
          dependents[j].push(i);
          if !edges[i].contains(&j) {
            edges[i].push(j);
          };
        }
        None if !missing[i] => {
          missing[i] = true;
          work.push(i);
        }
        None => {}
      };
    }
  }
  while let Some(j) = work.pop() {
    for &i in &dependents[j] {
      if !missing[i] {
        missing[i] = true;
        work.push(i);
      };
    }
  }

  let placed: Vec<usize> = (0..n).filter(|&i| !missing[i]).collect();
  let components = calculate_sccs(&placed, &edges);

  let missing_names: Vec<String> = (0..n)
    .filter(|&i| missing[i])
    .map(|i| statements[i].var_name.clone())
    .collect();
  let mut slots: Vec<Option<Statement>> = statements.into_iter().map(Some).collect();
  let mut ordered = Vec::with_capacity(placed.len());
  let mut has_circular = false;
  for component in components {
    let cyclic = component.len() > 1 || edges[component[0]].contains(&component[0]);
    for i in component {
      let Some(statement) = slots[i].take() else {
        continue;
      };
      if cyclic {
        has_circular = true;
        debug!(var_name = %statement.var_name, "wrapping cyclic schema in z.lazy");
        ordered.push(wrap_lazy(statement)?);
      } else {
        ordered.push(statement);
      };
    }
  }
  debug!(
    placed = ordered.len(),
    missing = missing_names.len(),
    has_circular,
    "ordered statements"
  );
  let imports = type_imports(&ordered);
  Ok(Ordered {
    statements: ordered,
    missing: missing_names,
    has_circular,
    imports,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::options::default_schema_name;
  use crate::schema::ImportedAs;

  fn stmt(name: &str, deps: &[&str]) -> Statement {
    let dependencies: Vec<String> = deps.iter().map(|d| default_schema_name(d)).collect();
    Statement {
      var_name: default_schema_name(name),
      name: name.to_string(),
      type_name: name.to_string(),
      initializer: Some(match dependencies.first() {
        Some(dep) => SchemaExpr::Ident(dep.clone()),
        None => SchemaExpr::z("string", vec![]),
      }),
      type_annotation: None,
      dependencies,
      requires_type_import: false,
      is_exported: true,
      is_root: true,
      import: TypeImport {
        path: None,
        imported: ImportedAs::Named(name.to_string()),
        local: name.to_string(),
      },
      comment: None,
    }
  }

  fn vars(ordered: &Ordered) -> Vec<&str> {
    ordered.statements.iter().map(|s| s.var_name.as_str()).collect()
  }

  #[test]
  fn dependencies_come_first() {
    let ordered = order(vec![
      stmt("Hero", &["Name", "Power"]),
      stmt("Name", &[]),
      stmt("Power", &["Name"]),
    ])
    .unwrap();
    assert_eq!(vars(&ordered), vec!["nameSchema", "powerSchema", "heroSchema"]);
    assert!(!ordered.has_circular);
    assert!(ordered.missing_message().is_none());
    assert!(ordered.imports.is_empty());
  }

  #[test]
  fn missing_dependencies_propagate() {
    let ordered = order(vec![
      stmt("A", &["B"]),
      stmt("B", &["Ghost"]),
      stmt("C", &[]),
      stmt("D", &["A"]),
    ])
    .unwrap();
    assert_eq!(vars(&ordered), vec!["cSchema"]);
    assert_eq!(ordered.missing, vec!["aSchema", "bSchema", "dSchema"]);
    assert_eq!(
      ordered.missing_message().unwrap(),
      format!("{MISSING_DEPENDENCIES_MESSAGE}\naSchema\nbSchema\ndSchema")
    );
  }

  #[test]
  fn cycles_are_wrapped_in_discovery_order() {
    let ordered = order(vec![stmt("A", &["B"]), stmt("B", &["A"]), stmt("C", &["A"])]).unwrap();
    assert_eq!(vars(&ordered), vec!["aSchema", "bSchema", "cSchema"]);
    assert!(ordered.has_circular);
    assert_eq!(
      ordered.statements[0].render(),
      "export const aSchema: z.ZodSchema<A> = z.lazy(() => bSchema);"
    );
    assert_eq!(
      ordered.statements[2].render(),
      "export const cSchema = aSchema;"
    );
    let imports = &ordered.imports;
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].0, None);
    let locals: Vec<_> = imports[0].1.iter().map(|i| i.local.as_str()).collect();
    assert_eq!(locals, vec!["A", "B"]);
  }

  #[test]
  fn self_references_are_cycles() {
    let ordered = order(vec![stmt("Tree", &["Tree"])]).unwrap();
    assert!(ordered.has_circular);
    assert_eq!(
      ordered.statements[0].render(),
      "export const treeSchema: z.ZodSchema<Tree> = z.lazy(() => treeSchema);"
    );
  }

  #[test]
  fn lazy_needs_an_initializer() {
    let mut statement = stmt("Tree", &["Tree"]);
    statement.initializer = None;
    assert!(matches!(
      order(vec![statement]),
      Err(GenerateError::LazyWithoutInitializer { var_name }) if var_name == "treeSchema"
    ));
  }
}
