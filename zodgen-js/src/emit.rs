use crate::order::ImportGroups;
use crate::schema::quote;
use crate::schema::ImportedAs;
use crate::schema::Statement;
use crate::schema::TypeImport;
use itertools::Itertools;

const HEADER: &str = "// Generated by ts-to-zod";
const ZOD_IMPORT: &str = "import { z } from \"zod\";";

/// Result of a generation run. The output files are rendered on demand, since their import paths
/// depend on where the caller writes them.
#[derive(Debug)]
pub struct GenerateOutput {
  pub(crate) statements: Vec<Statement>,
  pub(crate) imports: ImportGroups,
  /// Warnings collected during the run, in the order they were raised.
  pub errors: Vec<String>,
  pub has_circular_dependencies: bool,
}

fn import_line(path: &str, imports: &[TypeImport]) -> String {
  let mut default = None;
  let mut named = Vec::new();
  for import in imports {
    match (&import.imported, default) {
      (ImportedAs::Default, None) => default = Some(import.local.as_str()),
      (ImportedAs::Default, Some(_)) => named.push(format!("default as {}", import.local)),
      (ImportedAs::Named(name), _) if name == &import.local => named.push(name.clone()),
      (ImportedAs::Named(name), _) => named.push(format!("{} as {}", name, import.local)),
    };
  }
  let mut clause = String::new();
  if let Some(default) = default {
    clause.push_str(default);
  };
  if !named.is_empty() {
    if !clause.is_empty() {
      clause.push_str(", ");
    };
    clause.push_str(&format!("{{ {} }}", named.iter().join(", ")));
  };
  format!("import {} from {};", clause, quote(path))
}

impl GenerateOutput {
  /// Generated schema variables, in output order.
  pub fn statements(&self) -> &[Statement] {
    &self.statements
  }

  fn is_tested(statement: &Statement) -> bool {
    statement.is_root && statement.is_exported
  }

  /// The schema module. `types_import_path` is the specifier it uses to import the source file.
  pub fn get_zod_schemas_file(&self, types_import_path: &str) -> String {
    let mut out = vec![HEADER.to_string(), ZOD_IMPORT.to_string()];
    for (path, imports) in &self.imports {
      out.push(import_line(path.as_deref().unwrap_or(types_import_path), imports));
    }
    let body = self.statements.iter().map(Statement::render).join("\n\n");
    format!("{}\n\n{}\n", out.join("\n"), body)
  }

  /// A module that fails to type check when a schema's inferred type and its original type differ.
  pub fn get_integration_tests_file(&self, types_import_path: &str, zod_import_path: &str) -> String {
    let mut out = vec![
      HEADER.to_string(),
      ZOD_IMPORT.to_string(),
      String::new(),
      format!("import * as spec from {};", quote(types_import_path)),
      format!("import * as generated from {};", quote(zod_import_path)),
      String::new(),
      "// eslint-disable-next-line @typescript-eslint/no-unused-vars".to_string(),
      "function expectType<T>(_: T) {".to_string(),
      "  /* noop */".to_string(),
      "}".to_string(),
    ];
    let tested: Vec<&Statement> = self.statements.iter().filter(|s| Self::is_tested(s)).collect();
    if !tested.is_empty() {
      out.push(String::new());
    };
    for s in &tested {
      out.push(format!(
        "export type {}InferredType = z.infer<typeof generated.{}>;",
        s.var_name, s.var_name
      ));
    }
    for s in &tested {
      let spec_type = match &s.import.imported {
        ImportedAs::Default => "spec.default".to_string(),
        ImportedAs::Named(_) => format!("spec.{}", s.type_name),
      };
      out.push(String::new());
      out.push(format!(
        "expectType<{}>({{}} as {}InferredType);",
        spec_type, s.var_name
      ));
      out.push(format!(
        "expectType<{}InferredType>({{}} as {});",
        s.var_name, spec_type
      ));
    }
    format!("{}\n", out.join("\n"))
  }

  /// One `z.infer` type alias per exported schema.
  pub fn get_inferred_types_file(&self, zod_import_path: &str) -> String {
    let mut out = vec![
      HEADER.to_string(),
      ZOD_IMPORT.to_string(),
      String::new(),
      format!("import * as generated from {};", quote(zod_import_path)),
    ];
    let exported: Vec<&Statement> = self.statements.iter().filter(|s| s.is_exported).collect();
    if !exported.is_empty() {
      out.push(String::new());
    };
    for s in exported {
      out.push(format!(
        "export type {} = z.infer<typeof generated.{}>;",
        s.name, s.var_name
      ));
    }
    format!("{}\n", out.join("\n"))
  }
}

#[cfg(test)]
mod tests {
  use super::import_line;
  use crate::schema::ImportedAs;
  use crate::schema::TypeImport;

  fn import(imported: ImportedAs, local: &str) -> TypeImport {
    TypeImport {
      path: Some("./villain".to_string()),
      imported,
      local: local.to_string(),
    }
  }

  #[test]
  fn import_clauses() {
    assert_eq!(
      import_line("./villain", &[
        import(ImportedAs::Named("Villain".into()), "Villain"),
        import(ImportedAs::Default, "Lair"),
        import(ImportedAs::Named("Name".into()), "Name1"),
      ]),
      "import Lair, { Villain, Name as Name1 } from \"./villain\";"
    );
    assert_eq!(
      import_line("./villain", &[import(ImportedAs::Default, "Lair")]),
      "import Lair from \"./villain\";"
    );
  }
}
