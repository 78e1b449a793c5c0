use crate::error::GenerateResult;
use crate::flatten::flatten;
use crate::host::HostError;
use crate::host::SourceHost;
use crate::refs::references;
use crate::registry::Declaration;
use crate::registry::Export;
use crate::registry::Registry;
use crate::schema::ImportedAs;
use crate::schema::TypeImport;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use std::collections::VecDeque;
use tracing::debug;

pub mod path;

/// One parsed and flattened source file taking part in a run.
pub struct SourceUnit {
  pub file: String,
  /// Specifier the generated schema module uses to import this file's types; None for the source file.
  pub import_path: Option<String>,
  pub registry: Registry,
  /// File-local name (declaration or import binding) mapped to the name it is generated under.
  pub names: HashMap<String, String>,
}

impl SourceUnit {
  pub fn new(file: &str, import_path: Option<String>, registry: Registry) -> SourceUnit {
    SourceUnit {
      file: file.to_string(),
      import_path,
      registry,
      names: HashMap::new(),
    }
  }
}

/// A declaration selected for generation.
pub struct Included {
  /// Index into [`Resolution::units`].
  pub unit: usize,
  /// The declaration, renamed to its generated name where that differs.
  pub decl: Declaration,
  pub import: TypeImport,
}

pub struct Resolution {
  pub units: Vec<SourceUnit>,
  /// In discovery order: the selected roots first, then dependencies breadth-first.
  pub included: Vec<Included>,
  pub warnings: Vec<String>,
}

struct Resolver<'a> {
  host: &'a dyn SourceHost,
  units: Vec<SourceUnit>,
  // Files already visited this run, including ones that failed to load.
  visited: HashMap<String, Option<usize>>,
  used_names: HashSet<String>,
  included: Vec<Included>,
  warnings: Vec<String>,
  queue: VecDeque<(usize, String)>,
}

impl<'a> Resolver<'a> {
  fn unique_name(&self, name: &str) -> String {
    if !self.used_names.contains(name) {
      return name.to_string();
    };
    (1..)
      .map(|i| format!("{name}{i}"))
      .find(|n| !self.used_names.contains(n))
      .unwrap_or_else(|| name.to_string())
  }

  fn root_import(&self, decl: &Declaration) -> TypeImport {
    let (imported, local) = match &decl.qualified_name {
      Some(q) => {
        let root = q.split('.').next().unwrap_or(q).to_string();
        (ImportedAs::Named(root.clone()), root)
      }
      None if !decl.exported && decl.default_export => (ImportedAs::Default, decl.name.clone()),
      None => (ImportedAs::Named(decl.name.clone()), decl.name.clone()),
    };
    TypeImport {
      path: None,
      imported,
      local,
    }
  }

  fn include(&mut self, unit: usize, local: &str, run_name: String, import: TypeImport) -> String {
    let Some(decl) = self.units[unit].registry.get(local) else {
      return run_name;
    };
    let decl = decl.renamed(&run_name);
    self.used_names.insert(run_name.clone());
    self.units[unit].names.insert(local.to_string(), run_name.clone());
    for dep in references(&decl.def) {
      if dep != local {
        self.queue.push_back((unit, dep));
      };
    }
    self.included.push(Included { unit, decl, import });
    run_name
  }

  /// Loads the file `specifier` names when imported from `from`. None if it cannot be resolved or
  /// parsed; the latter adds a warning.
  fn load(&mut self, from: usize, specifier: &str) -> GenerateResult<Option<usize>> {
    let Some(file) = self.host.resolve(&self.units[from].file, specifier) else {
      debug!(specifier, from = %self.units[from].file, "unresolved import");
      return Ok(None);
    };
    if let Some(&unit) = self.visited.get(&file) {
      return Ok(unit);
    };
    self.visited.insert(file.clone(), None);
    let text = match self.host.file_text(&file) {
      Ok(text) => text,
      Err(HostError::NotFound { .. }) => return Ok(None),
      Err(err) => return Err(err.into()),
    };
    let module = match parse_ts::parse(&text) {
      Ok(module) => module,
      Err(err) => {
        self.warnings.push(format!(
          "Failed to parse \"{}\": {}",
          file,
          err.describe(&text)
        ));
        return Ok(None);
      }
    };
    let registry = Registry::build(&file, &flatten(module));
    let import_path = match &self.units[from].import_path {
      Some(importer) => path::rebase_specifier(importer, specifier),
      None => specifier.to_string(),
    };
    debug!(file = %file, import_path = %import_path, "loaded foreign file");
    let unit = self.units.len();
    self
      .units
      .push(SourceUnit::new(&file, Some(import_path), registry));
    self.visited.insert(file, Some(unit));
    Ok(Some(unit))
  }

  /// Finds the declaration a file exposes under `export`, following re-exports.
  fn find_export(
    &mut self,
    unit: usize,
    export: Option<Export>,
    mut seen: Vec<(usize, String)>,
  ) -> GenerateResult<Option<(usize, String)>> {
    match export {
      None => Ok(None),
      Some(Export::Local(local)) => Ok(Some((unit, local))),
      Some(Export::Reexport { imported, module }) => {
        if seen.contains(&(unit, imported.clone())) {
          return Ok(None);
        };
        seen.push((unit, imported.clone()));
        let Some(target) = self.load(unit, &module)? else {
          return Ok(None);
        };
        let export = if imported == "default" {
          self.units[target].registry.default_export()
        } else {
          self.units[target].registry.export(&imported)
        };
        self.find_export(target, export, seen)
      }
    }
  }

  /// Makes `name`, as seen from `unit`, available to the run. Returns the name it is generated under.
  fn require(&mut self, unit: usize, name: &str) -> GenerateResult<Option<String>> {
    if let Some(run_name) = self.units[unit].names.get(name) {
      return Ok(Some(run_name.clone()));
    };
    if let Some(decl) = self.units[unit].registry.get(name) {
      if unit == 0 {
        let import = self.root_import(decl);
        return Ok(Some(self.include(0, name, name.to_string(), import)));
      };
      // Non-exported declarations of foreign files cannot be imported by the generated module.
      if !decl.exported && !decl.default_export {
        return Ok(None);
      };
      let run_name = self.unique_name(name);
      let import = match &decl.qualified_name {
        // Lifted out of a namespace: the type is reached through the namespace's root binding.
        Some(_) => TypeImport {
          path: self.units[unit].import_path.clone(),
          ..self.root_import(decl)
        },
        None => TypeImport {
          path: self.units[unit].import_path.clone(),
          imported: if decl.exported {
            ImportedAs::Named(name.to_string())
          } else {
            ImportedAs::Default
          },
          local: run_name.clone(),
        },
      };
      return Ok(Some(self.include(unit, name, run_name, import)));
    };
    let Some(binding) = self.units[unit].registry.import(name).cloned() else {
      return Ok(None);
    };
    self.units[unit].registry.require_import(name);
    if !binding.is_relative {
      return Ok(None);
    };
    let Some(target) = self.load(unit, &binding.source_path)? else {
      return Ok(None);
    };
    let export = if binding.is_default {
      self.units[target].registry.default_export()
    } else {
      self.units[target].registry.export(&binding.outer_name)
    };
    let Some((owner, local)) = self.find_export(target, export, Vec::new())? else {
      return Ok(None);
    };
    if self.units[owner].registry.get(&local).is_none() {
      return Ok(None);
    };
    let run_name = match self.units[owner].names.get(&local) {
      Some(existing) => existing.clone(),
      None => {
        let run_name = if unit == 0 {
          name.to_string()
        } else {
          self.unique_name(name)
        };
        let imported = if binding.is_default {
          ImportedAs::Default
        } else {
          ImportedAs::Named(binding.outer_name.clone())
        };
        // Imports are written relative to the file the binding was found in.
        let path = match &self.units[unit].import_path {
          Some(importer) => path::rebase_specifier(importer, &binding.source_path),
          None => binding.source_path.clone(),
        };
        let import = TypeImport {
          path: Some(path),
          imported,
          local: run_name.clone(),
        };
        if owner == target {
          self.include(owner, &local, run_name, import)
        } else {
          // Re-exported from further away: import from the declaring file under its own name.
          let import = TypeImport {
            path: self.units[owner].import_path.clone(),
            imported: ImportedAs::Named(local.clone()),
            ..import
          };
          self.include(owner, &local, run_name, import)
        }
      }
    };
    self.units[unit].names.insert(name.to_string(), run_name.clone());
    Ok(Some(run_name))
  }
}

/// Expands `roots` (declaration names of the source file) into every declaration they transitively
/// need, reading foreign files through `host` as imports are followed.
pub fn resolve(
  host: &dyn SourceHost,
  root: SourceUnit,
  roots: &[String],
) -> GenerateResult<Resolution> {
  let mut used_names = HashSet::new();
  for decl in root.registry.declarations() {
    used_names.insert(decl.name.clone());
  }
  for binding in root.registry.imports() {
    used_names.insert(binding.local_name.clone());
  }
  let mut visited = HashMap::new();
  visited.insert(root.file.clone(), Some(0));
  let mut resolver = Resolver {
    host,
    units: vec![root],
    visited,
    used_names,
    included: Vec::new(),
    warnings: Vec::new(),
    queue: VecDeque::new(),
  };
  for name in roots {
    resolver.require(0, name)?;
  }
  while let Some((unit, name)) = resolver.queue.pop_front() {
    resolver.require(unit, &name)?;
  }
  Ok(Resolution {
    units: resolver.units,
    included: resolver.included,
    warnings: resolver.warnings,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::host::MemoryHost;

  fn root_unit(file: &str, src: &str) -> SourceUnit {
    let registry = Registry::build(file, &flatten(parse_ts::parse(src).unwrap()));
    SourceUnit::new(file, None, registry)
  }

  fn names(res: &Resolution) -> Vec<&str> {
    res.included.iter().map(|i| i.decl.name.as_str()).collect()
  }

  #[test]
  fn follows_imports_with_aliases() {
    let host = MemoryHost::new()
      .with_file(
        "src/villain.ts",
        "import { Power } from \"./shared/power\";\nexport interface Villain { power: Power; minion: Minion }\ninterface Minion { name: string }\nexport type Lair = string;",
      )
      .with_file("src/shared/power.ts", "export type Power = \"fly\" | \"laser\";");
    let root = root_unit(
      "src/hero.ts",
      "import { Villain as Bad, Lair } from \"./villain\";\nexport interface Hero { nemesis: Bad }",
    );
    let res = resolve(&host, root, &["Hero".to_string()]).unwrap();
    assert_eq!(names(&res), vec!["Hero", "Bad", "Power"]);
    let bad = &res.included[1];
    assert_eq!(bad.import.path.as_deref(), Some("./villain"));
    assert_eq!(bad.import.imported, ImportedAs::Named("Villain".into()));
    assert_eq!(bad.import.local, "Bad");
    let power = &res.included[2];
    assert_eq!(power.import.path.as_deref(), Some("./shared/power"));
    // Unused bindings are never followed; non-exported foreign declarations are excluded.
    let root = &res.units[0];
    assert!(root.registry.import("Bad").unwrap().required);
    assert!(!root.registry.import("Lair").unwrap().required);
    assert!(!res.units[1].names.contains_key("Minion"));
    assert!(res.warnings.is_empty());
  }

  #[test]
  fn tolerates_import_cycles_and_missing_files() {
    let host = MemoryHost::new()
      .with_file("a.ts", "import { B } from \"./b\";\nexport interface A { b: B }")
      .with_file("b.ts", "import { A } from \"./a\";\nexport interface B { a: A; c: C }\nimport { C } from \"./nope\";");
    let root = root_unit(
      "a.ts",
      "import { B } from \"./b\";\nexport interface A { b: B }",
    );
    let res = resolve(&host, root, &["A".to_string()]).unwrap();
    assert_eq!(names(&res), vec!["A", "B"]);
    assert_eq!(res.units.len(), 2);
    assert_eq!(res.units[1].names.get("A").map(String::as_str), Some("A"));
  }

  #[test]
  fn renames_colliding_foreign_declarations() {
    let host = MemoryHost::new().with_file(
      "villain.ts",
      "export type Name = number;\nexport interface Villain { name: Name }",
    );
    let root = root_unit(
      "hero.ts",
      "import { Villain } from \"./villain\";\ntype Name = string;\ninterface Hero { name: Name; villain: Villain }",
    );
    let res = resolve(&host, root, &["Hero".to_string()]).unwrap();
    assert_eq!(names(&res), vec!["Hero", "Name", "Villain", "Name1"]);
    let foreign_name = &res.included[3];
    assert_eq!(foreign_name.import.imported, ImportedAs::Named("Name".into()));
    assert_eq!(foreign_name.import.local, "Name1");
    assert_eq!(res.units[1].names.get("Name").map(String::as_str), Some("Name1"));
  }

  #[test]
  fn follows_default_imports_and_reexports() {
    let host = MemoryHost::new()
      .with_file("index.ts", "export { Planet as World } from \"./planet\";")
      .with_file("planet.ts", "export interface Planet { name: string }")
      .with_file("city.ts", "interface City { size: number }\nexport default City;");
    let root = root_unit(
      "hero.ts",
      "import { World } from \"./index\";\nimport Town from \"./city\";\nexport interface Hero { home: World; town: Town }",
    );
    let res = resolve(&host, root, &["Hero".to_string()]).unwrap();
    assert_eq!(names(&res), vec!["Hero", "World", "Town"]);
    assert_eq!(res.included[1].import.path.as_deref(), Some("./planet"));
    assert_eq!(
      res.included[1].import.imported,
      ImportedAs::Named("Planet".into())
    );
    assert_eq!(res.included[2].import.imported, ImportedAs::Default);
    assert_eq!(res.included[2].import.local, "Town");
  }
}
