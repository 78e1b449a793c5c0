//! Generates [Zod](https://zod.dev) schemas from TypeScript interfaces, type aliases and enums.
//!
//! ```
//! use zodgen_js::generate;
//! use zodgen_js::GenerateOptions;
//! use zodgen_js::MemoryHost;
//!
//! let source = "export type Name = string;\nexport interface Hero { name: Name; age?: number }";
//! let output = generate(source, &GenerateOptions::default(), &MemoryHost::new()).unwrap();
//! assert!(output.errors.is_empty());
//! assert_eq!(
//!   output.get_zod_schemas_file("./hero"),
//!   "// Generated by ts-to-zod\nimport { z } from \"zod\";\n\nexport const nameSchema = z.string();\n\nexport const heroSchema = z.object({\n  name: nameSchema,\n  age: z.number().optional(),\n});\n"
//! );
//! ```

use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use flatten::flatten;
use jsdoc::parse_tags;
use order::order;
use registry::DeclKind;
use registry::Declaration;
use registry::Registry;
use resolve::resolve;
use resolve::Included;
use resolve::SourceUnit;
use schema::translate::translate;
use schema::translate::TranslateContext;
use schema::Statement;
use tracing::debug;
use tracing::debug_span;

pub mod emit;
pub mod error;
pub mod flatten;
pub mod host;
pub mod jsdoc;
pub mod options;
pub mod order;
pub mod refs;
pub mod registry;
pub mod resolve;
pub mod schema;

pub use emit::GenerateOutput;
pub use error::GenerateError;
pub use host::FsHost;
pub use host::HostError;
pub use host::MemoryHost;
pub use host::SourceHost;
pub use jsdoc::JsDocTag;
pub use options::CustomFormat;
pub use options::GenerateOptions;

fn is_selected(decl: &Declaration, options: &GenerateOptions) -> bool {
  if let Some(filter) = &options.name_filter {
    if !filter(&decl.name) {
      return false;
    };
  };
  let Some(filter) = &options.jsdoc_tag_filter else {
    return true;
  };
  let tags = match &decl.doc {
    Some(doc) if !options.skip_parse_jsdoc => parse_tags(doc),
    _ => Vec::new(),
  };
  filter(&tags)
}

// How the schema module names the original type, e.g. `Metropolis.Name` for a lifted declaration.
fn type_name(included: &Included) -> String {
  let local = &included.import.local;
  match included
    .decl
    .qualified_name
    .as_deref()
    .and_then(|q| q.split_once('.'))
  {
    Some((_, rest)) => format!("{local}.{rest}"),
    None => local.clone(),
  }
}

/// Generates schemas for the declarations of `source`, following relative imports through `host`.
/// Recoverable problems are collected in [`GenerateOutput::errors`]; only the conditions of
/// [`GenerateError`] abort the run.
pub fn generate(
  source: &str,
  options: &GenerateOptions,
  host: &dyn SourceHost,
) -> Result<GenerateOutput, GenerateError> {
  let span = debug_span!("generate", file = %options.source_file);
  let _guard = span.enter();

  let module = parse_ts::parse(source).map_err(|err| GenerateError::syntax(err, source))?;
  let registry = Registry::build(&options.source_file, &flatten(module));
  let roots: Vec<String> = registry
    .declarations()
    .iter()
    .filter(|d| is_selected(d, options))
    .map(|d| d.name.clone())
    .collect();
  debug!(roots = roots.len(), "selected root declarations");

  let root = SourceUnit::new(&options.source_file, None, registry);
  let resolution = resolve(host, root, &roots)?;
  let mut errors = resolution.warnings;

  let mut run_types = HashMap::new();
  for included in &resolution.included {
    run_types.insert(
      included.decl.name.clone(),
      (type_name(included), included.decl.kind()),
    );
  }

  let mut statements = Vec::new();
  let mut var_names = HashSet::new();
  for included in &resolution.included {
    let unit = &resolution.units[included.unit];
    let cx = TranslateContext {
      options,
      registry: &unit.registry,
      names: &unit.names,
      run_types: &run_types,
    };
    let decl = &included.decl;
    let type_name = type_name(included);
    let translated = translate(decl, &type_name, &cx, &mut errors)?;
    let var_name = options.schema_name(&decl.name);
    if !var_names.insert(var_name.clone()) {
      errors.push(format!(
        "`{}` from {} was skipped: its schema name `{}` is already taken",
        decl.name, decl.origin, var_name
      ));
      continue;
    };
    let is_root = included.unit == 0;
    statements.push(Statement {
      var_name,
      name: decl.name.clone(),
      type_name,
      initializer: Some(translated.expr),
      type_annotation: None,
      dependencies: translated.dependencies,
      requires_type_import: decl.kind() == DeclKind::Enum,
      is_exported: !is_root || decl.exported || decl.default_export,
      is_root,
      import: included.import.clone(),
      comment: decl.doc.clone().filter(|_| options.keep_comments),
    });
  }

  let ordered = order(statements)?;
  errors.extend(ordered.missing_message());
  Ok(GenerateOutput {
    has_circular_dependencies: ordered.has_circular,
    statements: ordered.statements,
    imports: ordered.imports,
    errors,
  })
}
