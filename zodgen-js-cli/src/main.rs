use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::stderr;
use std::io::stdout;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use zodgen_js::generate;
use zodgen_js::resolve::path::relative_specifier;
use zodgen_js::CustomFormat;
use zodgen_js::FsHost;
use zodgen_js::GenerateOptions;

#[derive(Parser)]
#[command(author, version, about = "Generate Zod schemas from TypeScript declarations")]
struct Cli {
  /// TypeScript file to read declarations from.
  input: PathBuf,

  /// Output destination for the schemas; omit for stdout.
  output: Option<PathBuf>,

  /// Ignore JSDoc tags.
  #[arg(long)]
  skip_parse_jsdoc: bool,

  /// Re-emit JSDoc comments above the generated schemas.
  #[arg(long)]
  keep_comments: bool,

  /// Also write `z.infer` type aliases of the schemas to this file.
  #[arg(long, value_name = "FILE")]
  inferred_types: Option<PathBuf>,

  /// Also write a module that fails to type check when a schema and its type diverge.
  #[arg(long, value_name = "FILE")]
  tests: Option<PathBuf>,

  /// JSON config file.
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Emit tracing spans as JSON on stderr.
  #[arg(long)]
  trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Config {
  skip_parse_jsdoc: bool,
  keep_comments: bool,
  /// Only these declarations (and what they depend on) are generated.
  names: Option<Vec<String>>,
  #[serde(rename = "customJSDocFormatTypes")]
  custom_jsdoc_format_types: BTreeMap<String, FormatConfig>,
}

/// `"phone": "^\\d+$"` or `"phone": { "regex": "^\\d+$", "errorMessage": "..." }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FormatConfig {
  Regex(String),
  Full(CustomFormat),
}

fn load_config(path: &Path) -> Result<Config> {
  let text = fs::read_to_string(path)
    .with_context(|| format!("failed to read config {}", path.display()))?;
  serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn build_options(cli: &Cli, config: Config) -> GenerateOptions {
  let mut options = GenerateOptions::default()
    .with_skip_parse_jsdoc(cli.skip_parse_jsdoc || config.skip_parse_jsdoc)
    .with_keep_comments(cli.keep_comments || config.keep_comments)
    .with_source_file(slash_path(&cli.input));
  if let Some(names) = config.names {
    options = options.with_name_filter(move |name| names.iter().any(|n| n == name));
  };
  for (name, format) in config.custom_jsdoc_format_types {
    let format = match format {
      FormatConfig::Regex(regex) => CustomFormat {
        regex,
        error_message: None,
      },
      FormatConfig::Full(format) => format,
    };
    options = options.with_custom_format(name, format);
  }
  options
}

fn slash_path(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

// Specifier a module written to `module` uses to import `target`.
fn import_path(cwd: &Path, module: Option<&Path>, target: &Path) -> String {
  let dir = module
    .and_then(|m| cwd.join(m).parent().map(slash_path))
    .unwrap_or_else(|| slash_path(cwd));
  relative_specifier(&dir, &slash_path(&cwd.join(target)))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
  fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn run(cli: &Cli) -> Result<()> {
  let config = match &cli.config {
    Some(path) => load_config(path)?,
    None => Config::default(),
  };
  debug!(?config, "loaded config");
  let options = build_options(cli, config);
  let source = fs::read_to_string(&cli.input)
    .with_context(|| format!("failed to read {}", cli.input.display()))?;
  let output = generate(&source, &options, &FsHost)?;
  for warning in &output.errors {
    eprintln!("warning: {warning}");
  }

  let cwd = env::current_dir().context("failed to get current directory")?;
  let schemas = output.get_zod_schemas_file(&import_path(
    &cwd,
    cli.output.as_deref(),
    &cli.input,
  ));
  match &cli.output {
    Some(path) => write_file(path, &schemas)?,
    None => stdout()
      .write_all(schemas.as_bytes())
      .context("failed to write output")?,
  };

  if cli.inferred_types.is_none() && cli.tests.is_none() {
    return Ok(());
  };
  let Some(schemas_path) = &cli.output else {
    bail!("--inferred-types and --tests need the schemas written to an output file");
  };
  if let Some(path) = &cli.inferred_types {
    let zod = import_path(&cwd, Some(path), schemas_path);
    write_file(path, &output.get_inferred_types_file(&zod))?;
  };
  if let Some(path) = &cli.tests {
    let types = import_path(&cwd, Some(path), &cli.input);
    let zod = import_path(&cwd, Some(path), schemas_path);
    write_file(path, &output.get_integration_tests_file(&types, &zod))?;
  };
  Ok(())
}

fn init_tracing(enabled: bool) {
  if !enabled {
    return;
  }
  let _ = tracing_subscriber::fmt()
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(Level::DEBUG)
    .json()
    .with_ansi(false)
    .with_writer(stderr)
    .try_init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.trace);
  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn config_accepts_both_format_shapes() {
    let config: Config = serde_json::from_str(
      r#"{
        "keepComments": true,
        "names": ["Hero"],
        "customJSDocFormatTypes": {
          "phone": "^\\+\\d+$",
          "slug": { "regex": "^[a-z-]+$", "errorMessage": "Not a slug" }
        }
      }"#,
    )
    .unwrap();
    assert!(config.keep_comments && !config.skip_parse_jsdoc);
    let cli = Cli::parse_from(["zodgen", "src/hero.ts", "--skip-parse-jsdoc"]);
    let options = build_options(&cli, config);
    assert!(options.keep_comments && options.skip_parse_jsdoc);
    assert_eq!(options.source_file, "src/hero.ts");
    assert_eq!(options.custom_formats["phone"].regex, "^\\+\\d+$");
    assert_eq!(
      options.custom_formats["slug"].error_message.as_deref(),
      Some("Not a slug")
    );
    let filter = options.name_filter.unwrap();
    assert!(filter("Hero") && !filter("Villain"));
  }

  #[test]
  fn import_paths_are_relative_to_the_writing_module() {
    let cwd = Path::new("/work");
    assert_eq!(
      import_path(cwd, Some(Path::new("src/hero.zod.ts")), Path::new("src/hero.ts")),
      "./hero"
    );
    assert_eq!(
      import_path(cwd, Some(Path::new("gen/hero.test.ts")), Path::new("src/hero.ts")),
      "../src/hero"
    );
    assert_eq!(import_path(cwd, None, Path::new("hero.d.ts")), "./hero");
  }
}
