use similar::ChangeTag;
use similar::TextDiff;
use zodgen_js::generate;
use zodgen_js::GenerateError;
use zodgen_js::GenerateOptions;
use zodgen_js::GenerateOutput;
use zodgen_js::MemoryHost;

fn assert_text_eq(actual: &str, expected: &str) {
  if actual == expected {
    return;
  };
  let mut diff = String::new();
  for change in TextDiff::from_lines(expected, actual).iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => "-",
      ChangeTag::Insert => "+",
      ChangeTag::Equal => " ",
    };
    diff.push_str(&format!("{sign}{change}"));
  }
  panic!("generated output differs from expected:\n{diff}");
}

fn run(source: &str) -> GenerateOutput {
  generate(source, &GenerateOptions::default(), &MemoryHost::new()).unwrap()
}

#[test]
fn dependencies_are_defined_first() {
  let source = "export interface Hero { name: Name }\nexport type Name = string;\n";
  let options = GenerateOptions::default().with_name_filter(|name| name == "Hero");
  let output = generate(source, &options, &MemoryHost::new()).unwrap();
  assert!(output.errors.is_empty());
  assert!(!output.has_circular_dependencies);
  assert_text_eq(
    &output.get_zod_schemas_file("./hero"),
    r#"// Generated by ts-to-zod
import { z } from "zod";

export const nameSchema = z.string();

export const heroSchema = z.object({
  name: nameSchema,
});
"#,
  );
}

#[test]
fn output_is_deterministic() {
  let source = r#"
export interface Villain { name: string; hero: Hero }
export interface Hero { name: string; villains: Villain[] }
export type Team = { heroes: Hero[]; size: number };
"#;
  let first = run(source);
  let second = run(source);
  assert_eq!(
    first.get_zod_schemas_file("./types"),
    second.get_zod_schemas_file("./types")
  );
  assert_eq!(first.errors, second.errors);
}

#[test]
fn cycles_become_lazy() {
  let output = run("export interface A { b?: B }\nexport interface B { a: A }\n");
  assert!(output.has_circular_dependencies);
  assert!(output.errors.is_empty());
  assert_text_eq(
    &output.get_zod_schemas_file("./types"),
    r#"// Generated by ts-to-zod
import { z } from "zod";
import { A, B } from "./types";

export const aSchema: z.ZodSchema<A> = z.lazy(() => z.object({
  b: bSchema.optional(),
}));

export const bSchema: z.ZodSchema<B> = z.lazy(() => z.object({
  a: aSchema,
}));
"#,
  );
}

#[test]
fn missing_imports_are_reported_once() {
  let output = run(
    "import { Villain } from \"./villain\";\nexport interface Hero { nemesis: Villain }\nexport interface Team { leader: Hero }\nexport type Name = string;\n",
  );
  assert_eq!(
    output.errors,
    vec![
      "Some schemas can't be generated due to direct or indirect missing dependencies:\nheroSchema\nteamSchema"
        .to_string()
    ]
  );
  let vars: Vec<_> = output.statements().iter().map(|s| s.var_name.as_str()).collect();
  assert_eq!(vars, vec!["nameSchema"]);
}

#[test]
fn refinement_chain_order() {
  let output = run(
    r#"
export interface Hero {
  /** @default 3 @minimum 1 */
  level?: number;
  /** @pattern ^clark @format email */
  email: string;
}
"#,
  );
  let file = output.get_zod_schemas_file("./hero");
  assert!(file.contains("  level: z.number().min(1).optional().default(3),\n"));
  assert!(file.contains("  email: z.string().email().regex(/^clark/),\n"));
}

#[test]
fn strict_comes_before_partial_and_optional() {
  let output = run("export interface Hero {\n  /** @strict */\n  stats?: Partial<{ hp: number }>;\n}\n");
  assert!(output.get_zod_schemas_file("./hero").contains(
    "  stats: z.object({\n    hp: z.number(),\n  }).strict().partial().optional(),\n"
  ));
}

#[test]
fn discriminated_union_members_may_inherit_or_be_imported() {
  let host = MemoryHost::new().with_file("src/cat.ts", "export interface Cat { kind: \"cat\" }\n");
  let source = r#"
import { Cat } from "./cat";
export interface Base { kind: "dog" }
export interface Dog extends Base { bark: boolean }
/** @discriminator kind */
export type Pet = Dog | Cat;
"#;
  let options = GenerateOptions::default().with_source_file("src/pet.ts");
  let output = generate(source, &options, &host).unwrap();
  assert!(output.errors.is_empty(), "{:?}", output.errors);
  assert!(output
    .get_zod_schemas_file("./pet")
    .contains("export const petSchema = z.discriminatedUnion(\"kind\", [dogSchema, catSchema]);"));
}

#[test]
fn enums_are_imported() {
  let output = run(
    "export enum Color { Red = \"red\", Blue = \"blue\" }\nexport interface Car { color: Color; red: Color.Red }\n",
  );
  assert_text_eq(
    &output.get_zod_schemas_file("./car"),
    r#"// Generated by ts-to-zod
import { z } from "zod";
import { Color } from "./car";

export const colorSchema = z.nativeEnum(Color);

export const carSchema = z.object({
  color: colorSchema,
  red: z.literal(Color.Red),
});
"#,
  );
}

#[test]
fn namespaces_are_flattened() {
  let output = run(
    "export namespace Metropolis { export type Name = \"Metropolis\"; }\nexport interface Hero { city: Metropolis.Name }\n",
  );
  let schemas = output.get_zod_schemas_file("./hero");
  assert!(schemas.contains("export const metropolisNameSchema = z.literal(\"Metropolis\");"));
  assert!(schemas.contains("  city: metropolisNameSchema,\n"));
  let tests = output.get_integration_tests_file("./hero", "./hero.zod");
  assert!(tests.contains("expectType<spec.Metropolis.Name>({} as metropolisNameSchemaInferredType);"));
}

#[test]
fn follows_imports_across_files() {
  let host = MemoryHost::new()
    .with_file(
      "src/villain.ts",
      "import { Name } from \"./shared/name\";\nexport interface Villain { name: Name }\n",
    )
    .with_file("src/shared/name.ts", "export type Name = string;\n")
    .with_file("src/lair.ts", "export default interface Lair { depth: number }\n");
  let source = r#"
import { Villain as Bad } from "./villain";
import Lair from "./lair";
export interface Hero { nemesis: Bad; lair: Lair }
"#;
  let options = GenerateOptions::default().with_source_file("src/hero.ts");
  let output = generate(source, &options, &host).unwrap();
  assert!(output.errors.is_empty(), "{:?}", output.errors);
  assert_text_eq(
    &output.get_zod_schemas_file("./hero"),
    r#"// Generated by ts-to-zod
import { z } from "zod";

export const nameSchema = z.string();

export const badSchema = z.object({
  name: nameSchema,
});

export const lairSchema = z.object({
  depth: z.number(),
});

export const heroSchema = z.object({
  nemesis: badSchema,
  lair: lairSchema,
});
"#,
  );
  assert_text_eq(
    &output.get_inferred_types_file("./hero.zod"),
    r#"// Generated by ts-to-zod
import { z } from "zod";

import * as generated from "./hero.zod";

export type Name = z.infer<typeof generated.nameSchema>;
export type Bad = z.infer<typeof generated.badSchema>;
export type Lair = z.infer<typeof generated.lairSchema>;
export type Hero = z.infer<typeof generated.heroSchema>;
"#,
  );
}

#[test]
fn integration_tests_file() {
  let output = run("export type Name = string;\ninterface Secret { code: string }\nexport interface Hero { name: Name }\n");
  assert_text_eq(
    &output.get_integration_tests_file("./hero", "./hero.zod"),
    r#"// Generated by ts-to-zod
import { z } from "zod";

import * as spec from "./hero";
import * as generated from "./hero.zod";

// eslint-disable-next-line @typescript-eslint/no-unused-vars
function expectType<T>(_: T) {
  /* noop */
}

export type nameSchemaInferredType = z.infer<typeof generated.nameSchema>;
export type heroSchemaInferredType = z.infer<typeof generated.heroSchema>;

expectType<spec.Name>({} as nameSchemaInferredType);
expectType<nameSchemaInferredType>({} as spec.Name);

expectType<spec.Hero>({} as heroSchemaInferredType);
expectType<heroSchemaInferredType>({} as spec.Hero);
"#,
  );
  assert!(output
    .get_zod_schemas_file("./hero")
    .contains("\nconst secretSchema = z.object({"));
}

#[test]
fn jsdoc_tag_filter_selects_roots() {
  let source = "/** @zod */\nexport type A = string;\nexport type B = number;\n";
  let options = GenerateOptions::default()
    .with_jsdoc_tag_filter(|tags| tags.iter().any(|t| t.name == "zod"));
  let output = generate(source, &options, &MemoryHost::new()).unwrap();
  let vars: Vec<_> = output.statements().iter().map(|s| s.var_name.as_str()).collect();
  assert_eq!(vars, vec!["aSchema"]);
}

#[test]
fn colliding_schema_names_skip_later_declarations() {
  let options = GenerateOptions::default().with_schema_name(|_| "shared".to_string());
  let output = generate(
    "export type A = string;\nexport type B = number;\n",
    &options,
    &MemoryHost::new(),
  )
  .unwrap();
  let vars: Vec<_> = output.statements().iter().map(|s| s.var_name.as_str()).collect();
  assert_eq!(vars, vec!["shared"]);
  assert_eq!(
    output.errors,
    vec!["`B` from source.ts was skipped: its schema name `shared` is already taken".to_string()]
  );
}

#[test]
fn comments_are_kept_on_request() {
  let source = "/** A hero */\nexport interface Hero {\n  /** Their name */\n  name: string;\n}\n";
  let options = GenerateOptions::default().with_keep_comments(true);
  let output = generate(source, &options, &MemoryHost::new()).unwrap();
  assert!(output.get_zod_schemas_file("./hero").contains(
    "/** A hero */\nexport const heroSchema = z.object({\n  /** Their name */\n  name: z.string(),\n});"
  ));
}

#[test]
fn fatal_conditions() {
  let err = generate(
    "export interface Box<T> { value: T }",
    &GenerateOptions::default(),
    &MemoryHost::new(),
  )
  .unwrap_err();
  assert!(matches!(err, GenerateError::GenericDeclaration { ref name } if name == "Box"));
  assert_eq!(err.to_string(), "Generic declarations are not supported: `Box`");

  let err = generate(
    "export interface Hero { name: }",
    &GenerateOptions::default(),
    &MemoryHost::new(),
  )
  .unwrap_err();
  assert!(matches!(err, GenerateError::Syntax { .. }));
}
