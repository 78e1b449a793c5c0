use parse_ts::ast::stmt::Stmt;
use parse_ts::parse;

const SOURCE: &str = r#"
import { Villain } from "./villain";

// Plain comments are not documentation.
/**
 * A super hero.
 * @strict
 */
export interface Superhero {
  /** @minLength 2 */
  name: string;
  age?: number;
  enemies: Villain[];
  powers: Array<"fly" | "strength">;
}

export declare function save(hero: Superhero): Promise<void>;

export default class HeroStore {
  private heroes = new Map<string, Superhero>();
}

export namespace Metropolis {
  export interface Citizen { hero?: Superhero }
}

export type Status = `${"on" | "off"}-duty` | "retired";
"#;

fn decl_names(stmts: &[parse_ts::ast::node::Node<Stmt>]) -> Vec<String> {
  stmts
    .iter()
    .filter_map(|s| s.stx.decl_name().map(|n| n.to_string()))
    .collect()
}

#[test]
fn parses_a_realistic_module() {
  let module = parse(SOURCE).unwrap();
  let body = &module.stx.body;
  assert_eq!(decl_names(body), vec![
    "Superhero".to_string(),
    "Metropolis".to_string(),
    "Status".to_string()
  ]);
  let Stmt::Interface(hero) = body[1].stx.as_ref() else {
    panic!("expected interface, got {:?}", body[1]);
  };
  let doc = hero.stx.doc.as_deref().unwrap();
  assert!(doc.contains("@strict"), "unexpected doc {doc}");
  assert_eq!(hero.stx.members.len(), 4);
  // The function declaration and the class are skipped but still represented.
  let others = body
    .iter()
    .filter(|s| matches!(s.stx.as_ref(), Stmt::Other(_)))
    .count();
  assert_eq!(others, 2);
}

#[test]
fn serializes_with_tags() {
  let module = parse("type A = string | 1;").unwrap();
  let json = serde_json::to_value(&module).unwrap();
  let alias = &json["body"][0];
  assert_eq!(alias["$t"], "TypeAlias");
  assert_eq!(alias["v"]["name"], "A");
  assert_eq!(alias["v"]["type_expr"]["$t"], "Union");
}

#[test]
fn reports_unterminated_declarations() {
  let err = parse("export interface Broken {\n  a: string;\n").unwrap_err();
  assert!(
    err.describe("export interface Broken {\n  a: string;\n").contains("PT0006"),
    "unexpected error {err:?}"
  );
}
