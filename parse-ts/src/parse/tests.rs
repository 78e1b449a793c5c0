use super::Parser;
use crate::ast::node::Node;
use crate::ast::stmt::Stmt;
use crate::ast::type_expr::*;
use crate::lex::Lexer;
use crate::parse;
use crate::token::TT;

fn type_of(src: &str) -> Node<TypeExpr> {
  let mut p = Parser::new(Lexer::new(src));
  let t = p.type_expr().unwrap();
  assert_eq!(p.peek().typ, TT::EOF, "trailing tokens in {src}");
  t
}

fn body(src: &str) -> Vec<Node<Stmt>> {
  parse(src).unwrap().stx.body
}

#[test]
fn test_parser_buffer() {
  let mut p = Parser::new(Lexer::new("type A = B;"));
  let cp = p.checkpoint();
  assert_eq!(p.peek().typ, TT::KeywordType);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.consume().typ, TT::KeywordType);
  assert_eq!(p.consume().typ, TT::Identifier);
  assert_eq!(p.next_tok_i, 2);
  p.restore_checkpoint(cp);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 2);
  assert_eq!(p.peek_2().1.typ, TT::Identifier);
}

#[test]
fn test_union_and_literals() {
  let t = type_of("| \"a\" | -1 | true | null");
  let TypeExpr::Union(u) = t.stx.as_ref() else {
    panic!("expected union, got {:?}", t);
  };
  let types: Vec<_> = u.stx.types.iter().map(|t| t.stx.as_ref().clone()).collect();
  assert!(matches!(&types[0], TypeExpr::Literal(TypeLiteral::String(s)) if s == "a"));
  assert!(matches!(&types[1], TypeExpr::Literal(TypeLiteral::Number(n)) if n == "-1"));
  assert!(matches!(&types[2], TypeExpr::Literal(TypeLiteral::Boolean(true))));
  assert!(matches!(&types[3], TypeExpr::Keyword(TypeKeyword::Null)));
}

#[test]
fn test_function_vs_parenthesized() {
  assert!(matches!(
    type_of("(a: string, b?) => void").stx.as_ref(),
    TypeExpr::Function(_)
  ));
  assert!(matches!(
    type_of("(string | number)[]").stx.as_ref(),
    TypeExpr::Array(_)
  ));
  let t = type_of("({ a }: { a: string }) => number");
  let TypeExpr::Function(f) = t.stx.as_ref() else {
    panic!("expected function, got {:?}", t);
  };
  assert_eq!(f.stx.parameters[0].stx.name, "{ a }");
}

#[test]
fn test_postfix_and_operators() {
  let t = type_of("readonly string[]");
  assert!(matches!(t.stx.as_ref(), TypeExpr::Array(a) if a.stx.readonly));
  let t = type_of("Hero[\"name\"][number]");
  let TypeExpr::IndexedAccess(outer) = t.stx.as_ref() else {
    panic!("expected indexed access, got {:?}", t);
  };
  assert!(matches!(
    outer.stx.index_type.stx.as_ref(),
    TypeExpr::Keyword(TypeKeyword::Number)
  ));
  assert!(matches!(
    type_of("(typeof Colors)[keyof typeof Colors]").stx.as_ref(),
    TypeExpr::IndexedAccess(_)
  ));
}

#[test]
fn test_conditional_and_mapped() {
  assert!(matches!(
    type_of("T extends string ? \"s\" : never").stx.as_ref(),
    TypeExpr::Conditional(_)
  ));
  assert!(matches!(
    type_of("{ readonly [K in keyof T]?: T[K] }").stx.as_ref(),
    TypeExpr::Mapped(_)
  ));
  let t = type_of("`prefix-${string}-suffix`");
  let TypeExpr::TemplateLiteral(tpl) = t.stx.as_ref() else {
    panic!("expected template literal, got {:?}", t);
  };
  assert_eq!(tpl.stx.head, "prefix-");
  assert_eq!(tpl.stx.spans[0].stx.literal, "-suffix");
}

#[test]
fn test_qualified_reference_with_arguments() {
  let t = type_of("A.B.C<string, Record<string, number>>");
  let r = t.stx.as_reference().unwrap();
  assert_eq!(r.name.to_string(), "A.B.C");
  assert_eq!(r.name.root(), "A");
  assert_eq!(r.type_arguments.len(), 2);
}

#[test]
fn test_members() {
  let t = type_of(
    "{ /** The name */ readonly name: string; age?: number, readonly: boolean; [key: string]: unknown; greet(x: string): void; get size(): number; new (): Foo; }",
  );
  let TypeExpr::Object(o) = t.stx.as_ref() else {
    panic!("expected object, got {:?}", t);
  };
  let members = &o.stx.members;
  assert_eq!(members.len(), 7);
  let TypeMember::Property(name) = members[0].stx.as_ref() else {
    panic!("expected property");
  };
  assert!(name.stx.readonly);
  assert_eq!(name.stx.doc.as_deref(), Some("/** The name */"));
  let TypeMember::Property(age) = members[1].stx.as_ref() else {
    panic!("expected property");
  };
  assert!(age.stx.optional);
  let TypeMember::Property(ro) = members[2].stx.as_ref() else {
    panic!("expected property");
  };
  assert_eq!(ro.stx.key, TypePropertyKey::Identifier("readonly".into()));
  assert!(!ro.stx.readonly);
  assert!(matches!(members[3].stx.as_ref(), TypeMember::IndexSignature(_)));
  assert!(matches!(members[4].stx.as_ref(), TypeMember::Method(_)));
  assert!(matches!(members[5].stx.as_ref(), TypeMember::Property(_)));
  assert!(matches!(members[6].stx.as_ref(), TypeMember::ConstructSignature(_)));
}

#[test]
fn test_declarations() {
  let stmts = body(
    r#"
/** A hero */
export interface Hero extends Base, Other<string> {
  name: string;
}
export type Name = "a" | "b";
declare const enum Color { Red = "red", Green = 1 }
namespace A.B { export type C = string }
"#,
  );
  assert_eq!(stmts.len(), 4);
  let Stmt::Interface(hero) = stmts[0].stx.as_ref() else {
    panic!("expected interface");
  };
  assert!(hero.stx.export);
  assert_eq!(hero.stx.doc.as_deref(), Some("/** A hero */"));
  assert_eq!(hero.stx.extends.len(), 2);
  assert_eq!(hero.stx.extends_clauses, 1);
  let Stmt::Enum(color) = stmts[2].stx.as_ref() else {
    panic!("expected enum");
  };
  assert!(color.stx.const_ && color.stx.declare);
  assert_eq!(color.stx.members.len(), 2);
  let Stmt::Namespace(a) = stmts[3].stx.as_ref() else {
    panic!("expected namespace");
  };
  assert_eq!(a.stx.name, "A");
  assert!(matches!(a.stx.body[0].stx.as_ref(), Stmt::Namespace(b) if b.stx.name == "B" && b.stx.export));
}

#[test]
fn test_imports_and_exports() {
  let stmts = body(
    r#"
import Def, { A, B as C, type D } from "./mod";
import type { E } from "../e";
import * as NS from "ns";
export { A as Alias, C };
export default Hero;
"#,
  );
  let Stmt::Import(i) = stmts[0].stx.as_ref() else {
    panic!("expected import");
  };
  assert_eq!(i.stx.default.as_deref(), Some("Def"));
  assert_eq!(i.stx.module, "./mod");
  assert_eq!(i.stx.names.len(), 3);
  assert_eq!(i.stx.names[1].imported, "B");
  assert_eq!(i.stx.names[1].local, "C");
  assert!(i.stx.names[2].type_only);
  assert!(matches!(stmts[1].stx.as_ref(), Stmt::Import(i) if i.stx.type_only));
  assert!(matches!(stmts[2].stx.as_ref(), Stmt::Import(i) if i.stx.namespace.as_deref() == Some("NS")));
  let Stmt::ExportList(e) = stmts[3].stx.as_ref() else {
    panic!("expected export list");
  };
  assert_eq!(e.stx.names[0].local, "A");
  assert_eq!(e.stx.names[0].exported, "Alias");
  assert!(matches!(stmts[4].stx.as_ref(), Stmt::ExportDefault(d) if d.stx.name == "Hero"));
}

#[test]
fn test_skips_unsupported_statements() {
  let stmts = body(
    r#"
function f(a: number) { return `${a}}`; }
class X { y = { z: 1 } }
const x = foo(1) + 2, y = "s";
export const Colors = { Red: "red", Blue: "blue" } as const;
interface After { ok: boolean }
"#,
  );
  assert!(matches!(stmts[0].stx.as_ref(), Stmt::Other(_)));
  assert!(matches!(stmts[1].stx.as_ref(), Stmt::Other(_)));
  let Stmt::VarDecl(v) = stmts[2].stx.as_ref() else {
    panic!("expected var decl, got {:?}", stmts[2]);
  };
  assert_eq!(v.stx.declarators.len(), 2);
  let Stmt::VarDecl(colors) = stmts[3].stx.as_ref() else {
    panic!("expected var decl");
  };
  assert!(colors.stx.export);
  assert!(matches!(stmts[4].stx.as_ref(), Stmt::Interface(i) if i.stx.name == "After"));
}
