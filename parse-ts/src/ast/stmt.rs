use super::expr::Expr;
use super::node::Node;
use super::type_expr::TypeExpr;
use super::type_expr::TypeMember;
use super::type_expr::TypeParameter;
use derive_more::From;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Clone, Debug, Drive, DriveMut, From, Serialize)]
#[serde(tag = "$t", content = "v")]
pub enum Stmt {
  Interface(Node<InterfaceDecl>),
  TypeAlias(Node<TypeAliasDecl>),
  Enum(Node<EnumDecl>),
  Namespace(Node<NamespaceDecl>),
  Import(Node<ImportDecl>),
  ExportList(Node<ExportListDecl>),
  ExportDefault(Node<ExportDefaultDecl>),
  VarDecl(Node<VarDecl>),
  // Any statement outside the declaration subset (functions, classes, expressions, ...), skipped during parsing.
  Other(Node<OtherStmt>),
}

impl Stmt {
  /// The declared name of an interface, type alias, enum or namespace.
  pub fn decl_name(&self) -> Option<&str> {
    match self {
      Stmt::Interface(d) => Some(&d.stx.name),
      Stmt::TypeAlias(d) => Some(&d.stx.name),
      Stmt::Enum(d) => Some(&d.stx.name),
      Stmt::Namespace(d) => Some(&d.stx.name),
      _ => None,
    }
  }
}

/// Interface declaration: interface Foo<T> extends Bar { }
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct InterfaceDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub export_default: bool,
  #[drive(skip)]
  pub declare: bool,
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub doc: Option<String>,
  pub type_parameters: Vec<Node<TypeParameter>>,
  pub extends: Vec<Node<TypeExpr>>,
  // Number of `extends` keywords seen, as opposed to the comma-separated base types.
  #[drive(skip)]
  pub extends_clauses: usize,
  pub members: Vec<Node<TypeMember>>,
}

/// Type alias declaration: type Foo<T> = Bar<T>
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeAliasDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub declare: bool,
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub doc: Option<String>,
  pub type_parameters: Vec<Node<TypeParameter>>,
  pub type_expr: Node<TypeExpr>,
}

/// Enum declaration: enum Color { Red, Green, Blue }
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct EnumDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub export_default: bool,
  #[drive(skip)]
  pub declare: bool,
  #[drive(skip)]
  pub const_: bool,
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub doc: Option<String>,
  pub members: Vec<Node<EnumMember>>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct EnumMember {
  #[drive(skip)]
  pub name: String,
  pub initializer: Option<Node<Expr>>,
}

/// Namespace declaration: namespace Foo { }. `namespace A.B { }` is represented as nested declarations.
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct NamespaceDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub declare: bool,
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub doc: Option<String>,
  pub body: Vec<Node<Stmt>>,
}

/// import D, { A, B as C, type E } from "m"; import * as N from "m"; import type { T } from "m";
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct ImportDecl {
  #[drive(skip)]
  pub type_only: bool,
  #[drive(skip)]
  pub default: Option<String>,
  #[drive(skip)]
  pub namespace: Option<String>,
  #[drive(skip)]
  pub names: Vec<ImportName>,
  #[drive(skip)]
  pub module: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportName {
  pub imported: String,
  pub local: String,
  pub type_only: bool,
}

/// export { A, B as C }; export { A } from "m"; export type { T };
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct ExportListDecl {
  #[drive(skip)]
  pub type_only: bool,
  #[drive(skip)]
  pub names: Vec<ExportName>,
  #[drive(skip)]
  pub from: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportName {
  pub local: String,
  pub exported: String,
}

/// export default Foo;
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct ExportDefaultDecl {
  #[drive(skip)]
  pub name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum VarDeclKind {
  Const,
  Let,
  Var,
}

/// const A = { ... } as const; declare const B: string;
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct VarDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub declare: bool,
  #[drive(skip)]
  pub kind: VarDeclKind,
  pub declarators: Vec<Node<VarDeclarator>>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct VarDeclarator {
  #[drive(skip)]
  pub name: String,
  pub type_annotation: Option<Node<TypeExpr>>,
  pub initializer: Option<Node<Expr>>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct OtherStmt {}
