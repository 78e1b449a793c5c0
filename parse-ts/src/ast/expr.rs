use super::node::Node;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

/// The value expressions that can appear in enum initialisers and `const` initialisers. Anything else is
/// consumed and represented as `Unknown`.
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
#[serde(tag = "$t", content = "v")]
pub enum Expr {
  String(#[drive(skip)] String),
  // Source text of the number, including a leading `-` if negated.
  Number(#[drive(skip)] String),
  BigInt(#[drive(skip)] String),
  Bool(#[drive(skip)] bool),
  Null,
  Ident(#[drive(skip)] String),
  Object(Node<ObjectExpr>),
  Array(Node<ArrayExpr>),
  Unknown,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct ObjectExpr {
  pub members: Vec<Node<ObjectMember>>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct ObjectMember {
  #[drive(skip)]
  pub key: String,
  pub value: Node<Expr>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct ArrayExpr {
  pub elements: Vec<Node<Expr>>,
}
