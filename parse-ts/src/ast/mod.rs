use derive_visitor::Drive;
use derive_visitor::DriveMut;
use node::Node;
use serde::Serialize;
use stmt::Stmt;

pub mod expr;
pub mod node;
pub mod stmt;
pub mod type_expr;

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct Module {
  pub body: Vec<Node<Stmt>>,
}
