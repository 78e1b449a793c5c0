use ast::node::Node;
use ast::Module;
use error::SyntaxResult;
use lex::Lexer;
use parse::Parser;

pub mod ast;
pub mod char;
pub mod error;
pub mod lex;
pub mod loc;
pub mod parse;
pub mod token;

/// Parses the declaration-level structure of a TypeScript module.
///
/// Interfaces, type aliases, enums, namespaces, imports, exports and variable declarations are
/// parsed fully. Any other statement (functions, classes, expressions) is skipped and kept as an
/// opaque [`ast::stmt::Stmt::Other`] so that ordinary source files can be processed.
///
/// ```
/// use parse_ts::ast::stmt::Stmt;
///
/// let module = parse_ts::parse("export interface Hero { name: string }").unwrap();
/// assert!(matches!(module.stx.body[0].stx.as_ref(), Stmt::Interface(_)));
/// ```
pub fn parse(source: &str) -> SyntaxResult<Node<Module>> {
  let lexer = Lexer::new(source);
  let mut parser = Parser::new(lexer);
  parser.parse_module()
}
