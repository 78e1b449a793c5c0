use super::Parser;
use crate::ast::expr::ArrayExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::ObjectExpr;
use crate::ast::expr::ObjectMember;
use crate::ast::node::Node;
use crate::error::SyntaxResult;
use crate::token::Token;
use crate::token::STATEMENT_STARTS;
use crate::token::TT;

// Tokens that end an initialiser expression at bracket depth zero.
fn ends_expr(t: &Token) -> bool {
  matches!(
    t.typ,
    TT::Comma | TT::Semicolon | TT::ParenthesisClose | TT::BracketClose | TT::BraceClose
  ) || (t.preceded_by_line_terminator && STATEMENT_STARTS.contains(&t.typ))
}

impl<'a> Parser<'a> {
  /// Parses an initialiser. Only literal values, identifiers and object/array literals of those are
  /// understood; any other expression is consumed and yields `Expr::Unknown`.
  pub fn expr(&mut self) -> SyntaxResult<Node<Expr>> {
    let start = self.peek().loc;
    let mut expr = self.expr_primary()?;
    loop {
      let t = self.peek();
      match t.typ {
        TT::KeywordAs | TT::KeywordSatisfies if !t.preceded_by_line_terminator => {
          self.consume();
          if t.typ == TT::KeywordAs && self.consume_if(TT::KeywordConst).is_match() {
            continue;
          };
          self.type_expr()?;
        }
        TT::Exclamation => {
          self.consume();
        }
        _ => break,
      };
    }
    if !ends_expr(&self.peek()) && self.peek().typ != TT::EOF {
      self.skip_balanced(ends_expr);
      expr = Node::new(self.since(start), Expr::Unknown);
    };
    expr.loc = self.since(start);
    Ok(expr)
  }

  fn expr_primary(&mut self) -> SyntaxResult<Node<Expr>> {
    let t = self.peek();
    let start = t.loc;
    let expr = match t.typ {
      TT::LiteralString => Expr::String(self.lit_str_val()?),
      TT::LiteralNumber => Expr::Number(self.lit_num_val()?),
      TT::LiteralBigInt => Expr::BigInt(self.lit_num_val()?),
      TT::Hyphen if self.peek_2().1.typ == TT::LiteralNumber => {
        self.consume();
        Expr::Number(format!("-{}", self.lit_num_val()?))
      }
      TT::LiteralTrue | TT::LiteralFalse => {
        self.consume();
        Expr::Bool(t.typ == TT::LiteralTrue)
      }
      TT::LiteralNull => {
        self.consume();
        Expr::Null
      }
      TT::LiteralTemplatePartStringEnd => {
        self.consume();
        Expr::String(self.template_part_val(t.loc, true, true)?)
      }
      TT::BraceOpen => Expr::Object(self.object_expr()?),
      TT::BracketOpen => Expr::Array(self.array_expr()?),
      TT::KeywordUndefinedType => {
        self.consume();
        Expr::Ident("undefined".to_string())
      }
      typ if typ.is_identifier_like() => Expr::Ident(self.consume_as_string()),
      _ => {
        self.skip_balanced(ends_expr);
        Expr::Unknown
      }
    };
    Ok(Node::new(self.since(start), expr))
  }

  fn object_expr(&mut self) -> SyntaxResult<Node<ObjectExpr>> {
    let start = self.require(TT::BraceOpen)?.loc;
    let mut members = Vec::new();
    while self.peek().typ != TT::BraceClose && self.peek().typ != TT::EOF {
      let (k, next) = self.peek_2();
      let member_start = k.loc;
      let key = match k.typ {
        TT::LiteralString => Some(self.lit_str_val()?),
        TT::LiteralNumber => Some(self.lit_num_val()?),
        typ if typ == TT::Identifier || typ.is_keyword() => {
          if matches!(next.typ, TT::Colon | TT::Comma | TT::BraceClose) {
            Some(self.consume_as_string())
          } else {
            None
          }
        }
        _ => None,
      };
      match key {
        Some(key) if self.consume_if(TT::Colon).is_match() => {
          let value = self.expr()?;
          members.push(Node::new(self.since(member_start), ObjectMember { key, value }));
        }
        // Shorthand property.
        Some(key) if k.typ == TT::Identifier || k.typ.is_keyword() => {
          let value = Node::new(k.loc, Expr::Ident(key.clone()));
          members.push(Node::new(self.since(member_start), ObjectMember { key, value }));
        }
        // Spreads, methods, computed keys and accessors.
        _ => self.skip_balanced(|t| matches!(t.typ, TT::Comma | TT::BraceClose)),
      };
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::BraceClose)?;
    Ok(Node::new(self.since(start), ObjectExpr { members }))
  }

  fn array_expr(&mut self) -> SyntaxResult<Node<ArrayExpr>> {
    let start = self.require(TT::BracketOpen)?.loc;
    let mut elements = Vec::new();
    while self.peek().typ != TT::BracketClose && self.peek().typ != TT::EOF {
      if self.peek().typ == TT::Comma {
        // Hole.
        self.consume();
        continue;
      };
      elements.push(self.expr()?);
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::BracketClose)?;
    Ok(Node::new(self.since(start), ArrayExpr { elements }))
  }
}
