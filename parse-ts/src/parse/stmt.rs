use super::Parser;
use crate::ast::node::Node;
use crate::ast::stmt::*;
use crate::ast::type_expr::TypeExpr;
use crate::ast::Module;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::STATEMENT_STARTS;
use crate::token::TT;

/// Modifiers seen before the declaration keyword.
#[derive(Clone, Default)]
struct DeclHead {
  export: bool,
  export_default: bool,
  declare: bool,
  doc: Option<String>,
  start: Loc,
}

impl<'a> Parser<'a> {
  pub fn parse_module(&mut self) -> SyntaxResult<Node<Module>> {
    let mut body = Vec::new();
    while self.peek().typ != TT::EOF {
      body.push(self.stmt()?);
    }
    Ok(Node::new(self.source_range(), Module { body }))
  }

  fn stmts_in_braces(&mut self) -> SyntaxResult<Vec<Node<Stmt>>> {
    self.require(TT::BraceOpen)?;
    let mut body = Vec::new();
    loop {
      let t = self.peek();
      match t.typ {
        TT::BraceClose => break,
        TT::EOF => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
        _ => body.push(self.stmt()?),
      };
    }
    self.require(TT::BraceClose)?;
    Ok(body)
  }

  pub fn stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let t = self.peek();
    let head = DeclHead {
      doc: self.doc_text(&t),
      start: t.loc,
      ..Default::default()
    };
    match t.typ {
      TT::KeywordExport => self.export_stmt(head),
      TT::KeywordImport => self.import_stmt(head),
      TT::Semicolon => {
        self.consume();
        Ok(Node::new(t.loc, Stmt::Other(Node::new(t.loc, OtherStmt {}))))
      }
      _ => self.decl_or_other(head),
    }
  }

  fn decl_or_other(&mut self, mut head: DeclHead) -> SyntaxResult<Node<Stmt>> {
    let (a, b, c) = self.peek_3();
    if head.doc.is_none() {
      head.doc = self.doc_text(&a);
    };
    let on_same_line = !b.preceded_by_line_terminator;
    match a.typ {
      TT::KeywordDeclare
        if on_same_line
          && matches!(
            b.typ,
            TT::KeywordInterface
              | TT::KeywordType
              | TT::KeywordEnum
              | TT::KeywordConst
              | TT::KeywordLet
              | TT::KeywordVar
              | TT::KeywordNamespace
              | TT::KeywordModule
          ) =>
      {
        self.consume();
        head.declare = true;
        self.decl_or_other(head)
      }
      TT::KeywordInterface if b.typ.is_identifier_like() => self.interface_decl(head),
      TT::KeywordType if b.typ.is_identifier_like() && on_same_line => self.type_alias_decl(head),
      TT::KeywordEnum => self.enum_decl(head, false),
      TT::KeywordConst if b.typ == TT::KeywordEnum => {
        self.consume();
        self.enum_decl(head, true)
      }
      TT::KeywordNamespace | TT::KeywordModule
        if b.typ.is_identifier_like() && on_same_line && c.typ != TT::Equals =>
      {
        self.namespace_decl(head)
      }
      TT::KeywordConst | TT::KeywordVar => self.var_decl(head),
      TT::KeywordLet if b.typ.is_identifier_like() => self.var_decl(head),
      _ => Ok(self.skip_statement(head.start)),
    }
  }

  /// Skips a statement outside the declaration subset. Stops after a `;` or before a `}` at depth zero,
  /// and before a statement keyword that starts a new line or directly follows a closed block.
  pub fn skip_statement(&mut self, start: Loc) -> Node<Stmt> {
    let mut stack = Vec::<TT>::new();
    let mut consumed = false;
    let mut closed_block = false;
    loop {
      let t = self.peek();
      if t.typ == TT::EOF {
        break;
      };
      if stack.is_empty() && consumed {
        if t.typ == TT::BraceClose {
          break;
        };
        if (t.preceded_by_line_terminator || closed_block) && STATEMENT_STARTS.contains(&t.typ) {
          break;
        };
      };
      self.consume();
      consumed = true;
      if t.typ == TT::Semicolon && stack.is_empty() {
        break;
      };
      self.track_bracket(&mut stack, t.typ);
      closed_block = t.typ == TT::BraceClose && stack.is_empty();
    }
    let loc = self.since(start);
    Node::new(loc, Stmt::Other(Node::new(loc, OtherStmt {})))
  }

  fn end_of_stmt(&mut self) {
    let _ = self.consume_if(TT::Semicolon);
  }

  fn export_stmt(&mut self, mut head: DeclHead) -> SyntaxResult<Node<Stmt>> {
    self.require(TT::KeywordExport)?;
    head.export = true;
    let (a, b, c) = self.peek_3();
    match a.typ {
      TT::KeywordDefault => {
        self.consume();
        head.export_default = true;
        match b.typ {
          TT::KeywordInterface => self.interface_decl(head),
          TT::KeywordEnum => self.enum_decl(head, false),
          typ if typ.is_identifier_like()
            && (matches!(c.typ, TT::Semicolon | TT::EOF) || c.preceded_by_line_terminator) =>
          {
            let name = self.consume_as_string();
            self.end_of_stmt();
            let decl = Node::new(self.since(head.start), ExportDefaultDecl { name });
            Ok(Node::new(self.since(head.start), Stmt::ExportDefault(decl)))
          }
          _ => Ok(self.skip_statement(head.start)),
        }
      }
      TT::BraceOpen => self.export_list(head, false),
      TT::KeywordType if b.typ == TT::BraceOpen => {
        self.consume();
        self.export_list(head, true)
      }
      _ => self.decl_or_other(head),
    }
  }

  /// Name in an import or export specifier; may be a keyword (`default`) or a string.
  fn module_export_name(&mut self) -> SyntaxResult<String> {
    let t = self.peek();
    match t.typ {
      TT::LiteralString => self.lit_str_val(),
      typ if typ == TT::Identifier || typ.is_keyword() => Ok(self.consume_as_string()),
      _ => Err(t.error(SyntaxErrorType::ExpectedSyntax("import or export name"))),
    }
  }

  /// Whether `type` at the current position is a specifier modifier rather than a name.
  fn at_type_modifier(&mut self) -> bool {
    let (a, b) = self.peek_2();
    a.typ == TT::KeywordType
      && !matches!(
        b.typ,
        TT::Comma | TT::BraceClose | TT::KeywordAs | TT::KeywordFrom | TT::Equals
      )
  }

  fn export_list(&mut self, head: DeclHead, type_only: bool) -> SyntaxResult<Node<Stmt>> {
    self.require(TT::BraceOpen)?;
    let mut names = Vec::new();
    while self.peek().typ != TT::BraceClose {
      if self.at_type_modifier() {
        self.consume();
      };
      let local = self.module_export_name()?;
      let exported = if self.consume_if(TT::KeywordAs).is_match() {
        self.module_export_name()?
      } else {
        local.clone()
      };
      names.push(ExportName { local, exported });
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::BraceClose)?;
    let from = if self.consume_if(TT::KeywordFrom).is_match() {
      Some(self.lit_str_val()?)
    } else {
      None
    };
    self.end_of_stmt();
    let decl = Node::new(self.since(head.start), ExportListDecl {
      type_only,
      names,
      from,
    });
    Ok(Node::new(self.since(head.start), Stmt::ExportList(decl)))
  }

  fn import_stmt(&mut self, head: DeclHead) -> SyntaxResult<Node<Stmt>> {
    let (_, b, c) = self.peek_3();
    // Dynamic `import(...)`, `import.meta` and `import x = require(...)` are not declarations.
    if matches!(b.typ, TT::ParenthesisOpen | TT::Dot) || c.typ == TT::Equals {
      return Ok(self.skip_statement(head.start));
    };
    self.require(TT::KeywordImport)?;
    let (a, b, c) = self.peek_3();
    let type_only = a.typ == TT::KeywordType
      && (matches!(b.typ, TT::BraceOpen | TT::Asterisk)
        || (b.typ.is_identifier_like() && !(b.typ == TT::KeywordFrom && c.typ == TT::LiteralString)));
    if type_only {
      self.consume();
    };
    if self.peek_2().1.typ == TT::Equals {
      // `import type X = require(...)`.
      return Ok(self.skip_statement(head.start));
    };

    let mut default = None;
    let mut namespace = None;
    let mut names = Vec::new();
    if self.peek().typ != TT::LiteralString {
      if self.peek().typ.is_identifier_like() {
        default = Some(self.require_identifier()?);
        let _ = self.consume_if(TT::Comma);
      };
      if self.consume_if(TT::Asterisk).is_match() {
        self.require(TT::KeywordAs)?;
        namespace = Some(self.require_identifier()?);
      } else if self.consume_if(TT::BraceOpen).is_match() {
        while self.peek().typ != TT::BraceClose {
          let name_type_only = self.at_type_modifier();
          if name_type_only {
            self.consume();
          };
          let imported = self.module_export_name()?;
          let local = if self.consume_if(TT::KeywordAs).is_match() {
            self.require_identifier()?
          } else {
            imported.clone()
          };
          names.push(ImportName {
            imported,
            local,
            type_only: name_type_only,
          });
          if !self.consume_if(TT::Comma).is_match() {
            break;
          };
        }
        self.require(TT::BraceClose)?;
      };
      self.require(TT::KeywordFrom)?;
    };
    let module = self.lit_str_val()?;
    // Import attributes: `with { type: "json" }`.
    if self.peek().typ == TT::Identifier && !self.peek().preceded_by_line_terminator {
      self.consume();
      self.skip_group();
    };
    self.end_of_stmt();
    let decl = Node::new(self.since(head.start), ImportDecl {
      type_only,
      default,
      namespace,
      names,
      module,
    });
    Ok(Node::new(self.since(head.start), Stmt::Import(decl)))
  }

  fn interface_decl(&mut self, head: DeclHead) -> SyntaxResult<Node<Stmt>> {
    self.require(TT::KeywordInterface)?;
    let name = self.require_identifier()?;
    let type_parameters = self.type_parameters_opt()?;
    let mut extends = Vec::new();
    let mut extends_clauses = 0;
    while self.consume_if(TT::KeywordExtends).is_match() {
      extends_clauses += 1;
      loop {
        let start = self.peek().loc;
        let reference = self.type_reference()?;
        extends.push(Node::new(self.since(start), TypeExpr::Reference(reference)));
        if !self.consume_if(TT::Comma).is_match() {
          break;
        };
      }
    }
    let members = self.object_type_members()?;
    let decl = Node::new(self.since(head.start), InterfaceDecl {
      export: head.export,
      export_default: head.export_default,
      declare: head.declare,
      name,
      doc: head.doc,
      type_parameters,
      extends,
      extends_clauses,
      members,
    });
    Ok(Node::new(self.since(head.start), Stmt::Interface(decl)))
  }

  fn type_alias_decl(&mut self, head: DeclHead) -> SyntaxResult<Node<Stmt>> {
    self.require(TT::KeywordType)?;
    let name = self.require_identifier()?;
    let type_parameters = self.type_parameters_opt()?;
    self.require(TT::Equals)?;
    let type_expr = self.type_expr()?;
    self.end_of_stmt();
    let decl = Node::new(self.since(head.start), TypeAliasDecl {
      export: head.export,
      declare: head.declare,
      name,
      doc: head.doc,
      type_parameters,
      type_expr,
    });
    Ok(Node::new(self.since(head.start), Stmt::TypeAlias(decl)))
  }

  fn enum_decl(&mut self, head: DeclHead, const_: bool) -> SyntaxResult<Node<Stmt>> {
    self.require(TT::KeywordEnum)?;
    let name = self.require_identifier()?;
    self.require(TT::BraceOpen)?;
    let mut members = Vec::new();
    while self.peek().typ != TT::BraceClose {
      let start = self.peek().loc;
      let member_name = self.module_export_name()?;
      let initializer = if self.consume_if(TT::Equals).is_match() {
        Some(self.expr()?)
      } else {
        None
      };
      members.push(Node::new(self.since(start), EnumMember {
        name: member_name,
        initializer,
      }));
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::BraceClose)?;
    let decl = Node::new(self.since(head.start), EnumDecl {
      export: head.export,
      export_default: head.export_default,
      declare: head.declare,
      const_,
      name,
      doc: head.doc,
      members,
    });
    Ok(Node::new(self.since(head.start), Stmt::Enum(decl)))
  }

  fn namespace_decl(&mut self, head: DeclHead) -> SyntaxResult<Node<Stmt>> {
    self.require_predicate(
      |t| t == TT::KeywordNamespace || t == TT::KeywordModule,
      "namespace",
    )?;
    let outer_name = self.require_identifier()?;
    let mut inner_names = Vec::new();
    while self.consume_if(TT::Dot).is_match() {
      inner_names.push(self.require_identifier()?);
    }
    if self.peek().typ != TT::BraceOpen {
      // Ambient shorthand `declare module Foo;`.
      return Ok(self.skip_statement(head.start));
    };
    let mut body = self.stmts_in_braces()?;
    let loc = self.since(head.start);
    // `namespace A.B { }` is `namespace A { export namespace B { } }`.
    for name in inner_names.into_iter().rev() {
      let decl = Node::new(loc, NamespaceDecl {
        export: true,
        declare: head.declare,
        name,
        doc: None,
        body,
      });
      body = vec![Node::new(loc, Stmt::Namespace(decl))];
    }
    let decl = Node::new(loc, NamespaceDecl {
      export: head.export,
      declare: head.declare,
      name: outer_name,
      doc: head.doc,
      body,
    });
    Ok(Node::new(loc, Stmt::Namespace(decl)))
  }

  fn var_decl(&mut self, head: DeclHead) -> SyntaxResult<Node<Stmt>> {
    let kind = match self.consume().typ {
      TT::KeywordConst => VarDeclKind::Const,
      TT::KeywordLet => VarDeclKind::Let,
      _ => VarDeclKind::Var,
    };
    let mut declarators = Vec::new();
    loop {
      let start = self.peek().loc;
      if !self.peek().typ.is_identifier_like() {
        // Destructuring patterns bind nothing addressable as a type.
        return Ok(self.skip_statement(head.start));
      };
      let name = self.require_identifier()?;
      let _ = self.consume_if(TT::Exclamation);
      let type_annotation = if self.consume_if(TT::Colon).is_match() {
        Some(self.type_expr()?)
      } else {
        None
      };
      let initializer = if self.consume_if(TT::Equals).is_match() {
        Some(self.expr()?)
      } else {
        None
      };
      declarators.push(Node::new(self.since(start), VarDeclarator {
        name,
        type_annotation,
        initializer,
      }));
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.end_of_stmt();
    let decl = Node::new(self.since(head.start), VarDecl {
      export: head.export,
      declare: head.declare,
      kind,
      declarators,
    });
    Ok(Node::new(self.since(head.start), Stmt::VarDecl(decl)))
  }
}
