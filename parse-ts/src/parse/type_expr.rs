use super::Parser;
use crate::ast::node::Node;
use crate::ast::type_expr::*;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::LexMode;
use crate::token::TT;

fn keyword_type(typ: TT) -> Option<TypeKeyword> {
  Some(match typ {
    TT::KeywordAny => TypeKeyword::Any,
    TT::KeywordBigIntType => TypeKeyword::BigInt,
    TT::KeywordBooleanType => TypeKeyword::Boolean,
    TT::KeywordNever => TypeKeyword::Never,
    TT::LiteralNull => TypeKeyword::Null,
    TT::KeywordNumberType => TypeKeyword::Number,
    TT::KeywordObjectType => TypeKeyword::Object,
    TT::KeywordStringType => TypeKeyword::String,
    TT::KeywordSymbolType => TypeKeyword::Symbol,
    TT::KeywordThis => TypeKeyword::This,
    TT::KeywordUndefinedType => TypeKeyword::Undefined,
    TT::KeywordUnknown => TypeKeyword::Unknown,
    TT::KeywordVoid => TypeKeyword::Void,
    _ => return None,
  })
}

fn is_property_key_start(typ: TT) -> bool {
  typ == TT::Identifier
    || typ.is_keyword()
    || matches!(
      typ,
      TT::LiteralString | TT::LiteralNumber | TT::LiteralBigInt | TT::BracketOpen
    )
}

impl<'a> Parser<'a> {
  pub fn type_expr(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    self.type_expr_with(false)
  }

  /// `no_conditional` is set while parsing the `extends` operand of a conditional type, where a nested
  /// `extends` belongs to the enclosing conditional.
  fn type_expr_with(&mut self, no_conditional: bool) -> SyntaxResult<Node<TypeExpr>> {
    if self.is_start_of_function_type() {
      return self.function_type();
    };
    let start = self.peek().loc;
    let check_type = self.type_union()?;
    let t = self.peek();
    if no_conditional || t.typ != TT::KeywordExtends || t.preceded_by_line_terminator {
      return Ok(check_type);
    };
    self.consume();
    let extends_type = self.type_expr_with(true)?;
    self.require(TT::Question)?;
    let true_type = self.type_expr()?;
    self.require(TT::Colon)?;
    let false_type = self.type_expr()?;
    let conditional = Node::new(self.since(start), TypeConditional {
      check_type,
      extends_type,
      true_type,
      false_type,
    });
    Ok(Node::new(
      self.since(start),
      TypeExpr::Conditional(conditional),
    ))
  }

  fn is_start_of_function_type(&mut self) -> bool {
    match self.peek().typ {
      TT::ChevronLeft | TT::KeywordNew => true,
      TT::KeywordAbstract => self.peek_2().1.typ == TT::KeywordNew,
      TT::ParenthesisOpen => {
        // A parenthesised group is a parameter list iff its matching `)` is followed by `=>`.
        let cp = self.checkpoint();
        self.skip_group();
        let is_fn = self.peek().typ == TT::EqualsChevronRight;
        self.restore_checkpoint(cp);
        is_fn
      }
      _ => false,
    }
  }

  fn function_type(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.peek().loc;
    let _ = self.consume_if(TT::KeywordAbstract);
    let is_constructor = self.consume_if(TT::KeywordNew).is_match();
    let type_parameters = self.type_parameters_opt()?;
    let parameters = self.function_parameters()?;
    self.require(TT::EqualsChevronRight)?;
    let return_type = self.type_or_predicate()?;
    let func = Node::new(self.since(start), TypeFunction {
      type_parameters,
      parameters,
      return_type,
    });
    Ok(Node::new(
      self.since(start),
      if is_constructor {
        TypeExpr::Constructor(func)
      } else {
        TypeExpr::Function(func)
      },
    ))
  }

  /// Return type position, where `x is T` and `asserts x` predicates are also allowed.
  pub fn type_or_predicate(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.peek().loc;
    let (a, b) = self.peek_2();
    let names_param = |t: TT| t.is_identifier_like() || t == TT::KeywordThis;
    let asserts = a.typ == TT::KeywordAsserts
      && names_param(b.typ)
      && !b.preceded_by_line_terminator
      && b.typ != TT::KeywordIs;
    let is_predicate = names_param(a.typ) && b.typ == TT::KeywordIs && !b.preceded_by_line_terminator;
    if !asserts && !is_predicate {
      return self.type_expr();
    };
    if asserts {
      self.consume();
    };
    let parameter_name = self.consume_as_string();
    let type_annotation = if self.consume_if(TT::KeywordIs).is_match() {
      Some(self.type_expr()?)
    } else {
      None
    };
    let predicate = Node::new(self.since(start), TypePredicate {
      asserts,
      parameter_name,
      type_annotation,
    });
    Ok(Node::new(self.since(start), TypeExpr::Predicate(predicate)))
  }

  fn type_union(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.peek().loc;
    // Leading separator: `type A =\n  | "a"\n  | "b"`.
    let _ = self.consume_if(TT::Bar);
    let first = self.type_intersection()?;
    if self.peek().typ != TT::Bar {
      return Ok(first);
    };
    let mut types = vec![first];
    while self.consume_if(TT::Bar).is_match() {
      types.push(self.type_intersection()?);
    }
    let union = Node::new(self.since(start), TypeUnion { types });
    Ok(Node::new(self.since(start), TypeExpr::Union(union)))
  }

  fn type_intersection(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.peek().loc;
    let _ = self.consume_if(TT::Ampersand);
    let first = self.type_union_member()?;
    if self.peek().typ != TT::Ampersand {
      return Ok(first);
    };
    let mut types = vec![first];
    while self.consume_if(TT::Ampersand).is_match() {
      types.push(self.type_union_member()?);
    }
    let intersection = Node::new(self.since(start), TypeIntersection { types });
    Ok(Node::new(
      self.since(start),
      TypeExpr::Intersection(intersection),
    ))
  }

  fn type_union_member(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    if self.is_start_of_function_type() {
      return self.function_type();
    };
    self.type_operator()
  }

  fn type_operator(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.peek().loc;
    let operator = match self.peek().typ {
      TT::KeywordKeyof => TypeOperatorKind::KeyOf,
      TT::KeywordUnique => TypeOperatorKind::Unique,
      TT::KeywordReadonly => TypeOperatorKind::Readonly,
      TT::KeywordInfer => {
        self.consume();
        let name = self.require_identifier()?;
        return Ok(Node::new(self.since(start), TypeExpr::Infer(name)));
      }
      _ => return self.type_postfix(),
    };
    self.consume();
    let mut operand = self.type_operator()?;
    if operator == TypeOperatorKind::Readonly {
      match operand.stx.as_mut() {
        TypeExpr::Array(arr) => {
          arr.stx.readonly = true;
          operand.loc = self.since(start);
          return Ok(operand);
        }
        TypeExpr::Tuple(tuple) => {
          tuple.stx.readonly = true;
          operand.loc = self.since(start);
          return Ok(operand);
        }
        _ => {}
      };
    };
    let op = Node::new(self.since(start), TypeOperator {
      operator,
      type_expr: operand,
    });
    Ok(Node::new(self.since(start), TypeExpr::Operator(op)))
  }

  fn type_postfix(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.peek().loc;
    let mut base = self.type_primary()?;
    loop {
      let t = self.peek();
      if t.typ != TT::BracketOpen || t.preceded_by_line_terminator {
        break;
      };
      self.consume();
      if self.consume_if(TT::BracketClose).is_match() {
        let arr = Node::new(self.since(start), TypeArray {
          readonly: false,
          element_type: base,
        });
        base = Node::new(self.since(start), TypeExpr::Array(arr));
      } else {
        let index_type = self.type_expr()?;
        self.require(TT::BracketClose)?;
        let access = Node::new(self.since(start), TypeIndexedAccess {
          object_type: base,
          index_type,
        });
        base = Node::new(self.since(start), TypeExpr::IndexedAccess(access));
      };
    }
    Ok(base)
  }

  fn type_primary(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let t = self.peek();
    let start = t.loc;
    if let Some(kw) = keyword_type(t.typ) {
      self.consume();
      return Ok(Node::new(t.loc, TypeExpr::Keyword(kw)));
    };
    match t.typ {
      TT::LiteralString => {
        let v = self.lit_str_val()?;
        Ok(Node::new(t.loc, TypeExpr::Literal(TypeLiteral::String(v))))
      }
      TT::LiteralNumber => {
        let v = self.lit_num_val()?;
        Ok(Node::new(t.loc, TypeExpr::Literal(TypeLiteral::Number(v))))
      }
      TT::LiteralBigInt => {
        let v = self.lit_num_val()?;
        Ok(Node::new(t.loc, TypeExpr::Literal(TypeLiteral::BigInt(v))))
      }
      TT::Hyphen => {
        self.consume();
        let n = self.peek();
        let v = self.lit_num_val()?;
        let lit = match n.typ {
          TT::LiteralBigInt => TypeLiteral::BigInt(format!("-{}", v)),
          _ => TypeLiteral::Number(format!("-{}", v)),
        };
        Ok(Node::new(self.since(start), TypeExpr::Literal(lit)))
      }
      TT::LiteralTrue | TT::LiteralFalse => {
        self.consume();
        Ok(Node::new(
          t.loc,
          TypeExpr::Literal(TypeLiteral::Boolean(t.typ == TT::LiteralTrue)),
        ))
      }
      TT::LiteralTemplatePartString | TT::LiteralTemplatePartStringEnd => self.template_type(),
      TT::KeywordTypeof => self.type_query(),
      TT::KeywordImport => self.import_type(),
      TT::BraceOpen => {
        if self.is_start_of_mapped_type() {
          self.mapped_type()
        } else {
          let members = self.object_type_members()?;
          let obj = Node::new(self.since(start), TypeObjectLiteral { members });
          Ok(Node::new(self.since(start), TypeExpr::Object(obj)))
        }
      }
      TT::BracketOpen => self.tuple_type(),
      TT::ParenthesisOpen => {
        self.consume();
        let type_expr = self.type_expr()?;
        self.require(TT::ParenthesisClose)?;
        let paren = Node::new(self.since(start), TypeParenthesized { type_expr });
        Ok(Node::new(self.since(start), TypeExpr::Parenthesized(paren)))
      }
      typ if typ.is_identifier_like() => {
        let reference = self.type_reference()?;
        Ok(Node::new(self.since(start), TypeExpr::Reference(reference)))
      }
      TT::EOF => Err(t.error(SyntaxErrorType::UnexpectedEnd)),
      _ => Err(t.error(SyntaxErrorType::ExpectedSyntax("type expression"))),
    }
  }

  /// Identifier segments separated by dots. Segments after the first may be keywords.
  pub fn entity_name(&mut self) -> SyntaxResult<TypeEntityName> {
    let mut name = TypeEntityName::Identifier(self.require_identifier()?);
    loop {
      let (dot, next) = self.peek_2();
      if dot.typ != TT::Dot || !(next.typ == TT::Identifier || next.typ.is_keyword()) {
        break;
      };
      self.consume();
      let right = self.consume_as_string();
      name = TypeEntityName::Qualified(Box::new(TypeQualifiedName { left: name, right }));
    }
    Ok(name)
  }

  pub fn type_reference(&mut self) -> SyntaxResult<Node<TypeReference>> {
    let start = self.peek().loc;
    let name = self.entity_name()?;
    let type_arguments = self.type_arguments_opt()?;
    Ok(Node::new(self.since(start), TypeReference {
      name,
      type_arguments,
    }))
  }

  pub fn type_arguments_opt(&mut self) -> SyntaxResult<Vec<Node<TypeExpr>>> {
    let t = self.peek();
    if t.typ != TT::ChevronLeft || t.preceded_by_line_terminator {
      return Ok(Vec::new());
    };
    self.consume();
    let mut args = Vec::new();
    while self.peek().typ != TT::ChevronRight {
      args.push(self.type_expr()?);
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::ChevronRight)?;
    Ok(args)
  }

  pub fn type_parameters_opt(&mut self) -> SyntaxResult<Vec<Node<TypeParameter>>> {
    if !self.consume_if(TT::ChevronLeft).is_match() {
      return Ok(Vec::new());
    };
    let mut params = Vec::new();
    while self.peek().typ != TT::ChevronRight {
      let start = self.peek().loc;
      // Modifiers: `const T`, `in T`, `out T`.
      loop {
        let (a, b) = self.peek_2();
        let is_modifier = matches!(a.typ, TT::KeywordConst | TT::KeywordIn)
          || (a.typ == TT::Identifier && self.str(a.loc) == "out");
        if is_modifier && b.typ.is_identifier_like() {
          self.consume();
        } else {
          break;
        };
      }
      let name = self.require_identifier()?;
      let constraint = if self.consume_if(TT::KeywordExtends).is_match() {
        Some(self.type_expr()?)
      } else {
        None
      };
      let default = if self.consume_if(TT::Equals).is_match() {
        Some(self.type_expr()?)
      } else {
        None
      };
      params.push(Node::new(self.since(start), TypeParameter {
        name,
        constraint,
        default,
      }));
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::ChevronRight)?;
    Ok(params)
  }

  pub fn function_parameters(&mut self) -> SyntaxResult<Vec<Node<TypeFunctionParameter>>> {
    self.require(TT::ParenthesisOpen)?;
    let mut params = Vec::new();
    while self.peek().typ != TT::ParenthesisClose {
      let start = self.peek().loc;
      // Accessibility and readonly modifiers of constructor parameter properties.
      loop {
        let (a, b) = self.peek_2();
        let is_modifier = a.typ == TT::KeywordReadonly
          || (a.typ == TT::Identifier
            && matches!(self.str(a.loc), "public" | "private" | "protected" | "override"));
        if is_modifier && (b.typ.is_identifier_like() || b.typ == TT::BraceOpen || b.typ == TT::BracketOpen) {
          self.consume();
        } else {
          break;
        };
      }
      let rest = self.consume_if(TT::DotDotDot).is_match();
      let name = match self.peek().typ {
        TT::BraceOpen | TT::BracketOpen => {
          let pat_start = self.peek().loc;
          self.skip_group();
          self.string(self.since(pat_start))
        }
        TT::KeywordThis => self.consume_as_string(),
        _ => self.require_identifier()?,
      };
      let optional = self.consume_if(TT::Question).is_match();
      let type_expr = if self.consume_if(TT::Colon).is_match() {
        Some(self.type_expr()?)
      } else {
        None
      };
      if self.consume_if(TT::Equals).is_match() {
        self.skip_balanced(|t| matches!(t.typ, TT::Comma | TT::ParenthesisClose));
      };
      params.push(Node::new(self.since(start), TypeFunctionParameter {
        name,
        optional,
        rest,
        type_expr,
      }));
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::ParenthesisClose)?;
    Ok(params)
  }

  fn template_type(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.peek().loc;
    let head_tok = self.consume();
    let head_ended = head_tok.typ == TT::LiteralTemplatePartStringEnd;
    let head = self.template_part_val(head_tok.loc, true, head_ended)?;
    let mut spans = Vec::new();
    if !head_ended {
      loop {
        let span_start = self.peek().loc;
        let type_expr = self.type_expr()?;
        self.require(TT::BraceClose)?;
        let part = self.consume_with_mode(LexMode::TemplateStrContinue);
        let ended = match part.typ {
          TT::LiteralTemplatePartStringEnd => true,
          TT::LiteralTemplatePartString => false,
          _ => return Err(part.error(SyntaxErrorType::UnexpectedEnd)),
        };
        let literal = self.template_part_val(part.loc, false, ended)?;
        spans.push(Node::new(self.since(span_start), TypeTemplateLiteralSpan {
          type_expr,
          literal,
        }));
        if ended {
          break;
        };
      }
    };
    let tpl = Node::new(self.since(start), TypeTemplateLiteral { head, spans });
    Ok(Node::new(self.since(start), TypeExpr::TemplateLiteral(tpl)))
  }

  fn type_query(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.require(TT::KeywordTypeof)?.loc;
    if self.peek().typ == TT::KeywordImport {
      return self.import_type();
    };
    let expr_name = self.entity_name()?;
    // Instantiation expressions such as `typeof f<string>` are accepted but their arguments are not kept.
    let _ = self.type_arguments_opt()?;
    let query = Node::new(self.since(start), TypeQuery { expr_name });
    Ok(Node::new(self.since(start), TypeExpr::Query(query)))
  }

  fn import_type(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.require(TT::KeywordImport)?.loc;
    self.require(TT::ParenthesisOpen)?;
    let module = self.lit_str_val()?;
    self.require(TT::ParenthesisClose)?;
    let mut segments = Vec::new();
    while self.consume_if(TT::Dot).is_match() {
      segments.push(self.consume_as_string());
    }
    let qualifier = TypeEntityName::from_segments(&segments);
    let type_arguments = self.type_arguments_opt()?;
    let import = Node::new(self.since(start), TypeImport {
      module,
      qualifier,
      type_arguments,
    });
    Ok(Node::new(self.since(start), TypeExpr::Import(import)))
  }

  fn tuple_type(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.require(TT::BracketOpen)?.loc;
    let mut elements = Vec::new();
    while self.peek().typ != TT::BracketClose {
      let el_start = self.peek().loc;
      let rest = self.consume_if(TT::DotDotDot).is_match();
      let (a, b, c) = self.peek_3();
      let labelled = a.typ.is_identifier_like()
        && (b.typ == TT::Colon || (b.typ == TT::Question && c.typ == TT::Colon));
      let mut optional = false;
      let label = if labelled {
        let label = self.consume_as_string();
        optional = self.consume_if(TT::Question).is_match();
        self.require(TT::Colon)?;
        Some(label)
      } else {
        None
      };
      let type_expr = self.type_expr()?;
      optional |= self.consume_if(TT::Question).is_match();
      elements.push(Node::new(self.since(el_start), TypeTupleElement {
        label,
        optional,
        rest,
        type_expr,
      }));
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    self.require(TT::BracketClose)?;
    let tuple = Node::new(self.since(start), TypeTuple {
      readonly: false,
      elements,
    });
    Ok(Node::new(self.since(start), TypeExpr::Tuple(tuple)))
  }

  fn is_start_of_mapped_type(&mut self) -> bool {
    let cp = self.checkpoint();
    self.consume();
    if matches!(self.peek().typ, TT::Plus | TT::Hyphen) {
      self.consume();
    };
    let _ = self.consume_if(TT::KeywordReadonly);
    let (a, b, c) = self.peek_3();
    self.restore_checkpoint(cp);
    a.typ == TT::BracketOpen && b.typ.is_identifier_like() && c.typ == TT::KeywordIn
  }

  fn mapped_modifier(&mut self, keyword: TT) -> Option<MappedTypeModifier> {
    let (a, b) = self.peek_2();
    let sign = match a.typ {
      TT::Plus if b.typ == keyword => MappedTypeModifier::Plus,
      TT::Hyphen if b.typ == keyword => MappedTypeModifier::Minus,
      t if t == keyword => MappedTypeModifier::None,
      _ => return None,
    };
    if sign != MappedTypeModifier::None {
      self.consume();
    };
    self.consume();
    Some(sign)
  }

  fn mapped_type(&mut self) -> SyntaxResult<Node<TypeExpr>> {
    let start = self.require(TT::BraceOpen)?.loc;
    let readonly_modifier = self.mapped_modifier(TT::KeywordReadonly);
    self.require(TT::BracketOpen)?;
    let type_parameter = self.require_identifier()?;
    self.require(TT::KeywordIn)?;
    let constraint = self.type_expr()?;
    let name_type = if self.consume_if(TT::KeywordAs).is_match() {
      Some(self.type_expr()?)
    } else {
      None
    };
    self.require(TT::BracketClose)?;
    let optional_modifier = self.mapped_modifier(TT::Question);
    let type_expr = if self.consume_if(TT::Colon).is_match() {
      Some(self.type_expr()?)
    } else {
      None
    };
    let _ = self.consume_if(TT::Semicolon).is_match() || self.consume_if(TT::Comma).is_match();
    self.require(TT::BraceClose)?;
    let mapped = Node::new(self.since(start), TypeMapped {
      readonly_modifier,
      type_parameter,
      constraint,
      name_type,
      optional_modifier,
      type_expr,
    });
    Ok(Node::new(self.since(start), TypeExpr::Mapped(mapped)))
  }

  /// Parses `{ ... }` members of an object type or interface body.
  pub fn object_type_members(&mut self) -> SyntaxResult<Vec<Node<TypeMember>>> {
    self.require(TT::BraceOpen)?;
    let mut members = Vec::new();
    loop {
      let t = self.peek();
      match t.typ {
        TT::BraceClose => break,
        TT::Semicolon | TT::Comma => {
          self.consume();
          continue;
        }
        TT::EOF => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
        _ => {}
      };
      members.push(self.type_member()?);
    }
    self.require(TT::BraceClose)?;
    Ok(members)
  }

  fn property_key(&mut self) -> SyntaxResult<TypePropertyKey> {
    let t = self.peek();
    Ok(match t.typ {
      TT::LiteralString => TypePropertyKey::String(self.lit_str_val()?),
      TT::LiteralNumber | TT::LiteralBigInt => TypePropertyKey::Number(self.lit_num_val()?),
      TT::BracketOpen => {
        self.consume();
        let inner_start = self.peek().loc;
        self.skip_balanced(|t| t.typ == TT::BracketClose);
        let text = self.string(self.since(inner_start));
        self.require(TT::BracketClose)?;
        TypePropertyKey::Computed(text)
      }
      typ if typ == TT::Identifier || typ.is_keyword() => {
        TypePropertyKey::Identifier(self.consume_as_string())
      }
      TT::EOF => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("property name"))),
    })
  }

  fn return_type_opt(&mut self) -> SyntaxResult<Option<Node<TypeExpr>>> {
    Ok(if self.consume_if(TT::Colon).is_match() {
      Some(self.type_or_predicate()?)
    } else {
      None
    })
  }

  fn type_member(&mut self) -> SyntaxResult<Node<TypeMember>> {
    let (a, b, c) = self.peek_3();
    let start = a.loc;
    let doc = self.doc_text(&a);

    if matches!(a.typ, TT::ParenthesisOpen | TT::ChevronLeft)
      || (a.typ == TT::KeywordNew && matches!(b.typ, TT::ParenthesisOpen | TT::ChevronLeft))
    {
      let construct = self.consume_if(TT::KeywordNew).is_match();
      let type_parameters = self.type_parameters_opt()?;
      let parameters = self.function_parameters()?;
      let return_type = self.return_type_opt()?;
      let sig = Node::new(self.since(start), TypeCallSignature {
        type_parameters,
        parameters,
        return_type,
      });
      return Ok(Node::new(
        self.since(start),
        if construct {
          TypeMember::ConstructSignature(sig)
        } else {
          TypeMember::CallSignature(sig)
        },
      ));
    };

    // A modifier keyword directly followed by something that ends a key is the key itself, e.g. `readonly: boolean`.
    let is_key_end = |t: TT| {
      matches!(
        t,
        TT::Colon
          | TT::Question
          | TT::ParenthesisOpen
          | TT::ChevronLeft
          | TT::Comma
          | TT::Semicolon
          | TT::BraceClose
      )
    };
    let readonly = a.typ == TT::KeywordReadonly && !is_key_end(b.typ);
    if readonly {
      self.consume();
    };

    if matches!(a.typ, TT::KeywordGet | TT::KeywordSet)
      && !is_key_end(b.typ)
      && is_property_key_start(b.typ)
      && !b.preceded_by_line_terminator
    {
      let is_getter = a.typ == TT::KeywordGet;
      self.consume();
      let key = self.property_key()?;
      let parameters = self.function_parameters()?;
      let return_type = self.return_type_opt()?;
      let type_annotation = if is_getter {
        return_type
      } else {
        parameters.into_iter().next().and_then(|p| p.stx.type_expr)
      };
      let prop = Node::new(self.since(start), TypePropertySignature {
        readonly: false,
        optional: false,
        key,
        type_annotation,
        doc,
      });
      return Ok(Node::new(self.since(start), TypeMember::Property(prop)));
    };

    let (k0, k1, k2) = if readonly { self.peek_3() } else { (a, b, c) };
    if k0.typ == TT::BracketOpen && k1.typ.is_identifier_like() && k2.typ == TT::Colon {
      self.consume();
      let parameter_name = self.require_identifier()?;
      self.require(TT::Colon)?;
      let parameter_type = self.type_expr()?;
      self.require(TT::BracketClose)?;
      self.require(TT::Colon)?;
      let type_annotation = self.type_expr()?;
      let sig = Node::new(self.since(start), TypeIndexSignature {
        readonly,
        parameter_name,
        parameter_type,
        type_annotation,
        doc,
      });
      return Ok(Node::new(self.since(start), TypeMember::IndexSignature(sig)));
    };

    let key = self.property_key()?;
    let optional = self.consume_if(TT::Question).is_match();
    if matches!(self.peek().typ, TT::ParenthesisOpen | TT::ChevronLeft) {
      let type_parameters = self.type_parameters_opt()?;
      let parameters = self.function_parameters()?;
      let return_type = self.return_type_opt()?;
      let method = Node::new(self.since(start), TypeMethodSignature {
        optional,
        key,
        type_parameters,
        parameters,
        return_type,
        doc,
      });
      return Ok(Node::new(self.since(start), TypeMember::Method(method)));
    };
    let type_annotation = if self.consume_if(TT::Colon).is_match() {
      Some(self.type_expr()?)
    } else {
      None
    };
    let prop = Node::new(self.since(start), TypePropertySignature {
      readonly,
      optional,
      key,
      type_annotation,
      doc,
    });
    Ok(Node::new(self.since(start), TypeMember::Property(prop)))
  }
}
