use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;

pub mod expr;
pub mod lit;
pub mod stmt;
#[cfg(test)]
mod tests;
pub mod type_expr;

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  typ: TT,
  loc: Loc,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, Some(self.typ))
  }
}

pub struct ParserCheckpoint {
  next_tok_i: usize,
}

/// To get the lexer's `next` after this token was lexed, use `token.loc.1`.
struct BufferedToken {
  token: Token,
  lex_mode: LexMode,
}

pub struct Parser<'a> {
  lexer: Lexer<'a>,
  buf: Vec<BufferedToken>,
  next_tok_i: usize,
}

// Parsing methods are added to this struct in the submodules rather than as free functions taking `&mut Parser`.
impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
    Parser {
      lexer,
      buf: Vec::new(),
      next_tok_i: 0,
    }
  }

  pub fn source_range(&self) -> Loc {
    self.lexer.source_range()
  }

  pub fn str(&self, loc: Loc) -> &str {
    &self.lexer[loc]
  }

  pub fn string(&self, loc: Loc) -> String {
    self.str(loc).to_string()
  }

  /// Raw text of the doc comment attached to a token, if any.
  pub fn doc_text(&self, token: &Token) -> Option<String> {
    token.doc.map(|loc| self.string(loc))
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      next_tok_i: self.next_tok_i,
    }
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.next_tok_i = checkpoint.next_tok_i;
  }

  /// End offset of the last consumed token.
  pub fn prev_end(&self) -> usize {
    match self.next_tok_i {
      0 => 0,
      i => self.buf[i - 1].token.loc.1,
    }
  }

  /// Location from the start of `start` to the end of the last consumed token.
  pub fn since(&self, start: Loc) -> Loc {
    Loc(start.0, self.prev_end().max(start.0))
  }

  fn reset_to(&mut self, n: usize) {
    self.next_tok_i = n;
    self.buf.truncate(n);
    match self.buf.last() {
      Some(t) => self.lexer.set_next(t.token.loc.1),
      None => self.lexer.set_next(0),
    };
  }

  fn forward<K: FnOnce(&Token) -> bool>(&mut self, mode: LexMode, keep: K) -> (bool, Token) {
    if self
      .buf
      .get(self.next_tok_i)
      .is_some_and(|t| t.lex_mode != mode)
    {
      self.reset_to(self.next_tok_i);
    }
    debug_assert!(self.buf.len() >= self.next_tok_i);
    if self.buf.len() == self.next_tok_i {
      let token = lex_next(&mut self.lexer, mode);
      self.buf.push(BufferedToken {
        token,
        lex_mode: mode,
      });
    }
    let t = self.buf[self.next_tok_i].token.clone();
    let k = keep(&t);
    if k {
      self.next_tok_i += 1;
    };
    (k, t)
  }

  pub fn consume_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| true).1
  }

  pub fn consume(&mut self) -> Token {
    self.consume_with_mode(LexMode::Standard)
  }

  /// Consumes the next token regardless of type, and returns its raw source code as a string.
  pub fn consume_as_string(&mut self) -> String {
    let loc = self.consume().loc;
    self.string(loc)
  }

  pub fn peek(&mut self) -> Token {
    self.forward(LexMode::Standard, |_| false).1
  }

  pub fn peek_2(&mut self) -> (Token, Token) {
    let cp = self.checkpoint();
    let a = self.forward(LexMode::Standard, |_| true);
    let b = self.forward(LexMode::Standard, |_| true);
    self.restore_checkpoint(cp);
    (a.1, b.1)
  }

  pub fn peek_3(&mut self) -> (Token, Token, Token) {
    let cp = self.checkpoint();
    let a = self.forward(LexMode::Standard, |_| true);
    let b = self.forward(LexMode::Standard, |_| true);
    let c = self.forward(LexMode::Standard, |_| true);
    self.restore_checkpoint(cp);
    (a.1, b.1, c.1)
  }

  pub fn consume_if(&mut self, typ: TT) -> MaybeToken {
    let (matched, t) = self.forward(LexMode::Standard, |t| t.typ == typ);
    MaybeToken {
      typ,
      matched,
      loc: t.loc,
    }
  }

  pub fn require_with_mode(&mut self, typ: TT, mode: LexMode) -> SyntaxResult<Token> {
    let t = self.consume_with_mode(mode);
    if t.typ != typ {
      Err(t.error(match t.typ {
        TT::EOF => SyntaxErrorType::UnexpectedEnd,
        _ => SyntaxErrorType::RequiredTokenNotFound(typ),
      }))
    } else {
      Ok(t)
    }
  }

  pub fn require(&mut self, typ: TT) -> SyntaxResult<Token> {
    self.require_with_mode(typ, LexMode::Standard)
  }

  pub fn require_predicate<P: FnOnce(TT) -> bool>(
    &mut self,
    pred: P,
    expected: &'static str,
  ) -> SyntaxResult<Token> {
    let t = self.consume();
    if !pred(t.typ) {
      Err(t.error(SyntaxErrorType::ExpectedSyntax(expected)))
    } else {
      Ok(t)
    }
  }

  /// Requires a name usable for a declaration, parameter or type parameter.
  pub fn require_identifier(&mut self) -> SyntaxResult<String> {
    let t = self.require_predicate(|t| t.is_identifier_like(), "identifier")?;
    Ok(self.string(t.loc))
  }

  /// Consumes tokens up to (but not including) the first token at bracket depth zero for which `stop`
  /// returns true, or EOF. Template literal substitutions are followed so their braces stay balanced.
  pub fn skip_balanced<F: Fn(&Token) -> bool>(&mut self, stop: F) {
    let mut stack = Vec::<TT>::new();
    loop {
      let t = self.peek();
      if t.typ == TT::EOF || (stack.is_empty() && stop(&t)) {
        break;
      };
      self.consume();
      self.track_bracket(&mut stack, t.typ);
    }
  }

  /// Updates the open bracket stack after consuming a token of type `typ`.
  fn track_bracket(&mut self, stack: &mut Vec<TT>, typ: TT) {
    match typ {
      TT::ParenthesisOpen | TT::BracketOpen | TT::BraceOpen | TT::LiteralTemplatePartString => {
        stack.push(typ)
      }
      TT::ParenthesisClose | TT::BracketClose => {
        stack.pop();
      }
      TT::BraceClose => {
        if stack.pop() == Some(TT::LiteralTemplatePartString) {
          let cont = self.consume_with_mode(LexMode::TemplateStrContinue);
          if cont.typ == TT::LiteralTemplatePartString {
            stack.push(TT::LiteralTemplatePartString);
          };
        };
      }
      _ => {}
    };
  }

  /// Consumes an opening bracket and everything up to and including its matching closer.
  pub fn skip_group(&mut self) {
    let mut stack = Vec::<TT>::new();
    loop {
      let t = self.consume();
      if t.typ == TT::EOF {
        break;
      };
      self.track_bracket(&mut stack, t.typ);
      if stack.is_empty() {
        break;
      };
    }
  }
}
