use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of syntax errors produced by the parser.
///
/// Diagnostic codes (prefix `PT`) are assigned per variant and are stable:
/// - `PT0001`: [`SyntaxErrorType::ExpectedNotFound`]
/// - `PT0002`: [`SyntaxErrorType::ExpectedSyntax`]
/// - `PT0003`: [`SyntaxErrorType::LineTerminatorInString`]
/// - `PT0004`: [`SyntaxErrorType::MalformedLiteralNumber`]
/// - `PT0005`: [`SyntaxErrorType::RequiredTokenNotFound`]
/// - `PT0006`: [`SyntaxErrorType::UnexpectedEnd`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedNotFound,
  ExpectedSyntax(&'static str),
  LineTerminatorInString,
  MalformedLiteralNumber,
  RequiredTokenNotFound(TT),
  UnexpectedEnd,
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }

  /// Renders the error with a one-based `line:column` position resolved against `source`.
  pub fn describe(&self, source: &str) -> String {
    let (line, col) = self.loc.line_col(source);
    format!(
      "{} at {}:{} ({})",
      self.typ.message(self.actual_token),
      line,
      col,
      self.typ.code()
    )
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{:?} [token={:?}]", self.typ, self.actual_token)
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

impl SyntaxErrorType {
  /// Stable diagnostic code for this syntax error variant.
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::ExpectedNotFound => "PT0001",
      SyntaxErrorType::ExpectedSyntax(_) => "PT0002",
      SyntaxErrorType::LineTerminatorInString => "PT0003",
      SyntaxErrorType::MalformedLiteralNumber => "PT0004",
      SyntaxErrorType::RequiredTokenNotFound(_) => "PT0005",
      SyntaxErrorType::UnexpectedEnd => "PT0006",
    }
  }

  /// Human-readable message describing this syntax error.
  pub fn message(&self, actual_token: Option<TT>) -> String {
    match self {
      SyntaxErrorType::ExpectedNotFound => "expected token not found".into(),
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      SyntaxErrorType::LineTerminatorInString => {
        "line terminator not allowed in string literal".into()
      }
      SyntaxErrorType::MalformedLiteralNumber => "malformed number literal".into(),
      SyntaxErrorType::RequiredTokenNotFound(token) => format!("expected token {:?}", token),
      SyntaxErrorType::UnexpectedEnd => actual_token
        .map(|tok| format!("unexpected end before {:?}", tok))
        .unwrap_or_else(|| "unexpected end of input".into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::SyntaxErrorType;
  use crate::token::TT;

  #[test]
  fn codes_are_stable() {
    assert_eq!(SyntaxErrorType::ExpectedNotFound.code(), "PT0001");
    assert_eq!(SyntaxErrorType::RequiredTokenNotFound(TT::Colon).code(), "PT0005");
    assert_eq!(
      SyntaxErrorType::RequiredTokenNotFound(TT::Colon).message(None),
      "expected token Colon"
    );
  }

  #[test]
  fn describe_reports_position() {
    let err = crate::parse("interface A {\n  x: ;\n}").unwrap_err();
    let text = err.describe("interface A {\n  x: ;\n}");
    assert!(text.contains("2:"), "unexpected description {text}");
    assert!(text.ends_with("(PT0002)"), "unexpected description {text}");
  }
}
