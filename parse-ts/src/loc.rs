use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::{max, min};
use std::ops::{Add, AddAssign};

/// A location within the current source file expressed as UTF-8 byte offsets.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn add_option(self, rhs: Option<Loc>) -> Loc {
    let mut new = self;
    if let Some(rhs) = rhs {
      new.extend(rhs);
    };
    new
  }

  /// One-based line and column of the start offset within `source`.
  pub fn line_col(&self, source: &str) -> (usize, usize) {
    let upto = &source[..min(self.0, source.len())];
    let line = upto.matches('\n').count() + 1;
    let col = match upto.rfind('\n') {
      Some(nl) => upto[nl + 1..].chars().count() + 1,
      None => upto.chars().count() + 1,
    };
    (line, col)
  }

  /// The source text covered by this location, clamped to the source bounds.
  pub fn slice<'a>(&self, source: &'a str) -> &'a str {
    let end = min(self.1, source.len());
    let start = min(self.0, end);
    &source[start..end]
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}
