use super::Parser;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::TT;

/// Decodes the escape sequences in the body of a string or template literal.
/// Returns None if an escape sequence is malformed.
pub fn decode_escapes(raw: &str) -> Option<String> {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    };
    let esc = chars.next()?;
    match esc {
      'b' => out.push('\x08'),
      'f' => out.push('\x0c'),
      'n' => out.push('\n'),
      'r' => out.push('\r'),
      't' => out.push('\t'),
      'v' => out.push('\x0b'),
      '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
      // Line continuation.
      '\r' => {
        if chars.peek() == Some(&'\n') {
          chars.next();
        };
      }
      '\n' | '\u{2028}' | '\u{2029}' => {}
      'x' => {
        let hex: String = chars.by_ref().take(2).collect();
        let cp = u32::from_str_radix(&hex, 16).ok()?;
        out.push(char::from_u32(cp)?);
      }
      'u' => {
        let cp = if chars.peek() == Some(&'{') {
          chars.next();
          let mut hex = String::new();
          loop {
            match chars.next()? {
              '}' => break,
              c => hex.push(c),
            };
          }
          u32::from_str_radix(&hex, 16).ok()?
        } else {
          let hex: String = chars.by_ref().take(4).collect();
          if hex.len() != 4 {
            return None;
          };
          u32::from_str_radix(&hex, 16).ok()?
        };
        // Lone surrogates cannot be represented in a Rust string.
        out.push(char::from_u32(cp).unwrap_or('\u{FFFD}'));
      }
      c => out.push(c),
    };
  }
  Some(out)
}

/// Strips numeric separators so the literal can be re-emitted verbatim.
pub fn normalise_number(raw: &str) -> String {
  raw.chars().filter(|c| *c != '_').collect()
}

impl<'a> Parser<'a> {
  pub fn lit_str_val(&mut self) -> SyntaxResult<String> {
    let t = self.require(TT::LiteralString)?;
    self.str_val_at(t.loc)
  }

  fn str_val_at(&self, loc: Loc) -> SyntaxResult<String> {
    let raw = self.str(loc);
    if raw.len() < 2 {
      return Err(loc.error(SyntaxErrorType::UnexpectedEnd, Some(TT::LiteralString)));
    };
    decode_escapes(&raw[1..raw.len() - 1]).ok_or_else(|| {
      loc.error(
        SyntaxErrorType::ExpectedSyntax("valid escape sequence"),
        Some(TT::LiteralString),
      )
    })
  }

  pub fn lit_num_val(&mut self) -> SyntaxResult<String> {
    let t = self.require_predicate(
      |t| t == TT::LiteralNumber || t == TT::LiteralBigInt,
      "number literal",
    )?;
    let raw = normalise_number(self.str(t.loc));
    if raw.is_empty() || raw == "." {
      return Err(t.error(SyntaxErrorType::MalformedLiteralNumber));
    };
    Ok(raw)
  }

  /// Body of a template literal part with its delimiters (backtick, `${` and `}`) removed and escapes decoded.
  pub fn template_part_val(&self, loc: Loc, is_head: bool, is_end: bool) -> SyntaxResult<String> {
    let raw = self.str(loc);
    let start = if is_head { 1 } else { 0 };
    let end_trim = if is_end { 1 } else { 2 };
    if raw.len() < start + end_trim {
      return Err(loc.error(SyntaxErrorType::UnexpectedEnd, None));
    };
    decode_escapes(&raw[start..raw.len() - end_trim]).ok_or_else(|| {
      loc.error(SyntaxErrorType::ExpectedSyntax("valid escape sequence"), None)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::decode_escapes;
  use super::normalise_number;

  #[test]
  fn decodes_common_escapes() {
    assert_eq!(decode_escapes(r#"a\"b\nA\u{1F600}\x41"#).unwrap(), "a\"b\nA\u{1F600}A");
    assert_eq!(decode_escapes("it\\'s").unwrap(), "it's");
    assert!(decode_escapes("\\u12").is_none());
  }

  #[test]
  fn strips_separators() {
    assert_eq!(normalise_number("1_000_000"), "1000000");
    assert_eq!(normalise_number("0x1F"), "0x1F");
  }
}
