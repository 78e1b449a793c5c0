use super::lex_next;
use super::LexMode;
use super::Lexer;
use crate::token::TT;

fn lex_all(code: &str) -> Vec<TT> {
  let mut lexer = Lexer::new(code);
  let mut out = Vec::new();
  loop {
    let t = lex_next(&mut lexer, LexMode::Standard);
    if t.typ == TT::EOF {
      break;
    }
    out.push(t.typ);
  }
  out
}

#[test]
fn keywords_do_not_swallow_identifiers() {
  assert_eq!(lex_all("type typeName"), vec![
    TT::KeywordType,
    TT::Identifier
  ]);
  assert_eq!(lex_all("interface interfaces stringy string"), vec![
    TT::KeywordInterface,
    TT::Identifier,
    TT::Identifier,
    TT::KeywordStringType,
  ]);
}

#[test]
fn punctuation_prefers_longest() {
  assert_eq!(lex_all("...a => b"), vec![
    TT::DotDotDot,
    TT::Identifier,
    TT::EqualsChevronRight,
    TT::Identifier,
  ]);
  // Nested generics close one chevron at a time.
  assert_eq!(lex_all("A<B<C>>"), vec![
    TT::Identifier,
    TT::ChevronLeft,
    TT::Identifier,
    TT::ChevronLeft,
    TT::Identifier,
    TT::ChevronRight,
    TT::ChevronRight,
  ]);
}

#[test]
fn numbers_and_strings() {
  assert_eq!(lex_all("1_000 0x1F .5 10n 'a\\'b' \"c\""), vec![
    TT::LiteralNumber,
    TT::LiteralNumber,
    TT::LiteralNumber,
    TT::LiteralBigInt,
    TT::LiteralString,
    TT::LiteralString,
  ]);
}

#[test]
fn doc_comment_is_attached_to_next_token() {
  let code = "// plain\n/** Hero */\ninterface Hero {}";
  let mut lexer = Lexer::new(code);
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(t.typ, TT::KeywordInterface);
  assert!(t.preceded_by_line_terminator);
  let doc = t.doc.expect("doc comment");
  assert_eq!(&lexer[doc], "/** Hero */");

  let mut lexer = Lexer::new("/**/ type");
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(t.typ, TT::KeywordType);
  assert!(t.doc.is_none());
}

#[test]
fn template_parts() {
  let code = "`a${b}c`";
  let mut lexer = Lexer::new(code);
  assert_eq!(
    lex_next(&mut lexer, LexMode::Standard).typ,
    TT::LiteralTemplatePartString
  );
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, TT::Identifier);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, TT::BraceClose);
  assert_eq!(
    lex_next(&mut lexer, LexMode::TemplateStrContinue).typ,
    TT::LiteralTemplatePartStringEnd
  );
}

#[test]
fn unknown_characters_always_progress() {
  let tts = lex_all("a \u{1} b");
  assert_eq!(tts, vec![TT::Identifier, TT::Invalid, TT::Identifier]);
}
