use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::lex::KEYWORDS_MAPPING;
use crate::loc::Loc;
use ahash::HashSet;
use ahash::HashSetExt;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum TT {
  // Special token used to represent the end of the source code. Easier than using and handling Option everywhere.
  EOF,
  // Special token used to represent invalid source code. The parser only rejects it where a declaration needs a real token; skipped statements simply consume it.
  Invalid,
  // These are only used by lexer.
  CommentDoc,
  CommentMultilineEnd,
  LineTerminator,
  LiteralNumberBin,
  LiteralNumberHex,
  LiteralNumberOct,
  Whitespace,

  At,
  Ampersand,
  AmpersandAmpersand,
  Asterisk,
  Bar,
  BarBar,
  BraceClose,
  BraceOpen,
  BracketClose,
  BracketOpen,
  Caret,
  ChevronLeft,
  ChevronRight,
  Colon,
  Comma,
  CommentMultiline,
  CommentSingle,
  Dot,
  DotDotDot,
  Equals,
  EqualsChevronRight,
  EqualsEquals,
  EqualsEqualsEquals,
  Exclamation,
  ExclamationEquals,
  ExclamationEqualsEquals,
  Hyphen,
  Identifier,
  KeywordAbstract,
  KeywordAs,
  KeywordAsserts,
  KeywordClass,
  KeywordConst,
  KeywordDeclare,
  KeywordDefault,
  KeywordEnum,
  KeywordExport,
  KeywordExtends,
  KeywordFrom,
  KeywordFunction,
  KeywordGet,
  KeywordGlobal,
  KeywordImplements,
  KeywordImport,
  KeywordIn,
  KeywordInfer,
  KeywordInterface,
  KeywordIs,
  KeywordKeyof,
  KeywordLet,
  KeywordModule,
  KeywordNamespace,
  KeywordNew,
  KeywordReadonly,
  KeywordSatisfies,
  KeywordSet,
  KeywordThis,
  KeywordType,
  KeywordTypeof,
  KeywordUnique,
  KeywordVar,
  // Type keywords.
  KeywordAny,
  KeywordBigIntType,
  KeywordBooleanType,
  KeywordNever,
  KeywordNumberType,
  KeywordObjectType,
  KeywordStringType,
  KeywordSymbolType,
  KeywordUndefinedType,
  KeywordUnknown,
  KeywordVoid,
  LiteralBigInt,
  LiteralFalse,
  LiteralNull,
  LiteralNumber,
  LiteralString,
  LiteralTemplatePartString,
  LiteralTemplatePartStringEnd,
  LiteralTrue,
  ParenthesisClose,
  ParenthesisOpen,
  Percent,
  Plus,
  PrivateMember,
  Question,
  QuestionQuestion,
  Semicolon,
  Slash,
  Tilde,
}

// These can be used as declaration, parameter and type names.
pub static UNRESERVED_KEYWORDS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::KeywordAbstract);
  set.insert(TT::KeywordAs);
  set.insert(TT::KeywordAsserts);
  set.insert(TT::KeywordDeclare);
  set.insert(TT::KeywordFrom);
  set.insert(TT::KeywordGet);
  set.insert(TT::KeywordGlobal);
  set.insert(TT::KeywordImplements);
  set.insert(TT::KeywordInfer);
  set.insert(TT::KeywordInterface);
  set.insert(TT::KeywordIs);
  set.insert(TT::KeywordKeyof);
  set.insert(TT::KeywordLet);
  set.insert(TT::KeywordModule);
  set.insert(TT::KeywordNamespace);
  set.insert(TT::KeywordReadonly);
  set.insert(TT::KeywordSatisfies);
  set.insert(TT::KeywordSet);
  set.insert(TT::KeywordType);
  set.insert(TT::KeywordUnique);
  set.insert(TT::KeywordAny);
  set.insert(TT::KeywordBigIntType);
  set.insert(TT::KeywordBooleanType);
  set.insert(TT::KeywordNever);
  set.insert(TT::KeywordNumberType);
  set.insert(TT::KeywordObjectType);
  set.insert(TT::KeywordStringType);
  set.insert(TT::KeywordSymbolType);
  set.insert(TT::KeywordUndefinedType);
  set.insert(TT::KeywordUnknown);
  set
});

// Tokens that begin a new top-level or namespace-level statement; used to recover at statement boundaries when skipping unsupported code.
pub static STATEMENT_STARTS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::At);
  set.insert(TT::KeywordAbstract);
  set.insert(TT::KeywordClass);
  set.insert(TT::KeywordConst);
  set.insert(TT::KeywordDeclare);
  set.insert(TT::KeywordEnum);
  set.insert(TT::KeywordExport);
  set.insert(TT::KeywordFunction);
  set.insert(TT::KeywordImport);
  set.insert(TT::KeywordInterface);
  set.insert(TT::KeywordLet);
  set.insert(TT::KeywordModule);
  set.insert(TT::KeywordNamespace);
  set.insert(TT::KeywordType);
  set.insert(TT::KeywordVar);
  set
});

impl TT {
  pub fn is_keyword(self) -> bool {
    KEYWORDS_MAPPING.contains_key(&self)
  }

  /// Whether a token of this type can serve as a binding or type name.
  pub fn is_identifier_like(self) -> bool {
    self == TT::Identifier || UNRESERVED_KEYWORDS.contains(&self)
  }
}

#[derive(Clone, Debug)]
pub struct Token {
  pub loc: Loc,
  // Whether one or more whitespace characters appear immediately before this token, and at least
  // one of those whitespace characters is a line terminator.
  pub preceded_by_line_terminator: bool,
  // The last `/** ... */` comment between the previous token and this one.
  pub doc: Option<Loc>,
  pub typ: TT,
}

impl Token {
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, Some(self.typ))
  }
}
