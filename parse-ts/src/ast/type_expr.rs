use super::node::Node;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
#[serde(tag = "$t", content = "v")]
pub enum TypeExpr {
  Keyword(#[drive(skip)] TypeKeyword),
  Reference(Node<TypeReference>),
  Literal(#[drive(skip)] TypeLiteral),
  Array(Node<TypeArray>),
  Tuple(Node<TypeTuple>),
  Union(Node<TypeUnion>),
  Intersection(Node<TypeIntersection>),
  Function(Node<TypeFunction>),
  Constructor(Node<TypeFunction>),
  Object(Node<TypeObjectLiteral>),
  Parenthesized(Node<TypeParenthesized>),
  Query(Node<TypeQuery>),
  Operator(Node<TypeOperator>),
  IndexedAccess(Node<TypeIndexedAccess>),
  Conditional(Node<TypeConditional>),
  Infer(#[drive(skip)] String),
  Mapped(Node<TypeMapped>),
  TemplateLiteral(Node<TypeTemplateLiteral>),
  Predicate(Node<TypePredicate>),
  Import(Node<TypeImport>),
}

impl TypeExpr {
  /// Strips any number of enclosing parentheses.
  pub fn unparenthesized(&self) -> &TypeExpr {
    match self {
      TypeExpr::Parenthesized(p) => p.stx.type_expr.stx.unparenthesized(),
      other => other,
    }
  }

  pub fn as_reference(&self) -> Option<&TypeReference> {
    match self.unparenthesized() {
      TypeExpr::Reference(r) => Some(&r.stx),
      _ => None,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TypeKeyword {
  Any,
  BigInt,
  Boolean,
  Never,
  Null,
  Number,
  Object,
  String,
  Symbol,
  This,
  Undefined,
  Unknown,
  Void,
}

impl TypeKeyword {
  pub fn as_str(self) -> &'static str {
    match self {
      TypeKeyword::Any => "any",
      TypeKeyword::BigInt => "bigint",
      TypeKeyword::Boolean => "boolean",
      TypeKeyword::Never => "never",
      TypeKeyword::Null => "null",
      TypeKeyword::Number => "number",
      TypeKeyword::Object => "object",
      TypeKeyword::String => "string",
      TypeKeyword::Symbol => "symbol",
      TypeKeyword::This => "this",
      TypeKeyword::Undefined => "undefined",
      TypeKeyword::Unknown => "unknown",
      TypeKeyword::Void => "void",
    }
  }
}

/// Type reference: Foo, Foo<T>, A.B.C<T, U>
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeReference {
  #[drive(skip)]
  pub name: TypeEntityName,
  pub type_arguments: Vec<Node<TypeExpr>>,
}

/// Entity name in a type reference or `typeof` query, possibly qualified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "$t", content = "v")]
pub enum TypeEntityName {
  Identifier(String),
  Qualified(Box<TypeQualifiedName>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeQualifiedName {
  pub left: TypeEntityName,
  pub right: String,
}

impl TypeEntityName {
  pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Option<TypeEntityName> {
    let (first, rest) = segments.split_first()?;
    let mut name = TypeEntityName::Identifier(first.as_ref().to_string());
    for seg in rest {
      name = TypeEntityName::Qualified(Box::new(TypeQualifiedName {
        left: name,
        right: seg.as_ref().to_string(),
      }));
    }
    Some(name)
  }

  /// The leftmost identifier.
  pub fn root(&self) -> &str {
    match self {
      TypeEntityName::Identifier(n) => n,
      TypeEntityName::Qualified(q) => q.left.root(),
    }
  }

  pub fn segments(&self) -> Vec<&str> {
    match self {
      TypeEntityName::Identifier(n) => vec![n.as_str()],
      TypeEntityName::Qualified(q) => {
        let mut segs = q.left.segments();
        segs.push(q.right.as_str());
        segs
      }
    }
  }

  pub fn as_identifier(&self) -> Option<&str> {
    match self {
      TypeEntityName::Identifier(n) => Some(n),
      TypeEntityName::Qualified(_) => None,
    }
  }
}

impl Display for TypeEntityName {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      TypeEntityName::Identifier(n) => write!(f, "{}", n),
      TypeEntityName::Qualified(q) => write!(f, "{}.{}", q.left, q.right),
    }
  }
}

/// Literal type: "foo", 42, -1, true, 10n
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "$t", content = "v")]
pub enum TypeLiteral {
  String(String),
  // Source text of the numeric literal, including a leading `-` if negated.
  Number(String),
  BigInt(String),
  Boolean(bool),
}

/// Array type: T[] or readonly T[]
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeArray {
  #[drive(skip)]
  pub readonly: bool,
  pub element_type: Node<TypeExpr>,
}

/// Tuple type: [T, U], [string, ...number[]] or readonly [T, U]
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeTuple {
  #[drive(skip)]
  pub readonly: bool,
  pub elements: Vec<Node<TypeTupleElement>>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeTupleElement {
  #[drive(skip)]
  pub label: Option<String>,
  #[drive(skip)]
  pub optional: bool,
  #[drive(skip)]
  pub rest: bool,
  pub type_expr: Node<TypeExpr>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeUnion {
  pub types: Vec<Node<TypeExpr>>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeIntersection {
  pub types: Vec<Node<TypeExpr>>,
}

/// Function type `(x: T) => R`; also used for constructor types `new (x: T) => R`.
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeFunction {
  pub type_parameters: Vec<Node<TypeParameter>>,
  pub parameters: Vec<Node<TypeFunctionParameter>>,
  pub return_type: Node<TypeExpr>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeFunctionParameter {
  // Source text of the binding, which may be a destructuring pattern.
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub optional: bool,
  #[drive(skip)]
  pub rest: bool,
  pub type_expr: Option<Node<TypeExpr>>,
}

/// Type parameter: T, T extends U, T = DefaultType, const T
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeParameter {
  #[drive(skip)]
  pub name: String,
  pub constraint: Option<Node<TypeExpr>>,
  pub default: Option<Node<TypeExpr>>,
}

/// Object type literal: { x: T; y: U; }
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeObjectLiteral {
  pub members: Vec<Node<TypeMember>>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
#[serde(tag = "$t", content = "v")]
pub enum TypeMember {
  Property(Node<TypePropertySignature>),
  Method(Node<TypeMethodSignature>),
  CallSignature(Node<TypeCallSignature>),
  ConstructSignature(Node<TypeCallSignature>),
  IndexSignature(Node<TypeIndexSignature>),
}

/// Property signature: x: T, readonly x?: T. Accessors (`get x(): T`) are represented as properties.
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypePropertySignature {
  #[drive(skip)]
  pub readonly: bool,
  #[drive(skip)]
  pub optional: bool,
  #[drive(skip)]
  pub key: TypePropertyKey,
  pub type_annotation: Option<Node<TypeExpr>>,
  // Raw text of the attached `/** ... */` comment.
  #[drive(skip)]
  pub doc: Option<String>,
}

/// Method signature: foo(x: T): U
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeMethodSignature {
  #[drive(skip)]
  pub optional: bool,
  #[drive(skip)]
  pub key: TypePropertyKey,
  pub type_parameters: Vec<Node<TypeParameter>>,
  pub parameters: Vec<Node<TypeFunctionParameter>>,
  pub return_type: Option<Node<TypeExpr>>,
  #[drive(skip)]
  pub doc: Option<String>,
}

/// Call or construct signature: (x: T): U, new (x: T): U
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeCallSignature {
  pub type_parameters: Vec<Node<TypeParameter>>,
  pub parameters: Vec<Node<TypeFunctionParameter>>,
  pub return_type: Option<Node<TypeExpr>>,
}

/// Index signature: [key: string]: T
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeIndexSignature {
  #[drive(skip)]
  pub readonly: bool,
  #[drive(skip)]
  pub parameter_name: String,
  pub parameter_type: Node<TypeExpr>,
  pub type_annotation: Node<TypeExpr>,
  #[drive(skip)]
  pub doc: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "$t", content = "v")]
pub enum TypePropertyKey {
  Identifier(String),
  String(String),
  Number(String),
  // Source text between the brackets of a computed key such as `[Symbol.iterator]`.
  Computed(String),
}

impl TypePropertyKey {
  /// The property name as it would be looked up at runtime, if statically known.
  pub fn static_name(&self) -> Option<&str> {
    match self {
      TypePropertyKey::Identifier(n) | TypePropertyKey::String(n) | TypePropertyKey::Number(n) => {
        Some(n)
      }
      TypePropertyKey::Computed(_) => None,
    }
  }
}

/// Parenthesized type: (T)
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeParenthesized {
  pub type_expr: Node<TypeExpr>,
}

/// Type query: typeof x, typeof foo.bar
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeQuery {
  #[drive(skip)]
  pub expr_name: TypeEntityName,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TypeOperatorKind {
  KeyOf,
  Readonly,
  Unique,
}

/// Type operator: keyof T, readonly T[], unique symbol
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeOperator {
  #[drive(skip)]
  pub operator: TypeOperatorKind,
  pub type_expr: Node<TypeExpr>,
}

/// Indexed access type: T[K], T["prop"]
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeIndexedAccess {
  pub object_type: Node<TypeExpr>,
  pub index_type: Node<TypeExpr>,
}

/// Conditional type: T extends U ? X : Y
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeConditional {
  pub check_type: Node<TypeExpr>,
  pub extends_type: Node<TypeExpr>,
  pub true_type: Node<TypeExpr>,
  pub false_type: Node<TypeExpr>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MappedTypeModifier {
  Plus,
  Minus,
  None,
}

/// Mapped type: { readonly [K in keyof T]?: T[K] }
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeMapped {
  #[drive(skip)]
  pub readonly_modifier: Option<MappedTypeModifier>,
  #[drive(skip)]
  pub type_parameter: String,
  pub constraint: Node<TypeExpr>,
  pub name_type: Option<Node<TypeExpr>>,
  #[drive(skip)]
  pub optional_modifier: Option<MappedTypeModifier>,
  pub type_expr: Option<Node<TypeExpr>>,
}

/// Template literal type: `prefix${T}suffix`
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeTemplateLiteral {
  #[drive(skip)]
  pub head: String,
  pub spans: Vec<Node<TypeTemplateLiteralSpan>>,
}

#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeTemplateLiteralSpan {
  pub type_expr: Node<TypeExpr>,
  #[drive(skip)]
  pub literal: String,
}

/// Type predicate: x is T, asserts x is T, asserts x
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypePredicate {
  #[drive(skip)]
  pub asserts: bool,
  #[drive(skip)]
  pub parameter_name: String,
  pub type_annotation: Option<Node<TypeExpr>>,
}

/// Import type: import("./module").Foo<T>
#[derive(Clone, Debug, Drive, DriveMut, Serialize)]
pub struct TypeImport {
  #[drive(skip)]
  pub module: String,
  #[drive(skip)]
  pub qualifier: Option<TypeEntityName>,
  pub type_arguments: Vec<Node<TypeExpr>>,
}
