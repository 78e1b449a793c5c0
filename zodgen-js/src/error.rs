use crate::host::HostError;
use parse_ts::error::SyntaxError;
use thiserror::Error;

/// Conditions that abort a whole generation run. Recoverable problems are reported as warnings in
/// [`crate::GenerateOutput::errors`] instead.
#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("Generic declarations are not supported: `{name}`")]
  GenericDeclaration { name: String },
  #[error("Only one `extends` clause is supported: `{name}`")]
  MultipleExtends { name: String },
  #[error("Index signature with `extends` is not supported: `{name}`")]
  IndexSignatureWithExtends { name: String },
  #[error("Omit and Pick only support literal keys or a union of literals: `{name}`")]
  UnsupportedOmitPickKeys { name: String },
  #[error("Record keys must be `string`, `number`, a literal or a type reference: `{name}`")]
  UnsupportedRecordKey { name: String },
  #[error("Can't wrap `{var_name}` in z.lazy() without an initializer")]
  LazyWithoutInitializer { var_name: String },
  #[error("{message}")]
  Syntax {
    message: String,
    #[source]
    source: SyntaxError,
  },
  #[error(transparent)]
  Host(#[from] HostError),
}

impl GenerateError {
  pub fn syntax(source: SyntaxError, text: &str) -> GenerateError {
    GenerateError::Syntax {
      message: source.describe(text),
      source,
    }
  }
}

pub type GenerateResult<T> = Result<T, GenerateError>;
