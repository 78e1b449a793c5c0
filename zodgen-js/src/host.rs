use crate::resolve::path;
use ahash::HashMap;
use ahash::HashMapExt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Environment provider for foreign source files. File ids are opaque strings chosen by the host;
/// the root file's id is [`crate::GenerateOptions::source_file`].
pub trait SourceHost {
  /// Return the full text for a file.
  fn file_text(&self, file: &str) -> Result<Arc<str>, HostError>;
  /// Resolve a module specifier relative to `from`.
  fn resolve(&self, from: &str, specifier: &str) -> Option<String>;
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HostError {
  #[error("file not found: {file}")]
  NotFound { file: String },
  #[error("failed to read {file}: {message}")]
  Io { file: String, message: String },
}

/// In-memory host keyed by POSIX-style paths.
#[derive(Clone, Default)]
pub struct MemoryHost {
  files: HashMap<String, Arc<str>>,
}

impl MemoryHost {
  pub fn new() -> MemoryHost {
    MemoryHost {
      files: HashMap::new(),
    }
  }

  pub fn insert(&mut self, file: impl Into<String>, text: &str) {
    self.files.insert(path::normalize(&file.into()), Arc::from(text));
  }

  pub fn with_file(mut self, file: impl Into<String>, text: &str) -> MemoryHost {
    self.insert(file, text);
    self
  }
}

impl SourceHost for MemoryHost {
  fn file_text(&self, file: &str) -> Result<Arc<str>, HostError> {
    self
      .files
      .get(file)
      .cloned()
      .ok_or_else(|| HostError::NotFound {
        file: file.to_string(),
      })
  }

  fn resolve(&self, from: &str, specifier: &str) -> Option<String> {
    if !path::is_relative(specifier) {
      return None;
    };
    let base = path::join(from, specifier);
    path::candidates(&base)
      .into_iter()
      .find(|c| self.files.contains_key(c))
  }
}

/// Host reading from disk. Ids are the paths as given for the root and joined paths for imports.
#[derive(Clone, Debug, Default)]
pub struct FsHost;

impl SourceHost for FsHost {
  fn file_text(&self, file: &str) -> Result<Arc<str>, HostError> {
    fs::read_to_string(file)
      .map(Arc::from)
      .map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => HostError::NotFound {
          file: file.to_string(),
        },
        _ => HostError::Io {
          file: file.to_string(),
          message: err.to_string(),
        },
      })
  }

  fn resolve(&self, from: &str, specifier: &str) -> Option<String> {
    if !path::is_relative(specifier) {
      return None;
    };
    let from = from.replace('\\', "/");
    let base = path::join(&from, specifier);
    path::candidates(&base)
      .into_iter()
      .find(|c| Path::new(c).is_file())
  }
}

#[cfg(test)]
mod tests {
  use super::HostError;
  use super::MemoryHost;
  use super::SourceHost;

  #[test]
  fn memory_host_resolves_extensions() {
    let host = MemoryHost::new()
      .with_file("src/hero.ts", "")
      .with_file("src/villain.ts", "export type V = string;")
      .with_file("src/shared/index.ts", "");
    assert_eq!(
      host.resolve("src/hero.ts", "./villain").as_deref(),
      Some("src/villain.ts")
    );
    assert_eq!(
      host.resolve("src/hero.ts", "./shared").as_deref(),
      Some("src/shared/index.ts")
    );
    assert_eq!(host.resolve("src/hero.ts", "zod"), None);
    assert_eq!(host.resolve("src/hero.ts", "./nope"), None);
    assert_eq!(
      host.file_text("src/villain.ts").unwrap().as_ref(),
      "export type V = string;"
    );
    assert_eq!(
      host.file_text("nope.ts").unwrap_err(),
      HostError::NotFound {
        file: "nope.ts".into()
      }
    );
    assert_eq!(
      host.file_text("nope.ts").unwrap_err().to_string(),
      "file not found: nope.ts"
    );
  }
}
