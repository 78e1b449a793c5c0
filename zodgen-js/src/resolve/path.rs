//! POSIX-style path arithmetic over module specifiers and host file ids.

/// Extensions tried, in order, when a relative specifier names a file without one.
pub const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];

pub fn is_relative(specifier: &str) -> bool {
  specifier == "."
    || specifier == ".."
    || specifier.starts_with("./")
    || specifier.starts_with("../")
}

/// Everything before the last `/`, or the empty string.
pub fn dirname(path: &str) -> &str {
  match path.rfind('/') {
    Some(0) => "/",
    Some(i) => &path[..i],
    None => "",
  }
}

/// Resolves `.` and `..` segments. Leading `..` segments that cannot be collapsed are kept, as is a
/// leading `/`.
pub fn normalize(path: &str) -> String {
  let absolute = path.starts_with('/');
  let mut segs: Vec<&str> = Vec::new();
  for seg in path.split('/') {
    match seg {
      "" | "." => {}
      ".." => match segs.last() {
        Some(&last) if last != ".." => {
          segs.pop();
        }
        _ if absolute => {}
        _ => segs.push(".."),
      },
      seg => segs.push(seg),
    };
  }
  let joined = segs.join("/");
  if absolute {
    format!("/{joined}")
  } else {
    joined
  }
}

/// Joins `specifier` onto the directory containing `from`.
pub fn join(from: &str, specifier: &str) -> String {
  let dir = dirname(from);
  if dir.is_empty() {
    normalize(specifier)
  } else {
    normalize(&format!("{dir}/{specifier}"))
  }
}

/// Candidate file ids for a relative specifier, most specific first.
pub fn candidates(base: &str) -> Vec<String> {
  let mut out = vec![base.to_string()];
  let stem = base
    .strip_suffix(".js")
    .or_else(|| base.strip_suffix(".mjs"))
    .unwrap_or(base);
  for ext in SOURCE_EXTENSIONS {
    out.push(format!("{stem}{ext}"));
  }
  for ext in SOURCE_EXTENSIONS {
    out.push(format!("{base}/index{ext}"));
  }
  out
}

/// Rewrites `specifier`, written inside the module imported as `importer`, so that it is relative to
/// the module that imported `importer`. Keeps the leading `./` that module specifiers need.
pub fn rebase_specifier(importer: &str, specifier: &str) -> String {
  if !is_relative(specifier) {
    return specifier.to_string();
  };
  let joined = join(importer, specifier);
  if joined.starts_with("../") || joined == ".." || joined.starts_with('/') {
    joined
  } else {
    format!("./{joined}")
  }
}

/// Specifier that imports the file `target` from a module in directory `from_dir`, without its source
/// extension. Both paths must be relative to the same base, or both absolute.
pub fn relative_specifier(from_dir: &str, target: &str) -> String {
  let target = normalize(target);
  let target = [".d.ts", ".tsx", ".ts"]
    .iter()
    .find_map(|ext| target.strip_suffix(*ext))
    .unwrap_or(&target);
  let from = normalize(from_dir);
  let from: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
  let to: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
  let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
  let mut parts = vec![".."; from.len() - common];
  parts.extend_from_slice(&to[common..]);
  let joined = parts.join("/");
  if joined.starts_with("..") {
    joined
  } else {
    format!("./{joined}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalizes_segments() {
    assert_eq!(normalize("a/./b/../c"), "a/c");
    assert_eq!(normalize("../a/../../b"), "../../b");
    assert_eq!(normalize("/src/../../x.ts"), "/x.ts");
  }

  #[test]
  fn joins_relative_to_file() {
    assert_eq!(join("src/hero.ts", "./villain"), "src/villain");
    assert_eq!(join("src/models/hero.ts", "../shared/power"), "src/shared/power");
    assert_eq!(join("hero.ts", "./villain"), "villain");
  }

  #[test]
  fn rebases_nested_specifiers() {
    assert_eq!(rebase_specifier("./models/villain", "./power"), "./models/power");
    assert_eq!(rebase_specifier("./models/villain", "../power"), "./power");
    assert_eq!(rebase_specifier("./villain", "../up"), "../up");
    assert_eq!(rebase_specifier("./villain", "zod"), "zod");
  }

  #[test]
  fn relative_specifiers() {
    assert_eq!(relative_specifier("src", "src/hero.ts"), "./hero");
    assert_eq!(relative_specifier("src/generated", "src/types/hero.d.ts"), "../types/hero");
    assert_eq!(relative_specifier("", "hero.tsx"), "./hero");
    assert_eq!(relative_specifier("/out", "/src/hero.ts"), "../src/hero");
  }

  #[test]
  fn candidate_order() {
    let c = candidates("src/villain.js");
    assert_eq!(c[0], "src/villain.js");
    assert_eq!(c[1], "src/villain.ts");
    assert!(c.contains(&"src/villain.js/index.ts".to_string()));
  }
}
