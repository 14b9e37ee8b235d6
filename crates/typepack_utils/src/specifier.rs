/// Whether `specifier` starts with a same- or parent-directory prefix.
///
/// Everything else (package names, `node:` builtins, URLs, absolute paths) is out of reach of
/// the dependency graph.
pub fn is_relative_specifier(specifier: &str) -> bool {
  matches!(specifier, "." | "..") || specifier.starts_with("./") || specifier.starts_with("../")
}

#[test]
fn test_is_relative_specifier() {
  assert!(is_relative_specifier("./utils"));
  assert!(is_relative_specifier("../shared/types.ts"));
  assert!(is_relative_specifier(".."));
  assert!(!is_relative_specifier("node:fs"));
  assert!(!is_relative_specifier("react"));
  assert!(!is_relative_specifier("/abs/path"));
  assert!(!is_relative_specifier(".hidden"));
}
