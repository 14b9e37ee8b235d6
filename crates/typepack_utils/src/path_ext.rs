use std::path::{Path, PathBuf};

use sugar_path::SugarPath;

pub trait PathExt {
  fn expect_to_str(&self) -> &str;

  fn expect_to_slash(&self) -> String;

  /// `self` relative to `root`, with forward slashes.
  fn relative_slash(&self, root: &Path) -> String;
}

impl PathExt for Path {
  fn expect_to_str(&self) -> &str {
    self.to_str().unwrap_or_else(|| {
      panic!("Failed to convert {:?} to valid utf8 str", self.display());
    })
  }

  fn expect_to_slash(&self) -> String {
    self
      .to_slash()
      .unwrap_or_else(|| panic!("Failed to convert {:?} to slash str", self.display()))
      .into_owned()
  }

  fn relative_slash(&self, root: &Path) -> String {
    self.relative(root).expect_to_slash()
  }
}

/// Deepest directory containing every path. A single path yields its parent directory.
pub fn common_ancestor<P: AsRef<Path>>(paths: &[P]) -> Option<PathBuf> {
  let mut iter = paths.iter().filter_map(|path| path.as_ref().parent());
  let mut ancestor = iter.next()?.to_path_buf();
  for dir in iter {
    while !dir.starts_with(&ancestor) {
      if !ancestor.pop() {
        return None;
      }
    }
  }
  Some(ancestor)
}

#[test]
fn test_common_ancestor() {
  let single = common_ancestor(&["/project/src/index.ts"]);
  assert_eq!(single, Some(PathBuf::from("/project/src")));

  let siblings = common_ancestor(&["/project/src/a.ts", "/project/src/b.ts"]);
  assert_eq!(siblings, Some(PathBuf::from("/project/src")));

  let nested =
    common_ancestor(&["/project/src/cli/main.ts", "/project/src/lib/index.ts", "/project/src/x.ts"]);
  assert_eq!(nested, Some(PathBuf::from("/project/src")));

  // `starts_with` compares whole components, `/project/src-extra` is not inside `/project/src`.
  let prefix = common_ancestor(&["/project/src/a.ts", "/project/src-extra/b.ts"]);
  assert_eq!(prefix, Some(PathBuf::from("/project")));

  assert_eq!(common_ancestor::<&str>(&[]), None);
}

#[test]
fn test_relative_slash() {
  let root = Path::new("/project/src");
  assert_eq!(Path::new("/project/src/lib/utils.ts").relative_slash(root), "lib/utils.ts");
  assert_eq!(Path::new("/project/shared.ts").relative_slash(root), "../shared.ts");
}
