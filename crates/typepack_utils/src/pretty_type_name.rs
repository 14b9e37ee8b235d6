use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

static MODULE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\w+::)").unwrap());

/// `T`'s name without module paths. Plugins that do not name themselves are reported with it.
pub fn pretty_type_name<T: ?Sized>() -> Cow<'static, str> {
  MODULE_PATH_RE.replace_all(std::any::type_name::<T>(), "")
}

#[test]
fn test_pretty_type_name() {
  struct WatchRecorder;
  assert_eq!(pretty_type_name::<WatchRecorder>(), "WatchRecorder");
  assert_eq!(pretty_type_name::<std::sync::Arc<std::path::PathBuf>>(), "Arc<PathBuf>");
}
