use std::{
  ffi::OsString,
  path::{Path, PathBuf},
};

use sugar_path::SugarPath;
use typepack_fs::{FileSystem, SharedFileSystem};
use typepack_utils::specifier::is_relative_specifier;

/// Recognized source extensions. Earlier entries win when several candidates exist.
pub const SOURCE_EXTENSIONS: [&str; 4] = [".ts", ".tsx", ".mts", ".cts"];

/// Emitted JavaScript extensions and the source extension they are compiled from.
const EMITTED_EXTENSIONS: [(&str, &str); 4] =
  [(".js", ".ts"), (".jsx", ".tsx"), (".mjs", ".mts"), (".cjs", ".cts")];

pub fn has_source_extension(path: &Path) -> bool {
  let path = path.as_os_str().to_string_lossy();
  SOURCE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Declaration extension for a source file: `.d.ts`, `.d.mts` or `.d.cts`.
pub fn declaration_extension(path: &Path) -> &'static str {
  match path.extension().and_then(|ext| ext.to_str()) {
    Some("mts" | "mjs") => ".d.mts",
    Some("cts" | "cjs") => ".d.cts",
    _ => ".d.ts",
  }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
  let mut path: OsString = base.as_os_str().to_owned();
  path.push(suffix);
  PathBuf::from(path)
}

/// Finds the source file `base` refers to.
///
/// 1. `base` with a recognized extension resolves to itself when it is a file.
/// 2. `base` with an emitted JavaScript extension tries its source counterpart.
/// 3. `base` + each recognized extension.
/// 4. `base/index` + each recognized extension.
pub fn resolve_source_file(fs: &dyn FileSystem, base: &Path) -> Option<PathBuf> {
  if has_source_extension(base) {
    return fs.is_file(base).then(|| base.to_path_buf());
  }

  let lossy = base.as_os_str().to_string_lossy();
  if let Some((emitted, source)) = EMITTED_EXTENSIONS.iter().find(|(ext, _)| lossy.ends_with(ext)) {
    let candidate = with_suffix(Path::new(&lossy[..lossy.len() - emitted.len()]), source);
    if fs.is_file(&candidate) {
      return Some(candidate);
    }
  }

  SOURCE_EXTENSIONS
    .iter()
    .map(|ext| with_suffix(base, ext))
    .chain(SOURCE_EXTENSIONS.iter().map(|ext| with_suffix(&base.join("index"), ext)))
    .find(|candidate| fs.is_file(candidate))
}

/// Resolves a relative `specifier` written in `importer` against the importer's directory.
///
/// `None` for non-relative specifiers and for relative ones that match no file.
pub fn resolve_relative(fs: &dyn FileSystem, importer: &Path, specifier: &str) -> Option<PathBuf> {
  if !is_relative_specifier(specifier) {
    return None;
  }
  let dir = importer.parent().unwrap_or(importer);
  resolve_source_file(fs, &dir.join(specifier).normalize())
}

/// [`resolve_relative`] bound to a shared file system.
#[derive(Clone)]
pub struct Resolver {
  fs: SharedFileSystem,
}

impl Resolver {
  pub fn new(fs: SharedFileSystem) -> Self {
    Self { fs }
  }

  pub fn fs(&self) -> &dyn FileSystem {
    &*self.fs
  }

  pub fn resolve(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
    resolve_relative(&*self.fs, importer, specifier)
  }
}
