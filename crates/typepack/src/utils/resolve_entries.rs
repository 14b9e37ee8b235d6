use std::path::Path;

use arcstr::ArcStr;
use sugar_path::SugarPath;
use typepack_common::NormalizedBundlerOptions;
use typepack_error::BuildResult;
use typepack_fs::FileSystem;
use typepack_resolver::resolve_source_file;
use typepack_utils::{indexmap::FxIndexSet, path_ext::PathExt};

/// Absolute paths of the configured entries, in input order and without duplicates.
///
/// An entry must name an existing file. Extensionless entries go through the same lookup as
/// relative imports.
pub fn resolve_entries(
  fs: &dyn FileSystem,
  options: &NormalizedBundlerOptions,
) -> BuildResult<Vec<ArcStr>> {
  let mut entries = FxIndexSet::default();
  let mut errors = vec![];

  for input in &options.input {
    let path = options.cwd.join(Path::new(input)).normalize();
    let resolved = if fs.is_file(&path) { Some(path.clone()) } else { resolve_source_file(fs, &path) };
    match resolved {
      Some(resolved) => {
        entries.insert(ArcStr::from(resolved.expect_to_str()));
      }
      None => errors.push(anyhow::anyhow!(
        "Entry module {:?} does not exist or is not a file",
        path.to_string_lossy()
      )),
    }
  }

  if errors.is_empty() {
    Ok(entries.into_iter().collect())
  } else {
    Err(errors.into())
  }
}
