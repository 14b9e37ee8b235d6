pub mod normalized_bundler_options;

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Raw, user-facing options. Every field is optional and filled in by `normalize_options`.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerOptions {
  // --- Input
  /// Entry module paths, relative to `cwd` unless absolute.
  pub input: Option<Vec<String>>,
  pub cwd: Option<PathBuf>,

  // --- Output
  /// Output directory. Declaration files are only generated when this is set.
  pub dir: Option<PathBuf>,
  /// Directory the output layout mirrors. Inferred from the entries when omitted.
  pub root: Option<PathBuf>,
  pub dts: Option<bool>,

  // --- Watch
  pub watch: Option<bool>,
  /// Debounce window for rebuilds, in milliseconds.
  pub debounce: Option<u64>,
}

impl BundlerOptions {
  /// Fills every unset field of `self` from `fallback`.
  #[must_use]
  pub fn merge(self, fallback: BundlerOptions) -> Self {
    Self {
      input: self.input.or(fallback.input),
      cwd: self.cwd.or(fallback.cwd),
      dir: self.dir.or(fallback.dir),
      root: self.root.or(fallback.root),
      dts: self.dts.or(fallback.dts),
      watch: self.watch.or(fallback.watch),
      debounce: self.debounce.or(fallback.debounce),
    }
  }
}
