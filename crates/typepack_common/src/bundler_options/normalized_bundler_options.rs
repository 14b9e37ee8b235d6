use std::{path::PathBuf, time::Duration};

#[derive(Debug)]
pub struct NormalizedBundlerOptions {
  // --- Input
  pub input: Vec<String>,
  pub cwd: PathBuf,

  // --- Output
  pub dir: Option<PathBuf>,
  pub root: Option<PathBuf>,
  pub dts: bool,

  // --- Watch
  pub watch: bool,
  pub debounce: Duration,
}

impl NormalizedBundlerOptions {
  /// Declaration output directory, only when declaration generation is enabled.
  pub fn dts_dir(&self) -> Option<PathBuf> {
    if self.dts {
      self.dir.as_ref().map(|dir| self.cwd.join(dir))
    } else {
      None
    }
  }
}
