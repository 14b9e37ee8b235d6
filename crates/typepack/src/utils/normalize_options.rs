use std::time::Duration;

use anyhow::Context;
use sugar_path::SugarPath;
use typepack_common::{BundlerOptions, NormalizedBundlerOptions, DEFAULT_DEBOUNCE_MS};

pub fn normalize_options(raw_options: BundlerOptions) -> anyhow::Result<NormalizedBundlerOptions> {
  let cwd = match raw_options.cwd {
    Some(cwd) if cwd.is_absolute() => cwd.normalize(),
    Some(cwd) => std::env::current_dir().context("Failed to get current dir")?.join(cwd).normalize(),
    None => std::env::current_dir().context("Failed to get current dir")?,
  };

  Ok(NormalizedBundlerOptions {
    input: raw_options.input.unwrap_or_default(),
    cwd,
    dir: raw_options.dir,
    root: raw_options.root,
    dts: raw_options.dts.unwrap_or(true),
    watch: raw_options.watch.unwrap_or(false),
    debounce: Duration::from_millis(raw_options.debounce.unwrap_or(DEFAULT_DEBOUNCE_MS)),
  })
}
