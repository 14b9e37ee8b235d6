use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct InputArgs {
  /// Entry modules, relative to the working directory.
  pub input: Vec<PathBuf>,

  #[clap(long)]
  pub cwd: Option<PathBuf>,

  /// JSON file with bundler options. Flags given on the command line win.
  #[clap(long, short = 'c')]
  pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct OutputArgs {
  #[clap(long, short = 'd')]
  pub dir: Option<PathBuf>,

  /// Directory the output layout mirrors.
  #[clap(long)]
  pub root: Option<PathBuf>,

  /// Skip declaration files.
  #[clap(long)]
  pub no_dts: bool,

  #[clap(long, short = 's')]
  pub silent: bool,
}

#[derive(Args)]
pub struct WatchArgs {
  #[clap(long, short = 'w')]
  pub watch: bool,

  /// Milliseconds to wait for changes to settle before rebuilding.
  #[clap(long)]
  pub debounce: Option<u64>,
}
