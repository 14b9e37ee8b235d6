use std::sync::{Mutex, PoisonError};

use arcstr::ArcStr;
use typepack_common::{OutputAsset, SharedOptions};
use typepack_fs::{FileSystem, SharedFileSystem};

/// Per-pass data shared with every hook.
pub struct PluginContext {
  options: SharedOptions,
  fs: SharedFileSystem,
  entries: Vec<ArcStr>,
  emitted_files: Mutex<Vec<OutputAsset>>,
}

impl PluginContext {
  pub fn new(options: SharedOptions, fs: SharedFileSystem, entries: Vec<ArcStr>) -> Self {
    Self { options, fs, entries, emitted_files: Mutex::default() }
  }

  pub fn options(&self) -> &SharedOptions {
    &self.options
  }

  pub fn fs(&self) -> &dyn FileSystem {
    &*self.fs
  }

  /// Absolute entry paths of this pass, in input order.
  pub fn entries(&self) -> &[ArcStr] {
    &self.entries
  }

  /// Reports a file written by a plugin so it shows up in the build output.
  pub fn emit_file(&self, asset: OutputAsset) {
    self.emitted_files.lock().unwrap_or_else(PoisonError::into_inner).push(asset);
  }

  pub fn take_emitted_files(&self) -> Vec<OutputAsset> {
    std::mem::take(&mut *self.emitted_files.lock().unwrap_or_else(PoisonError::into_inner))
  }
}
