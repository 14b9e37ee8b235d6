mod bundler;
mod scan_stage;
mod types;
mod utils;

pub use crate::{bundler::Bundler, types::bundle_output::BundleOutput};
pub use typepack_common::*;
pub use typepack_error::{BuildError, BuildResult};
pub use typepack_fs::{FileSystem, OsFileSystem, SharedFileSystem};
pub use typepack_plugin::{
  HookBuildEndArgs, HookLoadArgs, HookLoadOutput, HookLoadReturn, HookNoopReturn,
  HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, Plugin, PluginContext,
  SharedPlugin,
};
pub use typepack_watcher::{ChangeCallback, NotifyWatchPrimitive, WatchHandle, WatchPrimitive};
