mod plugin;
mod plugin_context;
mod plugin_driver;
mod types;

pub use crate::{
  plugin::{Plugin, SharedPlugin},
  plugin_context::PluginContext,
  plugin_driver::{PluginDriver, SharedPluginDriver},
  types::{
    hook_build_end_args::HookBuildEndArgs,
    hook_load_args::HookLoadArgs,
    hook_load_output::HookLoadOutput,
    hook_resolve_id_args::HookResolveIdArgs,
    hook_resolve_id_output::HookResolveIdOutput,
    hook_returns::{HookLoadReturn, HookNoopReturn, HookResolveIdReturn},
  },
};
