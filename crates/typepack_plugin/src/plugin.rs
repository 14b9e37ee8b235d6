use std::{borrow::Cow, sync::Arc};

use typepack_utils::pretty_type_name::pretty_type_name;

use crate::{
  HookBuildEndArgs, HookLoadArgs, HookLoadReturn, HookNoopReturn, HookResolveIdArgs,
  HookResolveIdReturn, PluginContext,
};

/// Lifecycle hooks the host calls during one build pass, in this order:
///
/// 1. `build_start` once;
/// 2. `resolve_id` for every import of a module, before any of those imports is loaded;
/// 3. `load` once per module;
/// 4. `build_end` once, after every `load` has returned, whether the pass failed or not.
pub trait Plugin: Send + Sync + 'static {
  fn name(&self) -> Cow<'static, str> {
    pretty_type_name::<Self>()
  }

  fn build_start(&self, _ctx: &PluginContext) -> HookNoopReturn {
    Ok(())
  }

  fn resolve_id(&self, _ctx: &PluginContext, _args: &HookResolveIdArgs) -> HookResolveIdReturn {
    Ok(None)
  }

  fn load(&self, _ctx: &PluginContext, _args: &HookLoadArgs) -> HookLoadReturn {
    Ok(None)
  }

  fn build_end(&self, _ctx: &PluginContext, _args: &HookBuildEndArgs) -> HookNoopReturn {
    Ok(())
  }
}

pub type SharedPlugin = Arc<dyn Plugin>;
