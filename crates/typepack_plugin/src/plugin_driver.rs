use std::sync::Arc;

use anyhow::Context;

use crate::{
  HookBuildEndArgs, HookLoadArgs, HookLoadReturn, HookNoopReturn, HookResolveIdArgs,
  HookResolveIdReturn, PluginContext, SharedPlugin,
};

pub type SharedPluginDriver = Arc<PluginDriver>;

/// Runs hooks of the registered plugins in registration order.
pub struct PluginDriver {
  plugins: Vec<SharedPlugin>,
}

impl PluginDriver {
  pub fn new_shared(plugins: Vec<SharedPlugin>) -> SharedPluginDriver {
    Arc::new(Self { plugins })
  }

  pub fn plugins(&self) -> &[SharedPlugin] {
    &self.plugins
  }

  pub fn build_start(&self, ctx: &PluginContext) -> HookNoopReturn {
    for plugin in &self.plugins {
      plugin
        .build_start(ctx)
        .with_context(|| format!("Plugin `{}` failed in `build_start`", plugin.name()))?;
    }
    Ok(())
  }

  /// The first plugin returning a resolution wins.
  pub fn resolve_id(&self, ctx: &PluginContext, args: &HookResolveIdArgs) -> HookResolveIdReturn {
    for plugin in &self.plugins {
      let resolved = plugin
        .resolve_id(ctx, args)
        .with_context(|| format!("Plugin `{}` failed in `resolve_id`", plugin.name()))?;
      if resolved.is_some() {
        return Ok(resolved);
      }
    }
    Ok(None)
  }

  /// The first plugin returning content wins.
  pub fn load(&self, ctx: &PluginContext, args: &HookLoadArgs) -> HookLoadReturn {
    for plugin in &self.plugins {
      let loaded = plugin
        .load(ctx, args)
        .with_context(|| format!("Plugin `{}` failed in `load`", plugin.name()))?;
      if loaded.is_some() {
        return Ok(loaded);
      }
    }
    Ok(None)
  }

  /// Every plugin sees `build_end`, even after an earlier one failed.
  pub fn build_end(
    &self,
    ctx: &PluginContext,
    args: &HookBuildEndArgs,
  ) -> Result<(), Vec<anyhow::Error>> {
    let errors = self
      .plugins
      .iter()
      .filter_map(|plugin| {
        plugin
          .build_end(ctx, args)
          .with_context(|| format!("Plugin `{}` failed in `build_end`", plugin.name()))
          .err()
      })
      .collect::<Vec<_>>();
    if errors.is_empty() {
      Ok(())
    } else {
      Err(errors)
    }
  }
}
