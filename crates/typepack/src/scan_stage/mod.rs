mod module_loader;

use arcstr::ArcStr;
use typepack_plugin::{PluginContext, PluginDriver};

use self::module_loader::ModuleLoader;

pub use self::module_loader::ModuleLoaderOutput;

pub type ScanStageOutput = ModuleLoaderOutput;

pub struct ScanStage<'a> {
  ctx: &'a PluginContext,
  plugin_driver: &'a PluginDriver,
}

impl<'a> ScanStage<'a> {
  pub fn new(ctx: &'a PluginContext, plugin_driver: &'a PluginDriver) -> Self {
    Self { ctx, plugin_driver }
  }

  /// Loads every module reachable from the entries of the pass.
  pub fn scan(&self) -> ScanStageOutput {
    let entries: Vec<ArcStr> = self.ctx.entries().to_vec();
    ModuleLoader::new(self.ctx, self.plugin_driver).fetch_all_modules(entries)
  }
}
