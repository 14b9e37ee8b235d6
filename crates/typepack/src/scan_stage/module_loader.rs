use std::{collections::VecDeque, path::Path};

use anyhow::Context;
use arcstr::ArcStr;
use rustc_hash::FxHashSet;
use typepack_ecmascript::{EcmaCompiler, SourceType};
use typepack_plugin::{HookLoadArgs, PluginContext, PluginDriver};

use crate::utils::resolve_id::{resolve_id, ResolvedImport};

#[derive(Debug, Default)]
pub struct ModuleLoaderOutput {
  /// Loaded modules in load order.
  pub modules: Vec<ArcStr>,
  pub errors: Vec<anyhow::Error>,
  pub warnings: Vec<anyhow::Error>,
}

/// Breadth-first module walk.
///
/// Every import of a module is resolved before any of them is loaded, so plugins observing
/// `resolve_id` know a module before its `load` runs.
pub struct ModuleLoader<'a> {
  ctx: &'a PluginContext,
  plugin_driver: &'a PluginDriver,
  visited: FxHashSet<ArcStr>,
  queue: VecDeque<ArcStr>,
}

impl<'a> ModuleLoader<'a> {
  pub fn new(ctx: &'a PluginContext, plugin_driver: &'a PluginDriver) -> Self {
    Self { ctx, plugin_driver, visited: FxHashSet::default(), queue: VecDeque::new() }
  }

  pub fn fetch_all_modules(mut self, entries: Vec<ArcStr>) -> ModuleLoaderOutput {
    let mut output = ModuleLoaderOutput::default();
    for entry in entries {
      self.enqueue(entry);
    }

    while let Some(id) = self.queue.pop_front() {
      let source = match self.load(&id) {
        Ok(source) => source,
        Err(err) => {
          output.errors.push(err);
          continue;
        }
      };
      output.modules.push(id.clone());

      let specifiers = match import_specifiers(&id, source) {
        Ok(specifiers) => specifiers,
        Err(err) => {
          output.errors.push(err);
          continue;
        }
      };

      let mut resolved_deps = Vec::with_capacity(specifiers.len());
      for specifier in &specifiers {
        match resolve_id(self.ctx, self.plugin_driver, &id, specifier) {
          Ok(ResolvedImport::Module(dep)) => resolved_deps.push(dep),
          Ok(ResolvedImport::External) => {
            tracing::trace!(importer = %id, specifier = %specifier, "external");
          }
          Ok(ResolvedImport::Unresolved) => output
            .warnings
            .push(anyhow::anyhow!("Could not resolve {specifier:?} imported by {id}")),
          Err(err) => output.errors.push(err),
        }
      }
      for dep in resolved_deps {
        self.enqueue(dep);
      }
    }

    tracing::debug!(
      modules = output.modules.len(),
      errors = output.errors.len(),
      warnings = output.warnings.len(),
      "scan finished"
    );
    output
  }

  fn enqueue(&mut self, id: ArcStr) {
    if self.visited.insert(id.clone()) {
      self.queue.push_back(id);
    }
  }

  /// Plugin content first, the file system otherwise.
  fn load(&self, id: &ArcStr) -> anyhow::Result<String> {
    if let Some(loaded) = self.plugin_driver.load(self.ctx, &HookLoadArgs { id: id.as_str() })? {
      return Ok(loaded.code);
    }
    self.ctx.fs().read_to_string(Path::new(id.as_str())).with_context(|| format!("Failed to read {id}"))
  }
}

fn import_specifiers(id: &ArcStr, source: String) -> anyhow::Result<Vec<ArcStr>> {
  let source_type = SourceType::from_path(id.as_str()).unwrap_or_else(|_| SourceType::ts());
  let ast = EcmaCompiler::parse(source, source_type).map_err(|err| anyhow::anyhow!("{id}: {err}"))?;
  Ok(ast.import_specifiers().into_iter().map(ArcStr::from).collect())
}
