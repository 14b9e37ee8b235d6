mod module_declaration;
mod statement;
mod symbol_table;
mod synthesizer;
mod transformer;

use std::{
  borrow::Cow,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context;
use arcstr::ArcStr;
use typepack_common::{OutputAsset, SharedDependencyGraph};
use typepack_plugin::{
  HookBuildEndArgs, HookLoadArgs, HookLoadReturn, HookNoopReturn, Plugin, PluginContext,
};
use typepack_utils::path_ext::{common_ancestor, PathExt};

pub use crate::{
  module_declaration::ModuleDeclaration,
  statement::{Member, ModuleMembers, ModuleStatement, StatementKind},
  symbol_table::{DeclarationSymbol, LineSpan, SymbolTable},
  synthesizer::{output_path, DeclarationCache, Synthesizer, MISSING_DECLARATION_MARKER},
  transformer::{DeclarationTransformer, IsolatedDeclarationTransformer},
};

/// Writes one merged declaration file per entrypoint.
///
/// `load` captures the isolated declaration of every file the dependency graph knows about,
/// `build_end` merges them. Without an output directory the plugin does nothing.
pub struct DtsPlugin {
  graph: SharedDependencyGraph,
  transformer: Arc<dyn DeclarationTransformer>,
  declarations: DeclarationCache,
}

impl DtsPlugin {
  pub fn new(graph: SharedDependencyGraph) -> Self {
    Self::with_transformer(graph, Arc::new(IsolatedDeclarationTransformer))
  }

  pub fn with_transformer(
    graph: SharedDependencyGraph,
    transformer: Arc<dyn DeclarationTransformer>,
  ) -> Self {
    Self { graph, transformer, declarations: DeclarationCache::default() }
  }

  pub fn declaration(&self, path: &str) -> Option<Arc<ModuleDeclaration>> {
    self.declarations.get(path).map(|decl| Arc::clone(decl.value()))
  }

  fn root(ctx: &PluginContext) -> PathBuf {
    let options = ctx.options();
    match &options.root {
      Some(root) => options.cwd.join(root),
      None => {
        let entries = ctx.entries().iter().map(|entry| Path::new(entry.as_str())).collect::<Vec<_>>();
        common_ancestor(&entries).unwrap_or_else(|| options.cwd.clone())
      }
    }
  }
}

impl Plugin for DtsPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("typepack:dts")
  }

  fn build_start(&self, _ctx: &PluginContext) -> HookNoopReturn {
    self.declarations.clear();
    Ok(())
  }

  fn load(&self, ctx: &PluginContext, args: &HookLoadArgs) -> HookLoadReturn {
    if ctx.options().dts_dir().is_none()
      || !self.graph.contains(args.id)
      || self.declarations.contains_key(args.id)
    {
      return Ok(None);
    }

    let path = Path::new(args.id);
    let source = ctx
      .fs()
      .read_to_string(path)
      .with_context(|| format!("Failed to read {}", path.display()))?;
    match self.transformer.transform(path, &source) {
      Ok(text) => {
        let id = ArcStr::from(args.id);
        let decl = ModuleDeclaration::new(id.clone(), &text);
        tracing::trace!(module = args.id, symbols = decl.symbols.names().count(), "captured");
        self.declarations.insert(id, Arc::new(decl));
      }
      Err(err) => tracing::warn!(module = args.id, "cannot generate declaration: {err}"),
    }
    Ok(None)
  }

  fn build_end(&self, ctx: &PluginContext, args: &HookBuildEndArgs) -> HookNoopReturn {
    let Some(dir) = ctx.options().dts_dir() else {
      return Ok(());
    };
    if !args.is_success() {
      tracing::debug!(errors = args.errors.len(), "writing declarations of a failed build");
    }

    let root = Self::root(ctx);
    let synthesizer = Synthesizer::new(ctx.fs(), &self.declarations, &root);
    for entry in ctx.entries() {
      let content = synthesizer.synthesize(entry);
      let path = output_path(&dir, &root, Path::new(entry.as_str()));
      if let Some(parent) = path.parent() {
        ctx
          .fs()
          .create_dir_all(parent)
          .with_context(|| format!("Failed to create {}", parent.display()))?;
      }
      ctx
        .fs()
        .write(&path, content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
      tracing::debug!(entry = %entry, output = %path.display(), "declaration written");
      ctx.emit_file(OutputAsset { filename: path.relative_slash(&dir), path, content });
    }
    Ok(())
  }
}
