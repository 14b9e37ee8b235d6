use std::{borrow::Cow, path::Path};

use arcstr::ArcStr;
use typepack_common::SharedDependencyGraph;
use typepack_plugin::{
  HookNoopReturn, HookResolveIdArgs, HookResolveIdReturn, Plugin, PluginContext,
};
use typepack_resolver::resolve_relative;
use typepack_utils::{path_ext::PathExt, specifier::is_relative_specifier};

/// Tracks, per entrypoint, every file reachable through relative imports.
///
/// The plugin only observes resolution and never answers it. The graph is settled once the
/// host reaches `build_end`.
#[derive(Debug)]
pub struct ResolvePlugin {
  graph: SharedDependencyGraph,
}

impl ResolvePlugin {
  pub fn new(graph: SharedDependencyGraph) -> Self {
    Self { graph }
  }
}

impl Plugin for ResolvePlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("typepack:resolve")
  }

  fn build_start(&self, ctx: &PluginContext) -> HookNoopReturn {
    self.graph.reset(ctx.entries().iter().cloned());
    tracing::debug!(entries = ctx.entries().len(), "dependency graph reset");
    Ok(())
  }

  fn resolve_id(&self, ctx: &PluginContext, args: &HookResolveIdArgs) -> HookResolveIdReturn {
    if !is_relative_specifier(args.specifier) {
      return Ok(None);
    }

    if self.graph.owner(args.importer).is_none() {
      tracing::warn!(
        importer = args.importer,
        specifier = args.specifier,
        "importer is not owned by any entrypoint, import ignored"
      );
      return Ok(None);
    }

    let Some(resolved) = resolve_relative(ctx.fs(), Path::new(args.importer), args.specifier)
    else {
      tracing::trace!(importer = args.importer, specifier = args.specifier, "no source file");
      return Ok(None);
    };

    let resolved = ArcStr::from(resolved.expect_to_str());
    match self.graph.add_dependency(args.importer, resolved.clone()) {
      Ok(discovered) => {
        tracing::trace!(importer = args.importer, dependency = %resolved, discovered, "tracked");
      }
      Err(err) => tracing::warn!("{err}"),
    }

    Ok(None)
  }
}

#[cfg(test)]
mod tests {
  use std::{path::PathBuf, sync::Arc, time::Duration};

  use typepack_common::{DependencyGraph, NormalizedBundlerOptions};
  use typepack_fs::MemoryFileSystem;

  use super::*;

  fn setup(files: &[&str], entries: &[&str]) -> (ResolvePlugin, SharedDependencyGraph, PluginContext) {
    let files = files.iter().map(|path| (*path, "")).collect::<Vec<_>>();
    let fs = MemoryFileSystem::new(&files).unwrap();
    let options = NormalizedBundlerOptions {
      input: entries.iter().map(ToString::to_string).collect(),
      cwd: PathBuf::from("/"),
      dir: None,
      root: None,
      dts: false,
      watch: false,
      debounce: Duration::from_millis(10),
    };
    let ctx = PluginContext::new(
      Arc::new(options),
      Arc::new(fs),
      entries.iter().map(|entry| ArcStr::from(*entry)).collect(),
    );
    let graph = Arc::new(DependencyGraph::default());
    (ResolvePlugin::new(Arc::clone(&graph)), graph, ctx)
  }

  fn resolve(plugin: &ResolvePlugin, ctx: &PluginContext, importer: &str, specifier: &str) {
    let resolved = plugin.resolve_id(ctx, &HookResolveIdArgs { importer, specifier }).unwrap();
    assert!(resolved.is_none());
  }

  fn deps(graph: &DependencyGraph, entry: &str) -> Vec<String> {
    graph.dependencies(entry).unwrap().iter().map(ToString::to_string).collect()
  }

  #[test]
  fn entries_contain_themselves_after_start() {
    let (plugin, graph, ctx) = setup(&["/src/a.ts", "/src/b.ts"], &["/src/a.ts", "/src/b.ts"]);
    plugin.build_start(&ctx).unwrap();
    assert_eq!(deps(&graph, "/src/a.ts"), vec!["/src/a.ts"]);
    assert_eq!(deps(&graph, "/src/b.ts"), vec!["/src/b.ts"]);
  }

  #[test]
  fn import_chain_is_reachable_and_siblings_are_not() {
    let (plugin, graph, ctx) = setup(
      &["/src/a.ts", "/src/b.ts", "/src/c.ts", "/src/d.ts", "/src/other.ts"],
      &["/src/a.ts", "/src/other.ts"],
    );
    plugin.build_start(&ctx).unwrap();
    resolve(&plugin, &ctx, "/src/a.ts", "./b");
    resolve(&plugin, &ctx, "/src/other.ts", "./d");
    resolve(&plugin, &ctx, "/src/b.ts", "./c.js");

    assert_eq!(deps(&graph, "/src/a.ts"), vec!["/src/a.ts", "/src/b.ts", "/src/c.ts"]);
    assert_eq!(deps(&graph, "/src/other.ts"), vec!["/src/other.ts", "/src/d.ts"]);
  }

  #[test]
  fn shared_module_is_walked_from_its_first_owner() {
    let (plugin, graph, ctx) = setup(
      &["/src/a.ts", "/src/b.ts", "/src/shared.ts", "/src/inner.ts"],
      &["/src/a.ts", "/src/b.ts"],
    );
    plugin.build_start(&ctx).unwrap();
    resolve(&plugin, &ctx, "/src/a.ts", "./shared");
    resolve(&plugin, &ctx, "/src/b.ts", "./shared");
    resolve(&plugin, &ctx, "/src/shared.ts", "./inner");

    assert!(deps(&graph, "/src/a.ts").contains(&"/src/shared.ts".to_string()));
    assert!(deps(&graph, "/src/b.ts").contains(&"/src/shared.ts".to_string()));
    assert_eq!(graph.owner("/src/shared.ts").as_deref(), Some("/src/a.ts"));
    assert_eq!(graph.owner("/src/inner.ts").as_deref(), Some("/src/a.ts"));
    assert!(!deps(&graph, "/src/b.ts").contains(&"/src/inner.ts".to_string()));
  }

  #[test]
  fn out_of_scope_imports_are_ignored() {
    let (plugin, graph, ctx) = setup(&["/src/a.ts"], &["/src/a.ts"]);
    plugin.build_start(&ctx).unwrap();
    resolve(&plugin, &ctx, "/src/a.ts", "react");
    resolve(&plugin, &ctx, "/src/a.ts", "node:fs");
    resolve(&plugin, &ctx, "/src/a.ts", "./virtual-types");
    resolve(&plugin, &ctx, "/src/unknown.ts", "./a");
    assert_eq!(deps(&graph, "/src/a.ts"), vec!["/src/a.ts"]);
    assert_eq!(graph.files().len(), 1);
  }

  #[test]
  fn circular_imports_terminate() {
    let (plugin, graph, ctx) = setup(&["/src/a.ts", "/src/b.ts"], &["/src/a.ts"]);
    plugin.build_start(&ctx).unwrap();
    resolve(&plugin, &ctx, "/src/a.ts", "./b");
    resolve(&plugin, &ctx, "/src/b.ts", "./a");
    resolve(&plugin, &ctx, "/src/a.ts", "./b");
    assert_eq!(deps(&graph, "/src/a.ts"), vec!["/src/a.ts", "/src/b.ts"]);
  }

  #[test]
  fn restart_clears_previous_pass() {
    let (plugin, graph, ctx) = setup(&["/src/a.ts", "/src/b.ts"], &["/src/a.ts"]);
    plugin.build_start(&ctx).unwrap();
    resolve(&plugin, &ctx, "/src/a.ts", "./b");
    plugin.build_start(&ctx).unwrap();
    assert_eq!(deps(&graph, "/src/a.ts"), vec!["/src/a.ts"]);
  }
}
