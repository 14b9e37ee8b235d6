use std::{future::Future, sync::Arc};

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use typepack_common::{BundlerOptions, DependencyGraph, SharedDependencyGraph, SharedOptions};
use typepack_error::{BuildError, BuildResult};
use typepack_fs::{OsFileSystem, SharedFileSystem};
use typepack_plugin::{
  HookBuildEndArgs, PluginContext, PluginDriver, SharedPlugin, SharedPluginDriver,
};
use typepack_plugin_dts::DtsPlugin;
use typepack_plugin_resolve::ResolvePlugin;
use typepack_watcher::{ChangeWatcher, NotifyWatchPrimitive, RebuildCallback, WatchPrimitive};

use crate::{
  scan_stage::{ScanStage, ScanStageOutput},
  types::bundle_output::BundleOutput,
  utils::{normalize_options::normalize_options, resolve_entries::resolve_entries},
};

pub struct Bundler {
  fs: SharedFileSystem,
  options: SharedOptions,
  graph: SharedDependencyGraph,
  plugin_driver: SharedPluginDriver,
}

impl Bundler {
  pub fn new(options: BundlerOptions) -> anyhow::Result<Self> {
    Self::with_file_system(options, Arc::new(OsFileSystem))
  }

  pub fn with_file_system(options: BundlerOptions, fs: SharedFileSystem) -> anyhow::Result<Self> {
    Self::with_plugins(options, fs, vec![])
  }

  /// `plugins` run after the built-in resolve and dts plugins.
  pub fn with_plugins(
    options: BundlerOptions,
    fs: SharedFileSystem,
    plugins: Vec<SharedPlugin>,
  ) -> anyhow::Result<Self> {
    let options = Arc::new(normalize_options(options)?);
    let graph = Arc::new(DependencyGraph::default());

    let mut all_plugins: Vec<SharedPlugin> = vec![
      Arc::new(ResolvePlugin::new(Arc::clone(&graph))),
      Arc::new(DtsPlugin::new(Arc::clone(&graph))),
    ];
    all_plugins.extend(plugins);

    Ok(Self { fs, options, graph, plugin_driver: PluginDriver::new_shared(all_plugins) })
  }

  pub fn options(&self) -> &SharedOptions {
    &self.options
  }

  pub fn graph(&self) -> &SharedDependencyGraph {
    &self.graph
  }

  /// Runs one pass. Entries that do not exist abort it before any hook runs.
  pub async fn build(&mut self) -> BuildResult<BundleOutput> {
    let entries = resolve_entries(&*self.fs, &self.options)?;
    tracing::debug!(entries = entries.len(), "build started");

    let ctx = PluginContext::new(Arc::clone(&self.options), Arc::clone(&self.fs), entries);
    let plugin_driver = Arc::clone(&self.plugin_driver);
    // Hooks and parsing are synchronous and touch the file system.
    tokio::task::spawn_blocking(move || run_build(&ctx, &plugin_driver))
      .await
      .map_err(|err| anyhow::anyhow!("Build task failed: {err}"))?
  }

  /// Builds once, then rebuilds whenever a file of the dependency graph changes, until
  /// `shutdown` resolves. Every result is handed to `on_build`.
  pub async fn watch<F, S>(&mut self, on_build: F, shutdown: S) -> anyhow::Result<()>
  where
    F: FnMut(BuildResult<BundleOutput>),
    S: Future<Output = ()>,
  {
    self.watch_with(Arc::new(NotifyWatchPrimitive::new()?), on_build, shutdown).await
  }

  pub async fn watch_with<F, S>(
    &mut self,
    primitive: Arc<dyn WatchPrimitive>,
    mut on_build: F,
    shutdown: S,
  ) -> anyhow::Result<()>
  where
    F: FnMut(BuildResult<BundleOutput>),
    S: Future<Output = ()>,
  {
    // The watcher asks for a rebuild and waits for it, so it stays busy for the whole pass.
    let (rebuild_tx, mut rebuild_rx) = mpsc::channel::<oneshot::Sender<()>>(1);
    let on_rebuild: RebuildCallback = Arc::new(move || {
      let rebuild_tx = rebuild_tx.clone();
      async move {
        let (done_tx, done_rx) = oneshot::channel();
        if rebuild_tx.send(done_tx).await.is_ok() {
          let _ = done_rx.await;
        }
      }
      .boxed()
    });

    let watcher = ChangeWatcher::new(
      Arc::clone(&self.graph),
      primitive,
      self.options.debounce,
      Some(on_rebuild),
    )?;
    let plugin_driver = Arc::clone(&self.plugin_driver);
    let mut plugins = plugin_driver.plugins().to_vec();
    plugins.push(Arc::new(watcher.clone()));
    self.plugin_driver = PluginDriver::new_shared(plugins);

    on_build(self.build().await);
    tracing::debug!(files = watcher.watched_count(), "watching");

    tokio::pin!(shutdown);
    loop {
      tokio::select! {
        () = &mut shutdown => break,
        Some(done) = rebuild_rx.recv() => {
          on_build(self.build().await);
          let _ = done.send(());
        }
        else => break,
      }
    }

    watcher.close();
    self.plugin_driver = plugin_driver;
    tracing::debug!("watch stopped");
    Ok(())
  }
}

fn run_build(ctx: &PluginContext, plugin_driver: &PluginDriver) -> BuildResult<BundleOutput> {
  let ScanStageOutput { modules, mut errors, warnings } = match plugin_driver.build_start(ctx) {
    Ok(()) => ScanStage::new(ctx, plugin_driver).scan(),
    Err(err) => ScanStageOutput { errors: vec![err], ..Default::default() },
  };

  if let Err(build_end_errors) = plugin_driver.build_end(ctx, &HookBuildEndArgs { errors: &errors })
  {
    errors.extend(build_end_errors);
  }

  if !errors.is_empty() {
    for warning in &warnings {
      tracing::warn!("{warning}");
    }
    return Err(BuildError::from(errors));
  }

  Ok(BundleOutput { modules, assets: ctx.take_emitted_files(), warnings })
}
