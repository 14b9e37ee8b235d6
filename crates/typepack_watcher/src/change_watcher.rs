use std::{
  borrow::Cow,
  path::Path,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError, Weak,
  },
  time::Duration,
};

use futures::future::BoxFuture;
use tokio::{runtime::Handle, task::JoinHandle};
use typepack_common::SharedDependencyGraph;
use typepack_plugin::{HookBuildEndArgs, HookNoopReturn, Plugin, PluginContext};

use crate::{ChangeCallback, WatchHandle, WatchPrimitive};

pub type RebuildCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Watches every file of the dependency graph and calls the rebuild callback once changes
/// settle for the debounce window.
///
/// At most one rebuild is in flight. Changes that settle while it runs are dropped, not
/// queued.
#[derive(Clone)]
pub struct ChangeWatcher {
  inner: Arc<WatcherInner>,
}

struct WatcherInner {
  graph: SharedDependencyGraph,
  primitive: Arc<dyn WatchPrimitive>,
  debounce: Duration,
  on_rebuild: Option<RebuildCallback>,
  runtime: Handle,
  handles: Mutex<Vec<Box<dyn WatchHandle>>>,
  timer: Mutex<Option<JoinHandle<()>>>,
  pending: AtomicBool,
  closed: AtomicBool,
}

impl ChangeWatcher {
  /// Must be called from within a tokio runtime, timers and rebuilds are spawned on it.
  pub fn new(
    graph: SharedDependencyGraph,
    primitive: Arc<dyn WatchPrimitive>,
    debounce: Duration,
    on_rebuild: Option<RebuildCallback>,
  ) -> anyhow::Result<Self> {
    let inner = WatcherInner {
      graph,
      primitive,
      debounce,
      on_rebuild,
      runtime: Handle::try_current()?,
      handles: Mutex::default(),
      timer: Mutex::default(),
      pending: AtomicBool::new(false),
      closed: AtomicBool::new(false),
    };
    Ok(Self { inner: Arc::new(inner) })
  }

  /// Replaces every watch with one per file currently in the graph.
  pub fn refresh(&self) {
    self.inner.refresh();
  }

  /// Detaches every watch and cancels a scheduled rebuild. A rebuild already running is left
  /// to finish. The watcher ignores everything afterwards.
  pub fn close(&self) {
    self.inner.closed.store(true, Ordering::SeqCst);
    for handle in self.inner.handles.lock().unwrap_or_else(PoisonError::into_inner).drain(..) {
      handle.close();
    }
    if let Some(timer) = self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner).take() {
      timer.abort();
    }
  }

  pub fn watched_count(&self) -> usize {
    self.inner.handles.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_rebuilding(&self) -> bool {
    self.inner.pending.load(Ordering::SeqCst)
  }

  pub fn is_closed(&self) -> bool {
    self.inner.closed.load(Ordering::SeqCst)
  }

  /// Feeds a change notification as if a watch reported it.
  pub fn notify_change(&self, path: &Path) {
    self.inner.handle_change(path);
  }
}

impl WatcherInner {
  fn refresh(self: &Arc<Self>) {
    if self.closed.load(Ordering::SeqCst) {
      return;
    }
    let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
    for handle in handles.drain(..) {
      handle.close();
    }

    for file in self.graph.files() {
      let weak: Weak<Self> = Arc::downgrade(self);
      let on_change: ChangeCallback = Arc::new(move |path| {
        if let Some(inner) = weak.upgrade() {
          inner.handle_change(&path);
        }
      });
      match self.primitive.watch(Path::new(file.as_str()), on_change) {
        Ok(handle) => handles.push(handle),
        Err(err) => tracing::warn!(path = %file, "cannot watch file: {err}"),
      }
    }
    tracing::debug!(files = handles.len(), "watching");
  }

  fn handle_change(self: &Arc<Self>, path: &Path) {
    if self.closed.load(Ordering::SeqCst) {
      return;
    }
    // Membership is checked now, not when the watch was attached.
    if !path.to_str().is_some_and(|path| self.graph.contains(path)) {
      tracing::trace!(path = %path.display(), "change outside the dependency graph ignored");
      return;
    }

    tracing::trace!(path = %path.display(), "change detected");
    let inner = Arc::clone(self);
    let timer = self.runtime.spawn(async move {
      tokio::time::sleep(inner.debounce).await;
      inner.fire();
    });
    if let Some(previous) = self.timer.lock().unwrap_or_else(PoisonError::into_inner).replace(timer) {
      previous.abort();
    }
  }

  fn fire(self: &Arc<Self>) {
    let Some(on_rebuild) = self.on_rebuild.clone() else {
      return;
    };
    if self.pending.swap(true, Ordering::SeqCst) {
      tracing::debug!("a rebuild is already running, change dropped");
      return;
    }
    // Detached from the timer, so a later change cannot abort a running rebuild.
    let inner = Arc::clone(self);
    self.runtime.spawn(async move {
      on_rebuild().await;
      inner.pending.store(false, Ordering::SeqCst);
    });
  }
}

impl Plugin for ChangeWatcher {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("typepack:watch")
  }

  fn build_end(&self, _ctx: &PluginContext, args: &HookBuildEndArgs) -> HookNoopReturn {
    if args.is_success() {
      self.refresh();
    } else {
      tracing::debug!("build failed, previous watches are kept");
    }
    Ok(())
  }
}
