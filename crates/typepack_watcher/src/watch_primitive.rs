use std::{
  path::{Path, PathBuf},
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError, RwLock,
  },
};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;

/// Called with the watched path whenever it changes.
pub type ChangeCallback = Arc<dyn Fn(PathBuf) + Send + Sync>;

pub trait WatchHandle: Send {
  fn close(self: Box<Self>);
}

/// Attaches a watch to a single file.
pub trait WatchPrimitive: Send + Sync {
  fn watch(&self, path: &Path, on_change: ChangeCallback) -> anyhow::Result<Box<dyn WatchHandle>>;
}

struct Registration {
  id: u64,
  on_change: ChangeCallback,
}

type Registrations = Arc<RwLock<FxHashMap<PathBuf, Registration>>>;

/// One `notify` watcher shared by every file. Events are dispatched to the callback
/// registered for their path.
pub struct NotifyWatchPrimitive {
  watcher: Arc<Mutex<RecommendedWatcher>>,
  registrations: Registrations,
  next_id: AtomicU64,
}

impl NotifyWatchPrimitive {
  pub fn new() -> anyhow::Result<Self> {
    let registrations = Registrations::default();
    let dispatch = Arc::clone(&registrations);
    let watcher = RecommendedWatcher::new(
      move |res: notify::Result<Event>| match res {
        Ok(event)
          if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) =>
        {
          for path in event.paths {
            // Cloned out so the callback runs without the lock.
            let on_change = dispatch
              .read()
              .unwrap_or_else(PoisonError::into_inner)
              .get(&path)
              .map(|registration| Arc::clone(&registration.on_change));
            if let Some(on_change) = on_change {
              on_change(path);
            }
          }
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(paths = ?err.paths, "watch error: {err}"),
      },
      Config::default(),
    )?;
    Ok(Self { watcher: Arc::new(Mutex::new(watcher)), registrations, next_id: AtomicU64::new(0) })
  }

  pub fn watched_count(&self) -> usize {
    self.registrations.read().unwrap_or_else(PoisonError::into_inner).len()
  }
}

impl WatchPrimitive for NotifyWatchPrimitive {
  fn watch(&self, path: &Path, on_change: ChangeCallback) -> anyhow::Result<Box<dyn WatchHandle>> {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    // The registration lock is never held across `notify` calls, they wait on the event thread.
    self
      .registrations
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(path.to_path_buf(), Registration { id, on_change });

    let handle = NotifyWatchHandle {
      path: path.to_path_buf(),
      id,
      watcher: Arc::clone(&self.watcher),
      registrations: Arc::clone(&self.registrations),
    };
    let attached = self
      .watcher
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .watch(path, RecursiveMode::NonRecursive);
    match attached {
      Ok(()) => Ok(Box::new(handle)),
      Err(err) => {
        handle.unregister();
        Err(err.into())
      }
    }
  }
}

struct NotifyWatchHandle {
  path: PathBuf,
  id: u64,
  watcher: Arc<Mutex<RecommendedWatcher>>,
  registrations: Registrations,
}

impl NotifyWatchHandle {
  /// Removes the registration unless a newer watch on the same path replaced it.
  fn unregister(&self) -> bool {
    let mut registrations = self.registrations.write().unwrap_or_else(PoisonError::into_inner);
    if registrations.get(&self.path).is_some_and(|registration| registration.id == self.id) {
      registrations.remove(&self.path);
      true
    } else {
      false
    }
  }
}

impl WatchHandle for NotifyWatchHandle {
  fn close(self: Box<Self>) {
    if !self.unregister() {
      return;
    }
    let detached =
      self.watcher.lock().unwrap_or_else(PoisonError::into_inner).unwatch(&self.path);
    if let Err(err) = detached {
      tracing::debug!(path = %self.path.display(), "cannot unwatch file: {err}");
    }
  }
}
