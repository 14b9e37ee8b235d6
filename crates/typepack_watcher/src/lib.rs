mod change_watcher;
mod watch_primitive;

pub use crate::{
  change_watcher::{ChangeWatcher, RebuildCallback},
  watch_primitive::{ChangeCallback, NotifyWatchPrimitive, WatchHandle, WatchPrimitive},
};
