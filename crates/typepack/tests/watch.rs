mod common;

use std::{
  path::{Path, PathBuf},
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
  time::Duration,
};

use common::{bundler, options, project, read};
use typepack::{BundlerOptions, ChangeCallback, WatchHandle, WatchPrimitive};

type Watches = Arc<Mutex<Vec<(PathBuf, ChangeCallback)>>>;

#[derive(Default)]
struct ManualPrimitive {
  watches: Watches,
}

struct ManualHandle {
  path: PathBuf,
  watches: Watches,
}

impl WatchHandle for ManualHandle {
  fn close(self: Box<Self>) {
    self.watches.lock().unwrap().retain(|(path, _)| path != &self.path);
  }
}

impl WatchPrimitive for ManualPrimitive {
  fn watch(&self, path: &Path, on_change: ChangeCallback) -> anyhow::Result<Box<dyn WatchHandle>> {
    self.watches.lock().unwrap().push((path.to_path_buf(), on_change));
    Ok(Box::new(ManualHandle { path: path.to_path_buf(), watches: Arc::clone(&self.watches) }))
  }
}

fn watched(watches: &Watches) -> Vec<String> {
  let mut paths = watches
    .lock()
    .unwrap()
    .iter()
    .map(|(path, _)| path.to_string_lossy().to_string())
    .collect::<Vec<_>>();
  paths.sort();
  paths
}

fn touch(watches: &Watches, path: &str) {
  let callbacks = watches
    .lock()
    .unwrap()
    .iter()
    .filter(|(watched, _)| watched == Path::new(path))
    .map(|(watched, callback)| (watched.clone(), Arc::clone(callback)))
    .collect::<Vec<_>>();
  for (watched, callback) in callbacks {
    callback(watched);
  }
}

async fn wait_for(builds: &AtomicUsize, count: usize) {
  for _ in 0..300 {
    if builds.load(Ordering::SeqCst) >= count {
      return;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  panic!("expected {count} builds, saw {}", builds.load(Ordering::SeqCst));
}

#[tokio::test]
async fn changes_rebuild_and_rewatch_until_shutdown() {
  let fs = project(&[
    ("/project/src/index.ts", "export { a } from \"./a\";\n"),
    ("/project/src/a.ts", "export const a = 1;\n"),
    ("/project/src/b.ts", "export const b = 2;\n"),
  ]);
  let mut bundler =
    bundler(&fs, BundlerOptions { debounce: Some(20), ..options(&["src/index.ts"]) });

  let primitive = ManualPrimitive::default();
  let watches = Arc::clone(&primitive.watches);
  let builds = Arc::new(AtomicUsize::new(0));
  let failures = Arc::new(AtomicUsize::new(0));
  let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

  let on_build = {
    let builds = Arc::clone(&builds);
    let failures = Arc::clone(&failures);
    move |result: typepack::BuildResult<typepack::BundleOutput>| {
      if result.is_err() {
        failures.fetch_add(1, Ordering::SeqCst);
      }
      builds.fetch_add(1, Ordering::SeqCst);
    }
  };

  let driver = async {
    wait_for(&builds, 1).await;
    assert_eq!(watched(&watches), vec!["/project/src/a.ts", "/project/src/index.ts"]);

    // Files outside the graph are never watched, so only graph members can trigger.
    fs.add_file(Path::new("/project/src/index.ts"), "export { b } from \"./b\";\n").unwrap();
    touch(&watches, "/project/src/index.ts");
    wait_for(&builds, 2).await;
    assert_eq!(watched(&watches), vec!["/project/src/b.ts", "/project/src/index.ts"]);
    assert!(read(&fs, "/project/dist/index.d.ts").contains("export declare const b = 2;"));

    // A broken module fails the pass and the previous watches stay.
    fs.add_file(Path::new("/project/src/b.ts"), "export const b = ;\n").unwrap();
    touch(&watches, "/project/src/b.ts");
    wait_for(&builds, 3).await;
    assert_eq!(watched(&watches), vec!["/project/src/b.ts", "/project/src/index.ts"]);

    shutdown_tx.send(()).unwrap();
  };

  let shutdown = async {
    let _ = shutdown_rx.await;
  };
  let (result, ()) =
    tokio::join!(bundler.watch_with(Arc::new(primitive), on_build, shutdown), driver);
  result.unwrap();

  assert_eq!(builds.load(Ordering::SeqCst), 3);
  assert_eq!(failures.load(Ordering::SeqCst), 1);
  assert!(watched(&watches).is_empty());
}
