#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use arcstr::ArcStr;
use typepack::{Bundler, BundlerOptions, FileSystem};
use typepack_fs::MemoryFileSystem;

pub fn project(files: &[(&str, &str)]) -> MemoryFileSystem {
  MemoryFileSystem::new(files).unwrap()
}

pub fn options(input: &[&str]) -> BundlerOptions {
  BundlerOptions {
    input: Some(input.iter().map(ToString::to_string).collect()),
    cwd: Some("/project".into()),
    dir: Some("dist".into()),
    ..Default::default()
  }
}

pub fn bundler(fs: &MemoryFileSystem, options: BundlerOptions) -> Bundler {
  Bundler::with_file_system(options, Arc::new(fs.clone())).unwrap()
}

pub fn read(fs: &MemoryFileSystem, path: &str) -> String {
  fs.read_to_string(Path::new(path)).unwrap()
}

pub fn dependencies(bundler: &Bundler, entry: &str) -> Vec<String> {
  bundler.graph().dependencies(entry).unwrap().iter().map(ToString::to_string).collect()
}

pub fn names(modules: &[ArcStr]) -> Vec<String> {
  modules.iter().map(ToString::to_string).collect()
}
