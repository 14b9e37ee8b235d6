use std::{
  fmt::{self, Debug},
  io::{self, Write},
  path::Path,
};

use vfs::{MemoryFS, VfsPath};

use crate::FileSystem;

/// In-memory file system used by tests. Absolute paths are mapped onto the root of a
/// [`MemoryFS`].
#[derive(Clone)]
pub struct MemoryFileSystem {
  root: VfsPath,
}

impl Default for MemoryFileSystem {
  fn default() -> Self {
    Self { root: VfsPath::new(MemoryFS::new()) }
  }
}

impl Debug for MemoryFileSystem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoryFileSystem").finish_non_exhaustive()
  }
}

impl MemoryFileSystem {
  pub fn new(files: &[(&str, &str)]) -> io::Result<Self> {
    let fs = Self::default();
    for (path, content) in files {
      fs.add_file(Path::new(path), content)?;
    }
    Ok(fs)
  }

  pub fn add_file(&self, path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
      self.create_dir_all(parent)?;
    }
    self.write(path, content.as_bytes())
  }

  fn resolve(&self, path: &Path) -> io::Result<VfsPath> {
    let path = path.to_string_lossy().replace('\\', "/");
    let relative = path.trim_matches('/');
    if relative.is_empty() {
      return Ok(self.root.clone());
    }
    self.root.join(relative).map_err(io::Error::other)
  }
}

impl FileSystem for MemoryFileSystem {
  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    let file = self.resolve(path)?;
    if !file.is_file().unwrap_or(false) {
      return Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
      ));
    }
    file.read_to_string().map_err(io::Error::other)
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = self.resolve(path)?.create_file().map_err(io::Error::other)?;
    file.write_all(content)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    self.resolve(path)?.create_dir_all().map_err(io::Error::other)
  }

  fn exists(&self, path: &Path) -> bool {
    self.resolve(path).is_ok_and(|path| path.exists().unwrap_or(false))
  }

  fn is_file(&self, path: &Path) -> bool {
    self.resolve(path).is_ok_and(|path| path.is_file().unwrap_or(false))
  }

  fn is_dir(&self, path: &Path) -> bool {
    self.resolve(path).is_ok_and(|path| path.is_dir().unwrap_or(false))
  }
}

#[test]
fn test_memory_file_system() {
  let fs = MemoryFileSystem::new(&[("/project/src/index.ts", "export {};")]).unwrap();
  assert!(fs.is_file(Path::new("/project/src/index.ts")));
  assert!(fs.is_dir(Path::new("/project/src")));
  assert!(!fs.exists(Path::new("/project/src/missing.ts")));
  assert_eq!(fs.read_to_string(Path::new("/project/src/index.ts")).unwrap(), "export {};");
  assert!(fs.read_to_string(Path::new("/project/src")).is_err());
}
