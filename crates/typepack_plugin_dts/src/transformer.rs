use std::path::Path;

use typepack_ecmascript::{EcmaCompiler, SourceType};

/// Produces the declaration text of a single module, without looking at any other file.
pub trait DeclarationTransformer: Send + Sync {
  fn transform(&self, path: &Path, source: &str) -> anyhow::Result<String>;
}

/// oxc's isolated declaration emitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct IsolatedDeclarationTransformer;

impl DeclarationTransformer for IsolatedDeclarationTransformer {
  fn transform(&self, path: &Path, source: &str) -> anyhow::Result<String> {
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts());
    if source_type.is_typescript_definition() {
      return Ok(source.to_string());
    }

    let ret = EcmaCompiler::isolated_declaration(source, source_type)
      .map_err(|err| anyhow::anyhow!("{}: {err}", path.display()))?;
    for diagnostic in &ret.diagnostics {
      tracing::warn!(path = %path.display(), "{diagnostic}");
    }
    Ok(ret.code)
  }
}
