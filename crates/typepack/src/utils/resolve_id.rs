use std::path::Path;

use arcstr::ArcStr;
use typepack_plugin::{HookResolveIdArgs, PluginContext, PluginDriver};
use typepack_resolver::resolve_relative;
use typepack_utils::{path_ext::PathExt, specifier::is_relative_specifier};

pub enum ResolvedImport {
  Module(ArcStr),
  /// Package, builtin or anything a plugin marked as external. Never loaded.
  External,
  /// A relative specifier that matches no file.
  Unresolved,
}

pub fn resolve_id(
  ctx: &PluginContext,
  plugin_driver: &PluginDriver,
  importer: &str,
  specifier: &str,
) -> anyhow::Result<ResolvedImport> {
  if let Some(resolved) =
    plugin_driver.resolve_id(ctx, &HookResolveIdArgs { importer, specifier })?
  {
    return Ok(if resolved.external {
      ResolvedImport::External
    } else {
      ResolvedImport::Module(resolved.id)
    });
  }

  if !is_relative_specifier(specifier) {
    return Ok(ResolvedImport::External);
  }

  Ok(match resolve_relative(ctx.fs(), Path::new(importer), specifier) {
    Some(path) => ResolvedImport::Module(ArcStr::from(path.expect_to_str())),
    None => ResolvedImport::Unresolved,
  })
}
