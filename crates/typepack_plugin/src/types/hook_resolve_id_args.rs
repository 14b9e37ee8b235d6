#[derive(Debug)]
pub struct HookResolveIdArgs<'a> {
  /// Absolute path of the importing module.
  pub importer: &'a str,
  /// The specifier exactly as written in the import statement.
  pub specifier: &'a str,
}
