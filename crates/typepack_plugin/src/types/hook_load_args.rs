#[derive(Debug)]
pub struct HookLoadArgs<'a> {
  /// Absolute path of the module being loaded.
  pub id: &'a str,
}
