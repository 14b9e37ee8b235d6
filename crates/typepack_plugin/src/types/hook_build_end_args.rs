#[derive(Debug)]
pub struct HookBuildEndArgs<'a> {
  /// Errors collected by the host during this pass. Empty for a successful build.
  pub errors: &'a [anyhow::Error],
}

impl HookBuildEndArgs<'_> {
  pub fn is_success(&self) -> bool {
    self.errors.is_empty()
  }
}
