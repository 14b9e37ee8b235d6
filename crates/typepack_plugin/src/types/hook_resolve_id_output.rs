use arcstr::ArcStr;

#[derive(Debug, Clone)]
pub struct HookResolveIdOutput {
  pub id: ArcStr,
  pub external: bool,
}
