use arcstr::ArcStr;
use typepack_common::OutputAsset;

#[derive(Debug, Default)]
pub struct BundleOutput {
  /// Every module loaded during the pass, in load order.
  pub modules: Vec<ArcStr>,
  pub assets: Vec<OutputAsset>,
  pub warnings: Vec<anyhow::Error>,
}
