mod bundler_options;
mod types;

pub use bundler_options::{
  normalized_bundler_options::NormalizedBundlerOptions, BundlerOptions, DEFAULT_DEBOUNCE_MS,
};

pub use crate::types::{
  dependency_graph::{DependencyGraph, SharedDependencyGraph, UnownedImporter},
  output_asset::OutputAsset,
};

pub type SharedOptions = std::sync::Arc<NormalizedBundlerOptions>;
