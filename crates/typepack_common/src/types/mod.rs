pub mod dependency_graph;
pub mod output_asset;
