pub mod normalize_options;
pub mod resolve_entries;
pub mod resolve_id;
