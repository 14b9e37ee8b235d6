pub mod hook_build_end_args;
pub mod hook_load_args;
pub mod hook_load_output;
pub mod hook_resolve_id_args;
pub mod hook_resolve_id_output;
pub mod hook_returns;
