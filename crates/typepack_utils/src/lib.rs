pub mod indexmap;
pub mod path_ext;
pub mod pretty_type_name;
pub mod specifier;
