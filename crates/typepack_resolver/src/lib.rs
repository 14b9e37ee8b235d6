// Source file lookup for relative specifiers. Package specifiers never reach this crate.

mod resolver;

pub use crate::resolver::{
  declaration_extension, has_source_extension, resolve_relative, resolve_source_file, Resolver,
  SOURCE_EXTENSIONS,
};
