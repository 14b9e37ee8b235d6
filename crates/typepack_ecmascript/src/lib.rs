mod ecma_ast;
mod ecma_compiler;

pub use crate::{
  ecma_ast::EcmaAst,
  ecma_compiler::{EcmaCompiler, IsolatedDeclarationReturn},
};

pub use oxc::span::SourceType;
