pub mod program_cell;

use std::fmt::Debug;

use arcstr::ArcStr;
use oxc::{
  ast::ast::{Program, Statement},
  span::SourceType,
};

use self::program_cell::ProgramCell;

pub struct EcmaAst {
  pub program: ProgramCell,
  pub source_type: SourceType,
}

impl EcmaAst {
  pub fn source(&self) -> &ArcStr {
    &self.program.borrow_owner().source
  }

  pub fn program(&self) -> &Program {
    &self.program.borrow_dependent().program
  }

  /// Module specifiers of every static `import`/`export ... from` statement, in source order.
  ///
  /// Type-only statements are included, they matter for declaration output.
  pub fn import_specifiers(&self) -> Vec<&str> {
    self
      .program()
      .body
      .iter()
      .filter_map(|stmt| match stmt {
        Statement::ImportDeclaration(decl) => Some(decl.source.value.as_str()),
        Statement::ExportAllDeclaration(decl) => Some(decl.source.value.as_str()),
        Statement::ExportNamedDeclaration(decl) => {
          decl.source.as_ref().map(|source| source.value.as_str())
        }
        _ => None,
      })
      .collect()
  }
}

impl Debug for EcmaAst {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Ast").field("source", &self.source()).finish_non_exhaustive()
  }
}
