use arcstr::ArcStr;
use oxc::{
  allocator::Allocator,
  codegen::Codegen,
  isolated_declarations::{IsolatedDeclarations, IsolatedDeclarationsOptions},
  parser::Parser,
  span::SourceType,
};
use typepack_error::BuildResult;

use crate::ecma_ast::{
  program_cell::{ProgramCell, ProgramCellDependent, ProgramCellOwner},
  EcmaAst,
};

pub struct EcmaCompiler;

#[derive(Debug)]
pub struct IsolatedDeclarationReturn {
  pub code: String,
  /// Non-fatal diagnostics, e.g. an exported function without an explicit return type.
  pub diagnostics: Vec<String>,
}

impl EcmaCompiler {
  pub fn parse(source: impl Into<ArcStr>, source_type: SourceType) -> BuildResult<EcmaAst> {
    let allocator = oxc::allocator::Allocator::default();
    let owner = ProgramCellOwner { source: source.into(), allocator };
    let program = ProgramCell::try_new(owner, |owner| {
      let ret = Parser::new(&owner.allocator, &owner.source, source_type).parse();
      if ret.errors.is_empty() {
        Ok(ProgramCellDependent { program: ret.program })
      } else {
        let messages = ret.errors.iter().map(ToString::to_string).collect::<Vec<_>>();
        Err(anyhow::anyhow!("{}", messages.join("; ")))
      }
    })?;

    Ok(EcmaAst { program, source_type })
  }

  /// Declaration text for a single module, computed without looking at any other file.
  pub fn isolated_declaration(
    source: &str,
    source_type: SourceType,
  ) -> BuildResult<IsolatedDeclarationReturn> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
      let messages = parsed.errors.iter().map(ToString::to_string).collect::<Vec<_>>();
      Err(anyhow::anyhow!("{}", messages.join("; ")))?;
    }

    let ret = IsolatedDeclarations::new(&allocator, IsolatedDeclarationsOptions { strip_internal: false })
      .build(&parsed.program);
    let code = Codegen::new().build(&ret.program).code;

    Ok(IsolatedDeclarationReturn {
      code,
      diagnostics: ret.errors.iter().map(ToString::to_string).collect(),
    })
  }
}

#[test]
fn test_parse() {
  let ast = EcmaCompiler::parse("const a = 1;\nexport { a };".to_string(), SourceType::ts()).unwrap();
  assert_eq!(ast.program().body.len(), 2);
  assert_eq!(ast.source().as_str(), "const a = 1;\nexport { a };");
  assert!(EcmaCompiler::parse("const = ;", SourceType::ts()).is_err());
}

#[test]
fn test_import_specifiers() {
  let source = r#"
import { a } from "./a";
import type { B } from "./b";
export * from "./c";
export { d } from "pkg";
export const e = 1;
"#;
  let ast = EcmaCompiler::parse(source, SourceType::ts()).unwrap();
  assert_eq!(ast.import_specifiers(), vec!["./a", "./b", "./c", "pkg"]);
}

#[test]
fn test_isolated_declaration() {
  let ret = EcmaCompiler::isolated_declaration(
    "export const foo = \"bar\";\nexport function run(): void {}\nfunction hidden() {}\n",
    SourceType::ts(),
  )
  .unwrap();
  assert!(ret.code.contains("export declare const foo = \"bar\";"), "{}", ret.code);
  assert!(ret.code.contains("export declare function run(): void;"), "{}", ret.code);
  assert!(!ret.code.contains("hidden"), "{}", ret.code);
}

#[test]
fn test_isolated_declaration_syntax_error() {
  assert!(EcmaCompiler::isolated_declaration("export const = ;", SourceType::ts()).is_err());
}
