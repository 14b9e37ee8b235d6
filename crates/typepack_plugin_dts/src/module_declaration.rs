use std::borrow::Cow;

use arcstr::ArcStr;
use itertools::Itertools;
use oxc::{
  ast::ast::{Declaration, Statement, VariableDeclaration},
  span::{GetSpan, SourceType},
};
use rustc_hash::FxHashSet;
use typepack_ecmascript::EcmaCompiler;

use crate::{
  statement::{ModuleStatement, StatementKind},
  symbol_table::SymbolTable,
};

/// Isolated declaration of one module, split for line-level inlining.
#[derive(Debug)]
pub struct ModuleDeclaration {
  pub path: ArcStr,
  pub lines: Vec<String>,
  pub symbols: SymbolTable,
  /// Import/export-from statements with the index of the line they sit on.
  pub statements: Vec<(usize, ModuleStatement)>,
}

impl ModuleDeclaration {
  /// Never fails: text the symbol table cannot parse is kept and inlined as a whole.
  pub fn new(path: ArcStr, text: &str) -> Self {
    let text = split_declarators(text);
    let text = text.as_ref();
    let symbols = SymbolTable::parse(text).unwrap_or_else(|err| {
      tracing::warn!(path = %path, "cannot parse declaration, it will be inlined as a whole: {err}");
      SymbolTable::conservative()
    });
    let lines = text.lines().map(ToString::to_string).collect::<Vec<_>>();
    let statements = lines
      .iter()
      .enumerate()
      .filter_map(|(index, line)| ModuleStatement::parse(line).map(|stmt| (index, stmt)))
      .collect();
    Self { path, lines, symbols, statements }
  }

  /// Names whose declaration carries an `export` keyword.
  pub fn exported_names(&self) -> FxHashSet<ArcStr> {
    self
      .symbols
      .names()
      .filter(|name| self.is_exported(name))
      .cloned()
      .collect()
  }

  pub fn is_exported(&self, name: &str) -> bool {
    self.symbols.get(name).is_some_and(|symbol| {
      symbol
        .spans
        .iter()
        .any(|span| self.lines.get(span.statement_start).is_some_and(|line| has_export_keyword(line)))
    })
  }

  pub fn imports(&self) -> impl Iterator<Item = &(usize, ModuleStatement)> {
    self.statements.iter().filter(|(_, stmt)| stmt.kind == StatementKind::Import)
  }

  pub fn exports(&self) -> impl Iterator<Item = &(usize, ModuleStatement)> {
    self.statements.iter().filter(|(_, stmt)| stmt.kind == StatementKind::Export)
  }

  pub fn is_empty(&self) -> bool {
    self.lines.iter().all(|line| line.trim().is_empty())
  }
}

/// Rewrites `declare const a: A, b: B;` as one statement per declarator, so every variable
/// gets lines of its own and can be inlined without its siblings.
fn split_declarators(text: &str) -> Cow<'_, str> {
  let Ok(ast) = EcmaCompiler::parse(text, SourceType::d_ts()) else {
    return Cow::Borrowed(text);
  };

  let mut replacements = vec![];
  for stmt in &ast.program().body {
    let Some(var) = variable_declaration(stmt).filter(|var| var.declarations.len() > 1) else {
      continue;
    };
    let span = stmt.span();
    let start =
      text[..span.start as usize].strip_suffix("declare ").map_or(span.start as usize, str::len);
    let prefix = &text[start..var.declarations[0].span.start as usize];
    let split = var
      .declarations
      .iter()
      .map(|declarator| {
        format!("{prefix}{};", &text[declarator.span.start as usize..declarator.span.end as usize])
      })
      .join("\n");
    replacements.push((start..span.end as usize, split));
  }
  if replacements.is_empty() {
    return Cow::Borrowed(text);
  }

  let mut output = String::with_capacity(text.len());
  let mut last = 0;
  for (range, split) in replacements {
    output.push_str(&text[last..range.start]);
    output.push_str(&split);
    last = range.end;
  }
  output.push_str(&text[last..]);
  Cow::Owned(output)
}

fn variable_declaration<'s, 'a>(stmt: &'s Statement<'a>) -> Option<&'s VariableDeclaration<'a>> {
  match stmt {
    Statement::VariableDeclaration(var) => Some(var),
    Statement::ExportNamedDeclaration(decl) => match &decl.declaration {
      Some(Declaration::VariableDeclaration(var)) => Some(var),
      _ => None,
    },
    _ => None,
  }
}

pub fn has_export_keyword(line: &str) -> bool {
  line.trim_start().strip_prefix("export").is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// Adds or removes the leading `export` of a declaration's first line.
pub fn set_export_keyword(line: &str, exported: bool) -> String {
  let indent = &line[..line.len() - line.trim_start().len()];
  let body = line.trim_start();
  match (exported, has_export_keyword(body)) {
    (true, false) => format!("{indent}export {body}"),
    (false, true) => format!("{indent}{}", body["export".len()..].trim_start()),
    _ => line.to_string(),
  }
}
