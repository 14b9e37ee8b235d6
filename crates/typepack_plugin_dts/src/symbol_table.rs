use arcstr::ArcStr;
use memchr::memchr_iter;
use oxc::{
  ast::{
    ast::{
      BindingPatternKind, Class, Declaration, ExportDefaultDeclarationKind, Expression,
      ModuleExportName, Statement, TSClassImplements, TSInterfaceHeritage, TSModuleDeclarationName,
      TSTypeName, TSTypeQuery, TSTypeQueryExprName, TSTypeReference,
    },
    visit::walk,
    Visit,
  },
  span::{GetSpan, SourceType},
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use typepack_ecmascript::EcmaCompiler;
use typepack_error::BuildResult;
use typepack_utils::indexmap::{FxIndexMap, FxIndexSet};

/// Zero-based, inclusive line range of one top-level statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSpan {
  /// First line, including the doc comment right above the statement.
  pub start: usize,
  /// First line of the statement itself, where an `export` keyword would be.
  pub statement_start: usize,
  pub end: usize,
}

#[derive(Debug, Default)]
pub struct DeclarationSymbol {
  /// Overloads and merged declarations share one symbol with several spans.
  pub spans: SmallVec<[LineSpan; 1]>,
  /// Other top-level names used in type positions, without the symbol itself.
  pub references: FxIndexSet<ArcStr>,
}

/// Top-level declarations of one module's declaration text.
#[derive(Debug, Default)]
pub struct SymbolTable {
  symbols: FxIndexMap<ArcStr, DeclarationSymbol>,
  file_references: FxHashSet<ArcStr>,
  conservative: bool,
}

impl SymbolTable {
  pub fn parse(text: &str) -> BuildResult<Self> {
    let ast = EcmaCompiler::parse(text, SourceType::d_ts())?;
    let line_starts = std::iter::once(0)
      .chain(memchr_iter(b'\n', text.as_bytes()).map(|offset| offset + 1))
      .collect::<Vec<_>>();
    let line_of = |offset: u32| line_starts.partition_point(|&start| start <= offset as usize) - 1;
    let lines = text.lines().collect::<Vec<_>>();

    let mut table = Self::default();
    let mut next_free_line = 0;

    for stmt in &ast.program().body {
      let span = stmt.span();
      let statement_start = line_of(span.start);
      let end = line_of(span.end.saturating_sub(1).max(span.start));
      let mut start = statement_start;
      while start > next_free_line && lines.get(start - 1).is_some_and(|line| is_comment_line(line))
      {
        start -= 1;
      }
      next_free_line = end + 1;

      let mut collector = ReferenceCollector::default();
      collector.visit_statement(stmt);
      table.file_references.extend(collector.references.iter().cloned());
      table.file_references.extend(exported_locals(stmt));

      for name in declared_names(stmt) {
        let symbol = table.symbols.entry(ArcStr::from(name)).or_default();
        symbol.spans.push(LineSpan { start, statement_start, end });
        symbol
          .references
          .extend(collector.references.iter().filter(|r| r.as_str() != name).cloned());
      }
    }

    Ok(table)
  }

  /// Table of a module whose declaration text could not be parsed. Requests against it
  /// fall back to the whole text.
  pub fn conservative() -> Self {
    Self { conservative: true, ..Self::default() }
  }

  pub fn is_conservative(&self) -> bool {
    self.conservative
  }

  pub fn get(&self, name: &str) -> Option<&DeclarationSymbol> {
    self.symbols.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.symbols.contains_key(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &ArcStr> {
    self.symbols.keys()
  }

  /// Every name the module uses: type references of all declarations, plus names exported
  /// by local `export { .. }` clauses and `export default name`.
  pub fn file_references(&self) -> &FxHashSet<ArcStr> {
    &self.file_references
  }

  /// `seeds` plus every declared name reachable through references, in source order.
  /// Names without a declaration in this module are dropped.
  pub fn closure<'a, I: IntoIterator<Item = &'a str>>(&self, seeds: I) -> Vec<ArcStr> {
    let mut visited = FxHashSet::default();
    let mut stack =
      seeds.into_iter().filter_map(|seed| self.symbols.get_index_of(seed)).collect::<Vec<_>>();
    while let Some(index) = stack.pop() {
      if !visited.insert(index) {
        continue;
      }
      let symbol = &self.symbols[index];
      stack.extend(
        symbol.references.iter().filter_map(|name| self.symbols.get_index_of(name.as_str())),
      );
    }

    let mut ordered = visited.into_iter().collect::<Vec<_>>();
    ordered.sort_by_key(|&index| self.symbols[index].spans.first().map_or(0, |span| span.start));
    ordered
      .into_iter()
      .filter_map(|index| self.symbols.get_index(index).map(|(name, _)| name.clone()))
      .collect()
  }
}

fn is_comment_line(line: &str) -> bool {
  let line = line.trim_start();
  line.starts_with("/*") || line.starts_with('*') || line.starts_with("//")
}

fn declared_names<'s>(stmt: &'s Statement) -> SmallVec<[&'s str; 1]> {
  match stmt {
    Statement::ExportNamedDeclaration(decl) => {
      decl.declaration.as_ref().map(declaration_names).unwrap_or_default()
    }
    // `export default` declarations cannot lose their keyword, they stay with their module.
    Statement::ExportDefaultDeclaration(_) => SmallVec::new(),
    _ => stmt.as_declaration().map(declaration_names).unwrap_or_default(),
  }
}

fn declaration_names<'s>(decl: &'s Declaration) -> SmallVec<[&'s str; 1]> {
  match decl {
    Declaration::VariableDeclaration(var) => var
      .declarations
      .iter()
      .filter_map(|declarator| match &declarator.id.kind {
        BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.as_str()),
        _ => None,
      })
      .collect(),
    Declaration::FunctionDeclaration(func) => func.id.iter().map(|id| id.name.as_str()).collect(),
    Declaration::ClassDeclaration(class) => class.id.iter().map(|id| id.name.as_str()).collect(),
    Declaration::TSTypeAliasDeclaration(alias) => SmallVec::from_elem(alias.id.name.as_str(), 1),
    Declaration::TSInterfaceDeclaration(interface) => {
      SmallVec::from_elem(interface.id.name.as_str(), 1)
    }
    Declaration::TSEnumDeclaration(decl) => SmallVec::from_elem(decl.id.name.as_str(), 1),
    Declaration::TSModuleDeclaration(module) => match &module.id {
      TSModuleDeclarationName::Identifier(ident) => SmallVec::from_elem(ident.name.as_str(), 1),
      TSModuleDeclarationName::StringLiteral(_) => SmallVec::new(),
    },
    _ => SmallVec::new(),
  }
}

/// Names a statement exports without declaring them: `export { a, b as c }`,
/// `export default a` and `export = a`.
fn exported_locals(stmt: &Statement) -> SmallVec<[ArcStr; 2]> {
  match stmt {
    Statement::ExportNamedDeclaration(decl) if decl.source.is_none() => decl
      .specifiers
      .iter()
      .map(|specifier| match &specifier.local {
        ModuleExportName::IdentifierName(ident) => ArcStr::from(ident.name.as_str()),
        ModuleExportName::IdentifierReference(ident) => ArcStr::from(ident.name.as_str()),
        ModuleExportName::StringLiteral(literal) => ArcStr::from(literal.value.as_str()),
      })
      .collect(),
    Statement::ExportDefaultDeclaration(decl) => match &decl.declaration {
      ExportDefaultDeclarationKind::Identifier(ident) => {
        SmallVec::from_elem(ArcStr::from(ident.name.as_str()), 1)
      }
      _ => SmallVec::new(),
    },
    Statement::TSExportAssignment(assignment) => {
      leftmost_expression(&assignment.expression).map(ArcStr::from).into_iter().collect()
    }
    _ => SmallVec::new(),
  }
}

fn leftmost_type_name<'s>(name: &'s TSTypeName) -> &'s str {
  match name {
    TSTypeName::IdentifierReference(ident) => ident.name.as_str(),
    TSTypeName::QualifiedName(qualified) => leftmost_type_name(&qualified.left),
  }
}

fn leftmost_expression<'s>(expr: &'s Expression) -> Option<&'s str> {
  match expr {
    Expression::Identifier(ident) => Some(ident.name.as_str()),
    Expression::StaticMemberExpression(member) => leftmost_expression(&member.object),
    _ => None,
  }
}

/// Collects names used in type positions of one statement.
#[derive(Default)]
struct ReferenceCollector {
  references: FxIndexSet<ArcStr>,
}

impl ReferenceCollector {
  fn add(&mut self, name: &str) {
    if !self.references.contains(name) {
      self.references.insert(ArcStr::from(name));
    }
  }
}

impl<'a> Visit<'a> for ReferenceCollector {
  fn visit_ts_type_reference(&mut self, it: &TSTypeReference<'a>) {
    self.add(leftmost_type_name(&it.type_name));
    walk::walk_ts_type_reference(self, it);
  }

  fn visit_ts_type_query(&mut self, it: &TSTypeQuery<'a>) {
    match &it.expr_name {
      TSTypeQueryExprName::IdentifierReference(ident) => self.add(ident.name.as_str()),
      TSTypeQueryExprName::QualifiedName(qualified) => {
        self.add(leftmost_type_name(&qualified.left));
      }
      TSTypeQueryExprName::TSImportType(_) => {}
    }
    walk::walk_ts_type_query(self, it);
  }

  fn visit_ts_interface_heritage(&mut self, it: &TSInterfaceHeritage<'a>) {
    if let Some(name) = leftmost_expression(&it.expression) {
      self.add(name);
    }
    walk::walk_ts_interface_heritage(self, it);
  }

  fn visit_ts_class_implements(&mut self, it: &TSClassImplements<'a>) {
    self.add(leftmost_type_name(&it.expression));
    walk::walk_ts_class_implements(self, it);
  }

  fn visit_class(&mut self, it: &Class<'a>) {
    if let Some(name) = it.super_class.as_ref().and_then(leftmost_expression) {
      self.add(name);
    }
    walk::walk_class(self, it);
  }
}
