use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use arcstr::ArcStr;
use dashmap::DashMap;
use itertools::Itertools;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::smallvec;
use sugar_path::SugarPath;
use typepack_fs::FileSystem;
use typepack_resolver::resolve_relative;
use typepack_utils::path_ext::PathExt;

use crate::{
  module_declaration::{set_export_keyword, ModuleDeclaration},
  statement::{Member, ModuleMembers, ModuleStatement, StatementKind},
};

/// Captured declarations of the current pass, keyed by absolute module path.
pub type DeclarationCache = DashMap<ArcStr, Arc<ModuleDeclaration>, FxBuildHasher>;

pub const MISSING_DECLARATION_MARKER: &str = "// [typepack] missing declaration:";

#[derive(Debug)]
struct Line {
  text: String,
  /// Module the line was copied from. Relative specifiers on the line resolve against it.
  origin: ArcStr,
  /// Synthesized statement that skips the unused-import filter.
  forced: bool,
}

impl Line {
  fn new(text: impl Into<String>, origin: &ArcStr) -> Self {
    Self { text: text.into(), origin: origin.clone(), forced: false }
  }
}

/// Bookkeeping for one entrypoint. Keys are module paths.
#[derive(Default)]
struct EntryState {
  emitted: FxHashMap<ArcStr, FxHashSet<ArcStr>>,
  exported: FxHashMap<ArcStr, FxHashSet<ArcStr>>,
  /// Names used by everything emitted from a module so far.
  references: FxHashMap<ArcStr, FxHashSet<ArcStr>>,
  emitted_spans: FxHashSet<(ArcStr, usize)>,
  fully_inlined: FxHashSet<ArcStr>,
  forwarded: FxHashSet<(ArcStr, ArcStr, StatementKind)>,
  missing: FxHashSet<ArcStr>,
}

enum ForwardSource {
  Member(ArcStr),
  Namespace,
}

/// Merges the captured declarations reachable from an entrypoint into one text.
///
/// Relative import/export-from lines are replaced by the declarations they request, plus
/// whatever those declarations reference. The replacement is scanned again, so nested
/// dependencies are inlined too. Non-relative statements are kept verbatim.
pub struct Synthesizer<'a> {
  fs: &'a dyn FileSystem,
  declarations: &'a DeclarationCache,
  root: &'a Path,
}

impl<'a> Synthesizer<'a> {
  pub fn new(fs: &'a dyn FileSystem, declarations: &'a DeclarationCache, root: &'a Path) -> Self {
    Self { fs, declarations, root }
  }

  pub fn synthesize(&self, entry: &ArcStr) -> String {
    let mut state = EntryState::default();
    let mut lines = match self.declaration(entry) {
      Some(decl) => {
        state.emitted.insert(entry.clone(), decl.symbols.names().cloned().collect());
        state.exported.insert(entry.clone(), decl.exported_names());
        state.references.insert(entry.clone(), decl.symbols.file_references().clone());
        state.fully_inlined.insert(entry.clone());
        decl.lines.iter().map(|text| Line::new(text.as_str(), entry)).collect()
      }
      None => self.missing(&mut state, entry.clone()),
    };

    let mut index = 0;
    while index < lines.len() {
      let Some(stmt) = ModuleStatement::parse(&lines[index].text).filter(ModuleStatement::is_relative)
      else {
        index += 1;
        continue;
      };
      let line = lines.remove(index);
      let block = self.inline(&mut state, &line, &stmt);
      lines.splice(index..index, block);
    }

    finish(lines)
  }

  fn declaration(&self, path: &str) -> Option<Arc<ModuleDeclaration>> {
    self.declarations.get(path).map(|decl| Arc::clone(decl.value()))
  }

  fn relative(&self, path: &str) -> String {
    Path::new(path).relative_slash(self.root)
  }

  fn header(&self, module: &ArcStr) -> Line {
    Line::new(format!("// {}", self.relative(module)), module)
  }

  fn missing(&self, state: &mut EntryState, module: ArcStr) -> Vec<Line> {
    if !state.missing.insert(module.clone()) {
      return vec![];
    }
    tracing::warn!(module = %module, "no declaration was captured, a placeholder is emitted");
    vec![Line::new(format!("{MISSING_DECLARATION_MARKER} {}", self.relative(&module)), &module)]
  }

  fn inline(&self, state: &mut EntryState, line: &Line, stmt: &ModuleStatement) -> Vec<Line> {
    let importer = Path::new(line.origin.as_str());
    let Some(target) = resolve_relative(self.fs, importer, &stmt.specifier) else {
      let base = importer.parent().unwrap_or(importer).join(stmt.specifier.as_str()).normalize();
      return self.missing(state, ArcStr::from(base.to_string_lossy().as_ref()));
    };
    let target = ArcStr::from(target.to_string_lossy().as_ref());
    let Some(decl) = self.declaration(&target) else {
      return self.missing(state, target);
    };

    match &stmt.members {
      ModuleMembers::All { .. } => self.inline_all(state, &decl),
      ModuleMembers::Named(_) if decl.symbols.is_conservative() => self.inline_all(state, &decl),
      ModuleMembers::Named(members) => {
        let requested = if stmt.kind == StatementKind::Import && !line.forced {
          let used = state.references.get(&line.origin);
          members
            .iter()
            .filter(|member| used.is_some_and(|used| used.contains(member.binding())))
            .collect::<Vec<_>>()
        } else {
          members.iter().collect::<Vec<_>>()
        };
        self.inline_named(state, stmt, &requested, &decl)
      }
    }
  }

  /// Copies the whole declaration once. Spans emitted earlier are skipped.
  fn inline_all(&self, state: &mut EntryState, decl: &ModuleDeclaration) -> Vec<Line> {
    let module = &decl.path;
    if !state.fully_inlined.insert(module.clone()) || decl.is_empty() {
      return vec![];
    }

    let mut skipped = FxHashSet::default();
    for name in decl.symbols.names() {
      for span in decl.symbols.get(name).into_iter().flat_map(|symbol| &symbol.spans) {
        if !state.emitted_spans.insert((module.clone(), span.start)) {
          skipped.extend(span.start..=span.end);
        }
      }
    }

    state.emitted.entry(module.clone()).or_default().extend(decl.symbols.names().cloned());
    state.exported.entry(module.clone()).or_default().extend(decl.exported_names());
    state
      .references
      .entry(module.clone())
      .or_default()
      .extend(decl.symbols.file_references().iter().cloned());

    std::iter::once(self.header(module))
      .chain(
        decl
          .lines
          .iter()
          .enumerate()
          .filter(|(index, _)| !skipped.contains(index))
          .map(|(_, text)| Line::new(text.as_str(), module)),
      )
      .collect()
  }

  fn inline_named(
    &self,
    state: &mut EntryState,
    stmt: &ModuleStatement,
    requested: &[&Member],
    decl: &ModuleDeclaration,
  ) -> Vec<Line> {
    let module = &decl.path;
    let (local, forwards): (Vec<&Member>, Vec<&Member>) =
      requested.iter().copied().partition(|member| decl.symbols.contains(&member.name));

    // Only a re-export under the declared name keeps the `export` keyword.
    let keyword_exports = local
      .iter()
      .filter(|member| stmt.is_export() && member.binding() == &member.name)
      .map(|member| member.name.clone())
      .collect::<FxHashSet<_>>();

    let mut declarations = vec![];
    let mut block_references = FxHashSet::default();
    for name in decl.symbols.closure(local.iter().map(|member| member.name.as_str())) {
      if !state.emitted.entry(module.clone()).or_default().insert(name.clone()) {
        continue;
      }
      let Some(symbol) = decl.symbols.get(&name) else { continue };
      block_references.extend(symbol.references.iter().cloned());
      let exported = keyword_exports.contains(&name);
      if exported {
        state.exported.entry(module.clone()).or_default().insert(name.clone());
      }
      for span in &symbol.spans {
        if !state.emitted_spans.insert((module.clone(), span.start)) {
          continue;
        }
        for index in span.start..=span.end {
          let Some(text) = decl.lines.get(index) else { break };
          let text =
            if index == span.statement_start { set_export_keyword(text, exported) } else { text.clone() };
          declarations.push(Line::new(text, module));
        }
      }
    }
    state.references.entry(module.clone()).or_default().extend(block_references.iter().cloned());

    let mut block = vec![];
    if !declarations.is_empty() {
      block.push(self.header(module));
      for (index, import) in decl.imports() {
        if import.is_relative() || is_referenced(import, &block_references) {
          block.push(Line::new(decl.lines[*index].as_str(), module));
        }
      }
      block.extend(declarations);
    }

    for member in &local {
      let binding = member.binding();
      let text = match stmt.kind {
        StatementKind::Export if binding != &member.name => {
          format!("export {{ {} as {binding} }};", member.name)
        }
        StatementKind::Export => {
          if !state.exported.entry(module.clone()).or_default().insert(member.name.clone()) {
            continue;
          }
          format!("export {{ {binding} }};")
        }
        StatementKind::Import if binding != &member.name => format!("import {binding} = {};", member.name),
        StatementKind::Import => continue,
      };
      block.push(Line::new(text, module));
    }

    block.extend(self.forward(state, stmt, &forwards, decl));
    block
  }

  /// Statements that fetch members `decl` does not declare itself from wherever `decl`
  /// gets them.
  fn forward(
    &self,
    state: &mut EntryState,
    stmt: &ModuleStatement,
    members: &[&Member],
    decl: &ModuleDeclaration,
  ) -> Vec<Line> {
    let mut lines = vec![];
    for member in members {
      if !state.forwarded.insert((decl.path.clone(), member.name.clone(), stmt.kind)) {
        continue;
      }
      let Some((specifier, source)) = self.find_source(decl, &member.name) else {
        tracing::warn!(module = %decl.path, name = %member.name, "declaration not found");
        continue;
      };
      let members = match source {
        ForwardSource::Member(name) => ModuleMembers::Named(smallvec![Member {
          alias: (member.binding() != &name).then(|| member.binding().clone()),
          name,
          type_only: member.type_only,
        }]),
        ForwardSource::Namespace => {
          ModuleMembers::All { namespace: Some(member.binding().clone()) }
        }
      };
      let forced = ModuleStatement { kind: stmt.kind, type_only: stmt.type_only, specifier, members };
      lines.push(Line { text: forced.render(), origin: decl.path.clone(), forced: true });
    }
    lines
  }

  /// Where `decl` takes `name` from: a re-export, then an import, then an `export *` whose
  /// module declares it.
  fn find_source(&self, decl: &ModuleDeclaration, name: &str) -> Option<(ArcStr, ForwardSource)> {
    let bound = |stmt: &ModuleStatement| match &stmt.members {
      ModuleMembers::Named(members) => members
        .iter()
        .find(|member| member.binding() == name)
        .map(|member| ForwardSource::Member(member.name.clone())),
      ModuleMembers::All { namespace: Some(namespace) } if namespace == name => {
        Some(ForwardSource::Namespace)
      }
      ModuleMembers::All { .. } => None,
    };

    let direct = decl
      .exports()
      .chain(decl.imports())
      .find_map(|(_, stmt)| bound(stmt).map(|source| (stmt.specifier.clone(), source)));
    if direct.is_some() {
      return direct;
    }

    decl.exports().find_map(|(_, stmt)| {
      if stmt.members != (ModuleMembers::All { namespace: None }) {
        return None;
      }
      let path = resolve_relative(self.fs, Path::new(decl.path.as_str()), &stmt.specifier)?;
      let star = self.declaration(&path.to_string_lossy())?;
      let provides = star.symbols.contains(name)
        || star.exports().any(|(_, inner)| match &inner.members {
          ModuleMembers::Named(members) => members.iter().any(|member| member.binding() == name),
          ModuleMembers::All { namespace } => namespace.as_deref() == Some(name),
        });
      provides.then(|| (stmt.specifier.clone(), ForwardSource::Member(ArcStr::from(name))))
    })
  }
}

fn is_referenced(stmt: &ModuleStatement, references: &FxHashSet<ArcStr>) -> bool {
  match &stmt.members {
    ModuleMembers::All { namespace } => namespace.as_ref().is_some_and(|ns| references.contains(ns)),
    ModuleMembers::Named(members) => members.iter().any(|member| references.contains(member.binding())),
  }
}

/// Single-line import/export statements, the only lines that may repeat after inlining.
fn is_statement_line(text: &str) -> bool {
  ["import ", "export {", "export *", "export type {"].iter().any(|prefix| text.starts_with(prefix))
    && text.trim_end().ends_with(';')
}

fn finish(lines: Vec<Line>) -> String {
  let mut seen = FxHashSet::default();
  let text = lines
    .into_iter()
    .filter(|line| !is_statement_line(&line.text) || seen.insert(line.text.clone()))
    .map(|line| line.text)
    .join("\n");
  let text = text.trim();
  if text.is_empty() || text == "export {};" {
    String::new()
  } else {
    format!("{text}\n")
  }
}

/// `<dir>/<entry relative to root>` with the declaration extension.
pub fn output_path(dir: &Path, root: &Path, entry: &Path) -> PathBuf {
  let relative = entry.relative(root);
  let stem = relative.file_name().map_or_else(String::new, |name| {
    let name = name.to_string_lossy();
    match name.rfind('.') {
      Some(dot) if dot > 0 => name[..dot].to_string(),
      _ => name.into_owned(),
    }
  });
  let file_name = format!("{stem}{}", typepack_resolver::declaration_extension(entry));
  dir.join(relative.with_file_name(file_name)).normalize()
}
