use std::{fmt::Write as _, sync::LazyLock};

use arcstr::ArcStr;
use regex::Regex;
use smallvec::SmallVec;
use typepack_utils::specifier::is_relative_specifier;

// Declaration output prints every import/export-from statement on a single line.
static STATEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r#"^\s*(?P<keyword>import|export)\s+(?:(?P<type_only>type)\s+)?(?:(?P<clause>.+?)\s+from\s+)?["'](?P<specifier>[^"']+)["']\s*(?:(?:with|assert)\s*\{[^}]*\}\s*)?;?\s*$"#,
  )
  .unwrap()
});

static MEMBER_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+as\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
  Import,
  Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
  /// Name in the module the statement points at.
  pub name: ArcStr,
  pub alias: Option<ArcStr>,
  pub type_only: bool,
}

impl Member {
  pub fn new(name: impl Into<ArcStr>) -> Self {
    Self { name: name.into(), alias: None, type_only: false }
  }

  /// Binding the statement introduces: the local name of an import, the exported name of a
  /// re-export.
  pub fn binding(&self) -> &ArcStr {
    self.alias.as_ref().unwrap_or(&self.name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleMembers {
  /// `*` or `* as namespace`.
  All { namespace: Option<ArcStr> },
  /// A brace list, a default binding, or nothing for `import "./x"`.
  Named(SmallVec<[Member; 4]>),
}

/// One `import .. from` or `export .. from` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatement {
  pub kind: StatementKind,
  pub type_only: bool,
  pub specifier: ArcStr,
  pub members: ModuleMembers,
}

impl ModuleStatement {
  pub fn parse(line: &str) -> Option<Self> {
    let captures = STATEMENT_RE.captures(line)?;
    let kind = match &captures["keyword"] {
      "import" => StatementKind::Import,
      _ => StatementKind::Export,
    };
    let members = match captures.name("clause") {
      Some(clause) => parse_clause(clause.as_str())?,
      None if kind == StatementKind::Import => ModuleMembers::Named(SmallVec::new()),
      None => return None,
    };
    Some(Self {
      kind,
      type_only: captures.name("type_only").is_some(),
      specifier: ArcStr::from(&captures["specifier"]),
      members,
    })
  }

  pub fn is_relative(&self) -> bool {
    is_relative_specifier(&self.specifier)
  }

  pub fn is_export(&self) -> bool {
    self.kind == StatementKind::Export
  }

  pub fn render(&self) -> String {
    let mut out = String::from(match self.kind {
      StatementKind::Import => "import ",
      StatementKind::Export => "export ",
    });
    if self.type_only {
      out.push_str("type ");
    }
    match &self.members {
      ModuleMembers::All { namespace: None } => out.push_str("* from "),
      ModuleMembers::All { namespace: Some(namespace) } => {
        let _ = write!(out, "* as {namespace} from ");
      }
      ModuleMembers::Named(members) if members.is_empty() && self.kind == StatementKind::Import => {}
      ModuleMembers::Named(members) => {
        out.push('{');
        for (i, member) in members.iter().enumerate() {
          out.push_str(if i == 0 { " " } else { ", " });
          if member.type_only {
            out.push_str("type ");
          }
          out.push_str(&member.name);
          if let Some(alias) = &member.alias {
            let _ = write!(out, " as {alias}");
          }
        }
        out.push_str(if members.is_empty() { "} from " } else { " } from " });
      }
    }
    let _ = write!(out, "\"{}\";", self.specifier);
    out
  }
}

fn parse_clause(clause: &str) -> Option<ModuleMembers> {
  let clause = clause.trim();
  if let Some(rest) = clause.strip_prefix('*') {
    let rest = rest.trim();
    if rest.is_empty() {
      return Some(ModuleMembers::All { namespace: None });
    }
    let namespace = rest.strip_prefix("as")?.trim();
    return is_identifier(namespace)
      .then(|| ModuleMembers::All { namespace: Some(ArcStr::from(namespace)) });
  }

  let (default_binding, named) = match clause.find('{') {
    Some(0) => (None, clause),
    Some(brace) => {
      let default_binding = clause[..brace].trim().strip_suffix(',')?.trim();
      (Some(default_binding), &clause[brace..])
    }
    None => (Some(clause), ""),
  };

  let mut members = SmallVec::new();
  if let Some(binding) = default_binding {
    if !is_identifier(binding) {
      return None;
    }
    members.push(Member {
      name: arcstr::literal!("default"),
      alias: Some(binding.into()),
      type_only: false,
    });
  }
  if !named.is_empty() {
    let inner = named.strip_prefix('{')?.strip_suffix('}')?;
    for part in inner.split(',').map(str::trim).filter(|part| !part.is_empty()) {
      members.push(parse_member(part)?);
    }
  }
  Some(ModuleMembers::Named(members))
}

fn parse_member(part: &str) -> Option<Member> {
  let (type_only, part) = match part.strip_prefix("type ") {
    // `type as x` binds a member called `type`.
    Some(rest) if !rest.trim_start().starts_with("as ") => (true, rest.trim_start()),
    _ => (false, part),
  };
  let mut pieces = MEMBER_ALIAS_RE.splitn(part, 2);
  let name = unquote(pieces.next()?.trim());
  let alias = pieces.next().map(|alias| ArcStr::from(unquote(alias.trim())));
  if name.is_empty() {
    return None;
  }
  Some(Member { name: ArcStr::from(name), alias, type_only })
}

fn unquote(name: &str) -> &str {
  name
    .strip_prefix('"')
    .and_then(|name| name.strip_suffix('"'))
    .or_else(|| name.strip_prefix('\'').and_then(|name| name.strip_suffix('\'')))
    .unwrap_or(name)
}

fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  chars.next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
