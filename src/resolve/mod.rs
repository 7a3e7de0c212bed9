//! Include expansion and provider boilerplate injection.
//!
//! Runs between parse and lint: every `include` directive is replaced by the
//! parsed content of the file (or named snippet) it points at, and lifecycle
//! subroutines get their phase snippets spliced in at `FASTLY <phase>`
//! comment markers.

pub mod errors;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ast::{
    BlockStatement, Comment, Declaration, Program, Statement, SubroutineDeclaration, TopLevel,
};
use crate::context::{is_lifecycle_subroutine, Scope};
use crate::parse;
use crate::snippet::SnippetStore;

pub use errors::ResolveError;

/// Prefix marking an include that refers to a named snippet instead of a
/// file on the include path.
pub const SNIPPET_PREFIX: &str = "snippet::";

pub struct Resolver<'a> {
    include_paths: &'a [PathBuf],
    snippets: &'a SnippetStore,
    /// Canonicalised paths currently being expanded, for cycle detection.
    stack: Vec<PathBuf>,
    visited: HashSet<PathBuf>,
}

impl<'a> Resolver<'a> {
    pub fn new(include_paths: &'a [PathBuf], snippets: &'a SnippetStore) -> Self {
        Resolver {
            include_paths,
            snippets,
            stack: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Expands a top-level program in place.
    pub fn resolve_program(&mut self, program: Program) -> Result<Program, ResolveError> {
        let mut body = Vec::with_capacity(program.body.len());
        for item in program.body {
            match item {
                TopLevel::Statement(Statement::Include(include)) => {
                    let name = include.module.value.clone();
                    if let Some(rest) = name.strip_prefix(SNIPPET_PREFIX) {
                        let source = self.snippets.by_name(rest).ok_or_else(|| {
                            ResolveError::UndefinedSnippet {
                                name: rest.to_string(),
                                token: include.meta.token.clone(),
                            }
                        })?;
                        debug!(snippet = rest, "splicing named snippet at top level");
                        let file = format!("{SNIPPET_PREFIX}{rest}");
                        let nested = parse::parse(&source, &file).map_err(|source| {
                            ResolveError::SnippetParse {
                                name: rest.to_string(),
                                source,
                            }
                        })?;
                        let nested = self.resolve_program(nested)?;
                        body.extend(nested.body);
                    } else {
                        let path = self.locate(&name, &include.meta.token)?;
                        let nested = self.load_program(&path, &include.meta.token)?;
                        body.extend(nested);
                    }
                }
                TopLevel::Declaration(Declaration::Subroutine(sub)) => {
                    let sub = self.resolve_subroutine(sub)?;
                    body.push(TopLevel::Declaration(Declaration::Subroutine(sub)));
                }
                other => body.push(other),
            }
        }
        Ok(Program { body })
    }

    fn resolve_subroutine(
        &mut self,
        mut sub: SubroutineDeclaration,
    ) -> Result<SubroutineDeclaration, ResolveError> {
        // Marker in the block's infix trivia: snippets for that phase lead
        // the body.
        if is_lifecycle_subroutine(&sub.name.value) {
            if let Some(phase) = marker_phase(&sub.block.meta.infix) {
                let mut injected = self.phase_snippets(phase)?;
                debug!(
                    subroutine = %sub.name.value,
                    phase = phase.phase_name(),
                    statements = injected.len(),
                    "injecting boilerplate at block marker"
                );
                injected.append(&mut sub.block.statements);
                sub.block.statements = injected;
            }
        }
        sub.block = self.resolve_block(sub.block)?;
        Ok(sub)
    }

    fn resolve_block(&mut self, block: BlockStatement) -> Result<BlockStatement, ResolveError> {
        let statements = self.resolve_statements(block.statements)?;
        Ok(BlockStatement {
            statements,
            ..block
        })
    }

    fn resolve_statements(
        &mut self,
        statements: Vec<Statement>,
    ) -> Result<Vec<Statement>, ResolveError> {
        let mut out = Vec::with_capacity(statements.len());
        for statement in statements {
            // Marker in a statement's leading trivia: snippets go in front
            // of that statement.
            if let Some(phase) = marker_phase(&statement.meta().leading) {
                let injected = self.phase_snippets(phase)?;
                debug!(
                    phase = phase.phase_name(),
                    statements = injected.len(),
                    "injecting boilerplate at statement marker"
                );
                out.extend(injected);
            }
            match statement {
                Statement::Include(include) => {
                    let name = include.module.value.clone();
                    let spliced = if let Some(rest) = name.strip_prefix(SNIPPET_PREFIX) {
                        let source = self.snippets.by_name(rest).ok_or_else(|| {
                            ResolveError::UndefinedSnippet {
                                name: rest.to_string(),
                                token: include.meta.token.clone(),
                            }
                        })?;
                        debug!(snippet = rest, "splicing named snippet");
                        let file = format!("{SNIPPET_PREFIX}{rest}");
                        let nested = parse::parse_snippet(&source, &file).map_err(|source| {
                            ResolveError::SnippetParse {
                                name: rest.to_string(),
                                source,
                            }
                        })?;
                        self.resolve_statements(nested)?
                    } else {
                        let path = self.locate(&name, &include.meta.token)?;
                        self.load_statements(&path, &include.meta.token)?
                    };
                    out.extend(spliced);
                }
                Statement::If(mut stmt) => {
                    stmt.consequence = self.resolve_block(stmt.consequence)?;
                    let mut branches = Vec::with_capacity(stmt.another.len());
                    for mut branch in stmt.another {
                        branch.consequence = self.resolve_block(branch.consequence)?;
                        branches.push(branch);
                    }
                    stmt.another = branches;
                    if let Some(mut alt) = stmt.alternative.take() {
                        alt.consequence = self.resolve_block(alt.consequence)?;
                        stmt.alternative = Some(alt);
                    }
                    out.push(Statement::If(stmt));
                }
                Statement::Switch(mut stmt) => {
                    let mut cases = Vec::with_capacity(stmt.cases.len());
                    for mut case in stmt.cases {
                        case.statements = self.resolve_statements(case.statements)?;
                        cases.push(case);
                    }
                    stmt.cases = cases;
                    out.push(Statement::Switch(stmt));
                }
                Statement::Block(block) => {
                    out.push(Statement::Block(self.resolve_block(block)?));
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }

    /// Parses the snippets pinned to a lifecycle phase.
    fn phase_snippets(&mut self, phase: Scope) -> Result<Vec<Statement>, ResolveError> {
        let name = phase.phase_name();
        let source = self.snippets.by_phase(name);
        if source.is_empty() {
            return Ok(Vec::new());
        }
        let file = format!("{SNIPPET_PREFIX}{name}");
        let statements =
            parse::parse_snippet(&source, &file).map_err(|source| ResolveError::SnippetParse {
                name: name.to_string(),
                source,
            })?;
        self.resolve_statements(statements)
    }

    /// Finds an include target on the ordered include path. The `.vcl`
    /// extension is appended when the name does not already carry one.
    fn locate(
        &self,
        name: &str,
        token: &crate::token::Token,
    ) -> Result<PathBuf, ResolveError> {
        let file_name = if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{name}.vcl")
        };
        for dir in self.include_paths {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                debug!(include = name, path = %candidate.display(), "resolved include");
                return Ok(candidate);
            }
        }
        Err(ResolveError::IncludeNotFound {
            name: name.to_string(),
            token: token.clone(),
        })
    }

    fn enter(
        &mut self,
        path: &Path,
        token: &crate::token::Token,
    ) -> Result<PathBuf, ResolveError> {
        let canonical = path.canonicalize().map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if self.stack.contains(&canonical) {
            return Err(ResolveError::IncludeCycle {
                path: canonical,
                token: token.clone(),
            });
        }
        self.stack.push(canonical.clone());
        self.visited.insert(canonical.clone());
        Ok(canonical)
    }

    fn read(&self, path: &Path) -> Result<String, ResolveError> {
        std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_program(
        &mut self,
        path: &Path,
        token: &crate::token::Token,
    ) -> Result<Vec<TopLevel>, ResolveError> {
        let canonical = self.enter(path, token)?;
        let source = self.read(&canonical)?;
        let file = canonical.display().to_string();
        let result = parse::parse(&source, &file)
            .map_err(ResolveError::from)
            .and_then(|program| self.resolve_program(program));
        self.stack.pop();
        Ok(result?.body)
    }

    fn load_statements(
        &mut self,
        path: &Path,
        token: &crate::token::Token,
    ) -> Result<Vec<Statement>, ResolveError> {
        let canonical = self.enter(path, token)?;
        let source = self.read(&canonical)?;
        let file = canonical.display().to_string();
        let result = parse::parse_snippet(&source, &file)
            .map_err(ResolveError::from)
            .and_then(|statements| self.resolve_statements(statements));
        self.stack.pop();
        result
    }
}

/// Recognises a `FASTLY <phase>` boilerplate marker in a comment list.
/// Leading comment punctuation and whitespace are skipped and the match is
/// case-insensitive, so `#FASTLY recv`, `// fastly RECV` and
/// `/* FASTLY deliver */` all qualify.
fn marker_phase(comments: &[Comment]) -> Option<Scope> {
    comments.iter().find_map(|comment| marker_in(comment))
}

fn marker_in(comment: &Comment) -> Option<Scope> {
    let text = comment
        .text()
        .trim_start_matches(|c: char| c.is_whitespace() || c == '#' || c == '/' || c == '*');
    let rest = text
        .get(..6)
        .filter(|head| head.eq_ignore_ascii_case("FASTLY"))
        .map(|_| &text[6..])?;
    let phase_word = rest.trim().split_whitespace().next()?;
    let phase_word = phase_word.trim_end_matches("*/").trim_end();
    Scope::from_phase(phase_word)
}

#[cfg(test)]
#[path = "../tests/t_resolve.rs"]
mod tests;
