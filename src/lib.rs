pub mod ast;
pub mod codec;
pub mod config;
pub mod context;
pub mod diag;
pub mod lexer;
pub mod lint;
pub mod parse;
pub mod resolve;
pub mod snippet;
pub mod token;
pub mod transformer;

pub use config::Config;
pub use diag::{Diagnostic, FrontendError, Severity};
pub use snippet::SnippetStore;

use crate::resolve::Resolver;

/// Full front-end pipeline for one source file: parse, expand includes and
/// boilerplate, lint. Structural failures short-circuit; lint findings are
/// returned in full.
pub fn check(
    source: &str,
    file: &str,
    config: &Config,
    snippets: &SnippetStore,
) -> Result<Vec<Diagnostic>, FrontendError> {
    let program = parse::parse(source, file)?;
    let mut resolver = Resolver::new(&config.include_paths, snippets);
    let program = resolver.resolve_program(program)?;
    Ok(lint::lint(&program, config))
}
