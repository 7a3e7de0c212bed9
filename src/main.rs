use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use vclint::ast::Program;
use vclint::config::Config;
use vclint::diag::{format_diagnostic, Diagnostic, FrontendError, Severity};
use vclint::resolve::Resolver;
use vclint::snippet::SnippetStore;
use vclint::transformer::Transformer;
use vclint::{lint, parse};

#[derive(ClapParser)]
#[command(author, version, about = "Lint and check Fastly VCL sources", long_about = None)]
struct Args {
    /// Entry VCL file
    file: PathBuf,

    /// Configuration file; defaults to `.vclint.json` next to the entry file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Additional include directories, searched before the configured ones
    #[clap(short = 'I', long = "include")]
    include: Vec<PathBuf>,

    /// Increase output verbosity (-v prints info findings, -vv debug logs)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match args.verbose {
        0 | 1 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        2 => EnvFilter::new("vclint=debug"),
        _ => EnvFilter::new("vclint=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(failed) => {
            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool, FrontendError> {
    let mut config = load_config(args)?;
    let mut include_paths = args.include.clone();
    if let Some(parent) = args.file.parent() {
        include_paths.push(parent.to_path_buf());
    }
    include_paths.append(&mut config.include_paths);
    config.include_paths = include_paths;
    config.verbosity = config.verbosity.max(args.verbose);

    let source = std::fs::read_to_string(&args.file)
        .map_err(|err| FrontendError::Io(args.file.clone(), err))?;
    let file = args.file.display().to_string();

    // Snippets come from the surrounding tooling; a bare CLI run lints
    // without them.
    let snippets = SnippetStore::new();

    let program = parse::parse(&source, &file)?;
    let mut resolver = Resolver::new(&config.include_paths, &snippets);
    let program = resolver.resolve_program(program)?;
    let diagnostics = lint::lint(&program, &config);

    let mut failed = false;
    for diagnostic in &diagnostics {
        if diagnostic.severity == Severity::Error {
            failed = true;
        }
        if printable(diagnostic, &config) {
            print_diagnostic(&source, &file, diagnostic);
        }
    }

    run_transformers(&config, &program, args, &file);
    Ok(failed)
}

fn load_config(args: &Args) -> Result<Config, FrontendError> {
    if let Some(path) = &args.config {
        return Config::load(path).map_err(|err| FrontendError::Io(path.clone(), err));
    }
    let default = args
        .file
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."))
        .join(".vclint.json");
    if default.is_file() {
        Config::load(&default).map_err(|err| FrontendError::Io(default.clone(), err))
    } else {
        Ok(Config::default())
    }
}

fn printable(diagnostic: &Diagnostic, config: &Config) -> bool {
    match diagnostic.severity {
        Severity::Error | Severity::Warning => true,
        Severity::Info => config.verbosity >= 1,
        Severity::Ignore => false,
    }
}

fn print_diagnostic(source: &str, entry_file: &str, diagnostic: &Diagnostic) {
    // The snippet renderer needs the file the token came from; included
    // files fall back to the one-line form.
    if &*diagnostic.token.file == entry_file {
        println!("{}", format_diagnostic(source, diagnostic));
    } else {
        println!("{diagnostic}");
    }
}

fn run_transformers(config: &Config, program: &Program, args: &Args, file: &str) {
    let working_directory = args
        .file
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let files = vec![file.to_string()];
    for tag in &config.transformers {
        let transformer = Transformer::new(tag);
        match transformer.run(program, &working_directory, &files) {
            Ok(reply) => {
                for diagnostic in reply.diagnostics {
                    println!(
                        "{file}: {}: {} [transform/{tag}]",
                        diagnostic.severity, diagnostic.message
                    );
                }
            }
            // A broken transformer must not sink the lint run.
            Err(err) => eprintln!("warning: transformer `{tag}` failed: {err}"),
        }
    }
}
