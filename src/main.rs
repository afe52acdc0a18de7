use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use cryptic::config::{load_config, resolve_root};
use cryptic::cryptic::CrypticResolver;
use cryptic::render::{
    format_no_sheets, format_result_as_json, format_result_as_text, format_sheet_list,
};

/// Resolve cryptic commands, acronyms and jargon.
#[derive(Parser)]
#[command(name = "cr", version, about = "Cryptic Resolver: explain acronyms and jargon")]
struct Cli {
    /// Term to resolve (e.g. `emacs`, `xdg`)
    term: Option<String>,
    /// List installed sheets
    #[arg(short, long)]
    list: bool,
    /// Sheet root directory (default: $CRYPTIC_RESOLVER_HOME or ~/.cryptic-resolver)
    #[arg(short, long)]
    root: Option<PathBuf>,
    /// Sheet to search first
    #[arg(short, long)]
    primary: Option<String>,
    /// Output as JSON
    #[arg(short, long)]
    json: bool,
    /// Search sheets one at a time
    #[arg(long)]
    sequential: bool,
    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> cryptic::errors::Result<()> {
    let root = resolve_root(cli.root)?;
    let mut config = load_config(&root)?;
    if let Some(primary) = cli.primary {
        config.primary_sheet = primary;
    }
    if cli.sequential {
        config.parallel = false;
    }

    let resolver = CrypticResolver::open(&root, &config)?;

    if cli.list {
        if resolver.registry().is_empty() {
            print!("{}", format_no_sheets(&root, &config.sources));
        } else {
            print!("{}", format_sheet_list(resolver.registry()));
        }
        return Ok(());
    }

    let Some(term) = cli.term else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if resolver.registry().is_empty() && !cli.json {
        print!("{}", format_no_sheets(&root, &config.sources));
        return Ok(());
    }

    let result = if config.parallel {
        tokio::runtime::Runtime::new()?.block_on(resolver.resolve_across_sheets_parallel(&term))?
    } else {
        resolver.resolve_across_sheets(&term)?
    };

    if cli.json {
        println!("{}", format_result_as_json(&result)?);
    } else {
        println!("{}", format_result_as_text(&result, &config.sources));
    }
    Ok(())
}
