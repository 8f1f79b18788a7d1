//! wtc - inspect the webtex-cn pipeline stages

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::io::{self, Read};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use webtex_cn::{
    compile, Compilation, CompileOptions, GridConfig, PunctuationMode, WtcError, WtcResult,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "wtc")]
#[command(version)]
#[command(about = "webtex-cn - classical Chinese grid layout compiler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(clap::Args)]
struct InputArgs {
    /// Input file path (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Template configuration file with macro definitions
    #[arg(long)]
    cfg: Option<PathBuf>,

    /// Ceiling on macro expansion passes
    #[arg(long, default_value_t = webtex_cn::DEFAULT_MAX_PASSES)]
    max_passes: usize,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Print the source after macro expansion
    Expand {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the document tree as JSON
    Ast {
        #[command(flatten)]
        input: InputArgs,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the grid layout as JSON
    Layout {
        #[command(flatten)]
        input: InputArgs,

        /// Template name or id, overriding the document's choice
        #[arg(short, long)]
        template: Option<String>,

        /// Punctuation mode: normal, judou or none
        #[arg(long)]
        punctuation: Option<PunctuationMode>,

        /// Grid as ROWSxCOLS, overriding the template's
        #[arg(long, value_parser = parse_grid)]
        grid: Option<GridConfig>,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[cfg(feature = "cli")]
fn parse_grid(value: &str) -> Result<GridConfig, String> {
    let (rows, cols) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected ROWSxCOLS, got {}", value))?;
    let rows = rows.trim().parse().map_err(|_| format!("bad row count: {}", rows))?;
    let cols = cols.trim().parse().map_err(|_| format!("bad column count: {}", cols))?;
    GridConfig::new(rows, cols).map_err(|err| err.to_string())
}

#[cfg(feature = "cli")]
fn run(input: &InputArgs, options: CompileOptions) -> WtcResult<Compilation> {
    let source = match &input.input {
        Some(path) => std::fs::read_to_string(path).map_err(|err| WtcError::io(path, err))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| WtcError::io("<stdin>", err))?;
            buffer
        }
    };
    let cfg = input
        .cfg
        .as_ref()
        .map(|path| std::fs::read_to_string(path).map_err(|err| WtcError::io(path, err)))
        .transpose()?;

    let options = options.with_max_passes(input.max_passes);
    let compiled = compile(&source, cfg.as_deref(), &options);
    for warning in compiled.warning_messages() {
        eprintln!("warning: {}", warning);
    }
    Ok(compiled)
}

#[cfg(feature = "cli")]
fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> WtcResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

#[cfg(feature = "cli")]
fn execute(cli: Cli) -> WtcResult<()> {
    match cli.command {
        Commands::Expand { input } => {
            let compiled = run(&input, CompileOptions::new())?;
            println!("{}", compiled.expanded_source);
        }
        Commands::Ast { input, pretty } => {
            let compiled = run(&input, CompileOptions::new())?;
            println!("{}", to_json(&compiled.document, pretty)?);
        }
        Commands::Layout {
            input,
            template,
            punctuation,
            grid,
            pretty,
        } => {
            let options = CompileOptions {
                template_override: template,
                punctuation_override: punctuation,
                grid_override: grid,
                ..CompileOptions::default()
            };
            let compiled = run(&input, options)?;
            println!("{}", to_json(&compiled.layout(), pretty)?);
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = execute(cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
}
