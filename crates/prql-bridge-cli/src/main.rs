//! prql-bridge CLI
//!
//! Runs one compiler stage over a file or stdin.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use prql_bridge::diagnostic::render;
use prql_bridge::{CompileResult, Configuration};

#[derive(Parser, Debug)]
#[command(name = "prql-bridge")]
#[command(about = "Run PRQL compiler stages")]
#[command(after_help = "\
EXAMPLES:
    # Compile a query to SQL
    echo 'from albums | take 3' | prql-bridge compile

    # The same, one stage at a time
    prql-bridge parse query.prql > pl.json
    prql-bridge resolve pl.json > rq.json
    prql-bridge generate --target sql.mssql rq.json

    # Full result, diagnostics included, as JSON
    prql-bridge compile --json query.prql
")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print the whole result as JSON instead of the output alone
    #[arg(long, global = true)]
    json: bool,

    /// JSON configuration file. Flags below override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// `sql.any` or `sql.<dialect>`
    #[arg(long, global = true)]
    target: Option<String>,

    /// Emit SQL on as few lines as possible
    #[arg(long, global = true)]
    no_format: bool,

    /// Leave out the trailing compiler signature comment
    #[arg(long, global = true)]
    no_signature: bool,

    /// Keep ANSI colors in annotated diagnostics
    #[arg(long, global = true)]
    color: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// PRQL → SQL
    Compile { input: Option<PathBuf> },
    /// PRQL → PL JSON
    Parse { input: Option<PathBuf> },
    /// PL JSON → RQ JSON
    Resolve { input: Option<PathBuf> },
    /// RQ JSON → SQL
    Generate { input: Option<PathBuf> },
    /// PL JSON → PRQL
    Fmt { input: Option<PathBuf> },
    /// List accepted targets
    Targets,
    /// Print the compiler version
    Version,
}

impl Args {
    fn configuration(&self) -> anyhow::Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => Configuration::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Configuration::default(),
        };
        if let Some(target) = &self.target {
            config = config.with_target(target.as_str());
        }
        if self.no_format {
            config = config.no_format();
        }
        if self.no_signature {
            config = config.no_signature();
        }
        if self.color {
            config = config.with_color(true);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let config = args.configuration()?;
    log::debug!("effective configuration: {config:?}");

    let result = match &args.command {
        Command::Compile { input } => {
            prql_bridge::compile(&read_input(input.as_deref())?, Some(&config))
        }
        Command::Parse { input } => prql_bridge::parse_to_pl(&read_input(input.as_deref())?),
        Command::Resolve { input } => prql_bridge::resolve_to_rq(&read_input(input.as_deref())?),
        Command::Generate { input } => {
            prql_bridge::generate_sql(&read_input(input.as_deref())?, Some(&config))
        }
        Command::Fmt { input } => prql_bridge::pl_to_prql(&read_input(input.as_deref())?),
        Command::Targets => {
            for target in prql_bridge::targets() {
                println!("{target}");
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Version => {
            println!("{}", prql_bridge::compiler_version());
            return Ok(ExitCode::SUCCESS);
        }
    };

    let ok = emit(&result, args.json)?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

/// Read a file, or stdin when no path (or `-`) is given
fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

/// Print the result; true when the stage succeeded
fn emit(result: &CompileResult, json: bool) -> anyhow::Result<bool> {
    if json {
        println!("{}", result.to_json()?);
    } else {
        if !result.messages().is_empty() {
            eprint!("{}", render(result.messages()));
        }
        if let Some(output) = result.output() {
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(result.is_success())
}
