mod commands;
mod helpers;
mod script;

use clap::Parser;
use dyntax_core::domain::DynTaxError;
use std::path::PathBuf;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let compatibility_error = error.as_dyntax_error();
            eprintln!("{}", compatibility_error.diagnostic_line());
            if let Some(summary_line) = compatibility_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            compatibility_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("dyntax".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_tracing(cli.verbose);
            dispatch_parsed(cli)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "dyntax",
    about = "Transient absorption spectra from Q-Chem excited-state trajectories"
)]
struct Cli {
    /// Configuration file of `key = value` lines
    #[arg(long, global = true, value_name = "path")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Extract one log and print its ESA record as JSON
    Extract(commands::ExtractArgs),
    /// Load a log directory or saved series and summarize it
    Load(commands::LoadArgs),
    /// Run a line-oriented job script
    Script(commands::ScriptArgs),
}

fn dispatch_parsed(cli: Cli) -> Result<i32, CliError> {
    let config = helpers::load_config(cli.config.as_deref())?;
    match cli.command {
        CliCommand::Extract(args) => commands::run_extract_command(args, &config),
        CliCommand::Load(args) => commands::run_load_command(args, &config),
        CliCommand::Script(args) => commands::run_script_command(args, &config),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(#[from] DynTaxError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_dyntax_error(&self) -> DynTaxError {
        match self {
            Self::Usage(message) => DynTaxError::invalid_input("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => DynTaxError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
