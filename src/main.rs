//! phaseboard CLI - validate phase files and run scripted boards.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use phaseboard::logging::{init_logging, LogFormat};

/// phaseboard - grid boards driven by phase queries
#[derive(Parser, Debug)]
#[command(name = "phaseboard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format on stderr
    #[arg(long, value_enum, default_value = "human", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate phase files
    Check {
        /// Phase files (queries separated by `----` lines)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Board setup JSON used to resolve piece and attribute references
        #[arg(short, long)]
        board: Option<PathBuf>,
    },

    /// Run a board headlessly against scripted input
    Run {
        /// Board setup JSON (default: empty 8x8 board)
        #[arg(short, long)]
        board: Option<PathBuf>,

        /// Phase file
        #[arg(short, long)]
        phases: PathBuf,

        /// Input script JSON: an array of frames
        #[arg(short, long)]
        script: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_format, args.verbose);

    let result = match args.command {
        Commands::Check { files, board } => cli::check::execute(files, board),

        Commands::Run {
            board,
            phases,
            script,
            format,
        } => cli::run::execute(board, phases, script, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
