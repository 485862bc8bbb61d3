use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use colored::Colorize;
use ram::{RamContext, commands, errors::RamError};
use std::io;
use std::process;

#[derive(Parser)]
#[command(
    name = "ram",
    version = ram::VERSION,
    about = "Incremental image asset converter",
    long_about = "Tracks master image files and regenerates their derived \
                  variants through an external transformer when they change"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ram management for a folder
    Init,

    /// Add files to the ram index
    Add {
        /// Files to add
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Remove files from the ram index
    Rm {
        /// Files to remove
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// List ram managed files
    Ls,

    /// Show status of ram managed files
    Status {
        /// Show all files, including up-to-date ones
        #[arg(short)]
        all: bool,
    },

    /// Convert assets whose masters changed
    Convert,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{} {e:#}", "fatal:".red().bold());
        process::exit(exit_code(&e));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let ctx = RamContext::new()?;
            commands::init::execute(&ctx)?;
        }
        Commands::Add { files } => {
            let ctx = RamContext::new()?;
            commands::add::execute(&ctx, &files)?;
        }
        Commands::Rm { files } => {
            let ctx = RamContext::new()?;
            commands::rm::execute(&ctx, &files)?;
        }
        Commands::Ls => {
            let ctx = RamContext::new()?;
            commands::ls::execute(&ctx)?;
        }
        Commands::Status { all } => {
            let ctx = RamContext::new()?;
            commands::status::execute(&ctx, all)?;
        }
        Commands::Convert => {
            let ctx = RamContext::new()?;
            commands::convert::execute(&ctx, cli.verbose)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

/// Maps a failed run to its process exit code: 3 for `init` against an
/// already-managed folder, the OS error code for unreadable file arguments,
/// 1 otherwise. clap exits with 2 for argument errors on its own.
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(RamError::AlreadyInitialized) = cause.downcast_ref::<RamError>() {
            return 3;
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>()
            && let Some(code) = io_err.raw_os_error()
        {
            return code;
        }
    }
    1
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
