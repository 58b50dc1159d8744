//! ghinstall CLI - Command-line interface
//!
//! Installs R packages from GitHub repositories using the ghinstall library.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "ghinstall", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, build and install packages from repository references
    Install(InstallArgs),

    /// Parse a reference and print its parts
    Parse {
        /// Reference such as owner/repo[branch]@rev#pr/subdir
        reference: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create the configuration file with default values
    Init,

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Arguments for `ghinstall install`.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// References such as owner/repo, owner/repo@v1.0, owner/repo#42/pkg
    #[arg(required = true)]
    pub refs: Vec<String>,

    /// Hosting service (default: github.com or config)
    #[arg(long)]
    pub host: Option<String>,

    /// Access token (default: GITHUB_PAT, GITHUB_TOKEN or config)
    #[arg(long)]
    pub token: Option<String>,

    /// Extra flags for the archive build tool, whitespace separated
    #[arg(long, allow_hyphen_values = true)]
    pub build_args: Option<String>,

    /// Skip building vignettes
    #[arg(long)]
    pub no_build_docs: bool,

    /// Remove existing installs first
    #[arg(long)]
    pub uninstall_first: bool,

    /// Package repository to search for dependencies (repeatable)
    #[arg(long = "repo", value_name = "URL")]
    pub repos: Vec<String>,

    /// Dependency kinds to install, comma separated (e.g. Depends,Imports)
    #[arg(long, value_delimiter = ',')]
    pub dependencies: Option<Vec<String>>,

    /// Library to install into
    #[arg(long = "lib", value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Installer package type (source, binary, ...)
    #[arg(long = "type", value_name = "TYPE")]
    pub install_type: Option<String>,

    /// Extra installer argument passed verbatim, e.g. "quiet = TRUE" (repeatable)
    #[arg(long = "install-opt", value_name = "EXPR")]
    pub install_opts: Vec<String>,

    /// Parent directory for scratch space
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Show progress messages from every step
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Install(args) if args.verbose);
    ghinstall::logging::init_logging(verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Install(args) => commands::install::run(args),
        Commands::Parse { reference, json } => commands::parse::run(&reference, json),
        Commands::Init => commands::init::run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
