#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use typeprep_core::Config;

#[derive(Parser, Debug)]
#[command(name = "typeprep")]
#[command(author, version, about = "Generate type reference declarations for a project's modules", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve the project's modules and write the type declaration file
    Prepare {
        /// Project root directory
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Path to project config file (overrides auto-discovery)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Extra directory to search for installed packages (repeatable)
        #[arg(long = "modules-dir", value_name = "DIR")]
        modules_dir: Vec<PathBuf>,

        /// Extra module identifier to reference (repeatable)
        #[arg(long = "module", short = 'm', value_name = "ID")]
        modules: Vec<String>,

        /// Output file (defaults to the config's `declaration`, or nuxt.d.ts in the root)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Command name written into the generated header comment
        #[arg(long, value_name = "LABEL")]
        generator: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Prepare {
            root,
            config: config_file,
            modules_dir,
            modules,
            output,
            generator,
        }) => {
            let action = commands::prepare::PrepareAction {
                root,
                config: config_file,
                modules_dir,
                modules,
                output,
                generator,
            };
            commands::prepare::run(&config, action)
        }
    }
}
