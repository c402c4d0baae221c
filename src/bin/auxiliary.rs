use std::path::PathBuf;

use auxiliary::config::{DEFAULT_CONFIG_DIR, DEFAULT_ROOT};
use auxiliary::LogSeverity;
use clap::{Parser, Subcommand};

mod commands;

use commands::command::CommandArgs;
use commands::config::ConfigArgs;
use commands::HostContext;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// directory holding the settings files
    #[clap(long, default_value = DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    /// name of the settings file, without the .json extension
    #[clap(long, default_value = DEFAULT_ROOT)]
    root: String,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Minimum severity printed when --debug is set
    #[clap(long, value_enum, default_value_t = LogSeverity::Information)]
    log_level: LogSeverity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the settings file, creating it with defaults if missing
    Config(ConfigArgs),

    /// Connect to the database and report whether it answers
    Status,

    /// Run a database command given as an extended-JSON document
    Command(CommandArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::from(cli.log_level))
            .init();
    }

    let ctx = HostContext::new(cli.config_dir, cli.root);

    match cli.command {
        Commands::Config(args) => commands::config::run(&ctx, args),
        Commands::Status => commands::status::run(&ctx),
        Commands::Command(args) => commands::command::run(&ctx, args),
    }
}
