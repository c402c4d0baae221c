use clap::Args;
use serde::Serialize;

use super::{exit_with, HostContext};

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Print the settings as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ConfigInfo<'a> {
    config_file: String,
    connection_string: &'a str,
    default_db: &'a str,
}

pub fn run(ctx: &HostContext, args: ConfigArgs) {
    let ConfigArgs { json } = args;

    let settings = match ctx.settings() {
        Ok(s) => s,
        Err(e) => exit_with(e),
    };

    let config_file = ctx
        .store()
        .path()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    let info = ConfigInfo {
        config_file,
        connection_string: &settings.connection_string,
        default_db: &settings.default_db,
    };

    if json {
        match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing config info: {}", e),
        }
        return;
    }

    println!("Auxiliary Configuration");
    println!("=======================\n");
    println!("  Config file:       {}", info.config_file);
    println!(
        "  Connection string: {}",
        if info.connection_string.is_empty() {
            "(not set)"
        } else {
            info.connection_string
        }
    );
    println!(
        "  Default database:  {}",
        if info.default_db.is_empty() {
            "(not set)"
        } else {
            info.default_db
        }
    );
}
