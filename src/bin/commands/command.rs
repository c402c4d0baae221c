use clap::Args;

use super::{exit_with, HostContext};

/// Arguments for the Command command
#[derive(Args)]
pub struct CommandArgs {
    /// Command document, e.g. '{"ping": 1}'
    #[clap()]
    pub command: String,

    /// Pretty-print the reply
    #[clap(short, long)]
    pub pretty: bool,
}

pub fn run(ctx: &HostContext, args: CommandArgs) {
    let CommandArgs { command, pretty } = args;

    let db = match ctx.connect() {
        Ok(db) => db,
        Err(e) => exit_with(e),
    };

    let reply = match db.run_command(&command) {
        Ok(reply) => reply,
        Err(e) => exit_with(e.into()),
    };

    if pretty {
        match serde_json::from_str::<serde_json::Value>(&reply)
            .and_then(|v| serde_json::to_string_pretty(&v))
        {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", reply),
        }
    } else {
        println!("{}", reply);
    }
}
