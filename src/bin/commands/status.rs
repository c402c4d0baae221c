use super::{exit_with, HostContext};

pub fn run(ctx: &HostContext) {
    let db = match ctx.connect() {
        Ok(db) => db,
        Err(e) => exit_with(e),
    };

    if db.is_connected() {
        println!("connected to database '{}'", db.database_name());
    } else {
        println!("database '{}' is not reachable", db.database_name());
        std::process::exit(1);
    }
}
