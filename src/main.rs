mod auth;
mod backend;
mod config;
mod db;
mod error;
mod export;
mod logging;
mod models;
mod run;
mod session;
mod store;
mod ui;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;
    logging::init(config.log_level, &config.log_dir())?;

    let mut backend = backend::Backend::open(&config.db_path())?;

    match args.len() {
        1 => run::as_tui(&mut backend, &config.currency),
        2.. => run::as_cli(&args, &mut backend, &config.currency),
        _ => {
            eprintln!("Usage: projcost [command]");
            Ok(())
        }
    }
}
