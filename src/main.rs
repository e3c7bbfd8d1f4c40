mod amount;
mod cli;
mod driver;
mod error;
mod fmt;
mod layout;
mod paginate;
mod partition;
mod pdf;
mod settings;
mod sheet;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => cli::generate::run(args),
        Commands::Columns { file, sheet } => cli::columns::run(&file, sheet.as_deref()),
        Commands::Init { force } => cli::init::run(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
