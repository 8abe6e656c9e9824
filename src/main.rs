mod cli;
mod dates;
mod error;
mod fmt;
mod importer;
mod indicators;
mod logging;
mod models;
mod normalize;
mod projector;
mod reports;
mod schema;
mod settings;

use clap::Parser;

use cli::{Cli, Commands};
use logging::{init_logging, LogConfig};

fn main() {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose, cli.quiet));

    let result = match cli.command {
        Commands::Indicators {
            file,
            decode,
            years,
            projects,
            full,
            json,
        } => cli::indicators::run(
            &file,
            &decode,
            &years,
            cli::indicators::View {
                projects,
                full,
                json,
            },
        ),
        Commands::Columns { file, decode } => cli::columns::run(&file, &decode),
        Commands::Config { decode, years } => cli::config::run(&decode, &years),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
