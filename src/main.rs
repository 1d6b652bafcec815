mod cli;

use clap::Parser;

use cli::commands::log::LogFilters;
use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();

    cli::logging::init_logging(args.verbose);
    cli::context::init(args.dir.as_deref());

    let result = match &args.command {
        Commands::Init => cli::commands::init::execute(args.verbose),
        Commands::Record { file } => cli::commands::record::execute(file),
        Commands::Log {
            subject_type,
            id,
            action,
            since,
            last,
        } => cli::commands::log::execute(LogFilters {
            subject_type: subject_type.as_deref(),
            id: id.as_deref(),
            action: action.as_deref(),
            since: since.as_deref(),
            last: *last,
        }),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
