use clap::Parser;
use fancy_organizer::cli::{Cli, run};
use fancy_organizer::log_sink::{init_subscriber, verbosity_filter};
use fancy_organizer::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_subscriber(verbosity_filter(cli.verbose, cli.quiet));

    match run(&cli) {
        Ok(status) => status.into(),
        Err(e) => {
            OutputFormatter::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
