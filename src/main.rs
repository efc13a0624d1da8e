// Entrypoint for the CLI application.
// Parses arguments, sets up logging and hands off to `cli::run`. Any error
// that reaches here is fatal and exits with status 1.

use clap::Parser;
use quickpin_cli::{cli::Cli, logging};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = quickpin_cli::cli::run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
