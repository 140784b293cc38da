mod boxes_cmd;
mod cli;
mod crop_cmd;
mod shared;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Crop(ref args) => crop_cmd::run(args),
        cli::Commands::Boxes(ref args) => boxes_cmd::run(args),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

/// Log to stderr. `-v` and `-vv` override `RUST_LOG`, which defaults to `warn`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
