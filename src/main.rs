use std::process;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use jira_pr::cli::Args;
use jira_pr::{app, ui, Error};

fn main() {
    // usage and errors go to stdout, like every other message
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            println!("{}", err.render());
            process::exit(err.exit_code());
        }
    };

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match app::run(args) {
        Ok(()) => {}
        Err(Error::Cancelled) => process::exit(1),
        Err(err) => {
            ui::failure(&err.to_string());
            process::exit(1);
        }
    }
}
