mod app;
#[cfg(not(target_arch = "wasm32"))]
mod cli;
#[cfg(not(target_arch = "wasm32"))]
mod clipboard;
#[cfg(not(target_arch = "wasm32"))]
mod commands;
#[cfg(not(target_arch = "wasm32"))]
mod config;
mod deck;
mod facts;
mod feedback;
mod render;
#[cfg(not(target_arch = "wasm32"))]
mod server;
mod theme;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use colored::Colorize;
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::EnvFilter;

/// Default filter for a verbosity level. `RUST_LOG` overrides all of these.
#[cfg(not(target_arch = "wasm32"))]
fn default_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "factdeck=info,warn",
        1 => "factdeck=debug,tower_http=debug,info",
        _ => "trace",
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging(verbose: u8, quiet: bool, color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, cli.quiet, !cli.no_color);

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    web::start();
}
