pub mod completion;
pub mod config;
pub mod serve;

use colored::Colorize;

pub fn print_version() {
    println!(
        "{} {}",
        "factdeck".bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
}
