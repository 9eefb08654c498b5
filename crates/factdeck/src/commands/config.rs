use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::{Config, DEFAULT_FACTS, DEFAULT_PORT, DEFAULT_PUBLIC_DIR};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let defaults = config.defaults.clone().unwrap_or_default();
    let server = config.server.clone().unwrap_or_default();
    let bot = config.bot.clone().unwrap_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();

    println!("{}", "defaults".bold());
    row(
        "facts",
        defaults.facts.as_deref(),
        &format!("{DEFAULT_FACTS} (default)"),
    );
    row("theme", defaults.theme.as_deref(), "dark (default)");
    row(
        "avoid_boundary_repeat",
        defaults.avoid_boundary_repeat.map(|v| v.to_string()).as_deref(),
        "false (default)",
    );

    println!("{}", "server".bold());
    row(
        "port",
        server.port.map(|p| p.to_string()).as_deref(),
        &format!("{DEFAULT_PORT} (default, or PORT)"),
    );
    row(
        "public_dir",
        server.public_dir.as_ref().map(|p| p.display().to_string()).as_deref(),
        &format!("{DEFAULT_PUBLIC_DIR} (default)"),
    );
    row(
        "web_app_url",
        server.web_app_url.as_deref(),
        "http://localhost:<port>/ (default, or WEB_APP_URL)",
    );

    println!("{}", "bot".bold());
    row(
        "token",
        bot.token.as_deref().map(mask).as_deref(),
        "not set (TELEGRAM_BOT_TOKEN)",
    );
    row(
        "setup_secret",
        bot.setup_secret.as_deref().map(mask).as_deref(),
        "not set (SETUP_SECRET)",
    );
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {} = {}",
        "Set".green().bold(),
        key,
        if key.starts_with("bot.") {
            mask(value)
        } else {
            value.to_string()
        }
    );
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}

fn row(key: &str, value: Option<&str>, fallback: &str) {
    match value {
        Some(v) => println!("  {key}: {v}"),
        None => println!("  {key}: {}", fallback.dimmed()),
    }
}

/// Keep the last four characters of a secret visible.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_hides_all_but_tail() {
        assert_eq!(mask("123456:ABCDEF"), "****CDEF");
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask(""), "****");
    }
}
