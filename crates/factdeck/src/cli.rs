use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "factdeck")]
#[command(author, version, about)]
#[command(long_about = "A shuffled deck of short facts, one card at a time.\n\n\
    Tap or press Right for the next fact, Left for the previous one.\n\
    Every fact appears once per pass before the deck reshuffles.\n\n\
    Examples:\n  \
    factdeck                           Open public/facts.txt (fullscreen)\n  \
    factdeck facts.txt --windowed      Open a fact file in a window\n  \
    factdeck https://host/facts.txt    Fetch facts over HTTP\n  \
    factdeck serve --port 8080         Host the deck and the bot webhook\n  \
    factdeck serve --poll              Run the bot by long-polling instead")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Fact file path or http(s) URL (one fact per line)
    pub source: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Color theme: dark or light
    #[arg(long, global = false)]
    pub theme: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the fact deck files and the bot webhook over HTTP
    Serve {
        /// Port to listen on (overrides PORT and server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory of static files to host
        #[arg(long)]
        public_dir: Option<PathBuf>,

        /// Also long-poll the Bot API for updates (for local development)
        #[arg(long)]
        poll: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.facts, defaults.theme, server.port, bot.token)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Serve {
                port,
                public_dir,
                poll,
            }) => crate::commands::serve::run(port, public_dir, poll),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => {
                if let Some(theme) = &self.theme {
                    if crate::theme::Theme::parse(theme).is_none() {
                        anyhow::bail!("Invalid theme: {theme}. Must be 'light' or 'dark'.");
                    }
                }
                let settings = crate::config::Config::load_or_default()
                    .resolve_viewer(self.source, self.theme);
                crate::app::run(settings, self.windowed)
            }
        }
    }
}
