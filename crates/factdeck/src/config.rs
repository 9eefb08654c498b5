use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "factdeck";

pub const DEFAULT_FACTS: &str = "public/facts.txt";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_PORT: u16 = 3000;

const TOKEN_VARS: &[&str] = &["TELEGRAM_BOT_TOKEN", "BOT_TOKEN"];
const WEB_APP_URL_VARS: &[&str] = &["WEB_APP_URL", "GAME_URL"];
const SETUP_SECRET_VAR: &str = "SETUP_SECRET";
const PORT_VAR: &str = "PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<BotConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Fact file path or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid_boundary_repeat: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API token. If not set, falls back to TELEGRAM_BOT_TOKEN (or BOT_TOKEN).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Shared secret for the one-time webhook registration endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_secret: Option<String>,
}

/// Flags given to `factdeck serve`; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub port: Option<u16>,
    pub public_dir: Option<PathBuf>,
}

/// Fully resolved settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub public_dir: PathBuf,
    /// Always ends with `/`.
    pub web_app_url: String,
    pub bot_token: String,
    pub setup_secret: Option<String>,
}

/// Viewer settings after applying CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub facts: String,
    pub theme: String,
    pub avoid_boundary_repeat: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_env(names: &[&str], env: &impl Fn(&str) -> Option<String>) -> Option<String> {
    names.iter().find_map(|name| non_empty(env(name)))
}

/// Ensure exactly one trailing slash, as the bot's web app button expects a directory URL.
pub fn normalize_web_app_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `factdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# factdeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.facts" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid facts source: must be a path or URL.");
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .facts = Some(value.to_string());
            }
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.avoid_boundary_repeat" => {
                let enabled = match value {
                    "true" => true,
                    "false" => false,
                    _ => anyhow::bail!(
                        "Invalid avoid_boundary_repeat: {value}. Must be 'true' or 'false'."
                    ),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .avoid_boundary_repeat = Some(enabled);
            }
            "server.port" => {
                let port = value
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| anyhow::anyhow!("Invalid port: {value}. Must be 1-65535."))?;
                self.server.get_or_insert_with(ServerConfig::default).port = Some(port);
            }
            "server.public_dir" => {
                self.server
                    .get_or_insert_with(ServerConfig::default)
                    .public_dir = Some(PathBuf::from(value));
            }
            "server.web_app_url" => {
                if !value.starts_with("https://") && !value.starts_with("http://") {
                    anyhow::bail!("Invalid web_app_url: {value}. Must start with http:// or https://.");
                }
                self.server
                    .get_or_insert_with(ServerConfig::default)
                    .web_app_url = Some(normalize_web_app_url(value));
            }
            "bot.token" => {
                self.bot.get_or_insert_with(BotConfig::default).token = Some(value.to_string());
            }
            "bot.setup_secret" => {
                self.bot.get_or_insert_with(BotConfig::default).setup_secret =
                    Some(value.to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.facts, defaults.theme, \
                 defaults.avoid_boundary_repeat, server.port, server.public_dir, \
                 server.web_app_url, bot.token, bot.setup_secret"
            ),
        }
        Ok(())
    }

    /// CLI values override the config file; built-in defaults fill the rest.
    pub fn resolve_viewer(&self, facts: Option<String>, theme: Option<String>) -> ViewerSettings {
        let defaults = self.defaults.clone().unwrap_or_default();
        ViewerSettings {
            facts: facts
                .or(defaults.facts)
                .unwrap_or_else(|| DEFAULT_FACTS.to_string()),
            theme: theme
                .or(defaults.theme)
                .unwrap_or_else(|| "dark".to_string()),
            avoid_boundary_repeat: defaults.avoid_boundary_repeat.unwrap_or(false),
        }
    }

    /// Resolve server settings: CLI flags, then environment, then config file, then defaults.
    pub fn resolve_server(
        &self,
        overrides: &ServeOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ServerSettings> {
        let server = self.server.clone().unwrap_or_default();
        let bot = self.bot.clone().unwrap_or_default();

        let port = match overrides.port {
            Some(port) => port,
            None => match non_empty(env(PORT_VAR)) {
                Some(raw) => raw
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| anyhow::anyhow!("Invalid {PORT_VAR}: {raw}"))?,
                None => server.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let bot_token = first_env(TOKEN_VARS, &env)
            .or(non_empty(bot.token))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No bot token found. Set TELEGRAM_BOT_TOKEN or run \
                     `factdeck config set bot.token <token>`."
                )
            })?;

        let web_app_url = first_env(WEB_APP_URL_VARS, &env)
            .or(non_empty(server.web_app_url))
            .map(|url| normalize_web_app_url(&url))
            .unwrap_or_else(|| format!("http://localhost:{port}/"));

        Ok(ServerSettings {
            port,
            public_dir: overrides
                .public_dir
                .clone()
                .or(server.public_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR)),
            web_app_url,
            bot_token,
            setup_secret: non_empty(env(SETUP_SECRET_VAR)).or(non_empty(bot.setup_secret)),
        })
    }
}
