use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, ServeOverrides};

/// How long shutdown waits for an in-flight long-poll request.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Run the serve command.
pub fn run(port: Option<u16>, public_dir: Option<PathBuf>, poll: bool) -> Result<()> {
    let overrides = ServeOverrides { port, public_dir };
    let settings = Config::load_or_default()
        .resolve_server(&overrides, |name| std::env::var(name).ok())?;

    if !settings.public_dir.is_dir() {
        eprintln!(
            "{} public directory {} does not exist; only the API will respond.",
            "Warning:".yellow().bold(),
            settings.public_dir.display()
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(crate::server::serve(settings, poll));
    // A getUpdates call can block for its full timeout; don't wait for it.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
