mod cli;
mod replay;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use plait_core::config::{self, CoreConfig};
use plait_core::observability::init_logging;
use plait_core::Core;
use tracing::info;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("plait error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> Result<()> {
    let args = cli::parse();
    init_logging(args.log_level.map(Into::into));

    let config = resolve_config(args.config.as_deref())?;

    match args.command {
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Command::Run { script, fail_fast } => {
            let steps = replay::load_script(&script)?;
            let core = Core::builder().config(config).build()?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            let failed = replay::replay(&core, steps, fail_fast, &mut out).await?;
            out.flush()?;

            if failed > 0 {
                anyhow::bail!("{failed} request(s) failed");
            }
            Ok(())
        }
    }
}

/// An explicit path must exist; the default path is optional.
fn resolve_config(explicit: Option<&Path>) -> Result<CoreConfig> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "loading config");
        return config::load_and_validate(path)
            .with_context(|| format!("loading {}", path.display()));
    }

    let default = config::default_config_path();
    if default.exists() {
        info!(path = %default.display(), "loading config");
        config::load_and_validate(&default).with_context(|| format!("loading {}", default.display()))
    } else {
        info!("no config file, using defaults");
        Ok(CoreConfig::default())
    }
}
