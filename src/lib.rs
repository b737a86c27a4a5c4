pub mod cli;
pub mod config;
pub mod console;
pub mod trace;

use anyhow::{Result, anyhow, bail};
use cli::{AppState, CliArgs, run_repl};
use config::AppConfig;
use console::{ConsoleError, ConsoleSession};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use trace::SessionTrace;

pub async fn run(args: CliArgs) -> Result<()> {
    let config = if let Some(path) = args.config.as_deref() {
        AppConfig::load_with_path(Some(path))?
    } else {
        AppConfig::load()?
    };
    let session = ConsoleSession::initialize()?;

    if args.smoke_python {
        return smoke_python(&session);
    }

    let startup_message = run_startup_script_if_configured(&session, &config)?;
    let session_id = generate_session_id();
    let trace = SessionTrace::create(&session_id)?;

    let mut app_state = AppState {
        session,
        trace,
        show_banner: config.banner,
        startup_message,
    };

    run_repl(&mut app_state).await
}

fn smoke_python(session: &ConsoleSession) -> Result<()> {
    if session.is_healthy() {
        println!("smoke-python: ok");
        Ok(())
    } else {
        bail!("smoke-python: interpreter session failed health check")
    }
}

fn run_startup_script_if_configured(
    session: &ConsoleSession,
    config: &AppConfig,
) -> Result<Option<String>> {
    let Some(path) = startup_script_path(config)? else {
        return Ok(None);
    };

    let source = fs::read_to_string(&path).map_err(|err| {
        anyhow!(
            "Failed to load startup file {}: unable to read file: {err}",
            path.display()
        )
    })?;

    match session.run_script(&source) {
        Ok(()) => Ok(Some(format!(
            "Startup file {} was executed",
            path.display()
        ))),
        Err(ConsoleError::Exception(exc)) | Err(ConsoleError::Interrupted(exc)) => {
            bail!(
                "Failed to execute startup file {}:\n{}",
                path.display(),
                exc.traceback
            )
        }
        Err(err) => bail!("Failed to execute startup file {}: {err}", path.display()),
    }
}

fn startup_script_path(config: &AppConfig) -> Result<Option<PathBuf>> {
    if let Some(path) = &config.startup_file {
        return Ok(Some(path.clone()));
    }

    if config.config_is_explicit {
        return Ok(None);
    }

    let config_dir = config.config_path.parent().ok_or_else(|| {
        anyhow!(
            "Failed to resolve startup file path from config {}: missing parent directory",
            config.config_path.display()
        )
    })?;
    let implicit_startup = config_dir.join("startup.py");
    if is_regular_file(&implicit_startup) {
        Ok(Some(implicit_startup))
    } else {
        Ok(None)
    }
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    format!("{millis:x}-{:x}", std::process::id())
}
