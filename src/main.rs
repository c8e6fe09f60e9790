//! Binary entry point that glues the SQLite-backed catalog to the terminal
//! front end: load configuration, start logging, open the store, wire the
//! view-model onto a tokio runtime, and drive the Ratatui loop until the user
//! exits.
use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use movie_catalog::{run_app, App, AppConfig, AppViewModel, Dao};

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.log_path)?;
    log::info!("starting movie catalog with {config:?}");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let _guard = runtime.enter();

    let dao = Dao::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let vm = AppViewModel::new(dao.clone(), config.idle_grace);

    if config.seed_when_empty && runtime.block_on(dao.is_empty())? {
        let outcome = runtime
            .block_on(vm.seed_demo_data().wait())
            .context("failed to seed demonstration data")?;
        log::info!("empty catalog seeded: {outcome:?}");
    }

    let mut app = App::new(&vm);
    let result = run_app(&mut app);
    log::info!("front end closed");
    result
}

/// Route `log` output to a file; the terminal belongs to the front end.
/// `RUST_LOG` picks the filter, `info` otherwise.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
