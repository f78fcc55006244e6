use std::fs::{self, File};

use simplelog::WriteLogger;
use tokio::sync::mpsc;
use trimtool_lib::TrimtoolClient;
use trimtool_tui::app::{App, Context, PageId};
use trimtool_tui::config::{self, Config};
use trimtool_tui::settings::{self, SettingsProvider, SqliteBackend};
use trimtool_tui::ui::Terminal;
use trimtool_tui::{AppError, paths, wakeup};

fn init_logging() {
    paths::rotate_logs();
    let (Some(dir), Some(path)) = (paths::cache_dir(), paths::log_file()) else {
        return;
    };
    let file = fs::create_dir_all(&dir).and_then(|()| File::create(&path));
    match file {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(config::log_level(), simplelog::Config::default(), file) {
                eprintln!("could not start logger: {}", e);
            }
        }
        Err(e) => eprintln!("could not open {}: {}", path.display(), e),
    }
}

async fn open_settings() -> Option<SettingsProvider> {
    let path = paths::settings_db()?;
    match SqliteBackend::open(&path).await {
        Ok(backend) => Some(SettingsProvider::new(backend)),
        Err(e) => {
            log::warn!("settings unavailable ({}): {}", path.display(), e);
            None
        }
    }
}

async fn run() -> Result<(), AppError> {
    let settings = open_settings().await;

    let (stored_url, last_page) = match &settings {
        Some(s) => (s.get(&settings::API_URL).await?, s.get(&settings::LAST_PAGE).await?),
        None => (None, None),
    };
    let config = Config::from_env(stored_url)?;
    log::info!("backend {} (timeout {:?})", config.api_url, config.timeout);
    if config.api_url_from_env
        && let Some(s) = &settings
    {
        s.set(&settings::API_URL, &config.api_url).await?;
    }

    let client = TrimtoolClient::builder()
        .url(config.api_url)
        .timeout(config.timeout)
        .build()?;

    let initial = last_page
        .as_deref()
        .and_then(PageId::from_slug)
        .unwrap_or(PageId::Dashboard);

    let (wake_tx, wake_rx) = wakeup::channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let ctx = Context::new(client, wake_tx, command_tx, settings);

    let mut terminal = Terminal::new()?;
    let app = App::new(ctx, initial);
    app.run(&mut terminal, command_rx, wake_rx).await
}

#[tokio::main]
async fn main() {
    init_logging();
    log::info!("trimtool {} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
