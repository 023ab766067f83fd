use std::{
    io::{stdout, Stdout},
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    event::{Event, EventStream},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use mood_journal::{
    app::{App, Control},
    config::parse_config,
    entry_store::EntryStore,
    logging,
    storage::{FileStorage, KeyValueStorage, MemoryStorage},
    theme::{Theme, ThemeContext, ThemeStore},
    ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};

#[derive(Parser)]
#[command(name = "mood-journal", version)]
#[command(about = "Write journal entries, tag them with a mood, browse them later", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding entries and the log file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk, not even the log
    #[arg(long)]
    ephemeral: bool,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let Cli {
        config,
        data_dir,
        ephemeral,
        dark,
    } = Cli::parse();

    let mut config = parse_config(config).await?;
    if let Some(dir) = data_dir {
        config.data_dir = Some(dir);
    }
    let data_dir = config.data_dir()?;
    if let Some(dir) = log_dir(ephemeral, &data_dir) {
        logging::init(dir, &config.log_level)?;
    }

    let storage: Arc<dyn KeyValueStorage> = if ephemeral {
        tracing::info!("running with in-memory storage");
        Arc::new(MemoryStorage::new())
    } else {
        tracing::info!(dir = %data_dir.display(), "using file storage");
        Arc::new(FileStorage::new(&data_dir))
    };

    let theme_store = config
        .persist_theme
        .then(|| ThemeStore::new(storage.clone()));
    let persisted = match &theme_store {
        Some(themes) => themes.load().await,
        None => None,
    };
    let initial = if dark {
        Theme::Dark
    } else {
        persisted.unwrap_or(Theme::from_dark(config.dark_mode))
    };

    let mut app = App::new(
        EntryStore::new(storage),
        ThemeContext::new(initial),
        theme_store,
        config.mood_policy(),
        config.recent_limit,
    );
    app.start().await;

    let mut tui = Tui::new()?;
    let result = run(&mut tui.terminal, &mut app).await;
    drop(tui);
    result
}

/// Directory for the log file, or `None` when the disk must stay untouched.
fn log_dir(ephemeral: bool, data_dir: &Path) -> Option<&Path> {
    (!ephemeral).then_some(data_dir)
}

async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let mut events = EventStream::new();
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match events.next().await {
            Some(Ok(Event::Key(key))) => {
                if app.handle_key(key).await == Control::Quit {
                    tracing::info!("quit");
                    return Ok(());
                }
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e).wrap_err("Failed to read terminal event"),
            None => return Ok(()),
        }
    }
}

struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Tui { terminal })
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!(error = %e, "failed to disable raw mode");
        }
        if let Err(e) = stdout().execute(LeaveAlternateScreen) {
            tracing::warn!(error = %e, "failed to leave alternate screen");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ephemeral_runs_skip_the_log_file() {
        let data_dir = Path::new("/tmp/mood-journal");

        let cli = Cli::try_parse_from(["mood-journal", "--ephemeral"]).unwrap();
        assert!(cli.ephemeral);
        assert_eq!(log_dir(cli.ephemeral, data_dir), None);

        let cli = Cli::try_parse_from(["mood-journal"]).unwrap();
        assert_eq!(log_dir(cli.ephemeral, data_dir), Some(data_dir));
    }
}
