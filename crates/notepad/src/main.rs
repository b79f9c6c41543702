use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::{env, fs, time::Duration};

use notepad::app::App;
use notepad::config::Config;
use notepad::plugin_host::in_plugin_call;
use notepad::ui::{self, MIN_HEIGHT, MIN_WIDTH};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logger();

    // Restore the terminal on host panics. Plugin panics are caught by the
    // plugin host, so they only need a log record.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if in_plugin_call() {
            log::error!("Plugin panicked: {panic_info}");
            return;
        }
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let (width, height) = terminal::size().context("Cannot query terminal size")?;
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        bail!(
            "Terminal too small ({width}x{height}), at least {MIN_WIDTH}x{MIN_HEIGHT} is required"
        );
    }

    let config = Config::load().await?;
    let mut app = App::new(config);
    app.resize(width, height);
    app.load_plugins();

    if let Some(path) = env::args().nth(1) {
        app.open_path(PathBuf::from(path)).await;
    } else {
        log::info!("No file specified, starting with empty document");
    }

    enable_raw_mode().context("Failed to initialize terminal")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to configure terminal");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    app.shutdown();
    drop(app);
    restore_terminal()?;

    if let Err(err) = &res {
        log::error!("Application error: {err:#}");
        eprintln!("Error: {err:#}");
    }
    res
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.is_running() {
        if let Err(e) = terminal.draw(|f| ui::draw(f, app)) {
            log::error!("Terminal draw error: {e}");
        }

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Err(e) = app.handle_key_event(key).await {
                    log::error!("Key event handling error: {e:#}");
                    app.status.set_error(format!("Error: {e}"));
                }
            }
            Event::Resize(width, height) => {
                log::debug!("Terminal resized to {width}x{height}");
                app.resize(width, height);
            }
            _ => {}
        }
    }

    log::info!("Application loop ended");
    Ok(())
}

fn log_file_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("NOTEPAD_LOG_FILE") {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("com", "notepad", "notepad").map(|dirs| dirs.data_dir().join("notepad.log"))
}

/// Log to a file, since the terminal belongs to the editor.
fn init_logger() {
    let mut logger = env_logger::Builder::from_default_env();
    if env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("notepad", LevelFilter::Debug);
    }
    logger.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    let file = log_file_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        fs::OpenOptions::new().create(true).append(true).open(path).ok()
    });
    if let Some(file) = file {
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }
    logger.init();
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
