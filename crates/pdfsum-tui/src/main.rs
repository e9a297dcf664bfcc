use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pdfsum_core::{Config, PdfBackend};
use pdfsum_pdf::LopdfBackend;

mod action;
mod app;
mod backend;
mod input;
mod theme;
mod tui_event;
mod view;

use app::App;
use tui_event::BackendCommand;

const DEFAULT_FPS: u32 = 10;

/// pdfsum: extract the text of a PDF and summarize it, in the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// PDF file to open on startup
    pdf_path: Option<PathBuf>,

    /// Chat-completion model (overrides PDFSUM_MODEL and the config file)
    #[arg(long)]
    model: Option<String>,

    /// Summary relay URL; when set, no API key is used by this process
    #[arg(long)]
    relay_url: Option<String>,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging();

    if let Some(path) = &args.pdf_path
        && !path.exists()
    {
        anyhow::bail!("PDF file not found: {}", path.display());
    }

    // Resolve config from CLI flags > env vars > config file > defaults
    let file_config = pdfsum_core::config_file::load_config();
    let mut config = Config::resolve(&file_config, |key| std::env::var(key).ok());
    if let Some(model) = args.model.filter(|m| !m.trim().is_empty()) {
        config.model = model;
    }
    if let Some(url) = args.relay_url.filter(|u| !u.trim().is_empty()) {
        config.relay_url = Some(url);
    }
    tracing::info!(?config, "starting pdfsum");

    let display = file_config.display.unwrap_or_default();
    let theme_name = args
        .theme
        .or(display.theme)
        .unwrap_or_else(|| "hacker".to_string());
    let fps = display.fps.filter(|f| *f > 0).unwrap_or(DEFAULT_FPS);
    let tick_rate = Duration::from_millis(1000 / u64::from(fps));

    let pdf: Arc<dyn PdfBackend> = Arc::new(LopdfBackend::new());
    let summarizer = pdfsum_core::build_summarizer(&config);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    // Install panic hook that restores terminal before printing panic.
    // Panics on worker threads surface as failed extractions or summaries,
    // so the terminal stays as it is and the panic goes to the log.
    let ui_thread = std::thread::current().id();
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if !is_ui_thread(ui_thread) {
            tracing::error!(panic = %panic_info, "worker thread panicked");
            return;
        }
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        original_hook(panic_info);
    }));

    let backend_terminal = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_terminal)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let mut app = App::new(theme::Theme::by_name(&theme_name));

    // Backend command channel: one task per command, results come back tagged
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<BackendCommand>();
    let cancel = CancellationToken::new();

    app.backend_cmd_tx = Some(cmd_tx);

    let cancel_for_backend = cancel.clone();
    tokio::spawn(async move {
        loop {
            let cmd = tokio::select! {
                _ = cancel_for_backend.cancelled() => break,
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => cmd,
                    None => break,
                },
            };
            let tx = event_tx.clone();
            match cmd {
                BackendCommand::Extract { generation, path } => {
                    tokio::spawn(backend::run_extraction(pdf.clone(), generation, path, tx));
                }
                BackendCommand::Summarize { generation, text } => {
                    tracing::info!(generation, summarizer = summarizer.name(), "summarizing");
                    tokio::spawn(backend::run_summary(
                        summarizer.clone(),
                        generation,
                        text,
                        tx,
                    ));
                }
            }
        }
    });

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    if let Some(path) = args.pdf_path {
        app.open_file(path);
    }

    // Main event loop
    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            Some(backend_event) = event_rx.recv() => {
                app.handle_backend_event(backend_event);
                // Drain any additional queued backend events
                while let Ok(evt) = event_rx.try_recv() {
                    app.handle_backend_event(evt);
                }
            }
            // Terminal input events
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    // Dragging a file onto the terminal pastes its path
                    if let Event::Paste(pasted) = &evt {
                        app.open_dropped(pasted);
                    } else {
                        app.update(input::map_event(&evt));
                    }
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit || cancel.is_cancelled() {
            cancel.cancel();
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;

    tracing::info!("pdfsum exiting");
    Ok(())
}

/// Whether the current thread is the one running the UI loop.
fn is_ui_thread(ui_thread: ThreadId) -> bool {
    std::thread::current().id() == ui_thread
}

/// Send logs to a daily file under `<data_dir>/pdfsum/logs`; the terminal
/// belongs to the UI. Returns the guard that flushes the writer on drop.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = dirs::data_dir()?.join("pdfsum").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;

    let appender = tracing_appender::rolling::daily(log_dir, "pdfsum.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
