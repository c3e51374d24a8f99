mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppEvent, AppModel, UpdateEnv};
use crate::cli::CliInvocation;
use crate::infra::{
    AvatarPool, Config, ConfigOverrides, HttpSessionsApi, LogTarget, SessionsApi, init_logging,
};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::size as terminal_size;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use rand_core::OsRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::mpsc::{Sender, channel};
use std::time::Duration;
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),

    #[error(transparent)]
    Logging(#[from] crate::infra::LoggingError),

    #[error(transparent)]
    LogPath(#[from] crate::infra::ResolveLogPathError),
}

fn main() {
    if let Err(error) = run_main() {
        tracing::error!(%error, "exiting with error");
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    // Must run before any thread is spawned; `time` refuses to read the local
    // offset from a multi-threaded process on Unix.
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui { overrides } => {
            let config = load_config(&overrides);
            init_logging(&LogTarget::File(config.resolve_log_path()?))?;
            tracing::info!(api_url = %config.api_url, "starting session viewer");
            Ok(run_tui(&config, local_offset)?)
        }
        CliInvocation::Command { command, overrides } => {
            let config = load_config(&overrides);
            init_logging(&LogTarget::Stderr)?;
            let api = HttpSessionsApi::new(config.api_url.clone(), config.timeout);
            let now = OffsetDateTime::now_utc().to_offset(local_offset);
            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            crate::cli::run(command, &api, now, local_offset, &mut out)?;
            Ok(())
        }
    }
}

fn load_config(overrides: &ConfigOverrides) -> Config {
    Config::from_env().with_overrides(overrides)
}

fn print_help() {
    let text = format!(
        "{name} - browse chat sessions from the admin backend\n\nUSAGE:\n  {name} [FLAGS]                                 Start the TUI\n  {name} sessions [--page N] [--per-page N] [FLAGS]  Print one page of sessions\n  {name} show <ID> [FLAGS]                       Print the messages of one session\n  {name} --help | --version\n\nFLAGS:\n  --api-url URL       Sessions endpoint (default: {api})\n  --assets URL        Base URL for profile images (default: empty)\n  --log-file PATH     TUI log file (default: <cache dir>/{name}/{name}.log)\n  --cell-width N      Pixels per terminal column for the layout breakpoint (default: 8)\n  --timeout-secs N    HTTP timeout (default: none)\n\nOUTPUT:\n  sessions: id<TAB>name<TAB>age<TAB>message_count\n  show:     time<TAB>actor<TAB>content\n\nENV:\n  CHATVIEW_API_URL    Same as --api-url\n  CHATVIEW_ASSETS     Same as --assets\n  CHATVIEW_LOG_FILE   Same as --log-file\n  CHATVIEW_LOG        Log filter (default: chatview=info)\n",
        name = env!("CARGO_PKG_NAME"),
        api = crate::infra::DEFAULT_API_URL,
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn run_tui(config: &Config, local_offset: UtcOffset) -> Result<(), crate::app::AppError> {
    let api: Arc<dyn SessionsApi> =
        Arc::new(HttpSessionsApi::new(config.api_url.clone(), config.timeout));
    let avatars = AvatarPool::from_assets_base(&config.assets_base);

    let (width, height) = terminal_size()?;
    let mut model = AppModel::new(config.cell_width_px, local_offset).with_terminal_size(width, height);

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut model, &api, &avatars);
    let restore = restore_terminal(&mut terminal);
    result?;
    restore?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, app::AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let _ = stdout.execute(EnableBracketedPaste);
    let _ = stdout.execute(EnableMouseCapture);
    let keyboard_flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
    let _ = stdout.execute(PushKeyboardEnhancementFlags(keyboard_flags));
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), app::AppError> {
    disable_raw_mode()?;
    let _ = execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        PopKeyboardEnhancementFlags
    );
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    api: &Arc<dyn SessionsApi>,
    avatars: &AvatarPool,
) -> Result<(), app::AppError> {
    let (tx, rx) = channel::<AppEvent>();
    let mut rng = OsRng;

    let (next, command) = app::init(model.clone());
    *model = next;
    if execute_command(command, api, &tx) {
        return Ok(());
    }

    loop {
        while let Ok(loaded) = rx.try_recv() {
            let (next, command) = dispatch(model, loaded, avatars, &mut rng);
            *model = next;
            if execute_command(command, api, &tx) {
                return Ok(());
            }
        }

        ui::clamp_scroll_state(model);
        terminal.draw(|frame| ui::render(frame, model, avatars))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let app_event = match event::read()? {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                AppEvent::Key(key)
            }
            Event::Paste(text) => AppEvent::Paste(text),
            Event::Mouse(mouse) => AppEvent::Mouse(mouse),
            Event::Resize(width, height) => AppEvent::Resize { width, height },
            _ => continue,
        };

        let (next, command) = dispatch(model, app_event, avatars, &mut rng);
        *model = next;
        if execute_command(command, api, &tx) {
            return Ok(());
        }
    }
}

fn dispatch(
    model: &AppModel,
    event: AppEvent,
    avatars: &AvatarPool,
    rng: &mut OsRng,
) -> (AppModel, AppCommand) {
    let mut env = UpdateEnv {
        avatars,
        rng,
        now: OffsetDateTime::now_utc().to_offset(model.local_offset),
    };
    app::update(model.clone(), event, &mut env)
}

/// Starts the work `command` asks for. Returns `true` when the app should quit.
fn execute_command(command: AppCommand, api: &Arc<dyn SessionsApi>, tx: &Sender<AppEvent>) -> bool {
    match command {
        AppCommand::None => false,
        AppCommand::Quit => true,
        AppCommand::FetchPage(request) => {
            let api = Arc::clone(api);
            let tx = tx.clone();
            std::thread::spawn(move || {
                let result = api.fetch_page(request.page, request.per_page);
                let _ = tx.send(AppEvent::PageLoaded {
                    page: request.page,
                    result,
                });
            });
            false
        }
        AppCommand::FetchDetail { id } => {
            let api = Arc::clone(api);
            let tx = tx.clone();
            std::thread::spawn(move || {
                let result = api.find_session(id);
                let _ = tx.send(AppEvent::SessionLoaded { id, result });
            });
            false
        }
    }
}
