// ============================================================================
// Cyberquotes - Point d'entrée
// ============================================================================
// Dashboard TUI : cotations, graphiques et news pour une liste de tickers.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : réglages → passe éventuelle → rendu → entrée clavier
// 3. Async dans sync : le runtime tokio exécute chaque passe avec block_on
// 4. Restauration du terminal même en cas d'erreur
//
// Une passe tourne à la fois, dans la boucle : pas de thread de fond, pas
// de fetch parallèle entre tickers.
// ============================================================================

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use cyberquotes::api::{FinnhubClient, YahooClient};
use cyberquotes::app::{App, InputTarget, REFRESH_STEP_SECS};
use cyberquotes::cache::SystemClock;
use cyberquotes::config::{Cli, Settings};
use cyberquotes::pipeline::{run_pass, Session};
use cyberquotes::refresh::RefreshState;
use cyberquotes::ui::{events::Event, render, EventHandler};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : les logs partent
// dans un fichier à rotation quotidienne.
// ============================================================================

/// Répertoire des logs : --log-dir, sinon le dossier de données local
/// (~/.local/share/cyberquotes/logs sur Linux), sinon ./logs
fn resolve_log_dir(requested: Option<&Path>) -> PathBuf {
    requested
        .map(Path::to_path_buf)
        .or_else(|| dirs::data_local_dir().map(|d| d.join("cyberquotes").join("logs")))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer fmt : formate et écrit dans le fichier
/// - EnvFilter : RUST_LOG, sinon debug pour cyberquotes et info ailleurs
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/cyberquotes/logs/cyberquotes.log.*
/// RUST_LOG=cyberquotes=trace cyberquotes
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Failed to create the log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "cyberquotes.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cyberquotes=debug,info".into()),
        )
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    info!(log_dir = %log_dir.display(), "Logging initialised");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Si le logging échoue, on le signale et on continue sans
    let log_dir = resolve_log_dir(cli.log_dir.as_deref());
    if let Err(e) = init_logging(&log_dir) {
        eprintln!("Warning: failed to initialise logging: {:#}", e);
        eprintln!("Continuing without logging...");
    }

    let settings = Settings::from(&cli);
    info!(
        tickers = %settings.tickers_input,
        window = %settings.window,
        refresh_secs = settings.refresh_interval.secs(),
        news = settings.has_news_key(),
        "Cyberquotes starting up"
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create the tokio runtime")?;
    let market = YahooClient::new(settings.market_timeout)?;
    let news = FinnhubClient::new()?;
    let mut session = Session::new(
        Box::new(market),
        Box::new(news),
        Arc::new(SystemClock),
        settings.refresh_interval,
    );
    let mut app = App::new(settings);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &mut session, &runtime, &EventHandler::new());

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }
    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   1. le contrôleur de rafraîchissement décide si l'intervalle est écoulé
//   2. si une passe est demandée, elle tourne jusqu'au bout (block_on)
//   3. rendu
//   4. lecture d'une touche (ou Tick après 250 ms)
// ============================================================================

fn run(
    terminal: &mut Tui,
    app: &mut App,
    session: &mut Session,
    runtime: &tokio::runtime::Runtime,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        session.refresh.set_interval(app.settings.refresh_interval);

        if session.refresh.on_render_pass(session.now()) == RefreshState::Due {
            info!("Refresh interval elapsed, starting a new pass");
            app.request_pass();
        }

        if app.take_pass_request() {
            app.start_loading(Some(format!("Loading {}...", app.settings.tickers_input)));
            terminal.draw(|frame| render(frame, app))?;

            let report = runtime.block_on(run_pass(session, &app.settings));
            app.apply_report(report);
            app.stop_loading();
        }

        app.countdown_secs = session
            .refresh
            .remaining(session.now())
            .map(|d| d.num_seconds());
        terminal.draw(|frame| render(frame, app))?;

        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - En mode saisie, toutes les touches vont au buffer (même 'q')
/// - Sur le dashboard, chaque raccourci a son arm
fn handle_event(app: &mut App, event: Event) {
    use cyberquotes::ui::events::{
        get_char_from_event, is_api_key_event, is_backspace_event, is_dedupe_toggle_event,
        is_down_event, is_edit_tickers_event, is_enter_event, is_escape_event,
        is_faster_refresh_event, is_force_refresh_event, is_next_window_event,
        is_previous_window_event, is_quit_event, is_slower_refresh_event, is_up_event,
    };

    // ========================================
    // Input Mode : saisie tickers / clé API
    // ========================================
    if app.is_in_input_mode() {
        match event {
            Event::Key(_) if is_escape_event(&event) => {
                info!("User cancelled input");
                app.cancel_input();
            }
            Event::Key(_) if is_enter_event(&event) => {
                let target = app.input_target;
                app.submit_input();
                match target {
                    InputTarget::Tickers => {
                        info!(tickers = %app.settings.tickers_input, "User updated ticker list")
                    }
                    InputTarget::ApiKey => {
                        info!(set = app.settings.has_news_key(), "User updated news API key")
                    }
                }
            }
            Event::Key(_) if is_backspace_event(&event) => app.backspace(),
            Event::Key(_) => {
                if let Some(c) = get_char_from_event(&event) {
                    app.append_char(c);
                }
            }
            Event::Tick => {}
        }
        return;
    }

    // ========================================
    // Dashboard
    // ========================================
    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Two-step : première pression = confirmation, deuxième = quit
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_up_event(&event) => {
            app.cancel_quit();
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) => {
            app.cancel_quit();
            app.navigate_down();
        }

        Event::Key(_) if is_next_window_event(&event) => {
            app.cancel_quit();
            app.next_window();
            info!(window = %app.settings.window, "User changed to next window");
        }
        Event::Key(_) if is_previous_window_event(&event) => {
            app.cancel_quit();
            app.previous_window();
            info!(window = %app.settings.window, "User changed to previous window");
        }

        Event::Key(_) if is_edit_tickers_event(&event) => {
            app.cancel_quit();
            app.start_input(InputTarget::Tickers);
        }
        Event::Key(_) if is_api_key_event(&event) => {
            app.cancel_quit();
            app.start_input(InputTarget::ApiKey);
        }

        Event::Key(_) if is_slower_refresh_event(&event) => {
            app.cancel_quit();
            app.step_refresh(REFRESH_STEP_SECS);
        }
        Event::Key(_) if is_faster_refresh_event(&event) => {
            app.cancel_quit();
            app.step_refresh(-REFRESH_STEP_SECS);
        }

        Event::Key(_) if is_force_refresh_event(&event) => {
            app.cancel_quit();
            info!("User forced a refresh");
            app.request_pass();
        }

        Event::Key(_) if is_dedupe_toggle_event(&event) => {
            app.cancel_quit();
            app.toggle_dedupe();
            info!(dedupe = app.settings.ticker_options.dedupe, "User toggled duplicate filtering");
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation de quit
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Raw mode + alternate screen
fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create the terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
