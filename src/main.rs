mod ai;
mod cli;
mod config;
mod filter;
mod models;
mod seed;
mod store;
mod timeline;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::ai::{AiQuery, AiResult, ContentGenerator, GeminiClient, Ticket};
use crate::cli::Cli;
use crate::store::{AppStore, StoreAction};
use crate::ui::{
    ai_modal::{
        handle_input as handle_ai_modal_input, render_ai_modal, AiModalAction, AiModalState,
    },
    dashboard::{
        handle_input as handle_dashboard_input, render_dashboard, DashboardAction, DashboardState,
    },
    project_detail::{
        handle_input as handle_detail_input, render_project_detail, DetailAction,
        ProjectDetailState,
    },
    project_wizard::{
        handle_input as handle_project_wizard_input, render_project_wizard, ProjectWizardAction,
        ProjectWizardState,
    },
};

const TICK: Duration = Duration::from_millis(100);

type AiOutcome = (Ticket, Result<AiResult, String>);

// Represents the current screen in the app
enum AppScreen {
    Dashboard,
    ProjectDetail(ProjectDetailState),
    ProjectWizard(ProjectWizardState),
}

// Main application state
struct AppState {
    store: AppStore,
    screen: AppScreen,
    dashboard_state: DashboardState,
    // Drawn over whichever screen is active
    ai_modal: Option<AiModalState>,
    generator: Arc<dyn ContentGenerator>,
    ai_tx: UnboundedSender<AiOutcome>,
    ai_rx: UnboundedReceiver<AiOutcome>,
}

impl AppState {
    fn new(store: AppStore, generator: Arc<dyn ContentGenerator>) -> Self {
        let (ai_tx, ai_rx) = mpsc::unbounded_channel();
        Self {
            store,
            screen: AppScreen::Dashboard,
            dashboard_state: DashboardState::new(),
            ai_modal: None,
            generator,
            ai_tx,
            ai_rx,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;
    let log_file = cli.log_file.clone().unwrap_or_else(|| config.log_file.clone());
    init_logging(&log_file)?;
    tracing::info!(log_file = %log_file, model = %config.gemini_model, "starting obra_crm");

    if config.api_key().is_none() {
        tracing::warn!("API_KEY is not set; AI tools will report failures");
    }

    let mut store = AppStore::seeded()?;
    let generator: Arc<dyn ContentGenerator> = Arc::new(GeminiClient::new(&config));

    if let Some(command) = cli.command {
        return cli::run(command, &mut store, generator.as_ref()).await;
    }

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(store, generator);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        tracing::error!(error = %err, "terminal UI stopped");
        println!("Error: {}", err);
    }

    println!("Thanks for using Obra CRM!");

    Ok(())
}

fn init_logging(path: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        drain_ai_outcomes(app_state);

        // Render current screen
        terminal.draw(|f| {
            match &mut app_state.screen {
                AppScreen::Dashboard => {
                    render_dashboard(f, &mut app_state.dashboard_state, &app_state.store);
                }
                AppScreen::ProjectDetail(state) => {
                    render_project_detail(f, state, &app_state.store);
                }
                AppScreen::ProjectWizard(state) => {
                    render_project_wizard(f, state);
                }
            }
            if let Some(modal) = &app_state.ai_modal {
                render_ai_modal(f, modal, app_state.store.ai().state());
            }
        })?;

        // Poll so AI responses are picked up while the user is idle
        if !event::poll(TICK)? {
            continue;
        }
        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        // Handle input for current screen
        let should_quit = if app_state.ai_modal.is_some() {
            handle_ai_modal(app_state, key)
        } else {
            match app_state.screen {
                AppScreen::Dashboard => handle_dashboard_screen(app_state, key),
                AppScreen::ProjectDetail(_) => handle_detail_screen(app_state, key),
                AppScreen::ProjectWizard(_) => handle_project_wizard_screen(app_state, key),
            }
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn drain_ai_outcomes(app_state: &mut AppState) {
    while let Ok((ticket, outcome)) = app_state.ai_rx.try_recv() {
        if app_state.store.ai_mut().complete(ticket, outcome) {
            tracing::info!(ticket, "AI request settled");
        }
    }
}

/// Fresh modal for `tool`, pre-filled from the selected project if any.
fn ai_modal_for(store: &AppStore, tool: ai::AiTool) -> AiModalState {
    AiModalState::new(tool, store.selected_project())
}

fn open_ai_modal(app_state: &mut AppState, tool: ai::AiTool) {
    app_state.store.ai_mut().close();
    app_state.ai_modal = Some(ai_modal_for(&app_state.store, tool));
}

fn submit_ai_query(app_state: &mut AppState, query: AiQuery) {
    let Some(ticket) = app_state.store.ai_mut().submit(query.tool()) else {
        return;
    };
    tracing::info!(ticket, tool = query.tool().title(), "AI request submitted");

    let generator = Arc::clone(&app_state.generator);
    let tx = app_state.ai_tx.clone();
    tokio::spawn(async move {
        let outcome = ai::run(generator.as_ref(), &query).await;
        // The receiver only goes away when the app is quitting
        let _ = tx.send((ticket, outcome));
    });
}

fn handle_ai_modal(app_state: &mut AppState, key: KeyEvent) -> bool {
    let pending = app_state.store.ai().is_pending();
    let Some(modal) = &mut app_state.ai_modal else {
        return false;
    };

    match handle_ai_modal_input(modal, pending, key) {
        Some(AiModalAction::Close) => {
            app_state.store.ai_mut().close();
            app_state.ai_modal = None;
        }
        Some(AiModalAction::Submit(query)) => submit_ai_query(app_state, query),
        None => {}
    }
    false
}

fn handle_dashboard_screen(app_state: &mut AppState, key: KeyEvent) -> bool {
    match handle_dashboard_input(&mut app_state.dashboard_state, &app_state.store, key) {
        Some(DashboardAction::Quit) => return true,
        Some(DashboardAction::OpenProject(project_id)) => {
            let select = StoreAction::SelectProject(Some(project_id.clone()));
            if let Err(e) = app_state.store.apply(select) {
                tracing::warn!(error = %e, "cannot open project");
                return false;
            }
            app_state.screen = AppScreen::ProjectDetail(ProjectDetailState::new(project_id));
        }
        Some(DashboardAction::NewProject) => {
            app_state.screen = AppScreen::ProjectWizard(ProjectWizardState::new(&app_state.store));
        }
        Some(DashboardAction::OpenAiTool(tool)) => open_ai_modal(app_state, tool),
        Some(DashboardAction::Update(action)) => {
            if let Err(e) = app_state.store.apply(action) {
                tracing::warn!(error = %e, "dashboard update rejected");
            }
            let visible = app_state.store.visible_projects().len();
            app_state.dashboard_state.sync(visible);
        }
        None => {}
    }
    false
}

fn handle_detail_screen(app_state: &mut AppState, key: KeyEvent) -> bool {
    match handle_detail_input(key) {
        Some(DetailAction::Back) => {
            // Clearing a selection cannot fail
            let _ = app_state.store.apply(StoreAction::SelectProject(None));
            app_state.screen = AppScreen::Dashboard;
        }
        Some(DetailAction::OpenAiTool(tool)) => open_ai_modal(app_state, tool),
        None => {}
    }
    false
}

fn handle_project_wizard_screen(app_state: &mut AppState, key: KeyEvent) -> bool {
    let AppScreen::ProjectWizard(state) = &mut app_state.screen else {
        return false;
    };

    match handle_project_wizard_input(state, key) {
        Some(ProjectWizardAction::Cancel) => {
            app_state.screen = AppScreen::Dashboard;
        }
        Some(ProjectWizardAction::Save(new_project)) => {
            match app_state.store.apply(StoreAction::AddProject(new_project)) {
                Ok(()) => {
                    let visible = app_state.store.visible_projects().len();
                    app_state.dashboard_state.sync(visible);
                    app_state.screen = AppScreen::Dashboard;
                }
                Err(e) => state.show_notice(e.to_string()),
            }
        }
        None => {}
    }
    false
}
