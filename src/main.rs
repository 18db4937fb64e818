use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tui_dispatch::EffectStore;

use pokedeck::action::Action;
use pokedeck::api::{HttpSource, PokeSource};
use pokedeck::config::{AppConfig, Args};
use pokedeck::effect::Effect;
use pokedeck::reducer::reducer;
use pokedeck::state::AppState;
use pokedeck::tasks::{handle_effect, Tasks};
use pokedeck::{logger, ui};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

type Store = EffectStore<AppState, Action, Effect>;

#[tokio::main]
async fn main() -> io::Result<()> {
    let config = AppConfig::from(Args::parse());
    logger::init(&config.log_file, config.log_level)
        .map_err(|err| io::Error::other(err.to_string()))?;
    log::info!(
        "starting against {} (seed {})",
        config.api_base,
        config.seed
    );

    let source: Arc<dyn PokeSource> = Arc::new(HttpSource::new(&config.api_base));
    let state = AppState::new(config.catalog, config.duel, config.seed);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, state, source);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        log::error!("terminal loop failed: {err}");
    }
    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: AppState,
    source: Arc<dyn PokeSource>,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut tasks = Tasks::new(tx);
    let mut store = EffectStore::new(state, reducer);
    dispatch_action(&mut store, &mut tasks, &source, Action::Init);

    loop {
        drain_results(&mut store, &mut tasks, &source, &mut rx);
        terminal.draw(|frame| ui::render(frame, frame.area(), store.state()))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        let Some(action) = ui::handle_key(key, store.state()) else {
            continue;
        };
        if action == Action::Quit {
            break;
        }
        dispatch_action(&mut store, &mut tasks, &source, action);
    }

    tasks.cancel_all();
    Ok(())
}

fn drain_results(
    store: &mut Store,
    tasks: &mut Tasks,
    source: &Arc<dyn PokeSource>,
    rx: &mut UnboundedReceiver<Action>,
) {
    while let Ok(action) = rx.try_recv() {
        dispatch_action(store, tasks, source, action);
    }
}

fn dispatch_action(
    store: &mut Store,
    tasks: &mut Tasks,
    source: &Arc<dyn PokeSource>,
    action: Action,
) {
    log::trace!("dispatch {action:?}");
    let result = store.dispatch(action);
    for effect in result.effects {
        handle_effect(tasks, source, effect);
    }
}
