//! Keyed background tasks that report back as actions.

use std::sync::Arc;
use std::time::Duration;

use tui_dispatch::{TaskKey, TaskManager};

use crate::action::Action;
use crate::api::PokeSource;
use crate::catalog::fetch_page;
use crate::duel::fetch_hand;
use crate::effect::Effect;
use crate::evolution::{render, resolve_chain};

pub const PAGE_TASK: &str = "catalog_page";
pub const EVOLUTION_TASK: &str = "evolution";
pub const HANDS_TASK: &str = "duel_hands";
pub const ROUND_PAUSE_TASK: &str = "round_pause";

pub type Tasks = TaskManager<Action>;

/// Runs one reducer effect as a background task.
pub fn handle_effect(tasks: &mut Tasks, source: &Arc<dyn PokeSource>, effect: Effect) {
    match effect {
        Effect::LoadPage { offset, limit } => {
            let source = source.clone();
            tasks.spawn(PAGE_TASK, async move {
                match fetch_page(source, offset, limit).await {
                    Ok(page) => Action::CatalogPageDidLoad {
                        offset,
                        listed: page.listed,
                        entries: page.entries,
                    },
                    Err(err) => Action::CatalogPageDidError {
                        offset,
                        error: err.to_string(),
                    },
                }
            });
        }
        Effect::LoadEvolution {
            creature_id,
            chain_url,
        } => {
            let source = source.clone();
            tasks.spawn(EVOLUTION_TASK, async move {
                match resolve_chain(source.as_ref(), &chain_url).await {
                    Ok(names) => Action::EvolutionDidResolve { creature_id, names },
                    Err(err) => Action::EvolutionDidError {
                        creature_id,
                        error: err.to_string(),
                    },
                }
            });
        }
        Effect::RenderEvolution { creature_id, names } => {
            let source = source.clone();
            tasks.spawn(EVOLUTION_TASK, async move {
                let steps = render(source.as_ref(), &names).await;
                Action::EvolutionDidRender { creature_id, steps }
            });
        }
        Effect::LoadHands {
            match_id,
            player_ids,
            computer_ids,
        } => {
            let source = source.clone();
            tasks.spawn(HANDS_TASK, async move {
                let (player, computer) = tokio::join!(
                    fetch_hand(source.clone(), player_ids),
                    fetch_hand(source, computer_ids)
                );
                Action::DuelHandsDidLoad {
                    match_id,
                    player,
                    computer,
                }
            });
        }
        Effect::ScheduleNextRound { match_id, delay_ms } => {
            tasks.debounce(
                ROUND_PAUSE_TASK,
                Duration::from_millis(delay_ms),
                async move { Action::DuelNextRound { match_id } },
            );
        }
        Effect::CancelRoundPause => {
            tasks.cancel(&TaskKey::new(ROUND_PAUSE_TASK));
            tasks.cancel(&TaskKey::new(HANDS_TASK));
        }
    }
}
