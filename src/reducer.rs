use rand::rngs::StdRng;
use rand::SeedableRng;
use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::duel::{draw_ids, DuelPhase, DuelState};
use crate::effect::Effect;
use crate::evolution::locate_chain;
use crate::navigation::{self, Neighbor};
use crate::state::{AppState, DetailState, DetailTab};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            if !state.catalog.is_empty() || state.page.is_loading() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(request_page(state))
        }
        Action::ScreenToggle => {
            state.screen = state.screen.toggle();
            DispatchResult::changed()
        }

        // ===== Catalog =====
        Action::CatalogLoadMore => {
            if state.page.is_loading() {
                return DispatchResult::unchanged();
            }
            state.message = None;
            DispatchResult::changed_with(request_page(state))
        }
        Action::CatalogPageDidLoad {
            offset,
            listed,
            entries,
        } => {
            if state.page.pending != Some(offset) {
                log::debug!("ignoring stale catalog page at offset {offset}");
                return DispatchResult::unchanged();
            }
            state.page.pending = None;
            state.page.loaded = Some(offset);
            let fetched = entries.len();
            let added = state.catalog.append_page(entries);
            if listed == 0 {
                state.message = Some("No more entries.".to_string());
            } else if fetched == 0 {
                log::warn!("all {listed} entries at offset {offset} failed to load");
                state.message = Some(format!("None of the {listed} entries on this page loaded."));
            }
            log::debug!("catalog page {offset}: {added} new entries");
            state.rebuild_visible();
            DispatchResult::changed()
        }
        Action::CatalogPageDidError { offset, error } => {
            if state.page.pending != Some(offset) {
                log::debug!("ignoring stale catalog error at offset {offset}");
                return DispatchResult::unchanged();
            }
            // The offset stays where it was so the next load retries the same page.
            state.page.pending = None;
            log::error!("catalog page at offset {offset} failed: {error}");
            state.message = Some(format!("Could not load entries: {error}"));
            DispatchResult::changed()
        }
        Action::SelectionMove(delta) => {
            if state.visible.is_empty() || state.detail.is_some() {
                return DispatchResult::unchanged();
            }
            let target = (state.selected as i64 + i64::from(delta))
                .clamp(0, state.visible.len() as i64 - 1) as usize;
            if state.set_selected_index(target) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        // ===== Search =====
        Action::SearchStart => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }
        Action::SearchInput(ch) => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.query.push(ch);
            state.selected = 0;
            state.rebuild_visible();
            DispatchResult::changed()
        }
        Action::SearchBackspace => {
            if !state.search.active || state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.selected = 0;
            state.rebuild_visible();
            DispatchResult::changed()
        }
        Action::SearchSubmit => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }
        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.rebuild_visible();
            DispatchResult::changed()
        }

        // ===== Detail =====
        Action::DetailOpen => {
            let Some(creature_id) = state.selected_entry().map(|entry| entry.creature.id) else {
                return DispatchResult::unchanged();
            };
            open_detail(state, creature_id, DetailTab::About)
        }
        Action::DetailClose => {
            if state.detail.take().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }
        Action::DetailNext | Action::DetailPrev => {
            let Some(detail) = state.detail.as_ref() else {
                return DispatchResult::unchanged();
            };
            let (species_id, tab) = (detail.species_id, detail.tab);
            let neighbor = if matches!(action, Action::DetailNext) {
                navigation::next(&state.catalog, species_id)
            } else {
                navigation::prev(&state.catalog, species_id)
            };
            match neighbor {
                Neighbor::Found(entry) => {
                    let creature_id = entry.creature.id;
                    open_detail(state, creature_id, tab)
                }
                Neighbor::Missing(missing) => {
                    state.message = Some(format!("#{missing} is not loaded yet"));
                    DispatchResult::changed()
                }
                Neighbor::NoPredecessor => DispatchResult::unchanged(),
            }
        }
        Action::DetailTabCycle(step) => {
            let Some(detail) = state.detail.as_mut() else {
                return DispatchResult::unchanged();
            };
            detail.tab = detail.tab.cycle(step);
            DispatchResult::changed()
        }

        // ===== Evolution =====
        Action::EvolutionDidResolve { creature_id, names } => {
            let Some(detail) = current_detail(state, creature_id) else {
                return DispatchResult::unchanged();
            };
            detail.evolution_names = names.clone();
            DispatchResult::changed_with(Effect::RenderEvolution { creature_id, names })
        }
        Action::EvolutionDidRender { creature_id, steps } => {
            let Some(detail) = current_detail(state, creature_id) else {
                return DispatchResult::unchanged();
            };
            detail.evolution = DataResource::Loaded(steps);
            DispatchResult::changed()
        }
        Action::EvolutionDidError { creature_id, error } => {
            let Some(detail) = current_detail(state, creature_id) else {
                return DispatchResult::unchanged();
            };
            log::error!("evolution of creature {creature_id} failed: {error}");
            detail.evolution = DataResource::Failed(error);
            DispatchResult::changed()
        }

        // ===== Duel =====
        Action::DuelStart => {
            state.match_id = state.match_id.wrapping_add(1);
            state.duel.begin_dealing(state.duel_settings.total_rounds);
            state.message = None;
            let settings = state.duel_settings;
            let mut rng = round_rng(state);
            let (player_ids, computer_ids) =
                draw_ids(&mut rng, settings.hand_size, settings.max_creature_id);
            log::info!("match {} dealing {player_ids:?} vs {computer_ids:?}", state.match_id);
            DispatchResult::changed_with_many(vec![
                Effect::CancelRoundPause,
                Effect::LoadHands {
                    match_id: state.match_id,
                    player_ids,
                    computer_ids,
                },
            ])
        }
        Action::DuelHandsDidLoad {
            match_id,
            player,
            computer,
        } => {
            if match_id != state.match_id || state.duel.phase != DuelPhase::Dealing {
                log::debug!("ignoring hands for stale match {match_id}");
                return DispatchResult::unchanged();
            }
            state.duel.deal(player, computer);
            if state.duel.phase == DuelPhase::MatchOver {
                log::warn!("match {} dealt without playable cards", state.match_id);
                state.message = Some("No cards could be dealt.".to_string());
                return DispatchResult::changed();
            }
            start_round(state);
            DispatchResult::changed()
        }
        Action::DuelSelect(index) => {
            if state.duel.phase != DuelPhase::AwaitingSelection {
                return DispatchResult::unchanged();
            }
            if let Err(err) = state.duel.select(index) {
                state.message = Some(err.to_string());
                return DispatchResult::changed();
            }
            state.message = None;
            DispatchResult::changed()
        }
        Action::DuelCompare => {
            if state.duel.phase != DuelPhase::AwaitingSelection {
                return DispatchResult::unchanged();
            }
            if state.duel.round.computer_selection.is_none() {
                state.message = Some("The computer has no cards left.".to_string());
                return DispatchResult::changed();
            }
            let Some(winner) = state.duel.compare() else {
                state.message = Some("Select a card first.".to_string());
                return DispatchResult::changed();
            };
            log::info!(
                "match {} round {}: {} ({}-{})",
                state.match_id,
                state.duel.total_rounds - state.duel.round.rounds_remaining,
                winner.message(),
                state.duel.round.player_score,
                state.duel.round.computer_score
            );
            if state.duel.phase == DuelPhase::MatchOver {
                let outcome = state.duel.final_outcome();
                log::info!("match {} over: {outcome:?}", state.match_id);
                state.message = Some(outcome.message().to_string());
                return DispatchResult::changed();
            }
            DispatchResult::changed_with(Effect::ScheduleNextRound {
                match_id: state.match_id,
                delay_ms: state.duel_settings.reveal_pause_ms,
            })
        }
        Action::DuelNextRound { match_id } => {
            if match_id != state.match_id || state.duel.phase != DuelPhase::CardsRevealed {
                log::debug!("ignoring round advance for stale match {match_id}");
                return DispatchResult::unchanged();
            }
            start_round(state);
            DispatchResult::changed()
        }
        Action::DuelReset => {
            state.match_id = state.match_id.wrapping_add(1);
            state.duel = DuelState::new(state.duel_settings.total_rounds);
            state.message = None;
            DispatchResult::changed_with(Effect::CancelRoundPause)
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn request_page(state: &mut AppState) -> Effect {
    let offset = state.page.next_offset();
    state.page.pending = Some(offset);
    Effect::LoadPage {
        offset,
        limit: state.page.limit,
    }
}

fn open_detail(state: &mut AppState, creature_id: u32, tab: DetailTab) -> DispatchResult<Effect> {
    let Some(entry) = state.catalog.find_by_id(creature_id) else {
        return DispatchResult::unchanged();
    };
    let species_id = entry.species.id;
    let chain = locate_chain(&state.catalog, creature_id);
    let (evolution, effect) = match chain {
        Ok(chain_url) => (
            DataResource::Loading,
            Some(Effect::LoadEvolution {
                creature_id,
                chain_url,
            }),
        ),
        Err(err) => {
            log::warn!("no evolution chain for creature {creature_id}: {err}");
            (DataResource::Failed(err.to_string()), None)
        }
    };
    state.detail = Some(DetailState {
        creature_id,
        species_id,
        tab,
        evolution_names: Vec::new(),
        evolution,
    });
    state.message = None;
    match effect {
        Some(effect) => DispatchResult::changed_with(effect),
        None => DispatchResult::changed(),
    }
}

fn current_detail(state: &mut AppState, creature_id: u32) -> Option<&mut DetailState> {
    match state.detail.as_mut() {
        Some(detail) if detail.creature_id == creature_id => Some(detail),
        _ => {
            log::debug!("ignoring evolution result for creature {creature_id}");
            None
        }
    }
}

fn round_rng(state: &mut AppState) -> StdRng {
    state.rng_seed = state
        .rng_seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1);
    StdRng::seed_from_u64(state.rng_seed)
}

fn start_round(state: &mut AppState) {
    let mut rng = round_rng(state);
    if state.duel.start_round(&mut rng) {
        return;
    }
    log::warn!(
        "computer hand exhausted with {} rounds remaining",
        state.duel.round.rounds_remaining
    );
    state.duel.phase = DuelPhase::MatchOver;
    state.message = Some("The computer has no cards left.".to_string());
}
