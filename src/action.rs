use serde::{Deserialize, Serialize};

use crate::state::{CatalogEntry, Creature, EvolutionStep};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    ScreenToggle,

    // Catalog pagination
    CatalogLoadMore,
    CatalogPageDidLoad {
        offset: usize,
        listed: usize,
        entries: Vec<CatalogEntry>,
    },
    CatalogPageDidError {
        offset: usize,
        error: String,
    },
    SelectionMove(i16),

    // Search
    SearchStart,
    SearchInput(char),
    SearchBackspace,
    SearchSubmit,
    SearchCancel,

    // Detail panel
    DetailOpen,
    DetailClose,
    DetailNext,
    DetailPrev,
    DetailTabCycle(i16),

    // Evolution results, tagged with the creature they were requested for
    EvolutionDidResolve {
        creature_id: u32,
        names: Vec<String>,
    },
    EvolutionDidRender {
        creature_id: u32,
        steps: Vec<EvolutionStep>,
    },
    EvolutionDidError {
        creature_id: u32,
        error: String,
    },

    // Duel
    DuelStart,
    DuelHandsDidLoad {
        match_id: u64,
        player: Vec<Creature>,
        computer: Vec<Creature>,
    },
    DuelSelect(usize),
    DuelCompare,
    DuelNextRound {
        match_id: u64,
    },
    DuelReset,

    Quit,
}
