use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::catalog::Catalog;
use crate::config::{CatalogSettings, DuelSettings};
use crate::duel::DuelState;
use crate::navigation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub speed: u16,
    pub attack: u16,
    pub defense: u16,
    pub hp: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
    pub types: Vec<String>,
    pub stats: Stats,
}

impl Creature {
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStat {
    pub name: String,
    pub value: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub height: u16,
    pub weight: u16,
    pub base_stats: Vec<BaseStat>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub id: u32,
    pub name: String,
    pub color: String,
    pub evolution_chain_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityNote {
    pub name: String,
    pub short_effect: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub creature: Creature,
    pub species: SpeciesRecord,
    pub abilities: Vec<AbilityNote>,
    pub profile: Profile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionStep {
    pub name: String,
    pub artwork: Option<String>,
    /// A directional connector follows this step.
    pub connector: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Pokedex,
    Duel,
}

impl Screen {
    pub fn toggle(self) -> Self {
        match self {
            Screen::Pokedex => Screen::Duel,
            Screen::Duel => Screen::Pokedex,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailTab {
    #[default]
    About,
    Stats,
    Evolution,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [DetailTab::About, DetailTab::Stats, DetailTab::Evolution];

    pub fn label(self) -> &'static str {
        match self {
            DetailTab::About => "About",
            DetailTab::Stats => "Base Stats",
            DetailTab::Evolution => "Evolution",
        }
    }

    pub fn cycle(self, step: i16) -> Self {
        let len = Self::ALL.len() as i16;
        let current = Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0) as i16;
        let next = (current + step).rem_euclid(len);
        Self::ALL[next as usize]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// Pagination bookkeeping; the catalog itself knows nothing about offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub limit: usize,
    pub loaded: Option<usize>,
    pub pending: Option<usize>,
}

impl PageState {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            loaded: None,
            pending: None,
        }
    }

    pub fn next_offset(&self) -> usize {
        self.loaded.map_or(0, |offset| offset + self.limit)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct DetailState {
    pub creature_id: u32,
    pub species_id: u32,
    pub tab: DetailTab,
    pub evolution_names: Vec<String>,
    pub evolution: DataResource<Vec<EvolutionStep>>,
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub screen: Screen,
    pub catalog: Catalog,
    pub page: PageState,
    pub search: SearchState,
    pub visible: Vec<usize>,
    pub selected: usize,
    pub detail: Option<DetailState>,

    pub duel: DuelState,
    pub duel_settings: DuelSettings,
    /// Generation counter; async duel results from an older match are dropped.
    pub match_id: u64,
    pub rng_seed: u64,

    pub message: Option<String>,
}

impl AppState {
    pub fn new(catalog: CatalogSettings, duel: DuelSettings, rng_seed: u64) -> Self {
        Self {
            screen: Screen::Pokedex,
            catalog: Catalog::new(),
            page: PageState::new(catalog.page_size),
            search: SearchState::default(),
            visible: Vec::new(),
            selected: 0,
            detail: None,
            duel: DuelState::new(duel.total_rounds),
            duel_settings: duel,
            match_id: 0,
            rng_seed,
            message: None,
        }
    }

    pub fn selected_entry(&self) -> Option<&CatalogEntry> {
        self.visible
            .get(self.selected)
            .and_then(|index| self.catalog.get(*index))
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.visible.is_empty() {
            self.selected = 0;
            return false;
        }
        let bounded = index.min(self.visible.len() - 1);
        if bounded != self.selected {
            self.selected = bounded;
            return true;
        }
        false
    }

    pub fn rebuild_visible(&mut self) {
        self.visible = self.catalog.search(&self.search.query);
        if self.selected >= self.visible.len() {
            self.selected = 0;
        }
    }

    pub fn current_detail(&self) -> Option<&CatalogEntry> {
        let detail = self.detail.as_ref()?;
        self.catalog.find_by_id(detail.creature_id)
    }

    pub fn detail_has_prev(&self) -> bool {
        self.detail
            .as_ref()
            .map(|detail| navigation::has_predecessor(detail.species_id))
            .unwrap_or(false)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CatalogSettings::default(), DuelSettings::default(), 0)
    }
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_handles_empty_and_ascii() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("bulbasaur"), "Bulbasaur");
        assert_eq!(capitalize("mr-mime"), "Mr-mime");
    }

    #[test]
    fn detail_tabs_wrap_both_ways() {
        assert_eq!(DetailTab::About.cycle(1), DetailTab::Stats);
        assert_eq!(DetailTab::Evolution.cycle(1), DetailTab::About);
        assert_eq!(DetailTab::About.cycle(-1), DetailTab::Evolution);
    }

    #[test]
    fn page_state_advances_by_limit() {
        let mut page = PageState::new(20);
        assert_eq!(page.next_offset(), 0);
        page.loaded = Some(0);
        assert_eq!(page.next_offset(), 20);
        page.loaded = Some(40);
        assert_eq!(page.next_offset(), 60);
        assert!(!page.is_loading());
    }

    #[test]
    fn selection_is_clamped_to_visible_entries() {
        let mut state = AppState::default();
        assert!(!state.set_selected_index(3));
        state.visible = vec![0, 1, 2];
        assert!(state.set_selected_index(10));
        assert_eq!(state.selected, 2);
        assert!(!state.set_selected_index(2));
    }
}
