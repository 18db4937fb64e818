//! Card duel: two disjoint random hands, one hidden computer card and one category per round.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::api::{join_ordered, PokeSource};
use crate::error::{DexError, DexResult};
use crate::state::{Creature, Stats};

const HAND_CONCURRENCY: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Attack,
    Defense,
    Speed,
    Hp,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Attack,
        Category::Defense,
        Category::Speed,
        Category::Hp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Attack => "attack",
            Category::Defense => "defense",
            Category::Speed => "speed",
            Category::Hp => "hp",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl Stats {
    pub fn get(&self, category: Category) -> u16 {
        match category {
            Category::Attack => self.attack,
            Category::Defense => self.defense,
            Category::Speed => self.speed,
            Category::Hp => self.hp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player,
    Computer,
    Draw,
}

impl Winner {
    pub fn message(self) -> &'static str {
        match self {
            Winner::Player => "Player win",
            Winner::Computer => "Computer win",
            Winner::Draw => "Draw",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    PlayerWin,
    ComputerWin,
    Tie,
}

impl Outcome {
    pub fn message(self) -> &'static str {
        match self {
            Outcome::PlayerWin => "You win! Congratulations",
            Outcome::ComputerWin => "Computer wins!",
            Outcome::Tie => "Undecided!",
        }
    }
}

pub type Hand = Vec<Creature>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundDraw {
    pub hidden: Creature,
    pub category: Category,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundState {
    pub category: Category,
    pub player_selection: Option<Creature>,
    pub computer_selection: Option<Creature>,
    pub rounds_remaining: u16,
    pub player_score: u16,
    pub computer_score: u16,
}

impl RoundState {
    pub fn new(total_rounds: u16) -> Self {
        Self {
            category: Category::Attack,
            player_selection: None,
            computer_selection: None,
            rounds_remaining: total_rounds,
            player_score: 0,
            computer_score: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelPhase {
    #[default]
    Idle,
    Dealing,
    AwaitingSelection,
    CardsRevealed,
    MatchOver,
}

/// The two cards and the verdict of the last compared round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundReport {
    pub player_card: Creature,
    pub computer_card: Creature,
    pub category: Category,
    pub winner: Winner,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuelState {
    pub phase: DuelPhase,
    pub player_hand: Hand,
    pub computer_hand: Hand,
    pub round: RoundState,
    pub total_rounds: u16,
    pub draws: u16,
    pub last_round: Option<RoundReport>,
}

impl DuelState {
    pub fn new(total_rounds: u16) -> Self {
        Self {
            phase: DuelPhase::Idle,
            player_hand: Vec::new(),
            computer_hand: Vec::new(),
            round: RoundState::new(total_rounds),
            total_rounds,
            draws: 0,
            last_round: None,
        }
    }

    /// Clears scores and hands and marks a match of `total_rounds` as dealing.
    pub fn begin_dealing(&mut self, total_rounds: u16) {
        *self = Self::new(total_rounds);
        self.phase = DuelPhase::Dealing;
    }

    /// Hands out both hands. A match never runs longer than the shorter hand allows; with an
    /// empty hand it is over at once.
    pub fn deal(&mut self, player: Hand, computer: Hand) {
        let playable = player.len().min(computer.len());
        let rounds = u16::try_from(playable).map_or(self.total_rounds, |n| n.min(self.total_rounds));
        if rounds < self.total_rounds {
            log::warn!(
                "short deal: player {} cards, computer {} cards, match cut to {rounds} of {} rounds",
                player.len(),
                computer.len(),
                self.total_rounds
            );
            self.total_rounds = rounds;
        }
        self.player_hand = player;
        self.computer_hand = computer;
        self.round = RoundState::new(self.total_rounds);
        self.draws = 0;
        self.last_round = None;
        self.phase = if self.is_match_over() {
            DuelPhase::MatchOver
        } else {
            DuelPhase::AwaitingSelection
        };
    }

    /// Draws the next hidden card and category. Returns false when the computer has no
    /// cards left.
    pub fn start_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.round.player_selection = None;
        match begin_round(&mut self.computer_hand, rng) {
            Some(draw) => {
                self.round.category = draw.category;
                self.round.computer_selection = Some(draw.hidden);
                self.phase = DuelPhase::AwaitingSelection;
                true
            }
            None => {
                self.round.computer_selection = None;
                false
            }
        }
    }

    pub fn select(&mut self, index: usize) -> DexResult<()> {
        let card = select_player_card(&self.player_hand, index)?.clone();
        self.round.player_selection = Some(card);
        Ok(())
    }

    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.round.player_selection.as_ref()?;
        self.player_hand.iter().position(|card| card.id == selected.id)
    }

    /// Compares the selected card against the hidden one and books the result.
    pub fn compare(&mut self) -> Option<Winner> {
        let player_card = self.round.player_selection.clone()?;
        let computer_card = self.round.computer_selection.clone()?;
        let category = self.round.category;
        let winner = resolve_round(&player_card, &computer_card, category);
        self.apply_result(winner);
        self.last_round = Some(RoundReport {
            player_card,
            computer_card,
            category,
            winner,
        });
        self.phase = if self.is_match_over() {
            DuelPhase::MatchOver
        } else {
            DuelPhase::CardsRevealed
        };
        Some(winner)
    }

    pub fn apply_result(&mut self, winner: Winner) {
        if self.is_match_over() {
            log::debug!("round result after the last round ignored");
            return;
        }
        match winner {
            Winner::Player => self.round.player_score += 1,
            Winner::Computer => self.round.computer_score += 1,
            Winner::Draw => self.draws += 1,
        }
        self.round.rounds_remaining -= 1;
        if let Some(index) = self.selected_index() {
            self.player_hand.remove(index);
        }
        self.round.player_selection = None;
    }

    pub fn is_match_over(&self) -> bool {
        self.round.rounds_remaining == 0
    }

    pub fn final_outcome(&self) -> Outcome {
        use std::cmp::Ordering;

        match self.round.player_score.cmp(&self.round.computer_score) {
            Ordering::Greater => Outcome::PlayerWin,
            Ordering::Less => Outcome::ComputerWin,
            Ordering::Equal => Outcome::Tie,
        }
    }

    /// One-based number of the round being played.
    pub fn round_number(&self) -> u16 {
        (self.total_rounds - self.round.rounds_remaining + 1).min(self.total_rounds)
    }
}

/// Samples `2 * hand_size` distinct ids from `1..=max_id`; the first half goes to the player.
pub fn draw_ids<R: Rng + ?Sized>(
    rng: &mut R,
    hand_size: usize,
    max_id: u32,
) -> (Vec<u32>, Vec<u32>) {
    let pool = max_id as usize;
    let wanted = hand_size.saturating_mul(2).min(pool);
    let ids: Vec<u32> = rand::seq::index::sample(rng, pool, wanted)
        .into_iter()
        .map(|index| index as u32 + 1)
        .collect();
    let (player, computer) = ids.split_at(hand_size.min(ids.len()));
    (player.to_vec(), computer.to_vec())
}

/// Fetches the creatures for `ids`, keeping their order. Failed fetches are left out.
pub async fn fetch_hand(source: Arc<dyn PokeSource>, ids: Vec<u32>) -> Hand {
    let results = join_ordered(ids.clone(), HAND_CONCURRENCY, |id| {
        let source = source.clone();
        async move { source.fetch_creature(&id.to_string()).await }
    })
    .await;

    results
        .into_iter()
        .zip(ids)
        .filter_map(|(result, id)| match result {
            Ok(detail) => Some(detail.creature),
            Err(err) => {
                log::warn!("creature {id} left out of the hand: {err}");
                None
            }
        })
        .collect()
}

pub async fn start_match<R: Rng + ?Sized>(
    source: Arc<dyn PokeSource>,
    rng: &mut R,
    hand_size: usize,
    max_id: u32,
) -> (Hand, Hand) {
    let (player_ids, computer_ids) = draw_ids(rng, hand_size, max_id);
    tokio::join!(
        fetch_hand(source.clone(), player_ids),
        fetch_hand(source, computer_ids)
    )
}

/// Takes one random card out of the computer's hand and picks the category for the round.
pub fn begin_round<R: Rng + ?Sized>(computer_hand: &mut Hand, rng: &mut R) -> Option<RoundDraw> {
    if computer_hand.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..computer_hand.len());
    let hidden = computer_hand.remove(index);
    let category = Category::random(rng);
    Some(RoundDraw { hidden, category })
}

pub fn select_player_card(hand: &Hand, index: usize) -> DexResult<&Creature> {
    hand.get(index).ok_or(DexError::InvalidSelection {
        index,
        len: hand.len(),
    })
}

pub fn resolve_round(selected: &Creature, hidden: &Creature, category: Category) -> Winner {
    use std::cmp::Ordering;

    match selected.stats.get(category).cmp(&hidden.stats.get(category)) {
        Ordering::Greater => Winner::Player,
        Ordering::Less => Winner::Computer,
        Ordering::Equal => Winner::Draw,
    }
}
