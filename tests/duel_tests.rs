mod support;

use std::collections::HashSet;
use std::sync::Arc;

use pokedeck::api::PokeSource;
use pokedeck::duel::{
    fetch_hand, resolve_round, start_match, Category, DuelPhase, DuelState, Outcome, Winner,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use support::{creature, MockSource};

fn roster(count: u32) -> MockSource {
    (1..=count).fold(MockSource::new(), |source, id| {
        source.with_creature(id, &format!("mon-{id}"), (id * 7 % 120) as u16, &[], None)
    })
}

#[tokio::test]
async fn match_deals_two_disjoint_hands() {
    let source: Arc<dyn PokeSource> = Arc::new(roster(30));
    let mut rng = StdRng::seed_from_u64(2024);

    let (player, computer) = start_match(source, &mut rng, 6, 30).await;

    assert_eq!(player.len(), 6);
    assert_eq!(computer.len(), 6);
    let ids: HashSet<u32> = player
        .iter()
        .chain(computer.iter())
        .map(|card| card.id)
        .collect();
    assert_eq!(ids.len(), 12);
}

#[tokio::test]
async fn failed_creature_is_left_out_of_the_hand() {
    let source: Arc<dyn PokeSource> = Arc::new(roster(6).failing("3"));

    let hand = fetch_hand(source, vec![5, 3, 1]).await;
    let ids: Vec<u32> = hand.iter().map(|card| card.id).collect();
    assert_eq!(ids, vec![5, 1]);
}

#[test]
fn stronger_hand_sweeps_the_match() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut duel = DuelState::new(6);
    duel.deal(
        (1..=6).map(|id| creature(id, "strong", 120)).collect(),
        (7..=12).map(|id| creature(id, "weak", 30)).collect(),
    );

    for round in 1..=6u16 {
        assert_eq!(duel.round_number(), round);
        assert!(duel.start_round(&mut rng));
        duel.round.category = Category::Attack;
        duel.select(0).expect("card in hand");
        assert_eq!(duel.compare(), Some(Winner::Player));
    }

    assert!(duel.is_match_over());
    assert_eq!(duel.phase, DuelPhase::MatchOver);
    assert_eq!((duel.round.player_score, duel.round.computer_score), (6, 0));
    assert!(duel.player_hand.is_empty());
    assert!(duel.computer_hand.is_empty());
    assert_eq!(duel.final_outcome(), Outcome::PlayerWin);
    assert_eq!(duel.final_outcome().message(), "You win! Congratulations");
}

#[test]
fn short_deal_cuts_the_match_to_the_smaller_hand() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut duel = DuelState::new(3);
    duel.deal(
        (1..=3).map(|id| creature(id, "p", 50)).collect(),
        vec![creature(9, "c", 40)],
    );
    assert_eq!(duel.total_rounds, 1);
    assert_eq!(duel.round.rounds_remaining, 1);

    assert!(duel.start_round(&mut rng));
    duel.select(0).expect("card");
    assert_eq!(duel.compare(), Some(Winner::Player));
    assert!(duel.is_match_over());
    assert_eq!(duel.phase, DuelPhase::MatchOver);
    assert_eq!(duel.player_hand.len(), 2);

    assert!(!duel.start_round(&mut rng));
    assert_eq!(duel.round.computer_selection, None);
}

#[test]
fn empty_hand_ends_the_match_on_the_deal() {
    let mut duel = DuelState::new(6);
    duel.deal(Vec::new(), (1..=6).map(|id| creature(id, "c", 40)).collect());

    assert!(duel.is_match_over());
    assert_eq!(duel.phase, DuelPhase::MatchOver);
    assert_eq!(duel.final_outcome(), Outcome::Tie);
}

#[test]
fn ties_are_draws_in_every_category() {
    let left = creature(1, "left", 77);
    let right = creature(2, "right", 77);
    for category in Category::ALL {
        assert_eq!(resolve_round(&left, &right, category), Winner::Draw);
    }
}
