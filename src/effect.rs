//! Side effects declared by the reducer and run by the shell.

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage {
        offset: usize,
        limit: usize,
    },
    LoadEvolution {
        creature_id: u32,
        chain_url: String,
    },
    RenderEvolution {
        creature_id: u32,
        names: Vec<String>,
    },
    LoadHands {
        match_id: u64,
        player_ids: Vec<u32>,
        computer_ids: Vec<u32>,
    },
    /// Emit `DuelNextRound` after the reveal pause.
    ScheduleNextRound {
        match_id: u64,
        delay_ms: u64,
    },
    CancelRoundPause,
}
