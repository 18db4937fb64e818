//! Command line configuration.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::api::API_BASE;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_HAND_SIZE: usize = 6;
pub const DEFAULT_TOTAL_ROUNDS: u16 = 6;
pub const DEFAULT_REVEAL_PAUSE_MS: u64 = 3000;
pub const DEFAULT_MAX_CREATURE_ID: u32 = 1000;

#[derive(Parser, Debug, Clone)]
#[command(name = "pokedeck")]
#[command(about = "Browse the Pokedex and play a card duel against the computer")]
pub struct Args {
    /// Base URL of the PokeAPI instance
    #[arg(long, default_value = API_BASE)]
    pub api_base: String,

    /// Entries fetched per catalog page
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..))]
    pub page_size: u16,

    /// Cards dealt to each side; cards are picked with the keys 1-9
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u16).range(1..=9))]
    pub hand_size: u16,

    /// Rounds per match
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u16).range(1..))]
    pub rounds: u16,

    /// Pause between the reveal and the next hidden card, in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub reveal_pause_ms: u64,

    /// Highest creature id the duel draws from
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_creature_id: u32,

    /// Seed for card draws and categories (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log destination; the terminal belongs to the UI
    #[arg(long, default_value = "pokedeck.log")]
    pub log_file: PathBuf,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogSettings {
    pub page_size: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DuelSettings {
    pub hand_size: usize,
    pub total_rounds: u16,
    pub reveal_pause_ms: u64,
    pub max_creature_id: u32,
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            hand_size: DEFAULT_HAND_SIZE,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            reveal_pause_ms: DEFAULT_REVEAL_PAUSE_MS,
            max_creature_id: DEFAULT_MAX_CREATURE_ID,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base: String,
    pub catalog: CatalogSettings,
    pub duel: DuelSettings,
    pub seed: u64,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        Self {
            api_base: args.api_base,
            catalog: CatalogSettings {
                page_size: usize::from(args.page_size),
            },
            duel: DuelSettings {
                hand_size: usize::from(args.hand_size),
                total_rounds: args.rounds,
                reveal_pause_ms: args.reveal_pause_ms,
                max_creature_id: args.max_creature_id,
            },
            seed: args.seed.unwrap_or_else(rand::random),
            log_file: args.log_file,
            log_level: args.log_level,
        }
    }
}
