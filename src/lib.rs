//! Pokedex browser and card duel on top of PokeAPI.
//!
//! The library holds the state machine and fetch pipelines; the binary is a thin terminal shell.

pub mod action;
pub mod api;
pub mod catalog;
pub mod config;
pub mod duel;
pub mod effect;
pub mod error;
pub mod evolution;
pub mod logger;
pub mod navigation;
pub mod reducer;
pub mod state;
pub mod tasks;
pub mod ui;
