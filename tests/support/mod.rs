//! In-memory PokeAPI double shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pokedeck::api::{AbilityRecord, CreatureDetail, EffectText, NamedResource, PokeSource};
use pokedeck::error::{DexError, DexResult};
use pokedeck::evolution::ChainNode;
use pokedeck::state::{BaseStat, CatalogEntry, Creature, Profile, SpeciesRecord, Stats};
use tokio::time::Instant;

#[derive(Default)]
pub struct MockSource {
    creatures: HashMap<String, CreatureDetail>,
    listing: Vec<NamedResource>,
    species: HashMap<String, SpeciesRecord>,
    abilities: HashMap<String, AbilityRecord>,
    chains: HashMap<String, ChainNode>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    started: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn species_url(id: u32) -> String {
    format!("mock://pokemon-species/{id}")
}

pub fn ability_url(name: &str) -> String {
    format!("mock://ability/{name}")
}

pub fn chain_url(id: u32) -> String {
    format!("mock://evolution-chain/{id}")
}

pub fn stats(value: u16) -> Stats {
    Stats {
        speed: value,
        attack: value,
        defense: value,
        hp: value,
    }
}

pub fn creature(id: u32, name: &str, value: u16) -> Creature {
    Creature {
        id,
        name: name.to_string(),
        image: Some(format!("mock://home/{id}.png")),
        types: vec!["normal".to_string()],
        stats: stats(value),
    }
}

pub fn catalog_entry(id: u32, name: &str, chain: Option<u32>) -> CatalogEntry {
    CatalogEntry {
        creature: creature(id, name, 50),
        species: SpeciesRecord {
            id,
            name: name.to_string(),
            color: "green".to_string(),
            evolution_chain_url: chain.map(chain_url),
        },
        abilities: Vec::new(),
        profile: Profile::default(),
    }
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a creature reachable by id and by name, its species and a listing entry.
    pub fn with_creature(
        mut self,
        id: u32,
        name: &str,
        value: u16,
        abilities: &[&str],
        chain: Option<u32>,
    ) -> Self {
        let detail = CreatureDetail {
            creature: creature(id, name, value),
            artwork: Some(format!("mock://artwork/{id}.png")),
            species_url: species_url(id),
            abilities: abilities
                .iter()
                .map(|ability| NamedResource {
                    name: ability.to_string(),
                    url: ability_url(ability),
                })
                .collect(),
            profile: Profile {
                height: 7,
                weight: 69,
                base_stats: vec![BaseStat {
                    name: "hp".to_string(),
                    value,
                }],
            },
        };
        self.creatures.insert(id.to_string(), detail.clone());
        self.creatures.insert(name.to_string(), detail);
        self.species.insert(
            species_url(id),
            SpeciesRecord {
                id,
                name: name.to_string(),
                color: "green".to_string(),
                evolution_chain_url: chain.map(chain_url),
            },
        );
        self.listing.push(NamedResource {
            name: name.to_string(),
            url: format!("mock://pokemon/{id}"),
        });
        self
    }

    pub fn with_ability(mut self, name: &str, english: Option<&str>) -> Self {
        let mut effects = vec![EffectText {
            language: "fr".to_string(),
            short_effect: format!("{name} (fr)"),
        }];
        if let Some(text) = english {
            effects.push(EffectText {
                language: "en".to_string(),
                short_effect: text.to_string(),
            });
        }
        self.abilities.insert(
            ability_url(name),
            AbilityRecord {
                name: name.to_string(),
                effects,
            },
        );
        self
    }

    pub fn with_chain(mut self, id: u32, root: ChainNode) -> Self {
        self.chains.insert(chain_url(id), root);
        self
    }

    /// Any request whose key or url equals `key` fails.
    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn delayed(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// When the request for `key` started, on the tokio clock.
    pub fn started_at(&self, key: &str) -> Option<Instant> {
        let started = self.started.lock().ok()?;
        started
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, at)| *at)
    }

    /// Most requests that were ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, key: &str) -> DexResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(key.to_string());
        }
        if let Ok(mut started) = self.started.lock() {
            started.push((key.to_string(), Instant::now()));
        }
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(key) {
            return Err(DexError::fetch(key, "503 Service Unavailable"));
        }
        Ok(())
    }
}

fn missing(key: &str) -> DexError {
    DexError::fetch(key, "404 Not Found")
}

#[async_trait]
impl PokeSource for MockSource {
    async fn fetch_creature(&self, key: &str) -> DexResult<CreatureDetail> {
        self.enter(key).await?;
        self.creatures.get(key).cloned().ok_or_else(|| missing(key))
    }

    async fn fetch_creature_list(
        &self,
        offset: usize,
        limit: usize,
    ) -> DexResult<Vec<NamedResource>> {
        let key = format!("list?offset={offset}&limit={limit}");
        self.enter(&key).await?;
        Ok(self.listing.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn fetch_species(&self, url: &str) -> DexResult<SpeciesRecord> {
        self.enter(url).await?;
        self.species.get(url).cloned().ok_or_else(|| missing(url))
    }

    async fn fetch_ability(&self, url: &str) -> DexResult<AbilityRecord> {
        self.enter(url).await?;
        self.abilities.get(url).cloned().ok_or_else(|| missing(url))
    }

    async fn fetch_evolution_chain(&self, url: &str) -> DexResult<ChainNode> {
        self.enter(url).await?;
        self.chains.get(url).cloned().ok_or_else(|| missing(url))
    }
}
