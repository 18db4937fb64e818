use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{DexError, DexResult};
use crate::evolution::ChainNode;
use crate::state::{BaseStat, Creature, Profile, SpeciesRecord, Stats};

pub const API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// Everything one `/pokemon/{key}` response yields.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatureDetail {
    pub creature: Creature,
    pub artwork: Option<String>,
    pub species_url: String,
    pub abilities: Vec<NamedResource>,
    pub profile: Profile,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AbilityRecord {
    pub name: String,
    pub effects: Vec<EffectText>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectText {
    pub language: String,
    pub short_effect: String,
}

#[async_trait]
pub trait PokeSource: Send + Sync {
    async fn fetch_creature(&self, key: &str) -> DexResult<CreatureDetail>;

    async fn fetch_creature_list(&self, offset: usize, limit: usize)
        -> DexResult<Vec<NamedResource>>;

    async fn fetch_species(&self, url: &str) -> DexResult<SpeciesRecord>;

    async fn fetch_ability(&self, url: &str) -> DexResult<AbilityRecord>;

    async fn fetch_evolution_chain(&self, url: &str) -> DexResult<ChainNode>;
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    height: u16,
    weight: u16,
    species: NamedResource,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    abilities: Vec<PokemonAbilitySlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSpeciesResponse {
    id: u32,
    name: String,
    color: NamedResource,
    evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct AbilityDetailResponse {
    name: String,
    #[serde(default)]
    effect_entries: Vec<EffectEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct EffectEntry {
    short_effect: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

#[derive(Clone, Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    evolves_to: Vec<ChainLink>,
}

/// PokeAPI over HTTP. No caching: every call goes to the network.
#[derive(Clone, Debug)]
pub struct HttpSource {
    base: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> DexResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| DexError::fetch(url, err))?;
        let response = response
            .error_for_status()
            .map_err(|err| DexError::fetch(url, err))?;
        response.json().await.map_err(|err| DexError::fetch(url, err))
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(API_BASE)
    }
}

#[async_trait]
impl PokeSource for HttpSource {
    async fn fetch_creature(&self, key: &str) -> DexResult<CreatureDetail> {
        let url = format!("{}/pokemon/{}", self.base, key.to_lowercase());
        let response: PokemonResponse = self.get_json(&url).await?;
        Ok(creature_detail(response))
    }

    async fn fetch_creature_list(
        &self,
        offset: usize,
        limit: usize,
    ) -> DexResult<Vec<NamedResource>> {
        let url = format!("{}/pokemon?offset={offset}&limit={limit}", self.base);
        let response: ListResponse = self.get_json(&url).await?;
        Ok(response.results)
    }

    async fn fetch_species(&self, url: &str) -> DexResult<SpeciesRecord> {
        let response: PokemonSpeciesResponse = self.get_json(url).await?;
        Ok(SpeciesRecord {
            id: response.id,
            name: response.name,
            color: response.color.name,
            evolution_chain_url: response.evolution_chain.map(|chain| chain.url),
        })
    }

    async fn fetch_ability(&self, url: &str) -> DexResult<AbilityRecord> {
        let response: AbilityDetailResponse = self.get_json(url).await?;
        Ok(AbilityRecord {
            name: response.name,
            effects: response
                .effect_entries
                .into_iter()
                .map(|entry| EffectText {
                    language: entry.language.name,
                    short_effect: sanitize_text(&entry.short_effect),
                })
                .collect(),
        })
    }

    async fn fetch_evolution_chain(&self, url: &str) -> DexResult<ChainNode> {
        let response: EvolutionChainResponse = self.get_json(url).await?;
        Ok(chain_node(response.chain))
    }
}

fn creature_detail(response: PokemonResponse) -> CreatureDetail {
    let get_stat = |stat_name: &str| -> u16 {
        response
            .stats
            .iter()
            .find(|slot| slot.stat.name == stat_name)
            .map(|slot| slot.base_stat)
            .unwrap_or(0)
    };
    let stats = Stats {
        speed: get_stat("speed"),
        attack: get_stat("attack"),
        defense: get_stat("defense"),
        hp: get_stat("hp"),
    };
    let base_stats = response
        .stats
        .iter()
        .map(|slot| BaseStat {
            name: slot.stat.name.clone(),
            value: slot.base_stat,
        })
        .collect();

    let front_default = pointer_string(&response.sprites, "/front_default");
    let image = pointer_string(&response.sprites, "/other/home/front_default")
        .or_else(|| front_default.clone());
    let artwork = pointer_string(&response.sprites, "/other/official-artwork/front_default")
        .or(front_default);

    CreatureDetail {
        creature: Creature {
            id: response.id,
            name: response.name,
            image,
            types: response
                .types
                .into_iter()
                .map(|slot| slot.type_info.name)
                .collect(),
            stats,
        },
        artwork,
        species_url: response.species.url,
        abilities: response
            .abilities
            .into_iter()
            .map(|slot| slot.ability)
            .collect(),
        profile: Profile {
            height: response.height,
            weight: response.weight,
            base_stats,
        },
    }
}

fn chain_node(link: ChainLink) -> ChainNode {
    ChainNode {
        species_name: link.species.name,
        children: link.evolves_to.into_iter().map(chain_node).collect(),
    }
}

fn sanitize_text(text: &str) -> String {
    text.replace('\n', " ").replace('\u{000C}', " ")
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

/// Runs `task` over `inputs` with at most `concurrency` in flight and returns the results in
/// input order, whatever order they completed in.
pub async fn join_ordered<I, T, F, Fut>(
    inputs: Vec<I>,
    concurrency: usize,
    task: F,
) -> Vec<DexResult<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = DexResult<T>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set = JoinSet::new();
    let len = inputs.len();
    for (index, input) in inputs.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let fut = task(input);
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (index, fut.await)
        });
    }

    let mut slots: Vec<Option<DexResult<T>>> = (0..len).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(err) => log::warn!("fetch task did not complete: {err}"),
        }
    }
    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(DexError::fetch("task", "did not complete"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pokemon_response_maps_stats_by_name() {
        let json = serde_json::json!({
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "species": { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/" },
            "types": [{ "slot": 1, "type": { "name": "electric", "url": "" } }],
            "stats": [
                { "base_stat": 35, "stat": { "name": "hp", "url": "" } },
                { "base_stat": 55, "stat": { "name": "attack", "url": "" } },
                { "base_stat": 40, "stat": { "name": "defense", "url": "" } },
                { "base_stat": 50, "stat": { "name": "special-attack", "url": "" } },
                { "base_stat": 50, "stat": { "name": "special-defense", "url": "" } },
                { "base_stat": 90, "stat": { "name": "speed", "url": "" } }
            ],
            "abilities": [
                { "ability": { "name": "static", "url": "https://pokeapi.co/api/v2/ability/9/" } }
            ],
            "sprites": {
                "front_default": "front.png",
                "other": {
                    "home": { "front_default": "home.png" },
                    "official-artwork": { "front_default": "art.png" }
                }
            }
        });
        let response: PokemonResponse = serde_json::from_value(json).expect("pokemon json");
        let detail = creature_detail(response);

        assert_eq!(detail.creature.id, 25);
        assert_eq!(
            detail.creature.stats,
            Stats {
                speed: 90,
                attack: 55,
                defense: 40,
                hp: 35
            }
        );
        assert_eq!(detail.creature.image.as_deref(), Some("home.png"));
        assert_eq!(detail.artwork.as_deref(), Some("art.png"));
        assert_eq!(detail.creature.types, vec!["electric".to_string()]);
        assert_eq!(detail.profile.base_stats.len(), 6);
        assert_eq!(detail.abilities[0].name, "static");
    }

    #[test]
    fn missing_artwork_falls_back_to_front_sprite() {
        let sprites = serde_json::json!({ "front_default": "front.png", "other": {} });
        let home = pointer_string(&sprites, "/other/home/front_default");
        assert_eq!(home, None);
        assert_eq!(
            pointer_string(&sprites, "/front_default").as_deref(),
            Some("front.png")
        );
    }

    #[test]
    fn chain_links_become_nodes() {
        let json = serde_json::json!({
            "chain": {
                "species": { "name": "eevee", "url": "" },
                "evolves_to": [
                    { "species": { "name": "vaporeon", "url": "" }, "evolves_to": [] },
                    { "species": { "name": "jolteon", "url": "" }, "evolves_to": [] }
                ]
            }
        });
        let response: EvolutionChainResponse = serde_json::from_value(json).expect("chain json");
        let node = chain_node(response.chain);
        assert_eq!(node.species_name, "eevee");
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[1].species_name, "jolteon");
    }

    #[test]
    fn http_source_trims_trailing_slash() {
        let source = HttpSource::new("https://pokeapi.co/api/v2/");
        assert_eq!(source.base(), "https://pokeapi.co/api/v2");
    }

    #[tokio::test]
    async fn join_ordered_keeps_request_order() {
        let inputs = vec![30u64, 10, 20];
        let results = join_ordered(inputs, 3, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(delay)
        })
        .await;
        let values: Vec<u64> = results.into_iter().map(|r| r.expect("ok")).collect();
        assert_eq!(values, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn join_ordered_keeps_failures_in_place() {
        let results = join_ordered(vec![1u32, 2, 3], 1, |n| async move {
            if n == 2 {
                Err(DexError::fetch(format!("item/{n}"), "boom"))
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Ok(1));
        assert!(results[1].is_err());
        assert_eq!(results[2], Ok(3));
    }
}
