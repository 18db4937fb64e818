//! Paginated creature catalog with hydrated species and ability detail.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{join_ordered, AbilityRecord, PokeSource};
use crate::error::DexResult;
use crate::state::{AbilityNote, CatalogEntry};

pub const NO_DESCRIPTION: &str = "No description available.";

const ENTRY_CONCURRENCY: usize = 8;
const ABILITY_CONCURRENCY: usize = 4;

/// One fetched page: how many names the listing returned and the entries that hydrated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub listed: usize,
    pub entries: Vec<CatalogEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a page in its own order. Creatures already present are skipped; existing
    /// entries are never touched. Returns the number of entries added.
    pub fn append_page(&mut self, page: Vec<CatalogEntry>) -> usize {
        let before = self.entries.len();
        for entry in page {
            if self.find_by_id(entry.creature.id).is_some() {
                log::debug!("catalog already holds {}", entry.creature.name);
                continue;
            }
            self.entries.push(entry);
        }
        self.entries.len() - before
    }

    /// Indices of entries whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.creature.name.to_lowercase().contains(&needle))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn find_by_id(&self, creature_id: u32) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.creature.id == creature_id)
    }

    pub fn find_by_species_id(&self, species_id: u32) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.species.id == species_id)
    }

    pub fn max_species_id(&self) -> Option<u32> {
        self.entries.iter().map(|entry| entry.species.id).max()
    }
}

/// English short effect of an ability, or the fallback text.
pub fn english_short_effect(record: Option<&AbilityRecord>) -> String {
    record
        .and_then(|record| {
            record
                .effects
                .iter()
                .find(|effect| effect.language == "en")
        })
        .map(|effect| effect.short_effect.clone())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// Full creature, species and ability detail for one list entry. Ability failures degrade to
/// the fallback text; creature and species failures fail the entry.
pub async fn hydrate_entry(source: Arc<dyn PokeSource>, name: String) -> DexResult<CatalogEntry> {
    let detail = source.fetch_creature(&name).await?;
    let species = source.fetch_species(&detail.species_url).await?;

    let ability_urls: Vec<String> = detail
        .abilities
        .iter()
        .map(|ability| ability.url.clone())
        .collect();
    let records = join_ordered(ability_urls, ABILITY_CONCURRENCY, |url| {
        let source = source.clone();
        async move { source.fetch_ability(&url).await }
    })
    .await;

    let abilities = detail
        .abilities
        .iter()
        .zip(records)
        .map(|(ability, record)| {
            let record = match record {
                Ok(record) => Some(record),
                Err(err) => {
                    log::warn!("ability {} of {name} unavailable: {err}", ability.name);
                    None
                }
            };
            AbilityNote {
                name: ability.name.clone(),
                short_effect: english_short_effect(record.as_ref()),
            }
        })
        .collect();

    Ok(CatalogEntry {
        creature: detail.creature,
        species,
        abilities,
        profile: detail.profile,
    })
}

/// One list page, hydrated. The list request itself is required; entries that fail to
/// hydrate are dropped.
pub async fn fetch_page(
    source: Arc<dyn PokeSource>,
    offset: usize,
    limit: usize,
) -> DexResult<CatalogPage> {
    let listing = source.fetch_creature_list(offset, limit).await?;
    let names: Vec<String> = listing.into_iter().map(|item| item.name).collect();

    let results = join_ordered(names.clone(), ENTRY_CONCURRENCY, |name| {
        hydrate_entry(source.clone(), name)
    })
    .await;

    let mut entries = Vec::with_capacity(results.len());
    for (name, result) in names.iter().zip(results) {
        match result {
            Ok(entry) => entries.push(entry),
            Err(err) => log::warn!("dropping {name} from page at offset {offset}: {err}"),
        }
    }
    log::info!(
        "loaded catalog page offset={offset} limit={limit}: {} of {} entries",
        entries.len(),
        names.len()
    );
    Ok(CatalogPage {
        listed: names.len(),
        entries,
    })
}
