//! Evolution chains: flattening a branching tree into display order and resolving its artwork.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::api::PokeSource;
use crate::catalog::Catalog;
use crate::error::{DexError, DexResult};
use crate::state::EvolutionStep;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNode {
    pub species_name: String,
    pub children: Vec<ChainNode>,
}

impl ChainNode {
    pub fn leaf(species_name: impl Into<String>) -> Self {
        Self {
            species_name: species_name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(species_name: impl Into<String>, children: Vec<ChainNode>) -> Self {
        Self {
            species_name: species_name.into(),
            children,
        }
    }
}

/// Species names in depth-first pre-order, each at most once.
pub type EvolutionList = Vec<String>;

/// Pre-order walk over a chain. Children are visited in declared order; a name that was
/// already yielded is skipped but its subtree is still walked.
pub struct Traversal<'a> {
    stack: Vec<&'a ChainNode>,
    seen: HashSet<&'a str>,
}

impl<'a> Iterator for Traversal<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.stack.extend(node.children.iter().rev());
            if self.seen.insert(node.species_name.as_str()) {
                return Some(node.species_name.as_str());
            }
        }
        None
    }
}

pub fn traverse(root: &ChainNode) -> Traversal<'_> {
    Traversal {
        stack: vec![root],
        seen: HashSet::new(),
    }
}

pub fn evolution_list(root: &ChainNode) -> EvolutionList {
    traverse(root).map(str::to_string).collect()
}

/// Chain URL recorded on the hydrated catalog entry of `creature_id`.
pub fn locate_chain(catalog: &Catalog, creature_id: u32) -> DexResult<String> {
    let entry = catalog
        .find_by_id(creature_id)
        .ok_or_else(|| DexError::not_found(format!("creature {creature_id}")))?;
    entry
        .species
        .evolution_chain_url
        .clone()
        .ok_or_else(|| DexError::not_found(format!("evolution chain of {}", entry.species.name)))
}

pub async fn resolve(
    source: &dyn PokeSource,
    catalog: &Catalog,
    creature_id: u32,
) -> DexResult<EvolutionList> {
    let chain_url = locate_chain(catalog, creature_id)?;
    resolve_chain(source, &chain_url).await
}

pub async fn resolve_chain(source: &dyn PokeSource, chain_url: &str) -> DexResult<EvolutionList> {
    let root = source.fetch_evolution_chain(chain_url).await?;
    Ok(evolution_list(&root))
}

/// Fetches artwork for each member in list order, one request at a time. A member whose
/// lookup fails keeps its place with no artwork.
pub async fn render(source: &dyn PokeSource, list: &[String]) -> Vec<EvolutionStep> {
    let mut steps = Vec::with_capacity(list.len());
    for (index, name) in list.iter().enumerate() {
        let artwork = match source.fetch_creature(name).await {
            Ok(detail) => detail.artwork,
            Err(err) => {
                log::warn!("no artwork for evolution member {name}: {err}");
                None
            }
        };
        steps.push(EvolutionStep {
            name: name.clone(),
            artwork,
            connector: index + 1 < list.len(),
        });
    }
    steps
}
