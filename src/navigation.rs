//! Previous/next species lookups for the detail view.

use crate::catalog::Catalog;
use crate::error::{DexError, DexResult};
use crate::state::CatalogEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbor<'a> {
    Found(&'a CatalogEntry),
    /// The species exists upstream but has not been paginated in.
    Missing(u32),
    NoPredecessor,
}

impl<'a> Neighbor<'a> {
    pub fn into_result(self) -> DexResult<&'a CatalogEntry> {
        match self {
            Neighbor::Found(entry) => Ok(entry),
            Neighbor::Missing(species_id) => {
                Err(DexError::not_found(format!("species {species_id}")))
            }
            Neighbor::NoPredecessor => Err(DexError::not_found("previous species")),
        }
    }
}

pub fn has_predecessor(species_id: u32) -> bool {
    species_id > 1
}

pub fn next(catalog: &Catalog, species_id: u32) -> Neighbor<'_> {
    lookup(catalog, species_id.saturating_add(1))
}

pub fn prev(catalog: &Catalog, species_id: u32) -> Neighbor<'_> {
    if !has_predecessor(species_id) {
        return Neighbor::NoPredecessor;
    }
    lookup(catalog, species_id - 1)
}

fn lookup(catalog: &Catalog, species_id: u32) -> Neighbor<'_> {
    match catalog.find_by_species_id(species_id) {
        Some(entry) => Neighbor::Found(entry),
        None => Neighbor::Missing(species_id),
    }
}
