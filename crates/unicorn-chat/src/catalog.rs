//! Read-only bundle of the dataset and its indices.

use tracing::info;

use unicorn_core::{Dataset, UnicornConfig};

use crate::entity_index::EntityIndex;
use crate::sector_map::SectorMap;

/// Dataset plus the indices built from it.
///
/// Built once at startup and shared by reference (`Arc<Catalog>`) across
/// sessions; nothing in it is mutated afterwards. Reloading the dataset means
/// building a new catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    dataset: Dataset,
    entities: EntityIndex,
    sectors: SectorMap,
}

impl Catalog {
    pub fn new(dataset: Dataset, sectors: SectorMap) -> Self {
        let entities = EntityIndex::build(&dataset);
        info!(
            records = dataset.len(),
            aliases = entities.len(),
            sectors = sectors.len(),
            "Catalog built"
        );
        Self {
            dataset,
            entities,
            sectors,
        }
    }

    /// Catalog with the built-in sector map extended by `config.sectors`.
    pub fn from_config(dataset: Dataset, config: &UnicornConfig) -> Self {
        Self::new(dataset, SectorMap::builtin().with_overrides(&config.sectors))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn entities(&self) -> &EntityIndex {
        &self.entities
    }

    pub fn sectors(&self) -> &SectorMap {
        &self.sectors
    }
}
