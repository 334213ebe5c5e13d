//! Initial state construction.

use crate::config::EngineConfig;
use crate::resources::ResourceTable;

/// Fresh resource table for a new engine: the well-known string at id 0,
/// then the configured seed strings in order.
pub fn create_initial_resources(config: &EngineConfig) -> ResourceTable {
    ResourceTable::seeded(&config.well_known_text, &config.seed_strings)
}
