//! Cybo engine: the state machine behind one handle.
//!
//! Created -> Ticking (self-loop) -> dropped. The engine itself is plain
//! owned data; lifetime across the C ABI is managed by `cybo_ffi`.

use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::ids::{StringId, TextureId};
use crate::invariants::try_validate_invariants;
use crate::resources::{ResourceTable, TextureDesc};
use crate::state::create_initial_resources;
use crate::tick::TickCounter;
use crate::view::EngineView;

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    tick: TickCounter,
    resources: ResourceTable,
    view: EngineView,
}

impl Engine {
    /// Engine with the default configuration.
    pub fn new() -> Self {
        Self::assemble(EngineConfig::default(), TickCounter::new(), None)
    }

    /// Engine with a caller-supplied configuration. Fails if the
    /// configuration does not validate.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, TickCounter::new(), None))
    }

    /// Rebuild an engine from restored parts, validating invariants before
    /// handing it out.
    pub(crate) fn from_parts(
        config: EngineConfig,
        tick: TickCounter,
        resources: ResourceTable,
    ) -> Result<Self> {
        config.validate()?;
        try_validate_invariants(&resources, config.max_texture_dimension)?;
        Ok(Self::assemble(config, tick, Some(resources)))
    }

    fn assemble(config: EngineConfig, tick: TickCounter, resources: Option<ResourceTable>) -> Self {
        let resources = resources.unwrap_or_else(|| create_initial_resources(&config));
        let mut engine = Self {
            config,
            tick,
            resources,
            view: EngineView::default(),
        };
        engine.copy_to_view();
        debug!(
            tick = engine.tick.get(),
            strings = engine.resources.string_count(),
            "engine assembled"
        );
        engine
    }

    /// Advance by exactly one step. Returns the new tick count.
    ///
    /// On error nothing changes, including the view.
    pub fn tick(&mut self) -> Result<u64> {
        let tick = self.tick.advance()?;
        self.copy_to_view();
        trace!(tick, "engine ticked");
        Ok(tick)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick.get()
    }

    /// Resolve a string resource. Unknown ids are absent.
    pub fn resolve_string(&self, id: StringId) -> Option<&str> {
        self.resources.get_string(id)
    }

    pub fn register_string(&mut self, text: &str) -> Result<StringId> {
        let id = self.resources.register_string(text)?;
        debug!(id = id.id, len = text.len(), "string registered");
        Ok(id)
    }

    /// Register raw bytes as a string; rejects anything that is not UTF-8.
    pub fn register_string_utf8(&mut self, bytes: &[u8]) -> Result<StringId> {
        let id = self.resources.register_string_utf8(bytes)?;
        debug!(id = id.id, len = bytes.len(), "string registered");
        Ok(id)
    }

    pub fn register_texture(&mut self, width: u32, height: u32) -> Result<TextureId> {
        let id = self
            .resources
            .register_texture(width, height, self.config.max_texture_dimension)?;
        debug!(id = id.id, width, height, "texture registered");
        Ok(id)
    }

    pub fn drop_texture(&mut self, id: TextureId) -> Result<TextureDesc> {
        let desc = self.resources.drop_texture(id)?;
        debug!(id = id.id, "texture dropped");
        Ok(desc)
    }

    pub fn texture(&self, id: TextureId) -> Option<TextureDesc> {
        self.resources.texture(id)
    }

    /// View as of the last completed tick.
    pub fn view(&self) -> EngineView {
        self.view
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn copy_to_view(&mut self) {
        self.view = EngineView {
            tick: self.tick.get(),
            string_count: self.resources.string_count() as u64,
            texture_count: self.resources.texture_count() as u64,
        };
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
